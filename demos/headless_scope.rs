use std::time::Instant;

use scopeplot::{
    AxisSettings, ChartConfig, MonospaceMeasurer, PlotSettings, RecordingSurface, Scope,
    ScopeSettings, ValueTransform, YDisplayMode, nearest_by_x,
};
use tracing_subscriber::EnvFilter;

/// Series RC circuit charging from a 5 V step.
struct RcCircuit {
    time: f64,
    tau: f64,
}

impl RcCircuit {
    fn capacitor_voltage(&self) -> f64 {
        5.0 * (1.0 - (-self.time / self.tau).exp())
    }

    fn current(&self) -> f64 {
        (5.0 - self.capacitor_voltage()) / 1_000.0
    }

    fn evaluate(&self, source: &str, quantity: &str) -> Option<f64> {
        match (source, quantity) {
            ("C1", "voltage") => Some(self.capacitor_voltage()),
            ("R1", "current") => Some(self.current()),
            ("R1", "power") => Some(self.current().powi(2) * 1_000.0),
            _ => None,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let steps: usize = std::env::var("STEPS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(20_000);

    let settings = ScopeSettings {
        sample_interval_ms: 5,
        plots: vec![
            PlotSettings::new("C1 voltage", AxisSettings::new("C1", "voltage")),
            PlotSettings::new("R1 current", AxisSettings::new("R1", "current")),
            PlotSettings {
                y_display_mode: YDisplayMode::Magnitude,
                ..PlotSettings::new(
                    "R1 conductance",
                    AxisSettings::new("R1", "current").with_transform(ValueTransform::Reciprocal),
                )
            },
        ],
    };
    let mut scope = match Scope::from_settings(settings, ChartConfig::default()) {
        Ok(scope) => scope,
        Err(err) => {
            eprintln!("failed to build scope: {err}");
            return;
        }
    };

    let mut circuit = RcCircuit { time: 0.0, tau: 0.5 };
    let start = Instant::now();
    let mut frames = 0;
    let mut commands = 0;
    for step in 0..steps {
        circuit.time = step as f64 * 1e-4;
        scope.sample(&|source: &str, quantity: &str| circuit.evaluate(source, quantity), circuit.time);
        if step % 160 == 0 && scope.redraw_pending() {
            scope.flush_redraw(|_, plot| {
                let mut surface = RecordingSurface::new();
                plot.render(&mut surface, &MonospaceMeasurer::default(), 640.0, 200.0, 1.0);
                commands += surface.recorded().len();
            });
            frames += 1;
        }
    }

    for plot in scope.plots() {
        let store = plot.store();
        let probe = store.last().map_or(0.0, |point| point.x * 0.5);
        let nearest = nearest_by_x(store, probe);
        println!(
            "{:<16} samples {:>5}  probe t={probe:.3} -> {:?}",
            plot.settings().name,
            store.len(),
            nearest.map(|hit| (hit.point.y, hit.visited)),
        );
    }
    println!(
        "{steps} ticks, {frames} frames, {commands} draw commands in {:.1?}",
        start.elapsed()
    );
    match scope.settings().to_json() {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("{err}"),
    }
}
