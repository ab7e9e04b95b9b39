use std::time::Duration;

use gpui::{
    AppContext, Application, AsyncWindowContext, Bounds, Timer, WindowBounds, WindowOptions, px,
    size,
};
use scopeplot::gpui_backend::GpuiScopeView;
use scopeplot::{AxisSettings, ChartConfig, PlotSettings, Scope};

fn oscillator(time: f64) -> impl Fn(&str, &str) -> Option<f64> {
    move |source: &str, quantity: &str| match (source, quantity) {
        ("L1", "current") => Some((time * 6.0).sin() * (-time * 0.05).exp()),
        ("C1", "voltage") => Some((time * 6.0).cos() * 4.0 * (-time * 0.05).exp()),
        _ => None,
    }
}

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    Application::new().run(|cx| {
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                None,
                size(px(900.0), px(600.0)),
                cx,
            ))),
            ..Default::default()
        };

        cx.open_window(options, |window, cx| {
            let mut scope = Scope::new(ChartConfig::default());
            scope.set_sample_interval_ms(10);
            for (name, source, quantity) in [
                ("L1 current", "L1", "current"),
                ("C1 voltage", "C1", "voltage"),
            ] {
                if let Err(err) = scope.add_plot(PlotSettings::new(name, AxisSettings::new(source, quantity))) {
                    tracing::error!(%err, "failed to add plot");
                }
            }

            let view_handle = cx.new(|_| GpuiScopeView::new(scope));
            let view_for_task = view_handle.clone();
            window
                .spawn(cx, move |cx: &mut AsyncWindowContext| {
                    let mut cx = cx.clone();
                    async move {
                        let mut time = 0.0_f64;
                        loop {
                            Timer::after(Duration::from_millis(16)).await;
                            cx.update(|_, cx| {
                                view_for_task.update(cx, |view, view_cx| {
                                    for _ in 0..16 {
                                        time += 0.001;
                                        view.sample(&oscillator(time), time, view_cx);
                                    }
                                });
                            })
                            .ok();
                        }
                    }
                })
                .detach();

            view_handle
        })
        .unwrap();
    });
}
