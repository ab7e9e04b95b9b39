use scopeplot::render::chart::PLACEHOLDER_TEXT;
use scopeplot::{
    AxisSettings, ChartConfig, MonospaceMeasurer, Plot, PlotSettings, PointerEvent, PointerKind,
    RecordingSurface, Scope, ScopeSettings, ScreenPoint,
};

const WIDTH: f32 = 300.0;
const HEIGHT: f32 = 150.0;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn circuit(source: &str, quantity: &str) -> Option<f64> {
    match (source, quantity) {
        ("R1", "current") => Some(1.5),
        ("C1", "voltage") => Some(-2.0),
        _ => None,
    }
}

fn render(_: usize, plot: &mut Plot) {
    let mut surface = RecordingSurface::new();
    plot.render(&mut surface, &MonospaceMeasurer::default(), WIDTH, HEIGHT, 2.0);
}

fn render_texts(plot: &mut Plot) -> Vec<String> {
    let mut surface = RecordingSurface::new();
    plot.render(&mut surface, &MonospaceMeasurer::default(), WIDTH, HEIGHT, 1.0);
    surface.recorded().texts().map(str::to_string).collect()
}

fn linked_scope(count: usize) -> Scope {
    let mut scope = Scope::default();
    for index in 0..count {
        scope
            .add_plot(PlotSettings::new(format!("p{index}"), AxisSettings::new("R1", "current")))
            .unwrap();
    }
    for step in 0..20 {
        scope.sample(&|_: &str, _: &str| Some(f64::from(step).sin()), f64::from(step));
    }
    scope.render_all(render);
    scope
}

fn touch(x: f32, y: f32, time_ms: f64) -> PointerEvent {
    PointerEvent::new(ScreenPoint::new(x, y), PointerKind::Touch, time_ms)
}

#[test]
fn persisted_settings_drive_sampling() {
    init_tracing();
    let json = r#"{
        "sampleIntervalMs": 100,
        "plots": [
            {"name": "Current", "maxPoints": 3, "y": {"sourceId": "R1", "quantityId": "current"}},
            {
                "name": "Admittance",
                "yDisplayMode": "magnitude",
                "y": {"sourceId": "C1", "quantityId": "voltage", "transformId": "reciprocal"}
            },
            {"name": "Missing", "y": {"sourceId": "L9", "quantityId": "flux"}}
        ]
    }"#;
    let settings = ScopeSettings::from_json(json).unwrap();
    let mut scope = Scope::from_settings(settings, ChartConfig::default()).unwrap();
    assert_eq!(scope.sample_interval_ms(), 100);

    let mut time = 0.0;
    for _ in 0..8 {
        scope.sample(&circuit, time);
        time += 0.05;
    }

    let current = scope.plot(0).unwrap().store();
    assert_eq!(current.len(), 3);
    assert!(current.iter().all(|point| point.y == 1.5));

    let admittance = scope.plot(1).unwrap().store();
    assert_eq!(admittance.len(), 4);
    assert!(admittance.iter().all(|point| point.y == 0.5));

    assert!(scope.plot(2).unwrap().store().is_empty());
}

#[test]
fn malformed_settings_are_rejected() {
    assert!(ScopeSettings::from_json("{\"plots\": 3}").is_err());
    let clamped = ScopeSettings::from_json(r#"{"sampleIntervalMs": 99999}"#).unwrap();
    assert_eq!(clamped.sample_interval_ms, 5000);
}

#[test]
fn empty_plot_shows_placeholder_until_data_arrives() {
    let mut scope = Scope::default();
    scope
        .add_plot(PlotSettings::new("Current", AxisSettings::new("R1", "current")))
        .unwrap();
    let plot = scope.plot_mut(0).unwrap();
    assert_eq!(render_texts(plot), vec![PLACEHOLDER_TEXT.to_string()]);

    scope.sample(&circuit, 0.0);
    scope.sample(&circuit, 1.0);
    let plot = scope.plot_mut(0).unwrap();
    let texts = render_texts(plot);
    assert!(texts.iter().any(|text| text == "Current"));
    assert!(!texts.iter().any(|text| text == PLACEHOLDER_TEXT));
}

#[test]
fn static_layer_is_reused_while_windows_hold() {
    let mut scope = linked_scope(2);
    let misses = scope.plot(0).unwrap().cache().misses();
    scope.render_all(render);
    scope.render_all(render);
    let cache = scope.plot(0).unwrap().cache();
    assert_eq!(cache.misses(), misses);
    assert!(cache.hits() >= 2);
}

#[test]
fn touch_hold_freezes_cursor_on_every_plot() {
    init_tracing();
    let mut scope = linked_scope(2);

    assert!(scope.pointer_down(0, touch(150.0, 60.0, 0.0)));
    assert!(scope.pointer_move(0, touch(150.0, 60.0, 400.0)));
    assert!(scope.plot(0).unwrap().interaction().is_frozen());
    scope.render_all(render);

    let sibling = scope.plot(1).unwrap().cursor_readout().unwrap();
    assert!(sibling.linked);
    assert!(sibling.frozen);
    let own = scope.plot(0).unwrap().cursor_readout().unwrap();
    assert!(!own.linked);
    assert_eq!(own.nearest.point, sibling.nearest.point);

    assert!(!scope.pointer_up(0, touch(150.0, 60.0, 450.0)));
    assert!(!scope.pointer_leave(0));
    assert!(scope.plot(1).unwrap().mirrored_cursor().is_some());

    assert!(scope.pointer_down(0, touch(10.0, 10.0, 900.0)));
    scope.render_all(render);
    assert!(scope.plot(0).unwrap().cursor_readout().is_none());
    assert!(scope.plot(1).unwrap().mirrored_cursor().is_none());
}

#[test]
fn pin_survives_hover_on_another_plot() {
    let mut scope = linked_scope(3);
    scope.pointer_down(0, touch(150.0, 60.0, 0.0));
    scope.pointer_move(0, touch(150.0, 60.0, 400.0));
    scope.render_all(render);
    let pinned = scope.plot(2).unwrap().cursor_readout().unwrap();
    assert!(pinned.frozen);

    let mouse = PointerEvent::new(ScreenPoint::new(90.0, 30.0), PointerKind::Mouse, 500.0);
    assert!(scope.pointer_move(1, mouse));
    scope.render_all(render);
    let hovered = scope.plot(2).unwrap().cursor_readout().unwrap();
    assert!(!hovered.frozen);

    assert!(scope.pointer_leave(1));
    scope.render_all(render);
    assert!(scope.plot(0).unwrap().interaction().is_frozen());
    let restored = scope.plot(2).unwrap().cursor_readout().unwrap();
    assert!(restored.linked && restored.frozen);
    assert_eq!(restored.nearest.point, pinned.nearest.point);
    let sibling = scope.plot(1).unwrap().cursor_readout().unwrap();
    assert!(sibling.linked && sibling.frozen);
}

#[test]
fn plot_added_mid_session_mirrors_live_pin() {
    let mut scope = linked_scope(1);
    scope.pointer_down(0, touch(150.0, 60.0, 0.0));
    scope.pointer_move(0, touch(150.0, 60.0, 400.0));
    scope.render_all(render);

    let index = scope
        .add_plot(PlotSettings::new("late", AxisSettings::new("R1", "current")))
        .unwrap();
    scope.sample(&circuit, 100.0);
    scope.render_all(render);
    let late = scope.plot(index).unwrap();
    assert!(late.mirrored_cursor().is_some_and(|cursor| cursor.frozen));
    assert!(late.cursor_readout().is_some_and(|readout| readout.linked));
}

#[test]
fn manual_axes_without_samples_show_placeholder() {
    let mut scope = Scope::default();
    let settings = PlotSettings {
        x: AxisSettings::time().with_manual_range(0.0, 10.0),
        ..PlotSettings::new("Fixed", AxisSettings::new("R1", "current").with_manual_range(-1.0, 1.0))
    };
    scope.add_plot(settings).unwrap();
    let plot = scope.plot_mut(0).unwrap();
    assert_eq!(render_texts(plot), vec![PLACEHOLDER_TEXT.to_string()]);
    assert!(plot.frame().is_none());
}

#[test]
fn mouse_never_freezes() {
    let mut scope = linked_scope(2);
    let mouse = |time_ms| PointerEvent::new(ScreenPoint::new(120.0, 50.0), PointerKind::Mouse, time_ms);
    scope.pointer_down(0, mouse(0.0));
    scope.pointer_move(0, mouse(5_000.0));
    assert!(!scope.plot(0).unwrap().interaction().is_frozen());

    assert!(scope.pointer_leave(0));
    scope.render_all(render);
    assert!(scope.plot(1).unwrap().mirrored_cursor().is_none());
}

#[test]
fn reset_clears_samples_and_cursors() {
    let mut scope = linked_scope(2);
    scope.pointer_move(1, touch(200.0, 40.0, 0.0));
    scope.render_all(render);
    assert!(scope.plot(0).unwrap().mirrored_cursor().is_some());

    scope.reset();
    scope.render_all(render);
    assert!(scope.plots().iter().all(|plot| plot.store().is_empty()));
    assert!(scope.plot(0).unwrap().mirrored_cursor().is_none());
}
