use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use gpui::prelude::*;
use gpui::{
    Bounds, MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels, Point, Window,
    canvas, div,
};

use crate::config::ChartConfig;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::interaction::{PointerEvent, PointerKind};
use crate::quantity::QuantitySource;
use crate::scope::Scope;

use super::paint::{GpuiSurface, GpuiTextMeasurer, to_hsla};

/// A GPUI view that paints a [`Scope`] with its plots stacked vertically.
///
/// Mouse input goes to the plot under the pointer; hovering one plot shows
/// the linked cursor on the others.
#[derive(Clone)]
pub struct GpuiScopeView {
    scope: Arc<RwLock<Scope>>,
    layout: Arc<RwLock<ViewLayout>>,
    epoch: Instant,
}

#[derive(Debug, Default)]
struct ViewLayout {
    bounds: Option<ScreenRect>,
    hovered: Option<usize>,
}

impl GpuiScopeView {
    /// Create a view for the given scope.
    pub fn new(scope: Scope) -> Self {
        Self {
            scope: Arc::new(RwLock::new(scope)),
            layout: Arc::new(RwLock::new(ViewLayout::default())),
            epoch: Instant::now(),
        }
    }

    /// Create a view for an empty scope with the given chart tunables.
    pub fn with_config(config: ChartConfig) -> Self {
        Self::new(Scope::new(config))
    }

    /// Get a handle for mutating the underlying scope.
    ///
    /// This is useful for feeding samples from the simulation loop.
    pub fn scope_handle(&self) -> ScopeHandle {
        ScopeHandle {
            scope: Arc::clone(&self.scope),
        }
    }

    /// Sample every plot and repaint if anything was recorded.
    pub fn sample(&mut self, source: &dyn QuantitySource, sim_time: f64, cx: &mut Context<Self>) {
        let handle = self.scope_handle();
        if handle.write(|scope| scope.sample(source, sim_time)) {
            cx.notify();
        }
    }

    fn pointer_event(&self, position: Point<Pixels>) -> Option<(usize, PointerEvent)> {
        let layout = self.layout.read().unwrap_or_else(PoisonError::into_inner);
        let bounds = layout.bounds?;
        let position = ScreenPoint::new(f32::from(position.x), f32::from(position.y));
        if !bounds.contains(position) {
            return None;
        }
        let rows = self.scope_handle().read(|scope| scope.plots().len());
        let (index, row) = row_at(bounds, rows, position.y)?;
        let local = ScreenPoint::new(position.x - row.min.x, position.y - row.min.y);
        let time_ms = self.epoch.elapsed().as_secs_f64() * 1000.0;
        Some((index, PointerEvent::new(local, PointerKind::Mouse, time_ms)))
    }

    fn leave_hovered(&self, scope: &mut Scope, next: Option<usize>) -> bool {
        let mut layout = self.layout.write().unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut layout.hovered, next);
        match previous {
            Some(previous) if Some(previous) != next => scope.pointer_leave(previous),
            _ => false,
        }
    }

    fn on_mouse_down(&mut self, ev: &MouseDownEvent, cx: &mut Context<Self>) {
        let Some((index, event)) = self.pointer_event(ev.position) else {
            return;
        };
        let changed = self.scope_handle().write(|scope| scope.pointer_down(index, event));
        if changed {
            cx.notify();
        }
    }

    fn on_mouse_move(&mut self, ev: &MouseMoveEvent, cx: &mut Context<Self>) {
        let target = self.pointer_event(ev.position);
        let changed = self.scope_handle().write(|scope| {
            let left = self.leave_hovered(scope, target.map(|(index, _)| index));
            let moved = target.is_some_and(|(index, event)| scope.pointer_move(index, event));
            left || moved
        });
        if changed {
            cx.notify();
        }
    }

    fn on_mouse_up(&mut self, ev: &MouseUpEvent, cx: &mut Context<Self>) {
        let Some((index, event)) = self.pointer_event(ev.position) else {
            return;
        };
        let changed = self.scope_handle().write(|scope| scope.pointer_up(index, event));
        if changed {
            cx.notify();
        }
    }

    fn on_hover_change(&mut self, hovered: bool, cx: &mut Context<Self>) {
        if hovered {
            return;
        }
        let changed = self
            .scope_handle()
            .write(|scope| self.leave_hovered(scope, None));
        if changed {
            cx.notify();
        }
    }
}

impl Render for GpuiScopeView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let scope = self.scope_handle();
        let layout = Arc::clone(&self.layout);
        let background = scope.read(|scope| {
            scope
                .plots()
                .first()
                .map(|plot| plot.config().theme.background)
                .unwrap_or_else(|| ChartConfig::default().theme.background)
        });

        div()
            .id("scopeplot-scope")
            .size_full()
            .bg(to_hsla(background))
            .child(
                canvas(
                    move |bounds, _, _| bounds,
                    move |_, bounds: Bounds<Pixels>, window, cx| {
                        let origin_x = f32::from(bounds.origin.x);
                        let origin_y = f32::from(bounds.origin.y);
                        let rect = ScreenRect::new(
                            ScreenPoint::new(origin_x, origin_y),
                            ScreenPoint::new(
                                origin_x + f32::from(bounds.size.width),
                                origin_y + f32::from(bounds.size.height),
                            ),
                        );
                        layout
                            .write()
                            .unwrap_or_else(PoisonError::into_inner)
                            .bounds = Some(rect);

                        let measurer = GpuiTextMeasurer::new(window);
                        let scale = window.scale_factor();
                        scope.write(|scope| {
                            let rows = scope.plots().len();
                            scope.render_all(|index, plot| {
                                let Some((_, row)) = row_rect(rect, rows, index) else {
                                    return;
                                };
                                let mut surface = GpuiSurface::new(window, cx, row.min);
                                plot.render(&mut surface, &measurer, row.width(), row.height(), scale);
                            });
                        });
                    },
                )
                .size_full(),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_down(ev, cx);
                }),
            )
            .on_mouse_move(cx.listener(|this, ev, _, cx| {
                this.on_mouse_move(ev, cx);
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_up(ev, cx);
                }),
            )
            .on_hover(cx.listener(|this, hovered: &bool, _, cx| {
                this.on_hover_change(*hovered, cx);
            }))
    }
}

/// A handle for mutating a [`Scope`] held inside a [`GpuiScopeView`].
///
/// The handle clones cheaply and can be moved into async tasks.
#[derive(Clone)]
pub struct ScopeHandle {
    scope: Arc<RwLock<Scope>>,
}

impl ScopeHandle {
    /// Read the scope state.
    ///
    /// The scope is locked for the duration of the callback.
    pub fn read<R>(&self, f: impl FnOnce(&Scope) -> R) -> R {
        let scope = self.scope.read().unwrap_or_else(PoisonError::into_inner);
        f(&scope)
    }

    /// Mutate the scope state.
    ///
    /// The scope is locked for the duration of the callback.
    pub fn write<R>(&self, f: impl FnOnce(&mut Scope) -> R) -> R {
        let mut scope = self.scope.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut scope)
    }
}

fn row_rect(bounds: ScreenRect, rows: usize, index: usize) -> Option<(usize, ScreenRect)> {
    if index >= rows {
        return None;
    }
    let height = bounds.height() / rows as f32;
    let top = bounds.min.y + height * index as f32;
    Some((
        index,
        ScreenRect::new(
            ScreenPoint::new(bounds.min.x, top),
            ScreenPoint::new(bounds.max.x, top + height),
        ),
    ))
}

fn row_at(bounds: ScreenRect, rows: usize, y: f32) -> Option<(usize, ScreenRect)> {
    if rows == 0 || bounds.height() <= 0.0 {
        return None;
    }
    let height = bounds.height() / rows as f32;
    let index = (((y - bounds.min.y) / height).floor().max(0.0) as usize).min(rows - 1);
    row_rect(bounds, rows, index)
}
