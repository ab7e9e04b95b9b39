//! Pointer-driven cursor state for a single chart.
//!
//! Mouse users get a hover readout. Touch and pen users press and hold to
//! freeze the cursor in place; the next press releases it.

use crate::geom::ScreenPoint;

/// Press duration after which a touch or pen cursor freezes.
pub const DEFAULT_HOLD_MS: f64 = 350.0;

/// Input device behind a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    /// Mouse or trackpad.
    Mouse,
    /// Finger on a touch screen.
    Touch,
    /// Stylus.
    Pen,
}

/// A pointer event in chart-local logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Pointer position.
    pub position: ScreenPoint,
    /// Device kind.
    pub kind: PointerKind,
    /// Monotonic timestamp in milliseconds.
    pub time_ms: f64,
}

impl PointerEvent {
    /// Create a new pointer event.
    pub fn new(position: ScreenPoint, kind: PointerKind, time_ms: f64) -> Self {
        Self {
            position,
            kind,
            time_ms,
        }
    }
}

/// Where and when the current press started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerAnchor {
    /// Press position.
    pub position: ScreenPoint,
    /// Press timestamp in milliseconds.
    pub time_ms: f64,
    /// Device kind of the press.
    pub kind: PointerKind,
}

/// Coarse interaction phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    /// No press in progress.
    Idle,
    /// A press is in progress.
    Tracking,
    /// The cursor is latched.
    Frozen,
}

/// Cursor state machine.
///
/// Every handler returns whether the visible state changed, so callers only
/// request a redraw when needed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartInteraction {
    frozen: bool,
    anchor: Option<PointerAnchor>,
    readout: Option<ScreenPoint>,
    hold_ms: f64,
}

impl ChartInteraction {
    /// Create an idle state machine with the given hold duration.
    pub fn new(hold_ms: f64) -> Self {
        Self {
            frozen: false,
            anchor: None,
            readout: None,
            hold_ms,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> InteractionPhase {
        if self.frozen {
            InteractionPhase::Frozen
        } else if self.anchor.is_some() {
            InteractionPhase::Tracking
        } else {
            InteractionPhase::Idle
        }
    }

    /// Cursor position to show, if any.
    pub fn readout(&self) -> Option<ScreenPoint> {
        self.readout
    }

    /// Whether the cursor is latched.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Press in progress, if any.
    pub fn anchor(&self) -> Option<PointerAnchor> {
        self.anchor
    }

    /// Hold duration in milliseconds.
    pub fn hold_ms(&self) -> f64 {
        self.hold_ms
    }

    /// Change the hold duration.
    pub fn set_hold_ms(&mut self, hold_ms: f64) {
        self.hold_ms = hold_ms;
    }

    /// Handle a press.
    pub fn pointer_down(&mut self, event: PointerEvent) -> bool {
        if self.frozen {
            self.frozen = false;
            self.anchor = None;
            self.readout = None;
            return true;
        }
        self.anchor = Some(PointerAnchor {
            position: event.position,
            time_ms: event.time_ms,
            kind: event.kind,
        });
        self.readout = Some(event.position);
        true
    }

    /// Handle pointer motion.
    pub fn pointer_move(&mut self, event: PointerEvent) -> bool {
        if self.frozen {
            return false;
        }
        if let Some(anchor) = self.anchor
            && anchor.kind != PointerKind::Mouse
            && event.time_ms - anchor.time_ms >= self.hold_ms
        {
            self.frozen = true;
            self.anchor = None;
            self.readout = Some(event.position);
            return true;
        }
        let changed = self.readout != Some(event.position);
        self.readout = Some(event.position);
        changed
    }

    /// Handle a release. The readout stays where it was.
    pub fn pointer_up(&mut self, _event: PointerEvent) -> bool {
        if self.frozen {
            return false;
        }
        self.anchor.take().is_some()
    }

    /// Handle the pointer leaving the chart.
    pub fn pointer_leave(&mut self) -> bool {
        if self.frozen {
            return false;
        }
        let changed = self.anchor.is_some() || self.readout.is_some();
        self.anchor = None;
        self.readout = None;
        changed
    }

    /// Return to idle, dropping any latched cursor.
    pub fn reset(&mut self) {
        self.frozen = false;
        self.anchor = None;
        self.readout = None;
    }
}

impl Default for ChartInteraction {
    fn default() -> Self {
        Self::new(DEFAULT_HOLD_MS)
    }
}
