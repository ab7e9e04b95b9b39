//! Cursor synchronization between charts with unrelated scales.
//!
//! Charts exchange cursor positions as fractions of their plot rectangles, so
//! a cursor at 30% across one chart appears 30% across every sibling no matter
//! what the axes show.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

const LINK_EPSILON: f64 = 1e-9;

/// Member identifier inside a cursor link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartId(u64);

impl ChartId {
    /// Raw identifier value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Cursor position shared across a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkedCursor {
    /// Chart that owns the cursor.
    pub source: ChartId,
    /// Horizontal fraction of the plot rectangle, `0` at the left edge.
    pub x_ratio: f64,
    /// Vertical fraction of the plot rectangle, `0` at the bottom edge.
    pub y_ratio: f64,
    /// Whether the source cursor is latched.
    pub frozen: bool,
}

impl LinkedCursor {
    fn approx_eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.frozen == other.frozen
            && approx_eq(self.x_ratio, other.x_ratio)
            && approx_eq(self.y_ratio, other.y_ratio)
    }
}

/// Latest message on a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorUpdate {
    /// Sequence number, strictly increasing per link.
    pub seq: u64,
    /// Chart that sent the message.
    pub source: ChartId,
    /// Cursor, or `None` once the source withdrew it.
    pub cursor: Option<LinkedCursor>,
}

impl CursorUpdate {
    /// Cursor to mirror on `viewer`, if this message came from another chart.
    pub fn mirrored_for(&self, viewer: ChartId) -> Option<LinkedCursor> {
        if self.source == viewer {
            return None;
        }
        self.cursor
    }
}

/// Shared link handle. Clones refer to the same link.
#[derive(Debug, Clone, Default)]
pub struct CursorLink {
    inner: Arc<RwLock<LinkState>>,
}

impl CursorLink {
    /// Create an empty link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chart and return its identifier.
    pub fn register(&self) -> ChartId {
        let mut state = self.write();
        state.next_member_id = state.next_member_id.wrapping_add(1);
        state.members += 1;
        ChartId(state.next_member_id)
    }

    /// Unregister a chart, withdrawing its cursor first.
    pub fn leave(&self, member: ChartId) {
        self.withdraw(member);
        let mut state = self.write();
        state.members = state.members.saturating_sub(1);
    }

    /// Number of registered charts.
    pub fn members(&self) -> usize {
        self.read().members
    }

    /// Publish a cursor. Repeats of the current payload are dropped.
    pub fn publish(&self, cursor: LinkedCursor) {
        let mut state = self.write();
        if let Some(current) = state.update
            && current.source == cursor.source
            && let Some(current_cursor) = current.cursor
            && current_cursor.approx_eq(&cursor)
        {
            return;
        }
        let seq = state.next_seq();
        tracing::trace!(seq, source = cursor.source.get(), "publishing linked cursor");
        state.update = Some(CursorUpdate {
            seq,
            source: cursor.source,
            cursor: Some(cursor),
        });
    }

    /// Withdraw the cursor owned by `source`.
    ///
    /// Nothing is sent when the current message already carries no cursor
    /// or belongs to another chart.
    pub fn withdraw(&self, source: ChartId) {
        let mut state = self.write();
        match state.update {
            Some(current) if current.source == source && current.cursor.is_some() => {}
            _ => return,
        }
        let seq = state.next_seq();
        tracing::trace!(seq, source = source.get(), "withdrawing linked cursor");
        state.update = Some(CursorUpdate {
            seq,
            source,
            cursor: None,
        });
    }

    /// Latest message, if anything was ever published.
    pub fn latest(&self) -> Option<CursorUpdate> {
        self.read().update
    }

    /// Latest message if its sequence number is newer than `seen`.
    pub fn latest_since(&self, seen: u64) -> Option<CursorUpdate> {
        self.latest().filter(|update| update.seq > seen)
    }

    fn read(&self) -> RwLockReadGuard<'_, LinkState> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, LinkState> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug, Default)]
struct LinkState {
    next_member_id: u64,
    members: usize,
    next_seq: u64,
    update: Option<CursorUpdate>,
}

impl LinkState {
    fn next_seq(&mut self) -> u64 {
        self.next_seq = self.next_seq.wrapping_add(1);
        self.next_seq
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= LINK_EPSILON
}
