//! GPUI integration for scopeplot.
//!
//! [`GpuiScopeView`] paints every plot of a [`Scope`](crate::scope::Scope)
//! stacked vertically and routes mouse input to the plot under the pointer.

mod paint;
mod view;

pub use view::{GpuiScopeView, ScopeHandle};
