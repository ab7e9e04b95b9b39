//! Memoization of the static chart layer.
//!
//! Background, grid, axes and tick labels only change when the layout does,
//! so they are rebuilt only when the frame signature changes.

use std::fmt::Write as _;

use crate::frame::Frame;
use crate::render::RenderList;

/// Fixed-precision fingerprint of everything the static layer depends on.
///
/// Pixels use two decimals, the device-pixel ratio four, and data values six
/// significant digits in scientific notation.
pub fn frame_signature(frame: &Frame) -> String {
    let (width, height) = frame.size();
    let rect = frame.plot_rect();
    let x = frame.x_window();
    let y = frame.y_window();

    let mut signature = String::with_capacity(256);
    let _ = write!(
        signature,
        "{width:.2}x{height:.2}@{:.4}|{:.2},{:.2},{:.2},{:.2}|x{:.6e}:{:.6e}|y{:.6e}:{:.6e}|xt",
        frame.device_pixel_ratio(),
        rect.min.x,
        rect.min.y,
        rect.max.x,
        rect.max.y,
        x.min,
        x.max,
        y.min,
        y.max,
    );
    for tick in frame.x_ticks() {
        let _ = write!(signature, ",{tick:.6e}");
    }
    signature.push_str("|yt");
    for tick in frame.y_ticks() {
        let _ = write!(signature, ",{tick:.6e}");
    }
    signature
}

/// Last static layer together with the signature it was built for.
#[derive(Debug, Default, Clone)]
pub struct StaticLayerCache {
    signature: Option<String>,
    layer: RenderList,
    hits: u64,
    misses: u64,
}

impl StaticLayerCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Static layer for `frame`, rebuilding it with `build` on a signature change.
    pub fn layer<F>(&mut self, frame: &Frame, build: F) -> &RenderList
    where
        F: FnOnce(&Frame) -> RenderList,
    {
        let signature = frame_signature(frame);
        if self.signature.as_deref() == Some(signature.as_str()) {
            self.hits += 1;
        } else {
            self.misses += 1;
            tracing::trace!(%signature, "rebuilding static chart layer");
            self.layer = build(frame);
            self.signature = Some(signature);
        }
        &self.layer
    }

    /// Force the next [`StaticLayerCache::layer`] call to rebuild.
    pub fn invalidate(&mut self) {
        self.signature = None;
    }

    /// Signature of the cached layer, if any.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Calls served from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Calls that rebuilt the layer.
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
