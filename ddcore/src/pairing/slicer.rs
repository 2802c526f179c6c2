//! Windowed waveform segments for the similarity stage.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::data::channel::WindowName;
use crate::data::trace::{Trace, Traces};
use crate::data::views::{lookup_window, ComponentWindows};
use crate::data::window::Window;
use crate::error::{PairingError, Result};

/// Fraction of the segment tapered at each end before correlation.
pub const TAPER_PERCENTAGE: f64 = 0.05;

/// Cuts `window`'s absolute interval out of `trace` and tapers both edges.
///
/// Slicing failures come from [`Trace::slice`] unchanged.
pub fn slice_window(trace: &Trace, window: &Window) -> Result<Vec<f64>> {
    trace.slice_tapered(
        window.absolute_starttime,
        window.absolute_endtime,
        TAPER_PERCENTAGE,
    )
}

/// Supplies the waveform segments of two windows at once.
pub trait SegmentSource {
    fn pair_segments(&mut self, i: &WindowName, j: &WindowName) -> Result<(&[f64], &[f64])>;
}

/// Pre-sliced segments keyed by window name.
impl SegmentSource for BTreeMap<WindowName, Vec<f64>> {
    fn pair_segments(&mut self, i: &WindowName, j: &WindowName) -> Result<(&[f64], &[f64])> {
        let a = self
            .get(i)
            .ok_or_else(|| PairingError::MissingWindow(i.to_string()))?;
        let b = self
            .get(j)
            .ok_or_else(|| PairingError::MissingWindow(j.to_string()))?;
        Ok((a.as_slice(), b.as_slice()))
    }
}

/// Lazily slices windows out of their channel traces, at most once per window.
pub struct WindowSlicer<'a> {
    traces: &'a Traces,
    windows: &'a ComponentWindows,
    cache: HashMap<WindowName, Vec<f64>>,
}

impl<'a> WindowSlicer<'a> {
    pub fn new(traces: &'a Traces, windows: &'a ComponentWindows) -> Self {
        WindowSlicer {
            traces,
            windows,
            cache: HashMap::new(),
        }
    }

    /// Number of windows sliced so far.
    pub fn sliced(&self) -> usize {
        self.cache.len()
    }

    fn ensure(&mut self, name: &WindowName) -> Result<()> {
        if self.cache.contains_key(name) {
            return Ok(());
        }

        let window = lookup_window(self.windows, name)?;
        let trace = self
            .traces
            .get(&name.channel)
            .ok_or_else(|| PairingError::MissingTrace(name.channel.to_string()))?;

        let segment = slice_window(trace, window)?;
        trace!(window = %name, samples = segment.len(), "sliced window");
        self.cache.insert(name.clone(), segment);
        Ok(())
    }
}

impl SegmentSource for WindowSlicer<'_> {
    fn pair_segments(&mut self, i: &WindowName, j: &WindowName) -> Result<(&[f64], &[f64])> {
        self.ensure(i)?;
        self.ensure(j)?;
        let a = self
            .cache
            .get(i)
            .ok_or_else(|| PairingError::MissingWindow(i.to_string()))?;
        let b = self
            .cache
            .get(j)
            .ok_or_else(|| PairingError::MissingWindow(j.to_string()))?;
        Ok((a.as_slice(), b.as_slice()))
    }
}
