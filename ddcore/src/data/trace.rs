use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::algorithm::taper::taper_in_place;
use crate::data::channel::ChannelId;
use crate::error::{PairingError, Result};

/// Continuous waveform of one channel, evenly sampled from `starttime`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub starttime: DateTime<Utc>,
    /// Samples per second
    pub sampling_rate: f64,
    pub data: Vec<f64>,
}

/// Waveforms keyed by channel.
pub type Traces = BTreeMap<ChannelId, Trace>;

/// Seconds from `from` to `to`, negative if `to` is earlier.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let d = to - from;
    d.num_seconds() as f64 + d.subsec_nanos() as f64 * 1e-9
}

impl Trace {
    pub fn new(starttime: DateTime<Utc>, sampling_rate: f64, data: Vec<f64>) -> Self {
        Trace {
            starttime,
            sampling_rate,
            data,
        }
    }

    pub fn npts(&self) -> usize {
        self.data.len()
    }

    pub fn delta(&self) -> f64 {
        1.0 / self.sampling_rate
    }

    /// Time of the last sample.
    pub fn endtime(&self) -> DateTime<Utc> {
        let span = self.npts().saturating_sub(1) as f64 * self.delta();
        self.starttime + TimeDelta::nanoseconds((span * 1e9).round() as i64)
    }

    /// Samples between `start` and `end`, both inclusive.
    ///
    /// Bounds snap to the nearest sample. Bounds beyond either end of the
    /// trace are clipped; a request that selects no sample at all is an error.
    pub fn slice(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<f64>> {
        if end < start {
            return Err(PairingError::InvalidArgument(format!(
                "slice end {} before start {}",
                end, start
            )));
        }
        if !(self.sampling_rate.is_finite() && self.sampling_rate > 0.0) {
            return Err(PairingError::InvalidArgument(format!(
                "sampling rate must be positive, got {}",
                self.sampling_rate
            )));
        }

        let npts = self.npts() as i64;
        let lead = (seconds_between(self.starttime, start) * self.sampling_rate).round() as i64;
        let tail = (seconds_between(end, self.endtime()) * self.sampling_rate).round() as i64;

        let lo = lead.max(0);
        let hi = npts - tail.max(0);

        if lo >= hi {
            return Err(PairingError::SliceOutOfRange {
                start: start.to_rfc3339(),
                end: end.to_rfc3339(),
                trace_start: self.starttime.to_rfc3339(),
                trace_end: self.endtime().to_rfc3339(),
            });
        }

        Ok(self.data[lo as usize..hi as usize].to_vec())
    }

    /// Slice followed by a Hann taper over `max_percentage` of the segment at each end.
    pub fn slice_tapered(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        max_percentage: f64,
    ) -> Result<Vec<f64>> {
        let mut segment = self.slice(start, end)?;
        taper_in_place(&mut segment, max_percentage);
        Ok(segment)
    }
}
