//! Hand-off of finished pairs to an external double-difference adjoint engine.

use std::collections::BTreeMap;

use crate::adjoint::source::{AdjointSource, Measurement};
use crate::data::channel::WindowName;
use crate::data::pair::Pair;
use crate::data::views::{lookup_window, ComponentWindows};
use crate::error::{PairingError, Result};

/// Measurement entry removed from every record before it is returned.
pub const STRIPPED_MEASUREMENT: &str = "ddt_w";

/// `(window_id_i, window_id_j)`
pub type PairKey = (WindowName, WindowName);

/// Waveforms keyed by station key `network.station`.
pub type Waveforms<W> = BTreeMap<String, W>;

/// Observed and synthetic waveforms of one side of a pair, with its window.
pub struct PairSide<'a, W> {
    pub observed: &'a W,
    pub synthetic: &'a W,
    pub window: Vec<(f64, f64)>,
}

/// External collaborator computing double-difference misfits.
///
/// Implementations report their own failures as [`PairingError::Engine`].
pub trait DoubleDifferenceEngine {
    type Waveform;

    fn adjoint_pair(
        &self,
        side_i: &PairSide<'_, Self::Waveform>,
        side_j: &PairSide<'_, Self::Waveform>,
    ) -> Result<(AdjointSource, AdjointSource)>;

    /// First measurement record of each side.
    fn measure_pair(
        &self,
        side_i: &PairSide<'_, Self::Waveform>,
        side_j: &PairSide<'_, Self::Waveform>,
    ) -> Result<(Measurement, Measurement)>;
}

fn waveform<'a, W>(waveforms: &'a Waveforms<W>, station: &str, kind: &str) -> Result<&'a W> {
    waveforms
        .get(station)
        .ok_or_else(|| PairingError::MissingWaveform(format!("{} data for {}", kind, station)))
}

fn resolve_sides<'a, W>(
    pair: &Pair,
    windows: &ComponentWindows,
    obsd: &'a Waveforms<W>,
    synt: &'a Waveforms<W>,
) -> Result<(PairSide<'a, W>, PairSide<'a, W>)> {
    let win_i = lookup_window(windows, &pair.window_id_i)?;
    let win_j = lookup_window(windows, &pair.window_id_j)?;
    let (sta_i, sta_j) = pair.station_names();

    let side_i = PairSide {
        observed: waveform(obsd, &sta_i, "observed")?,
        synthetic: waveform(synt, &sta_i, "synthetic")?,
        window: win_i.adjoint_window(),
    };
    let side_j = PairSide {
        observed: waveform(obsd, &sta_j, "observed")?,
        synthetic: waveform(synt, &sta_j, "synthetic")?,
        window: win_j.adjoint_window(),
    };
    Ok((side_i, side_j))
}

fn pair_key(pair: &Pair) -> PairKey {
    (pair.window_id_i.clone(), pair.window_id_j.clone())
}

/// Adjoint sources of both sides of `pair`, keyed by its window names.
pub fn calculate_adjoint_pair<E: DoubleDifferenceEngine>(
    pair: &Pair,
    engine: &E,
    windows: &ComponentWindows,
    obsd: &Waveforms<E::Waveform>,
    synt: &Waveforms<E::Waveform>,
) -> Result<BTreeMap<PairKey, (AdjointSource, AdjointSource)>> {
    let (side_i, side_j) = resolve_sides(pair, windows, obsd, synt)?;
    let sources = engine.adjoint_pair(&side_i, &side_j)?;
    Ok(BTreeMap::from([(pair_key(pair), sources)]))
}

/// Measurements of both sides of `pair` without the `ddt_w` entry.
pub fn calculate_measure_pair<E: DoubleDifferenceEngine>(
    pair: &Pair,
    engine: &E,
    windows: &ComponentWindows,
    obsd: &Waveforms<E::Waveform>,
    synt: &Waveforms<E::Waveform>,
) -> Result<BTreeMap<PairKey, (Measurement, Measurement)>> {
    let (side_i, side_j) = resolve_sides(pair, windows, obsd, synt)?;
    let (mut meas_i, mut meas_j) = engine.measure_pair(&side_i, &side_j)?;
    meas_i.remove(STRIPPED_MEASUREMENT);
    meas_j.remove(STRIPPED_MEASUREMENT);
    Ok(BTreeMap::from([(pair_key(pair), (meas_i, meas_j))]))
}
