//! Pair filter stages.
//!
//! Every stage consumes the pairs surviving the previous stages and keeps the
//! ones its decision function accepts, annotated with the decision value.
//! Same-station pairs are dropped by every stage before its decision function
//! runs.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::algorithm::correlation::cc_ratio;
use crate::algorithm::geodesy::distance_km;
use crate::data::channel::WindowName;
use crate::data::location::{lookup_location, Locations};
use crate::data::pair::{Decision, Pair};
use crate::data::trace::Traces;
use crate::data::views::{count_pairs, lookup_window, ComponentPairs, ComponentWindows};
use crate::error::{PairingError, Result};
use crate::pairing::slicer::{SegmentSource, WindowSlicer};

// ---------------------------------------------------------------------------
// Core reduction
// ---------------------------------------------------------------------------

/// A pair can only be judged if its windows belong to different stations.
#[inline]
pub fn is_candidate(pair: &Pair) -> bool {
    !pair.is_same_station()
}

/// Keeps the pairs `decide` accepts, attaching the decision value to each copy.
///
/// `decide` sees the two window names and returns the decision value together
/// with the keep flag. The first error aborts the stage.
pub fn reduce_pairs<F>(stage: &str, old_pairs: &ComponentPairs, mut decide: F) -> Result<ComponentPairs>
where
    F: FnMut(&WindowName, &WindowName) -> Result<(Decision, bool)>,
{
    let mut pairs = ComponentPairs::new();

    for (comp, comp_pairs) in old_pairs {
        let kept = pairs.entry(*comp).or_insert_with(Vec::new);
        for pair in comp_pairs.iter().filter(|p| is_candidate(p)) {
            let (value, keep) = decide(&pair.window_id_i, &pair.window_id_j)?;
            trace!(
                stage,
                i = %pair.window_id_i,
                j = %pair.window_id_j,
                decision = %value,
                keep,
                "judged pair"
            );
            if keep {
                kept.push(pair.annotated(value));
            }
        }
    }

    debug!(
        stage,
        before = count_pairs(old_pairs),
        after = count_pairs(&pairs),
        "filtered pairs"
    );

    Ok(pairs)
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Keeps pairs whose stations are strictly closer than `threshold` km.
pub fn close_pairs(locations: &Locations, threshold: f64, old_pairs: &ComponentPairs) -> Result<ComponentPairs> {
    reduce_pairs("distance", old_pairs, |i, j| {
        let loc_i = lookup_location(locations, &i.channel)?;
        let loc_j = lookup_location(locations, &j.channel)?;
        let distance = distance_km(
            loc_i.latitude,
            loc_i.longitude,
            loc_j.latitude,
            loc_j.longitude,
        );
        Ok((Decision::Distance(distance), distance < threshold))
    })
}

/// Keeps pairs whose segments correlate with `|ratio| > threshold`.
///
/// Segments without energy have no defined ratio; such pairs are reported
/// with a ratio of 0 and dropped.
pub fn similar_pairs<S: SegmentSource>(
    data: &mut S,
    threshold: f64,
    old_pairs: &ComponentPairs,
) -> Result<ComponentPairs> {
    reduce_pairs("cc_similarity", old_pairs, |i, j| {
        let (a, b) = data.pair_segments(i, j)?;
        Ok(match cc_ratio(a, b) {
            Some(ratio) => (Decision::CcSimilarity(ratio), ratio.abs() > threshold),
            None => (Decision::CcSimilarity(0.0), false),
        })
    })
}

/// Keeps pairs sharing at least one phase of `phases`.
///
/// `phases` is scanned in order and the first phase present in both windows
/// is recorded.
pub fn phase_pairs(windows: &ComponentWindows, phases: &[String], old_pairs: &ComponentPairs) -> Result<ComponentPairs> {
    reduce_pairs("paired_phase", old_pairs, |i, j| {
        let win_i = lookup_window(windows, i)?;
        let win_j = lookup_window(windows, j)?;
        let shared = phases
            .iter()
            .find(|phase| win_i.has_phase(phase) && win_j.has_phase(phase));
        Ok(match shared {
            Some(phase) => (Decision::PairedPhase(phase.clone()), true),
            None => (Decision::PairedPhase(String::new()), false),
        })
    })
}

// ---------------------------------------------------------------------------
// Stage descriptors
// ---------------------------------------------------------------------------

/// One pairing criterion with its threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairFilter {
    /// Station distance below `threshold_km`
    Distance { threshold_km: f64 },
    /// Absolute cc ratio above `threshold`
    Similarity { threshold: f64 },
    /// At least one shared phase out of `phases`
    Phase { phases: Vec<String> },
}

impl PairFilter {
    /// Annotation key of the decision values this filter stores.
    pub fn key(&self) -> &'static str {
        match self {
            PairFilter::Distance { .. } => "distance",
            PairFilter::Similarity { .. } => "cc_similarity",
            PairFilter::Phase { .. } => "paired_phase",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            PairFilter::Distance { threshold_km } if !threshold_km.is_finite() || *threshold_km < 0.0 => {
                Err(PairingError::InvalidArgument(format!(
                    "distance threshold must be a non-negative number of km, got {}",
                    threshold_km
                )))
            }
            PairFilter::Similarity { threshold } if !threshold.is_finite() => Err(
                PairingError::InvalidArgument(format!("similarity threshold must be finite, got {}", threshold)),
            ),
            _ => Ok(()),
        }
    }

    /// Runs this filter over `pairs`.
    ///
    /// # Errors
    ///
    /// `MissingInput` when the auxiliary data the filter needs was not
    /// supplied, otherwise whatever the decision function raises.
    pub fn apply(&self, inputs: &mut FilterInputs<'_>, pairs: &ComponentPairs) -> Result<ComponentPairs> {
        match self {
            PairFilter::Distance { threshold_km } => {
                let locations = inputs.locations.ok_or_else(|| {
                    PairingError::MissingInput("distance filter needs station locations".to_string())
                })?;
                close_pairs(locations, *threshold_km, pairs)
            }
            PairFilter::Similarity { threshold } => {
                let slicer = inputs.slicer.as_mut().ok_or_else(|| {
                    PairingError::MissingInput("similarity filter needs waveform traces".to_string())
                })?;
                similar_pairs(slicer, *threshold, pairs)
            }
            PairFilter::Phase { phases } => phase_pairs(inputs.windows, phases, pairs),
        }
    }
}

/// A filter together with its on/off switch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterStage {
    pub enabled: bool,
    #[serde(flatten)]
    pub filter: PairFilter,
}

impl FilterStage {
    pub fn new(filter: PairFilter, enabled: bool) -> Self {
        FilterStage { enabled, filter }
    }
}

/// Auxiliary data the stages draw from during one pairing run.
///
/// Window segments sliced for the similarity stage are cached for the
/// lifetime of this value.
pub struct FilterInputs<'a> {
    pub windows: &'a ComponentWindows,
    pub locations: Option<&'a Locations>,
    slicer: Option<WindowSlicer<'a>>,
}

impl<'a> FilterInputs<'a> {
    pub fn new(
        windows: &'a ComponentWindows,
        locations: Option<&'a Locations>,
        traces: Option<&'a Traces>,
    ) -> Self {
        FilterInputs {
            windows,
            locations,
            slicer: traces.map(|t| WindowSlicer::new(t, windows)),
        }
    }

    /// Number of windows sliced so far.
    pub fn sliced(&self) -> usize {
        self.slicer.as_ref().map_or(0, |s| s.sliced())
    }
}
