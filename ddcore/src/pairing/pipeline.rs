//! End-to-end pairing: enumerate, filter stage by stage, weight.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::location::Locations;
use crate::data::trace::Traces;
use crate::data::views::{count_pairs, count_windows, ComponentPairs, ComponentWindows};
use crate::error::{PairingError, Result};
use crate::pairing::enumerate::all_pairs;
use crate::pairing::filter::{FilterInputs, FilterStage, PairFilter};
use crate::pairing::weights::assign_weights;

/// Default distance threshold in km.
pub const DEFAULT_CLOSENESS_THRESHOLD: f64 = 250.0;
/// Default cross-correlation threshold.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Configuration for one pairing run.
///
/// Stages run in list order; disabled stages are skipped. The default holds
/// distance, phase and similarity stages in that order, all disabled, so
/// every candidate pair survives.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairingConfig {
    pub stages: Vec<FilterStage>,
}

impl Default for PairingConfig {
    fn default() -> Self {
        PairingConfig {
            stages: vec![
                FilterStage::new(
                    PairFilter::Distance {
                        threshold_km: DEFAULT_CLOSENESS_THRESHOLD,
                    },
                    false,
                ),
                FilterStage::new(PairFilter::Phase { phases: Vec::new() }, false),
                FilterStage::new(
                    PairFilter::Similarity {
                        threshold: DEFAULT_SIMILARITY_THRESHOLD,
                    },
                    false,
                ),
            ],
        }
    }
}

impl PairingConfig {
    /// Stage list in the given order, every stage enabled.
    pub fn from_filters(filters: Vec<PairFilter>) -> Self {
        PairingConfig {
            stages: filters
                .into_iter()
                .map(|f| FilterStage::new(f, true))
                .collect(),
        }
    }

    /// Replaces the stage of the same kind as `filter` and switches it on.
    ///
    /// A kind not yet present is appended at the end.
    pub fn enable(mut self, filter: PairFilter) -> Self {
        match self.stages.iter_mut().find(|s| s.filter.key() == filter.key()) {
            Some(stage) => {
                stage.filter = filter;
                stage.enabled = true;
            }
            None => self.stages.push(FilterStage::new(filter, true)),
        }
        self
    }

    pub fn with_closeness(self, threshold_km: f64) -> Self {
        self.enable(PairFilter::Distance { threshold_km })
    }

    pub fn with_similarity(self, threshold: f64) -> Self {
        self.enable(PairFilter::Similarity { threshold })
    }

    pub fn with_phases(self, phases: Vec<String>) -> Self {
        self.enable(PairFilter::Phase { phases })
    }

    pub fn enabled_filters(&self) -> impl Iterator<Item = &PairFilter> {
        self.stages.iter().filter(|s| s.enabled).map(|s| &s.filter)
    }

    pub fn validate(&self) -> Result<()> {
        for filter in self.enabled_filters() {
            filter.validate()?;
        }
        Ok(())
    }
}

/// Auxiliary data for the distance and similarity stages.
#[derive(Clone, Copy, Debug, Default)]
pub struct PairingInputs<'a> {
    pub locations: Option<&'a Locations>,
    pub traces: Option<&'a Traces>,
}

/// Surviving pair count after one stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: String,
    pub pairs: usize,
}

/// Bookkeeping of one pairing run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PairingSummary {
    pub windows: usize,
    pub candidates: usize,
    pub stages: Vec<StageCount>,
    pub windows_sliced: usize,
}

impl PairingSummary {
    pub fn final_pairs(&self) -> usize {
        self.stages.last().map_or(self.candidates, |s| s.pairs)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PairingResult {
    pub pairs: ComponentPairs,
    pub summary: PairingSummary,
}

fn check_inputs(config: &PairingConfig, inputs: &PairingInputs<'_>) -> Result<()> {
    for filter in config.enabled_filters() {
        match filter {
            PairFilter::Distance { .. } if inputs.locations.is_none() => {
                return Err(PairingError::MissingInput(
                    "distance filter enabled without station locations".to_string(),
                ))
            }
            PairFilter::Similarity { .. } if inputs.traces.is_none() => {
                return Err(PairingError::MissingInput(
                    "similarity filter enabled without waveform traces".to_string(),
                ))
            }
            _ => {}
        }
    }
    Ok(())
}

/// Finds weighted double-difference pairs among component-keyed windows.
///
/// All 2-combinations per component are generated first, then reduced by each
/// enabled stage in order, and finally weighted.
///
/// # Errors
///
/// Precondition errors (empty window set, invalid thresholds, missing inputs
/// for an enabled stage) are raised before any work is done. Lookup and
/// slicing failures inside a stage abort the run.
pub fn find_pairs(
    windows: &ComponentWindows,
    inputs: PairingInputs<'_>,
    config: &PairingConfig,
) -> Result<PairingResult> {
    if windows.is_empty() {
        return Err(PairingError::EmptyWindowSet(
            "component window collection has no components".to_string(),
        ));
    }
    config.validate()?;
    check_inputs(config, &inputs)?;

    for (comp, comp_windows) in windows {
        if comp_windows.len() < 2 {
            debug!(component = %comp, windows = comp_windows.len(), "component cannot form pairs");
        }
    }

    let mut pairs = all_pairs(windows);
    let mut summary = PairingSummary {
        windows: count_windows(windows),
        candidates: count_pairs(&pairs),
        ..Default::default()
    };

    let mut filter_inputs = FilterInputs::new(windows, inputs.locations, inputs.traces);
    for filter in config.enabled_filters() {
        pairs = filter.apply(&mut filter_inputs, &pairs)?;
        summary.stages.push(StageCount {
            stage: filter.key().to_string(),
            pairs: count_pairs(&pairs),
        });
    }
    summary.windows_sliced = filter_inputs.sliced();

    assign_weights(&mut pairs);

    debug!(
        windows = summary.windows,
        candidates = summary.candidates,
        pairs = summary.final_pairs(),
        "pairing finished"
    );

    Ok(PairingResult { pairs, summary })
}
