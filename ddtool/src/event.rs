//! One event directory in, pairs and partition out.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use ddcore::data::location::Locations;
use ddcore::data::trace::Traces;
use ddcore::data::views::{ComponentPairs, StationWindows};
use ddcore::pairing::partition::{partition, WindowPartition};
use ddcore::pairing::pipeline::{find_pairs, PairingConfig, PairingInputs, PairingSummary};
use ddcore::pairing::reshape::to_component_view;

use crate::io::{load_locations, load_station_windows, load_traces, save_json, save_pairs, save_partition};

pub const WINDOWS_FILE: &str = "windows.json";
pub const LOCATIONS_FILE: &str = "locations.json";
pub const TRACES_FILE: &str = "traces.json";

pub const PAIRS_FILE: &str = "pairs.json";
pub const PARTITION_FILE: &str = "partition.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Everything the pipeline reads for one event.
#[derive(Debug, Clone, Default)]
pub struct EventInputs {
    pub windows: StationWindows,
    pub locations: Option<Locations>,
    pub traces: Option<Traces>,
}

impl EventInputs {
    /// Reads `windows.json` and, when present, `locations.json` and `traces.json`.
    pub fn load(dir: &Path) -> Result<Self> {
        let windows = load_station_windows(&dir.join(WINDOWS_FILE))?;
        let optional = |name: &str| {
            let path = dir.join(name);
            path.is_file().then_some(path)
        };
        let locations = optional(LOCATIONS_FILE)
            .map(|p| load_locations(&p))
            .transpose()?;
        let traces = optional(TRACES_FILE).map(|p| load_traces(&p)).transpose()?;
        Ok(EventInputs {
            windows,
            locations,
            traces,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventOutcome {
    pub pairs: ComponentPairs,
    pub partition: WindowPartition,
    pub summary: PairingSummary,
}

/// Reshapes, pairs and partitions the windows of one event.
pub fn process_event(inputs: &EventInputs, config: &PairingConfig) -> Result<EventOutcome> {
    let windows = to_component_view(&inputs.windows).context("reshaping windows")?;
    let result = find_pairs(
        &windows,
        PairingInputs {
            locations: inputs.locations.as_ref(),
            traces: inputs.traces.as_ref(),
        },
        config,
    )
    .context("pairing windows")?;
    let partition = partition(&windows, &result.pairs).context("partitioning windows")?;

    Ok(EventOutcome {
        pairs: result.pairs,
        partition,
        summary: result.summary,
    })
}

/// Writes pairs, partition and summary into `dir`, creating it if needed.
pub fn write_outcome(dir: &Path, outcome: &EventOutcome) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;
    save_pairs(&dir.join(PAIRS_FILE), &outcome.pairs)?;
    save_partition(&dir.join(PARTITION_FILE), &outcome.partition)?;
    save_json(&dir.join(SUMMARY_FILE), &outcome.summary)
}

/// Sub-directories of `events_dir` that hold a windows file, sorted by name.
pub fn find_event_dirs(events_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(events_dir).with_context(|| format!("cannot list {}", events_dir.display()))? {
        let path = entry?.path();
        if path.is_dir() && path.join(WINDOWS_FILE).is_file() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn event_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

/// Outcome of one event in a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventReport {
    pub event: String,
    pub pairs: Option<usize>,
    pub error: Option<String>,
}

/// Loads, processes and writes one event directory.
pub fn run_event(event_dir: &Path, output_dir: &Path, config: &PairingConfig) -> Result<PairingSummary> {
    let inputs = EventInputs::load(event_dir)?;
    let outcome = process_event(&inputs, config)?;
    write_outcome(output_dir, &outcome)?;
    Ok(outcome.summary)
}

/// Runs every event under `events_dir` independently and in parallel.
///
/// A failing event is reported and does not stop the others. The reports come
/// back in event-name order.
pub fn run_batch(
    events_dir: &Path,
    output_dir: &Path,
    config: &PairingConfig,
    num_threads: usize,
) -> Result<Vec<EventReport>> {
    let event_dirs = find_event_dirs(events_dir)?;
    info!(events = event_dirs.len(), dir = %events_dir.display(), "starting batch");

    let thread_pool = ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .context("building thread pool")?;

    let reports: Vec<EventReport> = thread_pool.install(|| {
        event_dirs
            .par_iter()
            .map(|dir| {
                let event = event_name(dir);
                match run_event(dir, &output_dir.join(&event), config) {
                    Ok(summary) => {
                        info!(
                            event = %event,
                            windows = summary.windows,
                            candidates = summary.candidates,
                            pairs = summary.final_pairs(),
                            "event paired"
                        );
                        EventReport {
                            event,
                            pairs: Some(summary.final_pairs()),
                            error: None,
                        }
                    }
                    Err(e) => {
                        let error = format!("{:#}", e);
                        warn!(event = %event, error = %error, "event failed");
                        EventReport {
                            event,
                            pairs: None,
                            error: Some(error),
                        }
                    }
                }
            })
            .collect()
    });

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ddcore::data::channel::{ChannelId, Component};
    use ddcore::data::location::StationLocation;
    use ddcore::data::window::{PhaseArrival, Window};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn window(start: i64, end: i64) -> Window {
        Window::new(
            Utc.timestamp_opt(start, 0).unwrap(),
            Utc.timestamp_opt(end, 0).unwrap(),
            start as f64,
            end as f64,
            vec![PhaseArrival::new("P")],
        )
    }

    fn chan(s: &str) -> ChannelId {
        s.parse().unwrap()
    }

    fn inputs() -> EventInputs {
        let mut windows = StationWindows::new();
        windows.insert(
            "AA.AAA".to_string(),
            BTreeMap::from([(chan("AA.AAA.00.BHZ"), vec![window(5, 15), window(55, 65)])]),
        );
        windows.insert(
            "AA.BBB".to_string(),
            BTreeMap::from([(chan("AA.BBB.00.BHZ"), vec![window(5, 15)])]),
        );
        windows.insert(
            "AA.CCC".to_string(),
            BTreeMap::from([(chan("AA.CCC.00.BHZ"), vec![window(55, 65)])]),
        );

        let locations = Locations::from([
            (chan("AA.AAA.00.BHZ"), StationLocation::new(41.00892, 28.97644)),
            (chan("AA.BBB.00.BHZ"), StationLocation::new(40.19041, 29.06158)),
            (chan("AA.CCC.00.BHZ"), StationLocation::new(40.07179, 29.50928)),
        ]);

        EventInputs {
            windows,
            locations: Some(locations),
            traces: None,
        }
    }

    #[test]
    fn test_process_event_distance_only() {
        let config = PairingConfig::default().with_closeness(100.0);
        let outcome = process_event(&inputs(), &config).unwrap();

        let z = Component::new('Z');
        assert_eq!(outcome.pairs[&z].len(), 3);
        assert_eq!(outcome.summary.candidates, 6);
        // every window is used by some close pair
        assert_eq!(outcome.partition.paired[&z].len(), 4);
        assert!(outcome.partition.single[&z].is_empty());
    }

    #[test]
    fn test_process_event_missing_traces() {
        let config = PairingConfig::default().with_similarity(0.9);
        let err = process_event(&inputs(), &config).unwrap_err();
        assert!(format!("{:#}", err).contains("pairing windows"));
    }

    #[test]
    fn test_event_dir_round_trip() {
        let root = tempdir().unwrap();
        let event_dir = root.path().join("event_a");
        fs::create_dir_all(&event_dir).unwrap();
        let data = inputs();
        save_json(&event_dir.join(WINDOWS_FILE), &data.windows).unwrap();
        save_json(&event_dir.join(LOCATIONS_FILE), data.locations.as_ref().unwrap()).unwrap();

        let loaded = EventInputs::load(&event_dir).unwrap();
        assert_eq!(loaded.windows, data.windows);
        assert_eq!(loaded.locations, data.locations);
        assert!(loaded.traces.is_none());

        let out_dir = root.path().join("out");
        let summary = run_event(
            &event_dir,
            &out_dir,
            &PairingConfig::default().with_closeness(100.0),
        )
        .unwrap();
        assert_eq!(summary.final_pairs(), 3);
        assert!(out_dir.join(PAIRS_FILE).is_file());
        assert!(out_dir.join(PARTITION_FILE).is_file());
        assert!(out_dir.join(SUMMARY_FILE).is_file());
    }

    #[test]
    fn test_run_batch_isolates_failures() {
        let root = tempdir().unwrap();
        let events = root.path().join("events");
        let data = inputs();

        for name in ["ev1", "ev2"] {
            let dir = events.join(name);
            fs::create_dir_all(&dir).unwrap();
            save_json(&dir.join(WINDOWS_FILE), &data.windows).unwrap();
            save_json(&dir.join(LOCATIONS_FILE), data.locations.as_ref().unwrap()).unwrap();
        }
        // no locations: the distance stage cannot run
        let broken = events.join("ev0");
        fs::create_dir_all(&broken).unwrap();
        save_json(&broken.join(WINDOWS_FILE), &data.windows).unwrap();
        // not an event
        fs::create_dir_all(events.join("notes")).unwrap();

        let out = root.path().join("out");
        let reports = run_batch(&events, &out, &PairingConfig::default().with_closeness(100.0), 2).unwrap();

        let names: Vec<&str> = reports.iter().map(|r| r.event.as_str()).collect();
        assert_eq!(names, vec!["ev0", "ev1", "ev2"]);
        assert!(reports[0].error.is_some());
        assert_eq!(reports[1].pairs, Some(3));
        assert_eq!(reports[2].pairs, Some(3));
        assert!(out.join("ev1").join(PAIRS_FILE).is_file());
        assert!(!out.join("ev0").exists());
    }
}
