use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use ddcore::data::location::Locations;
use ddcore::data::trace::Traces;
use ddcore::data::views::{ComponentPairs, ComponentWindows, StationWindows};
use ddcore::pairing::partition::WindowPartition;
use ddcore::pairing::reshape::to_station_view;

// --- generic JSON ---
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = BufReader::new(
        File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
    );
    serde_json::from_reader(f).with_context(|| format!("cannot parse {}", path.display()))
}

pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut f = BufWriter::new(
        File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
    );
    serde_json::to_writer_pretty(&mut f, value)
        .with_context(|| format!("cannot write {}", path.display()))?;
    f.flush()
        .with_context(|| format!("cannot flush {}", path.display()))
}

// --- typed views ---
pub fn load_station_windows(path: &Path) -> Result<StationWindows> {
    load_json(path)
}

pub fn load_component_windows(path: &Path) -> Result<ComponentWindows> {
    load_json(path)
}

pub fn load_locations(path: &Path) -> Result<Locations> {
    load_json(path)
}

pub fn load_traces(path: &Path) -> Result<Traces> {
    load_json(path)
}

pub fn load_pairs(path: &Path) -> Result<ComponentPairs> {
    load_json(path)
}

pub fn save_component_windows(path: &Path, windows: &ComponentWindows) -> Result<()> {
    save_json(path, windows)
}

pub fn save_pairs(path: &Path, pairs: &ComponentPairs) -> Result<()> {
    save_json(path, pairs)
}

/// Paired and single windows, both in the station-keyed layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionFile {
    pub paired: StationWindows,
    pub single: StationWindows,
}

impl From<&WindowPartition> for PartitionFile {
    fn from(p: &WindowPartition) -> Self {
        PartitionFile {
            paired: to_station_view(&p.paired),
            single: to_station_view(&p.single),
        }
    }
}

pub fn save_partition(path: &Path, partition: &WindowPartition) -> Result<()> {
    save_json(path, &PartitionFile::from(partition))
}
