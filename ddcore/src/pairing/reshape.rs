//! Conversions between the station-keyed and component-keyed window views.

use std::collections::BTreeMap;

use tracing::debug;

use crate::data::channel::WindowName;
use crate::data::views::{count_windows, ComponentWindows, StationWindows};
use crate::error::{PairingError, Result};

/// Flattens `station -> channel -> [window]` into `component -> name -> window`.
///
/// Each window is named `channel:index` after its position in the channel's
/// list. A channel registers its component even when its list is empty, so
/// every component seen in the input has an entry.
///
/// # Errors
///
/// `EmptyWindowSet` for an input without stations, `InvalidArgument` if two
/// windows end up with the same name.
pub fn to_component_view(station_windows: &StationWindows) -> Result<ComponentWindows> {
    if station_windows.is_empty() {
        return Err(PairingError::EmptyWindowSet(
            "station window collection has no stations".to_string(),
        ));
    }

    let mut all_windows = ComponentWindows::new();

    for channels in station_windows.values() {
        for (channel, windows) in channels {
            let group = all_windows.entry(channel.component()).or_default();
            for (i, window) in windows.iter().enumerate() {
                let name = WindowName::new(channel.clone(), i);
                if group.contains_key(&name) {
                    return Err(PairingError::InvalidArgument(format!(
                        "window {} appears under more than one station",
                        name
                    )));
                }
                group.insert(name, window.clone());
            }
        }
    }

    debug!(
        stations = station_windows.len(),
        components = all_windows.len(),
        windows = count_windows(&all_windows),
        "reshaped windows by component"
    );

    Ok(all_windows)
}

/// Regroups `component -> name -> window` into `station -> channel -> [window]`.
///
/// Window lists come out in ordinal order, so a round trip through
/// [`to_component_view`] reproduces the original lists.
pub fn to_station_view(component_windows: &ComponentWindows) -> StationWindows {
    let mut windows_data = StationWindows::new();

    for comp_windows in component_windows.values() {
        // names iterate by (channel, ordinal)
        for (name, window) in comp_windows {
            windows_data
                .entry(name.station_key())
                .or_insert_with(BTreeMap::new)
                .entry(name.channel.clone())
                .or_default()
                .push(window.clone());
        }
    }

    windows_data
}
