//! Fixed-shape collections the pairing pipeline passes around.

use std::collections::BTreeMap;

use crate::data::channel::{ChannelId, Component, WindowName};
use crate::data::pair::Pair;
use crate::data::window::Window;
use crate::error::{PairingError, Result};

/// `station key -> channel -> windows`, as produced by the window picker.
pub type StationWindows = BTreeMap<String, BTreeMap<ChannelId, Vec<Window>>>;

/// `component -> window name -> window`.
pub type ComponentWindows = BTreeMap<Component, BTreeMap<WindowName, Window>>;

/// `component -> surviving pairs`.
pub type ComponentPairs = BTreeMap<Component, Vec<Pair>>;

/// Total number of windows over all components.
pub fn count_windows(windows: &ComponentWindows) -> usize {
    windows.values().map(|w| w.len()).sum()
}

/// Total number of pairs over all components.
pub fn count_pairs(pairs: &ComponentPairs) -> usize {
    pairs.values().map(|p| p.len()).sum()
}

/// The window named `name`, found in its component group.
pub fn lookup_window<'w>(windows: &'w ComponentWindows, name: &WindowName) -> Result<&'w Window> {
    windows
        .get(&name.component())
        .and_then(|group| group.get(name))
        .ok_or_else(|| PairingError::MissingWindow(name.to_string()))
}
