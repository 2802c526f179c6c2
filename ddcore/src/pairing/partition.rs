use std::collections::{BTreeMap, HashSet};

use crate::data::channel::WindowName;
use crate::data::views::{ComponentPairs, ComponentWindows};
use crate::error::{PairingError, Result};

/// Windows split by whether any surviving pair uses them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WindowPartition {
    pub paired: ComponentWindows,
    pub single: ComponentWindows,
}

impl WindowPartition {
    pub fn paired_count(&self) -> usize {
        self.paired.values().map(|w| w.len()).sum()
    }

    pub fn single_count(&self) -> usize {
        self.single.values().map(|w| w.len()).sum()
    }
}

/// Splits every component's windows into paired and single ones.
///
/// Each window lands in exactly one of the two views; both views carry every
/// component of `windows`, possibly empty.
///
/// # Errors
///
/// `MissingInput` if `pairs` has no entry for a component of `windows`.
pub fn partition(windows: &ComponentWindows, pairs: &ComponentPairs) -> Result<WindowPartition> {
    let mut out = WindowPartition::default();

    for (comp, comp_windows) in windows {
        let comp_pairs = pairs.get(comp).ok_or_else(|| {
            PairingError::MissingInput(format!("no pair list for component {}", comp))
        })?;

        let used: HashSet<&WindowName> = comp_pairs
            .iter()
            .flat_map(|p| [&p.window_id_i, &p.window_id_j])
            .collect();

        let paired = out.paired.entry(*comp).or_insert_with(BTreeMap::new);
        let single = out.single.entry(*comp).or_insert_with(BTreeMap::new);

        for (name, window) in comp_windows {
            if used.contains(name) {
                paired.insert(name.clone(), window.clone());
            } else {
                single.insert(name.clone(), window.clone());
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::channel::Component;
    use crate::data::pair::Pair;
    use crate::data::window::Window;
    use chrono::{TimeZone, Utc};

    fn window() -> Window {
        Window::new(
            Utc.timestamp_opt(0, 0).unwrap(),
            Utc.timestamp_opt(100, 0).unwrap(),
            0.0,
            100.0,
            Vec::new(),
        )
    }

    fn comp_win_data() -> ComponentWindows {
        let mut all = ComponentWindows::new();
        let z: BTreeMap<WindowName, Window> = ["AA.AAA.00.BHZ:0", "AA.AAA.00.BHZ:1", "AA.BBB.00.BHZ:0"]
            .iter()
            .map(|n| (n.parse::<WindowName>().unwrap(), window()))
            .collect();
        let n: BTreeMap<WindowName, Window> = [("AA.AAA.00.BHN:0".parse::<WindowName>().unwrap(), window())]
            .into_iter()
            .collect();
        all.insert(Component::new('Z'), z);
        all.insert(Component::new('E'), BTreeMap::new());
        all.insert(Component::new('N'), n);
        all
    }

    fn pairs() -> ComponentPairs {
        let mut pairs = ComponentPairs::new();
        pairs.insert(
            Component::new('Z'),
            vec![Pair::new(
                "AA.AAA.00.BHZ:0".parse().unwrap(),
                "AA.BBB.00.BHZ:0".parse().unwrap(),
            )],
        );
        pairs.insert(Component::new('E'), vec![]);
        pairs.insert(Component::new('N'), vec![]);
        pairs
    }

    #[test]
    fn test_filter_paired_windows() {
        let out = partition(&comp_win_data(), &pairs()).unwrap();

        assert_eq!(out.paired[&Component::new('Z')].len(), 2);
        assert_eq!(out.paired[&Component::new('E')].len(), 0);
        assert_eq!(out.paired[&Component::new('N')].len(), 0);

        assert_eq!(out.single[&Component::new('Z')].len(), 1);
        assert_eq!(out.single[&Component::new('E')].len(), 0);
        assert_eq!(out.single[&Component::new('N')].len(), 1);
    }

    #[test]
    fn test_partition_total_and_disjoint() {
        let windows = comp_win_data();
        let out = partition(&windows, &pairs()).unwrap();

        let z = Component::new('Z');
        assert_eq!(out.paired[&z].len() + out.single[&z].len(), 3);
        assert!(out.paired[&z].keys().all(|k| !out.single[&z].contains_key(k)));
        assert_eq!(out.paired_count() + out.single_count(), 4);

        let single_name: WindowName = "AA.AAA.00.BHZ:1".parse().unwrap();
        assert!(out.single[&z].contains_key(&single_name));
    }

    #[test]
    fn test_partition_missing_component() {
        let mut p = pairs();
        p.remove(&Component::new('N'));
        assert!(matches!(
            partition(&comp_win_data(), &p),
            Err(PairingError::MissingInput(_))
        ));
    }
}
