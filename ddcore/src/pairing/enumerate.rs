use itertools::Itertools;

use crate::data::pair::Pair;
use crate::data::views::{ComponentPairs, ComponentWindows};

/// Every 2-combination of window names within each component.
///
/// No filtering happens here; same-station combinations are included and
/// removed by the filter stages. Every component of `windows` gets an entry,
/// possibly empty.
pub fn all_pairs(windows: &ComponentWindows) -> ComponentPairs {
    windows
        .iter()
        .map(|(comp, comp_windows)| {
            let pairs = comp_windows
                .keys()
                .tuple_combinations()
                .map(|(i, j)| Pair::new(i.clone(), j.clone()))
                .collect::<Vec<_>>();
            (*comp, pairs)
        })
        .collect()
}
