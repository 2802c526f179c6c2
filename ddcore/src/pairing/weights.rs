use std::collections::HashMap;

use crate::data::channel::WindowName;
use crate::data::pair::Pair;
use crate::data::views::ComponentPairs;

/// Number of pairs each window takes part in.
pub fn pair_counts(pairs: &[Pair]) -> HashMap<&WindowName, usize> {
    let mut counts: HashMap<&WindowName, usize> = HashMap::new();
    for pair in pairs {
        *counts.entry(&pair.window_id_i).or_insert(0) += 1;
        *counts.entry(&pair.window_id_j).or_insert(0) += 1;
    }
    counts
}

/// Sets `weight_i` and `weight_j` of every pair, per component.
///
/// Both sides get `1 / (count[window_id_i] + 1)`, where `count` is the number
/// of pairs a window appears in within its component. The `j` side uses the
/// count of `window_id_i` as well.
pub fn assign_weights(pairs: &mut ComponentPairs) {
    for comp_pairs in pairs.values_mut() {
        let weights: Vec<f64> = {
            let counts = pair_counts(comp_pairs);
            comp_pairs
                .iter()
                .map(|p| 1.0 / (counts[&p.window_id_i] as f64 + 1.0))
                .collect()
        };

        for (pair, w) in comp_pairs.iter_mut().zip(weights) {
            pair.weight_i = Some(w);
            pair.weight_j = Some(w);
        }
    }
}
