use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::data::channel::WindowName;

/// Value a filter stage computed when it judged a pair.
#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    /// Great-circle station distance in km
    Distance(f64),
    /// Normalized cross-correlation ratio
    CcSimilarity(f64),
    /// First allowed phase both windows share
    PairedPhase(String),
}

impl Decision {
    /// Annotation key the decision is stored under.
    pub fn key(&self) -> &'static str {
        match self {
            Decision::Distance(_) => "distance",
            Decision::CcSimilarity(_) => "cc_similarity",
            Decision::PairedPhase(_) => "paired_phase",
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Distance(d) => write!(f, "{}={:.3}", self.key(), d),
            Decision::CcSimilarity(r) => write!(f, "{}={:.4}", self.key(), r),
            Decision::PairedPhase(p) => write!(f, "{}={}", self.key(), p),
        }
    }
}

/// Unordered association of two windows of one component group.
///
/// Annotations accumulate as the pair survives filter stages; weights are
/// filled in last.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub window_id_i: WindowName,
    pub window_id_j: WindowName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc_similarity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_i: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_j: Option<f64>,
}

impl Pair {
    pub fn new(window_id_i: WindowName, window_id_j: WindowName) -> Self {
        Pair {
            window_id_i,
            window_id_j,
            distance: None,
            cc_similarity: None,
            paired_phase: None,
            weight_i: None,
            weight_j: None,
        }
    }

    /// Station keys of both sides, in (i, j) order.
    pub fn station_names(&self) -> (String, String) {
        (self.window_id_i.station_key(), self.window_id_j.station_key())
    }

    pub fn is_same_station(&self) -> bool {
        self.window_id_i.channel.network == self.window_id_j.channel.network
            && self.window_id_i.channel.station == self.window_id_j.channel.station
    }

    pub fn contains(&self, name: &WindowName) -> bool {
        &self.window_id_i == name || &self.window_id_j == name
    }

    /// Copy of this pair carrying `decision` under its key.
    pub fn annotated(&self, decision: Decision) -> Pair {
        let mut pair = self.clone();
        match decision {
            Decision::Distance(d) => pair.distance = Some(d),
            Decision::CcSimilarity(r) => pair.cc_similarity = Some(r),
            Decision::PairedPhase(p) => pair.paired_phase = Some(p),
        }
        pair
    }

    /// True if both pairs name the same two windows, in either order.
    pub fn same_windows(&self, other: &Pair) -> bool {
        (self.window_id_i == other.window_id_i && self.window_id_j == other.window_id_j)
            || (self.window_id_i == other.window_id_j && self.window_id_j == other.window_id_i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> WindowName {
        s.parse().unwrap()
    }

    #[test]
    fn test_station_names_symmetric() {
        let a = Pair::new(name("AA.AAA.00.BHZ:0"), name("AA.BBB.00.BHZ:1"));
        let b = Pair::new(name("AA.BBB.00.BHZ:1"), name("AA.AAA.00.BHZ:0"));
        let (ai, aj) = a.station_names();
        let (bi, bj) = b.station_names();
        assert_eq!(ai, bj);
        assert_eq!(aj, bi);
        assert!(a.same_windows(&b));
    }

    #[test]
    fn test_same_station_across_channels() {
        let p = Pair::new(name("AA.AAA.00.BHZ:0"), name("AA.AAA.10.HHZ:3"));
        assert!(p.is_same_station());
        let q = Pair::new(name("AA.AAA.00.BHZ:0"), name("AB.AAA.00.BHZ:0"));
        assert!(!q.is_same_station());
    }

    #[test]
    fn test_annotated_keeps_previous_values() {
        let p = Pair::new(name("AA.AAA.00.BHZ:0"), name("AA.BBB.00.BHZ:0"))
            .annotated(Decision::Distance(42.0))
            .annotated(Decision::PairedPhase("P".to_string()));
        assert_eq!(p.distance, Some(42.0));
        assert_eq!(p.paired_phase.as_deref(), Some("P"));
        assert!(p.cc_similarity.is_none());
    }

    #[test]
    fn test_serialize_skips_missing_annotations() {
        let p = Pair::new(name("AA.AAA.00.BHZ:0"), name("AA.BBB.00.BHZ:0"))
            .annotated(Decision::Distance(91.0));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["window_id_i"], "AA.AAA.00.BHZ:0");
        assert_eq!(json["distance"], 91.0);
        assert!(json.get("cc_similarity").is_none());
        assert!(json.get("weight_i").is_none());
    }

    #[test]
    fn test_decision_keys() {
        assert_eq!(Decision::Distance(1.0).key(), "distance");
        assert_eq!(Decision::CcSimilarity(1.0).key(), "cc_similarity");
        assert_eq!(Decision::PairedPhase("S".into()).key(), "paired_phase");
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Distance(91.14159).to_string(), "distance=91.142");
        assert_eq!(Decision::CcSimilarity(0.99907).to_string(), "cc_similarity=0.9991");
        assert_eq!(Decision::PairedPhase("pP".into()).to_string(), "paired_phase=pP");
    }
}
