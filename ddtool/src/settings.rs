use std::path::Path;

use anyhow::{Context, Result};

use ddcore::pairing::pipeline::PairingConfig;

use crate::io::load_json;

/// Stage switches given on the command line; each one enables its stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageOverrides {
    pub distance_km: Option<f64>,
    pub similarity: Option<f64>,
    pub phases: Option<Vec<String>>,
}

impl StageOverrides {
    pub fn apply(&self, config: PairingConfig) -> PairingConfig {
        let mut config = config;
        if let Some(km) = self.distance_km {
            config = config.with_closeness(km);
        }
        if let Some(phases) = &self.phases {
            config = config.with_phases(phases.clone());
        }
        if let Some(threshold) = self.similarity {
            config = config.with_similarity(threshold);
        }
        config
    }
}

/// Configuration file (or the default) with command-line overrides applied.
pub fn resolve_config(path: Option<&Path>, overrides: &StageOverrides) -> Result<PairingConfig> {
    let base = match path {
        Some(p) => load_json(p).context("loading pairing config")?,
        None => PairingConfig::default(),
    };
    let config = overrides.apply(base);
    config.validate().context("invalid pairing config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddcore::pairing::filter::PairFilter;
    use tempfile::tempdir;

    #[test]
    fn test_default_has_no_enabled_stage() {
        let config = resolve_config(None, &StageOverrides::default()).unwrap();
        assert_eq!(config.enabled_filters().count(), 0);
    }

    #[test]
    fn test_overrides_enable_stages_in_place() {
        let overrides = StageOverrides {
            distance_km: Some(80.0),
            similarity: Some(0.85),
            phases: None,
        };
        let config = resolve_config(None, &overrides).unwrap();
        let enabled: Vec<&PairFilter> = config.enabled_filters().collect();
        assert_eq!(
            enabled,
            vec![
                &PairFilter::Distance { threshold_km: 80.0 },
                &PairFilter::Similarity { threshold: 0.85 },
            ]
        );
    }

    #[test]
    fn test_file_then_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"stages": [
                {"enabled": true, "kind": "similarity", "threshold": 0.95},
                {"enabled": false, "kind": "distance", "threshold_km": 250.0}
            ]}"#,
        )
        .unwrap();

        let overrides = StageOverrides {
            phases: Some(vec!["P".to_string()]),
            ..Default::default()
        };
        let config = resolve_config(Some(&path), &overrides).unwrap();
        // file order is kept, the unknown phase stage is appended
        assert_eq!(config.stages.len(), 3);
        assert_eq!(config.stages[2].filter.key(), "paired_phase");
        assert_eq!(config.enabled_filters().count(), 2);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let overrides = StageOverrides {
            distance_km: Some(-1.0),
            ..Default::default()
        };
        assert!(resolve_config(None, &overrides).is_err());
    }
}
