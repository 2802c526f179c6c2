use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PairingError, Result};

/// One measurement record produced by an adjoint engine, keyed by quantity name.
pub type Measurement = BTreeMap<String, f64>;

/// Adjoint source of one channel as returned by an adjoint engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdjointSource {
    pub adj_src_type: String,
    pub misfit: f64,
    pub dt: f64,
    pub min_period: f64,
    pub max_period: f64,
    pub component: String,
    #[serde(default)]
    pub measurement: Vec<Measurement>,
    pub adjoint_source: Vec<f64>,
    pub network: String,
    pub station: String,
    pub location: String,
    pub starttime: DateTime<Utc>,
}

impl AdjointSource {
    /// Sum of two adjoint sources. Metadata and measurements come from `self`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the two time series differ in length.
    pub fn add(&self, other: &AdjointSource) -> Result<AdjointSource> {
        if self.adjoint_source.len() != other.adjoint_source.len() {
            return Err(PairingError::InvalidArgument(format!(
                "cannot add adjoint sources of {} and {} samples",
                self.adjoint_source.len(),
                other.adjoint_source.len()
            )));
        }

        Ok(AdjointSource {
            misfit: self.misfit + other.misfit,
            adjoint_source: self
                .adjoint_source
                .iter()
                .zip(&other.adjoint_source)
                .map(|(a, b)| a + b)
                .collect(),
            ..self.clone()
        })
    }

    /// Misfit and time series multiplied by `factor`.
    pub fn scale(&self, factor: f64) -> AdjointSource {
        AdjointSource {
            misfit: factor * self.misfit,
            adjoint_source: self.adjoint_source.iter().map(|x| factor * x).collect(),
            ..self.clone()
        }
    }

    /// `network.station`
    pub fn station_key(&self) -> String {
        format!("{}.{}", self.network, self.station)
    }
}
