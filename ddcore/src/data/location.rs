use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::channel::{ChannelId, Component};
use crate::error::{PairingError, Result};

/// Sensor coordinates of one channel, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl StationLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        StationLocation { latitude, longitude }
    }
}

/// Station metadata keyed by channel.
pub type Locations = BTreeMap<ChannelId, StationLocation>;

/// Coordinates for `channel`.
///
/// The exact channel is looked up first. A rotated (R/T) channel without an
/// entry of its own resolves to the vertical channel of the same instrument.
pub fn lookup_location(locations: &Locations, channel: &ChannelId) -> Result<StationLocation> {
    if let Some(loc) = locations.get(channel) {
        return Ok(*loc);
    }
    if !channel.component().is_rotated() {
        return Err(PairingError::MissingLocation(channel.to_string()));
    }

    let vertical = channel.with_component(Component::new('Z'));
    locations
        .get(&vertical)
        .copied()
        .ok_or_else(|| PairingError::MissingLocation(vertical.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations() -> Locations {
        let mut locs = Locations::new();
        locs.insert("IU.KBL..BHZ".parse().unwrap(), StationLocation::new(34.5, 69.0));
        locs.insert("IU.KBL..BHN".parse().unwrap(), StationLocation::new(34.6, 69.1));
        locs
    }

    #[test]
    fn test_direct_lookup() {
        let loc = lookup_location(&locations(), &"IU.KBL..BHN".parse().unwrap()).unwrap();
        assert_eq!(loc.latitude, 34.6);
    }

    #[test]
    fn test_rotated_uses_vertical() {
        let locs = locations();
        let r = lookup_location(&locs, &"IU.KBL..BHR".parse().unwrap()).unwrap();
        let t = lookup_location(&locs, &"IU.KBL..BHT".parse().unwrap()).unwrap();
        assert_eq!(r, StationLocation::new(34.5, 69.0));
        assert_eq!(r, t);
    }

    #[test]
    fn test_rotated_entry_of_its_own() {
        let mut locs = Locations::new();
        locs.insert("XX.S1..HHR".parse().unwrap(), StationLocation::new(10.0, 20.0));
        let loc = lookup_location(&locs, &"XX.S1..HHR".parse().unwrap()).unwrap();
        assert_eq!(loc, StationLocation::new(10.0, 20.0));

        // exact entry wins over the vertical one
        locs.insert("XX.S1..HHZ".parse().unwrap(), StationLocation::new(11.0, 21.0));
        let loc = lookup_location(&locs, &"XX.S1..HHR".parse().unwrap()).unwrap();
        assert_eq!(loc, StationLocation::new(10.0, 20.0));
        // T has no entry and falls back to Z
        let loc = lookup_location(&locs, &"XX.S1..HHT".parse().unwrap()).unwrap();
        assert_eq!(loc, StationLocation::new(11.0, 21.0));
    }

    #[test]
    fn test_rotated_missing_names_vertical() {
        let err = lookup_location(&locations(), &"IU.ANMO..BHT".parse().unwrap()).unwrap_err();
        assert_eq!(err, PairingError::MissingLocation("IU.ANMO..BHZ".to_string()));
    }

    #[test]
    fn test_missing_location() {
        let err = lookup_location(&locations(), &"IU.ANMO.00.BHZ".parse().unwrap()).unwrap_err();
        assert_eq!(err, PairingError::MissingLocation("IU.ANMO.00.BHZ".to_string()));
    }
}
