use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PairingError, Result};

static CHANNEL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^.:\s]+)\.([^.:\s]+)\.([^.:\s]*)\.([^.:\s]+)$").expect("valid channel pattern")
});

static WINDOW_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:\s]+):(\d+)$").expect("valid window name pattern")
});

/// Ground-motion component, the last character of a channel code.
///
/// Pairing, weighting and partitioning never mix components.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Component(char);

impl Component {
    pub fn new(c: char) -> Self {
        Component(c)
    }

    pub fn as_char(&self) -> char {
        self.0
    }

    /// Rotated components share the sensor position of the vertical one.
    pub fn is_rotated(&self) -> bool {
        matches!(self.0, 'R' | 'T')
    }
}

impl Display for Component {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Component> for String {
    fn from(c: Component) -> Self {
        c.0.to_string()
    }
}

impl TryFrom<String> for Component {
    type Error = PairingError;

    fn try_from(value: String) -> Result<Self> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Component(c)),
            _ => Err(PairingError::InvalidArgument(format!(
                "component must be a single character, got {:?}",
                value
            ))),
        }
    }
}

/// Fully qualified channel identity `network.station.location.channel`.
///
/// The location code may be empty, as in `IU.KBL..BHZ`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ChannelId {
    pub network: String,
    pub station: String,
    pub location: String,
    pub channel: String,
}

impl ChannelId {
    pub fn new(network: &str, station: &str, location: &str, channel: &str) -> Self {
        ChannelId {
            network: network.to_string(),
            station: station.to_string(),
            location: location.to_string(),
            channel: channel.to_string(),
        }
    }

    /// `network.station`, the key two windows are compared on for same-station exclusion.
    pub fn station_key(&self) -> String {
        format!("{}.{}", self.network, self.station)
    }

    pub fn component(&self) -> Component {
        // the pattern guarantees a non-empty channel code
        Component(self.channel.chars().last().unwrap_or('?'))
    }

    /// The same channel with its component character replaced.
    pub fn with_component(&self, component: Component) -> ChannelId {
        let mut code: String = self.channel.clone();
        code.pop();
        code.push(component.as_char());
        ChannelId {
            channel: code,
            ..self.clone()
        }
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.network, self.station, self.location, self.channel)
    }
}

impl FromStr for ChannelId {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = CHANNEL_PATTERN
            .captures(s)
            .ok_or_else(|| PairingError::InvalidChannel(s.to_string()))?;
        Ok(ChannelId::new(&caps[1], &caps[2], &caps[3], &caps[4]))
    }
}

impl From<ChannelId> for String {
    fn from(c: ChannelId) -> Self {
        c.to_string()
    }
}

impl TryFrom<String> for ChannelId {
    type Error = PairingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Name of one window within a component group: `network.station.location.channel:ordinal`.
///
/// The ordinal is the window's position in its channel's list. Names order by
/// channel first and then numerically by ordinal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct WindowName {
    pub channel: ChannelId,
    pub ordinal: usize,
}

impl WindowName {
    pub fn new(channel: ChannelId, ordinal: usize) -> Self {
        WindowName { channel, ordinal }
    }

    pub fn station_key(&self) -> String {
        self.channel.station_key()
    }

    pub fn component(&self) -> Component {
        self.channel.component()
    }

    /// Splits the name into (station key, channel, ordinal).
    pub fn deconstruct(&self) -> (String, &ChannelId, usize) {
        (self.station_key(), &self.channel, self.ordinal)
    }
}

impl Display for WindowName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.channel, self.ordinal)
    }
}

impl FromStr for WindowName {
    type Err = PairingError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = WINDOW_NAME_PATTERN
            .captures(s)
            .ok_or_else(|| PairingError::InvalidWindowName(s.to_string()))?;
        let channel: ChannelId = caps[1]
            .parse()
            .map_err(|_| PairingError::InvalidWindowName(s.to_string()))?;
        let ordinal: usize = caps[2]
            .parse()
            .map_err(|_| PairingError::InvalidWindowName(s.to_string()))?;
        Ok(WindowName { channel, ordinal })
    }
}

impl From<WindowName> for String {
    fn from(w: WindowName) -> Self {
        w.to_string()
    }
}

impl TryFrom<String> for WindowName {
    type Error = PairingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
