//! Parameter table, value typing and validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ConfigureError;

/// Sample rates accepted for `driver/rate`.
const SAMPLE_RATES: &[u32] = &[22050, 44100, 48000, 88200, 96000, 176_400, 192_000];

/// Frames/period range for `driver/period` (powers of two only).
const PERIOD_RANGE: std::ops::RangeInclusive<u32> = 16..=4096;

/// Periods/buffer range for `driver/nperiods`.
const NPERIODS_RANGE: std::ops::RangeInclusive<u32> = 2..=8;

/// Realtime priority range; 0 disables realtime priority.
const PRIORITY_RANGE: std::ops::RangeInclusive<u32> = 10..=89;

const MIDI_DRIVERS: &[&str] = &["seq", "raw", "none"];

/// Type of a parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    Uint,
    String,
    Bool,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint => write!(f, "unsigned integer"),
            Self::String => write!(f, "string"),
            Self::Bool => write!(f, "boolean"),
        }
    }
}

/// A typed parameter value as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Uint(u32),
    Str(String),
}

impl ParamValue {
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::Bool(_) => ParamKind::Bool,
            Self::Uint(_) => ParamKind::Uint,
            Self::Str(_) => ParamKind::String,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v:?}"),
        }
    }
}

/// Result of reading one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterValue {
    /// Whether the variable is present and non-empty in the defaults file.
    pub is_set: bool,
    pub default: ParamValue,
    /// Effective value (the default when not set).
    pub value: ParamValue,
}

/// Allowed values for a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraint {
    /// Only the listed values are accepted.
    pub is_strict: bool,
    /// The list is a suggestion generated without consulting the device.
    pub is_fake: bool,
    pub values: Vec<ParamValue>,
}

impl Constraint {
    const fn open() -> Self {
        Self {
            is_strict: false,
            is_fake: false,
            values: Vec::new(),
        }
    }

    fn strict(values: Vec<ParamValue>) -> Self {
        Self {
            is_strict: true,
            is_fake: false,
            values,
        }
    }
}

/// Mapping of one parameter path onto the defaults file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub group: &'static str,
    pub name: &'static str,
    /// Shell variable backing the parameter; `None` for fixed values.
    pub variable: Option<&'static str>,
    pub kind: ParamKind,
    pub default: &'static str,
}

/// Complete parameter mapping table.
pub const PARAMETERS: &[ParamSpec] = &[
    // Driver parameters
    ParamSpec::file("driver", "rate", "JACKD_SR", ParamKind::Uint, "48000"),
    ParamSpec::file("driver", "period", "JACKD_PERIOD", ParamKind::Uint, "256"),
    ParamSpec::file("driver", "nperiods", "JACKD_NPERIODS", ParamKind::Uint, "3"),
    ParamSpec::file("driver", "device", "JACKD_DEVICE", ParamKind::String, ""),
    ParamSpec::file("driver", "midi-driver", "JACKD_MIDI", ParamKind::String, "seq"),
    // Engine parameters
    ParamSpec::fixed("engine", "driver", ParamKind::String, "alsa"),
    ParamSpec::fixed("engine", "realtime", ParamKind::Bool, "true"),
    ParamSpec::file(
        "engine",
        "realtime-priority",
        "JACKD_PRIORITY",
        ParamKind::Uint,
        "70",
    ),
    ParamSpec::fixed("engine", "port-max", ParamKind::Uint, "256"),
    ParamSpec::fixed("engine", "sync", ParamKind::Bool, "false"),
];

/// Find a parameter by its `[group, name]` path.
pub fn find_param<S: AsRef<str>>(path: &[S]) -> Option<&'static ParamSpec> {
    let [group, name] = path else {
        return None;
    };
    PARAMETERS
        .iter()
        .find(|spec| spec.group == group.as_ref() && spec.name == name.as_ref())
}

impl ParamSpec {
    const fn file(
        group: &'static str,
        name: &'static str,
        variable: &'static str,
        kind: ParamKind,
        default: &'static str,
    ) -> Self {
        Self {
            group,
            name,
            variable: Some(variable),
            kind,
            default,
        }
    }

    const fn fixed(
        group: &'static str,
        name: &'static str,
        kind: ParamKind,
        default: &'static str,
    ) -> Self {
        Self {
            group,
            name,
            variable: None,
            kind,
            default,
        }
    }

    /// `group/name`, for messages.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}/{}", self.group, self.name)
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.variable.is_none()
    }

    /// Whether the allowed values come from the installed sound cards.
    #[must_use]
    pub fn is_device(&self) -> bool {
        self.variable == Some("JACKD_DEVICE")
    }

    #[must_use]
    pub fn default_value(&self) -> ParamValue {
        self.parse_raw(self.default)
            .unwrap_or_else(|| ParamValue::Str(self.default.to_string()))
    }

    fn parse_raw(&self, raw: &str) -> Option<ParamValue> {
        match self.kind {
            ParamKind::Uint => raw.trim().parse().ok().map(ParamValue::Uint),
            ParamKind::String => Some(ParamValue::Str(raw.to_string())),
            ParamKind::Bool => {
                let raw = raw.trim();
                let truthy = raw.eq_ignore_ascii_case("true")
                    || raw.eq_ignore_ascii_case("yes")
                    || raw.parse::<i64>().is_ok_and(|n| n != 0);
                Some(ParamValue::Bool(truthy))
            }
        }
    }

    /// Interpret the raw stored value (if any) for this parameter.
    ///
    /// Read-only parameters always report their fixed value as set.
    /// Unparseable stored values fall back to the default.
    #[must_use]
    pub fn decode(&self, raw: Option<&str>) -> ParameterValue {
        let default = self.default_value();
        if self.is_read_only() {
            return ParameterValue {
                is_set: true,
                value: default.clone(),
                default,
            };
        }

        match raw.filter(|r| !r.is_empty()) {
            Some(raw) => ParameterValue {
                is_set: true,
                value: self.parse_raw(raw).unwrap_or_else(|| default.clone()),
                default,
            },
            None => ParameterValue {
                is_set: false,
                value: default.clone(),
                default,
            },
        }
    }

    /// Check type and range of a value before it is written.
    pub fn validate(&self, value: &ParamValue) -> Result<(), ConfigureError> {
        if self.is_read_only() {
            return Err(ConfigureError::ReadOnly(self.path()));
        }
        if value.kind() != self.kind {
            return Err(ConfigureError::TypeMismatch {
                path: self.path(),
                expected: self.kind,
            });
        }

        let invalid = |reason: String| ConfigureError::InvalidValue {
            path: self.path(),
            reason,
        };

        match (self.variable, value) {
            (Some("JACKD_SR"), ParamValue::Uint(rate)) if !SAMPLE_RATES.contains(rate) => {
                Err(invalid(format!("unsupported sample rate {rate}")))
            }
            (Some("JACKD_PERIOD"), ParamValue::Uint(period))
                if !period.is_power_of_two() || !PERIOD_RANGE.contains(period) =>
            {
                Err(invalid(format!(
                    "period must be a power of 2 between 16 and 4096, got {period}"
                )))
            }
            (Some("JACKD_NPERIODS"), ParamValue::Uint(n)) if !NPERIODS_RANGE.contains(n) => {
                Err(invalid(format!("nperiods must be between 2 and 8, got {n}")))
            }
            (Some("JACKD_PRIORITY"), ParamValue::Uint(p))
                if *p != 0 && !PRIORITY_RANGE.contains(p) =>
            {
                Err(invalid(format!("priority must be 0 or 10-89, got {p}")))
            }
            (_, ParamValue::Str(s)) if s.contains(['\n', '\r', '\0']) => {
                Err(invalid("value must be a single line".to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Text stored in the defaults file for `value`.
    #[must_use]
    pub fn encode(&self, value: &ParamValue) -> String {
        match value {
            ParamValue::Bool(b) => String::from(if *b { "1" } else { "0" }),
            ParamValue::Uint(n) => n.to_string(),
            ParamValue::Str(s) => s.clone(),
        }
    }

    /// Static constraint for this parameter.
    ///
    /// For the device parameter this holds only the auto-detect entry; the
    /// runtime prepends the sound cards it finds.
    #[must_use]
    pub fn constraint(&self) -> Constraint {
        let uints = |values: &[u32]| values.iter().copied().map(ParamValue::Uint).collect();
        match self.variable {
            Some("JACKD_SR") => Constraint::strict(uints(SAMPLE_RATES)),
            Some("JACKD_PERIOD") => Constraint::strict(
                PERIOD_RANGE
                    .filter(|p| p.is_power_of_two())
                    .map(ParamValue::Uint)
                    .collect(),
            ),
            Some("JACKD_NPERIODS") => Constraint::strict(NPERIODS_RANGE.map(ParamValue::Uint).collect()),
            Some("JACKD_MIDI") => Constraint::strict(
                MIDI_DRIVERS
                    .iter()
                    .map(|d| ParamValue::Str((*d).to_string()))
                    .collect(),
            ),
            Some("JACKD_DEVICE") => Constraint {
                values: vec![ParamValue::Str(String::new())],
                ..Constraint::open()
            },
            _ => Constraint::open(),
        }
    }

    /// User-facing explanation of what it takes for a change to apply.
    #[must_use]
    pub fn restart_hint(&self) -> &'static str {
        match self.variable {
            Some("JACKD_PERIOD") => "Frames/period changed. Stop and start the server to apply.",
            Some("JACKD_NPERIODS") => "Periods/buffer changed. Stop and start the server to apply.",
            Some("JACKD_SR") => "Sample rate changed. Stop and start the server to apply.",
            Some("JACKD_DEVICE") => "Audio device changed. Stop and start the server to apply.",
            Some("JACKD_PRIORITY") => {
                "Realtime priority changed. Stop and start the server to apply."
            }
            Some("JACKD_MIDI") => "MIDI driver changed. Stop and start the server to apply.",
            _ => "Setting changed. Stop and start the server to apply.",
        }
    }
}
