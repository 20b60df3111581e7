//! Typed observation values, validated when the payload is parsed.

use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The current value of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Measurement {
    Number(f64),
    /// Non-numeric values are passed through verbatim.
    Text(String),
    /// The station reported no value for this interval.
    Missing,
}

impl Measurement {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Measurement::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Measurement::Missing)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measurement::Number(value) => write!(f, "{value}"),
            Measurement::Text(text) => f.write_str(text),
            Measurement::Missing => f.write_str("-"),
        }
    }
}

/// One parameter of a [`Snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationValue {
    pub parameter: String,
    pub name: String,
    pub unit: String,
    pub value: Measurement,
}

impl ObservationValue {
    pub fn get(&self, kind: DataKind) -> Datum<'_> {
        match kind {
            DataKind::Value => Datum::Value(&self.value),
            DataKind::Name => Datum::Name(&self.name),
            DataKind::Unit => Datum::Unit(&self.unit),
        }
    }
}

/// Which part of an [`ObservationValue`] to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataKind {
    #[default]
    Value,
    Name,
    Unit,
}

impl FromStr for DataKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "value" => Ok(DataKind::Value),
            "name" => Ok(DataKind::Name),
            "unit" => Ok(DataKind::Unit),
            other => Err(format!("unknown data kind '{other}'")),
        }
    }
}

/// A borrowed view of one part of an [`ObservationValue`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Datum<'a> {
    Value(&'a Measurement),
    Name(&'a str),
    Unit(&'a str),
}

impl<'a> Datum<'a> {
    pub fn as_measurement(&self) -> Option<&'a Measurement> {
        match *self {
            Datum::Value(measurement) => Some(measurement),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Datum::Name(text) | Datum::Unit(text) => Some(text),
            Datum::Value(_) => None,
        }
    }
}

impl fmt::Display for Datum<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Value(measurement) => write!(f, "{measurement}"),
            Datum::Name(text) | Datum::Unit(text) => f.write_str(text),
        }
    }
}

/// The most recent observations of one station, tagged with the server timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub station_id: String,
    pub timestamp: DateTime<FixedOffset>,
    pub values: HashMap<String, ObservationValue>,
}

impl Snapshot {
    pub fn get(&self, parameter: &str) -> Option<&ObservationValue> {
        self.values.get(parameter)
    }

    /// Parameter codes in this snapshot, sorted.
    pub fn parameters(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.values.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }
}
