use crate::config::ClientConfig;
use crate::error::{DataError, ZamgError};
use crate::transport::slot::TransportSlot;
use crate::transport::HttpRequest;
use crate::types::observation::{Measurement, ObservationValue, Snapshot};
use chrono::{DateTime, FixedOffset, Utc};
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Duration;

/// Holds the latest [`Snapshot`] per station and fetches new ones.
#[derive(Debug, Default)]
pub struct ObservationFetcher {
    snapshots: HashMap<String, Snapshot>,
}

impl ObservationFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, station: &str) -> Option<&Snapshot> {
        self.snapshots.get(station)
    }

    /// Whether the stored snapshot for `station` is still within `interval` of its
    /// server timestamp, i.e. the upstream service cannot have anything newer yet.
    pub fn is_fresh(&self, station: &str, now: DateTime<Utc>, interval: Duration) -> bool {
        let Some(snapshot) = self.snapshots.get(station) else {
            return false;
        };
        match (now - snapshot.timestamp.with_timezone(&Utc)).to_std() {
            Ok(age) => age <= interval,
            // Server clock is ahead of ours.
            Err(_) => true,
        }
    }

    /// Requests `parameters` for `station` and stores the result.
    ///
    /// On any failure the previously stored snapshot stays untouched.
    pub async fn fetch(
        &mut self,
        slot: &mut TransportSlot,
        config: &ClientConfig,
        station: &str,
        parameters: &[String],
    ) -> Result<&Snapshot, ZamgError> {
        if parameters.is_empty() {
            return Err(DataError::Empty {
                field: "parameters",
            }
            .into());
        }
        let request = HttpRequest::get(config.observation_url(), config.request_timeout)
            .query("parameters", parameters.join(","))
            .query("station_ids", station);
        let response = slot.get_ok(config, &request).await?;
        let snapshot = parse_observation(&response.body, station, parameters)?;
        info!(
            "Fetched {} parameters for station {} at {}",
            snapshot.values.len(),
            station,
            snapshot.timestamp
        );
        Ok(self.store(snapshot))
    }

    fn store(&mut self, snapshot: Snapshot) -> &Snapshot {
        match self.snapshots.entry(snapshot.station_id.clone()) {
            Entry::Occupied(mut entry) => {
                if snapshot.timestamp < entry.get().timestamp {
                    warn!(
                        "Ignoring observations for station {} from {}, already have {}",
                        snapshot.station_id,
                        snapshot.timestamp,
                        entry.get().timestamp
                    );
                } else {
                    entry.insert(snapshot);
                }
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(snapshot),
        }
    }
}

// --- Observation payload ---

#[derive(Deserialize)]
struct ObservationResponse {
    timestamps: Vec<String>,
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: FeatureProperties,
}

#[derive(Deserialize)]
struct FeatureProperties {
    parameters: HashMap<String, RawSeries>,
}

#[derive(Deserialize)]
struct RawSeries {
    name: String,
    #[serde(default)]
    unit: Option<String>,
    data: Vec<Value>,
}

/// Timestamps come with minute precision (`2022-11-13T10:20+00:00`), which RFC 3339 rejects.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, DataError> {
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M%:z"))
        .map_err(|_| DataError::InvalidTimestamp {
            value: raw.to_string(),
        })
}

fn to_measurement(value: Value) -> Measurement {
    match value {
        Value::Null => Measurement::Missing,
        Value::Number(number) => match number.as_f64() {
            Some(value) => Measurement::Number(value),
            None => Measurement::Text(number.to_string()),
        },
        Value::String(text) => Measurement::Text(text),
        other => Measurement::Text(other.to_string()),
    }
}

/// Builds a snapshot holding exactly the `requested` parameters.
fn parse_observation(
    body: &[u8],
    station: &str,
    requested: &[String],
) -> Result<Snapshot, DataError> {
    let response: ObservationResponse =
        serde_json::from_slice(body).map_err(|source| DataError::Malformed {
            what: "observation",
            source,
        })?;

    let raw_timestamp = response
        .timestamps
        .first()
        .ok_or(DataError::Empty {
            field: "timestamps",
        })?;
    let timestamp = parse_timestamp(raw_timestamp)?;

    let mut series = response
        .features
        .into_iter()
        .next()
        .ok_or(DataError::Empty { field: "features" })?
        .properties
        .parameters;

    let mut values = HashMap::with_capacity(requested.len());
    for code in requested {
        let raw = series
            .remove(code)
            .ok_or_else(|| DataError::MissingParameter {
                parameter: code.clone(),
            })?;
        let current = raw
            .data
            .into_iter()
            .next()
            .ok_or(DataError::Empty { field: "data" })?;
        values.insert(
            code.clone(),
            ObservationValue {
                parameter: code.clone(),
                name: raw.name,
                unit: raw.unit.unwrap_or_default(),
                value: to_measurement(current),
            },
        );
    }
    if !series.is_empty() {
        debug!("Dropped {} unrequested parameters", series.len());
    }

    Ok(Snapshot {
        station_id: station.to_string(),
        timestamp,
        values,
    })
}
