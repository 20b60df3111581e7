//! The station catalog: every known station plus every parameter the dataset offers,
//! fetched once from the metadata endpoint.

use crate::config::ClientConfig;
use crate::error::{DataError, ZamgError};
use crate::stations::cache::CatalogCache;
use crate::transport::slot::TransportSlot;
use crate::transport::HttpRequest;
use crate::types::parameter::ParameterInfo;
use crate::types::station::{Coordinate, Station};
use crate::utils::parse_decimal;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// All stations and parameters known to the service, in the order the service lists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    stations: Vec<Station>,
    parameters: Vec<ParameterInfo>,
}

impl Catalog {
    /// Builds a catalog, keeping the first entry for any repeated station id or parameter code.
    pub fn new(stations: Vec<Station>, parameters: Vec<ParameterInfo>) -> Self {
        let mut seen = HashSet::new();
        let stations = stations
            .into_iter()
            .filter(|s| seen.insert(s.id.clone()))
            .collect();
        let mut seen = HashSet::new();
        let parameters = parameters
            .into_iter()
            .filter(|p| seen.insert(p.code.clone()))
            .collect();
        Self {
            stations,
            parameters,
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, DataError> {
        let raw: MetadataResponse =
            serde_json::from_slice(bytes).map_err(|source| DataError::Malformed {
                what: "station metadata",
                source,
            })?;
        let stations = raw.stations.into_iter().map(Station::from).collect();
        let parameters = raw
            .parameters
            .into_iter()
            .map(|p| ParameterInfo {
                code: p.name,
                long_name: p.long_name,
                description: p.desc,
                unit: p.unit,
            })
            .collect();
        Ok(Self::new(stations, parameters))
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn station(&self, id: &str) -> Option<&Station> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    pub fn parameter(&self, code: &str) -> Option<&ParameterInfo> {
        self.parameters.iter().find(|p| p.code == code)
    }

    pub fn parameter_codes(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.code.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

// --- Metadata payload ---

#[derive(Deserialize)]
struct MetadataResponse {
    parameters: Vec<RawParameter>,
    stations: Vec<RawStation>,
}

#[derive(Deserialize)]
struct RawParameter {
    name: String,
    long_name: Option<String>,
    desc: Option<String>,
    unit: Option<String>,
}

#[derive(Deserialize)]
struct RawStation {
    id: RawId,
    lat: RawNumber,
    lon: RawNumber,
    name: String,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    altitude: Option<RawNumber>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Integer(u64),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    /// `null`, booleans or nested values.
    Other(serde_json::Value),
}

impl From<RawNumber> for Coordinate {
    fn from(raw: RawNumber) -> Self {
        match raw {
            RawNumber::Number(value) => Coordinate::Decimal(value),
            RawNumber::Text(text) => match parse_decimal(&text) {
                Some(value) => Coordinate::Decimal(value),
                None => Coordinate::Unparsed(text),
            },
            RawNumber::Other(value) => Coordinate::Unparsed(value.to_string()),
        }
    }
}

impl From<RawStation> for Station {
    fn from(raw: RawStation) -> Self {
        let id = match raw.id {
            RawId::Text(id) => id,
            RawId::Integer(id) => id.to_string(),
        };
        Station {
            id,
            latitude: raw.lat.into(),
            longitude: raw.lon.into(),
            name: raw.name,
            state: raw.state,
            altitude: raw.altitude.and_then(|a| Coordinate::from(a).as_f64()),
        }
    }
}

// --- Fetch-once holder ---

/// Loads the [`Catalog`] on first use and hands out the same instance afterwards.
pub struct StationCatalog {
    loaded: Option<Catalog>,
    cache: Box<dyn CatalogCache>,
}

impl StationCatalog {
    pub fn new(cache: Box<dyn CatalogCache>) -> Self {
        Self {
            loaded: None,
            cache,
        }
    }

    /// The catalog, if it has been loaded already. Never performs I/O.
    pub fn get(&self) -> Option<&Catalog> {
        self.loaded.as_ref()
    }

    /// Returns the catalog, loading it first if this is the first successful call.
    ///
    /// A failed load leaves the catalog unpopulated so a later call can retry.
    pub async fn fetch(
        &mut self,
        slot: &mut TransportSlot,
        config: &ClientConfig,
    ) -> Result<&Catalog, ZamgError> {
        let catalog = match self.loaded.take() {
            Some(catalog) => catalog,
            None => self.load(slot, config).await?,
        };
        Ok(self.loaded.insert(catalog))
    }

    async fn load(
        &self,
        slot: &mut TransportSlot,
        config: &ClientConfig,
    ) -> Result<Catalog, ZamgError> {
        match self.cache.load().await {
            Ok(Some(catalog)) => {
                debug!("Station catalog cache hit");
                return Ok(catalog);
            }
            Ok(None) => debug!("Station catalog cache miss"),
            Err(e) => {
                warn!("Discarding unusable station catalog cache: {e}");
                if let Err(e) = self.cache.discard().await {
                    warn!("Failed to remove station catalog cache: {e}");
                }
            }
        }

        let url = config.metadata_url();
        let request = HttpRequest::get(url.as_str(), config.request_timeout);
        let response = slot.get_ok(config, &request).await?;
        let catalog = Catalog::from_json(&response.body)?;
        info!(
            "Loaded {} stations and {} parameters from {}",
            catalog.stations().len(),
            catalog.parameters().len(),
            url
        );

        if let Err(e) = self.cache.store(&catalog).await {
            warn!("Failed to persist station catalog: {e}");
        }
        Ok(catalog)
    }
}
