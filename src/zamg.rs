//! This module provides the main entry point of the client. A [`Zamg`] instance owns its
//! station catalog, parameter selection, observation snapshots and HTTP transport; nothing
//! is shared between instances.

use crate::config::ClientConfig;
use crate::error::{DataError, UsageError, ZamgError};
use crate::observations::fetcher::ObservationFetcher;
use crate::observations::registry::ParameterRegistry;
use crate::stations::cache::{CatalogCache, DiskCache, NoCache};
use crate::stations::catalog::{Catalog, StationCatalog};
use crate::stations::locate_station::{nearby, nearest};
use crate::transport::reqwest_connector::ReqwestConnector;
use crate::transport::slot::TransportSlot;
use crate::transport::Connector;
use crate::types::observation::{DataKind, Datum, Measurement, Snapshot};
use crate::types::parameter::ParameterInfo;
use crate::types::station::Station;
use bon::bon;
use chrono::{DateTime, FixedOffset, Utc};
use log::debug;

/// Represents a geographical coordinate using latitude and longitude.
///
/// Latitude is the first element (index 0), and longitude is the second (index 1).
///
/// # Examples
///
/// ```
/// use zamg::LatLon;
///
/// let graz = LatLon(47.07, 15.44);
/// assert_eq!(graz.0, 47.07); // Latitude
/// assert_eq!(graz.1, 15.44); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);

/// The client for GeoSphere Austria (ZAMG) current station observations.
///
/// Typical use: find the closest station, make it the default, optionally narrow the
/// parameters, then [`refresh`](Zamg::refresh) and read values.
///
/// The HTTP transport is acquired on the first request and released by
/// [`close`](Zamg::close) or when the client is dropped. Calls on one instance must not
/// overlap; use one client per concurrent task.
///
/// # Examples
///
/// ```no_run
/// # use zamg::{DataKind, Zamg, ZamgError};
/// # async fn run() -> Result<(), ZamgError> {
/// let mut zamg = Zamg::new();
/// let station = zamg.closest_station(46.99, 15.499).await?;
/// zamg.set_default_station(&station);
/// zamg.set_parameters(["TL", "SO"]);
/// zamg.refresh().await?;
///
/// println!("{}: {}", zamg.station_name()?, zamg.get_value("TL", DataKind::Value)?);
/// zamg.close();
/// # Ok(())
/// # }
/// ```
pub struct Zamg {
    config: ClientConfig,
    transport: TransportSlot,
    catalog: StationCatalog,
    registry: ParameterRegistry,
    observations: ObservationFetcher,
    default_station: Option<String>,
}

impl Default for Zamg {
    fn default() -> Self {
        Self::new()
    }
}

#[bon]
impl Zamg {
    /// Creates a client with the default [`ClientConfig`] and no persistent cache.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client talking HTTP through `reqwest`.
    ///
    /// If `config.cache_dir` is set, the station catalog is persisted there.
    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_connector(config, ReqwestConnector)
    }

    /// Creates a client that obtains its HTTP transport from `connector`.
    pub fn with_connector(config: ClientConfig, connector: impl Connector + 'static) -> Self {
        let cache: Box<dyn CatalogCache> = match &config.cache_dir {
            Some(dir) => Box::new(DiskCache::new(dir)),
            None => Box::new(NoCache),
        };
        Self {
            transport: TransportSlot::new(Box::new(connector)),
            catalog: StationCatalog::new(cache),
            registry: ParameterRegistry::default(),
            observations: ObservationFetcher::new(),
            default_station: None,
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // --- Stations ---

    /// Returns the station catalog, fetching it on the first call.
    pub async fn stations(&mut self) -> Result<&Catalog, ZamgError> {
        self.catalog.fetch(&mut self.transport, &self.config).await
    }

    /// Looks up a station in the already loaded catalog.
    pub fn station(&self, id: &str) -> Option<&Station> {
        self.catalog.get()?.station(id)
    }

    /// Returns the id of the station closest to `(latitude, longitude)`.
    ///
    /// # Errors
    ///
    /// Transport and data errors from loading the catalog. [`UsageError::StationNotFound`]
    /// if the catalog has no usable station or the coordinate is not finite and in range.
    pub async fn closest_station(
        &mut self,
        latitude: f64,
        longitude: f64,
    ) -> Result<String, ZamgError> {
        let catalog = self.stations().await?;
        let station = nearest(catalog, latitude, longitude)?;
        debug!(
            "Closest station to ({latitude}, {longitude}) is {} ({})",
            station.id, station.name
        );
        Ok(station.id.clone())
    }

    /// Finds stations near a location, closest first.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** The point to search around.
    /// * `.station_limit(usize)`: Optional. Maximum number of stations. Defaults to `5`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use zamg::{LatLon, Zamg, ZamgError};
    /// # async fn run() -> Result<(), ZamgError> {
    /// let mut zamg = Zamg::new();
    /// let stations = zamg
    ///     .find_stations()
    ///     .location(LatLon(48.2, 16.37))
    ///     .station_limit(3)
    ///     .call()
    ///     .await?;
    /// assert!(stations.len() <= 3);
    /// # Ok(())
    /// # }
    /// ```
    #[builder]
    pub async fn find_stations(
        &mut self,
        location: LatLon,
        station_limit: Option<usize>,
    ) -> Result<Vec<Station>, ZamgError> {
        let limit = station_limit.unwrap_or(5);
        let catalog = self.stations().await?;
        let ranked = nearby(catalog, location.0, location.1, limit)?;
        Ok(ranked
            .into_iter()
            .map(|(station, _distance)| station.clone())
            .collect())
    }

    /// Makes `station` the target of [`refresh`](Zamg::refresh) and the read accessors.
    pub fn set_default_station(&mut self, station: &str) {
        debug!("Default station set to {station}");
        self.default_station = Some(station.to_string());
    }

    pub fn default_station(&self) -> Option<&str> {
        self.default_station.as_deref()
    }

    /// Display name of the default station.
    ///
    /// # Errors
    ///
    /// [`UsageError::NoDefaultStation`], or [`UsageError::StationUnknown`] if the catalog
    /// is not loaded or does not list the station.
    pub fn station_name(&self) -> Result<&str, ZamgError> {
        let station = self.require_default_station()?;
        self.station_name_of(station)
    }

    pub fn station_name_of(&self, station: &str) -> Result<&str, ZamgError> {
        self.station(station)
            .map(|s| s.name.as_str())
            .ok_or_else(|| {
                UsageError::StationUnknown {
                    station: station.to_string(),
                }
                .into()
            })
    }

    // --- Parameters ---

    /// Every parameter code the service offers. Empty until the catalog has been loaded.
    pub fn all_parameters(&self) -> Vec<String> {
        self.catalog
            .get()
            .map(ParameterRegistry::all)
            .unwrap_or_default()
    }

    pub fn parameter_info(&self, code: &str) -> Option<&ParameterInfo> {
        self.catalog.get()?.parameter(code)
    }

    /// Restricts the next refreshes to `subset`. An empty subset selects all parameters.
    ///
    /// Snapshots that already exist are left as they are.
    pub fn set_parameters<I, S>(&mut self, subset: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.set(subset);
    }

    /// Like [`set_parameters`](Zamg::set_parameters) for a comma-joined list, e.g. `"TL,SO"`.
    pub fn set_parameters_str(&mut self, joined: &str) {
        self.registry.set_from_str(joined);
    }

    /// Drops any narrowing so the next refresh requests every catalog parameter.
    pub fn reset_parameters(&mut self) {
        self.registry.reset();
    }

    /// Whether [`set_parameters`](Zamg::set_parameters) restricted the selection.
    pub fn parameters_narrowed(&self) -> bool {
        self.registry.is_narrowed()
    }

    /// The codes the next refresh will request.
    pub fn current_parameters(&self) -> Vec<String> {
        self.registry.current(self.catalog.get())
    }

    // --- Observations ---

    /// Brings the snapshot of the default station up to date.
    ///
    /// If the stored snapshot is younger than the refresh interval (measured from its
    /// server timestamp) it is returned as is and nothing is requested.
    ///
    /// # Errors
    ///
    /// * [`UsageError::NoDefaultStation`] before any network access.
    /// * [`ZamgError::Transport`] for connection problems, timeouts and non-200 answers.
    ///   The previous snapshot is kept and the transport is re-acquired on the next call.
    /// * [`ZamgError::Data`] if the payload does not have the expected shape or lacks a
    ///   requested parameter.
    pub async fn refresh(&mut self) -> Result<&Snapshot, ZamgError> {
        let station = self.require_default_station()?.to_string();
        self.refresh_station(&station).await
    }

    /// Same as [`refresh`](Zamg::refresh) for an explicit station.
    pub async fn refresh_station(&mut self, station: &str) -> Result<&Snapshot, ZamgError> {
        if self
            .observations
            .is_fresh(station, Utc::now(), self.config.refresh_interval)
        {
            debug!("Observations for station {station} are current, skipping request");
        } else {
            let catalog = self.catalog.fetch(&mut self.transport, &self.config).await?;
            if catalog.station(station).is_none() {
                return Err(UsageError::StationUnknown {
                    station: station.to_string(),
                }
                .into());
            }
            self.registry.validate(catalog)?;
            let parameters = self.registry.current(Some(catalog));
            self.observations
                .fetch(&mut self.transport, &self.config, station, &parameters)
                .await?;
        }
        self.snapshot_for(station)
    }

    /// The latest snapshot of the default station.
    pub fn snapshot(&self) -> Result<&Snapshot, ZamgError> {
        let station = self.require_default_station()?;
        self.snapshot_for(station)
    }

    pub fn snapshot_for(&self, station: &str) -> Result<&Snapshot, ZamgError> {
        self.observations.snapshot(station).ok_or_else(|| {
            DataError::NoSnapshot {
                station: station.to_string(),
            }
            .into()
        })
    }

    /// Reads one part of a parameter from the default station's latest snapshot.
    ///
    /// # Errors
    ///
    /// [`DataError::ParameterNotInSnapshot`] if the parameter was not fetched, so a missing
    /// parameter is never confused with a real value.
    pub fn get_value(&self, parameter: &str, kind: DataKind) -> Result<Datum<'_>, ZamgError> {
        let station = self.require_default_station()?;
        self.get_station_data(station, parameter, kind)
    }

    pub fn get_station_data(
        &self,
        station: &str,
        parameter: &str,
        kind: DataKind,
    ) -> Result<Datum<'_>, ZamgError> {
        let snapshot = self.snapshot_for(station)?;
        snapshot
            .get(parameter)
            .map(|value| value.get(kind))
            .ok_or_else(|| {
                DataError::ParameterNotInSnapshot {
                    parameter: parameter.to_string(),
                    station: station.to_string(),
                }
                .into()
            })
    }

    /// Shorthand for the measured value of `parameter` at the default station.
    pub fn measurement(&self, parameter: &str) -> Result<&Measurement, ZamgError> {
        let station = self.require_default_station()?;
        let snapshot = self.snapshot_for(station)?;
        snapshot.get(parameter).map(|v| &v.value).ok_or_else(|| {
            DataError::ParameterNotInSnapshot {
                parameter: parameter.to_string(),
                station: station.to_string(),
            }
            .into()
        })
    }

    /// Server timestamp of the default station's latest snapshot.
    pub fn last_update(&self) -> Option<DateTime<FixedOffset>> {
        let station = self.default_station.as_deref()?;
        self.observations.snapshot(station).map(|s| s.timestamp)
    }

    // --- Transport lifetime ---

    pub fn is_connected(&self) -> bool {
        self.transport.is_acquired()
    }

    /// Releases the HTTP transport. The next request acquires a new one.
    pub fn close(&mut self) {
        self.transport.release();
    }

    fn require_default_station(&self) -> Result<&str, ZamgError> {
        self.default_station
            .as_deref()
            .ok_or_else(|| UsageError::NoDefaultStation.into())
    }
}
