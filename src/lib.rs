mod config;
mod error;
mod observations;
mod stations;
mod transport;
mod types;
mod utils;
mod zamg;

#[cfg(test)]
mod testing;

pub use config::*;
pub use error::{DataError, ErrorKind, UsageError, ZamgError};
pub use zamg::*;

pub use observations::registry::ParameterRegistry;
pub use stations::cache::{CatalogCache, DiskCache, NoCache};
pub use stations::catalog::Catalog;
pub use stations::error::CacheError;
pub use stations::locate_station::{nearby, nearest};

pub use transport::error::TransportError;
pub use transport::reqwest_connector::ReqwestConnector;
pub use transport::{Connector, HttpRequest, HttpResponse, Transport};

pub use types::observation::*;
pub use types::parameter::ParameterInfo;
pub use types::station::*;
