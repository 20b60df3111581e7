use serde::{Deserialize, Serialize};

/// A measurable quantity offered by the dataset (e.g., `TL`, air temperature).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// The short parameter code used in requests.
    pub code: String,
    pub long_name: Option<String>,
    pub description: Option<String>,
    pub unit: Option<String>,
}
