use serde::{Deserialize, Serialize};

/// Where a piece of portfolio data came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Aggregated from a Plaid-shaped provider
    #[default]
    Plaid,
}
