use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A product type an integration can be enabled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Transactions,
    /// Investment holdings together with their investment transactions.
    #[serde(alias = "holdings")]
    Investments,
    Liabilities,
}

pub type ProductSet = BTreeSet<Product>;

impl Product {
    pub const ALL: [Product; 3] = [
        Product::Transactions,
        Product::Investments,
        Product::Liabilities,
    ];

    pub fn all() -> ProductSet {
        Self::ALL.into_iter().collect()
    }

    /// Parses a list of product names, ignoring ones this engine does not know
    /// (providers advertise products like `auth` or `identity` we never fetch).
    pub fn parse_known<I, S>(names: I) -> ProductSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter_map(|n| n.as_ref().parse().ok())
            .collect()
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Product::Transactions => write!(f, "transactions"),
            Product::Investments => write!(f, "investments"),
            Product::Liabilities => write!(f, "liabilities"),
        }
    }
}

impl FromStr for Product {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transactions" => Ok(Product::Transactions),
            "investments" | "holdings" => Ok(Product::Investments),
            "liabilities" => Ok(Product::Liabilities),
            _ => Err(format!("Unknown product: {s}")),
        }
    }
}
