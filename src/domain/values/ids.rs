use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Stable identifier of one account across every fetch and product.
    /// Derived from the provider's native account id.
    AssetId
);
string_id!(TransactionId);
string_id!(LiabilityId);
string_id!(
    /// The end user a portfolio belongs to.
    PrincipalId
);
string_id!(IntegrationId);

impl IntegrationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Identity of an investment holding: the owning account plus the security held.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HoldingId {
    pub account_id: AssetId,
    pub security_id: String,
}

impl HoldingId {
    pub fn new(account_id: AssetId, security_id: impl Into<String>) -> Self {
        Self {
            account_id,
            security_id: security_id.into(),
        }
    }
}

impl fmt::Display for HoldingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.account_id, self.security_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_serializes_as_plain_string() {
        let id = AssetId::new("acc-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"acc-1\"");
    }

    #[test]
    fn test_holding_id_display() {
        let id = HoldingId::new(AssetId::new("acc-3"), "sec-9");
        assert_eq!(id.to_string(), "acc-3-sec-9");
        assert_eq!(id.account_id.as_str(), "acc-3");
    }

    #[test]
    fn test_generated_integration_ids_differ() {
        assert_ne!(IntegrationId::generate(), IntegrationId::generate());
    }
}
