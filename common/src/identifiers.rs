//! Identifier types for ClaimRoot entities.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// An opaque ledger address.
///
/// Members are keyed by address. Two reserved addresses, [`Address::SYSTEM`]
/// and [`Address::GOVERNANCE`], stand for non-member actors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    /// Reserved address of the registration authority.
    pub const SYSTEM: &'static str = "SYSTEM";
    /// Reserved address of the governance treasury.
    pub const GOVERNANCE: &'static str = "GOVERNANCE";

    /// Create a new address.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// The `SYSTEM` address.
    pub fn system() -> Self {
        Self::new(Self::SYSTEM)
    }

    /// The `GOVERNANCE` address.
    pub fn governance() -> Self {
        Self::new(Self::GOVERNANCE)
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the address is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whether this is one of the reserved system actors.
    pub fn is_reserved(&self) -> bool {
        self.0 == Self::SYSTEM || self.0 == Self::GOVERNANCE
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Create from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse from string.
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a ledger transaction.
    TransactionId
}

uuid_id! {
    /// Unique identifier for a governance proposal.
    /// Uses UUID v7 so identifiers sort by creation time.
    ProposalId
}

uuid_id! {
    /// Unique identifier for an execution receipt.
    ReceiptId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_addresses() {
        assert!(Address::system().is_reserved());
        assert!(Address::governance().is_reserved());
        assert!(!Address::new("VAULT-COMMANDER-001").is_reserved());
    }

    #[test]
    fn test_blank_address() {
        assert!(Address::new("").is_blank());
        assert!(Address::new("   ").is_blank());
        assert!(!Address::new("alice").is_blank());
    }

    #[test]
    fn test_proposal_id_parse() {
        let uuid_str = "019456ab-1234-7def-8901-234567890abc";
        let id = ProposalId::parse(uuid_str).unwrap();
        assert_eq!(id.to_string(), uuid_str);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(TransactionId::new(), TransactionId::new());
        assert_ne!(ReceiptId::new(), ReceiptId::new());
    }

    #[test]
    fn test_address_serializes_as_string() {
        let json = serde_json::to_string(&Address::new("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }
}
