//! Asset type with its canonical string form.

use serde::{Deserialize, Serialize};

/// An asset as referenced by claim atoms and ledger entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The network's native asset.
    Native,
    /// An issued credit asset, identified by code and issuer address.
    Credit { code: String, issuer: String },
}

impl Asset {
    /// Create a credit asset.
    pub fn credit(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Asset::Credit {
            code: code.into(),
            issuer: issuer.into(),
        }
    }

    /// Canonical string form, used as the bulk-resolution key.
    pub fn canonical(&self) -> String {
        match self {
            Asset::Native => "native".to_string(),
            Asset::Credit { code, issuer } => format!("{}:{}", code, issuer),
        }
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical())
    }
}
