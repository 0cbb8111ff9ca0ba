//! Domain primitives: AccountAddress, PoolId, Price.

use crate::domain::asset::Asset;
use serde::{Deserialize, Serialize};

/// Account address in its encoded string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountAddress(pub String);

impl AccountAddress {
    /// Create an AccountAddress from a string.
    pub fn new(address: impl Into<String>) -> Self {
        AccountAddress(address.into())
    }

    /// Get the address as a string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Liquidity pool identifier: 32 bytes, rendered as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolId(pub [u8; 32]);

impl PoolId {
    /// Create a PoolId from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        PoolId(bytes)
    }

    /// Derive the id of a constant-product pool from its parameters.
    ///
    /// The id is a SHA-256 over the pool type tag, both canonical asset
    /// forms and the fee, so equal parameters always name the same pool.
    pub fn for_constant_product(asset_a: &Asset, asset_b: &Asset, fee_bps: i32) -> Self {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(b"constant_product");
        hasher.update(asset_a.canonical().as_bytes());
        hasher.update(b"|");
        hasher.update(asset_b.canonical().as_bytes());
        hasher.update(b"|");
        hasher.update(fee_bps.to_be_bytes());
        PoolId(hasher.finalize().into())
    }

    /// Hex form used as the bulk-resolution key.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl std::fmt::Display for PoolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Offer price as an integer fraction, as stored on resting offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Price {
    pub n: i32,
    pub d: i32,
}

impl Price {
    /// Create a Price from numerator and denominator.
    pub fn new(n: i32, d: i32) -> Self {
        Price { n, d }
    }
}
