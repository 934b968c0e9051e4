//! Account identities of parties participating in an escrow.
//!
//! The engine receives already-authenticated caller identities; resolving
//! credentials to an identity happens outside this crate.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// An authenticated account identity.
///
/// Accepts hex (with or without a `0x` prefix), base58, or base64 input
/// and normalizes to the raw byte form; two identities are equal iff
/// their raw bytes are equal. Displays as `0x`-prefixed hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(#[serde(with = "hex")] Vec<u8>);

impl AccountId {
    /// Builds an identity directly from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw byte form of the identity.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl std::str::FromStr for AccountId {
    type Err = IdentityError;

    /// Parses an identity from hex (`0x`-prefixed or bare), base58, or
    /// base64 text.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::EmptyIdentity` on empty input,
    /// `IdentityError::Hex` if a `0x`-prefixed string is not valid hex,
    /// and `IdentityError::UnsupportedFormat` if no encoding matches.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdentityError::EmptyIdentity);
        }

        if let Some(stripped) = s.strip_prefix("0x") {
            return Ok(Self(hex::decode(stripped)?));
        }

        if let Ok(bytes) = hex::decode(s) {
            return Ok(Self(bytes));
        }
        if let Ok(bytes) = bs58::decode(s).into_vec() {
            return Ok(Self(bytes));
        }
        if let Ok(bytes) = base64::engine::general_purpose::STANDARD.decode(s) {
            return Ok(Self(bytes));
        }

        Err(IdentityError::UnsupportedFormat)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr as _;

    use super::*;

    #[test]
    fn parses_prefixed_hex() {
        let id = AccountId::from_str("0xdeadbeef").unwrap();
        assert_eq!(id.as_bytes(), &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(id.to_string(), "0xdeadbeef");
    }

    #[test]
    fn parses_bare_hex() {
        let id = AccountId::from_str("deadbeef").unwrap();
        assert_eq!(id, AccountId::from_str("0xdeadbeef").unwrap());
    }

    #[test]
    fn parses_base58() {
        // "ZiCa" is base58 for the bytes of "abc"
        let id = AccountId::from_str("ZiCa").unwrap();
        assert_eq!(id.as_bytes(), b"abc");
    }

    #[test]
    fn parses_base64() {
        // '=' padding is not valid hex or base58
        let id = AccountId::from_str("YWJjZA==").unwrap();
        assert_eq!(id.as_bytes(), b"abcd");
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(
            AccountId::from_str(""),
            Err(IdentityError::EmptyIdentity)
        );
    }

    #[test]
    fn rejects_invalid_prefixed_hex() {
        assert!(matches!(
            AccountId::from_str("0xzz"),
            Err(IdentityError::Hex(_))
        ));
    }

    #[test]
    fn rejects_unparseable_input() {
        assert_eq!(
            AccountId::from_str("!!not-an-identity!!"),
            Err(IdentityError::UnsupportedFormat)
        );
    }

    #[test]
    fn serde_roundtrip_as_hex_string() {
        let id = AccountId::from_str("0x25e940685e0999d4aa7bd629d739c6a04e625761").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"25e940685e0999d4aa7bd629d739c6a04e625761\"");
        let back: AccountId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
