//! WalletAddress - base58 account address
//!
//! Addresses are the base58 encoding of a 32-byte public key, the same
//! format the Solana wallet adapter hands to the engine.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Decoded public key length in bytes
pub const ADDRESS_LEN: usize = 32;

/// Validated base58 wallet address
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse and validate a base58 address
    pub fn parse(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        let bytes = bs58::decode(&s)
            .into_vec()
            .map_err(|e| ValidationError::InvalidAddress(format!("{}: {}", s, e)))?;

        if bytes.len() != ADDRESS_LEN {
            return Err(ValidationError::InvalidAddress(format!(
                "{}: decodes to {} bytes, expected {}",
                s,
                bytes.len(),
                ADDRESS_LEN
            )));
        }

        Ok(Self(s))
    }

    /// Build an address from raw public key bytes
    pub fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bs58::encode(bytes).into_string())
    }

    /// The all-zero address (system program), used as the default staking vault
    pub fn system() -> Self {
        Self::from_bytes([0u8; ADDRESS_LEN])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for WalletAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = ValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<WalletAddress> for String {
    fn from(addr: WalletAddress) -> Self {
        addr.0
    }
}

impl AsRef<str> for WalletAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_address() {
        let addr = WalletAddress::system();
        assert_eq!(addr.as_str(), "11111111111111111111111111111111");
        assert_eq!(WalletAddress::parse(addr.as_str()).unwrap(), addr);
    }

    #[test]
    fn test_roundtrip_from_bytes() {
        let addr = WalletAddress::from_bytes([7u8; 32]);
        let parsed: WalletAddress = addr.to_string().parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn test_rejects_bad_addresses() {
        // '0' and 'l' are not in the base58 alphabet
        assert!(WalletAddress::parse("0OIl").is_err());
        // valid base58, wrong length
        assert!(WalletAddress::parse("abc").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let ok: WalletAddress =
            serde_json::from_str("\"11111111111111111111111111111111\"").unwrap();
        assert_eq!(ok, WalletAddress::system());
        assert!(serde_json::from_str::<WalletAddress>("\"nope\"").is_err());
    }
}
