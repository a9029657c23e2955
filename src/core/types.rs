// Basic types shared by the wallet

use crate::error::{Result, WalletError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Amount in base units (1 coin = 100,000,000 units)
pub type Amount = u64;

/// 256-bit hash type (32 bytes)
/// Used for transaction IDs and signature hashes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Hash256(pub [u8; 32]);

impl Hash256 {
    /// Create a new Hash256 from a byte array
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a byte slice
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string (reversed for display, Bitcoin convention)
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Create from hex string (expects reversed byte order)
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| WalletError::Decode(format!("invalid hex hash: {}", e)))?;
        if bytes.len() != 32 {
            return Err(WalletError::Decode(format!(
                "invalid hash length: expected 32, got {}",
                bytes.len()
            )));
        }
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        hash.reverse();
        Ok(Self(hash))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

// Persisted in display (reversed hex) form so wallet records stay readable
impl Serialize for Hash256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash256::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash256_hex_is_reversed() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xab;
        let hash = Hash256::new(bytes);
        assert!(hash.to_hex().ends_with("ab"));
        assert_eq!(Hash256::from_hex(&hash.to_hex()).unwrap(), hash);
    }

    #[test]
    fn test_hash256_from_hex_rejects_short() {
        assert!(matches!(Hash256::from_hex("abcd"), Err(WalletError::Decode(_))));
    }

    #[test]
    fn test_hash256_json_form() {
        let hash = Hash256::new([0x11; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "11".repeat(32)));
        let back: Hash256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }
}
