// Base58 and Base58Check encoding

use crate::core::hash256;
use crate::error::{Result, WalletError};

/// Bitcoin base58 alphabet (no 0, O, I, l)
pub const ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Length of the Base58Check checksum suffix
pub const CHECKSUM_LEN: usize = 4;

/// Encode bytes as a big-endian base58 number.
/// Each leading zero byte becomes one leading '1'.
pub fn encode_padded(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a base58 string, restoring one zero byte per leading '1'.
pub fn decode_padded(s: &str) -> Result<Vec<u8>> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| WalletError::Decode(e.to_string()))
}

/// Base58Check checksum: first 4 bytes of hash256(data)
fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = hash256(data);
    let mut check = [0u8; CHECKSUM_LEN];
    check.copy_from_slice(&hash.as_bytes()[..CHECKSUM_LEN]);
    check
}

/// Encode `version || payload || checksum` as base58
pub fn check_encode(payload: &[u8], version: u8) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_LEN);
    data.push(version);
    data.extend_from_slice(payload);
    let check = checksum(&data);
    data.extend_from_slice(&check);
    encode_padded(&data)
}

/// Decode a Base58Check string and return its payload.
///
/// The checksum is verified before the version byte, so a corrupted
/// string reports `Checksum` even if its version byte also changed.
pub fn check_decode(s: &str, expected_version: u8) -> Result<Vec<u8>> {
    let data = decode_padded(s)?;
    if data.len() < 1 + CHECKSUM_LEN {
        return Err(WalletError::Decode(format!(
            "base58check data too short: {} bytes",
            data.len()
        )));
    }

    let (body, check) = data.split_at(data.len() - CHECKSUM_LEN);
    if checksum(body) != check {
        return Err(WalletError::Checksum);
    }

    let version = body[0];
    if version != expected_version {
        return Err(WalletError::VersionMismatch {
            expected: expected_version,
            found: version,
        });
    }

    Ok(body[1..].to_vec())
}
