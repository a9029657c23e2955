// P2PKH script construction and verification

use crate::core::hash160;
use crate::error::{Result, WalletError};
use secp256k1::{Secp256k1, Message, PublicKey, ecdsa::Signature};

/// Opcodes for P2PKH script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Duplicate the top stack item
    OpDup = 0x76,
    /// Hash the top stack item with HASH160
    OpHash160 = 0xa9,
    /// Push 20 bytes (pubkey hash size)
    OpPushBytes20 = 0x14,
    /// Verify that the top two items are equal
    OpEqualVerify = 0x88,
    /// Check signature
    OpCheckSig = 0xac,
}

/// Script builder for P2PKH
pub struct Script;

impl Script {
    /// Create a P2PKH scriptPubKey
    /// OP_DUP OP_HASH160 <pubKeyHash> OP_EQUALVERIFY OP_CHECKSIG
    pub fn p2pkh_script_pubkey(pubkey_hash: &[u8; 20]) -> Vec<u8> {
        let mut script = Vec::with_capacity(25);
        script.push(OpCode::OpDup as u8);
        script.push(OpCode::OpHash160 as u8);
        script.push(OpCode::OpPushBytes20 as u8);
        script.extend_from_slice(pubkey_hash);
        script.push(OpCode::OpEqualVerify as u8);
        script.push(OpCode::OpCheckSig as u8);
        script
    }

    /// Create a P2PKH scriptSig
    /// <signature || sighash type> <pubkey>
    pub fn p2pkh_script_sig(der_signature: &[u8], sighash_type: u8, pubkey: &[u8]) -> Vec<u8> {
        let mut script = Vec::with_capacity(der_signature.len() + pubkey.len() + 3);

        script.push((der_signature.len() + 1) as u8);
        script.extend_from_slice(der_signature);
        script.push(sighash_type);

        script.push(pubkey.len() as u8);
        script.extend_from_slice(pubkey);

        script
    }

    /// Verify a P2PKH spend against the input's signature hash
    pub fn verify_p2pkh(
        script_sig: &[u8],
        script_pubkey: &[u8],
        sighash: &[u8; 32],
    ) -> Result<bool> {
        let (signature, pubkey) = Self::parse_script_sig(script_sig)?;
        let pubkey_hash = Self::parse_script_pubkey(script_pubkey)?;

        if hash160(&pubkey) != pubkey_hash {
            return Ok(false);
        }

        // Last byte of the pushed signature is the sighash type
        let Some((_, der)) = signature.split_last() else {
            return Err(WalletError::Decode("empty signature push".to_string()));
        };
        Self::verify_signature(der, &pubkey, sighash)
    }

    /// Parse scriptSig: <sig> <pubkey>
    pub fn parse_script_sig(script_sig: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut pos = 0;

        let signature = Self::read_push(script_sig, &mut pos)
            .ok_or_else(|| WalletError::Decode("invalid signature push".to_string()))?;
        let pubkey = Self::read_push(script_sig, &mut pos)
            .ok_or_else(|| WalletError::Decode("invalid pubkey push".to_string()))?;

        Ok((signature.to_vec(), pubkey.to_vec()))
    }

    fn read_push<'a>(script: &'a [u8], pos: &mut usize) -> Option<&'a [u8]> {
        let len = *script.get(*pos)? as usize;
        let start = *pos + 1;
        let data = script.get(start..start + len)?;
        *pos = start + len;
        Some(data)
    }

    /// Parse scriptPubKey: OP_DUP OP_HASH160 <pubKeyHash> OP_EQUALVERIFY OP_CHECKSIG
    pub fn parse_script_pubkey(script_pubkey: &[u8]) -> Result<[u8; 20]> {
        if script_pubkey.len() != 25
            || script_pubkey[0] != OpCode::OpDup as u8
            || script_pubkey[1] != OpCode::OpHash160 as u8
            || script_pubkey[2] != OpCode::OpPushBytes20 as u8
            || script_pubkey[23] != OpCode::OpEqualVerify as u8
            || script_pubkey[24] != OpCode::OpCheckSig as u8
        {
            return Err(WalletError::Decode(format!(
                "not a P2PKH scriptPubKey: {}",
                hex::encode(script_pubkey)
            )));
        }

        let mut pubkey_hash = [0u8; 20];
        pubkey_hash.copy_from_slice(&script_pubkey[3..23]);
        Ok(pubkey_hash)
    }

    fn verify_signature(der: &[u8], pubkey: &[u8], sighash: &[u8; 32]) -> Result<bool> {
        let secp = Secp256k1::verification_only();

        let pubkey = PublicKey::from_slice(pubkey)
            .map_err(|e| WalletError::Decode(format!("invalid public key: {}", e)))?;
        let signature = Signature::from_der(der)
            .map_err(|e| WalletError::Decode(format!("invalid signature: {}", e)))?;
        let message = Message::from_digest(*sighash);

        Ok(secp.verify_ecdsa(&message, &signature, &pubkey).is_ok())
    }
}
