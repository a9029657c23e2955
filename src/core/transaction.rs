// Transaction data structures and signature hashing

use crate::core::{Hash256, hash256, Amount};
use super::serialize::{write_varint, write_var_bytes};

/// Sign all inputs and all outputs
pub const SIGHASH_ALL: u8 = 0x01;

/// Transaction input - references a previous transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInput {
    /// Hash of the previous transaction
    pub prev_tx_hash: Hash256,
    /// Index of the output in the previous transaction
    pub prev_index: u32,
    /// Signature script (scriptSig) - proves ownership
    pub script_sig: Vec<u8>,
    /// Sequence number, always final here
    pub sequence: u32,
}

impl TxInput {
    /// Create a new transaction input
    pub fn new(prev_tx_hash: Hash256, prev_index: u32, script_sig: Vec<u8>) -> Self {
        Self {
            prev_tx_hash,
            prev_index,
            script_sig,
            sequence: 0xffffffff,
        }
    }

    fn serialize_into(&self, buf: &mut Vec<u8>, script_sig: &[u8]) {
        buf.extend_from_slice(self.prev_tx_hash.as_bytes());
        buf.extend_from_slice(&self.prev_index.to_le_bytes());
        write_var_bytes(buf, script_sig);
        buf.extend_from_slice(&self.sequence.to_le_bytes());
    }
}

/// Transaction output - specifies amount and recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOutput {
    pub value: Amount,
    /// Public key script (scriptPubKey) - specifies conditions for spending
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    /// Create a new transaction output
    pub fn new(value: Amount, script_pubkey: Vec<u8>) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }

    fn serialize_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.value.to_le_bytes());
        write_var_bytes(buf, &self.script_pubkey);
    }
}

/// Transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(inputs: Vec<TxInput>, outputs: Vec<TxOutput>) -> Self {
        Self {
            version: 1,
            inputs,
            outputs,
            lock_time: 0,
        }
    }

    /// Serialize to the standard wire format
    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_with(|i| self.inputs[i].script_sig.as_slice())
    }

    // Shared by txid and sighash: the closure picks each input's scriptSig
    fn serialize_with<'s, F>(&self, script_for: F) -> Vec<u8>
    where
        F: Fn(usize) -> &'s [u8],
    {
        let mut buf = Vec::new();
        buf.extend_from_slice(&self.version.to_le_bytes());

        write_varint(&mut buf, self.inputs.len() as u64);
        for (i, input) in self.inputs.iter().enumerate() {
            input.serialize_into(&mut buf, script_for(i));
        }

        write_varint(&mut buf, self.outputs.len() as u64);
        for output in &self.outputs {
            output.serialize_into(&mut buf);
        }

        buf.extend_from_slice(&self.lock_time.to_le_bytes());
        buf
    }

    /// Transaction ID (double SHA256 of serialized tx)
    pub fn txid(&self) -> Hash256 {
        hash256(&self.serialize())
    }

    /// Legacy signature hash for one input.
    ///
    /// Every scriptSig is blanked except the one at `input_index`, which is
    /// replaced by `script_code` (the previous output's scriptPubKey). The
    /// sighash type is appended as a 4-byte little-endian integer.
    pub fn signature_hash(&self, input_index: usize, script_code: &[u8], sighash_type: u8) -> Hash256 {
        let empty: &[u8] = &[];
        let mut preimage = self.serialize_with(|i| {
            if i == input_index { script_code } else { empty }
        });
        preimage.extend_from_slice(&(sighash_type as u32).to_le_bytes());
        hash256(&preimage)
    }

    /// Calculate total output value
    pub fn total_output_value(&self) -> Amount {
        self.outputs.iter().map(|out| out.value).sum()
    }
}
