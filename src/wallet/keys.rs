// Key management: key pairs, addresses and WIF-style private keys

use crate::core::{base58, hash160, sha256_hash, Hash256, Script};
use crate::error::{Result, WalletError};
use crate::wallet::SubAccount;
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use rand::rngs::OsRng;

/// Offset between the address version byte and the private-key version byte
pub const PRIVATE_KEY_VERSION_OFFSET: u8 = 128;

/// Flag byte appended to the encoded secret for compressed public keys
const COMPRESSED_FLAG: u8 = 0x01;

/// Where a new key pair comes from
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Fresh secret from the OS RNG
    Random,
    /// Iterated SHA-256 of a passphrase (weak, unsalted)
    Passphrase {
        passphrase: String,
        rounds: u32,
        compressed: bool,
    },
    /// An existing WIF-style encoded private key
    EncodedPrivateKey(String),
}

/// Key pair
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    pub compressed: bool,
}

impl KeyPair {
    /// Public key bytes, 33 bytes compressed or 65 uncompressed
    pub fn pubkey_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.public_key.serialize().to_vec()
        } else {
            self.public_key.serialize_uncompressed().to_vec()
        }
    }

    /// Get pubkey hash
    pub fn pubkey_hash(&self) -> [u8; 20] {
        hash160(&self.pubkey_bytes())
    }

    /// Get script pubkey (P2PKH)
    pub fn script_pubkey(&self) -> Vec<u8> {
        Script::p2pkh_script_pubkey(&self.pubkey_hash())
    }
}

/// Owns the secp256k1 context and the network's address version.
///
/// Created once per wallet and passed by reference to everything that
/// derives keys or signs.
pub struct KeyManager {
    secp: Secp256k1<All>,
    version: u8,
}

impl KeyManager {
    pub fn new(address_version: u8) -> Result<Self> {
        if address_version >= PRIVATE_KEY_VERSION_OFFSET {
            return Err(WalletError::Config(format!(
                "address version {} leaves no room for the private key version",
                address_version
            )));
        }
        Ok(Self {
            secp: Secp256k1::new(),
            version: address_version,
        })
    }

    /// Address version byte
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Version byte of encoded private keys
    pub fn private_key_version(&self) -> u8 {
        self.version + PRIVATE_KEY_VERSION_OFFSET
    }

    /// Build a key pair from a 32-byte secret
    pub fn generate(&self, secret: &[u8; 32], compressed: bool) -> Result<KeyPair> {
        let secret_key = SecretKey::from_slice(secret)
            .map_err(|e| WalletError::KeyDerivation(format!("invalid secret key: {}", e)))?;
        Ok(self.keypair(secret_key, compressed))
    }

    /// Generate a new random compressed key pair
    pub fn generate_random(&self) -> KeyPair {
        let secret_key = SecretKey::new(&mut OsRng);
        self.keypair(secret_key, true)
    }

    fn keypair(&self, secret_key: SecretKey, compressed: bool) -> KeyPair {
        KeyPair {
            public_key: secret_key.public_key(&self.secp),
            secret_key,
            compressed,
        }
    }

    /// SHA-256 applied `rounds` times to the passphrase bytes.
    /// Deterministic and unsalted: not a hardened KDF.
    pub fn derive_from_passphrase(passphrase: &str, rounds: u32) -> Result<[u8; 32]> {
        if rounds == 0 {
            return Err(WalletError::KeyDerivation(
                "passphrase rounds must be at least 1".to_string(),
            ));
        }
        let mut secret = sha256_hash(passphrase.as_bytes());
        for _ in 1..rounds {
            secret = sha256_hash(&secret);
        }
        Ok(secret)
    }

    /// Decode a WIF-style private key into its secret and compression flag
    pub fn derive_from_encoded_private_key(&self, encoded: &str) -> Result<([u8; 32], bool)> {
        let payload = base58::check_decode(encoded, self.private_key_version())?;
        let compressed = match payload.len() {
            32 => false,
            33 if payload[32] == COMPRESSED_FLAG => true,
            33 => {
                return Err(WalletError::Decode(format!(
                    "invalid compression flag: {:#04x}",
                    payload[32]
                )));
            }
            len => {
                return Err(WalletError::Decode(format!(
                    "invalid private key length: {}",
                    len
                )));
            }
        };
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&payload[..32]);
        Ok((secret, compressed))
    }

    pub fn keypair_from_encoded(&self, encoded: &str) -> Result<KeyPair> {
        let (secret, compressed) = self.derive_from_encoded_private_key(encoded)?;
        self.generate(&secret, compressed)
    }

    pub fn keypair_from_source(&self, source: &KeySource) -> Result<KeyPair> {
        match source {
            KeySource::Random => Ok(self.generate_random()),
            KeySource::Passphrase { passphrase, rounds, compressed } => {
                let secret = Self::derive_from_passphrase(passphrase, *rounds)?;
                self.generate(&secret, *compressed)
            }
            KeySource::EncodedPrivateKey(encoded) => self.keypair_from_encoded(encoded),
        }
    }

    /// Returns `(address, encoded_private_key, hex_public_key)`
    pub fn address_and_keys(&self, keypair: &KeyPair) -> (String, String, String) {
        let pubkey = keypair.pubkey_bytes();
        let address = base58::check_encode(&hash160(&pubkey), self.version);

        let mut payload = keypair.secret_key.secret_bytes().to_vec();
        if keypair.compressed {
            payload.push(COMPRESSED_FLAG);
        }
        let private_key = base58::check_encode(&payload, self.private_key_version());

        (address, private_key, hex::encode(pubkey))
    }

    /// Fresh subaccount record for a key pair
    pub fn new_subaccount(&self, keypair: &KeyPair) -> SubAccount {
        let (address, private_key, public_key) = self.address_and_keys(keypair);
        SubAccount {
            address,
            public_key,
            private_key,
            balance: 0,
            height: 0,
            received: Vec::new(),
        }
    }

    /// P2PKH scriptPubKey for an address of this network
    pub fn address_to_script_pubkey(&self, address: &str) -> Result<Vec<u8>> {
        let payload = base58::check_decode(address, self.version)?;
        let pubkey_hash: [u8; 20] = payload.as_slice().try_into().map_err(|_| {
            WalletError::Decode(format!("address payload must be 20 bytes, got {}", payload.len()))
        })?;
        Ok(Script::p2pkh_script_pubkey(&pubkey_hash))
    }

    /// DER-encoded ECDSA signature over a 32-byte hash
    pub fn sign(&self, keypair: &KeyPair, hash: &Hash256) -> Vec<u8> {
        let message = Message::from_digest(*hash.as_bytes());
        self.secp
            .sign_ecdsa(&message, &keypair.secret_key)
            .serialize_der()
            .to_vec()
    }
}
