//! # Signature Schemes
//!
//! `SignatureScheme` is the call contract the ledger verifies transactions
//! through. The default backend is Ed25519; a post-quantum backend plugs in
//! behind the same trait.
//!
//! ## Security Properties (Ed25519)
//!
//! - No RNG dependency when signing (deterministic nonce from message)
//! - Secret key bytes are zeroized on drop

use crate::CryptoError;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Secret key bytes, wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    /// Wrap raw secret bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// A generated keypair.
#[derive(Clone, Debug)]
pub struct KeyPair {
    /// Public key bytes.
    pub public: Vec<u8>,
    /// Secret key bytes.
    pub secret: SecretKey,
}

impl KeyPair {
    /// Public key as lowercase hex, the form carried in transactions.
    pub fn public_hex(&self) -> String {
        hex::encode(&self.public)
    }
}

/// Pluggable signature capability.
pub trait SignatureScheme: Send + Sync + 'static {
    /// Human-readable algorithm name, used in logs.
    fn name(&self) -> &'static str;

    /// Generate a fresh random keypair.
    fn generate_keypair(&self) -> KeyPair;

    /// Sign `message` with `secret`.
    fn sign(&self, secret: &SecretKey, message: &[u8]) -> Result<Vec<u8>, CryptoError>;

    /// Verify `signature` over `message` by `public`. Malformed input is
    /// `false`, never a panic.
    fn verify(&self, public: &[u8], message: &[u8], signature: &[u8]) -> bool;

    /// Sign and hex-encode the signature.
    fn sign_hex(&self, secret: &SecretKey, message: &[u8]) -> Result<String, CryptoError> {
        self.sign(secret, message).map(hex::encode)
    }

    /// Verify with hex-encoded key and signature.
    fn verify_hex(&self, public_hex: &str, message: &[u8], signature_hex: &str) -> bool {
        match (hex::decode(public_hex), hex::decode(signature_hex)) {
            (Ok(public), Ok(signature)) => self.verify(&public, message, &signature),
            _ => false,
        }
    }
}

/// Ed25519 backend (`ed25519-dalek`).
#[derive(Clone, Copy, Debug, Default)]
pub struct Ed25519Scheme;

impl Ed25519Scheme {
    fn signing_key(secret: &SecretKey) -> Result<SigningKey, CryptoError> {
        let mut seed: [u8; 32] =
            secret
                .as_bytes()
                .try_into()
                .map_err(|_| CryptoError::InvalidKeyLength {
                    expected: 32,
                    actual: secret.as_bytes().len(),
                })?;
        let key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Ok(key)
    }
}

impl SignatureScheme for Ed25519Scheme {
    fn name(&self) -> &'static str {
        "ed25519"
    }

    fn generate_keypair(&self) -> KeyPair {
        let signing_key = SigningKey::generate(&mut rand::thread_rng());
        KeyPair {
            public: signing_key.verifying_key().to_bytes().to_vec(),
            secret: SecretKey::from_bytes(signing_key.to_bytes().to_vec()),
        }
    }

    fn sign(&self, secret: &SecretKey, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let key = Self::signing_key(secret)?;
        Ok(key.sign(message).to_bytes().to_vec())
    }

    fn verify(&self, public: &[u8], message: &[u8], signature: &[u8]) -> bool {
        let Ok(public) = <[u8; 32]>::try_from(public) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&public) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(signature) else {
            return false;
        };
        verifying_key.verify(message, &signature).is_ok()
    }
}
