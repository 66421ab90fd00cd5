//! Builders for signed transactions.
//!
//! The request layer that registers users and submits messages lives outside
//! this workspace. These helpers produce the same payloads it does, so nodes
//! and tests can exercise the full signature path.

use shared_crypto::{digest, CryptoError, KeyPair, SignatureScheme};
use shared_types::{
    PrivateMessagePayload, PublicMessagePayload, RegisterPayload, Transaction, TxPayload,
};

/// Message a REGISTER signature covers.
pub fn register_message(sender: &str) -> Vec<u8> {
    format!("REGISTER:{sender}").into_bytes()
}

/// REGISTER transaction for `sender`, signed with `keys`.
pub fn signed_register<S: SignatureScheme + ?Sized>(
    scheme: &S,
    keys: &KeyPair,
    sender: &str,
    kyber_pub: &str,
) -> Result<Transaction, CryptoError> {
    let signature = scheme.sign_hex(&keys.secret, &register_message(sender))?;
    Ok(Transaction::new(
        sender,
        "",
        TxPayload::Register(RegisterPayload {
            dilithium_pub: keys.public_hex(),
            kyber_pub: kyber_pub.to_string(),
            signature,
        }),
    ))
}

/// PUBLIC_MESSAGE carrying `body`, signed over its hash.
pub fn signed_public_message<S: SignatureScheme + ?Sized>(
    scheme: &S,
    keys: &KeyPair,
    sender: &str,
    receiver: &str,
    body: &str,
) -> Result<Transaction, CryptoError> {
    let message_hash = digest(body.as_bytes());
    let signature = scheme.sign_hex(&keys.secret, message_hash.as_bytes())?;
    Ok(Transaction::new(
        sender,
        receiver,
        TxPayload::PublicMessage(PublicMessagePayload {
            message_hash,
            signature,
            dilithium_pub: keys.public_hex(),
            message: Some(body.to_string()),
        }),
    ))
}

/// PRIVATE_MESSAGE with already-encrypted content. `plaintext_hash` is the
/// hex digest the signature covers.
pub fn signed_private_message<S: SignatureScheme + ?Sized>(
    scheme: &S,
    keys: &KeyPair,
    sender: &str,
    receiver: &str,
    plaintext_hash: String,
    ciphertext: String,
    kyber_ciphertext: String,
) -> Result<Transaction, CryptoError> {
    let signature = scheme.sign_hex(&keys.secret, plaintext_hash.as_bytes())?;
    Ok(Transaction::new(
        sender,
        receiver,
        TxPayload::PrivateMessage(PrivateMessagePayload {
            message_hash: plaintext_hash,
            signature,
            dilithium_pub: keys.public_hex(),
            ciphertext,
            kyber_ciphertext,
        }),
    ))
}

/// Check one transaction's signature. Genesis transactions carry none and
/// always pass.
pub fn verify_transaction<S: SignatureScheme + ?Sized>(scheme: &S, tx: &Transaction) -> bool {
    match tx.signature_claim() {
        None => true,
        Some(claim) => scheme.verify_hex(claim.public_key, &claim.message, claim.signature),
    }
}
