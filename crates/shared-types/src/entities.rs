//! # Core Domain Entities
//!
//! Defines the ledger entities shared by the consensus and propagation
//! subsystems.
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, `Transaction`, `TxPayload`
//! - **Network**: `PeerAddress`
//! - **Genesis**: fixed constants so that every node derives a byte-identical
//!   genesis block
//!
//! ## JSON Shape
//!
//! ```text
//! Transaction: {"tx_type": "REGISTER", "sender": "...", "receiver": "", "data": {...}}
//! Block:       {"index": 1, "validator": "...", "transactions": [...],
//!               "prev_hash": "<64 hex>", "timestamp": "<ISO-8601>", "hash": "<64 hex>"}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::str::FromStr;

use crate::codec::canonical_json;
use crate::errors::{CodecError, TransactionError};

// =============================================================================
// GENESIS CONSTANTS
// =============================================================================

/// Length of a hex-encoded SHA-256 digest.
pub const HASH_HEX_LEN: usize = 64;

/// Validator identity recorded in the genesis block.
pub const GENESIS_VALIDATOR: &str = "system";

/// Sender of the genesis transaction.
pub const GENESIS_SENDER: &str = "0";

/// Payload `name` of the genesis transaction.
pub const GENESIS_NAME: &str = "Genesis Block";

/// Genesis timestamp. Fixed so that all nodes agree on the genesis hash.
pub const GENESIS_TIMESTAMP: &str = "1970-01-01T00:00:00";

/// The `prev_hash` of the genesis block: 64 `'0'` characters.
pub fn zero_hash() -> String {
    "0".repeat(HASH_HEX_LEN)
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

/// String-keyed payload map as it appears on the wire.
pub type PayloadFields = BTreeMap<String, String>;

/// Transaction kind tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TxKind {
    /// System transaction carried only by the genesis block.
    Genesis,
    /// Identity registration, signed over `"REGISTER:" + sender`.
    Register,
    /// Public message, signed over its `message_hash`.
    PublicMessage,
    /// Encrypted message, signed over its `message_hash`.
    PrivateMessage,
}

impl TxKind {
    /// Wire tag of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Genesis => "GENESIS",
            Self::Register => "REGISTER",
            Self::PublicMessage => "PUBLIC_MESSAGE",
            Self::PrivateMessage => "PRIVATE_MESSAGE",
        }
    }

    /// Payload keys that must be present for this kind.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Genesis => &["name"],
            Self::Register => &["dilithium_pub", "kyber_pub", "signature"],
            Self::PublicMessage => &["message_hash", "signature", "dilithium_pub"],
            Self::PrivateMessage => &[
                "message_hash",
                "signature",
                "dilithium_pub",
                "ciphertext",
                "kyber_ciphertext",
            ],
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = TransactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GENESIS" => Ok(Self::Genesis),
            "REGISTER" => Ok(Self::Register),
            "PUBLIC_MESSAGE" => Ok(Self::PublicMessage),
            "PRIVATE_MESSAGE" => Ok(Self::PrivateMessage),
            other => Err(TransactionError::UnknownKind(other.to_string())),
        }
    }
}

fn take_field(fields: &mut PayloadFields, field: &str) -> String {
    fields.remove(field).unwrap_or_default()
}

/// Payload of the genesis transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenesisPayload {
    pub name: String,
}

/// Payload of an identity registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterPayload {
    /// Hex-encoded signing public key.
    pub dilithium_pub: String,
    /// Hex-encoded key-encapsulation public key (opaque to the ledger).
    pub kyber_pub: String,
    /// Hex-encoded signature over `"REGISTER:" + sender`.
    pub signature: String,
}

/// Payload of a public message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicMessagePayload {
    /// Hex SHA-256 of the message body.
    pub message_hash: String,
    /// Hex-encoded signature over `message_hash`.
    pub signature: String,
    /// Hex-encoded signing public key.
    pub dilithium_pub: String,
    /// Plaintext body, when the submitter attached it.
    pub message: Option<String>,
}

/// Payload of an encrypted message. `ciphertext` and `kyber_ciphertext` are
/// opaque to the ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrivateMessagePayload {
    pub message_hash: String,
    pub signature: String,
    pub dilithium_pub: String,
    pub ciphertext: String,
    pub kyber_ciphertext: String,
}

/// Kind-specific transaction payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxPayload {
    Genesis(GenesisPayload),
    Register(RegisterPayload),
    PublicMessage(PublicMessagePayload),
    PrivateMessage(PrivateMessagePayload),
}

impl TxPayload {
    /// Kind tag of this payload.
    pub fn kind(&self) -> TxKind {
        match self {
            Self::Genesis(_) => TxKind::Genesis,
            Self::Register(_) => TxKind::Register,
            Self::PublicMessage(_) => TxKind::PublicMessage,
            Self::PrivateMessage(_) => TxKind::PrivateMessage,
        }
    }

    /// Build a typed payload by taking this kind's keys out of `fields`.
    ///
    /// Fails with `MissingField` naming the first absent key of
    /// [`TxKind::required_fields`]. Keys the kind does not define are left
    /// in `fields`.
    pub fn take_from(kind: TxKind, fields: &mut PayloadFields) -> Result<Self, TransactionError> {
        if let Some(missing) = kind
            .required_fields()
            .iter()
            .find(|field| !fields.contains_key(**field))
        {
            return Err(TransactionError::MissingField {
                kind: kind.to_string(),
                field: (*missing).to_string(),
            });
        }

        let f = fields;
        let payload = match kind {
            TxKind::Genesis => Self::Genesis(GenesisPayload {
                name: take_field(f, "name"),
            }),
            TxKind::Register => Self::Register(RegisterPayload {
                dilithium_pub: take_field(f, "dilithium_pub"),
                kyber_pub: take_field(f, "kyber_pub"),
                signature: take_field(f, "signature"),
            }),
            TxKind::PublicMessage => Self::PublicMessage(PublicMessagePayload {
                message_hash: take_field(f, "message_hash"),
                signature: take_field(f, "signature"),
                dilithium_pub: take_field(f, "dilithium_pub"),
                message: f.remove("message"),
            }),
            TxKind::PrivateMessage => Self::PrivateMessage(PrivateMessagePayload {
                message_hash: take_field(f, "message_hash"),
                signature: take_field(f, "signature"),
                dilithium_pub: take_field(f, "dilithium_pub"),
                ciphertext: take_field(f, "ciphertext"),
                kyber_ciphertext: take_field(f, "kyber_ciphertext"),
            }),
        };
        Ok(payload)
    }

    /// Flatten back into the wire map.
    pub fn to_fields(&self) -> PayloadFields {
        let mut fields = PayloadFields::new();
        let mut put = |k: &str, v: &str| {
            fields.insert(k.to_string(), v.to_string());
        };
        match self {
            Self::Genesis(p) => put("name", &p.name),
            Self::Register(p) => {
                put("dilithium_pub", &p.dilithium_pub);
                put("kyber_pub", &p.kyber_pub);
                put("signature", &p.signature);
            }
            Self::PublicMessage(p) => {
                put("message_hash", &p.message_hash);
                put("signature", &p.signature);
                put("dilithium_pub", &p.dilithium_pub);
                if let Some(body) = &p.message {
                    put("message", body);
                }
            }
            Self::PrivateMessage(p) => {
                put("message_hash", &p.message_hash);
                put("signature", &p.signature);
                put("dilithium_pub", &p.dilithium_pub);
                put("ciphertext", &p.ciphertext);
                put("kyber_ciphertext", &p.kyber_ciphertext);
            }
        }
        fields
    }
}

/// What a transaction's signature must prove: `signature` by `public_key`
/// over `message`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureClaim<'a> {
    /// Hex-encoded public key.
    pub public_key: &'a str,
    /// Message bytes the signature covers.
    pub message: Vec<u8>,
    /// Hex-encoded signature.
    pub signature: &'a str,
}

/// A ledger transaction.
///
/// Immutable once constructed; consumed when included in a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTransaction", into = "RawTransaction")]
pub struct Transaction {
    /// Sender address.
    pub sender: String,
    /// Receiver address (empty for system transactions).
    pub receiver: String,
    /// Kind-specific payload.
    pub payload: TxPayload,
    /// Payload keys the kind does not define. Carried through unchanged so
    /// the block hash matches the one the sender computed.
    pub extra: PayloadFields,
}

impl Transaction {
    /// Creates a transaction from an already typed payload.
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, payload: TxPayload) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            payload,
            extra: PayloadFields::new(),
        }
    }

    /// Creates a transaction from a kind tag and a string map, the shape a
    /// request handler receives.
    pub fn from_fields(
        kind: TxKind,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        mut data: PayloadFields,
    ) -> Result<Self, TransactionError> {
        let payload = TxPayload::take_from(kind, &mut data)?;
        Ok(Self {
            extra: data,
            ..Self::new(sender, receiver, payload)
        })
    }

    /// The single transaction of the genesis block.
    pub fn genesis() -> Self {
        Self::new(
            GENESIS_SENDER,
            "",
            TxPayload::Genesis(GenesisPayload {
                name: GENESIS_NAME.to_string(),
            }),
        )
    }

    /// Kind tag.
    pub fn kind(&self) -> TxKind {
        self.payload.kind()
    }

    /// The signature this transaction must carry, or `None` for kinds that
    /// are valid without one (genesis).
    pub fn signature_claim(&self) -> Option<SignatureClaim<'_>> {
        match &self.payload {
            TxPayload::Genesis(_) => None,
            TxPayload::Register(p) => Some(SignatureClaim {
                public_key: &p.dilithium_pub,
                message: format!("REGISTER:{}", self.sender).into_bytes(),
                signature: &p.signature,
            }),
            TxPayload::PublicMessage(p) => Some(SignatureClaim {
                public_key: &p.dilithium_pub,
                message: p.message_hash.as_bytes().to_vec(),
                signature: &p.signature,
            }),
            TxPayload::PrivateMessage(p) => Some(SignatureClaim {
                public_key: &p.dilithium_pub,
                message: p.message_hash.as_bytes().to_vec(),
                signature: &p.signature,
            }),
        }
    }
}

/// Wire representation of a transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawTransaction {
    tx_type: String,
    sender: String,
    receiver: String,
    data: PayloadFields,
}

impl TryFrom<RawTransaction> for Transaction {
    type Error = TransactionError;

    fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
        let kind = raw.tx_type.parse::<TxKind>()?;
        Transaction::from_fields(kind, raw.sender, raw.receiver, raw.data)
    }
}

impl From<Transaction> for RawTransaction {
    fn from(tx: Transaction) -> Self {
        let tx_type = tx.kind().as_str().to_string();
        let mut data = tx.extra;
        data.extend(tx.payload.to_fields());
        Self {
            tx_type,
            data,
            sender: tx.sender,
            receiver: tx.receiver,
        }
    }
}

// =============================================================================
// BLOCKS
// =============================================================================

/// A block of transactions.
///
/// `hash` is the hex digest of [`Block::canonical_bytes`]; it is empty only
/// while the block is being sealed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain (0 = genesis).
    pub index: u64,
    /// Identity of the validator that produced the block.
    pub validator: String,
    /// Ordered transactions.
    pub transactions: Vec<Transaction>,
    /// Hash of the previous block.
    pub prev_hash: String,
    /// UTC creation time, ISO-8601.
    pub timestamp: String,
    /// Hash of this block.
    #[serde(default)]
    pub hash: String,
}

impl Block {
    /// Creates a block with an empty `hash`.
    pub fn unsealed(
        index: u64,
        validator: impl Into<String>,
        transactions: Vec<Transaction>,
        prev_hash: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            index,
            validator: validator.into(),
            transactions,
            prev_hash: prev_hash.into(),
            timestamp: timestamp.into(),
            hash: String::new(),
        }
    }

    /// The genesis block before sealing.
    pub fn genesis_unsealed() -> Self {
        Self::unsealed(
            0,
            GENESIS_VALIDATOR,
            vec![Transaction::genesis()],
            zero_hash(),
            GENESIS_TIMESTAMP,
        )
    }

    /// Returns true for index 0.
    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Digest input: every field except `hash`, canonical JSON.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut value =
            serde_json::to_value(self).map_err(|e| CodecError::Serialize(e.to_string()))?;
        if let Some(object) = value.as_object_mut() {
            object.remove("hash");
        }
        Ok(canonical_json(&value).into_bytes())
    }
}

// =============================================================================
// PEERS
// =============================================================================

/// Network address of a peer: IPv4 host and TCP port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeerAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl PeerAddress {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Socket address for connecting or binding.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }

    /// Converts a socket address; IPv6 addresses have no wire encoding and
    /// yield `None`.
    pub fn from_socket_addr(addr: SocketAddr) -> Option<Self> {
        match addr {
            SocketAddr::V4(v4) => Some(Self::new(*v4.ip(), v4.port())),
            SocketAddr::V6(_) => None,
        }
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_fields() -> PayloadFields {
        let mut data = PayloadFields::new();
        data.insert("dilithium_pub".into(), "aa".into());
        data.insert("kyber_pub".into(), "bb".into());
        data.insert("signature".into(), "cc".into());
        data
    }

    #[test]
    fn test_transaction_json_shape() {
        let tx = Transaction::from_fields(TxKind::Register, "addr1", "", register_fields()).unwrap();
        let json = serde_json::to_value(&tx).unwrap();

        assert_eq!(json["tx_type"], "REGISTER");
        assert_eq!(json["sender"], "addr1");
        assert_eq!(json["receiver"], "");
        assert_eq!(json["data"]["kyber_pub"], "bb");

        let decoded: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_missing_field_rejected_at_construction() {
        let mut data = register_fields();
        data.remove("signature");

        let err = Transaction::from_fields(TxKind::Register, "addr1", "", data).unwrap_err();
        assert_eq!(
            err,
            TransactionError::MissingField {
                kind: "REGISTER".into(),
                field: "signature".into()
            }
        );
    }

    #[test]
    fn test_private_message_requires_ciphertexts() {
        let mut data = PayloadFields::new();
        data.insert("message_hash".into(), "h".into());
        data.insert("signature".into(), "s".into());
        data.insert("dilithium_pub".into(), "p".into());
        data.insert("ciphertext".into(), "c".into());

        let err = Transaction::from_fields(TxKind::PrivateMessage, "a", "b", data).unwrap_err();
        assert!(matches!(err, TransactionError::MissingField { field, .. } if field == "kyber_ciphertext"));
    }

    #[test]
    fn test_unknown_payload_keys_survive_decode() {
        let json = r#"{"tx_type":"REGISTER","sender":"a","receiver":"","data":{"dilithium_pub":"aa","kyber_pub":"bb","signature":"cc","nickname":"al"}}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();

        assert_eq!(tx.extra.get("nickname").map(String::as_str), Some("al"));
        assert!(matches!(tx.payload, TxPayload::Register(_)));
        let reencoded = serde_json::to_value(&tx).unwrap();
        assert_eq!(reencoded["data"]["nickname"], "al");
        assert_eq!(reencoded["data"]["signature"], "cc");
    }

    #[test]
    fn test_extra_keys_change_canonical_bytes() {
        let plain = Transaction::from_fields(TxKind::Register, "a", "", register_fields()).unwrap();
        let mut data = register_fields();
        data.insert("nickname".into(), "al".into());
        let extended = Transaction::from_fields(TxKind::Register, "a", "", data).unwrap();

        let block = |tx: Transaction| Block::unsealed(1, "v", vec![tx], zero_hash(), "t");
        assert_ne!(
            block(plain).canonical_bytes().unwrap(),
            block(extended).canonical_bytes().unwrap()
        );
    }

    #[test]
    fn test_required_fields_drive_construction() {
        for kind in [TxKind::Register, TxKind::PublicMessage, TxKind::PrivateMessage] {
            let full: PayloadFields = kind
                .required_fields()
                .iter()
                .map(|f| (f.to_string(), "x".to_string()))
                .collect();
            let tx = Transaction::from_fields(kind, "a", "b", full.clone()).unwrap();
            assert!(tx.extra.is_empty());

            for field in kind.required_fields() {
                let mut partial = full.clone();
                partial.remove(*field);
                assert_eq!(
                    Transaction::from_fields(kind, "a", "b", partial).unwrap_err(),
                    TransactionError::MissingField {
                        kind: kind.to_string(),
                        field: field.to_string(),
                    }
                );
            }
        }
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let json = r#"{"tx_type":"TRANSFER","sender":"a","receiver":"b","data":{}}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_register_signature_claim_covers_sender() {
        let tx = Transaction::from_fields(TxKind::Register, "addr1", "", register_fields()).unwrap();
        let claim = tx.signature_claim().unwrap();
        assert_eq!(claim.message, b"REGISTER:addr1".to_vec());
        assert_eq!(claim.public_key, "aa");
        assert!(Transaction::genesis().signature_claim().is_none());
    }

    #[test]
    fn test_canonical_bytes_exclude_hash() {
        let mut block = Block::genesis_unsealed();
        let before = block.canonical_bytes().unwrap();
        block.hash = "ff".repeat(32);
        assert_eq!(block.canonical_bytes().unwrap(), before);

        let text = String::from_utf8(before).unwrap();
        assert!(text.starts_with(r#"{"index":0,"prev_hash":""#));
        assert!(!text.contains(": ") && !text.contains(", "));
        assert!(!text.contains("\"hash\""));
    }

    #[test]
    fn test_block_json_field_names() {
        let block = Block::genesis_unsealed();
        let json = serde_json::to_value(&block).unwrap();
        for key in ["index", "validator", "transactions", "prev_hash", "timestamp", "hash"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["prev_hash"].as_str().unwrap().len(), HASH_HEX_LEN);
    }

    #[test]
    fn test_peer_address_display() {
        let addr = PeerAddress::new(Ipv4Addr::LOCALHOST, 8761);
        assert_eq!(addr.to_string(), "127.0.0.1:8761");
        assert_eq!(PeerAddress::from_socket_addr(addr.socket_addr()), Some(addr));
    }
}
