//! # Wire Protocol
//!
//! Every message is a one-byte type tag followed by a type-specific payload.
//! On the stream each message travels inside one length-prefixed frame (see
//! `adapters::framing`).
//!
//! | Tag | Name | Payload |
//! |-----|------|---------|
//! | 0x01 | PEER_LIST | `[count:1][(ipv4:4 + port:2 BE)] x count` |
//! | 0x02 | TEXT_MSG | `[counter:4 BE][utf8 text]` |
//! | 0x03 | NEW_BLOCK | JSON block |
//! | 0x04 | BLOCKCHAIN_REQUEST | empty |
//! | 0x05 | BLOCKCHAIN_RESPONSE | JSON array of blocks |
//! | 0x06 | GET_BLOCK_BY_INDEX | BE unsigned index, 8 bytes (1 to 8 accepted) |
//! | 0x07 | BLOCK_RESPONSE | JSON block, or the literal `Block not found` |

use super::errors::WireError;
use shared_types::{Block, PeerAddress};
use std::net::Ipv4Addr;

/// Payload of a BLOCK_RESPONSE for an index the chain does not have.
pub const BLOCK_NOT_FOUND: &[u8] = b"Block not found";

/// Bytes per PEER_LIST entry.
const PEER_ENTRY_LEN: usize = 6;

/// Message type tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    PeerList = 0x01,
    TextMsg = 0x02,
    NewBlock = 0x03,
    BlockchainRequest = 0x04,
    BlockchainResponse = 0x05,
    GetBlockByIndex = 0x06,
    BlockResponse = 0x07,
}

impl TryFrom<u8> for MessageType {
    type Error = WireError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0x01 => Ok(Self::PeerList),
            0x02 => Ok(Self::TextMsg),
            0x03 => Ok(Self::NewBlock),
            0x04 => Ok(Self::BlockchainRequest),
            0x05 => Ok(Self::BlockchainResponse),
            0x06 => Ok(Self::GetBlockByIndex),
            0x07 => Ok(Self::BlockResponse),
            other => Err(WireError::UnknownType(other)),
        }
    }
}

/// A decoded protocol message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireMessage {
    /// Currently connected peers of the sender.
    PeerList(Vec<PeerAddress>),
    /// Advisory heartbeat.
    Text { counter: u32, text: String },
    /// A block to append and relay.
    NewBlock(Block),
    /// Ask for the full chain.
    BlockchainRequest,
    /// The sender's full chain.
    BlockchainResponse(Vec<Block>),
    /// Ask for one block by index.
    GetBlockByIndex(u64),
    /// Answer to `GetBlockByIndex`; `None` when out of range.
    BlockResponse(Option<Block>),
}

impl WireMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::PeerList(_) => MessageType::PeerList,
            Self::Text { .. } => MessageType::TextMsg,
            Self::NewBlock(_) => MessageType::NewBlock,
            Self::BlockchainRequest => MessageType::BlockchainRequest,
            Self::BlockchainResponse(_) => MessageType::BlockchainResponse,
            Self::GetBlockByIndex(_) => MessageType::GetBlockByIndex,
            Self::BlockResponse(_) => MessageType::BlockResponse,
        }
    }

    /// Encode as `[tag][payload]`.
    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut out = vec![self.message_type() as u8];
        match self {
            Self::PeerList(peers) => {
                let count =
                    u8::try_from(peers.len()).map_err(|_| WireError::TooManyPeers(peers.len()))?;
                out.reserve(1 + peers.len() * PEER_ENTRY_LEN);
                out.push(count);
                for peer in peers {
                    out.extend_from_slice(&peer.ip.octets());
                    out.extend_from_slice(&peer.port.to_be_bytes());
                }
            }
            Self::Text { counter, text } => {
                out.extend_from_slice(&counter.to_be_bytes());
                out.extend_from_slice(text.as_bytes());
            }
            Self::NewBlock(block) => serde_json::to_writer(&mut out, block)?,
            Self::BlockchainRequest => {}
            Self::BlockchainResponse(chain) => serde_json::to_writer(&mut out, chain)?,
            Self::GetBlockByIndex(index) => out.extend_from_slice(&index.to_be_bytes()),
            Self::BlockResponse(Some(block)) => serde_json::to_writer(&mut out, block)?,
            Self::BlockResponse(None) => out.extend_from_slice(BLOCK_NOT_FOUND),
        }
        Ok(out)
    }

    /// Decode one message. Never panics on hostile input.
    pub fn decode(raw: &[u8]) -> Result<Self, WireError> {
        let (&tag, payload) = raw.split_first().ok_or(WireError::Empty)?;
        match MessageType::try_from(tag)? {
            MessageType::PeerList => decode_peer_list(payload).map(Self::PeerList),
            MessageType::TextMsg => {
                if payload.len() < 4 {
                    return Err(WireError::Malformed {
                        kind: MessageType::TextMsg,
                        reason: format!("{} bytes, need at least 4", payload.len()),
                    });
                }
                let (counter, text) = payload.split_at(4);
                let counter = u32::from_be_bytes([counter[0], counter[1], counter[2], counter[3]]);
                let text = String::from_utf8(text.to_vec()).map_err(|e| WireError::Malformed {
                    kind: MessageType::TextMsg,
                    reason: e.to_string(),
                })?;
                Ok(Self::Text { counter, text })
            }
            MessageType::NewBlock => Ok(Self::NewBlock(serde_json::from_slice(payload)?)),
            MessageType::BlockchainRequest => Ok(Self::BlockchainRequest),
            MessageType::BlockchainResponse => {
                Ok(Self::BlockchainResponse(serde_json::from_slice(payload)?))
            }
            MessageType::GetBlockByIndex => decode_index(payload).map(Self::GetBlockByIndex),
            MessageType::BlockResponse => {
                if payload == BLOCK_NOT_FOUND {
                    Ok(Self::BlockResponse(None))
                } else {
                    Ok(Self::BlockResponse(Some(serde_json::from_slice(payload)?)))
                }
            }
        }
    }
}

fn decode_peer_list(payload: &[u8]) -> Result<Vec<PeerAddress>, WireError> {
    let (&count, entries) = payload.split_first().ok_or(WireError::Malformed {
        kind: MessageType::PeerList,
        reason: "missing count".to_string(),
    })?;
    let expected = count as usize * PEER_ENTRY_LEN;
    if entries.len() != expected {
        return Err(WireError::Malformed {
            kind: MessageType::PeerList,
            reason: format!("{count} entries need {expected} bytes, got {}", entries.len()),
        });
    }
    Ok(entries
        .chunks_exact(PEER_ENTRY_LEN)
        .map(|e| {
            PeerAddress::new(
                Ipv4Addr::new(e[0], e[1], e[2], e[3]),
                u16::from_be_bytes([e[4], e[5]]),
            )
        })
        .collect())
}

fn decode_index(payload: &[u8]) -> Result<u64, WireError> {
    if payload.is_empty() || payload.len() > 8 {
        return Err(WireError::Malformed {
            kind: MessageType::GetBlockByIndex,
            reason: format!("index of {} bytes, expected 1 to 8", payload.len()),
        });
    }
    Ok(payload.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_08_consensus::genesis_block;

    fn peer(i: u16) -> PeerAddress {
        PeerAddress::new(Ipv4Addr::new(10, 0, (i >> 8) as u8, i as u8), 8760 + i)
    }

    #[test]
    fn test_peer_list_roundtrip_every_count() {
        for count in 0..=255u16 {
            let peers: Vec<_> = (0..count).map(peer).collect();
            let encoded = WireMessage::PeerList(peers.clone()).encode().unwrap();
            assert_eq!(encoded.len(), 2 + count as usize * 6);
            assert_eq!(
                WireMessage::decode(&encoded).unwrap(),
                WireMessage::PeerList(peers)
            );
        }
    }

    #[test]
    fn test_peer_list_too_long_rejected() {
        let peers: Vec<_> = (0..256).map(peer).collect();
        assert_eq!(
            WireMessage::PeerList(peers).encode(),
            Err(WireError::TooManyPeers(256))
        );
    }

    #[test]
    fn test_peer_list_layout() {
        let encoded = WireMessage::PeerList(vec![PeerAddress::new(Ipv4Addr::LOCALHOST, 8761)])
            .encode()
            .unwrap();
        assert_eq!(encoded, vec![0x01, 1, 127, 0, 0, 1, 0x22, 0x39]);
    }

    #[test]
    fn test_truncated_peer_list_rejected() {
        let raw = [0x01, 2, 127, 0, 0, 1, 0x22, 0x39];
        assert!(matches!(
            WireMessage::decode(&raw),
            Err(WireError::Malformed {
                kind: MessageType::PeerList,
                ..
            })
        ));
    }

    #[test]
    fn test_text_layout() {
        let msg = WireMessage::Text {
            counter: 7,
            text: "Hello from 8760 - 7".into(),
        };
        let encoded = msg.encode().unwrap();
        assert_eq!(&encoded[..5], &[0x02, 0, 0, 0, 7]);
        assert_eq!(WireMessage::decode(&encoded).unwrap(), msg);
    }

    #[test]
    fn test_get_block_by_index_accepts_short_integers() {
        assert_eq!(
            WireMessage::decode(&[0x06, 0x01, 0x00]).unwrap(),
            WireMessage::GetBlockByIndex(256)
        );
        let encoded = WireMessage::GetBlockByIndex(3).encode().unwrap();
        assert_eq!(encoded, vec![0x06, 0, 0, 0, 0, 0, 0, 0, 3]);
        assert!(WireMessage::decode(&[0x06]).is_err());
        assert!(WireMessage::decode(&[0x06; 10]).is_err());
    }

    #[test]
    fn test_block_response_not_found() {
        let encoded = WireMessage::BlockResponse(None).encode().unwrap();
        assert_eq!(&encoded[1..], b"Block not found");
        assert_eq!(
            WireMessage::decode(&encoded).unwrap(),
            WireMessage::BlockResponse(None)
        );
    }

    #[test]
    fn test_block_json_uses_ledger_field_names() {
        let block = genesis_block().unwrap();
        let encoded = WireMessage::NewBlock(block.clone()).encode().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&encoded[1..]).unwrap();
        assert_eq!(json["prev_hash"], block.prev_hash.as_str());
        assert_eq!(json["hash"], block.hash.as_str());
        assert_eq!(
            WireMessage::decode(&encoded).unwrap(),
            WireMessage::NewBlock(block)
        );
    }

    #[test]
    fn test_chain_response() {
        let chain = vec![genesis_block().unwrap()];
        let encoded = WireMessage::BlockchainResponse(chain.clone()).encode().unwrap();
        assert_eq!(encoded[0], 0x05);
        assert_eq!(encoded[1], b'[');
        assert_eq!(
            WireMessage::decode(&encoded).unwrap(),
            WireMessage::BlockchainResponse(chain)
        );
    }

    #[test]
    fn test_malformed_input() {
        assert_eq!(WireMessage::decode(&[]), Err(WireError::Empty));
        assert_eq!(WireMessage::decode(&[0x42]), Err(WireError::UnknownType(0x42)));
        assert!(matches!(
            WireMessage::decode(b"\x03{not json"),
            Err(WireError::Json(_))
        ));
        assert!(WireMessage::decode(&[0x02, 0, 0]).is_err());
        assert_eq!(
            WireMessage::decode(&[0x04]).unwrap(),
            WireMessage::BlockchainRequest
        );
    }
}
