//! Block hashing and sealing.

use super::error::LedgerResult;
use shared_crypto::digest;
use shared_types::Block;

/// Digest of the block's canonical encoding (every field except `hash`).
pub fn compute_hash(block: &Block) -> LedgerResult<String> {
    Ok(digest(&block.canonical_bytes()?))
}

/// Fill in `hash` from the block's content.
pub fn seal(mut block: Block) -> LedgerResult<Block> {
    block.hash = compute_hash(&block)?;
    Ok(block)
}

/// The sealed genesis block. Identical on every node.
pub fn genesis_block() -> LedgerResult<Block> {
    seal(Block::genesis_unsealed())
}
