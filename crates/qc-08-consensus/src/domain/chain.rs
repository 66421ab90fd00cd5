//! Chain state management

use super::block::genesis_block;
use super::error::LedgerResult;
use shared_types::Block;

/// The local chain: genesis first, append-only except for wholesale
/// replacement by fork choice.
#[derive(Clone, Debug)]
pub struct ChainState {
    blocks: Vec<Block>,
}

impl ChainState {
    /// Chain holding only the genesis block.
    pub fn with_genesis() -> LedgerResult<Self> {
        Ok(Self {
            blocks: vec![genesis_block()?],
        })
    }

    /// Latest block.
    pub fn tip(&self) -> &Block {
        // Never empty: built with genesis, replaced only by validated chains.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block at `index`.
    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// Whether a block with this hash is anywhere in the chain.
    pub fn contains_hash(&self, hash: &str) -> bool {
        self.blocks.iter().any(|b| b.hash == hash)
    }

    /// All blocks in order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Append a block that has already been validated against the tip.
    pub(crate) fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Swap in a validated, non-empty chain.
    pub(crate) fn replace(&mut self, blocks: Vec<Block>) {
        debug_assert!(!blocks.is_empty());
        self.blocks = blocks;
    }
}
