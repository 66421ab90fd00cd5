use crate::domain::{compute_hash, verify_transaction, LedgerError, LedgerResult};
use rayon::prelude::*;
use shared_crypto::SignatureScheme;
use shared_types::Block;

/// Stateless validation logic for blocks and chains.
pub struct BlockValidator;

impl BlockValidator {
    /// Stored hash must equal the digest of the block's content.
    pub fn validate_digest(block: &Block) -> LedgerResult<()> {
        let computed = compute_hash(block)?;
        if computed != block.hash {
            return Err(LedgerError::HashMismatch {
                index: block.index,
                stored: block.hash.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Every transaction's signature must verify. Checks run on the rayon
    /// pool; the first failing position is reported.
    pub fn validate_signatures<S: SignatureScheme + ?Sized>(
        scheme: &S,
        block: &Block,
    ) -> LedgerResult<()> {
        let failed = block
            .transactions
            .par_iter()
            .position_first(|tx| !verify_transaction(scheme, tx));
        match failed {
            Some(position) => Err(LedgerError::InvalidSignature {
                index: block.index,
                position,
            }),
            None => Ok(()),
        }
    }

    /// For non-genesis blocks, `reference[index - 1]` must exist and its hash
    /// must equal `prev_hash`.
    pub fn validate_parent(block: &Block, reference: &[Block]) -> LedgerResult<()> {
        if block.is_genesis() {
            return Ok(());
        }
        let parent_index = block.index - 1;
        let parent = usize::try_from(parent_index)
            .ok()
            .and_then(|i| reference.get(i))
            .ok_or(LedgerError::UnknownParent {
                index: block.index,
                parent: parent_index,
            })?;
        if parent.hash != block.prev_hash {
            return Err(LedgerError::LinkageMismatch { index: block.index });
        }
        Ok(())
    }

    /// Digest, then signatures, then linkage against `reference`.
    pub fn validate_block<S: SignatureScheme + ?Sized>(
        scheme: &S,
        block: &Block,
        reference: &[Block],
    ) -> LedgerResult<()> {
        Self::validate_digest(block)?;
        Self::validate_signatures(scheme, block)?;
        Self::validate_parent(block, reference)
    }

    /// Validate a whole candidate chain against itself. Fails fast on the
    /// first bad block.
    pub fn validate_chain<S: SignatureScheme + ?Sized>(
        scheme: &S,
        chain: &[Block],
    ) -> LedgerResult<()> {
        let first = chain.first().ok_or(LedgerError::EmptyChain)?;
        if first.index != 0 {
            return Err(LedgerError::MissingGenesis(first.index));
        }
        Self::validate_digest(first)?;
        Self::validate_signatures(scheme, first)?;

        for (position, pair) in chain.windows(2).enumerate() {
            let (prev, block) = (&pair[0], &pair[1]);
            if block.index != position as u64 + 1 {
                return Err(LedgerError::LinkageMismatch { index: block.index });
            }
            Self::validate_block(scheme, block, chain)?;
            if block.prev_hash != prev.hash {
                return Err(LedgerError::LinkageMismatch { index: block.index });
            }
        }
        Ok(())
    }
}
