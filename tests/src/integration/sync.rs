#[cfg(test)]
mod tests {
    use crate::integration::harness::{eventually, TestNode};
    use qc_08_consensus::genesis_block;
    use shared_types::TxKind;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_new_node_syncs_mined_chain() {
        let a = TestNode::start().await;
        let block = a.mine_register("alice_addr");
        assert_eq!(block.index, 1);
        assert_eq!(block.transactions[0].kind(), TxKind::Register);

        let b = TestNode::start().await;
        assert_eq!(b.ledger.len(), 1);
        b.connect(&a).await;

        assert!(eventually(|| b.ledger.len() == 2).await);
        assert_eq!(b.ledger.chain(), a.ledger.chain());
        assert_eq!(b.ledger.chain()[0], genesis_block().unwrap());

        a.shutdown();
        b.shutdown();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_longer_chain_is_not_replaced_by_shorter_peer() {
        let a = TestNode::start().await;
        a.mine_register("a1");
        a.mine_register("a2");

        let b = TestNode::start().await;
        b.mine_register("b1");
        let a_chain = a.ledger.chain();

        // A asks B on connect and keeps its longer chain; B asks A explicitly.
        a.connect(&b).await;
        assert!(eventually(|| b.transport.connected_count() == 1).await);
        assert_eq!(b.transport.request_sync().unwrap(), 1);

        assert!(eventually(|| b.ledger.chain() == a_chain).await);
        assert_eq!(a.ledger.chain(), a_chain);

        a.shutdown();
        b.shutdown();
    }
}
