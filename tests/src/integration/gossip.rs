#[cfg(test)]
mod tests {
    use crate::integration::harness::{eventually, TestNode};
    use qc_05_block_propagation::WireMessage;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_announced_block_relays_across_line() {
        // a <-> b <-> c; a and c are not connected.
        let a = TestNode::start().await;
        let b = TestNode::start().await;
        let c = TestNode::start().await;
        b.connect(&a).await;
        c.connect(&b).await;
        assert!(eventually(|| b.transport.connected_count() == 2).await);
        assert!(eventually(|| a.transport.connected_count() == 1).await);

        let block = a.mine_register("alice_addr");
        assert_eq!(a.transport.announce_block(&block).unwrap(), 1);

        assert!(eventually(|| b.ledger.len() == 2).await);
        assert!(eventually(|| c.ledger.len() == 2).await);
        assert_eq!(c.ledger.tip(), block);

        for node in [&a, &b, &c] {
            node.shutdown();
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_same_new_block_twice_appends_once() {
        let a = TestNode::start().await;
        let b = TestNode::start().await;
        b.connect(&a).await;
        assert!(eventually(|| a.transport.connected_count() == 1).await);

        let block = a.mine_register("alice_addr");
        let frame = Arc::new(WireMessage::NewBlock(block).encode().unwrap());
        assert_eq!(a.transport.broadcast(Arc::clone(&frame), None), 1);
        assert_eq!(a.transport.broadcast(frame, None), 1);

        assert!(eventually(|| b.ledger.len() == 2).await);
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert_eq!(b.ledger.len(), 2);
        assert_eq!(b.ledger.chain(), a.ledger.chain());

        a.shutdown();
        b.shutdown();
    }
}
