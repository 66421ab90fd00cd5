#[cfg(test)]
mod tests {
    use crate::integration::harness::{eventually, register};
    use node_runtime::{mine_once, spawn_mining_task, MiningTick, NodeConfig, SubsystemContainer};
    use shared_types::PeerAddress;
    use std::time::Duration;
    use tokio::sync::watch;

    /// A fully wired node on a free loopback port, listener running.
    async fn start_node(validator: Option<&str>) -> (SubsystemContainer, PeerAddress) {
        let mut config = NodeConfig::default();
        config.network.transport.port = 0;
        config.mining.validator_id = validator.map(str::to_string);
        let container = SubsystemContainer::new(config).unwrap();
        let bound = container.transport.start().await.unwrap();
        (container, PeerAddress::from_socket_addr(bound).unwrap())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_mined_block_reaches_connected_node() {
        let (producer, producer_addr) = start_node(Some("validator_001")).await;
        let (follower, _) = start_node(None).await;
        assert!(follower
            .transport
            .connect_to_peer(producer_addr)
            .await
            .unwrap());
        assert!(eventually(|| producer.transport.connected_count() == 1).await);

        producer.ledger.submit(register("alice_addr")).unwrap();
        let tick = mine_once(&producer.ledger_api(), &producer.transport, "validator_001").await;

        assert_eq!(tick, MiningTick::Sealed { index: 1, peers: 1 });
        assert!(eventually(|| follower.ledger.len() == 2).await);
        assert_eq!(follower.ledger.chain(), producer.ledger.chain());

        producer.transport.shutdown();
        follower.transport.shutdown();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unauthorized_producer_changes_nobody() {
        let (producer, producer_addr) = start_node(Some("intruder")).await;
        let (follower, _) = start_node(None).await;
        assert!(follower
            .transport
            .connect_to_peer(producer_addr)
            .await
            .unwrap());
        assert!(eventually(|| producer.transport.connected_count() == 1).await);

        producer.ledger.submit(register("alice_addr")).unwrap();
        let tick = mine_once(&producer.ledger_api(), &producer.transport, "intruder").await;

        assert!(matches!(tick, MiningTick::Failed(_)));
        assert_eq!(producer.ledger.pool_size(), 1);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(follower.ledger.len(), 1);

        producer.transport.shutdown();
        follower.transport.shutdown();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_mining_task_produces_and_gossips_until_shutdown() {
        let (producer, producer_addr) = start_node(Some("validator_002")).await;
        let (follower, _) = start_node(None).await;
        assert!(follower
            .transport
            .connect_to_peer(producer_addr)
            .await
            .unwrap());
        assert!(eventually(|| producer.transport.connected_count() == 1).await);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = spawn_mining_task(
            producer.ledger_api(),
            producer.transport.clone(),
            "validator_002".to_string(),
            Duration::from_millis(100),
            shutdown_rx,
        );
        producer.ledger.submit(register("alice_addr")).unwrap();
        producer.ledger.submit(register("bob_addr")).unwrap();

        assert!(eventually(|| follower.ledger.len() >= 2).await);
        assert!(eventually(|| producer.ledger.pool_size() == 0).await);
        let sealed = follower.ledger.block_by_index(1).unwrap();
        assert_eq!(sealed.validator, "validator_002");

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .unwrap()
            .unwrap();
        producer.transport.shutdown();
        follower.transport.shutdown();
    }
}
