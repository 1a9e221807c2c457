//! # In-Memory Cluster Tests
//!
//! ```text
//!          ┌──────── seed (0x80) ────────┐
//!          │    every node bootstraps     │
//!          ↓          through it          ↓
//!   0x10  0x20  0x30  ...  0x90  0xA0  0xB0  0xC0
//! ```
//!
//! With `k = 8` the seed can hold every joiner, so a lookup that starts at
//! any node must converge on the true k closest live peers.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::join_all;
    use tokio::sync::watch;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    use kad_discovery::test_utils::{MemoryNetwork, MemoryTransport};
    use kad_discovery::{
        xor_distance, KademliaConfig, KademliaDiscovery, PeerDiscoveryApi, PeerId, Transport,
    };

    use crate::integration::init_tracing;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const WIDTH: usize = 4;
    const SEED: u8 = 0x80;
    const JOINERS: [u8; 11] = [
        0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70, 0x90, 0xA0, 0xB0, 0xC0,
    ];

    type Node = Arc<KademliaDiscovery<MemoryTransport>>;

    struct Cluster {
        network: MemoryNetwork,
        nodes: Vec<Node>,
        shutdown: watch::Sender<bool>,
        tasks: Vec<JoinHandle<()>>,
    }

    impl Cluster {
        fn node(&self, first: u8) -> &Node {
            self.nodes
                .iter()
                .find(|n| n.local_peer().id.as_bytes()[0] == first)
                .expect("no such node")
        }

        fn addr(&self, first: u8) -> SocketAddr {
            self.node(first).local_peer().address
        }

        async fn shutdown(self) {
            self.shutdown.send(true).unwrap();
            let stopped = timeout(Duration::from_secs(2), join_all(self.tasks))
                .await
                .expect("nodes did not stop");
            assert!(stopped.iter().all(Result::is_ok));
        }
    }

    fn make_id(first: u8) -> PeerId {
        PeerId::new(vec![first, 0, 0, 0])
    }

    fn config() -> KademliaConfig {
        KademliaConfig {
            id_width: WIDTH,
            k: 8,
            alpha: 3,
            request_timeout_ms: 150,
            refresh_interval_secs: 3_600,
            max_lookup_rounds: 10,
        }
    }

    /// Start the seed and every joiner, then bootstrap joiners one by one.
    async fn start_cluster() -> Cluster {
        init_tracing();
        let network = MemoryNetwork::new();
        let (shutdown, rx) = watch::channel(false);

        let mut nodes = Vec::new();
        let mut tasks = Vec::new();
        let seed = Arc::new(
            KademliaDiscovery::new(make_id(SEED), network.endpoint(), config(), Vec::new())
                .unwrap(),
        );
        let seed_addr = seed.local_peer().address;
        tasks.push(tokio::spawn(Arc::clone(&seed).run(rx.clone())));
        nodes.push(seed);

        for first in JOINERS {
            let node = Arc::new(
                KademliaDiscovery::new(
                    make_id(first),
                    network.endpoint(),
                    config(),
                    vec![seed_addr],
                )
                .unwrap(),
            );
            tasks.push(tokio::spawn(Arc::clone(&node).run(rx.clone())));
            node.bootstrap().await.unwrap();
            nodes.push(node);
        }

        Cluster {
            network,
            nodes,
            shutdown,
            tasks,
        }
    }

    /// The k ids nearest `target` among `candidates`, nearest first.
    fn brute_force_closest(candidates: &[u8], target: &PeerId, k: usize) -> Vec<PeerId> {
        let mut ids: Vec<PeerId> = candidates.iter().map(|b| make_id(*b)).collect();
        ids.sort_by_key(|id| xor_distance(id, target).unwrap());
        ids.truncate(k);
        ids
    }

    fn all_but(excluded: &[u8]) -> Vec<u8> {
        std::iter::once(SEED)
            .chain(JOINERS)
            .filter(|b| !excluded.contains(b))
            .collect()
    }

    // =============================================================================
    // HAPPY PATH
    // =============================================================================

    #[tokio::test]
    async fn test_seed_learns_every_joiner() {
        let cluster = start_cluster().await;

        let known = cluster.node(SEED).known_peers();
        assert_eq!(known.len(), JOINERS.len());

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_lookup_converges_on_true_closest() {
        let cluster = start_cluster().await;
        let target = PeerId::new(vec![0x57, 0x11, 0x00, 0x00]);

        for looker in [0x10, 0xC0, SEED] {
            let found = cluster.node(looker).lookup(target.clone()).await.unwrap();
            let ids: Vec<PeerId> = found.into_iter().map(|p| p.id).collect();

            let expected = brute_force_closest(&all_but(&[looker]), &target, config().k);
            assert_eq!(ids, expected, "lookup from {looker:#04x}");
        }

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_concurrent_lookups_are_independent() {
        let cluster = start_cluster().await;
        let targets: Vec<(u8, PeerId)> = vec![
            (0x20, make_id(0xA5)),
            (0x90, make_id(0x05)),
            (0x50, make_id(0x5F)),
            (0x20, make_id(0x33)),
        ];

        let lookups = targets
            .iter()
            .map(|(looker, target)| cluster.node(*looker).lookup(target.clone()));
        let results = join_all(lookups).await;

        for ((looker, target), result) in targets.iter().zip(results) {
            let ids: Vec<PeerId> = result.unwrap().into_iter().map(|p| p.id).collect();
            let expected = brute_force_closest(&all_but(&[*looker]), target, config().k);
            assert_eq!(ids, expected);
        }

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_lookup_for_existing_node_finds_it_first() {
        let cluster = start_cluster().await;

        let found = cluster.node(0x10).lookup(make_id(0xB0)).await.unwrap();

        assert_eq!(found[0].id, make_id(0xB0));
        assert_eq!(found[0].address, cluster.addr(0xB0));
        cluster.shutdown().await;
    }

    // =============================================================================
    // FAILURE HANDLING
    // =============================================================================

    #[tokio::test]
    async fn test_lookup_routes_around_dead_nodes() {
        let cluster = start_cluster().await;
        let dead = [0x50, 0x60];
        for first in dead {
            cluster.network.set_unreachable(cluster.addr(first), true);
        }
        let target = make_id(0x58);
        let looker = cluster.node(0xC0);

        let found = timeout(Duration::from_secs(5), looker.lookup(target.clone()))
            .await
            .expect("lookup did not finish")
            .unwrap();

        assert!(!found.is_empty());
        assert!(found
            .iter()
            .all(|p| !dead.contains(&p.id.as_bytes()[0])));
        let distances: Vec<_> = found
            .iter()
            .map(|p| xor_distance(&p.id, &target).unwrap())
            .collect();
        assert!(distances.windows(2).all(|w| w[0] < w[1]));

        // dead peers the looker tried were dropped from its table
        let known = looker.known_peers();
        assert!(known.iter().all(|p| !dead.contains(&p.id.as_bytes()[0])));

        cluster.shutdown().await;
    }

    #[tokio::test]
    async fn test_bootstrap_survives_dead_seed() {
        init_tracing();
        let network = MemoryNetwork::new();
        let (shutdown, rx) = watch::channel(false);

        let live = Arc::new(
            KademliaDiscovery::new(make_id(0x80), network.endpoint(), config(), Vec::new())
                .unwrap(),
        );
        let dead = network.endpoint();
        network.set_unreachable(dead.local_addr(), true);

        let joiner = Arc::new(
            KademliaDiscovery::new(
                make_id(0x01),
                network.endpoint(),
                config(),
                vec![dead.local_addr(), live.local_peer().address],
            )
            .unwrap(),
        );
        let tasks = vec![
            tokio::spawn(Arc::clone(&live).run(rx.clone())),
            tokio::spawn(Arc::clone(&joiner).run(rx)),
        ];

        assert_eq!(joiner.bootstrap().await.unwrap(), 1);

        shutdown.send(true).unwrap();
        for task in tasks {
            task.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_shutdown_stops_every_node() {
        let cluster = start_cluster().await;
        let network = cluster.network.clone();

        cluster.shutdown().await;

        // endpoints stay registered; only the run loops ended
        assert_eq!(network.len(), JOINERS.len() + 1);
    }
}
