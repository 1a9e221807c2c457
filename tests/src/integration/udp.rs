//! # UDP Loopback Tests
//!
//! The same discovery flow as the in-memory cluster, over real tokio UDP
//! sockets bound to `127.0.0.1:0`, configured through TOML.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::watch;
    use tokio::time::timeout;

    use kad_discovery::{
        ConfigProvider, KademliaDiscovery, PeerDiscoveryApi, PeerId, TomlConfigProvider,
        Transport, UdpTransport,
    };

    use crate::integration::init_tracing;

    fn provider(bootstrap: &[std::net::SocketAddr]) -> TomlConfigProvider {
        let nodes: Vec<String> = bootstrap.iter().map(|a| format!("\"{a}\"")).collect();
        TomlConfigProvider::parse(&format!(
            r#"
            [bootstrap]
            nodes = [{}]

            [kademlia]
            id_width = 16
            k = 8
            alpha = 3
            request_timeout_ms = 500
            refresh_interval_secs = 3600
            "#,
            nodes.join(", ")
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_udp_nodes_discover_each_other() {
        init_tracing();
        let (shutdown, rx) = watch::channel(false);

        let seed_transport = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let seed_addr = seed_transport.local_addr();
        let seed = Arc::new(
            KademliaDiscovery::from_provider(PeerId::random(16), seed_transport, &provider(&[]))
                .unwrap(),
        );

        let mut joiners = Vec::new();
        let mut tasks = vec![tokio::spawn(Arc::clone(&seed).run(rx.clone()))];
        for _ in 0..3 {
            let transport = UdpTransport::bind("127.0.0.1:0").await.unwrap();
            let config = provider(&[seed_addr]);
            assert_eq!(config.get_bootstrap_nodes(), vec![seed_addr]);

            let node = Arc::new(
                KademliaDiscovery::from_provider(PeerId::random(16), transport, &config).unwrap(),
            );
            tasks.push(tokio::spawn(Arc::clone(&node).run(rx.clone())));
            node.bootstrap().await.unwrap();
            joiners.push(node);
        }

        assert_eq!(seed.known_peers().len(), 3);

        // the last joiner learned the earlier ones through the seed
        let last = joiners.last().unwrap();
        assert_eq!(last.known_peers().len(), 3);

        let target = joiners[0].local_peer().id.clone();
        let found = joiners[2].lookup(target.clone()).await.unwrap();
        assert_eq!(found[0].id, target);
        assert_eq!(found[0].address, joiners[0].local_peer().address);

        shutdown.send(true).unwrap();
        for task in tasks {
            timeout(Duration::from_secs(2), task)
                .await
                .expect("node did not stop")
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_udp_ignores_garbage_datagrams() {
        init_tracing();
        let (shutdown, rx) = watch::channel(false);

        let transport = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = transport.local_addr();
        let node = Arc::new(
            KademliaDiscovery::from_provider(PeerId::random(16), transport, &provider(&[]))
                .unwrap(),
        );
        let task = tokio::spawn(Arc::clone(&node).run(rx));

        let noise = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        noise.send(addr, b"not a kademlia message").await.unwrap();

        // still answers real requests afterwards
        let probe_transport = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let probe = Arc::new(
            KademliaDiscovery::from_provider(
                PeerId::random(16),
                probe_transport,
                &provider(&[]),
            )
            .unwrap(),
        );
        let (probe_shutdown, probe_rx) = watch::channel(false);
        let probe_task = tokio::spawn(Arc::clone(&probe).run(probe_rx));

        assert_eq!(probe.ping(addr).await.unwrap(), node.local_peer().id);
        assert!(node.known_peers().contains(probe.local_peer()));

        shutdown.send(true).unwrap();
        probe_shutdown.send(true).unwrap();
        task.await.unwrap();
        probe_task.await.unwrap();
    }
}
