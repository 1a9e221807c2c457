//! # Lookup Primitive Benchmarks
//!
//! - XOR distance over 32-byte ids
//! - `RoutingTable::closest` on a populated table
//! - A full `Finder` drain (seed, batch, merge) without I/O

use std::net::SocketAddr;
use std::time::Duration;

use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use kad_discovery::{xor_distance, Finder, Peer, PeerId, RoutingTable};

const WIDTH: usize = 32;

fn random_peers(count: usize) -> Vec<Peer> {
    let addr: SocketAddr = ([10, 0, 0, 1], 30303).into();
    (0..count)
        .map(|_| Peer::new(PeerId::random(WIDTH), addr))
        .collect()
}

pub fn bench_xor_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("kad/xor_distance");
    let a = PeerId::random(WIDTH);
    let b = PeerId::random(WIDTH);

    group.bench_function("256_bit", |bench| {
        bench.iter(|| black_box(xor_distance(black_box(&a), black_box(&b))))
    });
    group.finish();
}

pub fn bench_routing_table_closest(c: &mut Criterion) {
    let mut group = c.benchmark_group("kad/routing_table");
    group.measurement_time(Duration::from_secs(5));

    for count in [100, 1_000, 5_000] {
        let mut table = RoutingTable::new(PeerId::random(WIDTH), 20);
        for peer in random_peers(count) {
            let _ = table.insert(peer);
        }
        let target = PeerId::random(WIDTH);

        group.throughput(Throughput::Elements(table.len() as u64));
        group.bench_with_input(BenchmarkId::new("closest_20", count), &table, |bench, table| {
            bench.iter(|| black_box(table.closest(&target, 20)))
        });
    }
    group.finish();
}

pub fn bench_finder_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("kad/finder");

    for count in [20, 200, 2_000] {
        let seeds = random_peers(20);
        let learned: Vec<Vec<Peer>> = random_peers(count).chunks(20).map(<[Peer]>::to_vec).collect();
        let target = PeerId::random(WIDTH);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("drain", count), &learned, |bench, learned| {
            bench.iter(|| {
                let mut finder =
                    Finder::new(target.clone(), seeds.clone(), 3).expect("alpha is positive");
                let mut responses = learned.iter();
                let mut queried = 0;
                loop {
                    let batch = finder.find_peer();
                    if batch.is_empty() {
                        break;
                    }
                    queried += batch.len();
                    if let Some(peers) = responses.next() {
                        let _ = finder.add_peer(peers.clone());
                    }
                }
                black_box(queried)
            })
        });
    }
    group.finish();
}

pub fn register_benchmarks(c: &mut Criterion) {
    bench_xor_distance(c);
    bench_routing_table_closest(c);
    bench_finder_drain(c);
}
