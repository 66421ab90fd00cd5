//! # Ledger Benchmarks
//!
//! | Subsystem | Operation |
//! |-----------|-----------|
//! | qc-08 Consensus | `validate_chain` over chains of growing length |
//! | qc-08 Consensus | `validate_block` with many signed transactions |
//! | qc-05 Block Propagation | BLOCKCHAIN_RESPONSE encode / decode |
//! | shared-crypto | Ed25519 verify |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qc_05_block_propagation::WireMessage;
use qc_08_consensus::{signed_public_message, Ledger, LedgerConfig};
use shared_crypto::{Ed25519Scheme, SignatureScheme};
use shared_types::Block;
use std::sync::Arc;
use std::time::Duration;

fn build_chain(blocks: usize, txs_per_block: usize) -> (Ledger<Ed25519Scheme>, Vec<Block>) {
    let config = LedgerConfig {
        pool_capacity: txs_per_block.max(1),
        ..LedgerConfig::default()
    };
    let ledger = Ledger::new(Arc::new(Ed25519Scheme), config).unwrap();
    let keys = Ed25519Scheme.generate_keypair();
    for b in 0..blocks {
        for t in 0..txs_per_block {
            let tx = signed_public_message(&Ed25519Scheme, &keys, "alice", "bob", &format!("{b}-{t}"))
                .unwrap();
            ledger.submit(tx).unwrap();
        }
        ledger.mine("validator_001").unwrap();
    }
    let chain = ledger.chain();
    (ledger, chain)
}

fn bench_validate_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-08-validate-chain");
    group.measurement_time(Duration::from_secs(10));

    for length in [10, 50, 200] {
        let (ledger, chain) = build_chain(length, 4);
        group.throughput(Throughput::Elements(chain.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &chain, |b, chain| {
            b.iter(|| black_box(ledger.is_valid_chain(chain)))
        });
    }
    group.finish();
}

fn bench_validate_block(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-08-validate-block");

    for txs in [1, 25, 100] {
        let (ledger, chain) = build_chain(1, txs);
        let block = chain[1].clone();
        group.throughput(Throughput::Elements(txs as u64));
        group.bench_with_input(BenchmarkId::from_parameter(txs), &block, |b, block| {
            b.iter(|| black_box(ledger.is_valid_block(block)))
        });
    }
    group.finish();
}

fn bench_chain_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-05-chain-codec");
    let (_, chain) = build_chain(100, 4);
    let message = WireMessage::BlockchainResponse(chain);
    let encoded = message.encode().unwrap();
    group.throughput(Throughput::Bytes(encoded.len() as u64));

    group.bench_function("encode", |b| b.iter(|| black_box(message.encode().unwrap())));
    group.bench_function("decode", |b| {
        b.iter(|| black_box(WireMessage::decode(&encoded).unwrap()))
    });
    group.finish();
}

fn bench_ed25519_verify(c: &mut Criterion) {
    let keys = Ed25519Scheme.generate_keypair();
    let message = b"REGISTER:alice";
    let signature = Ed25519Scheme.sign(&keys.secret, message).unwrap();

    c.bench_function("shared-crypto-ed25519-verify", |b| {
        b.iter(|| black_box(Ed25519Scheme.verify(&keys.public, message, &signature)))
    });
}

criterion_group!(
    benches,
    bench_validate_chain,
    bench_validate_block,
    bench_chain_codec,
    bench_ed25519_verify
);
criterion_main!(benches);
