//! # KYC Envelope Benchmarks
//!
//! | Operation | Work | Target |
//! |-----------|------|--------|
//! | `encrypt` | RSA-OAEP wrap + AES-256-GCM seal | < 1ms |
//! | `decrypt` | RSA-OAEP unwrap + AES-256-GCM open | < 5ms |
//! | `sanitize_pan_request` | mask + SHA-256 | < 5µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kyc_01_pan_verification::sanitize_pan_request;
use shared_crypto::{decrypt, encrypt, EnvelopePrivateKey};
use std::time::Duration;

fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-crypto-envelope");
    group.measurement_time(Duration::from_secs(10));

    let private_key = EnvelopePrivateKey::generate(2048).expect("key generation");
    let public_key = private_key.public_key();

    for size in [64usize, 1024, 16 * 1024] {
        let payload = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("encrypt", size), &payload, |b, payload| {
            b.iter(|| encrypt(black_box(payload), &public_key).expect("encrypt"))
        });

        let sealed = encrypt(&payload, &public_key).expect("encrypt");
        group.bench_with_input(BenchmarkId::new("decrypt", size), &sealed, |b, sealed| {
            b.iter(|| decrypt(black_box(sealed), &private_key).expect("decrypt"))
        });
    }

    group.finish();
}

fn bench_sanitize(c: &mut Criterion) {
    c.bench_function("kyc-01-sanitize-pan-request", |b| {
        b.iter(|| sanitize_pan_request(black_box("FNMPM6342D")))
    });
}

criterion_group!(benches, bench_envelope, bench_sanitize);
criterion_main!(benches);
