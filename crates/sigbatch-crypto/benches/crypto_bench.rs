use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use sigbatch_crypto::{ed25519_verify, BatchAccumulator, Ed25519Accumulator, Keypair, MAX_BATCH_SIZE};
use sigbatch_types::{Ed25519PublicKey, Ed25519Signature, Hash};

fn signed_items(n: usize) -> Vec<(Ed25519PublicKey, Hash, Ed25519Signature)> {
    (0..n)
        .map(|i| {
            let keypair = Keypair::from_seed(&[i as u8; 32]);
            let digest = Hash::compute(&(i as u64).to_le_bytes());
            (keypair.public_key(), digest, keypair.sign_digest(&digest))
        })
        .collect()
}

fn bench_ed25519(c: &mut Criterion) {
    let items = signed_items(MAX_BATCH_SIZE);

    c.bench_function("ed25519_verify_individual_full_batch", |b| {
        b.iter(|| {
            for (key, digest, sig) in &items {
                black_box(ed25519_verify(key, digest.as_bytes(), sig).is_ok());
            }
        })
    });

    c.bench_function("ed25519_verify_accumulator_full_batch", |b| {
        b.iter_batched(
            || Ed25519Accumulator::with_random_nonce(MAX_BATCH_SIZE),
            |mut acc| {
                for (key, digest, sig) in &items {
                    if let Some(key) = Ed25519Accumulator::parse_public_key(key.as_bytes()) {
                        acc.add(sig.as_bytes(), digest, &key);
                    }
                }
                black_box(acc.verify())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_ed25519);
criterion_main!(benches);
