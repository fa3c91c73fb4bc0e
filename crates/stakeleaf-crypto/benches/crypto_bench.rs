use criterion::{black_box, criterion_group, criterion_main, Criterion};
use stakeleaf_crypto::{AddressBuilder, KdfParams, KeyDeriver, KeyVault};
use stakeleaf_types::{Chain, NetworkId};

const ENTROPY: [u8; 16] = [
    0xdf, 0x9e, 0xd2, 0x5e, 0xd1, 0x46, 0xbf, 0x43, 0x33, 0x6a, 0x5d, 0x7c, 0xf7, 0x39, 0x59, 0x94,
];

fn bench_derivation(c: &mut Criterion) {
    let deriver = KeyDeriver::global();
    let root = deriver.root_key_from_entropy(&ENTROPY, "").unwrap();
    let account = deriver.derive_account_key(&root, 0).unwrap();

    c.bench_function("root_key_from_entropy", |b| {
        b.iter(|| deriver.root_key_from_entropy(black_box(&ENTROPY), "").unwrap())
    });
    c.bench_function("derive_account_key", |b| {
        b.iter(|| deriver.derive_account_key(black_box(&root), 0).unwrap())
    });
    c.bench_function("derive_chain_index_key", |b| {
        b.iter(|| {
            deriver
                .derive_chain_index_key(black_box(&account), Chain::External, 7)
                .unwrap()
        })
    });
}

fn bench_addresses(c: &mut Criterion) {
    let builder = AddressBuilder::global();
    let root = builder.deriver().root_key_from_entropy(&ENTROPY, "").unwrap();
    let account = builder.deriver().derive_account_key(&root, 0).unwrap();

    c.bench_function("derive_multiple_addresses_20", |b| {
        b.iter(|| {
            builder
                .derive_multiple_addresses(
                    black_box(&account),
                    NetworkId::MAINNET,
                    Chain::External,
                    20,
                )
                .unwrap()
        })
    });
}

fn bench_envelope(c: &mut Criterion) {
    let deriver = KeyDeriver::global();
    let root = deriver.root_key_from_entropy(&ENTROPY, "").unwrap();
    let vault = KeyVault::with_params(KdfParams::insecure_fast());
    let envelope = vault.encrypt(&root, "password").unwrap();

    c.bench_function("envelope_encrypt_fast_kdf", |b| {
        b.iter(|| vault.encrypt(black_box(&root), "password").unwrap())
    });
    c.bench_function("envelope_decrypt_fast_kdf", |b| {
        b.iter(|| vault.decrypt("password", black_box(&envelope)).unwrap())
    });
}

criterion_group!(benches, bench_derivation, bench_addresses, bench_envelope);
criterion_main!(benches);
