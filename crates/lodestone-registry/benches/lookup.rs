use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use lodestone_registry::{BlockStateRegistry, RegistryConfig};
use lodestone_state::BlockState;

fn load_registry() -> BlockStateRegistry {
    BlockStateRegistry::load(&RegistryConfig::default()).unwrap()
}

fn bench_cached_lookups(c: &mut Criterion) {
    let mut group = c.benchmark_group("runtime_id_of");
    let reg = load_registry();
    let states: Vec<BlockState> = (0..7)
        .map(|m| BlockState::with_meta(1, m))
        .chain([BlockState::of(2), BlockState::with_meta(17, 12), BlockState::of(541)])
        .collect();
    for s in &states {
        reg.runtime_id_of(*s);
    }
    group.bench_function("cached_legacy_states", |b| {
        b.iter(|| {
            for s in &states {
                black_box(reg.runtime_id_of(black_box(*s)));
            }
        })
    });
    group.bench_function("placeholder_after_first_miss", |b| {
        let unknown = BlockState::with_meta(4000, 3);
        b.iter(|| black_box(reg.runtime_id_of(black_box(unknown))))
    });
    group.finish();
}

fn bench_load(c: &mut Criterion) {
    c.bench_function("load_embedded_palette", |b| b.iter(|| black_box(load_registry())));
}

criterion_group!(benches, bench_cached_lookups, bench_load);
criterion_main!(benches);
