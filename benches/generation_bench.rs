//! Generation engine benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use uc_events::engine::target_or_frontier;
use uc_events::{ChunkSequence, CnvRegistry, GenerationEngine};

fn benchmark_generations(c: &mut Criterion) {
    let reference = ChunkSequence::from("0123456");
    let target = ChunkSequence::from("01215456").profile();
    let mut group = c.benchmark_group("breed_dup4_layout");
    group.sample_size(10);

    for generations in [1usize, 2] {
        let policy = target_or_frontier(target.clone(), generations);
        for (label, engine) in [
            ("sequential", GenerationEngine::sequential()),
            ("parallel", GenerationEngine::new()),
        ] {
            group.bench_with_input(
                BenchmarkId::new(label, generations),
                &generations,
                |b, &generations| {
                    b.iter(|| {
                        let mut registry = CnvRegistry::new(reference.clone());
                        engine.run(&mut registry, generations, &policy);
                        black_box(registry.len())
                    });
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_generations);
criterion_main!(benches);
