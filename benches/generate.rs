use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trainscript::layer::{compute_delta, Activation, Layer, LayerKind};
use trainscript::render::Renderers;
use trainscript::task::Custom;
use trainscript::ScriptGenerator;

/// A chain of `len` tasks, each reading the variable the previous one wrote.
fn chain(len: usize) -> ScriptGenerator {
    let mut gen = ScriptGenerator::new(Renderers::keras());
    for i in 0..len {
        gen.variables.declare(&format!("v{}", i)).unwrap();
    }
    for i in 0..len {
        gen.tasks
            .create::<Custom, _>(&format!("t{}", i), |t| {
                t.outputs = vec![format!("v{}", i)];
                if i == 0 {
                    t.code = "v0 = 0".to_string();
                } else {
                    t.inputs = vec![format!("v{}", i - 1)];
                    t.code = format!("v{} = v{} + 1", i, i - 1);
                }
            })
            .unwrap();
    }
    gen
}

fn layers(len: usize, units: u32) -> Vec<Layer> {
    (0..len)
        .map(|i| {
            Layer::new(
                &format!("dense_{}", i),
                LayerKind::dense(units + (i % 2) as u32, Activation::Relu),
            )
        })
        .collect()
}

fn generate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    let short = chain(10);
    group.bench_function("chain_10", |b| b.iter(|| black_box(&short).generate().unwrap()));

    let long = chain(200);
    group.bench_function("chain_200", |b| b.iter(|| black_box(&long).generate().unwrap()));

    group.finish();
}

fn delta_benchmark(c: &mut Criterion) {
    let old = layers(100, 64);
    let new = layers(100, 65);
    c.bench_function("compute_delta_100", |b| {
        b.iter(|| compute_delta(black_box(&old), black_box(&new)))
    });
}

criterion_group!(benches, generate_benchmark, delta_benchmark);
criterion_main!(benches);
