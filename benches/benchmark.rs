use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use conformant::catalog::{self, ClassWithValue, HasArea, HasValue, StructWithValue, Circle};
use conformant::existential::Existential;

fn mixed_values(count: usize) -> Vec<Existential> {
    (0..count)
        .map(|i| match i % 5 {
            0 => Existential::new(i as i64),
            1 => Existential::new(StructWithValue::new(i as i64)),
            2 => Existential::new(i % 2 == 0),
            3 => Existential::new(ClassWithValue::new(i as i64)),
            _ => Existential::new(Circle::new(i as f64)),
        })
        .collect()
}

fn narrowing(c: &mut Criterion) {
    let registry = match catalog::registry() {
        Ok(registry) => registry,
        Err(e) => panic!("catalog registry: {}", e),
    };
    let values = mixed_values(1_000);

    c.bench_function("narrow 1000 mixed values", |b| {
        b.iter(|| {
            let total: i64 = registry
                .matches::<dyn HasValue>(black_box(&values))
                .iter()
                .map(|value| value.value())
                .sum();
            black_box(total)
        })
    });
    c.bench_function("test 1000 mixed values", |b| {
        b.iter(|| black_box(registry.test_each::<dyn HasArea>(black_box(&values))))
    });
    c.bench_function("build catalog registry", |b| {
        b.iter(|| black_box(catalog::registry().is_ok()))
    });
}

criterion_group!(benches, narrowing);
criterion_main!(benches);
