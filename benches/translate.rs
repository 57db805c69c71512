#[macro_use]
extern crate criterion;

use criterion::{Criterion, black_box};
use inmap::event::EV_KEY;
use inmap::{Context, Mapping};
use std::sync::Arc;

fn keyboard_mapping(rules: u16) -> Mapping {
    let mut mapping = Mapping::new(&Arc::new(Context::new()));

    for from in 0..rules {
        mapping
            .add(EV_KEY, from.wrapping_mul(7), from)
            .expect("failed to populate mapping");
    }

    mapping
}

fn criterion_benchmark(c: &mut Criterion) {
    let mapping = keyboard_mapping(256);
    c.bench_function("translate 1000 codes", move |b| {
        b.iter(|| {
            for code in 0..1000u16 {
                black_box(mapping.translate(EV_KEY, black_box(code)));
            }
        })
    });

    c.bench_function("populate 256 rules", |b| {
        b.iter(|| keyboard_mapping(black_box(256)))
    });

    c.bench_function("parse 64 string rules", |b| {
        let ctx = Arc::new(Context::new());
        b.iter(|| {
            let mut mapping = Mapping::new(&ctx);
            for _ in 0..32 {
                mapping.add_from_string("KEY_UNKNOWN", "BLUETOOTH").unwrap();
                mapping.add_from_string("0x1_0xf1", "0x160").unwrap();
            }
            mapping
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
