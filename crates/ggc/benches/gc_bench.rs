//! Allocation fast-path benchmark.

use criterion::{criterion_group, criterion_main, Criterion};

use ggc::{GcType, RefVisitor, Reference};

struct Payload {
    value: u64,
    next: Reference<Payload>,
}

impl GcType for Payload {
    fn enumerate_refs(&self, visitor: &mut RefVisitor) {
        visitor.visit(&self.next);
    }
}

fn bench_allocation(c: &mut Criterion) {
    ggc::startup(256 * 1024 * 1024, None);
    {
        let _thread = ggc::manage_thread_guard("bench");
        ggc::enable();

        c.bench_function("create and drop root", |b| {
            b.iter(|| {
                let root = ggc::create(|| Payload {
                    value: 1,
                    next: Reference::new(),
                })
                .expect("allocation failed");
                std::hint::black_box(root.get().map(|p| p.value));
            })
        });

        ggc::collect();
        ggc::disable();
    }
    ggc::shutdown();
}

criterion_group!(benches, bench_allocation);
criterion_main!(benches);
