use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

use watchbox::{Reentrancy, Store, StoreOptions};

fn store_creation_benchmark(c: &mut Criterion) {
    c.bench_function("store_creation", |b| {
        b.iter(|| {
            let store: Store<i32> = Store::new(black_box(42));
            store
        });
    });
}

fn store_get_benchmark(c: &mut Criterion) {
    let store: Store<i32> = Store::new(42);

    c.bench_function("store_get", |b| {
        b.iter(|| {
            black_box(store.get());
        });
    });
}

fn store_set_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_set");

    for subscriber_count in [0, 1, 10, 100].iter() {
        let store = Store::new(0usize);
        let handles: Vec<_> = (0..*subscriber_count)
            .map(|_| {
                store.subscribe(|value| {
                    black_box(value);
                })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    store.set(black_box(i));
                    i += 1;
                });
            },
        );
        drop(handles);
    }
    group.finish();
}

fn store_update_benchmark(c: &mut Criterion) {
    #[derive(Clone)]
    struct State {
        counter: usize,
        name: String,
    }

    let store = Store::new(State {
        counter: 0,
        name: "test".to_string(),
    });

    c.bench_function("store_update", |b| {
        b.iter(|| {
            store.update(|state| State {
                counter: black_box(state.counter + 1),
                name: state.name.clone(),
            });
        });
    });
}

fn subscribe_unsubscribe_benchmark(c: &mut Criterion) {
    let store = Store::new(0u64);

    c.bench_function("subscribe_unsubscribe", |b| {
        b.iter(|| {
            let handle = store.subscribe(|value| {
                black_box(value);
            });
            handle.unsubscribe();
        });
    });
}

fn queued_reentrant_benchmark(c: &mut Criterion) {
    let store = Store::with_options(
        0u32,
        StoreOptions::default().with_reentrancy(Reentrancy::Queued),
    );
    let _echo = store.subscribe({
        let store = store.clone();
        move |value: &u32| {
            if value % 2 == 1 {
                store.set(value + 1);
            }
        }
    });

    c.bench_function("queued_reentrant_set", |b| {
        b.iter(|| store.set(black_box(1)));
    });
}

criterion_group!(
    benches,
    store_creation_benchmark,
    store_get_benchmark,
    store_set_benchmark,
    store_update_benchmark,
    subscribe_unsubscribe_benchmark,
    queued_reentrant_benchmark,
);
criterion_main!(benches);
