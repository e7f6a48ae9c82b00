//! Refresh coordination benchmarks
//!
//! Benchmarks for failure classification, coordinator slot operations, and
//! queue drains. These sit on every failed-response path, so they should
//! stay allocation-light.
//!
//! Run with: `cargo bench --bench coordination_bench -p colloquy-auth`

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use futures::FutureExt;
use reqwest::StatusCode;

use colloquy_auth::{
    classify, AuthRedirect, FailedRequestQueue, RedirectReason, RefreshCoordinator, RefreshError,
    RefreshFuture, RequestOrigin,
};

fn ready_refresh() -> RefreshFuture {
    async { Ok::<(), RefreshError>(()) }.boxed().shared()
}

// ============================================================================
// Classification Benchmarks
// ============================================================================

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");
    group.throughput(Throughput::Elements(1));

    group.bench_function("api_unauthorized", |b| {
        b.iter(|| {
            let category =
                classify(black_box(StatusCode::UNAUTHORIZED), black_box(""), RequestOrigin::Api);
            black_box(category);
        });
    });

    group.bench_function("refresh_unauthorized", |b| {
        b.iter(|| {
            let category = classify(
                black_box(StatusCode::UNAUTHORIZED),
                black_box("session expired"),
                RequestOrigin::RefreshEndpoint,
            );
            black_box(category);
        });
    });

    group.bench_function("forbidden", |b| {
        b.iter(|| {
            let category =
                classify(black_box(StatusCode::FORBIDDEN), black_box("denied"), RequestOrigin::Api);
            black_box(category);
        });
    });

    group.bench_function("config_fault_bare", |b| {
        b.iter(|| {
            let category = classify(
                black_box(StatusCode::INTERNAL_SERVER_ERROR),
                black_box("Service configuration error"),
                RequestOrigin::Api,
            );
            black_box(category);
        });
    });

    group.bench_function("config_fault_json", |b| {
        b.iter(|| {
            let category = classify(
                black_box(StatusCode::INTERNAL_SERVER_ERROR),
                black_box(r#"{"message":"Service configuration error","code":500}"#),
                RequestOrigin::Api,
            );
            black_box(category);
        });
    });

    group.bench_function("server_error_other", |b| {
        b.iter(|| {
            let category = classify(
                black_box(StatusCode::INTERNAL_SERVER_ERROR),
                black_box(r#"{"message":"database unavailable"}"#),
                RequestOrigin::Api,
            );
            black_box(category);
        });
    });

    group.finish();
}

// ============================================================================
// Coordinator Slot Benchmarks
// ============================================================================

fn bench_coordinator_slot(c: &mut Criterion) {
    let mut group = c.benchmark_group("coordinator_slot");
    group.throughput(Throughput::Elements(1));

    group.bench_function("join_or_start_idle", |b| {
        b.iter_batched(
            RefreshCoordinator::new,
            |coordinator| {
                let flight = coordinator.join_or_start(|_| (), ready_refresh);
                black_box(flight);
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("join_or_start_occupied", |b| {
        let coordinator = RefreshCoordinator::new();
        coordinator.publish(ready_refresh());
        b.iter(|| {
            let flight = coordinator.join_or_start(|current| current.clone(), ready_refresh);
            black_box(flight);
        });
    });

    group.bench_function("current_occupied", |b| {
        let coordinator = RefreshCoordinator::new();
        coordinator.publish(ready_refresh());
        b.iter(|| {
            let current = coordinator.current();
            black_box(current);
        });
    });

    group.bench_function("publish_then_settle", |b| {
        let coordinator = RefreshCoordinator::new();
        b.iter(|| {
            coordinator.publish(ready_refresh());
            coordinator.settle(|| ());
        });
    });

    group.finish();
}

// ============================================================================
// Queue Drain Benchmarks
// ============================================================================

fn bench_queue_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_drain");

    for waiters in [1usize, 8, 64] {
        group.throughput(Throughput::Elements(waiters as u64));
        group.bench_with_input(
            BenchmarkId::new("drain_success", waiters),
            &waiters,
            |b, &waiters| {
                b.iter_batched(
                    || {
                        let queue = FailedRequestQueue::new();
                        // Receivers stay alive through the drain so every
                        // send lands.
                        let receivers: Vec<_> = (0..waiters).map(|_| queue.enqueue()).collect();
                        (queue, receivers)
                    },
                    |(queue, receivers)| {
                        queue.drain_success(black_box(None));
                        black_box(receivers);
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

// ============================================================================
// Redirect Rendering Benchmarks
// ============================================================================

fn bench_redirect_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("redirect_rendering");
    group.throughput(Throughput::Elements(1));

    group.bench_function("full_redirect_display", |b| {
        let redirect = AuthRedirect::new("/auth/login")
            .with_return_to("/chat/42")
            .with_reason(RedirectReason::SessionExpired);
        b.iter(|| {
            let rendered = format!("{}", black_box(&redirect));
            black_box(rendered);
        });
    });

    group.bench_function("query_params", |b| {
        let redirect = AuthRedirect::new("/auth/login")
            .with_return_to("/chat/42")
            .with_reason(RedirectReason::Forbidden);
        b.iter(|| {
            let params = black_box(&redirect).query_params();
            black_box(params);
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_classification,
    bench_coordinator_slot,
    bench_queue_drain,
    bench_redirect_rendering,
);

criterion_main!(benches);
