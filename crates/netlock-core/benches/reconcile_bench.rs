//! Criterion benchmarks for the reconciliation engine.
//!
//! A tick must be negligible next to the network call it wraps; these
//! benchmarks keep an eye on the online path and on a long degraded
//! countdown.
//!
//! Run with:
//! ```bash
//! cargo bench --package netlock-core --bench reconcile_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use netlock_core::{FetchError, PollConfig, Reconciler, StatusResponse};

fn online_response() -> StatusResponse {
    StatusResponse {
        is_locked: Some(false),
        time_info: Some(false),
        remaining_seconds: Some(3600),
        ..StatusResponse::default()
    }
}

fn bench_online_tick(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let mut engine = Reconciler::new(PollConfig::default());

    c.bench_function("tick_online", |b| {
        b.iter(|| {
            rt.block_on(engine.tick(Some("AA:BB:CC:DD:EE:FF"), |_| async {
                Ok::<_, FetchError>(black_box(online_response()))
            }))
        })
    });
}

fn bench_degraded_countdown(c: &mut Criterion) {
    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let config = PollConfig {
        initial_time: 86_400,
        reconnection_backoff: u64::MAX,
        ..PollConfig::default()
    };

    c.bench_function("degraded_countdown_1000_ticks", |b| {
        b.iter(|| {
            let mut engine = Reconciler::new(config);
            for _ in 0..1000 {
                let _ = rt.block_on(engine.tick(Some("AA:BB:CC:DD:EE:FF"), |_| async {
                    Err::<StatusResponse, _>(FetchError::Timeout)
                }));
            }
            black_box(engine.state().saved_remaining_seconds)
        })
    });
}

criterion_group!(benches, bench_online_tick, bench_degraded_countdown);
criterion_main!(benches);
