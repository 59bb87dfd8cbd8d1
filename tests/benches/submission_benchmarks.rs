//! # Submission Benchmarks
//!
//! Round trips against the in-process network.
//!
//! ```bash
//! cargo bench --package fc-tests --bench submission_benchmarks
//! cargo bench --package fc-tests --bench submission_benchmarks -- evaluate
//! ```

use criterion::{criterion_group, criterion_main, Criterion};
use fc_02_submission::{SubmitOptions, TransactionSubmissionApi};
use fc_tests::fixtures::{invocation, peers, TestNetwork, JOHN_DOE, REQUIREMENTS_PEER};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    match Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => panic!("tokio runtime: {e}"),
    }
}

fn bench_submit_new_asset(c: &mut Criterion) {
    let rt = runtime();
    let net = rt.block_on(TestNetwork::start());
    let submitter = net.submitter();
    let next = AtomicU64::new(0);

    c.bench_function("submit/new_asset", |b| {
        b.iter(|| {
            let id = format!("Req-{}", next.fetch_add(1, Ordering::Relaxed));
            rt.block_on(submitter.submit_transaction(
                peers(&[REQUIREMENTS_PEER]),
                invocation("NewAsset", &[id.as_str(), JOHN_DOE, "benchmark"]),
                SubmitOptions::default(),
            ))
        })
    });
}

fn bench_evaluate_get_asset(c: &mut Criterion) {
    let rt = runtime();
    let net = rt.block_on(TestNetwork::start());
    let ids: Vec<String> = (0..100).map(|n| format!("Req-{n}")).collect();
    net.seed_assets(&ids);
    let submitter = net.submitter();

    c.bench_function("evaluate/get_asset", |b| {
        b.iter(|| {
            rt.block_on(submitter.evaluate_transaction(
                peers(&[REQUIREMENTS_PEER]),
                invocation("GetAsset", &["Req-42"]),
            ))
        })
    });
}

criterion_group!(
    name = submission_benches;
    config = Criterion::default().sample_size(50);
    targets = bench_submit_new_asset, bench_evaluate_get_asset,
);

criterion_main!(submission_benches);
