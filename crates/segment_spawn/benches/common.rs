use std::time::Duration;

use criterion::{Criterion, Throughput};

/// Selector sizes for draw benchmarks. A segment's own tables stay tiny;
/// the larger sizes exercise the tree depth.
pub const DRAW_SIZES: &[usize] = &[8, 64, 256, 1024, 4096];

/// Selector sizes for weight-update benchmarks.
pub const UPDATE_SIZES: &[usize] = &[64, 1024, 4096];

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(60)
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3))
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}
