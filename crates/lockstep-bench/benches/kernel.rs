//! Simulation kernel benchmarks.
//!
//! Benchmarks lifecycle transitions, stepping, and value access through
//! the [`Simulator`] facade, plus the raw model step for comparison.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use lockstep_kernel::{InitializationArgs, Simulator};
use lockstep_model::{BouncingBall, Model};
use lockstep_types::{InstanceHandle, ValueReference};

fn bouncing_ball() -> Box<dyn Model> {
    Box::new(BouncingBall::new())
}

/// Drives a fresh instance through initialization and returns its handle.
fn initialized(simulator: &Simulator) -> InstanceHandle {
    let handle = simulator.instantiate();
    simulator
        .enter_initialization_mode(handle, InitializationArgs::default())
        .unwrap();
    simulator.exit_initialization_mode(handle).unwrap();
    handle
}

// ============================================================================
// Lifecycle Benchmarks
// ============================================================================

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_lifecycle");

    // Full cycle on a shared simulator. Each iteration frees its instance,
    // so the registry is empty again at the start of the next one.
    group.bench_function("full_cycle", |b| {
        let simulator = Simulator::new(bouncing_ball);

        b.iter(|| {
            let handle = simulator.instantiate();
            simulator
                .enter_initialization_mode(black_box(handle), InitializationArgs::default())
                .unwrap();
            simulator.exit_initialization_mode(handle).unwrap();
            simulator.terminate(handle).unwrap();
            simulator.free_instance(handle).unwrap();
            black_box(handle);
        });
    });

    group.bench_function("instantiate", |b| {
        b.iter_batched(
            || Simulator::new(bouncing_ball),
            |simulator| {
                let handle = simulator.instantiate();
                black_box(handle);
            },
            criterion::BatchSize::SmallInput,
        );
    });

    group.finish();
}

// ============================================================================
// Stepping Benchmarks
// ============================================================================

fn bench_do_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_do_step");

    group.bench_function("single_step", |b| {
        let simulator = Simulator::new(bouncing_ball);
        let handle = initialized(&simulator);

        b.iter(|| {
            simulator
                .do_step(black_box(handle), black_box(0.01))
                .unwrap();
        });
    });

    for step_count in [1, 10, 100] {
        group.throughput(Throughput::Elements(step_count as u64));

        group.bench_with_input(
            BenchmarkId::new("step_run", step_count),
            &step_count,
            |b, &step_count| {
                b.iter_batched(
                    || {
                        // Setup: a fresh initialized instance per run
                        let simulator = Simulator::new(bouncing_ball);
                        let handle = initialized(&simulator);
                        (simulator, handle)
                    },
                    |(simulator, handle)| {
                        for _ in 0..step_count {
                            simulator.do_step(handle, black_box(0.01)).unwrap();
                        }
                        black_box(handle);
                    },
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

// ============================================================================
// Value Access Benchmarks
// ============================================================================

fn bench_value_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_value_access");

    for ref_count in [1, 4, 8] {
        group.throughput(Throughput::Elements(ref_count as u64));

        group.bench_with_input(
            BenchmarkId::new("read", ref_count),
            &ref_count,
            |b, &ref_count| {
                let simulator = Simulator::new(bouncing_ball);
                let handle = initialized(&simulator);
                let references: Vec<ValueReference> =
                    (0..ref_count as u32).map(ValueReference::new).collect();

                b.iter(|| {
                    let values = simulator.read(handle, black_box(&references));
                    let _ = black_box(values);
                });
            },
        );
    }

    for ref_count in [1, 4] {
        group.throughput(Throughput::Elements(ref_count as u64));

        group.bench_with_input(
            BenchmarkId::new("write", ref_count),
            &ref_count,
            |b, &ref_count| {
                let simulator = Simulator::new(bouncing_ball);
                let handle = initialized(&simulator);
                let references: Vec<ValueReference> =
                    (0..ref_count as u32).map(ValueReference::new).collect();
                let values = vec![0.5; ref_count];

                b.iter(|| {
                    simulator
                        .write(handle, black_box(&references), black_box(&values))
                        .unwrap();
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Model Benchmarks
// ============================================================================

fn bench_model_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_step");

    // Raw dynamics, no registry or lock in the path
    group.bench_function("raw_model", |b| {
        let mut ball = BouncingBall::new();

        b.iter(|| {
            ball.step(black_box(0.01));
        });
    });

    // Same step through the facade: handle lookup plus instance lock
    group.bench_function("through_simulator", |b| {
        let simulator = Simulator::new(bouncing_ball);
        let handle = initialized(&simulator);

        b.iter(|| {
            simulator
                .do_step(black_box(handle), black_box(0.01))
                .unwrap();
        });
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    kernel_benches,
    bench_lifecycle,
    bench_do_step,
    bench_value_access,
    bench_model_step
);

criterion_main!(kernel_benches);
