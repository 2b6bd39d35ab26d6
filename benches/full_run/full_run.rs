use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pandemic::{Parameters, SimulationContext};

static SEED: u64 = 123;
static TOTAL_DAYS: u32 = 100;

fn parameters(population: usize, threads: usize) -> Parameters {
    Parameters {
        population,
        initial_infections: population / 100,
        width: 200,
        height: 200,
        infection_radius: 3,
        disease_duration: 14,
        contagiousness: 30,
        deadliness: 5,
        total_days: TOTAL_DAYS,
        show_results: false,
        threads,
        ..Parameters::default()
    }
}

fn full_run(parameters: &Parameters) -> SimulationContext {
    let mut context =
        SimulationContext::new(parameters.clone(), SEED).expect("invalid benchmark parameters");
    context.execute().expect("simulation failed");
    context
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("full run");
    group.sample_size(10);
    for threads in [1, 4] {
        let parameters = parameters(20_000, threads);
        group.bench_with_input(
            BenchmarkId::new("threads", threads),
            &parameters,
            |bencher, parameters| bencher.iter_with_large_drop(|| full_run(parameters)),
        );
    }
    group.finish();
}

criterion_group!(full_run_benches, criterion_benchmark);
criterion_main!(full_run_benches);
