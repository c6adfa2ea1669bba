use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use girder::{
    AnalysisError, Analyzer, Evolver, Frame, FrameAssessment, PenaltyFitness, SequentialEvaluator,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Closed-form stand-in for the stiffness solve so the benchmark measures the
/// GA machinery rather than the solver.
struct StaticsAnalyzer;

impl Analyzer for StaticsAnalyzer {
    fn analyze(&self, frame: &Frame) -> Result<FrameAssessment, AnalysisError> {
        let leg = ((frame.width / 2.0).powi(2) + frame.height.powi(2)).sqrt();
        let axial = 50_000.0 * leg / frame.height;
        Ok(FrameAssessment {
            mass: frame.mass(7_850.0),
            max_stress: axial / frame.area_left.min(frame.area_right),
            max_deflection: 0.01,
        })
    }
}

fn evolve_benchmark(c: &mut Criterion) {
    c.bench_function("evolve-triangular-frame", |b| {
        b.iter_batched(
            || SequentialEvaluator::new(StaticsAnalyzer, PenaltyFitness::default()),
            |evaluator| {
                let mut evolver = Evolver::builder(evaluator)
                    .population_size(30)
                    .generations(50)
                    .build()
                    .expect("valid GA configuration");
                let mut rng = StdRng::seed_from_u64(9001);
                evolver.run(&mut rng).expect("optimization to succeed");
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, evolve_benchmark);
criterion_main!(benches);
