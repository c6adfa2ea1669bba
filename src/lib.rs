#![warn(missing_docs)]

/*! Genetic optimization of lightweight truss frames.

This crate evolves parametric triangular truss designs to minimize mass
subject to stress and deflection constraints. A [`Frame`] holds five design
parameters (width, height, and one cross-sectional area per member); an
[`Analyzer`] assesses each candidate under a fixed apex load; a
[`PenaltyFitness`] folds the assessment into a single score; and the
[`Evolver`] searches the design space with truncation selection, uniform
crossover, bounded mutation, and elitism.

The shipped [`TrussxAnalyzer`] delegates the displacement solve to the
`trussx` crate and recovers member axial forces from the support reactions by
static equilibrium, treating the frame as a pin-jointed truss. Any other
backend can be plugged in through the [`Analyzer`] trait, which is how the
test suite substitutes deterministic stubs.

```
use girder::{Evolver, Material, PenaltyFitness, SequentialEvaluator, TrussxAnalyzer};
use rand::SeedableRng;

let analyzer = TrussxAnalyzer::new(Material::steel(), 100_000.0);
let fitness = PenaltyFitness::new(Material::steel().yield_stress, 0.1);
let mut evolver = Evolver::builder(SequentialEvaluator::new(analyzer, fitness))
    .population_size(20)
    .generations(10)
    .build()?;

let mut rng = rand::rngs::StdRng::seed_from_u64(42);
let report = evolver.run(&mut rng)?;
println!("best design: {} ({:.1} fitness)", report.best_frame, report.best_fitness);
# Ok::<(), Box<dyn std::error::Error>>(())
```

The best-ever record is the run's output, not the final generation's top
individual: selection is stochastic and later generations can regress. The
returned assessment may still violate the constraints when no feasible design
was found, so callers must check it against their limits.
!*/

pub mod analysis;
pub mod evolve;
pub mod fitness;
pub mod frame;
pub mod material;
pub mod parallel;
pub mod report;

pub use analysis::{
    AnalysisError, Analyzer, FrameAssessment, TrussxAnalyzer, DEFAULT_APEX_LOAD,
};
pub use evolve::{ConfigError, EvolveError, Evolver, EvolverBuilder, GenerationObserver};
pub use fitness::{
    Evaluation, EvaluationError, PenaltyFitness, PopulationEvaluator, SequentialEvaluator,
    DEFAULT_DEFLECTION_LIMIT,
};
pub use frame::{BoundsError, Frame, FrameBounds, Member, MemberKind, NodeId, ParamRange};
pub use material::Material;
pub use parallel::{AsyncBatchEvaluator, AsyncEvaluatorError};
pub use report::{EvolveReport, GenerationRecord, RunStats};
