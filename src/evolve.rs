//! Generational genetic algorithm over truss frames.
//!
//! The [`Evolver`] owns a fixed-size population of [`Frame`] designs and runs
//! a fixed number of generations: evaluate, rank ascending by fitness, track
//! the best-ever record, carry the top two individuals over unchanged, breed
//! the rest from the top half of the ranking by uniform crossover, and mutate
//! every child. Users construct the engine through [`Evolver::builder`] and
//! call [`Evolver::run`] with a random number generator.

use crate::fitness::{Evaluation, EvaluationError, PopulationEvaluator};
use crate::frame::{BoundsError, Frame, FrameBounds};
use crate::report::{population_diversity, EvolveReport, GenerationRecord, RunStats};
use rand::Rng;
use std::fmt::{self, Display, Formatter};
use tracing::{debug, info};

const DEFAULT_POPULATION_SIZE: usize = 20;
const DEFAULT_GENERATIONS: usize = 50;
const DEFAULT_MUTATION_RATE: f64 = 0.1;

/// Number of top-ranked individuals carried over unchanged each generation.
/// Guarantees the retained lineage's fitness never regresses.
const ELITE_COUNT: usize = 2;

/// Configuration errors surfaced by [`EvolverBuilder::build`].
///
/// These are fatal at setup and never silently degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The population cannot sustain two elites plus at least one offspring.
    InvalidPopulationSize(usize),
    /// A run must execute at least one generation.
    InvalidGenerationCount(usize),
    /// Mutation rate was outside `[0, 1]`.
    InvalidMutationRate(f64),
    /// Wrapper around [`BoundsError`].
    Bounds(BoundsError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPopulationSize(size) => write!(
                f,
                "population size must be at least {} to support elitism (received {size})",
                ELITE_COUNT + 1
            ),
            Self::InvalidGenerationCount(count) => {
                write!(f, "generation count must be at least one (received {count})")
            }
            Self::InvalidMutationRate(rate) => {
                write!(f, "mutation rate must be within [0, 1] (received {rate})")
            }
            Self::Bounds(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<BoundsError> for ConfigError {
    fn from(err: BoundsError) -> Self {
        Self::Bounds(err)
    }
}

/// Errors produced while a run is in progress.
#[derive(Debug)]
pub enum EvolveError {
    /// Wrapper around [`EvaluationError`].
    Evaluation(EvaluationError),
}

impl Display for EvolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evaluation(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for EvolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Evaluation(err) => Some(err),
        }
    }
}

impl From<EvaluationError> for EvolveError {
    fn from(err: EvaluationError) -> Self {
        Self::Evaluation(err)
    }
}

/// Hook invoked once per generation with that generation's top-ranked record.
///
/// The core loop behaves identically with no observer attached.
pub trait GenerationObserver {
    /// Called after ranking, before reproduction.
    fn on_generation(&mut self, record: &GenerationRecord);
}

impl<F> GenerationObserver for F
where
    F: FnMut(&GenerationRecord),
{
    fn on_generation(&mut self, record: &GenerationRecord) {
        self(record);
    }
}

/// Builder returned by [`Evolver::builder`].
pub struct EvolverBuilder<E> {
    evaluator: E,
    bounds: FrameBounds,
    population_size: usize,
    generations: usize,
    mutation_rate: f64,
    observer: Option<Box<dyn GenerationObserver>>,
}

impl<E> EvolverBuilder<E>
where
    E: PopulationEvaluator,
{
    /// Configures the number of individuals per generation.
    #[must_use]
    pub fn population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Configures the number of generations to execute.
    #[must_use]
    pub fn generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Configures the per-parameter mutation probability applied to every
    /// offspring.
    #[must_use]
    pub fn mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Replaces the design-variable bounds.
    #[must_use]
    pub fn bounds(mut self, bounds: FrameBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Attaches an observer invoked once per generation.
    #[must_use]
    pub fn observer(mut self, observer: impl GenerationObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Finalizes the builder into an [`Evolver`].
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the population is too small for elitism,
    /// no generations are requested, the mutation rate is out of range, or
    /// the bounds are malformed.
    pub fn build(self) -> Result<Evolver<E>, ConfigError> {
        if self.population_size <= ELITE_COUNT {
            return Err(ConfigError::InvalidPopulationSize(self.population_size));
        }
        if self.generations == 0 {
            return Err(ConfigError::InvalidGenerationCount(0));
        }
        if !(self.mutation_rate.is_finite() && (0.0..=1.0).contains(&self.mutation_rate)) {
            return Err(ConfigError::InvalidMutationRate(self.mutation_rate));
        }
        self.bounds.validate()?;
        Ok(Evolver {
            evaluator: self.evaluator,
            bounds: self.bounds,
            population_size: self.population_size,
            generations: self.generations,
            mutation_rate: self.mutation_rate,
            observer: self.observer,
        })
    }
}

/// Genetic algorithm engine that minimizes frame fitness.
///
/// # Examples
/// ```
/// use girder::{
///     AnalysisError, Analyzer, Evolver, Frame, FrameAssessment, PenaltyFitness,
///     SequentialEvaluator,
/// };
/// use rand::SeedableRng;
///
/// struct MassOnly;
///
/// impl Analyzer for MassOnly {
///     fn analyze(&self, frame: &Frame) -> Result<FrameAssessment, AnalysisError> {
///         Ok(FrameAssessment {
///             mass: frame.mass(7_850.0),
///             max_stress: 1.0e6,
///             max_deflection: 0.01,
///         })
///     }
/// }
///
/// let evaluator = SequentialEvaluator::new(MassOnly, PenaltyFitness::default());
/// let mut evolver = Evolver::builder(evaluator)
///     .population_size(8)
///     .generations(5)
///     .build()?;
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let report = evolver.run(&mut rng)?;
/// assert_eq!(report.final_population.len(), 8);
/// assert!(report.best_fitness.is_finite());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Evolver<E> {
    evaluator: E,
    bounds: FrameBounds,
    population_size: usize,
    generations: usize,
    mutation_rate: f64,
    observer: Option<Box<dyn GenerationObserver>>,
}

impl<E> Evolver<E>
where
    E: PopulationEvaluator,
{
    /// Creates a builder used to configure the engine.
    #[must_use]
    pub fn builder(evaluator: E) -> EvolverBuilder<E> {
        EvolverBuilder {
            evaluator,
            bounds: FrameBounds::default(),
            population_size: DEFAULT_POPULATION_SIZE,
            generations: DEFAULT_GENERATIONS,
            mutation_rate: DEFAULT_MUTATION_RATE,
            observer: None,
        }
    }

    /// Runs the genetic algorithm using the provided random number generator
    /// and returns the best design found across all generations.
    ///
    /// # Errors
    /// Propagates [`EvolveError`] when the evaluation backend fails;
    /// individual analysis failures are absorbed as infeasible designs and
    /// never abort a generation.
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> Result<EvolveReport, EvolveError> {
        let mut population: Vec<Frame> = (0..self.population_size)
            .map(|_| Frame::random(&self.bounds, rng))
            .collect();
        let mut best: Option<GenerationRecord> = None;
        let mut stats = RunStats::new();

        for generation in 0..self.generations {
            let evaluations = self.evaluator.evaluate_population(&population)?;
            let order = rank(&evaluations);
            let top = order[0];

            stats.record(
                evaluations[top].fitness,
                mean_finite_fitness(&evaluations),
                population_diversity(&population),
            );
            debug!(
                generation,
                best_fitness = evaluations[top].fitness,
                feasible = evaluations.iter().filter(|e| e.is_feasible()).count(),
                "generation ranked"
            );

            let record = GenerationRecord {
                generation,
                fitness: evaluations[top].fitness,
                frame: population[top].clone(),
                assessment: evaluations[top].assessment,
            };
            if best
                .as_ref()
                .map_or(true, |current| record.fitness < current.fitness)
            {
                info!(
                    generation,
                    fitness = record.fitness,
                    frame = %record.frame,
                    "new best design"
                );
                best = Some(record.clone());
            }
            if let Some(observer) = self.observer.as_mut() {
                observer.on_generation(&record);
            }

            population = self.reproduce(&population, &order, rng);
        }

        let best = best.expect("at least one generation is executed");
        Ok(EvolveReport {
            best_frame: best.frame,
            best_fitness: best.fitness,
            best_assessment: best.assessment,
            generations: self.generations,
            stats,
            final_population: population,
        })
    }

    /// Builds the next generation: the two elites cloned unchanged, then
    /// offspring bred from the top half of the ranking by uniform crossover
    /// of two parents drawn uniformly with replacement, each mutated once.
    fn reproduce<R: Rng>(&self, population: &[Frame], order: &[usize], rng: &mut R) -> Vec<Frame> {
        let parent_count = (population.len() / 2).max(1);
        let parents: Vec<&Frame> = order[..parent_count]
            .iter()
            .map(|&idx| &population[idx])
            .collect();

        let mut next = Vec::with_capacity(self.population_size);
        next.push(population[order[0]].clone());
        next.push(population[order[1]].clone());
        while next.len() < self.population_size {
            let parent_a = parents[rng.gen_range(0..parents.len())];
            let parent_b = parents[rng.gen_range(0..parents.len())];
            let mut child = parent_a.cross(parent_b, rng);
            child.mutate(self.mutation_rate, &self.bounds, rng);
            next.push(child);
        }
        next
    }
}

/// Population indices sorted ascending by fitness; ties break arbitrarily.
fn rank(evaluations: &[Evaluation]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..evaluations.len()).collect();
    order.sort_unstable_by(|&a, &b| evaluations[a].fitness.total_cmp(&evaluations[b].fitness));
    order
}

fn mean_finite_fitness(evaluations: &[Evaluation]) -> f64 {
    let finite: Vec<f64> = evaluations
        .iter()
        .map(|evaluation| evaluation.fitness)
        .filter(|fitness| fitness.is_finite())
        .collect();
    if finite.is_empty() {
        return f64::INFINITY;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        finite.iter().sum::<f64>() / finite.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisError, Analyzer, FrameAssessment};
    use crate::fitness::{PenaltyFitness, SequentialEvaluator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct MassOnly;

    impl Analyzer for MassOnly {
        fn analyze(&self, frame: &Frame) -> Result<FrameAssessment, AnalysisError> {
            Ok(FrameAssessment {
                mass: frame.mass(7_850.0),
                max_stress: 1.0e6,
                max_deflection: 0.001,
            })
        }
    }

    fn mass_evaluator() -> SequentialEvaluator<MassOnly> {
        SequentialEvaluator::new(MassOnly, PenaltyFitness::default())
    }

    #[test]
    fn tiny_population_is_rejected() {
        let result = Evolver::builder(mass_evaluator()).population_size(2).build();
        assert!(matches!(result, Err(ConfigError::InvalidPopulationSize(2))));
    }

    #[test]
    fn zero_generations_are_rejected() {
        let result = Evolver::builder(mass_evaluator()).generations(0).build();
        assert!(matches!(result, Err(ConfigError::InvalidGenerationCount(0))));
    }

    #[test]
    fn out_of_range_mutation_rate_is_rejected() {
        let result = Evolver::builder(mass_evaluator()).mutation_rate(1.5).build();
        assert!(matches!(result, Err(ConfigError::InvalidMutationRate(_))));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut bounds = FrameBounds::default();
        bounds.height = crate::frame::ParamRange::new(5.0, 1.0);
        let result = Evolver::builder(mass_evaluator()).bounds(bounds).build();
        assert!(matches!(result, Err(ConfigError::Bounds(_))));
    }

    #[test]
    fn ranking_is_ascending_and_total() {
        let evaluations = vec![
            Evaluation {
                fitness: 3.0,
                assessment: None,
            },
            Evaluation::infeasible(),
            Evaluation {
                fitness: 1.0,
                assessment: None,
            },
        ];
        assert_eq!(rank(&evaluations), vec![2, 0, 1]);
    }

    #[test]
    fn observer_fires_once_per_generation() {
        use std::sync::{Arc, Mutex};

        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut evolver = Evolver::builder(mass_evaluator())
            .population_size(6)
            .generations(4)
            .observer(move |record: &GenerationRecord| {
                sink.lock().unwrap().push(record.generation);
            })
            .build()
            .expect("valid configuration");
        let mut rng = StdRng::seed_from_u64(3);
        evolver.run(&mut rng).expect("run should succeed");
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn best_fitness_is_monotone_non_increasing() {
        let mut evolver = Evolver::builder(mass_evaluator())
            .population_size(12)
            .generations(25)
            .build()
            .expect("valid configuration");
        let mut rng = StdRng::seed_from_u64(5);
        let report = evolver.run(&mut rng).expect("run should succeed");
        for window in report.stats.best_fitness.windows(2) {
            assert!(
                window[1] <= window[0],
                "elites guarantee the per-generation best never regresses"
            );
        }
    }

    #[test]
    fn report_best_matches_stats_minimum() {
        let mut evolver = Evolver::builder(mass_evaluator())
            .population_size(10)
            .generations(15)
            .build()
            .expect("valid configuration");
        let mut rng = StdRng::seed_from_u64(8);
        let report = evolver.run(&mut rng).expect("run should succeed");
        let stats_min = report
            .stats
            .best_fitness
            .iter()
            .fold(f64::INFINITY, |acc, &value| acc.min(value));
        assert_eq!(report.best_fitness, stats_min);
        assert!(report.best_fitness >= report.best_assessment.unwrap().mass);
    }
}
