//! Constraint-aware fitness evaluation.
//!
//! Fitness is the frame mass plus additive penalties for violating the yield
//! stress or deflection limits. Lower is strictly better, and a design that
//! satisfies both constraints scores exactly its mass, so the search reduces
//! to pure mass minimization once the feasible region is reached.

use crate::analysis::{Analyzer, FrameAssessment};
use crate::frame::Frame;
use std::fmt::{self, Display, Formatter};
use tracing::warn;

/// Multiplier applied to the fractional constraint overshoot, scaled by mass
/// so the penalty magnitude tracks the design scale.
const PENALTY_WEIGHT: f64 = 10.0;

/// Default allowable apex deflection in metres.
pub const DEFAULT_DEFLECTION_LIMIT: f64 = 0.1;

/// Penalty-based scalar fitness over an analyzer assessment.
///
/// # Examples
/// ```
/// use girder::{FrameAssessment, PenaltyFitness};
///
/// let fitness = PenaltyFitness::new(250.0e6, 0.1);
/// let feasible = FrameAssessment { mass: 100.0, max_stress: 1.0e6, max_deflection: 0.01 };
/// assert_eq!(fitness.score(&feasible), 100.0);
///
/// // 10% yield overshoot doubles the score relative to mass alone.
/// let overstressed = FrameAssessment { mass: 100.0, max_stress: 275.0e6, max_deflection: 0.01 };
/// assert!((fitness.score(&overstressed) - 200.0).abs() < 1.0e-9);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyFitness {
    /// Yield strength of the material in pascals.
    pub yield_stress: f64,
    /// Allowable apex deflection in metres.
    pub deflection_limit: f64,
}

impl PenaltyFitness {
    /// Creates a fitness evaluator from the two constraint limits.
    #[must_use]
    pub fn new(yield_stress: f64, deflection_limit: f64) -> Self {
        Self {
            yield_stress,
            deflection_limit,
        }
    }

    /// Scores an assessment. The result is always at least the mass; both
    /// penalties are independent and accumulate when both constraints are
    /// violated.
    #[must_use]
    pub fn score(&self, assessment: &FrameAssessment) -> f64 {
        let mut fitness = assessment.mass;
        if assessment.max_stress > self.yield_stress {
            fitness +=
                assessment.mass * PENALTY_WEIGHT * (assessment.max_stress / self.yield_stress - 1.0);
        }
        if assessment.max_deflection > self.deflection_limit {
            fitness += assessment.mass
                * PENALTY_WEIGHT
                * (assessment.max_deflection / self.deflection_limit - 1.0);
        }
        fitness
    }
}

impl Default for PenaltyFitness {
    fn default() -> Self {
        Self::new(
            crate::material::Material::steel().yield_stress,
            DEFAULT_DEFLECTION_LIMIT,
        )
    }
}

/// Per-individual evaluation produced during one generation.
///
/// `assessment` is `None` when the analyzer rejected the design; such
/// individuals carry infinite fitness and lose every ranking comparison.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Scalar fitness, lower is better.
    pub fitness: f64,
    /// Structural response, when analysis succeeded.
    pub assessment: Option<FrameAssessment>,
}

impl Evaluation {
    /// Marks an individual whose analysis failed.
    #[must_use]
    pub fn infeasible() -> Self {
        Self {
            fitness: f64::INFINITY,
            assessment: None,
        }
    }

    /// Whether the analyzer produced a response for this individual.
    #[must_use]
    pub fn is_feasible(&self) -> bool {
        self.assessment.is_some()
    }
}

/// Errors reported by evaluation backends.
///
/// Per-individual analysis failures are absorbed into infeasible
/// [`Evaluation`] records; only infrastructure failures surface here.
#[derive(Debug)]
pub enum EvaluationError {
    /// Tokio runtime failed to initialize.
    Runtime(std::io::Error),
    /// A spawned evaluation task failed or panicked.
    Task(tokio::task::JoinError),
}

impl Display for EvaluationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime(err) => write!(f, "failed to initialize Tokio runtime: {err}"),
            Self::Task(err) => write!(f, "evaluation task failed: {err}"),
        }
    }
}

impl std::error::Error for EvaluationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Runtime(err) => Some(err),
            Self::Task(err) => Some(err),
        }
    }
}

impl From<tokio::task::JoinError> for EvaluationError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err)
    }
}

/// Trait implemented by types that can evaluate a population snapshot.
///
/// Results must be returned in population order so ranking and reproduction
/// operate over a fixed-order snapshot regardless of evaluation scheduling.
pub trait PopulationEvaluator {
    /// Evaluates every frame, absorbing per-individual analysis failures.
    ///
    /// # Errors
    /// Returns [`EvaluationError`] only for infrastructure failures; a frame
    /// the analyzer rejects becomes [`Evaluation::infeasible`].
    fn evaluate_population(&mut self, frames: &[Frame]) -> Result<Vec<Evaluation>, EvaluationError>;
}

pub(crate) fn evaluate_one<A: Analyzer>(
    analyzer: &A,
    fitness: &PenaltyFitness,
    frame: &Frame,
) -> Evaluation {
    match analyzer.analyze(frame) {
        Ok(assessment) => Evaluation {
            fitness: fitness.score(&assessment),
            assessment: Some(assessment),
        },
        Err(err) => {
            warn!(%frame, error = %err, "analysis failed, marking design infeasible");
            Evaluation::infeasible()
        }
    }
}

/// Evaluates the population one frame at a time on the calling thread.
#[derive(Debug, Clone)]
pub struct SequentialEvaluator<A> {
    analyzer: A,
    fitness: PenaltyFitness,
}

impl<A: Analyzer> SequentialEvaluator<A> {
    /// Creates a sequential evaluator over the given analyzer and limits.
    #[must_use]
    pub fn new(analyzer: A, fitness: PenaltyFitness) -> Self {
        Self { analyzer, fitness }
    }
}

impl<A: Analyzer> PopulationEvaluator for SequentialEvaluator<A> {
    fn evaluate_population(&mut self, frames: &[Frame]) -> Result<Vec<Evaluation>, EvaluationError> {
        Ok(frames
            .iter()
            .map(|frame| evaluate_one(&self.analyzer, &self.fitness, frame))
            .collect())
    }
}
