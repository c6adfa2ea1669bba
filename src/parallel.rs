//! Concurrent population evaluation on a Tokio runtime.
//!
//! Per-individual fitness is independent, so a generation can be evaluated in
//! parallel. [`AsyncBatchEvaluator`] spawns one task per frame, bounded by a
//! configurable concurrency limit, and writes each score back into its
//! population slot so the evolver always ranks a deterministically ordered
//! snapshot. The analyzer is shared immutably and a fresh solver model is
//! assembled inside each task.

use crate::analysis::Analyzer;
use crate::fitness::{evaluate_one, Evaluation, EvaluationError, PenaltyFitness, PopulationEvaluator};
use crate::frame::Frame;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use std::thread;
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinHandle;

/// Errors that can occur while building an [`AsyncBatchEvaluator`].
#[derive(Debug)]
pub enum AsyncEvaluatorError {
    /// The requested concurrency level was zero.
    InvalidConcurrency,
    /// Tokio runtime initialization failed.
    Runtime(std::io::Error),
}

impl Display for AsyncEvaluatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConcurrency => {
                write!(f, "max concurrency must be at least one for async evaluation")
            }
            Self::Runtime(err) => write!(f, "failed to initialize Tokio runtime: {err}"),
        }
    }
}

impl std::error::Error for AsyncEvaluatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConcurrency => None,
            Self::Runtime(err) => Some(err),
        }
    }
}

/// Evaluates population snapshots in parallel Tokio tasks.
pub struct AsyncBatchEvaluator<A>
where
    A: Analyzer + 'static,
{
    analyzer: Arc<A>,
    fitness: PenaltyFitness,
    runtime: Runtime,
    max_tasks: usize,
}

impl<A> AsyncBatchEvaluator<A>
where
    A: Analyzer + 'static,
{
    /// Creates a batch evaluator with a concurrency level that matches the
    /// available parallelism on the current machine.
    ///
    /// # Errors
    /// Returns [`AsyncEvaluatorError::Runtime`] when the Tokio runtime cannot
    /// be initialized.
    pub fn new(analyzer: A, fitness: PenaltyFitness) -> Result<Self, AsyncEvaluatorError> {
        let parallelism = thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1);
        Self::with_max_concurrency(analyzer, fitness, parallelism)
    }

    /// Creates a batch evaluator with the requested maximum number of
    /// in-flight tasks.
    ///
    /// # Errors
    /// Returns [`AsyncEvaluatorError::InvalidConcurrency`] when `max_tasks`
    /// is zero or [`AsyncEvaluatorError::Runtime`] if the Tokio runtime fails
    /// to initialize.
    pub fn with_max_concurrency(
        analyzer: A,
        fitness: PenaltyFitness,
        max_tasks: usize,
    ) -> Result<Self, AsyncEvaluatorError> {
        if max_tasks == 0 {
            return Err(AsyncEvaluatorError::InvalidConcurrency);
        }
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(AsyncEvaluatorError::Runtime)?;
        Ok(Self {
            analyzer: Arc::new(analyzer),
            fitness,
            runtime,
            max_tasks,
        })
    }

    async fn evaluate_batch(&self, frames: &[Frame]) -> Result<Vec<Evaluation>, EvaluationError> {
        let mut pending: Vec<JoinHandle<(usize, Evaluation)>> = Vec::new();
        let mut evaluations = vec![Evaluation::infeasible(); frames.len()];
        for (idx, frame) in frames.iter().enumerate() {
            let analyzer = Arc::clone(&self.analyzer);
            let fitness = self.fitness;
            let frame = frame.clone();
            pending.push(tokio::task::spawn_blocking(move || {
                (idx, evaluate_one(analyzer.as_ref(), &fitness, &frame))
            }));
            if pending.len() >= self.max_tasks {
                Self::resolve_handles(&mut pending, &mut evaluations).await?;
            }
        }
        Self::resolve_handles(&mut pending, &mut evaluations).await?;
        Ok(evaluations)
    }

    async fn resolve_handles(
        pending: &mut Vec<JoinHandle<(usize, Evaluation)>>,
        evaluations: &mut [Evaluation],
    ) -> Result<(), EvaluationError> {
        while let Some(handle) = pending.pop() {
            let (idx, evaluation) = handle.await?;
            evaluations[idx] = evaluation;
        }
        Ok(())
    }
}

impl<A> PopulationEvaluator for AsyncBatchEvaluator<A>
where
    A: Analyzer + 'static,
{
    fn evaluate_population(&mut self, frames: &[Frame]) -> Result<Vec<Evaluation>, EvaluationError> {
        self.runtime.block_on(self.evaluate_batch(frames))
    }
}
