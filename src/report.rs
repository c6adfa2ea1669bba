//! Run artifacts produced by the evolver.
//!
//! These types capture time-series metrics and the best design record so
//! callers can inspect a run without any interleaved printing or plotting in
//! the core loop.

use crate::analysis::FrameAssessment;
use crate::frame::Frame;

/// Time-series metrics captured during an optimization run.
///
/// # Examples
/// ```
/// use girder::RunStats;
/// let stats = RunStats::new();
/// assert_eq!(stats.generations(), 0);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Best fitness value observed in each generation.
    pub best_fitness: Vec<f64>,
    /// Mean fitness over the feasible individuals of each generation.
    pub mean_fitness: Vec<f64>,
    /// Parameter-space diversity score of the population per generation.
    pub population_diversity: Vec<f64>,
}

impl RunStats {
    /// Creates an empty set of run statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of generations tracked by the stats object.
    #[must_use]
    pub fn generations(&self) -> usize {
        self.best_fitness.len()
    }

    pub(crate) fn record(&mut self, best: f64, mean: f64, diversity: f64) {
        self.best_fitness.push(best);
        self.mean_fitness.push(mean);
        self.population_diversity.push(diversity);
    }
}

/// The best-ranked individual of one generation: the ephemeral fitness record
/// used for ranking, best-ever tracking, and the observer callback.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRecord {
    /// Zero-based generation index.
    pub generation: usize,
    /// Fitness of the top-ranked individual.
    pub fitness: f64,
    /// The top-ranked frame.
    pub frame: Frame,
    /// Structural response of the frame, absent when analysis failed.
    pub assessment: Option<FrameAssessment>,
}

/// Payload returned by a completed run.
///
/// `best_frame` is the best design seen across *all* generations, which is
/// not necessarily the final generation's top individual. The assessment may
/// still violate the constraints when the search never found a feasible
/// design, so callers must check it against their limits.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct EvolveReport {
    /// Best frame discovered across the whole run.
    pub best_frame: Frame,
    /// Fitness of [`Self::best_frame`].
    pub best_fitness: f64,
    /// Structural response of the best frame, when its analysis succeeded.
    pub best_assessment: Option<FrameAssessment>,
    /// Number of generations executed.
    pub generations: usize,
    /// Per-generation metrics.
    pub stats: RunStats,
    /// The population as it stood after the final reproduction step.
    pub final_population: Vec<Frame>,
}

/// Root-mean variance of the population across the five design parameters.
#[must_use]
pub(crate) fn population_diversity(frames: &[Frame]) -> f64 {
    if frames.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let population_size = frames.len() as f64;
    let mut means = [0.0_f64; 5];
    for frame in frames {
        for (mean, value) in means.iter_mut().zip(frame.params().iter()) {
            *mean += *value;
        }
    }
    for mean in &mut means {
        *mean /= population_size;
    }
    let mut total_variance = 0.0;
    for frame in frames {
        for (mean, value) in means.iter().zip(frame.params().iter()) {
            let diff = value - mean;
            total_variance += (diff * diff) / population_size;
        }
    }
    (total_variance / 5.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_population_has_zero_diversity() {
        let frame = Frame::new(2.0, 2.0, 1.0e-3, 1.0e-3, 1.0e-3);
        let frames = vec![frame.clone(), frame.clone(), frame];
        assert_eq!(population_diversity(&frames), 0.0);
    }

    #[test]
    fn spread_population_has_positive_diversity() {
        let frames = vec![
            Frame::new(1.0, 1.0, 1.0e-4, 1.0e-4, 1.0e-4),
            Frame::new(9.0, 9.0, 0.9, 0.9, 0.9),
        ];
        assert!(population_diversity(&frames) > 0.0);
    }

    #[test]
    fn stats_track_generation_count() {
        let mut stats = RunStats::new();
        stats.record(1.0, 2.0, 0.5);
        stats.record(0.5, 1.5, 0.4);
        assert_eq!(stats.generations(), 2);
        assert_eq!(stats.best_fitness, vec![1.0, 0.5]);
    }
}
