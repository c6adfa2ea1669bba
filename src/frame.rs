//! Parametric description of a triangular truss frame.
//!
//! A [`Frame`] is the design individual evolved by the optimizer: two geometry
//! parameters (width and height) and one cross-sectional area per member.
//! Node coordinates and member connectivity are derived quantities, recomputed
//! on demand from the current parameters so they can never go stale after a
//! mutation.

use rand::Rng;
use std::fmt::{self, Display, Formatter};

/// Fraction of a parameter's bound span used as the mutation perturbation
/// half-width.
const MUTATION_SPAN_FRACTION: f64 = 0.1;

/// Closed interval that bounds one kind of design parameter.
///
/// # Examples
/// ```
/// use girder::ParamRange;
/// let range = ParamRange::new(1.0, 10.0);
/// assert_eq!(range.clamp(12.0), 10.0);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    /// Inclusive lower bound.
    pub min: f64,
    /// Inclusive upper bound.
    pub max: f64,
}

impl ParamRange {
    /// Creates a range without validating it; see [`FrameBounds::validate`].
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamps a value into the range. Idempotent: an in-bounds value is
    /// returned unchanged.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Width of the interval.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }

    fn perturb<R: Rng + ?Sized>(&self, value: f64, rng: &mut R) -> f64 {
        let delta = self.span() * MUTATION_SPAN_FRACTION;
        self.clamp(value + rng.gen_range(-delta..=delta))
    }

    fn validate(&self, parameter: &'static str) -> Result<(), BoundsError> {
        if self.min > self.max {
            return Err(BoundsError::InvertedRange {
                parameter,
                min: self.min,
                max: self.max,
            });
        }
        if !(self.min.is_finite() && self.max.is_finite() && self.min > 0.0) {
            return Err(BoundsError::NonPositiveLower {
                parameter,
                min: self.min,
            });
        }
        Ok(())
    }
}

/// Bound intervals for every kind of frame parameter.
///
/// The defaults reproduce the steel frame design space: width and height in
/// `[1.0, 10.0]` metres, member areas in `[1e-4, 1.0]` square metres. The
/// strictly positive area minimum prevents singular stiffness assemblies.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBounds {
    /// Bounds for the frame width.
    pub width: ParamRange,
    /// Bounds for the frame height.
    pub height: ParamRange,
    /// Bounds shared by all three member cross-sectional areas.
    pub area: ParamRange,
}

impl FrameBounds {
    /// Ensures every interval is well formed.
    ///
    /// # Errors
    /// Returns [`BoundsError`] when any interval is inverted or its lower
    /// bound is not strictly positive.
    pub fn validate(&self) -> Result<(), BoundsError> {
        self.width.validate("width")?;
        self.height.validate("height")?;
        self.area.validate("area")?;
        Ok(())
    }
}

impl Default for FrameBounds {
    fn default() -> Self {
        Self {
            width: ParamRange::new(1.0, 10.0),
            height: ParamRange::new(1.0, 10.0),
            area: ParamRange::new(1.0e-4, 1.0),
        }
    }
}

/// Error returned for malformed [`FrameBounds`].
#[derive(Debug, Clone, PartialEq)]
pub enum BoundsError {
    /// A lower bound exceeds its upper bound.
    InvertedRange {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Lower bound value.
        min: f64,
        /// Upper bound value.
        max: f64,
    },
    /// A lower bound is non-positive or non-finite, which would admit
    /// degenerate zero-length or zero-area members.
    NonPositiveLower {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Lower bound value.
        min: f64,
    },
}

impl Display for BoundsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvertedRange {
                parameter,
                min,
                max,
            } => write!(
                f,
                "{parameter} bounds are inverted (min {min} exceeds max {max})"
            ),
            Self::NonPositiveLower { parameter, min } => write!(
                f,
                "{parameter} lower bound must be finite and strictly positive (received {min})"
            ),
        }
    }
}

impl std::error::Error for BoundsError {}

/// Identifier for one of the three frame nodes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    /// Pinned support at the origin.
    BaseLeft,
    /// Roller support at `(width, 0, 0)`.
    BaseRight,
    /// Loaded apex at `(width/2, height, 0)`.
    Apex,
}

/// Identifier for one of the three frame members.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Inclined member from the left support to the apex.
    LeftLeg,
    /// Inclined member from the right support to the apex.
    RightLeg,
    /// Horizontal tie between the two supports.
    BaseTie,
}

impl MemberKind {
    /// The three members in canonical order.
    pub const ALL: [MemberKind; 3] = [Self::LeftLeg, Self::RightLeg, Self::BaseTie];
}

/// Connectivity of a single member.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    /// Node at the start of the member.
    pub start: NodeId,
    /// Node at the end of the member.
    pub end: NodeId,
    /// Which member this is, used to look up its area.
    pub kind: MemberKind,
}

/// A parametric triangular truss frame: the design individual of the
/// optimizer.
///
/// The five scalar parameters fully determine the design. Node coordinates
/// and member lengths are pure functions of width and height.
///
/// # Examples
/// ```
/// use girder::Frame;
/// let frame = Frame::new(2.0, 2.0, 1.0e-3, 1.0e-3, 1.0e-3);
/// let expected = (2.0 * 5.0_f64.sqrt() + 2.0) * 1.0e-3 * 7_850.0;
/// assert!((frame.mass(7_850.0) - expected).abs() < 1.0e-9);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Distance between the two base supports in metres.
    pub width: f64,
    /// Height of the apex above the base in metres.
    pub height: f64,
    /// Cross-sectional area of the left leg in square metres.
    pub area_left: f64,
    /// Cross-sectional area of the right leg in square metres.
    pub area_right: f64,
    /// Cross-sectional area of the base tie in square metres.
    pub area_base: f64,
}

impl Frame {
    /// Creates a frame with explicit parameters.
    #[must_use]
    pub fn new(width: f64, height: f64, area_left: f64, area_right: f64, area_base: f64) -> Self {
        Self {
            width,
            height,
            area_left,
            area_right,
            area_base,
        }
    }

    /// Samples a frame with each parameter drawn independently and uniformly
    /// from its bound interval.
    #[must_use]
    pub fn random<R: Rng + ?Sized>(bounds: &FrameBounds, rng: &mut R) -> Self {
        Self {
            width: bounds.width.sample(rng),
            height: bounds.height.sample(rng),
            area_left: bounds.area.sample(rng),
            area_right: bounds.area.sample(rng),
            area_base: bounds.area.sample(rng),
        }
    }

    /// Node coordinates derived from the current width and height.
    ///
    /// The layout is a symmetric triangle: supports at `(0, 0, 0)` and
    /// `(width, 0, 0)`, apex at `(width/2, height, 0)`.
    #[must_use]
    pub fn nodes(&self) -> [(NodeId, [f64; 3]); 3] {
        [
            (NodeId::BaseLeft, [0.0, 0.0, 0.0]),
            (NodeId::BaseRight, [self.width, 0.0, 0.0]),
            (NodeId::Apex, [self.width / 2.0, self.height, 0.0]),
        ]
    }

    /// The fixed member connectivity of the frame.
    #[must_use]
    pub fn members(&self) -> [Member; 3] {
        [
            Member {
                start: NodeId::BaseLeft,
                end: NodeId::Apex,
                kind: MemberKind::LeftLeg,
            },
            Member {
                start: NodeId::BaseRight,
                end: NodeId::Apex,
                kind: MemberKind::RightLeg,
            },
            Member {
                start: NodeId::BaseLeft,
                end: NodeId::BaseRight,
                kind: MemberKind::BaseTie,
            },
        ]
    }

    /// Cross-sectional area of the requested member.
    #[must_use]
    pub fn area(&self, kind: MemberKind) -> f64 {
        match kind {
            MemberKind::LeftLeg => self.area_left,
            MemberKind::RightLeg => self.area_right,
            MemberKind::BaseTie => self.area_base,
        }
    }

    /// Length of the requested member. Both legs share
    /// `sqrt((width/2)² + height²)` by symmetry; the tie spans the width.
    #[must_use]
    pub fn member_length(&self, kind: MemberKind) -> f64 {
        match kind {
            MemberKind::LeftLeg | MemberKind::RightLeg => {
                ((self.width / 2.0).powi(2) + self.height.powi(2)).sqrt()
            }
            MemberKind::BaseTie => self.width,
        }
    }

    /// Total mass of the frame: `Σ area × length × density`, recomputed from
    /// the current geometry on every call.
    #[must_use]
    pub fn mass(&self, density: f64) -> f64 {
        MemberKind::ALL
            .iter()
            .map(|&kind| self.area(kind) * self.member_length(kind))
            .sum::<f64>()
            * density
    }

    /// The five design parameters in canonical order: width, height, left
    /// area, right area, base area.
    #[must_use]
    pub fn params(&self) -> [f64; 5] {
        [
            self.width,
            self.height,
            self.area_left,
            self.area_right,
            self.area_base,
        ]
    }

    /// Perturbs each parameter independently with probability `rate` by a
    /// uniform delta within ±10% of its bound span, then clamps to bounds.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, bounds: &FrameBounds, rng: &mut R) {
        if rng.gen::<f64>() < rate {
            self.width = bounds.width.perturb(self.width, rng);
        }
        if rng.gen::<f64>() < rate {
            self.height = bounds.height.perturb(self.height, rng);
        }
        if rng.gen::<f64>() < rate {
            self.area_left = bounds.area.perturb(self.area_left, rng);
        }
        if rng.gen::<f64>() < rate {
            self.area_right = bounds.area.perturb(self.area_right, rng);
        }
        if rng.gen::<f64>() < rate {
            self.area_base = bounds.area.perturb(self.area_base, rng);
        }
    }

    /// Uniform discrete crossover: each of the five parameters is inherited
    /// from either parent with equal probability, with no blending.
    #[must_use]
    pub fn cross<R: Rng + ?Sized>(&self, other: &Self, rng: &mut R) -> Self {
        let pick = |rng: &mut R, a: f64, b: f64| if rng.gen::<f64>() < 0.5 { a } else { b };
        Self {
            width: pick(rng, self.width, other.width),
            height: pick(rng, self.height, other.height),
            area_left: pick(rng, self.area_left, other.area_left),
            area_right: pick(rng, self.area_right, other.area_right),
            area_base: pick(rng, self.area_base, other.area_base),
        }
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame(width={:.2}, height={:.2}, areas=[{:.4}, {:.4}, {:.4}])",
            self.width, self.height, self.area_left, self.area_right, self.area_base
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn within_bounds(frame: &Frame, bounds: &FrameBounds) -> bool {
        let ranges = [
            bounds.width,
            bounds.height,
            bounds.area,
            bounds.area,
            bounds.area,
        ];
        frame
            .params()
            .iter()
            .zip(ranges.iter())
            .all(|(value, range)| range.min <= *value && *value <= range.max)
    }

    #[test]
    fn random_frames_respect_bounds() {
        let bounds = FrameBounds::default();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let frame = Frame::random(&bounds, &mut rng);
            assert!(within_bounds(&frame, &bounds));
        }
    }

    #[test]
    fn mutation_stays_within_bounds() {
        let bounds = FrameBounds::default();
        let mut rng = StdRng::seed_from_u64(13);
        let mut frame = Frame::random(&bounds, &mut rng);
        for _ in 0..500 {
            frame.mutate(1.0, &bounds, &mut rng);
            assert!(within_bounds(&frame, &bounds));
        }
    }

    #[test]
    fn mass_matches_hand_calculation() {
        let frame = Frame::new(2.0, 2.0, 1.0e-3, 1.0e-3, 1.0e-3);
        let leg = 5.0_f64.sqrt();
        let expected = (2.0 * leg + 2.0) * 1.0e-3 * 7_850.0;
        assert!((frame.mass(7_850.0) - expected).abs() < 1.0e-9);
    }

    #[test]
    fn mass_is_deterministic_across_calls() {
        let bounds = FrameBounds::default();
        let mut rng = StdRng::seed_from_u64(17);
        let frame = Frame::random(&bounds, &mut rng);
        assert_eq!(frame.mass(7_850.0), frame.mass(7_850.0));
    }

    #[test]
    fn nodes_track_current_geometry() {
        let mut frame = Frame::new(4.0, 3.0, 1.0e-3, 1.0e-3, 1.0e-3);
        let bounds = FrameBounds::default();
        let mut rng = StdRng::seed_from_u64(19);
        frame.mutate(1.0, &bounds, &mut rng);
        let nodes = frame.nodes();
        assert_eq!(nodes[1].1, [frame.width, 0.0, 0.0]);
        assert_eq!(nodes[2].1, [frame.width / 2.0, frame.height, 0.0]);
    }

    #[test]
    fn crossover_only_inherits_parent_values() {
        let bounds = FrameBounds::default();
        let mut rng = StdRng::seed_from_u64(23);
        let parent_a = Frame::random(&bounds, &mut rng);
        let parent_b = Frame::random(&bounds, &mut rng);
        for _ in 0..50 {
            let child = parent_a.cross(&parent_b, &mut rng);
            for ((child_value, a_value), b_value) in child
                .params()
                .iter()
                .zip(parent_a.params().iter())
                .zip(parent_b.params().iter())
            {
                assert!(child_value == a_value || child_value == b_value);
            }
        }
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        let mut bounds = FrameBounds::default();
        bounds.width = ParamRange::new(10.0, 1.0);
        assert!(matches!(
            bounds.validate(),
            Err(BoundsError::InvertedRange { parameter: "width", .. })
        ));

        let mut bounds = FrameBounds::default();
        bounds.area = ParamRange::new(0.0, 1.0);
        assert!(matches!(
            bounds.validate(),
            Err(BoundsError::NonPositiveLower { parameter: "area", .. })
        ));
    }
}
