//! Structural assessment of candidate frames.
//!
//! The optimizer consumes structural analysis through the [`Analyzer`] trait
//! so that engines and tests can swap the backend. The shipped backend,
//! [`TrussxAnalyzer`], delegates the displacement solve to the `trussx` crate
//! and recovers member axial forces from the support reactions by static
//! equilibrium, treating every member as pin-jointed (axial force only, no
//! bending).

use crate::frame::{Frame, MemberKind, NodeId};
use crate::material::Material;
use std::fmt::{self, Display, Formatter};
use trussx::{force, point, Truss};

/// Default magnitude of the downward point load applied at the apex, in
/// newtons.
pub const DEFAULT_APEX_LOAD: f64 = 100_000.0;

/// Structural response of a frame under the fixed apex load.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAssessment {
    /// Total structural mass in kilograms.
    pub mass: f64,
    /// Peak axial stress magnitude across the three members, in pascals.
    pub max_stress: f64,
    /// Magnitude of the apex vertical displacement in metres.
    pub max_deflection: f64,
}

/// Error raised when a frame cannot be analyzed.
///
/// Analysis failures are fatal for the individual only: the evolver absorbs
/// them as infeasible designs and never retries.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The frame parameters describe non-physical geometry.
    DegenerateGeometry {
        /// Which parameter was rejected.
        parameter: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// The structural solver rejected the model or failed to converge.
    Solver(&'static str),
}

impl AnalysisError {
    fn degenerate(parameter: &'static str, value: f64) -> Self {
        Self::DegenerateGeometry { parameter, value }
    }
}

impl Display for AnalysisError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateGeometry { parameter, value } => {
                write!(
                    f,
                    "degenerate geometry: {parameter} = {value} is not physical"
                )
            }
            Self::Solver(step) => write!(f, "analysis failed for this geometry: {step}"),
        }
    }
}

impl std::error::Error for AnalysisError {}

/// Boundary consumed by the optimizer: mass, peak stress, and peak deflection
/// for a frame snapshot.
///
/// Implementations must be stateless with respect to the frame: any solver
/// state is rebuilt per call so independent frames can be analyzed
/// concurrently.
pub trait Analyzer: Send + Sync {
    /// Assesses the frame under the fixed load case.
    ///
    /// # Errors
    /// Returns [`AnalysisError`] for non-physical geometry or a solver
    /// failure.
    fn analyze(&self, frame: &Frame) -> Result<FrameAssessment, AnalysisError>;
}

impl<T: Analyzer + ?Sized> Analyzer for &T {
    fn analyze(&self, frame: &Frame) -> Result<FrameAssessment, AnalysisError> {
        (**self).analyze(frame)
    }
}

impl<T: Analyzer + ?Sized> Analyzer for Box<T> {
    fn analyze(&self, frame: &Frame) -> Result<FrameAssessment, AnalysisError> {
        (**self).analyze(frame)
    }
}

impl<T: Analyzer + ?Sized> Analyzer for std::sync::Arc<T> {
    fn analyze(&self, frame: &Frame) -> Result<FrameAssessment, AnalysisError> {
        (**self).analyze(frame)
    }
}

/// Analyzer backed by the `trussx` stiffness solver.
///
/// A fresh model is assembled per call: pin support at the left base node,
/// roller at the right base node, downward point load at the apex, one truss
/// member per frame member with its section derived from the candidate area.
/// The apex vertical displacement comes from the solver; axial forces come
/// from joint equilibrium at the supports.
#[derive(Debug, Clone, Copy)]
pub struct TrussxAnalyzer {
    material: Material,
    apex_load: f64,
}

impl TrussxAnalyzer {
    /// Creates an analyzer for the given material and apex load magnitude in
    /// newtons (applied downward).
    #[must_use]
    pub fn new(material: Material, apex_load: f64) -> Self {
        Self {
            material,
            apex_load,
        }
    }

    /// The material used for stiffness and mass.
    #[must_use]
    pub fn material(&self) -> Material {
        self.material
    }

    /// Magnitude of the apex load.
    #[must_use]
    pub fn apex_load(&self) -> f64 {
        self.apex_load
    }

    /// Member axial force magnitudes recovered by static equilibrium, in
    /// canonical member order (left leg, right leg, base tie).
    ///
    /// Each support carries half the apex load vertically. Joint equilibrium
    /// at a support then gives the leg force `(P/2)·L/h` (compression) and
    /// the tie force `(P/2)·(w/2)/h` (tension).
    #[must_use]
    pub fn axial_forces(&self, frame: &Frame) -> [f64; 3] {
        let reaction = self.apex_load / 2.0;
        let leg_length = frame.member_length(MemberKind::LeftLeg);
        let leg_axial = reaction * leg_length / frame.height;
        let tie_axial = reaction * (frame.width / 2.0) / frame.height;
        [leg_axial, leg_axial, tie_axial]
    }

    fn validate_geometry(frame: &Frame) -> Result<(), AnalysisError> {
        let named = [
            ("width", frame.width),
            ("height", frame.height),
            ("area_left", frame.area_left),
            ("area_right", frame.area_right),
            ("area_base", frame.area_base),
        ];
        for (parameter, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnalysisError::degenerate(parameter, value));
            }
        }
        Ok(())
    }

    fn peak_stress(&self, frame: &Frame) -> f64 {
        let forces = self.axial_forces(frame);
        MemberKind::ALL
            .iter()
            .zip(forces.iter())
            .map(|(&kind, &axial)| axial.abs() / frame.area(kind))
            .fold(0.0, f64::max)
    }

    fn apex_deflection(&self, frame: &Frame) -> Result<f64, AnalysisError> {
        let mut truss = Truss::new();
        let nodes = frame.nodes();
        let base_left = truss.add_joint(point(nodes[0].1[0], nodes[0].1[1], nodes[0].1[2]));
        let base_right = truss.add_joint(point(nodes[1].1[0], nodes[1].1[1], nodes[1].1[2]));
        let apex = truss.add_joint(point(nodes[2].1[0], nodes[2].1[1], nodes[2].1[2]));

        truss
            .set_support(base_left, [true, true, true])
            .map_err(|_| AnalysisError::Solver("pin support assignment rejected"))?;
        truss
            .set_support(base_right, [false, true, true])
            .map_err(|_| AnalysisError::Solver("roller support assignment rejected"))?;
        truss
            .set_support(apex, [false, false, true])
            .map_err(|_| AnalysisError::Solver("apex restraint assignment rejected"))?;
        truss
            .set_load(apex, force(0.0, -self.apex_load, 0.0))
            .map_err(|_| AnalysisError::Solver("apex load assignment rejected"))?;

        let joint_of = |id: NodeId| match id {
            NodeId::BaseLeft => base_left,
            NodeId::BaseRight => base_right,
            NodeId::Apex => apex,
        };
        for member in frame.members() {
            let handle = truss.add_member(joint_of(member.start), joint_of(member.end));
            truss
                .set_member_properties(
                    handle,
                    frame.area(member.kind),
                    self.material.elastic_modulus,
                )
                .map_err(|_| AnalysisError::Solver("member property assignment rejected"))?;
        }

        truss
            .evaluate()
            .map_err(|_| AnalysisError::Solver("stiffness solve failed"))?;
        let displacement = truss
            .joint_displacement(apex)
            .ok_or(AnalysisError::Solver("apex displacement unavailable"))?;
        Ok(displacement.y.abs())
    }
}

impl Default for TrussxAnalyzer {
    fn default() -> Self {
        Self::new(Material::steel(), DEFAULT_APEX_LOAD)
    }
}

impl Analyzer for TrussxAnalyzer {
    fn analyze(&self, frame: &Frame) -> Result<FrameAssessment, AnalysisError> {
        Self::validate_geometry(frame)?;
        let mass = frame.mass(self.material.density);
        let max_stress = self.peak_stress(frame);
        let max_deflection = self.apex_deflection(frame)?;
        Ok(FrameAssessment {
            mass,
            max_stress,
            max_deflection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_geometry() {
        let analyzer = TrussxAnalyzer::default();
        let frame = Frame::new(2.0, 2.0, 0.0, 1.0e-3, 1.0e-3);
        assert!(matches!(
            analyzer.analyze(&frame),
            Err(AnalysisError::DegenerateGeometry {
                parameter: "area_left",
                ..
            })
        ));
    }

    #[test]
    fn axial_forces_follow_joint_equilibrium() {
        let analyzer = TrussxAnalyzer::new(Material::steel(), 100_000.0);
        let frame = Frame::new(2.0, 2.0, 1.0e-3, 1.0e-3, 1.0e-3);
        let [left, right, tie] = analyzer.axial_forces(&frame);
        let leg_expected = 50_000.0 * 5.0_f64.sqrt() / 2.0;
        let tie_expected = 50_000.0 * 1.0 / 2.0;
        assert!((left - leg_expected).abs() < 1.0e-6);
        assert!((right - leg_expected).abs() < 1.0e-6);
        assert!((tie - tie_expected).abs() < 1.0e-6);
    }

    #[test]
    fn assessment_reports_finite_response() {
        let analyzer = TrussxAnalyzer::default();
        let frame = Frame::new(2.0, 2.0, 1.0e-3, 1.0e-3, 1.0e-3);
        let assessment = analyzer.analyze(&frame).expect("frame should analyze");
        assert!(assessment.mass > 0.0);
        assert!(assessment.max_stress > 0.0);
        assert!(assessment.max_deflection.is_finite());
        assert!(assessment.max_deflection >= 0.0);
    }

    #[test]
    fn stress_scales_inversely_with_area() {
        let analyzer = TrussxAnalyzer::default();
        let thin = Frame::new(2.0, 2.0, 1.0e-4, 1.0e-4, 1.0e-4);
        let thick = Frame::new(2.0, 2.0, 1.0e-3, 1.0e-3, 1.0e-3);
        let thin_stress = analyzer.peak_stress(&thin);
        let thick_stress = analyzer.peak_stress(&thick);
        assert!((thin_stress / thick_stress - 10.0).abs() < 1.0e-9);
    }
}
