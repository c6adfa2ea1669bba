//! Material properties consumed by the structural analyzer and the fitness
//! evaluator.

/// Linear-elastic material description for truss members.
///
/// # Examples
/// ```
/// use girder::Material;
/// let steel = Material::steel();
/// assert_eq!(steel.density, 7_850.0);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Young's modulus in pascals.
    pub elastic_modulus: f64,
    /// Density in kilograms per cubic metre.
    pub density: f64,
    /// Yield strength in pascals, the hard stress constraint.
    pub yield_stress: f64,
}

impl Material {
    /// Creates a material from its three scalar properties.
    #[must_use]
    pub fn new(elastic_modulus: f64, density: f64, yield_stress: f64) -> Self {
        Self {
            elastic_modulus,
            density,
            yield_stress,
        }
    }

    /// Structural steel: E = 210 GPa, ρ = 7850 kg/m³, σ_y = 250 MPa.
    #[must_use]
    pub fn steel() -> Self {
        Self {
            elastic_modulus: 210.0e9,
            density: 7_850.0,
            yield_stress: 250.0e6,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::steel()
    }
}
