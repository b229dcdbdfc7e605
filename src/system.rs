//! System catalogue: substrates, thin films and their geometry
//!
//! These are stored attributes only. Quantities are SI (metres, square
//! metres, cubic metres, degrees, 1/m³, Ω·m); nothing here derives one
//! quantity from another.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Reference to a catalogued system (archive key or external reference string)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemRef(String);

impl SystemRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Present but pointing at nothing
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SystemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decides whether a reference points at something
pub trait ReferenceResolver {
    fn resolves(&self, reference: &SystemRef) -> bool;
}

/// Accepts every non-blank reference
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyReference;

impl ReferenceResolver for AnyReference {
    fn resolves(&self, reference: &SystemRef) -> bool {
        !reference.is_blank()
    }
}

/// Accepts only references registered in an archive's system catalogue
#[derive(Debug, Clone, Copy)]
pub struct SystemRegistry<'a> {
    systems: &'a BTreeMap<String, System>,
}

impl<'a> SystemRegistry<'a> {
    pub fn new(systems: &'a BTreeMap<String, System>) -> Self {
        Self { systems }
    }
}

impl ReferenceResolver for SystemRegistry<'_> {
    fn resolves(&self, reference: &SystemRef) -> bool {
        !reference.is_blank() && self.systems.contains_key(reference.as_str())
    }
}

// ============================================================================
// SYSTEMS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum System {
    Substrate(Substrate),
    CrystallineSubstrate(CrystallineSubstrate),
    ThinFilm(ThinFilm),
}

impl System {
    pub fn kind(&self) -> &'static str {
        match self {
            System::Substrate(_) => "substrate",
            System::CrystallineSubstrate(_) => "crystalline_substrate",
            System::ThinFilm(_) => "thin_film",
        }
    }

    pub fn lab_id(&self) -> Option<&str> {
        match self {
            System::Substrate(s) => s.lab_id.as_deref(),
            System::CrystallineSubstrate(c) => c.substrate.lab_id.as_deref(),
            System::ThinFilm(t) => t.lab_id.as_deref(),
        }
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        match self {
            System::Substrate(_) => None,
            System::CrystallineSubstrate(c) => c.geometry.as_ref(),
            System::ThinFilm(t) => t.geometry.as_ref(),
        }
    }
}

/// Free standing sheet of material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Substrate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    /// Photograph, as a raw file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Certificate or other documentation, as a raw file path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information_sheet: Option<String>,
}

/// Substrate with a periodic crystal structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrystallineSubstrate {
    #[serde(flatten)]
    pub substrate: Substrate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crystal_properties: Option<SubstrateCrystalProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electronic_properties: Option<ElectronicProperties>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dopants: Vec<Dopant>,
}

/// Thin film that exists as part of a stack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinFilm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
}

// ============================================================================
// CRYSTAL AND ELECTRONIC PROPERTIES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BravaisLattice {
    Triclinic,
    #[serde(rename = "Monoclinic Simple")]
    MonoclinicSimple,
    #[serde(rename = "Monoclinic Base Centered")]
    MonoclinicBaseCentered,
    #[serde(rename = "Orthorhombic Simple")]
    OrthorhombicSimple,
    #[serde(rename = "Orthorhombic Base Centered")]
    OrthorhombicBaseCentered,
    #[serde(rename = "Orthorhombic Body Centered")]
    OrthorhombicBodyCentered,
    #[serde(rename = "Orthorhombic Face Centered")]
    OrthorhombicFaceCentered,
    #[serde(rename = "Tetragonal Simple")]
    TetragonalSimple,
    #[serde(rename = "Tetragonal Body Centered")]
    TetragonalBodyCentered,
    #[serde(rename = "Cubic Simple")]
    CubicSimple,
    #[serde(rename = "Cubic Body Centered")]
    CubicBodyCentered,
    #[serde(rename = "Cubic Face Centered")]
    CubicFaceCentered,
    Trigonal,
    Hexagonal,
}

/// Deviation of the surface from a crystallographic orientation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Miscut {
    /// Degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    /// ± degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle_deviation: Option<f64>,
    /// Miller index, `[hkl]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstrateCrystalProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bravais_lattice: Option<BravaisLattice>,
    /// Surface normal in Miller indices, `(hkl)`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub miscut: Vec<Miscut>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConductivityType {
    #[serde(rename = "P-type")]
    PType,
    #[serde(rename = "N-type")]
    NType,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElectronicProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conductivity_type: Option<ConductivityType>,
    /// 1/m³
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_density: Option<f64>,
    /// Ω·m
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electrical_resistivity: Option<f64>,
}

/// Foreign element introduced into the lattice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dopant {
    pub element: String,
    /// 1/m³
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doping_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doping_deviation: Option<f64>,
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Geometrical shape of a system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Geometry {
    Parallelepiped {
        #[serde(flatten)]
        sides: Sides,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alpha: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        beta: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gamma: Option<f64>,
    },
    RectangleCuboid {
        #[serde(flatten)]
        sides: Sides,
    },
    SquareCuboid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
        /// x = y
        #[serde(default, skip_serializing_if = "Option::is_none")]
        side: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        surface_area: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume: Option<f64>,
    },
    TruncatedCone {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lower_cap_radius: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper_cap_radius: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lower_cap_surface_area: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upper_cap_surface_area: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lateral_surface_area: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume: Option<f64>,
    },
    Cylinder(CylinderShape),
    CylinderSector {
        #[serde(flatten)]
        cylinder: CylinderShape,
        /// Degrees, taken at the centre of the base circle
        #[serde(default, skip_serializing_if = "Option::is_none")]
        central_angle: Option<f64>,
    },
    IrregularParallelSurfaces {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume: Option<f64>,
    },
}

impl Geometry {
    /// Stored volume, if the shape carries one
    pub fn volume(&self) -> Option<f64> {
        match self {
            Geometry::Parallelepiped { sides, .. } | Geometry::RectangleCuboid { sides } => {
                sides.volume
            }
            Geometry::SquareCuboid { volume, .. }
            | Geometry::TruncatedCone { volume, .. }
            | Geometry::IrregularParallelSurfaces { volume, .. } => *volume,
            Geometry::Cylinder(c) | Geometry::CylinderSector { cylinder: c, .. } => c.volume,
        }
    }
}

/// Edge lengths and primary surface of box-like shapes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sides {
    /// z
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// x
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// y
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    /// x * y
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surface_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CylinderShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower_cap_surface_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_surface_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lateral_surface_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_crystalline_substrate() {
        let yaml = r#"
type: crystalline_substrate
lab_id: SUB-042
supplier: CrysTec
geometry:
  shape: rectangle_cuboid
  height: 0.0005
  width: 0.01
  length: 0.01
crystal_properties:
  bravais_lattice: Cubic Face Centered
  orientation: "(100)"
  miscut:
    - angle: 0.1
      orientation: "[110]"
electronic_properties:
  conductivity_type: N-type
dopants:
  - element: Nb
    doping_level: 1.0e24
"#;
        let system: System = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(system.kind(), "crystalline_substrate");
        assert_eq!(system.lab_id(), Some("SUB-042"));
        let System::CrystallineSubstrate(sub) = &system else {
            panic!("expected crystalline substrate");
        };
        assert_eq!(sub.substrate.supplier.as_deref(), Some("CrysTec"));
        let crystal = sub.crystal_properties.as_ref().unwrap();
        assert_eq!(crystal.bravais_lattice, Some(BravaisLattice::CubicFaceCentered));
        assert_eq!(crystal.miscut.len(), 1);
        assert_eq!(
            sub.electronic_properties.as_ref().unwrap().conductivity_type,
            Some(ConductivityType::NType)
        );
        assert_eq!(sub.dopants[0].element, "Nb");
        assert!(matches!(system.geometry(), Some(Geometry::RectangleCuboid { .. })));
    }

    #[test]
    fn parse_geometry_shapes() {
        let cyl: Geometry =
            serde_yaml::from_str("shape: cylinder_sector\nradius: 0.02\ncentral_angle: 90\nvolume: 1.0e-6")
                .unwrap();
        assert_eq!(cyl.volume(), Some(1.0e-6));
        let Geometry::CylinderSector { cylinder, central_angle } = cyl else {
            panic!("expected cylinder sector");
        };
        assert_eq!(cylinder.radius, Some(0.02));
        assert_eq!(central_angle, Some(90.0));

        let cone: Geometry = serde_yaml::from_str("shape: truncated_cone\nheight: 1.0").unwrap();
        assert_eq!(cone.volume(), None);
    }

    #[test]
    fn resolvers() {
        let mut systems = BTreeMap::new();
        systems.insert("film-1".to_string(), System::ThinFilm(ThinFilm::default()));
        let registry = SystemRegistry::new(&systems);

        assert!(registry.resolves(&SystemRef::new("film-1")));
        assert!(!registry.resolves(&SystemRef::new("film-2")));
        assert!(AnyReference.resolves(&SystemRef::new("film-2")));
        assert!(!AnyReference.resolves(&SystemRef::new("  ")));
    }
}
