//! # Opaque Assembly Data Model
//!
//! Read-only projections of a multi-layer wall/roof assembly. The
//! persistence layer builds these fresh per request from stored records;
//! they are never mutated in place — a modification produces a new
//! [`Assembly`] value which is passed to the calculator again.
//!
//! ## Structure
//!
//! ```text
//! Assembly                       (ordered exterior → interior)
//! └── layers: Vec<Layer>
//!     ├── thickness_mm
//!     └── segments: Vec<Segment> (ordered across the layer)
//!         ├── width_mm
//!         ├── material: Option<Material>
//!         └── steel-stud / continuous-insulation flags
//! ```
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "layers": [
//!     {
//!       "thickness_mm": 89.0,
//!       "segments": [
//!         {
//!           "width_mm": 364.6,
//!           "material": { "name": "Fiberglass Batt", "conductivity_w_mk": 0.043 },
//!           "is_steel_stud": false,
//!           "is_continuous_insulation": false
//!         },
//!         {
//!           "width_mm": 41.3,
//!           "material": { "name": "Steel Stud", "conductivity_w_mk": 45.0 },
//!           "is_steel_stud": true,
//!           "steel_stud_spacing_mm": 406.4,
//!           "is_continuous_insulation": false
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::units::{Millimeters, WattsPerMeterKelvin};

/// A material with its thermal conductivity.
///
/// Conductivity must be positive for a valid calculation; a non-positive
/// value is reported as a validation warning by the calculator. The name is
/// carried through to warning text so messages are actionable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Display name (e.g. "Fiberglass Batt", "OSB Sheathing")
    #[serde(default)]
    pub name: String,

    /// Thermal conductivity k (W/mK)
    pub conductivity_w_mk: WattsPerMeterKelvin,
}

impl Material {
    pub fn new(name: impl Into<String>, conductivity_w_mk: f64) -> Self {
        Material {
            name: name.into(),
            conductivity_w_mk: WattsPerMeterKelvin(conductivity_w_mk),
        }
    }
}

/// One segment of a layer, measured across the heat-flow direction.
///
/// A homogeneous layer has exactly one segment; a framed layer alternates
/// cavity and framing segments. Segment widths are relative weights within
/// their layer (only the width fraction matters to the calculation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Segment width (mm, > 0)
    pub width_mm: Millimeters,

    /// Material reference; `None` models an unresolved/deleted material
    pub material: Option<Material>,

    /// True if this segment is a steel stud (triggers the bridging correction)
    #[serde(default)]
    pub is_steel_stud: bool,

    /// Stud spacing on center (mm); meaningful only when `is_steel_stud`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steel_stud_spacing_mm: Option<Millimeters>,

    /// True if this segment is continuous (uninterrupted) insulation
    #[serde(default)]
    pub is_continuous_insulation: bool,
}

impl Segment {
    /// Create a plain segment with a resolved material.
    pub fn new(width_mm: f64, material: Material) -> Self {
        Segment {
            width_mm: Millimeters(width_mm),
            material: Some(material),
            is_steel_stud: false,
            steel_stud_spacing_mm: None,
            is_continuous_insulation: false,
        }
    }

    /// Mark this segment as a steel stud at the given spacing.
    pub fn as_steel_stud(mut self, spacing_mm: f64) -> Self {
        self.is_steel_stud = true;
        self.steel_stud_spacing_mm = Some(Millimeters(spacing_mm));
        self
    }

    /// Mark this segment as continuous insulation.
    pub fn as_continuous_insulation(mut self) -> Self {
        self.is_continuous_insulation = true;
        self
    }

    /// Conductivity of the resolved material, if any.
    pub fn conductivity(&self) -> Option<WattsPerMeterKelvin> {
        self.material.as_ref().map(|m| m.conductivity_w_mk)
    }
}

/// One layer of an assembly, measured along the heat-flow direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer thickness (mm, > 0)
    pub thickness_mm: Millimeters,

    /// Segments across the layer (≥ 1 required)
    pub segments: Vec<Segment>,
}

impl Layer {
    pub fn new(thickness_mm: f64) -> Self {
        Layer {
            thickness_mm: Millimeters(thickness_mm),
            segments: Vec::new(),
        }
    }

    /// Create a homogeneous layer (single full-width segment).
    pub fn homogeneous(thickness_mm: f64, material: Material) -> Self {
        Layer::new(thickness_mm).with_segment(Segment::new(1000.0, material))
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Total width of all segments (mm). Zero for an empty layer.
    pub fn total_width_mm(&self) -> Millimeters {
        Millimeters(self.segments.iter().map(|s| s.width_mm.0).sum())
    }

    /// True if the layer has exactly one segment.
    pub fn is_homogeneous(&self) -> bool {
        self.segments.len() == 1
    }

    /// True if any segment is flagged as a steel stud.
    pub fn has_steel_stud(&self) -> bool {
        self.segments.iter().any(|s| s.is_steel_stud)
    }

    /// True if any segment is flagged as continuous insulation.
    pub fn is_continuous_insulation(&self) -> bool {
        self.segments.iter().any(|s| s.is_continuous_insulation)
    }
}

/// An ordered stack of layers, exterior to interior.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Assembly {
    /// Layers in heat-flow order (≥ 1 required for a valid calculation)
    pub layers: Vec<Layer>,
}

impl Assembly {
    pub fn new(layers: Vec<Layer>) -> Self {
        Assembly { layers }
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// True if any layer contains a steel-stud segment.
    pub fn has_steel_stud(&self) -> bool {
        self.layers.iter().any(Layer::has_steel_stud)
    }

    /// Content-addressed cache key for this assembly.
    ///
    /// Digests the exact bit pattern of every numeric input plus all flags in
    /// layer/segment order, so any single changed input changes the key.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"assembly:v1");
        hasher.update((self.layers.len() as u64).to_le_bytes());
        for layer in &self.layers {
            hasher.update(layer.thickness_mm.0.to_bits().to_le_bytes());
            hasher.update((layer.segments.len() as u64).to_le_bytes());
            for segment in &layer.segments {
                hasher.update(segment.width_mm.0.to_bits().to_le_bytes());
                match &segment.material {
                    Some(m) => {
                        hasher.update([1u8]);
                        hasher.update(m.conductivity_w_mk.0.to_bits().to_le_bytes());
                    }
                    None => hasher.update([0u8]),
                }
                hasher.update([u8::from(segment.is_steel_stud)]);
                match segment.steel_stud_spacing_mm {
                    Some(s) => {
                        hasher.update([1u8]);
                        hasher.update(s.0.to_bits().to_le_bytes());
                    }
                    None => hasher.update([0u8]),
                }
                hasher.update([u8::from(segment.is_continuous_insulation)]);
            }
        }
        crate::cache::short_key(&hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batt() -> Material {
        Material::new("Fiberglass Batt", 0.043)
    }

    #[test]
    fn test_homogeneous_layer() {
        let layer = Layer::homogeneous(89.0, batt());
        assert!(layer.is_homogeneous());
        assert!(!layer.has_steel_stud());
        assert_eq!(layer.total_width_mm().0, 1000.0);
    }

    #[test]
    fn test_framed_layer() {
        let layer = Layer::new(89.0)
            .with_segment(Segment::new(364.6, batt()))
            .with_segment(Segment::new(41.3, Material::new("Steel Stud", 45.0)).as_steel_stud(406.4));
        assert!(!layer.is_homogeneous());
        assert!(layer.has_steel_stud());
        assert!((layer.total_width_mm().0 - 405.9).abs() < 1e-9);
    }

    #[test]
    fn test_assembly_steel_stud_detection() {
        let plain = Assembly::default().with_layer(Layer::homogeneous(89.0, batt()));
        assert!(!plain.has_steel_stud());

        let framed = plain.clone().with_layer(
            Layer::new(89.0)
                .with_segment(Segment::new(364.6, batt()))
                .with_segment(
                    Segment::new(41.3, Material::new("Steel Stud", 45.0)).as_steel_stud(406.4),
                ),
        );
        assert!(framed.has_steel_stud());
    }

    #[test]
    fn test_cache_key_is_stable() {
        let a = Assembly::default().with_layer(Layer::homogeneous(200.0, batt()));
        assert_eq!(a.cache_key(), a.cache_key());
        assert_eq!(a.cache_key().len(), 32);
    }

    #[test]
    fn test_cache_key_changes_with_input() {
        let a = Assembly::default().with_layer(Layer::homogeneous(200.0, batt()));
        let mut b = a.clone();
        b.layers[0].thickness_mm = Millimeters(200.0001);
        assert_ne!(a.cache_key(), b.cache_key());

        let mut c = a.clone();
        c.layers[0].segments[0].is_steel_stud = true;
        assert_ne!(a.cache_key(), c.cache_key());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let assembly = Assembly::default().with_layer(
            Layer::new(89.0)
                .with_segment(Segment::new(364.6, batt()))
                .with_segment(
                    Segment::new(41.3, Material::new("Steel Stud", 45.0)).as_steel_stud(406.4),
                ),
        );
        let json = serde_json::to_string_pretty(&assembly).unwrap();
        assert!(json.contains("thickness_mm"));
        assert!(json.contains("conductivity_w_mk"));

        let roundtrip: Assembly = serde_json::from_str(&json).unwrap();
        assert_eq!(assembly, roundtrip);
    }

    #[test]
    fn test_segment_flags_default_on_deserialize() {
        let json = r#"{ "width_mm": 100.0, "material": { "name": "OSB", "conductivity_w_mk": 0.13 } }"#;
        let segment: Segment = serde_json::from_str(json).unwrap();
        assert!(!segment.is_steel_stud);
        assert!(!segment.is_continuous_insulation);
        assert!(segment.steel_stud_spacing_mm.is_none());
    }
}
