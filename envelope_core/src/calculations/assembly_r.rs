//! # Assembly Thermal Resistance Calculation
//!
//! Computes the effective R-value of a multi-layer opaque assembly using two
//! ASHRAE methods and averages them per the Passive-House convention:
//!
//! - **Parallel-Path**: every combination of one segment per layer is an
//!   independent heat-flow path; each path contributes its area-weighted
//!   conductance.
//! - **Isothermal-Planes**: each layer is collapsed to an area-weighted
//!   parallel combination of its segments, then layers sum in series.
//!
//! The parallel-path method over-weights low-conductance paths and the
//! isothermal-planes method over-weights lateral redistribution; real
//! assemblies fall between the two bounds, hence the average.
//!
//! No air-film resistance is included.
//!
//! ## Assumptions
//!
//! - One-dimensional steady-state conduction
//! - Segment widths are per-layer area weights (layers need not share a
//!   common module width)
//! - Steel-stud layers are first replaced by an equivalent homogeneous
//!   segment (see [`crate::calculations::steel_stud`])
//!
//! ## Example
//!
//! ```rust
//! use envelope_core::calculations::assembly_r::calculate;
//! use envelope_core::model::{Assembly, Layer, Material};
//!
//! let assembly = Assembly::default()
//!     .with_layer(Layer::homogeneous(200.0, Material::new("Mineral Wool", 0.0389415)));
//!
//! let result = calculate(&assembly).unwrap();
//! assert!(result.is_valid);
//! assert!((result.r_effective_si - 5.135909).abs() < 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::steel_stud;
use crate::errors::ThermalResult;
use crate::model::{Assembly, Layer};
use crate::units::Meters;

/// Options for the assembly calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyCalcOptions {
    /// Ceiling on the parallel-path Cartesian enumeration.
    ///
    /// The path count is the product of per-layer segment counts; exceeding
    /// this ceiling marks the result invalid instead of attempting an
    /// unbounded enumeration.
    pub max_paths: usize,
}

impl Default for AssemblyCalcOptions {
    fn default() -> Self {
        AssemblyCalcOptions { max_paths: 10_000 }
    }
}

/// Results from the assembly R-value calculation.
///
/// All values are SI, rounded to 6 decimals at this output boundary. When
/// any validation warning is present the numeric fields are zeroed and
/// `is_valid` is false — partial results are never reported.
///
/// ## JSON Example
///
/// ```json
/// {
///   "r_parallel_path_si": 5.135909,
///   "r_isothermal_planes_si": 5.135909,
///   "r_effective_si": 5.135909,
///   "u_effective_si": 0.194708,
///   "is_valid": true,
///   "warnings": []
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalResistanceResult {
    /// ASHRAE Parallel-Path resistance (m²K/W)
    pub r_parallel_path_si: f64,

    /// ASHRAE Isothermal-Planes resistance (m²K/W)
    pub r_isothermal_planes_si: f64,

    /// Passive-House effective resistance: mean of the two methods (m²K/W)
    pub r_effective_si: f64,

    /// Effective transmittance 1/R_effective (W/m²K), 0 if R_effective ≤ 0
    pub u_effective_si: f64,

    /// False when any validation warning is present
    pub is_valid: bool,

    /// Accumulated validation warnings (empty when valid)
    pub warnings: Vec<String>,
}

impl ThermalResistanceResult {
    /// Invalid result: zeroed fields with the collected warnings surfaced.
    fn invalid(warnings: Vec<String>) -> Self {
        ThermalResistanceResult {
            r_parallel_path_si: 0.0,
            r_isothermal_planes_si: 0.0,
            r_effective_si: 0.0,
            u_effective_si: 0.0,
            is_valid: false,
            warnings,
        }
    }
}

/// Round to 6 decimals at the output boundary.
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Calculate effective thermal resistance with default options.
///
/// This is a pure function: repeated calls on an unchanged assembly yield
/// bit-identical results.
///
/// # Errors
///
/// `ThermalError::DataIntegrity` when a steel-stud layer is missing its
/// cavity material or has a non-positive depth (corrupted persisted data).
/// User-editable validation problems never error; they surface through the
/// result's `warnings` and `is_valid` fields.
pub fn calculate(assembly: &Assembly) -> ThermalResult<ThermalResistanceResult> {
    calculate_with_options(assembly, &AssemblyCalcOptions::default())
}

/// Calculate effective thermal resistance.
///
/// See [`calculate`] for the error contract.
pub fn calculate_with_options(
    assembly: &Assembly,
    options: &AssemblyCalcOptions,
) -> ThermalResult<ThermalResistanceResult> {
    // Steel-stud layers become an equivalent homogeneous segment before
    // either method runs. Corrector failures are hard errors.
    let corrected;
    let working = if assembly.has_steel_stud() {
        corrected = steel_stud::apply_corrections(assembly)?;
        &corrected
    } else {
        assembly
    };

    let warnings = validate(working);
    if !warnings.is_empty() {
        return Ok(ThermalResistanceResult::invalid(warnings));
    }

    let r_parallel = match parallel_path_resistance(working, options.max_paths) {
        Ok(r) => r,
        Err(warning) => return Ok(ThermalResistanceResult::invalid(vec![warning])),
    };
    let r_isothermal = isothermal_planes_resistance(working);

    let r_effective = (r_parallel + r_isothermal) / 2.0;
    let u_effective = if r_effective > 0.0 {
        1.0 / r_effective
    } else {
        0.0
    };

    Ok(ThermalResistanceResult {
        r_parallel_path_si: round6(r_parallel),
        r_isothermal_planes_si: round6(r_isothermal),
        r_effective_si: round6(r_effective),
        u_effective_si: round6(u_effective),
        is_valid: true,
        warnings: Vec::new(),
    })
}

/// Collect validation warnings over the whole assembly.
///
/// Warnings accumulate (the user sees every problem at once); any warning
/// invalidates the result.
fn validate(assembly: &Assembly) -> Vec<String> {
    let mut warnings = Vec::new();

    if assembly.layers.is_empty() {
        warnings.push("Assembly has no layers".to_string());
        return warnings;
    }

    for (i, layer) in assembly.layers.iter().enumerate() {
        let layer_no = i + 1;
        if layer.segments.is_empty() {
            warnings.push(format!("Layer {layer_no}: has no segments"));
        }
        if layer.thickness_mm.0 <= 0.0 {
            warnings.push(format!(
                "Layer {layer_no}: thickness must be positive (got {} mm)",
                layer.thickness_mm.0
            ));
        }
        for (j, segment) in layer.segments.iter().enumerate() {
            let segment_no = j + 1;
            if segment.width_mm.0 <= 0.0 {
                warnings.push(format!(
                    "Layer {layer_no}, segment {segment_no}: width must be positive (got {} mm)",
                    segment.width_mm.0
                ));
            }
            match &segment.material {
                None => warnings.push(format!(
                    "Layer {layer_no}, segment {segment_no}: material is missing"
                )),
                Some(material) if material.conductivity_w_mk.0 <= 0.0 => {
                    warnings.push(format!(
                        "Layer {layer_no}, segment {segment_no}: material '{}' conductivity must be positive (got {} W/mK)",
                        material.name, material.conductivity_w_mk.0
                    ));
                }
                Some(_) => {}
            }
        }
    }

    warnings
}

/// Series resistance of a single heat-flow path, one segment per layer.
fn path_series_resistance(layers: &[Layer], indices: &[usize]) -> f64 {
    layers
        .iter()
        .zip(indices)
        .map(|(layer, &idx)| {
            let thickness_m = Meters::from(layer.thickness_mm).0;
            // Validation guarantees presence and positivity
            let k = layer.segments[idx]
                .conductivity()
                .map(|c| c.0)
                .unwrap_or(f64::INFINITY);
            thickness_m / k
        })
        .sum()
}

/// ASHRAE Parallel-Path resistance.
///
/// For an all-homogeneous assembly this is the plain series sum. Otherwise
/// an explicit odometer over per-layer segment indices enumerates every
/// path (Cartesian product); each path contributes
/// `area_fraction / path_resistance` to the assembly conductance.
///
/// Returns `Err(warning)` when the path count exceeds `max_paths`.
fn parallel_path_resistance(assembly: &Assembly, max_paths: usize) -> Result<f64, String> {
    let layers = &assembly.layers;

    if layers.iter().all(Layer::is_homogeneous) {
        let indices = vec![0usize; layers.len()];
        return Ok(path_series_resistance(layers, &indices));
    }

    let mut path_count: usize = 1;
    for layer in layers {
        path_count = match path_count.checked_mul(layer.segments.len()) {
            Some(n) if n <= max_paths => n,
            _ => {
                return Err(format!(
                    "Parallel-path enumeration exceeds the ceiling of {max_paths} paths; \
                     simplify the assembly or raise max_paths"
                ));
            }
        };
    }

    let layer_widths: Vec<f64> = layers.iter().map(|l| l.total_width_mm().0).collect();

    let mut u_assembly = 0.0;
    let mut indices = vec![0usize; layers.len()];
    loop {
        let r_path = path_series_resistance(layers, &indices);
        let area_fraction: f64 = layers
            .iter()
            .zip(&indices)
            .zip(&layer_widths)
            .map(|((layer, &idx), &width)| layer.segments[idx].width_mm.0 / width)
            .product();
        u_assembly += area_fraction / r_path;

        // Odometer increment over per-layer segment indices
        let mut pos = indices.len();
        loop {
            if pos == 0 {
                return Ok(1.0 / u_assembly);
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < layers[pos].segments.len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}

/// ASHRAE Isothermal-Planes resistance.
///
/// Each layer collapses to an area-weighted parallel combination of its
/// segments; layer resistances then sum in series.
fn isothermal_planes_resistance(assembly: &Assembly) -> f64 {
    assembly
        .layers
        .iter()
        .map(|layer| {
            let thickness_m = Meters::from(layer.thickness_mm).0;
            if layer.is_homogeneous() {
                let k = layer.segments[0]
                    .conductivity()
                    .map(|c| c.0)
                    .unwrap_or(f64::INFINITY);
                return thickness_m / k;
            }
            let total_width = layer.total_width_mm().0;
            let conductance: f64 = layer
                .segments
                .iter()
                .map(|segment| {
                    let fraction = segment.width_mm.0 / total_width;
                    let k = segment.conductivity().map(|c| c.0).unwrap_or(f64::INFINITY);
                    let r_segment = thickness_m / k;
                    fraction / r_segment
                })
                .sum();
            1.0 / conductance
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Material, Segment};

    fn insulation() -> Material {
        Material::new("Mineral Wool", 0.0389415)
    }

    #[test]
    fn test_scenario_a_single_layer() {
        // 200mm at k=0.0389415 => R ≈ 5.136, U ≈ 0.1947
        let assembly =
            Assembly::default().with_layer(Layer::homogeneous(200.0, insulation()));
        let result = calculate(&assembly).unwrap();

        assert!(result.is_valid);
        assert!((result.r_effective_si - 5.135909).abs() < 1e-6);
        assert!((result.u_effective_si - 0.194708).abs() < 1e-6);
    }

    #[test]
    fn test_scenario_b_three_layer_series() {
        // 50mm k=0.0389415 + 20mm k=0.129805 + 30mm k=0.719986 => R ≈ 1.480
        let assembly = Assembly::default()
            .with_layer(Layer::homogeneous(50.0, insulation()))
            .with_layer(Layer::homogeneous(20.0, Material::new("Wood Fiber", 0.129805)))
            .with_layer(Layer::homogeneous(30.0, Material::new("Brick", 0.719986)));
        let result = calculate(&assembly).unwrap();

        assert!(result.is_valid);
        assert!((result.r_effective_si - 1.480).abs() < 0.001);
    }

    #[test]
    fn test_homogeneous_equivalence() {
        // All-homogeneous: both methods equal the series sum
        let assembly = Assembly::default()
            .with_layer(Layer::homogeneous(50.0, insulation()))
            .with_layer(Layer::homogeneous(20.0, Material::new("Wood Fiber", 0.129805)));
        let result = calculate(&assembly).unwrap();

        let expected = 0.05 / 0.0389415 + 0.02 / 0.129805;
        assert!((result.r_parallel_path_si - expected).abs() < 1e-6);
        assert!((result.r_isothermal_planes_si - expected).abs() < 1e-6);
        assert_eq!(result.r_parallel_path_si, result.r_isothermal_planes_si);
    }

    #[test]
    fn test_idempotence() {
        let assembly = Assembly::default()
            .with_layer(Layer::homogeneous(50.0, insulation()))
            .with_layer(
                Layer::new(89.0)
                    .with_segment(Segment::new(363.0, insulation()))
                    .with_segment(Segment::new(38.0, Material::new("SPF Stud", 0.14))),
            );
        let a = calculate(&assembly).unwrap();
        let b = calculate(&assembly).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_framed_layer_methods_bracket_each_other() {
        // Wood-framed cavity: parallel-path R >= isothermal-planes R
        let assembly = Assembly::default()
            .with_layer(Layer::homogeneous(12.7, Material::new("Gypsum", 0.16)))
            .with_layer(
                Layer::new(89.0)
                    .with_segment(Segment::new(363.0, Material::new("Batt", 0.043)))
                    .with_segment(Segment::new(38.0, Material::new("SPF Stud", 0.14))),
            )
            .with_layer(Layer::homogeneous(11.0, Material::new("OSB", 0.13)));
        let result = calculate(&assembly).unwrap();

        assert!(result.is_valid);
        assert!(result.r_parallel_path_si >= result.r_isothermal_planes_si);
        assert!(result.r_effective_si <= result.r_parallel_path_si);
        assert!(result.r_effective_si >= result.r_isothermal_planes_si);
    }

    #[test]
    fn test_framed_layer_hand_check() {
        // Single framed layer, hand-computed:
        //   cavity: 90% at k=0.04, stud: 10% at k=0.12, 100mm thick
        //   R_cavity = 2.5, R_stud = 0.8333
        //   parallel-path (single layer): U = 0.9/2.5 + 0.1/0.8333 = 0.48 => R = 2.083333
        //   isothermal (same for one layer) = 2.083333
        let assembly = Assembly::default().with_layer(
            Layer::new(100.0)
                .with_segment(Segment::new(900.0, Material::new("Ins", 0.04)))
                .with_segment(Segment::new(100.0, Material::new("Stud", 0.12))),
        );
        let result = calculate(&assembly).unwrap();

        assert!((result.r_parallel_path_si - 2.083333).abs() < 1e-6);
        assert!((result.r_isothermal_planes_si - 2.083333).abs() < 1e-6);
    }

    #[test]
    fn test_two_framed_layers_differ_by_method() {
        // Two heterogeneous layers: 4 paths vs per-layer collapse.
        // Layer A: 100mm, 50/50 at k=0.04 / k=0.2 => R_a1=2.5, R_a2=0.5
        // Layer B: 50mm,  50/50 at k=0.05 / k=0.5 => R_b1=1.0, R_b2=0.1
        // Parallel-path U = .25(1/3.5 + 1/2.6 + 1/1.5 + 1/0.6) = 0.75044...
        // Isothermal: R_A = 1/(0.2/2.5+0.5/0.5... ) per formula
        let assembly = Assembly::default()
            .with_layer(
                Layer::new(100.0)
                    .with_segment(Segment::new(500.0, Material::new("A1", 0.04)))
                    .with_segment(Segment::new(500.0, Material::new("A2", 0.2))),
            )
            .with_layer(
                Layer::new(50.0)
                    .with_segment(Segment::new(500.0, Material::new("B1", 0.05)))
                    .with_segment(Segment::new(500.0, Material::new("B2", 0.5))),
            );
        let result = calculate(&assembly).unwrap();

        let u_pp = 0.25 * (1.0 / 3.5 + 1.0 / 2.6 + 1.0 / 1.5 + 1.0 / 0.6);
        let r_pp = 1.0 / u_pp;
        let r_a = 1.0 / (0.5 / 2.5 + 0.5 / 0.5);
        let r_b = 1.0 / (0.5 / 1.0 + 0.5 / 0.1);
        let r_iso = r_a + r_b;

        assert!((result.r_parallel_path_si - round6(r_pp)).abs() < 1e-9);
        assert!((result.r_isothermal_planes_si - round6(r_iso)).abs() < 1e-9);
        assert!((result.r_effective_si - round6((r_pp + r_iso) / 2.0)).abs() < 1e-6);
        assert!(result.r_parallel_path_si > result.r_isothermal_planes_si);
    }

    #[test]
    fn test_empty_assembly_is_invalid() {
        let result = calculate(&Assembly::default()).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.r_effective_si, 0.0);
        assert_eq!(result.u_effective_si, 0.0);
        assert!(result.warnings.iter().any(|w| w.contains("no layers")));
    }

    #[test]
    fn test_invalid_inputs_accumulate_warnings() {
        let assembly = Assembly::default()
            .with_layer(Layer::new(-10.0).with_segment(Segment::new(100.0, insulation())))
            .with_layer(Layer::new(50.0)) // no segments
            .with_layer(Layer::homogeneous(20.0, Material::new("Broken", 0.0)));
        let result = calculate(&assembly).unwrap();

        assert!(!result.is_valid);
        assert_eq!(result.r_parallel_path_si, 0.0);
        assert_eq!(result.r_isothermal_planes_si, 0.0);
        assert!(result.warnings.len() >= 3);
        assert!(result.warnings.iter().any(|w| w.contains("thickness")));
        assert!(result.warnings.iter().any(|w| w.contains("no segments")));
        assert!(result.warnings.iter().any(|w| w.contains("conductivity")));
    }

    #[test]
    fn test_missing_material_is_warning_not_error() {
        let mut assembly =
            Assembly::default().with_layer(Layer::homogeneous(100.0, insulation()));
        assembly.layers[0].segments[0].material = None;

        let result = calculate(&assembly).unwrap();
        assert!(!result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("material is missing")));
    }

    #[test]
    fn test_path_ceiling_invalidates() {
        // 5 layers x 5 segments = 3125 paths > ceiling of 100
        let mut assembly = Assembly::default();
        for _ in 0..5 {
            let mut layer = Layer::new(50.0);
            for _ in 0..5 {
                layer = layer.with_segment(Segment::new(100.0, insulation()));
            }
            assembly = assembly.with_layer(layer);
        }
        let options = AssemblyCalcOptions { max_paths: 100 };
        let result = calculate_with_options(&assembly, &options).unwrap();

        assert!(!result.is_valid);
        assert!(result.warnings.iter().any(|w| w.contains("ceiling")));

        // The default ceiling admits the same assembly
        let result = calculate(&assembly).unwrap();
        assert!(result.is_valid);
    }

    #[test]
    fn test_steel_stud_layer_reduces_effective_r() {
        // Same geometry, once with inert (wood-like) framing and once with
        // steel studs; the bridging correction must cost R
        let batt = Material::new("Fiberglass Batt", 0.043);
        let wood_framed = Assembly::default()
            .with_layer(Layer::homogeneous(11.0, Material::new("OSB", 0.13)))
            .with_layer(
                Layer::new(89.0)
                    .with_segment(Segment::new(364.6, batt.clone()))
                    .with_segment(Segment::new(41.3, Material::new("SPF Stud", 0.14))),
            )
            .with_layer(Layer::homogeneous(12.7, Material::new("Gypsum", 0.16)));

        let mut steel_framed = wood_framed.clone();
        steel_framed.layers[1].segments[1] =
            Segment::new(41.3, Material::new("Steel Stud", 45.0)).as_steel_stud(406.4);

        let wood = calculate(&wood_framed).unwrap();
        let steel = calculate(&steel_framed).unwrap();

        assert!(wood.is_valid);
        assert!(steel.is_valid);
        assert!(steel.r_effective_si < wood.r_effective_si);
        assert!(steel.r_effective_si > 0.0);
    }

    #[test]
    fn test_corrupt_steel_stud_layer_propagates_hard_error() {
        // Stud layer without a cavity insulation segment: corrupted data,
        // not a validation warning
        let assembly = Assembly::default().with_layer(
            Layer::new(89.0).with_segment(
                Segment::new(41.3, Material::new("Steel Stud", 45.0)).as_steel_stud(406.4),
            ),
        );
        let err = calculate(&assembly).unwrap_err();
        assert_eq!(err.error_code(), "DATA_INTEGRITY");
    }

    #[test]
    fn test_result_serialization_contract() {
        let assembly =
            Assembly::default().with_layer(Layer::homogeneous(200.0, insulation()));
        let result = calculate(&assembly).unwrap();
        let json = serde_json::to_string(&result).unwrap();

        assert!(json.contains("r_parallel_path_si"));
        assert!(json.contains("r_isothermal_planes_si"));
        assert!(json.contains("r_effective_si"));
        assert!(json.contains("u_effective_si"));
        assert!(json.contains("is_valid"));
        assert!(json.contains("warnings"));

        let roundtrip: ThermalResistanceResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, roundtrip);
    }
}
