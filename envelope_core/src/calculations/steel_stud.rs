//! # Steel-Stud Thermal Bridging Correction
//!
//! Cold-formed steel studs short-circuit an insulated cavity: the ASHRAE
//! parallel-path/isothermal-planes averaging badly overstates the R-value of
//! a steel-framed layer if the stud segment is treated like wood. The
//! standard remedy is to collapse the stud-and-cavity layer into a single
//! homogeneous layer with an *equivalent conductivity* derived from the
//! parallel-heat-flow correlation, then run the usual methods.
//!
//! The correlation works in US customary units (the form in which it is
//! published): fixed air films R_se = 0.17 / R_si = 0.68, adjacent layer
//! R-values in hr·ft²·°F/Btu, stud geometry in inches. The shared series
//! resistance (air films plus adjacent layers) is then backed out of the
//! effective imperial U-factor, leaving the cavity-only equivalent
//! resistance; the equivalent conductivity is `cavity_depth_m / R_equiv_si`.
//! The films and adjacent layers stay in the assembly and are summed there.
//!
//! Invariant: the equivalent conductivity always exceeds the raw cavity
//! insulation conductivity — steel bridges heat, it never insulates.
//!
//! ## Example
//!
//! ```rust
//! use envelope_core::calculations::steel_stud::{
//!     correct, SteelStudCorrectionInput, StudSpacing, StudGauge,
//! };
//! use envelope_core::units::RValueImperial;
//!
//! let input = SteelStudCorrectionInput::new(0.043, 89.0)
//!     .with_spacing(StudSpacing::S406)
//!     .with_gauge(StudGauge::G20)
//!     .with_exterior_sheathing(RValueImperial(0.62))
//!     .with_interior_sheathing(RValueImperial(0.45));
//!
//! let correction = correct(&input).unwrap();
//! assert!(correction.equivalent_conductivity_w_mk.0 > 0.043);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ThermalError, ThermalResult};
use crate::model::{Assembly, Layer, Material, Segment};
use crate::units::{
    Inches, Meters, Millimeters, RValueImperial, RValueSi, UValueImperial, UValueSi,
    WattsPerMeterKelvin, R_IMPERIAL_PER_SI,
};

/// Exterior air-film resistance (hr·ft²·°F/Btu), ASHRAE winter design value.
pub const R_SE_IMPERIAL: f64 = 0.17;

/// Interior air-film resistance (hr·ft²·°F/Btu), still air, vertical surface.
pub const R_SI_IMPERIAL: f64 = 0.68;

/// Conductivity of cold-formed steel framing (W/mK).
pub const STEEL_CONDUCTIVITY_W_MK: f64 = 45.0;

/// Converts W/mK to Btu·in/(hr·ft²·°F).
const BTU_IN_PER_W_MK: f64 = 39.3700787 / R_IMPERIAL_PER_SI;

/// Default stud flange width: 1-5/8" (41.3 mm), the common C-stud flange.
pub const DEFAULT_FLANGE_WIDTH_IN: f64 = 1.625;

// ============================================================================
// Standard stud geometry
// ============================================================================

/// Standard stud spacing on center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StudSpacing {
    /// 12" o.c. (305 mm)
    S305,
    /// 16" o.c. (406 mm)
    #[default]
    S406,
    /// 19.2" o.c. (488 mm)
    S488,
    /// 24" o.c. (610 mm)
    S610,
}

impl StudSpacing {
    pub const ALL: [StudSpacing; 4] = [
        StudSpacing::S305,
        StudSpacing::S406,
        StudSpacing::S488,
        StudSpacing::S610,
    ];

    /// Spacing in inches.
    pub fn inches(self) -> Inches {
        match self {
            StudSpacing::S305 => Inches(12.0),
            StudSpacing::S406 => Inches(16.0),
            StudSpacing::S488 => Inches(19.2),
            StudSpacing::S610 => Inches(24.0),
        }
    }

    /// Spacing in millimeters.
    pub fn millimeters(self) -> Millimeters {
        self.inches().into()
    }

    /// Snap a stored spacing to the nearest standard value.
    pub fn from_millimeters(spacing_mm: Millimeters) -> Self {
        StudSpacing::ALL
            .into_iter()
            .min_by(|a, b| {
                let da = (a.millimeters().0 - spacing_mm.0).abs();
                let db = (b.millimeters().0 - spacing_mm.0).abs();
                da.partial_cmp(&db).expect("spacing distances are finite")
            })
            .expect("ALL is non-empty")
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StudSpacing::S305 => "12\" o.c.",
            StudSpacing::S406 => "16\" o.c.",
            StudSpacing::S488 => "19.2\" o.c.",
            StudSpacing::S610 => "24\" o.c.",
        }
    }
}

/// Standard cold-formed steel gauge (design web thickness).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StudGauge {
    /// 25 gauge (0.0188")
    G25,
    /// 22 gauge (0.0283")
    G22,
    /// 20 gauge (0.0346")
    #[default]
    G20,
    /// 18 gauge (0.0451")
    G18,
    /// 16 gauge (0.0566")
    G16,
    /// 14 gauge (0.0713")
    G14,
}

impl StudGauge {
    pub const ALL: [StudGauge; 6] = [
        StudGauge::G25,
        StudGauge::G22,
        StudGauge::G20,
        StudGauge::G18,
        StudGauge::G16,
        StudGauge::G14,
    ];

    /// Design web thickness in inches.
    pub fn design_thickness_in(self) -> Inches {
        match self {
            StudGauge::G25 => Inches(0.0188),
            StudGauge::G22 => Inches(0.0283),
            StudGauge::G20 => Inches(0.0346),
            StudGauge::G18 => Inches(0.0451),
            StudGauge::G16 => Inches(0.0566),
            StudGauge::G14 => Inches(0.0713),
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            StudGauge::G25 => "25 ga",
            StudGauge::G22 => "22 ga",
            StudGauge::G20 => "20 ga",
            StudGauge::G18 => "18 ga",
            StudGauge::G16 => "16 ga",
            StudGauge::G14 => "14 ga",
        }
    }
}

// ============================================================================
// Correction input / output
// ============================================================================

/// Inputs to the steel-stud correction.
///
/// Adjacent-layer R-values are imperial because the correlation is. When the
/// correction is driven from an [`Assembly`] (see [`apply_corrections`]) the
/// buckets are filled by the layer-grouping state machine; a caller invoking
/// the corrector directly supplies whichever buckets exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteelStudCorrectionInput {
    /// Raw cavity insulation conductivity (W/mK, > 0)
    pub cavity_conductivity_w_mk: WattsPerMeterKelvin,

    /// Cavity depth = stud layer thickness (mm, > 0)
    pub cavity_depth_mm: Millimeters,

    /// Stud spacing on center
    pub spacing: StudSpacing,

    /// Stud gauge (web thickness)
    pub gauge: StudGauge,

    /// Stud flange width (in)
    pub flange_width_in: Inches,

    /// Exterior cladding R (hr·ft²·°F/Btu)
    pub r_exterior_cladding: RValueImperial,

    /// Exterior continuous insulation R (hr·ft²·°F/Btu)
    pub r_exterior_insulation: RValueImperial,

    /// Exterior sheathing R (hr·ft²·°F/Btu)
    pub r_exterior_sheathing: RValueImperial,

    /// Interior sheathing R (hr·ft²·°F/Btu)
    pub r_interior_sheathing: RValueImperial,
}

impl SteelStudCorrectionInput {
    /// Bare stud wall at the default spacing/gauge/flange, no adjacent layers.
    pub fn new(cavity_conductivity_w_mk: f64, cavity_depth_mm: f64) -> Self {
        SteelStudCorrectionInput {
            cavity_conductivity_w_mk: WattsPerMeterKelvin(cavity_conductivity_w_mk),
            cavity_depth_mm: Millimeters(cavity_depth_mm),
            spacing: StudSpacing::default(),
            gauge: StudGauge::default(),
            flange_width_in: Inches(DEFAULT_FLANGE_WIDTH_IN),
            r_exterior_cladding: RValueImperial(0.0),
            r_exterior_insulation: RValueImperial(0.0),
            r_exterior_sheathing: RValueImperial(0.0),
            r_interior_sheathing: RValueImperial(0.0),
        }
    }

    pub fn with_spacing(mut self, spacing: StudSpacing) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_gauge(mut self, gauge: StudGauge) -> Self {
        self.gauge = gauge;
        self
    }

    pub fn with_exterior_cladding(mut self, r: RValueImperial) -> Self {
        self.r_exterior_cladding = r;
        self
    }

    pub fn with_exterior_insulation(mut self, r: RValueImperial) -> Self {
        self.r_exterior_insulation = r;
        self
    }

    pub fn with_exterior_sheathing(mut self, r: RValueImperial) -> Self {
        self.r_exterior_sheathing = r;
        self
    }

    pub fn with_interior_sheathing(mut self, r: RValueImperial) -> Self {
        self.r_interior_sheathing = r;
        self
    }
}

/// Output of the steel-stud correction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteelStudCorrection {
    /// Effective whole-path U-factor (Btu/hr·ft²·°F)
    pub u_imperial: UValueImperial,

    /// Effective whole-path U-factor (W/m²K)
    pub u_si: UValueSi,

    /// Cavity-only equivalent conductivity (W/mK); air films and adjacent
    /// layers are excluded, they remain in the assembly
    pub equivalent_conductivity_w_mk: WattsPerMeterKelvin,
}

/// Apply the parallel-heat-flow correlation: a steel path through the stud
/// region in parallel with a clear cavity-insulation path, both in series
/// with the air films and adjacent layers.
///
/// # Errors
///
/// `ThermalError::DataIntegrity` when the cavity conductivity or depth is
/// non-positive — this indicates corrupted persisted data, not a
/// user-editable validation issue.
pub fn correct(input: &SteelStudCorrectionInput) -> ThermalResult<SteelStudCorrection> {
    let k_ins = input.cavity_conductivity_w_mk.0;
    if k_ins <= 0.0 {
        return Err(ThermalError::data_integrity(
            "steel stud cavity",
            "cavity_conductivity_w_mk",
            format!("cavity insulation conductivity must be positive (got {k_ins})"),
        ));
    }
    let depth_mm = input.cavity_depth_mm.0;
    if depth_mm <= 0.0 {
        return Err(ThermalError::data_integrity(
            "steel stud cavity",
            "cavity_depth_mm",
            format!("cavity depth must be positive (got {depth_mm})"),
        ));
    }

    let depth_in = Inches::from(input.cavity_depth_mm).0;
    let depth_m = Meters::from(input.cavity_depth_mm).0;

    let k_ins_imp = k_ins * BTU_IN_PER_W_MK;
    let k_steel_imp = STEEL_CONDUCTIVITY_W_MK * BTU_IN_PER_W_MK;

    // Everything in series outside the cavity, shared by both paths
    let r_other = R_SE_IMPERIAL
        + input.r_exterior_cladding.0
        + input.r_exterior_insulation.0
        + input.r_exterior_sheathing.0
        + input.r_interior_sheathing.0
        + R_SI_IMPERIAL;

    // Within the stud region the web and the insulation conduct in parallel,
    // blended by the web-to-flange area ratio
    let flange_in = input.flange_width_in.0;
    let web_fraction = input.gauge.design_thickness_in().0 / flange_in;
    let k_region_imp = web_fraction * k_steel_imp + (1.0 - web_fraction) * k_ins_imp;

    let r_cavity_path = r_other + depth_in / k_ins_imp;
    let r_steel_path = r_other + depth_in / k_region_imp;

    let steel_fraction = flange_in / input.spacing.inches().0;
    let u_imperial = UValueImperial(
        steel_fraction / r_steel_path + (1.0 - steel_fraction) / r_cavity_path,
    );

    // Back out the shared series resistance: the films and adjacent layers
    // remain in the assembly and are summed there, not baked into the cavity
    let r_equiv_cavity = RValueSi::from(RValueImperial(1.0 / u_imperial.0 - r_other));
    let equivalent_conductivity = depth_m / r_equiv_cavity.0;

    Ok(SteelStudCorrection {
        u_imperial,
        u_si: UValueSi::from(u_imperial),
        equivalent_conductivity_w_mk: WattsPerMeterKelvin(equivalent_conductivity),
    })
}

// ============================================================================
// Layer grouping over an assembly
// ============================================================================

/// State machine position relative to the stud cavity while scanning the
/// ordered (exterior → interior) layer sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupingState {
    BeforeCavity,
    AtCavity,
    AfterCavity,
}

/// Adjacent-layer R-values bucketed for the correlation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct AdjacentLayers {
    cladding: f64,
    exterior_insulation: f64,
    exterior_sheathing: f64,
    interior_sheathing: f64,
}

/// Per-layer isothermal-planes resistance (SI), or 0.0 when the layer has
/// data problems — those surface later through the main validation pass.
fn layer_r_si(layer: &Layer) -> RValueSi {
    if layer.thickness_mm.0 <= 0.0 || layer.segments.is_empty() {
        return RValueSi(0.0);
    }
    let thickness_m = Meters::from(layer.thickness_mm).0;
    let total_width = layer.total_width_mm().0;
    if total_width <= 0.0 {
        return RValueSi(0.0);
    }
    let mut conductance = 0.0;
    for segment in &layer.segments {
        let k = match segment.conductivity() {
            Some(k) if k.0 > 0.0 => k.0,
            _ => return RValueSi(0.0),
        };
        if segment.width_mm.0 <= 0.0 {
            return RValueSi(0.0);
        }
        conductance += (segment.width_mm.0 / total_width) / (thickness_m / k);
    }
    RValueSi(1.0 / conductance)
}

/// Bucket the layers around the cavity at `cavity_index`.
///
/// Exterior side: continuous-insulation layers go to the insulation bucket;
/// non-CI layers before any insulation are cladding, after it sheathing.
/// Interior side: everything is interior sheathing.
fn group_adjacent_layers(assembly: &Assembly, cavity_index: usize) -> AdjacentLayers {
    let mut buckets = AdjacentLayers::default();
    let mut state = GroupingState::BeforeCavity;
    let mut insulation_seen = false;

    for (i, layer) in assembly.layers.iter().enumerate() {
        if i == cavity_index {
            state = GroupingState::AtCavity;
            continue;
        }
        if state == GroupingState::AtCavity {
            state = GroupingState::AfterCavity;
        }

        let r_imp = RValueImperial::from(layer_r_si(layer)).0;
        match state {
            GroupingState::BeforeCavity => {
                if layer.is_continuous_insulation() {
                    buckets.exterior_insulation += r_imp;
                    insulation_seen = true;
                } else if insulation_seen {
                    buckets.exterior_sheathing += r_imp;
                } else {
                    buckets.cladding += r_imp;
                }
            }
            GroupingState::AtCavity => unreachable!("cavity handled above"),
            GroupingState::AfterCavity => buckets.interior_sheathing += r_imp,
        }
    }

    buckets
}

/// Replace every steel-stud layer of the assembly with a single homogeneous
/// segment carrying the corrected equivalent conductivity.
///
/// The returned assembly is a fresh value; the input is never mutated.
///
/// # Errors
///
/// `ThermalError::DataIntegrity` when a stud layer has no resolvable cavity
/// insulation segment, or the cavity conductivity/depth is non-positive.
pub fn apply_corrections(assembly: &Assembly) -> ThermalResult<Assembly> {
    let mut corrected = assembly.clone();

    for index in 0..assembly.layers.len() {
        let layer = &assembly.layers[index];
        if !layer.has_steel_stud() {
            continue;
        }

        let cavity = layer
            .segments
            .iter()
            .find(|s| !s.is_steel_stud && s.material.is_some())
            .and_then(|s| s.material.as_ref())
            .ok_or_else(|| {
                ThermalError::data_integrity(
                    "steel stud cavity",
                    "material",
                    format!(
                        "layer {} has steel studs but no cavity insulation segment",
                        index + 1
                    ),
                )
            })?;

        let spacing = layer
            .segments
            .iter()
            .find(|s| s.is_steel_stud)
            .and_then(|s| s.steel_stud_spacing_mm)
            .map(StudSpacing::from_millimeters)
            .unwrap_or_default();

        let buckets = group_adjacent_layers(assembly, index);
        let input = SteelStudCorrectionInput {
            cavity_conductivity_w_mk: cavity.conductivity_w_mk,
            cavity_depth_mm: layer.thickness_mm,
            spacing,
            gauge: StudGauge::default(),
            flange_width_in: Inches(DEFAULT_FLANGE_WIDTH_IN),
            r_exterior_cladding: RValueImperial(buckets.cladding),
            r_exterior_insulation: RValueImperial(buckets.exterior_insulation),
            r_exterior_sheathing: RValueImperial(buckets.exterior_sheathing),
            r_interior_sheathing: RValueImperial(buckets.interior_sheathing),
        };
        let correction = correct(&input)?;

        corrected.layers[index].segments = vec![Segment::new(
            1000.0,
            Material::new(
                format!("{} + steel studs (equivalent)", cavity.name),
                correction.equivalent_conductivity_w_mk.0,
            ),
        )];
    }

    Ok(corrected)
}
