//! # Aperture U-Value Calculation (ISO 10077-1:2006)
//!
//! Computes the effective thermal transmittance of a window/door aperture
//! from its grid, elements, frames and glazing:
//!
//! ```text
//! U_w = (Σ A_g·U_g + Σ A_f·U_f + Σ l_g·Ψ_g) / Σ A_w      (ISO 10077-1 Eq.1)
//! ```
//!
//! Frame areas use a 45° corner split: each corner rectangle is shared
//! equally between its two bounding sides, which guarantees the per-side
//! frame areas sum to the exact frame area — no gap or double count.
//!
//! The result is the *uninstalled* transmittance: the installation psi
//! (Ψ_install) between aperture and opaque wall is excluded by design and
//! the result is flagged `includes_psi_install: false`.
//!
//! Validation is all-or-nothing: a single unresolved frame or glazing
//! reference, an out-of-grid element, or a non-positive interior dimension
//! anywhere invalidates the entire aperture result.
//!
//! ## Example
//!
//! ```rust
//! use envelope_core::calculations::aperture_u::calculate;
//! use envelope_core::model::{Aperture, ApertureElement, FrameSide, FrameSides, Glazing};
//!
//! // ISO worked example: 1.23m x 1.48m, 100mm frame, U_f=1.2, Ψ=0.04, U_g=0.7
//! let aperture = Aperture::new(vec![1480.0], vec![1230.0]).with_element(
//!     ApertureElement::new(0, 0)
//!         .with_frames(FrameSides::uniform(FrameSide::new(100.0, 1.2, 0.04)))
//!         .with_glazing(Glazing::new(0.7)),
//! );
//!
//! let result = calculate(&aperture);
//! assert!(result.is_valid);
//! assert!((result.u_value_w_m2k - 0.9394).abs() < 1e-4);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Aperture, ApertureElement, Side};
use crate::units::{Meters, Millimeters, SquareMeters};

/// Name of the standard implemented, reported on every result.
pub const CALCULATION_METHOD: &str = "ISO 10077-1:2006";

/// Round to 6 decimals (areas, lengths, heat-loss terms).
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Round to 4 decimals (U-values).
fn round4(value: f64) -> f64 {
    (value * 1e4).round() / 1e4
}

/// Per-element breakdown of the aperture calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementUValue {
    /// Element identifier from the data model
    pub element_id: Uuid,

    /// Zero-indexed start row
    pub row_number: usize,

    /// Zero-indexed start column
    pub column_number: usize,

    /// Overall element width across its column span (m)
    pub width_m: f64,

    /// Overall element height across its row span (m)
    pub height_m: f64,

    /// Overall area width × height (m²)
    pub total_area_m2: f64,

    /// Visible glazing area inside the frame (m²)
    pub glazing_area_m2: f64,

    /// Frame area = total − glazing (m²)
    pub frame_area_m2: f64,

    /// Glazing perimeter = spacer length (m)
    pub glazing_perimeter_m: f64,

    /// Glazing heat loss A_g·U_g (W/K)
    pub heat_loss_glazing_w_k: f64,

    /// Frame heat loss Σ A_f,side·U_f,side (W/K)
    pub heat_loss_frame_w_k: f64,

    /// Spacer heat loss Σ l_g,side·Ψ_g,side (W/K)
    pub heat_loss_spacer_w_k: f64,

    /// Element transmittance ΣQ / A_total (W/m²K)
    pub u_value_w_m2k: f64,
}

/// Results from the aperture U-value calculation.
///
/// Field names and units form a compatibility contract with downstream
/// consumers. When any validation warning is present the numeric fields are
/// zeroed, the element breakdown is empty, and `is_valid` is false.
///
/// ## JSON Example
///
/// ```json
/// {
///   "u_value_w_m2k": 0.9394,
///   "total_area_m2": 1.8204,
///   "glazing_area_m2": 1.3184,
///   "frame_area_m2": 0.502,
///   "heat_loss_glazing_w_k": 0.92288,
///   "heat_loss_frame_w_k": 0.6024,
///   "heat_loss_spacer_w_k": 0.1848,
///   "is_valid": true,
///   "warnings": [],
///   "calculation_method": "ISO 10077-1:2006",
///   "includes_psi_install": false,
///   "element_calculations": [ "..." ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowUValueResult {
    /// Aggregate transmittance U_w = ΣQ / ΣA_total (W/m²K)
    pub u_value_w_m2k: f64,

    /// Sum of element areas (m²)
    pub total_area_m2: f64,

    /// Sum of glazing areas (m²)
    pub glazing_area_m2: f64,

    /// Sum of frame areas (m²)
    pub frame_area_m2: f64,

    /// Sum of glazing heat-loss terms (W/K)
    pub heat_loss_glazing_w_k: f64,

    /// Sum of frame heat-loss terms (W/K)
    pub heat_loss_frame_w_k: f64,

    /// Sum of spacer heat-loss terms (W/K)
    pub heat_loss_spacer_w_k: f64,

    /// False when any validation warning is present
    pub is_valid: bool,

    /// Accumulated validation warnings (empty when valid)
    pub warnings: Vec<String>,

    /// Always "ISO 10077-1:2006"
    pub calculation_method: String,

    /// Always false: Ψ_install is excluded by design (uninstalled U_w)
    pub includes_psi_install: bool,

    /// Per-element breakdown
    pub element_calculations: Vec<ElementUValue>,
}

impl WindowUValueResult {
    /// Invalid result: zeroed fields with the collected warnings surfaced.
    fn invalid(warnings: Vec<String>) -> Self {
        WindowUValueResult {
            u_value_w_m2k: 0.0,
            total_area_m2: 0.0,
            glazing_area_m2: 0.0,
            frame_area_m2: 0.0,
            heat_loss_glazing_w_k: 0.0,
            heat_loss_frame_w_k: 0.0,
            heat_loss_spacer_w_k: 0.0,
            is_valid: false,
            warnings,
            calculation_method: CALCULATION_METHOD.to_string(),
            includes_psi_install: false,
            element_calculations: Vec::new(),
        }
    }
}

/// Unrounded per-element quantities, kept raw until the output boundary.
struct ElementQuantities {
    width_m: Meters,
    height_m: Meters,
    total_area: SquareMeters,
    glazing_area: SquareMeters,
    frame_area: SquareMeters,
    glazing_perimeter: Meters,
    q_glazing: f64,
    q_frame: f64,
    q_spacer: f64,
}

/// Calculate the aperture's effective U-value.
///
/// Pure and infallible: all invalidity is reported through `warnings` and
/// `is_valid` on the result. Repeated calls on an unchanged aperture yield
/// bit-identical results.
pub fn calculate(aperture: &Aperture) -> WindowUValueResult {
    let mut warnings = Vec::new();

    if aperture.row_heights_mm.is_empty() {
        warnings.push("Aperture has no rows".to_string());
    }
    if aperture.column_widths_mm.is_empty() {
        warnings.push("Aperture has no columns".to_string());
    }
    for (i, h) in aperture.row_heights_mm.iter().enumerate() {
        if h.0 <= 0.0 {
            warnings.push(format!("Row {}: height must be positive (got {} mm)", i + 1, h.0));
        }
    }
    for (i, w) in aperture.column_widths_mm.iter().enumerate() {
        if w.0 <= 0.0 {
            warnings.push(format!(
                "Column {}: width must be positive (got {} mm)",
                i + 1,
                w.0
            ));
        }
    }

    // Collect every element's problems before bailing: the user sees all
    // of them at once, and a single problem anywhere invalidates the whole
    // aperture (all-or-nothing).
    let mut quantities = Vec::with_capacity(aperture.elements.len());
    for element in &aperture.elements {
        match element_quantities(aperture, element) {
            Ok(q) => quantities.push((element, q)),
            Err(mut element_warnings) => warnings.append(&mut element_warnings),
        }
    }

    if !warnings.is_empty() {
        return WindowUValueResult::invalid(warnings);
    }

    let mut total_area = 0.0;
    let mut glazing_area = 0.0;
    let mut frame_area = 0.0;
    let mut q_glazing = 0.0;
    let mut q_frame = 0.0;
    let mut q_spacer = 0.0;

    let element_calculations = quantities
        .iter()
        .map(|(element, q)| {
            total_area += q.total_area.0;
            glazing_area += q.glazing_area.0;
            frame_area += q.frame_area.0;
            q_glazing += q.q_glazing;
            q_frame += q.q_frame;
            q_spacer += q.q_spacer;

            ElementUValue {
                element_id: element.id,
                row_number: element.row_number,
                column_number: element.column_number,
                width_m: round6(q.width_m.0),
                height_m: round6(q.height_m.0),
                total_area_m2: round6(q.total_area.0),
                glazing_area_m2: round6(q.glazing_area.0),
                frame_area_m2: round6(q.frame_area.0),
                glazing_perimeter_m: round6(q.glazing_perimeter.0),
                heat_loss_glazing_w_k: round6(q.q_glazing),
                heat_loss_frame_w_k: round6(q.q_frame),
                heat_loss_spacer_w_k: round6(q.q_spacer),
                u_value_w_m2k: round4((q.q_glazing + q.q_frame + q.q_spacer) / q.total_area.0),
            }
        })
        .collect();

    let q_total = q_glazing + q_frame + q_spacer;
    let u_w = if total_area > 0.0 { q_total / total_area } else { 0.0 };

    WindowUValueResult {
        u_value_w_m2k: round4(u_w),
        total_area_m2: round6(total_area),
        glazing_area_m2: round6(glazing_area),
        frame_area_m2: round6(frame_area),
        heat_loss_glazing_w_k: round6(q_glazing),
        heat_loss_frame_w_k: round6(q_frame),
        heat_loss_spacer_w_k: round6(q_spacer),
        is_valid: true,
        warnings: Vec::new(),
        calculation_method: CALCULATION_METHOD.to_string(),
        includes_psi_install: false,
        element_calculations,
    }
}

/// Compute one element's unrounded quantities, or the list of validation
/// warnings that disqualify it.
fn element_quantities(
    aperture: &Aperture,
    element: &ApertureElement,
) -> Result<ElementQuantities, Vec<String>> {
    let mut warnings = Vec::new();
    let label = format!(
        "Element at ({}, {})",
        element.row_number, element.column_number
    );

    for side in element.frames.missing_sides() {
        warnings.push(format!("{label}: {} frame is missing", side.display_name()));
    }
    let glazing = match &element.glazing {
        Some(g) => Some(g),
        None => {
            warnings.push(format!("{label}: glazing is missing"));
            None
        }
    };

    if element.row_span == 0 || element.col_span == 0 {
        warnings.push(format!("{label}: row/column span must be at least 1"));
    }
    if element.row_number + element.row_span > aperture.row_heights_mm.len() {
        warnings.push(format!("{label}: rows extend beyond the grid"));
    }
    if element.column_number + element.col_span > aperture.column_widths_mm.len() {
        warnings.push(format!("{label}: columns extend beyond the grid"));
    }
    if !warnings.is_empty() {
        return Err(warnings);
    }

    let width_mm: f64 = aperture.column_widths_mm
        [element.column_number..element.column_number + element.col_span]
        .iter()
        .map(|w| w.0)
        .sum();
    let height_mm: f64 = aperture.row_heights_mm
        [element.row_number..element.row_number + element.row_span]
        .iter()
        .map(|h| h.0)
        .sum();
    let width_m = Meters::from(Millimeters(width_mm));
    let height_m = Meters::from(Millimeters(height_mm));

    // Validation above guarantees all four sides are present
    let frames = &element.frames;
    let top = frames.top.expect("validated");
    let right = frames.right.expect("validated");
    let bottom = frames.bottom.expect("validated");
    let left = frames.left.expect("validated");
    let glazing = glazing.expect("validated");

    let interior_width =
        width_m.0 - Meters::from(left.width_mm).0 - Meters::from(right.width_mm).0;
    let interior_height =
        height_m.0 - Meters::from(top.width_mm).0 - Meters::from(bottom.width_mm).0;
    if interior_width <= 0.0 || interior_height <= 0.0 {
        return Err(vec![format!(
            "{label}: frame widths leave no interior opening \
             (interior {:.4} m × {:.4} m)",
            interior_width, interior_height
        )]);
    }

    let total_area = SquareMeters(width_m.0 * height_m.0);
    let glazing_area = SquareMeters(interior_width * interior_height);
    let frame_area = total_area - glazing_area;
    let glazing_perimeter = Meters(2.0 * (interior_width + interior_height));

    let q_glazing = glazing_area.0 * glazing.u_value_w_m2k.0;

    // Frame: center strip plus half of each adjacent corner rectangle (45°
    // split), so the four side areas tile the frame exactly
    let mut q_frame = 0.0;
    let mut q_spacer = 0.0;
    for side in Side::ALL {
        let frame = frames.get(side).expect("validated");
        let side_width = Meters::from(frame.width_mm).0;
        let interior_length = if side.is_horizontal() {
            interior_width
        } else {
            interior_height
        };

        let center_area = side_width * interior_length;
        let corner_area: f64 = side
            .adjacent()
            .iter()
            .map(|&adjacent| {
                let adjacent_width =
                    Meters::from(frames.get(adjacent).expect("validated").width_mm).0;
                side_width * adjacent_width / 2.0
            })
            .sum();

        q_frame += (center_area + corner_area) * frame.u_value_w_m2k.0;
        q_spacer += interior_length * frame.psi_g_w_mk.0;
    }

    Ok(ElementQuantities {
        width_m,
        height_m,
        total_area,
        glazing_area,
        frame_area,
        glazing_perimeter,
        q_glazing,
        q_frame,
        q_spacer,
    })
}
