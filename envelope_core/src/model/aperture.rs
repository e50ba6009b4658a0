//! # Aperture Data Model
//!
//! Read-only projections of a window/door aperture: a rectangular grid of
//! row heights and column widths, with elements (sashes, fixed lites, door
//! leaves) spanning grid cells. Each element carries four frame sides and a
//! glazing reference.
//!
//! Frame sides are an explicit [`FrameSides`] record — one named field per
//! side — rather than a side-name-keyed map, so a missing side is a typed
//! `None` and the JSON contract is fixed at compile time.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "row_heights_mm": [1480.0],
//!   "column_widths_mm": [1230.0],
//!   "elements": [
//!     {
//!       "id": "7f1c3a92-5a3b-4a5e-9a5d-0c2f6f3a1b42",
//!       "row_number": 0,
//!       "column_number": 0,
//!       "row_span": 1,
//!       "col_span": 1,
//!       "frame_top":    { "width_mm": 100.0, "u_value_w_m2k": 1.2, "psi_g_w_mk": 0.04 },
//!       "frame_right":  { "width_mm": 100.0, "u_value_w_m2k": 1.2, "psi_g_w_mk": 0.04 },
//!       "frame_bottom": { "width_mm": 100.0, "u_value_w_m2k": 1.2, "psi_g_w_mk": 0.04 },
//!       "frame_left":   { "width_mm": 100.0, "u_value_w_m2k": 1.2, "psi_g_w_mk": 0.04 },
//!       "glazing": { "u_value_w_m2k": 0.7 }
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::units::{Millimeters, PsiValue, UValueSi};

/// Glazing unit (center-of-glass performance).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glazing {
    /// Glazing thermal transmittance U_g (W/m²K)
    pub u_value_w_m2k: UValueSi,
}

impl Glazing {
    pub fn new(u_value_w_m2k: f64) -> Self {
        Glazing {
            u_value_w_m2k: UValueSi(u_value_w_m2k),
        }
    }
}

/// One frame side of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSide {
    /// Projected frame width (mm)
    pub width_mm: Millimeters,

    /// Frame thermal transmittance U_f (W/m²K)
    pub u_value_w_m2k: UValueSi,

    /// Glazing-spacer linear transmittance Ψ_g (W/mK)
    pub psi_g_w_mk: PsiValue,
}

impl FrameSide {
    pub fn new(width_mm: f64, u_value_w_m2k: f64, psi_g_w_mk: f64) -> Self {
        FrameSide {
            width_mm: Millimeters(width_mm),
            u_value_w_m2k: UValueSi(u_value_w_m2k),
            psi_g_w_mk: PsiValue(psi_g_w_mk),
        }
    }
}

/// A side of an element's frame, in clockwise order from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All four sides, in the canonical (hashing and reporting) order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// The two sides meeting this one at its corners.
    pub fn adjacent(self) -> [Side; 2] {
        match self {
            Side::Top | Side::Bottom => [Side::Left, Side::Right],
            Side::Left | Side::Right => [Side::Top, Side::Bottom],
        }
    }

    /// True for top/bottom (the sides running along the element width).
    pub fn is_horizontal(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

/// The four frame sides of an element as an explicit record.
///
/// `None` models an unresolved frame reference; the calculator treats any
/// missing side as invalidating the whole aperture result.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameSides {
    #[serde(rename = "frame_top")]
    pub top: Option<FrameSide>,
    #[serde(rename = "frame_right")]
    pub right: Option<FrameSide>,
    #[serde(rename = "frame_bottom")]
    pub bottom: Option<FrameSide>,
    #[serde(rename = "frame_left")]
    pub left: Option<FrameSide>,
}

impl FrameSides {
    /// Same frame on all four sides.
    pub fn uniform(side: FrameSide) -> Self {
        FrameSides {
            top: Some(side),
            right: Some(side),
            bottom: Some(side),
            left: Some(side),
        }
    }

    pub fn get(&self, side: Side) -> Option<&FrameSide> {
        match side {
            Side::Top => self.top.as_ref(),
            Side::Right => self.right.as_ref(),
            Side::Bottom => self.bottom.as_ref(),
            Side::Left => self.left.as_ref(),
        }
    }

    /// True when all four sides are resolved.
    pub fn is_complete(&self) -> bool {
        Side::ALL.iter().all(|&s| self.get(s).is_some())
    }

    /// Sides that are missing, for warning messages.
    pub fn missing_sides(&self) -> Vec<Side> {
        Side::ALL
            .iter()
            .copied()
            .filter(|&s| self.get(s).is_none())
            .collect()
    }
}

/// One element of an aperture, spanning a rectangle of grid cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApertureElement {
    /// Stable element identifier (part of the cache key)
    pub id: Uuid,

    /// Zero-indexed start row
    pub row_number: usize,

    /// Zero-indexed start column
    pub column_number: usize,

    /// Rows spanned (≥ 1)
    pub row_span: usize,

    /// Columns spanned (≥ 1)
    pub col_span: usize,

    /// The four frame sides (serialized flat as frame_top/right/bottom/left)
    #[serde(flatten)]
    pub frames: FrameSides,

    /// Glazing reference; `None` models an unresolved reference
    pub glazing: Option<Glazing>,
}

impl ApertureElement {
    /// Create a single-cell element at (row, column).
    pub fn new(row_number: usize, column_number: usize) -> Self {
        ApertureElement {
            id: Uuid::new_v4(),
            row_number,
            column_number,
            row_span: 1,
            col_span: 1,
            frames: FrameSides::default(),
            glazing: None,
        }
    }

    pub fn with_span(mut self, row_span: usize, col_span: usize) -> Self {
        self.row_span = row_span;
        self.col_span = col_span;
        self
    }

    pub fn with_frames(mut self, frames: FrameSides) -> Self {
        self.frames = frames;
        self
    }

    pub fn with_glazing(mut self, glazing: Glazing) -> Self {
        self.glazing = Some(glazing);
        self
    }
}

/// A window/door aperture: grid dimensions plus elements.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Aperture {
    /// Row heights top to bottom (mm, non-empty)
    pub row_heights_mm: Vec<Millimeters>,

    /// Column widths left to right (mm, non-empty)
    pub column_widths_mm: Vec<Millimeters>,

    /// Elements placed on the grid
    pub elements: Vec<ApertureElement>,
}

impl Aperture {
    pub fn new(row_heights_mm: Vec<f64>, column_widths_mm: Vec<f64>) -> Self {
        Aperture {
            row_heights_mm: row_heights_mm.into_iter().map(Millimeters).collect(),
            column_widths_mm: column_widths_mm.into_iter().map(Millimeters).collect(),
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: ApertureElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Content-addressed cache key for this aperture.
    ///
    /// Digests the grid dimensions and, per element ordered by
    /// (row, column), its id, position, span, the (width, U, Ψ) triple of
    /// all four sides, and the glazing U. Any single changed numeric input
    /// changes the key.
    pub fn cache_key(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"aperture:v1");

        hasher.update((self.row_heights_mm.len() as u64).to_le_bytes());
        for h in &self.row_heights_mm {
            hasher.update(h.0.to_bits().to_le_bytes());
        }
        hasher.update((self.column_widths_mm.len() as u64).to_le_bytes());
        for w in &self.column_widths_mm {
            hasher.update(w.0.to_bits().to_le_bytes());
        }

        let mut ordered: Vec<&ApertureElement> = self.elements.iter().collect();
        ordered.sort_by_key(|e| (e.row_number, e.column_number));

        hasher.update((ordered.len() as u64).to_le_bytes());
        for element in ordered {
            hasher.update(element.id.as_bytes());
            hasher.update((element.row_number as u64).to_le_bytes());
            hasher.update((element.column_number as u64).to_le_bytes());
            hasher.update((element.row_span as u64).to_le_bytes());
            hasher.update((element.col_span as u64).to_le_bytes());
            for side in Side::ALL {
                match element.frames.get(side) {
                    Some(frame) => {
                        hasher.update([1u8]);
                        hasher.update(frame.width_mm.0.to_bits().to_le_bytes());
                        hasher.update(frame.u_value_w_m2k.0.to_bits().to_le_bytes());
                        hasher.update(frame.psi_g_w_mk.0.to_bits().to_le_bytes());
                    }
                    None => hasher.update([0u8]),
                }
            }
            match &element.glazing {
                Some(g) => {
                    hasher.update([1u8]);
                    hasher.update(g.u_value_w_m2k.0.to_bits().to_le_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
        crate::cache::short_key(&hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_lite() -> Aperture {
        Aperture::new(vec![1480.0], vec![1230.0]).with_element(
            ApertureElement::new(0, 0)
                .with_frames(FrameSides::uniform(FrameSide::new(100.0, 1.2, 0.04)))
                .with_glazing(Glazing::new(0.7)),
        )
    }

    #[test]
    fn test_side_adjacency() {
        assert_eq!(Side::Top.adjacent(), [Side::Left, Side::Right]);
        assert_eq!(Side::Left.adjacent(), [Side::Top, Side::Bottom]);
        assert!(Side::Top.is_horizontal());
        assert!(!Side::Right.is_horizontal());
    }

    #[test]
    fn test_frame_sides_completeness() {
        let complete = FrameSides::uniform(FrameSide::new(100.0, 1.2, 0.04));
        assert!(complete.is_complete());
        assert!(complete.missing_sides().is_empty());

        let mut partial = complete;
        partial.left = None;
        assert!(!partial.is_complete());
        assert_eq!(partial.missing_sides(), vec![Side::Left]);
    }

    #[test]
    fn test_frame_sides_serialize_flat() {
        let aperture = single_lite();
        let json = serde_json::to_string_pretty(&aperture).unwrap();
        assert!(json.contains("frame_top"));
        assert!(json.contains("frame_left"));
        // The internal record name must not leak into the wire format
        assert!(!json.contains("\"frames\""));

        let roundtrip: Aperture = serde_json::from_str(&json).unwrap();
        assert_eq!(aperture, roundtrip);
    }

    #[test]
    fn test_cache_key_stable_and_sensitive() {
        let a = single_lite();
        assert_eq!(a.cache_key(), a.cache_key());
        assert_eq!(a.cache_key().len(), 32);

        // One changed psi on one side changes the key
        let mut b = a.clone();
        if let Some(frame) = b.elements[0].frames.left.as_mut() {
            frame.psi_g_w_mk = PsiValue(0.05);
        }
        assert_ne!(a.cache_key(), b.cache_key());

        // A changed glazing U changes the key
        let mut c = a.clone();
        c.elements[0].glazing = Some(Glazing::new(0.8));
        assert_ne!(a.cache_key(), c.cache_key());
    }

    #[test]
    fn test_cache_key_element_order_canonical() {
        let frames = FrameSides::uniform(FrameSide::new(50.0, 1.5, 0.05));
        let e00 = ApertureElement::new(0, 0)
            .with_frames(frames)
            .with_glazing(Glazing::new(1.0));
        let e01 = ApertureElement::new(0, 1)
            .with_frames(frames)
            .with_glazing(Glazing::new(1.0));

        let ab = Aperture::new(vec![1000.0], vec![600.0, 600.0])
            .with_element(e00.clone())
            .with_element(e01.clone());
        let ba = Aperture::new(vec![1000.0], vec![600.0, 600.0])
            .with_element(e01)
            .with_element(e00);

        // Same elements in a different storage order hash identically
        assert_eq!(ab.cache_key(), ba.cache_key());
    }
}
