//! # Data Model
//!
//! Read-only projections of persisted envelope records, built fresh per
//! request by the (external) persistence layer and handed to the
//! calculators. They are never mutated in place: a change produces a new
//! value, which also gives it a new content-addressed cache key.
//!
//! - [`assembly`] - opaque wall/roof assemblies (layers, segments, materials)
//! - [`aperture`] - windows/doors (grid, elements, frames, glazing)

pub mod aperture;
pub mod assembly;

pub use aperture::{Aperture, ApertureElement, FrameSide, FrameSides, Glazing, Side};
pub use assembly::{Assembly, Layer, Material, Segment};
