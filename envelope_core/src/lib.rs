//! # envelope_core - Building-Envelope Thermal Performance Engine
//!
//! `envelope_core` computes the thermal performance of building-envelope
//! components: effective R-values of multi-layer opaque assemblies (ASHRAE
//! Parallel-Path and Isothermal-Planes methods, averaged per the
//! Passive-House convention, with steel-stud bridging correction) and
//! window/door U-values per ISO 10077-1:2006.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: calculators are pure functions of immutable input
//!   structures; the only shared state is the bounded result cache
//! - **JSON-First**: all inputs and outputs implement Serialize/Deserialize
//!   with stable field names
//! - **Warnings over errors**: problems in user-editable data invalidate the
//!   result and surface as warnings; hard errors are reserved for corrupted
//!   persisted data
//!
//! ## Quick Start
//!
//! ```rust
//! use envelope_core::model::{Assembly, Layer, Material};
//! use envelope_core::calculations::assembly_r;
//!
//! let wall = Assembly::default()
//!     .with_layer(Layer::homogeneous(200.0, Material::new("Mineral Wool", 0.0389415)));
//!
//! let result = assembly_r::calculate(&wall).unwrap();
//! assert!(result.is_valid);
//! println!("R = {} m²K/W", result.r_effective_si);
//! ```
//!
//! ## Modules
//!
//! - [`model`] - read-only assembly/aperture data structures
//! - [`calculations`] - the R-value, U-value and steel-stud calculators
//! - [`cache`] - content-addressable memoization layer
//! - [`units`] - type-safe unit wrappers
//! - [`errors`] - structured error types

pub mod cache;
pub mod calculations;
pub mod errors;
pub mod model;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use cache::{cached_aperture_u_value, cached_assembly_r_value, CacheConfig, ContentAddressableCache};
pub use calculations::{ThermalResistanceResult, WindowUValueResult};
pub use errors::{ThermalError, ThermalResult};
pub use model::{Aperture, Assembly};
