//! # Thermal Calculations
//!
//! The calculation modules follow a common pattern:
//!
//! - a pure `calculate(input) -> *Result` function of the data model
//! - a `*Result` struct (JSON-serializable) whose field names form the
//!   compatibility contract with downstream consumers
//! - validation that accumulates warnings and invalidates the whole result
//!   rather than raising on user-editable data
//!
//! ## Available Calculations
//!
//! - [`assembly_r`] - effective R-value of opaque assemblies (ASHRAE
//!   Parallel-Path + Isothermal-Planes, Passive-House average)
//! - [`steel_stud`] - equivalent-conductivity correction for steel-framed
//!   cavity layers
//! - [`aperture_u`] - window/door U-value per ISO 10077-1:2006

pub mod aperture_u;
pub mod assembly_r;
pub mod steel_stud;

pub use aperture_u::{ElementUValue, WindowUValueResult};
pub use assembly_r::{AssemblyCalcOptions, ThermalResistanceResult};
pub use steel_stud::{SteelStudCorrection, SteelStudCorrectionInput, StudGauge, StudSpacing};
