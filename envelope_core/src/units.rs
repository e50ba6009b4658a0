//! # Unit Types
//!
//! Type-safe wrappers for thermal engineering units. These provide
//! compile-time safety against unit confusion while remaining lightweight
//! (just f64 wrappers).
//!
//! ## Design Philosophy
//!
//! We use simple newtype wrappers rather than a full units library because:
//! - Envelope calculations use a small, fixed set of units
//! - We want JSON serialization to be clean (just numbers)
//! - Minimal runtime overhead
//!
//! ## SI Units (Primary)
//!
//! Results are reported in SI, matching ASHRAE Fundamentals (SI edition) and
//! ISO 10077-1:
//! - Length: millimeters (mm) for stored geometry, meters (m) for calculation
//! - Conductivity: watts per meter-kelvin (W/mK)
//! - Transmittance (U): watts per square-meter-kelvin (W/m²K)
//! - Resistance (R): square-meter-kelvin per watt (m²K/W)
//! - Linear transmittance (Ψ): watts per meter-kelvin (W/mK)
//!
//! The steel-stud bridging correlation (ASHRAE/AISI) is tabulated in US
//! customary units, so imperial R/U wrappers and conversions exist for that
//! path only.
//!
//! ## Example
//!
//! ```rust
//! use envelope_core::units::{Millimeters, Meters, RValueSi, RValueImperial};
//!
//! let thickness = Millimeters(200.0);
//! let thickness_m: Meters = thickness.into();
//! assert_eq!(thickness_m.0, 0.2);
//!
//! let r = RValueSi(3.5);
//! let r_imp: RValueImperial = r.into();
//! assert!((r_imp.0 - 19.87).abs() < 0.01);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

/// Conversion factor between SI and imperial thermal resistance:
/// 1 m²K/W = 5.678263337 hr·ft²·°F/Btu.
///
/// The same factor converts imperial U (Btu/hr·ft²·°F) to SI U (W/m²K).
pub const R_IMPERIAL_PER_SI: f64 = 5.678263337;

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimeters (stored geometry)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in meters (calculation space)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

/// Length in inches (steel-stud correlation only)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl From<Millimeters> for Inches {
    fn from(mm: Millimeters) -> Self {
        Inches(mm.0 / MM_PER_INCH)
    }
}

impl From<Inches> for Millimeters {
    fn from(inches: Inches) -> Self {
        Millimeters(inches.0 * MM_PER_INCH)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SquareMeters(pub f64);

// ============================================================================
// Conductivity / Linear Transmittance
// ============================================================================

/// Thermal conductivity in W/mK
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WattsPerMeterKelvin(pub f64);

/// Linear thermal transmittance Ψ in W/mK (glazing-spacer edge loss)
///
/// Dimensionally identical to conductivity but semantically distinct;
/// keeping them separate prevents a spacer Ψ from being fed into a
/// thickness/conductivity resistance formula.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PsiValue(pub f64);

// ============================================================================
// Transmittance (U) Units
// ============================================================================

/// Thermal transmittance in W/m²K (SI)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UValueSi(pub f64);

/// Thermal transmittance in Btu/hr·ft²·°F (imperial)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UValueImperial(pub f64);

impl From<UValueImperial> for UValueSi {
    fn from(u: UValueImperial) -> Self {
        UValueSi(u.0 * R_IMPERIAL_PER_SI)
    }
}

impl From<UValueSi> for UValueImperial {
    fn from(u: UValueSi) -> Self {
        UValueImperial(u.0 / R_IMPERIAL_PER_SI)
    }
}

// ============================================================================
// Resistance (R) Units
// ============================================================================

/// Thermal resistance in m²K/W (SI)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RValueSi(pub f64);

/// Thermal resistance in hr·ft²·°F/Btu (imperial)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RValueImperial(pub f64);

impl From<RValueSi> for RValueImperial {
    fn from(r: RValueSi) -> Self {
        RValueImperial(r.0 * R_IMPERIAL_PER_SI)
    }
}

impl From<RValueImperial> for RValueSi {
    fn from(r: RValueImperial) -> Self {
        RValueSi(r.0 / R_IMPERIAL_PER_SI)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Millimeters);
impl_arithmetic!(Meters);
impl_arithmetic!(Inches);
impl_arithmetic!(SquareMeters);
impl_arithmetic!(WattsPerMeterKelvin);
impl_arithmetic!(PsiValue);
impl_arithmetic!(UValueSi);
impl_arithmetic!(UValueImperial);
impl_arithmetic!(RValueSi);
impl_arithmetic!(RValueImperial);
