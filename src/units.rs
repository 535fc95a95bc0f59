//! This module defines various unit types and their conversions.
use float_cmp::{ApproxEq, F64Margin};
use serde::{Deserialize, Deserializer, Serialize};
use std::iter::Sum;
use std::ops::{Div, Mul};
use strum::{Display, EnumString};

/// Represents a dimensionless quantity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
)]
pub struct Dimensionless(pub f64);

impl Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

impl ApproxEq for Dimensionless {
    type Margin = F64Margin;

    fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
        self.0.approx_eq(other.0, margin)
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Serialize,
            Deserialize,
            derive_more::Add,
            derive_more::Sub,
        )]
        pub struct $name(pub f64);

        impl $name {
            /// Create a new instance of the unit type from an f64 value.
            pub fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as an f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is finite and not negative
            pub fn is_finite_non_negative(self) -> bool {
                self.0.is_finite() && self.0 >= 0.0
            }

            /// The larger of two values
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl std::ops::AddAssign for $name {
            fn add_assign(&mut self, rhs: $name) {
                self.0 += rhs.0;
            }
        }

        impl std::ops::SubAssign for $name {
            fn sub_assign(&mut self, rhs: $name) {
                self.0 -= rhs.0;
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = $name>>(iter: I) -> $name {
                $name(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> Sum<&'a $name> for $name {
            fn sum<I: Iterator<Item = &'a $name>>(iter: I) -> $name {
                $name(iter.map(|x| x.0).sum())
            }
        }

        impl Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl Div<$name> for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }

        impl ApproxEq for $name {
            type Margin = F64Margin;

            fn approx_eq<M: Into<Self::Margin>>(self, other: Self, margin: M) -> bool {
                self.0.approx_eq(other.0, margin)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Energy);
unit_struct!(Population);
unit_struct!(Area);

// Derived quantities
unit_struct!(PopulationDensity);
unit_struct!(EnergyPerArea);

// Division rules
impl_div!(Population, Area, PopulationDensity);
impl_div!(Energy, Area, EnergyPerArea);

/// A unit of energy in which heat generation can be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display)]
#[strum(ascii_case_insensitive)]
pub enum EnergyUnit {
    /// Gigajoules
    #[strum(serialize = "GJ")]
    Gigajoule,
    /// Terajoules
    #[strum(serialize = "TJ")]
    Terajoule,
    /// Petajoules
    #[strum(serialize = "PJ")]
    Petajoule,
    /// Megawatt hours
    #[strum(serialize = "MWh")]
    MegawattHour,
    /// Gigawatt hours
    #[strum(serialize = "GWh")]
    GigawattHour,
    /// Terawatt hours
    #[strum(serialize = "TWh")]
    TerawattHour,
}

impl<'de> Deserialize<'de> for EnergyUnit {
    fn deserialize<D: Deserializer<'de>>(deserialiser: D) -> Result<Self, D::Error> {
        let unit = String::deserialize(deserialiser)?;
        unit.parse()
            .map_err(|_| serde::de::Error::custom(format!("Unknown energy unit: {unit}")))
    }
}

impl EnergyUnit {
    /// The number of joules in one of this unit
    fn joules(self) -> f64 {
        match self {
            Self::Gigajoule => 1e9,
            Self::Terajoule => 1e12,
            Self::Petajoule => 1e15,
            Self::MegawattHour => 3.6e9,
            Self::GigawattHour => 3.6e12,
            Self::TerawattHour => 3.6e15,
        }
    }

    /// The factor by which a value in this unit must be multiplied to express it in `other`
    pub fn conversion_factor(self, other: EnergyUnit) -> Dimensionless {
        if self == other {
            return Dimensionless(1.0);
        }

        Dimensionless(self.joules() / other.joules())
    }

    /// Express `value`, given in this unit, in `other`
    pub fn convert(self, value: Energy, other: EnergyUnit) -> Energy {
        value * self.conversion_factor(other)
    }
}
