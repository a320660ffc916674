//! Price, percentage and weight newtypes shared by every analysis stage.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Sub};

/// A behavioral contract for anything that behaves like a price.
pub trait PriceLike {
    fn value(&self) -> f64;

    const MIN_EPSILON: f64 = 1e-12;

    fn is_positive(&self) -> bool {
        self.value() > Self::MIN_EPSILON
    }

    /// Relative distance to `reference`, in percent (0.5 = half a percent).
    fn percent_diff_from<R: PriceLike>(&self, reference: &R) -> f64 {
        if !reference.is_positive() {
            return f64::INFINITY;
        }

        (self.value() - reference.value()).abs() / reference.value() * 100.0
    }

    /// Formats a price with "Trader Precision" adaptive decimals.
    fn format_price(&self) -> String {
        let price = self.value();
        if price == 0.0 {
            return "0.00".to_string();
        }

        let abs_price = price.abs();

        if abs_price >= 1.0 {
            format!("{:.2}", price)
        } else if abs_price >= 0.01 {
            format!("{:.4}", price)
        } else {
            format!("{:.8}", price)
        }
    }
}

macro_rules! impl_into_price {
    ($from:ident) => {
        impl From<$from> for Price {
            fn from(p: $from) -> Self {
                Price::new(p.value())
            }
        }
    };
}

macro_rules! impl_from_price {
    ($to:ident) => {
        impl From<Price> for $to {
            fn from(p: Price) -> Self {
                $to::new(p.value())
            }
        }
    };
}

macro_rules! define_price_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
        #[serde(transparent)]
        pub struct $name(f64);

        impl From<f64> for $name {
            fn from(v: f64) -> Self {
                $name::new(v)
            }
        }

        impl $name {
            pub const fn new(val: f64) -> Self {
                // Absolute prices should not be negative
                let v = if val < 0.0 { 0.0 } else { val };
                Self(v)
            }
        }

        impl Add for $name {
            type Output = f64;

            fn add(self, rhs: Self) -> Self::Output {
                self.value() + rhs.value()
            }
        }

        impl Sub for $name {
            type Output = f64;

            fn sub(self, rhs: Self) -> Self::Output {
                self.value() - rhs.value()
            }
        }

        impl Div for $name {
            type Output = f64;

            fn div(self, rhs: Self) -> Self::Output {
                self.value() / rhs.value()
            }
        }

        impl PriceLike for $name {
            fn value(&self) -> f64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.format_price())
            }
        }
    };
}

macro_rules! impl_price_compare {
    ($a:ty, $b:ty) => {
        impl PartialEq<$b> for $a {
            fn eq(&self, other: &$b) -> bool {
                self.value() == other.value()
            }
        }

        impl PartialOrd<$b> for $a {
            fn partial_cmp(&self, other: &$b) -> Option<std::cmp::Ordering> {
                self.value().partial_cmp(&other.value())
            }
        }
    };
}

define_price_type!(Price);
define_price_type!(HighPrice);
define_price_type!(LowPrice);

impl_into_price!(HighPrice);
impl_into_price!(LowPrice);

impl_from_price!(HighPrice);
impl_from_price!(LowPrice);

impl_price_compare!(LowPrice, HighPrice);
impl_price_compare!(HighPrice, LowPrice);
impl_price_compare!(LowPrice, Price);
impl_price_compare!(HighPrice, Price);
impl_price_compare!(Price, LowPrice);
impl_price_compare!(Price, HighPrice);

/// Tolerance expressed in percent units (0.5 = 0.5%).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TolerancePct(f64);

impl TolerancePct {
    pub const fn new(val: f64) -> Self {
        let v = if val < 0.0 { 0.0 } else { val };
        Self(v)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// True when `candidate` sits within this tolerance of `reference`.
    pub fn admits<A: PriceLike, B: PriceLike>(self, candidate: &A, reference: &B) -> bool {
        candidate.percent_diff_from(reference) <= self.0
    }

    /// `reference` pushed up by this tolerance.
    pub fn above(self, reference: f64) -> f64 {
        reference * (1.0 + self.0 / 100.0)
    }

    /// `reference` pushed down by this tolerance.
    pub fn below(self, reference: f64) -> f64 {
        reference * (1.0 - self.0 / 100.0)
    }
}

impl std::fmt::Display for TolerancePct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

/// Evidence mass carried by a level.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Weight(f64);

impl Weight {
    pub const fn new(val: f64) -> Self {
        let v = if val < 0.0 { 0.0 } else { val };
        Self(v)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Add for Weight {
    type Output = Weight;

    fn add(self, rhs: Self) -> Self::Output {
        Weight::new(self.0 + rhs.0)
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct VolRatio(f64);

impl VolRatio {
    pub const fn new(val: f64) -> Self {
        let v = if val < 0.0 { 0.0 } else { val };
        Self(v)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Calculates the ratio between current and average volume.
    /// Handles division by zero by returning 1.0 (neutral).
    pub fn calculate(current_vol: f64, avg_vol: f64) -> Self {
        if avg_vol > f64::EPSILON {
            Self::new(current_vol / avg_vol)
        } else {
            Self::new(1.0)
        }
    }
}

impl Div<f64> for VolRatio {
    type Output = f64;

    fn div(self, rhs: f64) -> Self::Output {
        self.0 / rhs
    }
}

impl std::fmt::Display for VolRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}x", self.0)
    }
}
