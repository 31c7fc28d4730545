//! Type-safe price representation using decimal arithmetic.
//!
//! The shop quotes every price in a single in-game currency ("synapses"), so
//! a price is just a decimal amount. Items may carry no price at all; such
//! items are modelled as `Option<Price>` and display as "Priceless".

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Currency label appended to every displayed amount.
pub const CURRENCY_LABEL: &str = "synapses";

/// Display text for an item without a price.
pub const PRICELESS_LABEL: &str = "Priceless";

/// A price in synapses.
///
/// Serialized as a plain JSON number, which is what the shop API sends and
/// expects back in order totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of synapses.
    #[must_use]
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Sum a sequence of optional prices, skipping unset ones.
    ///
    /// ```rust
    /// use larek_core::Price;
    ///
    /// let total = Price::sum_known([Some(Price::from_units(100)), None]);
    /// assert_eq!(total, Price::from_units(100));
    /// ```
    pub fn sum_known<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = Option<Self>>,
    {
        prices.into_iter().flatten().sum()
    }
}

/// Saturating addition: a total past the decimal range clamps to
/// [`Decimal::MAX`] (or [`Decimal::MIN`]) instead of panicking.
impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {CURRENCY_LABEL}", self.0.normalize())
    }
}

/// Format an optional price for display.
#[must_use]
pub fn format_price(price: Option<Price>) -> String {
    price.map_or_else(|| PRICELESS_LABEL.to_string(), |p| p.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("750").unwrap();
        assert_eq!(price, Price::from_units(750));

        let price: Option<Price> = serde_json::from_str("null").unwrap();
        assert!(price.is_none());
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_value(Price::from_units(2500)).unwrap();
        assert!(json.is_number());
        assert_eq!(json.as_f64(), Some(2500.0));
    }

    #[test]
    fn test_sum_known_skips_unset() {
        let total = Price::sum_known([
            Some(Price::from_units(750)),
            None,
            Some(Price::from_units(1450)),
        ]);
        assert_eq!(total, Price::from_units(2200));
    }

    #[test]
    fn test_sum_of_nothing_is_zero() {
        assert_eq!(Price::sum_known(Vec::new()), Price::ZERO);
    }

    #[test]
    fn test_addition_saturates_at_decimal_range() {
        let max = Price::new(Decimal::MAX);
        assert_eq!(max + Price::from_units(1), max);

        let huge = Price::new(Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0));
        assert_eq!(Price::sum_known([Some(huge), None, Some(huge)]), max);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Some(Price::from_units(750))), "750 synapses");
        assert_eq!(format_price(None), "Priceless");
    }
}
