//! Line-item price calculation for customized pizzas.
//!
//! Pure and deterministic: a base price plus the additive price of every
//! selected option. Nothing here rounds - display formatting is the only
//! place two-decimal rounding happens.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stonefire_core::Price;

/// One selectable option (a crust, a sauce, a topping) with its additive
/// price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub name: String,
    #[serde(default)]
    pub price: Price,
}

impl OptionChoice {
    /// Convenience constructor for a priced option.
    #[must_use]
    pub fn new(name: impl Into<String>, price: Price) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// A free option (price contributes 0).
    #[must_use]
    pub fn free(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: Price::ZERO,
        }
    }
}

/// An extra topping that can be added more than once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraChoice {
    pub name: String,
    #[serde(default)]
    pub price: Price,
    pub quantity: u32,
}

/// The full customization of one line item.
///
/// Serialized into the cart line's `custom_data`, and compared (in
/// serialized form) to decide whether two cart lines are the same item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customizations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<OptionChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crust: Option<OptionChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sauce: Option<OptionChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cheeses: Vec<OptionChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meats: Vec<OptionChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub veggies: Vec<OptionChoice>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<ExtraChoice>,
}

impl Customizations {
    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size.is_none()
            && self.crust.is_none()
            && self.sauce.is_none()
            && self.cheeses.is_empty()
            && self.meats.is_empty()
            && self.veggies.is_empty()
            && self.extras.is_empty()
    }

    /// Canonical serialized form, used as the customization half of a cart
    /// line's merge identity.
    ///
    /// Struct fields serialize in declaration order, so equal selections
    /// always produce equal fingerprints.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Compute the price of one unit: base plus every selected option, with
/// repeatable extras multiplied by their quantity.
///
/// Negative option prices contribute nothing; unselected groups contribute 0.
#[must_use]
pub fn line_price(base: Price, customizations: &Customizations) -> Price {
    let singles = [
        customizations.size.as_ref(),
        customizations.crust.as_ref(),
        customizations.sauce.as_ref(),
    ]
    .into_iter()
    .flatten();

    let lists = customizations
        .cheeses
        .iter()
        .chain(&customizations.meats)
        .chain(&customizations.veggies);

    let options: Price = singles.chain(lists).map(|option| clamp(option.price)).sum();

    let extras: Price = customizations
        .extras
        .iter()
        .map(|extra| clamp(extra.price) * extra.quantity)
        .sum();

    base + options + extras
}

/// Negative prices never reduce a total.
fn clamp(price: Price) -> Price {
    if price.amount() < Decimal::ZERO {
        Price::ZERO
    } else {
        price
    }
}
