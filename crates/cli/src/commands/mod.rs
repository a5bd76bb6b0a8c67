//! Command implementations.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod menu;
pub mod orders;

use std::str::FromStr;

use rust_decimal::Decimal;

use stonefire_core::Price;
use stonefire_storefront::config::StorefrontConfig;
use stonefire_storefront::poller::NotificationSink;
use stonefire_storefront::pricing::{ExtraChoice, OptionChoice};
use stonefire_storefront::state::App;

/// Build the storefront application context from the environment and restore
/// its persisted state.
pub async fn load_app() -> Result<App, Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    let mut app = App::new(config)?;
    app.bootstrap().await;
    Ok(app)
}

/// Rings the terminal bell. Playback failure is impossible to observe here,
/// which suits a fire-and-forget notification.
pub struct TerminalBell;

impl NotificationSink for TerminalBell {
    fn notify(&self) {
        print!("\x07");
    }
}

/// Parse a `Name=Price` option flag, e.g. `"Stuffed=2.50"`. A bare name is
/// a free option.
pub fn parse_option(raw: &str) -> Result<OptionChoice, String> {
    match raw.split_once('=') {
        Some((name, price)) => {
            let amount = Decimal::from_str(price.trim())
                .map_err(|e| format!("invalid price in {raw:?}: {e}"))?;
            Ok(OptionChoice::new(name.trim(), Price::new(amount)))
        }
        None => Ok(OptionChoice::free(raw.trim())),
    }
}

/// Parse a `Name=PricexQty` extra flag, e.g. `"Jalapenos=0.75x2"`. Quantity
/// defaults to 1.
pub fn parse_extra(raw: &str) -> Result<ExtraChoice, String> {
    let (name_part, rest) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected Name=Price[xQty], got {raw:?}"))?;
    let (price_part, qty_part) = match rest.split_once('x') {
        Some((price, qty)) => (price, Some(qty)),
        None => (rest, None),
    };
    let amount = Decimal::from_str(price_part.trim())
        .map_err(|e| format!("invalid price in {raw:?}: {e}"))?;
    let quantity = match qty_part {
        Some(qty) => qty
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid quantity in {raw:?}: {e}"))?,
        None => 1,
    };
    Ok(ExtraChoice {
        name: name_part.trim().to_string(),
        price: Price::new(amount),
        quantity,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option() {
        let option = parse_option("Stuffed=2.50").unwrap();
        assert_eq!(option.name, "Stuffed");
        assert_eq!(option.price, Price::from_cents(250));

        let free = parse_option("Tomato Sauce").unwrap();
        assert_eq!(free.price, Price::ZERO);
    }

    #[test]
    fn test_parse_extra() {
        let extra = parse_extra("Jalapenos=0.75x2").unwrap();
        assert_eq!(extra.quantity, 2);
        assert_eq!(extra.price, Price::from_cents(75));

        let single = parse_extra("Olives=0.50").unwrap();
        assert_eq!(single.quantity, 1);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_option("Bad=notaprice").is_err());
        assert!(parse_extra("NoPrice").is_err());
        assert!(parse_extra("Bad=1.0xtwo").is_err());
    }
}
