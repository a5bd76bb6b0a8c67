//! Cart commands.

use clap::Subcommand;

use stonefire_core::{Price, ProductId};
use stonefire_storefront::cart::CartLine;
use stonefire_storefront::pricing::{self, Customizations};
use stonefire_storefront::state::App;

use super::{load_app, parse_extra, parse_option};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart
    Show,
    /// Add an item (a catalog product by id, or a custom item by name+price)
    Add {
        /// Catalog product id
        #[arg(long, conflicts_with = "name")]
        product_id: Option<i64>,
        /// Custom item name
        #[arg(long, requires = "price")]
        name: Option<String>,
        /// Custom item base price, e.g. 12.99
        #[arg(long)]
        price: Option<rust_decimal::Decimal>,
        #[arg(long, default_value_t = 1)]
        qty: u32,
        /// Size option as Name=Price
        #[arg(long)]
        size: Option<String>,
        /// Crust option as Name=Price
        #[arg(long)]
        crust: Option<String>,
        /// Sauce option as Name=Price
        #[arg(long)]
        sauce: Option<String>,
        /// Cheese options as Name=Price (repeatable)
        #[arg(long = "cheese")]
        cheeses: Vec<String>,
        /// Meat options as Name=Price (repeatable)
        #[arg(long = "meat")]
        meats: Vec<String>,
        /// Veggie options as Name=Price (repeatable)
        #[arg(long = "veggie")]
        veggies: Vec<String>,
        /// Extra toppings as Name=PricexQty (repeatable)
        #[arg(long = "extra")]
        extras: Vec<String>,
    },
    /// Remove a line (by its position in `cart show`)
    Remove {
        #[arg(long)]
        line: usize,
    },
    /// Set a line's quantity (0 removes it)
    SetQty {
        #[arg(long)]
        line: usize,
        #[arg(long)]
        qty: u32,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(action: CartAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = load_app().await?;

    match action {
        CartAction::Show => show(&app),
        CartAction::Add {
            product_id,
            name,
            price,
            qty,
            size,
            crust,
            sauce,
            cheeses,
            meats,
            veggies,
            extras,
        } => {
            let customizations = Customizations {
                size: size.as_deref().map(parse_option).transpose()?,
                crust: crust.as_deref().map(parse_option).transpose()?,
                sauce: sauce.as_deref().map(parse_option).transpose()?,
                cheeses: parse_all(&cheeses)?,
                meats: parse_all(&meats)?,
                veggies: parse_all(&veggies)?,
                extras: extras
                    .iter()
                    .map(|raw| parse_extra(raw))
                    .collect::<Result<_, _>>()?,
            };

            let line = match (product_id, name) {
                (Some(product_id), _) => {
                    let product = lookup_product(&app, ProductId::new(product_id)).await?;
                    // A customized pizza goes down the custom-item path so
                    // the option prices survive; the backend prices plain
                    // catalog items itself.
                    let custom = !customizations.is_empty();
                    CartLine {
                        id: product.id.to_string(),
                        product_id: if custom { None } else { Some(product.id) },
                        name: product.name,
                        unit_price: pricing::line_price(product.base_price, &customizations),
                        quantity: qty,
                        customizations,
                        image: product.image,
                    }
                }
                (None, Some(name)) => {
                    let base = Price::new(price.ok_or("--price is required with --name")?);
                    CartLine {
                        id: name.to_lowercase().replace(' ', "-"),
                        product_id: None,
                        name,
                        unit_price: pricing::line_price(base, &customizations),
                        quantity: qty,
                        customizations,
                        image: None,
                    }
                }
                (None, None) => return Err("pass --product-id or --name/--price".into()),
            };

            app.cart_mut().add(line).await?;
            show(&app);
        }
        CartAction::Remove { line } => {
            let (id, customizations) = line_key(&app, line)?;
            app.cart_mut().remove(&id, &customizations).await?;
            show(&app);
        }
        CartAction::SetQty { line, qty } => {
            let (id, customizations) = line_key(&app, line)?;
            app.cart_mut().set_quantity(&id, &customizations, qty).await?;
            show(&app);
        }
        CartAction::Clear => {
            app.cart_mut().clear().await?;
            println!("cart cleared");
        }
    }
    Ok(())
}

fn parse_all(
    raw: &[String],
) -> Result<Vec<stonefire_storefront::pricing::OptionChoice>, Box<dyn std::error::Error>> {
    Ok(raw
        .iter()
        .map(|option| parse_option(option))
        .collect::<Result<Vec<_>, _>>()?)
}

async fn lookup_product(
    app: &App,
    product_id: ProductId,
) -> Result<stonefire_storefront::api::types::Product, Box<dyn std::error::Error>> {
    let api = app.api().ok_or("STONEFIRE_API_URL is not set")?;
    api.products(None)
        .await?
        .into_iter()
        .find(|product| product.id == product_id)
        .ok_or_else(|| format!("no product with id {product_id}").into())
}

fn line_key(app: &App, index: usize) -> Result<(String, Customizations), String> {
    let lines = app.cart().lines();
    let line = lines
        .get(index.checked_sub(1).ok_or("line numbers start at 1")?)
        .ok_or_else(|| format!("cart has {} lines", lines.len()))?;
    Ok((line.id.clone(), line.customizations.clone()))
}

fn show(app: &App) {
    let cart = app.cart();
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }
    for (index, line) in cart.lines().iter().enumerate() {
        println!(
            "{:>3}. {:<28} x{:<3} {:>8}  {}",
            index + 1,
            line.name,
            line.quantity,
            line.total().display(),
            describe(&line.customizations)
        );
    }
    println!(
        "     {} items, total {}",
        cart.total_items(),
        cart.total_price().display()
    );
}

fn describe(customizations: &Customizations) -> String {
    let mut parts = Vec::new();
    for option in [
        customizations.size.as_ref(),
        customizations.crust.as_ref(),
        customizations.sauce.as_ref(),
    ]
    .into_iter()
    .flatten()
    {
        parts.push(option.name.clone());
    }
    for option in customizations
        .cheeses
        .iter()
        .chain(&customizations.meats)
        .chain(&customizations.veggies)
    {
        parts.push(option.name.clone());
    }
    for extra in &customizations.extras {
        parts.push(format!("{} x{}", extra.name, extra.quantity));
    }
    parts.join(", ")
}
