//! Menu catalog and store location commands.

use clap::Subcommand;

use stonefire_core::{CategoryId, LocationId};
use stonefire_storefront::api::types::ProductFilter;

use super::load_app;

#[derive(Subcommand)]
pub enum MenuAction {
    /// List menu categories
    Categories,
    /// List products, optionally filtered
    Products {
        /// Only products in this category
        #[arg(long)]
        category_id: Option<i64>,
        /// Only products of this type (e.g. pizza, drink)
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// List customizer toppings
    Toppings {
        /// Only toppings of this group (cheese, meat, veggie)
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// List specialty pizzas
    Specialty,
}

#[derive(Subcommand)]
pub enum LocationAction {
    /// List all store locations
    List,
    /// Search locations by text
    Search {
        query: String,
        /// Limit to a radius in miles
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Select the location to order from
    Select { id: i64 },
}

pub async fn run_menu(action: MenuAction) -> Result<(), Box<dyn std::error::Error>> {
    let app = load_app().await?;
    let api = app.api().ok_or("STONEFIRE_API_URL is not set")?;

    match action {
        MenuAction::Categories => {
            for category in api.categories().await? {
                println!("{:>4}  {}", category.id, category.name);
            }
        }
        MenuAction::Products { category_id, kind } => {
            let filter = ProductFilter {
                category_id: category_id.map(CategoryId::new),
                kind,
            };
            for product in api.products(Some(&filter)).await? {
                println!(
                    "{:>4}  {:<28} {:>8}  {}",
                    product.id,
                    product.name,
                    product.base_price.display(),
                    product.kind
                );
            }
        }
        MenuAction::Toppings { kind } => {
            for topping in api.toppings(kind.as_deref()).await? {
                println!("{:>4}  {:<24} {}", topping.id, topping.name, topping.kind);
            }
        }
        MenuAction::Specialty => {
            for product in api.specialty().await? {
                println!(
                    "{:>4}  {:<28} {}",
                    product.id,
                    product.name,
                    product.base_price.display()
                );
            }
        }
    }
    Ok(())
}

pub async fn run_locations(action: LocationAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = load_app().await?;
    let api = app.api().ok_or("STONEFIRE_API_URL is not set")?;

    match action {
        LocationAction::List => {
            for location in api.locations().await? {
                print_location(&location, app.selected_location());
            }
        }
        LocationAction::Search { query, radius } => {
            for location in api.search_locations(&query, radius).await? {
                print_location(&location, app.selected_location());
            }
        }
        LocationAction::Select { id } => {
            let id = LocationId::new(id);
            let locations = api.locations().await?;
            let location = locations
                .into_iter()
                .find(|location| location.id == id)
                .ok_or_else(|| format!("no location with id {id}"))?;
            let name = location.store_name.clone();
            app.select_location(location)?;
            println!("selected {name}");
        }
    }
    Ok(())
}

fn print_location(
    location: &stonefire_storefront::api::types::Location,
    selected: Option<&stonefire_storefront::api::types::Location>,
) {
    let marker = if selected.is_some_and(|s| s.id == location.id) {
        "*"
    } else {
        " "
    };
    let status = if location.is_active { "" } else { "  [closed]" };
    println!(
        "{marker}{:>4}  {:<24} {}, {}{status}",
        location.id, location.store_name, location.address, location.city
    );
}
