//! Checkout command.

use clap::Args;

use stonefire_core::PaymentMethod;
use stonefire_storefront::checkout::{CheckoutError, CheckoutStep, DeliveryForm};

use super::load_app;

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    zip: String,
    /// Payment method: card or cash
    #[arg(long, default_value = "card")]
    method: String,
}

pub async fn run(args: CheckoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let payment_method = match args.method.as_str() {
        "card" => PaymentMethod::Card,
        "cash" => PaymentMethod::Cash,
        other => return Err(format!("unknown payment method {other:?}").into()),
    };

    let form = DeliveryForm {
        name: args.name,
        email: args.email,
        phone: args.phone,
        address: args.address,
        city: args.city,
        zip_code: args.zip,
        payment_method,
    };

    let mut app = load_app().await?;
    match app.checkout(&form).await {
        Ok(CheckoutStep::Confirmed(confirmation)) => {
            println!(
                "order #{} confirmed, total {}",
                confirmation.order_id,
                confirmation.total.display()
            );
            if let Some(payment_error) = confirmation.payment_error {
                println!("payment could not be started: {payment_error}");
                println!("the store will collect payment on delivery");
            }
        }
        Ok(CheckoutStep::Payment(payment)) => {
            println!(
                "order #{} created, total {}",
                payment.order_id,
                payment.total.display()
            );
            println!("complete card payment in the hosted form:");
            println!("  publishable key: {}", payment.publishable_key);
            println!("  client secret:   {}", payment.client_secret);
        }
        Err(CheckoutError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            return Err("delivery form is invalid".into());
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
