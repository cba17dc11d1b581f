// Command dispatch: restore the cart, apply one operation, print the result.

use anyhow::Context;
use tracing::info;

use localmart_cart::cart::item::{CartRestaurant, MenuItem};
use localmart_cart::config::Config;
use localmart_cart::confirm::{AutoConfirm, Confirm};
use localmart_cart::order::{self, DeliveryDetails, HttpOrderService};
use localmart_cart::store::SqliteStore;
use localmart_cart::{AddOutcome, CartManager};

use crate::prompt::TerminalConfirm;
use crate::render;
use crate::Command;

pub async fn run(command: Command, config: &Config, yes: bool) -> anyhow::Result<()> {
    let db_path = config.storage.resolved_db_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path = db_path
        .to_str()
        .context("cart database path is not valid UTF-8")?
        .to_string();
    let store = SqliteStore::open(&db_path).context("failed to open cart store")?;
    info!("Cart store opened at {}", db_path);

    let confirm: Box<dyn Confirm> = if yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(TerminalConfirm)
    };

    let mut manager = CartManager::restore(
        store,
        confirm,
        config.pricing.clone(),
        config.storage.cart_key.clone(),
    );

    match command {
        Command::Show => {}
        Command::Add {
            id,
            name,
            price,
            veg,
            restaurant_id,
            restaurant_name,
        } => {
            let mut item = MenuItem::new(id, name, price);
            if veg {
                item = item.vegetarian();
            }
            let restaurant = restaurant_id
                .zip(restaurant_name)
                .map(|(id, name)| CartRestaurant::new(id, name));

            match manager.add_item(item, restaurant).await? {
                AddOutcome::Added => println!("Added to cart."),
                AddOutcome::Incremented { quantity } => println!("Quantity is now {quantity}."),
                AddOutcome::SwitchDeclined => println!("Kept your current cart."),
            }
        }
        Command::Remove { id } => {
            if !manager.remove_item(&id) {
                println!("{id} is not in the cart.");
            }
        }
        Command::Clear => manager.clear(),
        Command::Total => {
            print!("{}", render::totals(&manager.totals(), manager.pricing()));
            return Ok(());
        }
        Command::Checkout {
            name,
            phone,
            address,
            instructions,
        } => {
            let service = HttpOrderService::from_config(&config.orders)
                .context("failed to build order client")?;
            let delivery = DeliveryDetails {
                customer_name: name,
                phone,
                address,
                instructions,
            };
            let confirmation = order::checkout(&mut manager, &service, delivery).await?;
            println!(
                "Order {} {}.",
                confirmation.order_id, confirmation.status
            );
            if let Some(minutes) = confirmation.estimated_delivery_minutes {
                println!("Estimated delivery in {minutes} minutes.");
            }
            return Ok(());
        }
    }

    print!("{}", render::cart(manager.cart(), manager.pricing()));
    Ok(())
}
