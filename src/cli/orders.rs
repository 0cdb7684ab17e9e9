use std::io;

use clap::Args;
use storefront::{
    checkout::CheckoutForm,
    orders::{OrderId, OrderStatus, OrderStatusError},
    render::{write_lines, write_order, write_orders},
    storefront::Storefront,
};

use super::enter;

/// One `FOOD_ID:QUANTITY` pair.
#[derive(Clone, Debug)]
struct Pick {
    id: String,
    quantity: i64,
}

#[derive(Debug, Args)]
pub(crate) struct PlaceOrderArgs {
    /// Items as `FOOD_ID:QUANTITY` pairs; the quantity defaults to 1
    #[arg(required = true, value_parser = parse_pick)]
    items: Vec<Pick>,

    /// Recipient name
    #[arg(long)]
    name: String,

    /// Contact phone number
    #[arg(long)]
    phone: String,

    /// Street address
    #[arg(long)]
    street: String,

    /// City
    #[arg(long)]
    city: String,

    /// Delivery notes
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct ListOrdersArgs {
    /// Show a single order in detail
    id: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct OrderStatusArgs {
    /// Order id
    id: String,

    /// New status (placed, preparing, on_the_way, delivered, cancelled)
    #[arg(value_parser = parse_status)]
    status: OrderStatus,
}

pub(crate) async fn place(mut storefront: Storefront, args: PlaceOrderArgs) -> Result<(), String> {
    enter(&storefront, "/checkout")?;

    let foods = storefront
        .api()
        .list_foods()
        .await
        .map_err(|error| format!("failed to load menu: {error}"))?;

    for pick in &args.items {
        let food = foods
            .iter()
            .find(|food| food.id == pick.id.as_str())
            .ok_or_else(|| format!("{} is not on the menu", pick.id))?;

        let cart = storefront.cart_mut();
        let existing = cart
            .get(food.id.as_str())
            .map_or(0, |line| i64::from(line.quantity()));

        cart.add_item(food);
        cart.set_quantity(food.id.as_str(), existing.saturating_add(pick.quantity));
    }

    let cart = storefront.cart();

    write_lines(io::stdout().lock(), cart.lines(), cart.totals())
        .map_err(|error| error.to_string())?;

    let form = CheckoutForm {
        full_name: args.name,
        phone: args.phone,
        street: args.street,
        city: args.city,
        notes: args.notes,
    };

    let id = storefront
        .checkout(&form)
        .await
        .map_err(|error| format!("checkout failed: {error}"))?;

    println!("order {id} placed");

    Ok(())
}

pub(crate) async fn list(mut storefront: Storefront, args: ListOrdersArgs) -> Result<(), String> {
    enter(&storefront, "/orders")?;

    storefront
        .refresh_orders()
        .await
        .map_err(|error| format!("failed to load orders: {error}"))?;

    let written = match args.id {
        Some(id) => {
            let order = storefront
                .orders()
                .get_order_by_id(&id)
                .ok_or_else(|| format!("order {id} not found"))?;

            write_order(io::stdout().lock(), order)
        }
        None if storefront.orders().is_empty() => {
            println!("no orders yet");

            Ok(())
        }
        None => write_orders(io::stdout().lock(), storefront.orders().orders()),
    };

    written.map_err(|error| error.to_string())
}

pub(crate) async fn set_status(
    mut storefront: Storefront,
    args: OrderStatusArgs,
) -> Result<(), String> {
    enter(&storefront, "/admin/orders")?;

    storefront
        .refresh_orders()
        .await
        .map_err(|error| format!("failed to load orders: {error}"))?;

    let id = OrderId::new(args.id);

    let previous = storefront
        .advance_order_status(&id, args.status)
        .await
        .map_err(|error| format!("status update failed: {error}"))?;

    println!("order {id}: {previous} -> {}", args.status);

    Ok(())
}

fn parse_pick(raw: &str) -> Result<Pick, String> {
    let (id, quantity) = raw.split_once(':').unwrap_or((raw, "1"));

    if id.trim().is_empty() {
        return Err(format!("missing food id in {raw:?}"));
    }

    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|error| format!("invalid quantity in {raw:?}: {error}"))?;

    Ok(Pick {
        id: id.trim().to_string(),
        quantity,
    })
}

fn parse_status(raw: &str) -> Result<OrderStatus, OrderStatusError> {
    raw.parse()
}
