use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use storefront::{
    api::{FoodForm, ImageUpload},
    foods::FoodId,
    prices::Price,
    storefront::Storefront,
};

use super::enter;

#[derive(Debug, Args)]
pub(crate) struct FoodsCommand {
    #[command(subcommand)]
    command: FoodsSubcommand,
}

#[derive(Debug, Subcommand)]
enum FoodsSubcommand {
    /// Add a food to the menu
    Add(FoodArgs),

    /// Replace a food's details
    Update(UpdateFoodArgs),

    /// Remove a food from the menu
    Delete(DeleteFoodArgs),
}

#[derive(Debug, Args)]
struct FoodArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Short description
    #[arg(long, default_value = "")]
    description: String,

    /// Price in major units, e.g. 150.00
    #[arg(long)]
    price: Decimal,

    /// Menu category
    #[arg(long, default_value = "")]
    category: String,

    /// Image file to upload
    #[arg(long)]
    image: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct UpdateFoodArgs {
    /// Food id
    id: String,

    #[command(flatten)]
    food: FoodArgs,
}

#[derive(Debug, Args)]
struct DeleteFoodArgs {
    /// Food id
    id: String,
}

pub(crate) async fn run(storefront: &Storefront, command: FoodsCommand) -> Result<(), String> {
    enter(storefront, "/admin/foods")?;

    let api = storefront.api();

    match command.command {
        FoodsSubcommand::Add(args) => {
            let food = api
                .create_food(food_form(args, api.currency())?)
                .await
                .map_err(|error| format!("failed to add food: {error}"))?;

            println!("added {} ({})", food.name, food.id);
        }
        FoodsSubcommand::Update(args) => {
            let food = api
                .update_food(&FoodId::new(args.id), food_form(args.food, api.currency())?)
                .await
                .map_err(|error| format!("failed to update food: {error}"))?;

            println!("updated {} ({})", food.name, food.id);
        }
        FoodsSubcommand::Delete(args) => {
            let id = FoodId::new(args.id);

            api.delete_food(&id)
                .await
                .map_err(|error| format!("failed to delete food: {error}"))?;

            println!("deleted {id}");
        }
    }

    Ok(())
}

fn food_form(args: FoodArgs, currency: &Currency) -> Result<FoodForm, String> {
    Ok(FoodForm {
        name: args.name,
        description: args.description,
        price: Price::from_decimal(args.price, currency).map_err(|error| error.to_string())?,
        category: args.category,
        image: args.image.as_deref().map(read_image).transpose()?,
    })
}

fn read_image(path: &Path) -> Result<ImageUpload, String> {
    let bytes =
        fs::read(path).map_err(|error| format!("failed to read {}: {error}", path.display()))?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("image")
        .to_string();

    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);

    let content_type = match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    };

    Ok(ImageUpload {
        file_name,
        content_type: content_type.to_string(),
        bytes,
    })
}
