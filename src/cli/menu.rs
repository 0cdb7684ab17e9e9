use std::{io, path::PathBuf};

use clap::Args;
use storefront::{fixtures::MenuFixture, foods::Food, render::write_menu, storefront::Storefront};

#[derive(Debug, Args)]
pub(crate) struct MenuArgs {
    /// Only show foods in this category
    #[arg(long)]
    category: Option<String>,

    /// Read the menu from a YAML file instead of the backend
    #[arg(long)]
    fixture: Option<PathBuf>,
}

pub(crate) async fn run(storefront: &Storefront, args: MenuArgs) -> Result<(), String> {
    storefront.navigate("/menu");

    let (foods, currency) = match args.fixture {
        Some(path) => {
            let menu = MenuFixture::from_file(path)
                .map_err(|error| format!("failed to load menu fixture: {error}"))?;

            (menu.foods().to_vec(), menu.currency())
        }
        None => {
            let foods = storefront
                .api()
                .list_foods()
                .await
                .map_err(|error| format!("failed to load menu: {error}"))?;

            (foods, storefront.api().currency())
        }
    };

    let foods: Vec<Food> = foods
        .into_iter()
        .filter(|food| {
            args.category
                .as_deref()
                .is_none_or(|category| food.category.eq_ignore_ascii_case(category))
        })
        .collect();

    if foods.is_empty() {
        println!("no foods found");

        return Ok(());
    }

    write_menu(io::stdout().lock(), &foods, currency).map_err(|error| error.to_string())
}
