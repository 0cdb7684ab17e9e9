use std::sync::Arc;

use clap::{Parser, Subcommand};
use storefront::{
    api::HeadlessNavigator, config::ClientConfig, guard::GuardDecision, session::FileStorage,
    storefront::Storefront,
};

mod auth;
mod foods;
mod menu;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Food delivery storefront client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the menu
    Menu(menu::MenuArgs),

    /// Sign in
    Login(auth::LoginArgs),

    /// Sign out
    Logout,

    /// Create an account
    Register(auth::RegisterArgs),

    /// Show who is signed in
    Whoami,

    /// Order food
    Order(orders::PlaceOrderArgs),

    /// List your orders
    Orders(orders::ListOrdersArgs),

    /// Move an order to a new status (admin)
    OrderStatus(orders::OrderStatusArgs),

    /// Manage the menu (admin)
    Foods(foods::FoodsCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let storefront = self.storefront()?;

        match self.command {
            Commands::Menu(args) => menu::run(&storefront, args).await,
            Commands::Login(args) => auth::login(&storefront, args).await,
            Commands::Logout => auth::logout(&storefront),
            Commands::Register(args) => auth::register(&storefront, args).await,
            Commands::Whoami => {
                auth::whoami(&storefront);

                Ok(())
            }
            Commands::Order(args) => orders::place(storefront, args).await,
            Commands::Orders(args) => orders::list(storefront, args).await,
            Commands::OrderStatus(args) => orders::set_status(storefront, args).await,
            Commands::Foods(command) => foods::run(&storefront, command).await,
        }
    }

    fn storefront(&self) -> Result<Storefront, String> {
        Storefront::new(
            &self.config.api,
            Arc::new(FileStorage::new(self.config.session.session_dir.clone())),
            Arc::new(HeadlessNavigator::default()),
        )
        .map_err(|error| format!("failed to start storefront: {error}"))
    }
}

/// Navigate to `path`, failing when the guard turns the user away.
fn enter(storefront: &Storefront, path: &str) -> Result<(), String> {
    match storefront.navigate(path) {
        GuardDecision::Allow => Ok(()),
        GuardDecision::RedirectTo(_) => {
            Err("please sign in first: storefront login --email <EMAIL>".to_string())
        }
        GuardDecision::Forbidden { .. } => {
            Err("this command needs an administrator account".to_string())
        }
    }
}
