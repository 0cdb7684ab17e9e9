use clap::Args;
use storefront::{
    api::{Credentials, Registration},
    storefront::Storefront,
};

#[derive(Debug, Args)]
pub(crate) struct LoginArgs {
    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Debug, Args)]
pub(crate) struct RegisterArgs {
    /// Display name
    #[arg(long)]
    name: String,

    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long, env = "STOREFRONT_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn login(storefront: &Storefront, args: LoginArgs) -> Result<(), String> {
    storefront.navigate("/login");

    let user = storefront
        .login(&Credentials {
            email: args.email,
            password: args.password,
        })
        .await
        .map_err(|error| format!("login failed: {error}"))?;

    println!("signed in as {} <{}>", user.name, user.email);

    if user.is_admin {
        println!("administrator access enabled");
    }

    Ok(())
}

pub(crate) fn logout(storefront: &Storefront) -> Result<(), String> {
    storefront
        .logout()
        .map_err(|error| format!("logout failed: {error}"))?;

    println!("signed out");

    Ok(())
}

pub(crate) async fn register(storefront: &Storefront, args: RegisterArgs) -> Result<(), String> {
    storefront.navigate("/register");

    storefront
        .api()
        .register(&Registration {
            name: args.name,
            email: args.email,
            password: args.password,
        })
        .await
        .map_err(|error| format!("registration failed: {error}"))?;

    println!("account created; sign in with: storefront login --email <EMAIL>");

    Ok(())
}

pub(crate) fn whoami(storefront: &Storefront) {
    match storefront.session().user() {
        Some(user) => {
            let role = if user.is_admin { "admin" } else { "customer" };

            println!("{} <{}> ({role})", user.name, user.email);
        }
        None if storefront.session().is_authenticated() => {
            println!("signed in (profile unavailable)");
        }
        None => println!("not signed in"),
    }
}
