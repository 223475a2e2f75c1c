use args::{Args, Command};
use clap::Parser;
use client::AuthClient;
use config::{Config, Role};
use route_policy::{RouteAccess, RoutePolicy};
use session::{AccessToken, Identity};

mod args;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init(&args);

    let config = args.config()?;

    match args.command {
        Command::Routes { role } => print_routes(&RoutePolicy::new(config.routes)?, role),
        Command::Check { role, path } => {
            let policy = RoutePolicy::new(config.routes)?;
            let allowed = policy.is_allowed(role, &path);

            println!("{}", policy.describe_denial(&path, role));

            if !allowed {
                std::process::exit(1);
            }
        }
        Command::Login {
            username,
            password,
            toggle,
        } => {
            if let Err(e) = login(&config, &username, &password, toggle).await {
                log::error!("Login failed: {e}");
                std::process::exit(1);
            }
        }
        Command::Health { token } => {
            let client = AuthClient::from_config(&config)?;
            let token = token.map(AccessToken::from);
            let status = client.gateway().health(token.as_ref()).await;

            println!("{}", serde_json::to_string_pretty(&status)?);

            if status.is_degraded() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn login(config: &Config, username: &str, password: &str, toggle: bool) -> anyhow::Result<()> {
    let client = AuthClient::from_config(config)?;

    let identity = client.sign_in(username, password).await?;
    print_identity(&identity);

    if toggle {
        let toggled = client.toggle_role().await?;

        if let Some(message) = toggled.message {
            println!("{message}");
        }

        print_identity(&toggled.identity);
    }

    let details = client.user_details().await;

    if !details.is_unavailable() {
        println!("authority sees: {} ({})", details.username, details.auth_type);
    }

    println!();
    print_routes(client.policy(), client.role());

    Ok(())
}

fn print_identity(identity: &Identity) {
    println!("signed in as {} <{}>", identity.display_name, identity.email);
    println!("  subject: {}", identity.subject_id);
    println!("  role:    {}", identity.role);

    if let Some(expires_at) = identity.expires_at {
        println!("  expires: {expires_at}");
    }
}

fn print_routes(policy: &RoutePolicy, role: Option<Role>) {
    match role {
        Some(role) => println!("routes for role '{role}':"),
        None => println!("routes for a signed-out visitor:"),
    }

    for entry in policy.menu(role) {
        match entry.access {
            RouteAccess::Granted => println!("  [open]   {:<12} {}", entry.rule.path, entry.rule.label),
            RouteAccess::Denied(reason) => println!("  [locked] {:<12} {reason}", entry.rule.path),
        }
    }
}
