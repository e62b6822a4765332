use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{config::load_settings, CatalogApi, HttpCatalogClient};
use shared::domain::{Product, ProductDraft, ProductId};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "catalog", about = "Command-line access to the product catalog API")]
struct Args {
    /// Overrides the configured base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print results as JSON instead of tab-separated lines.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// List every product.
    List,
    /// Create a product.
    Add {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, value_parser = parse_price)]
        price: f64,
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Replace all fields of an existing product.
    Update {
        #[arg(long)]
        id: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, value_parser = parse_price)]
        price: f64,
        #[arg(long, default_value = "")]
        image_url: String,
    },
    /// Delete a product.
    Delete {
        #[arg(long)]
        id: String,
    },
}

/// Prices must be finite; JSON has no encoding for `inf` or `NaN`.
fn parse_price(raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("price '{raw}' is not a finite number"))
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Products(Vec<Product>),
    Deleted(ProductId),
}

async fn run(api: &dyn CatalogApi, command: Command) -> Result<Outcome> {
    let outcome = match command {
        Command::List => Outcome::Products(api.list().await.context("failed to fetch products")?),
        Command::Add {
            name,
            price,
            image_url,
        } => {
            let draft = ProductDraft {
                name,
                price,
                image_url,
            };
            let created = api.create(&draft).await.context("failed to add product")?;
            Outcome::Products(vec![created])
        }
        Command::Update {
            id,
            name,
            price,
            image_url,
        } => {
            let draft = ProductDraft {
                name,
                price,
                image_url,
            };
            let updated = api
                .update(&ProductId::new(id), &draft)
                .await
                .context("failed to update product")?;
            Outcome::Products(vec![updated])
        }
        Command::Delete { id } => {
            let id = ProductId::new(id);
            api.delete(&id).await.context("failed to delete product")?;
            Outcome::Deleted(id)
        }
    };
    Ok(outcome)
}

fn render(outcome: &Outcome, json: bool) -> Result<String> {
    let text = match (outcome, json) {
        (Outcome::Products(items), true) => serde_json::to_string_pretty(items)?,
        (Outcome::Deleted(id), true) => serde_json::to_string(&serde_json::json!({ "deleted": id }))?,
        (Outcome::Products(items), false) => items
            .iter()
            .map(|item| {
                format!(
                    "{}\t{}\t{}\t{}",
                    item.id, item.name, item.price, item.image_url
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        (Outcome::Deleted(id), false) => format!("deleted {id}"),
    };
    Ok(text)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
    }
    settings.validate().context("invalid catalog configuration")?;
    let client = HttpCatalogClient::from_settings(&settings)
        .context("failed to build catalog client")?;
    tracing::debug!(base_url = %client.base_url(), command = ?args.command, "running catalog command");

    let outcome = run(&client, args.command).await?;
    let text = render(&outcome, args.json)?;
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/cli_tests.rs"]
mod tests;
