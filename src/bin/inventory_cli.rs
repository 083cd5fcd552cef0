use std::{
    io::{self, BufRead, Write},
    process::ExitCode,
    str::FromStr,
};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;

use inventory_tracker::client::{
    render::format_price, Confirm, Dashboard, DeleteOutcome, InventoryClient, Notifier, Product,
    ProductInput, LOW_STOCK_THRESHOLD,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    inventory_tracker::config::init_tracing(if cli.verbose { "debug" } else { "warn" }, false);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[derive(Parser)]
#[command(name = "inventory-cli", about = "Manage the inventory tracker catalog", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "INVENTORY_API_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the inventory tracker server"
    )]
    base_url: String,
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON when available"
    )]
    json: bool,
    #[arg(long, global = true, action = ArgAction::SetTrue, help = "Log HTTP activity")]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally filtered
    List(ListArgs),
    /// Show catalog totals
    Stats,
    /// Show one product
    Show(IdArgs),
    /// Add a product
    Add(AddArgs),
    /// Edit a product; omitted fields keep their current value
    Edit(EditArgs),
    /// Set the stock quantity of a product
    SetQty(SetQtyArgs),
    /// Delete a product after confirmation
    Delete(DeleteArgs),
}

#[derive(Args)]
struct ListArgs {
    #[arg(long, default_value = "", help = "Case-insensitive match on name, description or SKU")]
    search: String,
    #[arg(long, default_value = "", help = "Exact category to show")]
    category: String,
}

#[derive(Args)]
struct IdArgs {
    #[arg(help = "Product id")]
    id: i32,
}

#[derive(Args)]
struct AddArgs {
    #[arg(long, help = "Display name for the product")]
    name: String,
    #[arg(long, value_parser = parse_decimal, help = "Unit price")]
    price: Decimal,
    #[arg(long, allow_negative_numbers = true, help = "Units in stock")]
    quantity: i32,
    #[arg(long, default_value = "", help = "Optional long-form description")]
    description: String,
    #[arg(long, default_value = "", help = "Grouping label")]
    category: String,
    #[arg(long, default_value = "", help = "Unique SKU; leave empty for none")]
    sku: String,
}

#[derive(Args)]
struct EditArgs {
    #[arg(help = "Product id")]
    id: i32,
    #[arg(long)]
    name: Option<String>,
    #[arg(long, value_parser = parse_decimal)]
    price: Option<Decimal>,
    #[arg(long, allow_negative_numbers = true)]
    quantity: Option<i32>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long, help = "New SKU; pass an empty string to clear it")]
    sku: Option<String>,
}

#[derive(Args)]
struct SetQtyArgs {
    #[arg(help = "Product id")]
    id: i32,
    #[arg(allow_negative_numbers = true, help = "New quantity")]
    quantity: i32,
}

#[derive(Args)]
struct DeleteArgs {
    #[arg(help = "Product id")]
    id: i32,
    #[arg(long, short = 'y', action = ArgAction::SetTrue, help = "Skip the confirmation prompt")]
    yes: bool,
}

/// y/N prompt on stdin
struct PromptConfirm {
    assume_yes: bool,
}

impl Confirm for PromptConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

struct ConsoleNotifier {
    quiet: bool,
}

impl Notifier for ConsoleNotifier {
    fn success(&mut self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    fn error(&mut self, message: &str) {
        eprintln!("Error: {message}");
    }
}

type CliDashboard = Dashboard<PromptConfirm, ConsoleNotifier>;

async fn run(cli: Cli) -> Result<ExitCode> {
    let client = InventoryClient::new(cli.base_url.clone())
        .context("failed to construct HTTP client")?;
    let assume_yes = matches!(&cli.command, Commands::Delete(args) if args.yes);
    let mut dashboard = Dashboard::new(
        client,
        PromptConfirm { assume_yes },
        ConsoleNotifier { quiet: cli.json },
    );

    // Every command starts from a fresh list; a failed load is already reported
    if dashboard.load().await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    let ok = match cli.command {
        Commands::List(args) => {
            handle_list(&mut dashboard, args, cli.json)?;
            true
        }
        Commands::Stats => {
            handle_stats(&dashboard, cli.json)?;
            true
        }
        Commands::Show(args) => {
            let product = dashboard
                .state()
                .find(args.id)
                .with_context(|| format!("product {} not found", args.id))?;
            if cli.json {
                print_json(product)?;
            } else {
                render_product_detail(product);
            }
            true
        }
        Commands::Add(args) => {
            dashboard.begin_add();
            let input = ProductInput {
                name: args.name,
                description: args.description,
                category: args.category,
                sku: args.sku,
                quantity: args.quantity,
                price: args.price,
            };
            dashboard.submit_product(&input).await.is_ok()
        }
        Commands::Edit(args) => handle_edit(&mut dashboard, args).await?,
        Commands::SetQty(args) => {
            if dashboard.state().find(args.id).is_none() {
                bail!("product {} not found", args.id);
            }
            dashboard
                .submit_quantity(args.id, args.quantity)
                .await
                .is_ok()
        }
        Commands::Delete(args) => match dashboard.delete(args.id).await {
            Ok(DeleteOutcome::Deleted) => true,
            Ok(DeleteOutcome::Cancelled) => {
                println!("Cancelled");
                true
            }
            Ok(DeleteOutcome::Unknown) => bail!("product {} not found", args.id),
            Err(_) => false,
        },
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn handle_list(dashboard: &mut CliDashboard, args: ListArgs, json: bool) -> Result<()> {
    let state = dashboard.state_mut();
    state.search_term = args.search;
    state.category_filter = args.category;
    state.apply_filters();

    if json {
        return print_json(&state.filtered_products);
    }
    if state.filtered_products.is_empty() {
        println!("No products found");
        return Ok(());
    }
    for product in &state.filtered_products {
        render_product_line(product);
    }
    Ok(())
}

#[derive(Serialize)]
struct StatsOutput {
    total_products: usize,
    total_items: i64,
    #[serde(with = "rust_decimal::serde::float")]
    total_value: Decimal,
    low_stock_count: usize,
    categories: Vec<String>,
}

fn handle_stats(dashboard: &CliDashboard, json: bool) -> Result<()> {
    let stats = dashboard.state().stats();
    let output = StatsOutput {
        total_products: stats.total_products,
        total_items: stats.total_items,
        total_value: stats.total_value,
        low_stock_count: stats.low_stock_count,
        categories: dashboard.state().categories(),
    };

    if json {
        return print_json(&output);
    }
    println!("Total products: {}", output.total_products);
    println!("Total items:    {}", output.total_items);
    println!("Total value:    {}", format_price(output.total_value));
    println!("Low stock:      {}", output.low_stock_count);
    if !output.categories.is_empty() {
        println!("Categories:     {}", output.categories.join(", "));
    }
    Ok(())
}

async fn handle_edit(dashboard: &mut CliDashboard, args: EditArgs) -> Result<bool> {
    let Some(mut input) = dashboard.begin_edit(args.id) else {
        bail!("product {} not found", args.id);
    };

    if let Some(name) = args.name {
        input.name = name;
    }
    if let Some(price) = args.price {
        input.price = price;
    }
    if let Some(quantity) = args.quantity {
        input.quantity = quantity;
    }
    if let Some(description) = args.description {
        input.description = description;
    }
    if let Some(category) = args.category {
        input.category = category;
    }
    if let Some(sku) = args.sku {
        input.sku = sku;
    }

    Ok(dashboard.submit_product(&input).await.is_ok())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn render_product_line(product: &Product) {
    let low = if product.quantity < LOW_STOCK_THRESHOLD {
        " (low)"
    } else {
        ""
    };
    let category = if product.category.is_empty() {
        String::new()
    } else {
        format!(" [{}]", product.category)
    };
    println!(
        "- #{} {}{} • qty {}{} • {}{}",
        product.id,
        product.name,
        category,
        product.quantity,
        low,
        format_price(product.price),
        product
            .sku
            .as_deref()
            .map(|sku| format!(" • SKU {sku}"))
            .unwrap_or_default()
    );
}

fn render_product_detail(product: &Product) {
    println!("Product #{}", product.id);
    println!("  Name:        {}", product.name);
    if !product.description.is_empty() {
        println!("  Description: {}", product.description);
    }
    if !product.category.is_empty() {
        println!("  Category:    {}", product.category);
    }
    if let Some(sku) = &product.sku {
        println!("  SKU:         {}", sku);
    }
    println!("  Quantity:    {}", product.quantity);
    println!("  Price:       {}", format_price(product.price));
    println!("  Created:     {}", product.created_at.to_rfc3339());
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw).map_err(|_| format!("invalid decimal '{raw}'"))
}
