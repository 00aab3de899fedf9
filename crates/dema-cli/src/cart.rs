//! `cart` command: the quote cart kept in a local JSON file.

use std::fmt;

use clap::Subcommand;
use dema_catalog::read_grouped;
use dema_core::{
    AppConfig, CartItem, CartStore, JsonFileCartStore, NewCartItem, QuoteCart, COMBINED_FILE_NAME,
};

/// Sub-commands available under `cart`.
#[derive(Debug, Subcommand)]
pub enum CartCommands {
    /// Add one unit of a product
    Add {
        sku: String,
        /// Display name; looked up in the combined catalog when omitted
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
    },
    /// Remove a product line
    Remove { sku: String },
    /// Set the quantity of a line; zero or less removes it
    Qty {
        sku: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Replace the notes of a line
    Notes { sku: String, notes: String },
    /// Show the cart
    List,
    /// Print the cart as quote request items (JSON)
    Export,
    /// Empty the cart
    Clear,
}

pub(crate) fn run_cart(config: &AppConfig, command: CartCommands) -> anyhow::Result<()> {
    let mut cart = QuoteCart::open(JsonFileCartStore::new(config.cart_path.clone()));

    match command {
        CartCommands::Add {
            sku,
            name,
            category,
            image_url,
        } => {
            let item = match name {
                Some(name) => NewCartItem {
                    sku,
                    name,
                    image_url,
                    category,
                },
                None => lookup_item(config, &sku, category, image_url)?,
            };
            let sku = item.sku.clone();
            if cart.add(item)? {
                println!("added {sku}; the quote cart is ready for review");
            } else {
                println!("added {sku}");
            }
        }
        CartCommands::Remove { sku } => cart.remove(&sku)?,
        CartCommands::Qty { sku, quantity } => cart.update_quantity(&sku, quantity)?,
        CartCommands::Notes { sku, notes } => cart.update_notes(&sku, notes)?,
        CartCommands::List => print!("{}", render_cart(&cart)),
        CartCommands::Export => {
            println!("{}", serde_json::to_string_pretty(&cart.to_quote_items())?);
        }
        CartCommands::Clear => cart.clear()?,
    }
    Ok(())
}

/// Build a cart item for `sku` from the combined grouped catalog.
fn lookup_item(
    config: &AppConfig,
    sku: &str,
    category: Option<String>,
    image_url: Option<String>,
) -> anyhow::Result<NewCartItem> {
    let path = config.catalog_output_dir.join(COMBINED_FILE_NAME);
    let groups = read_grouped(&path)?;
    let (group, variant) = groups
        .iter()
        .find_map(|g| g.variant(sku).map(|v| (g, v)))
        .ok_or_else(|| anyhow::anyhow!("SKU '{sku}' not found in {}; pass --name", path.display()))?;

    Ok(NewCartItem {
        sku: sku.to_string(),
        name: variant.label.clone().unwrap_or_else(|| group.name.clone()),
        image_url: image_url.or_else(|| group.main_image().map(|i| format!("/{i}"))),
        category: category.or_else(|| Some(group.category.clone())),
    })
}

struct CartListing<'a>(&'a [CartItem], u32);

impl fmt::Display for CartListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let CartListing(items, units) = *self;
        if items.is_empty() {
            return writeln!(f, "quote cart is empty");
        }
        for item in items {
            write!(f, "{:>4} × {:<20} {}", item.quantity, item.sku, item.name)?;
            if !item.notes.is_empty() {
                write!(f, "  ({})", item.notes)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{} lines, {units} units", items.len())
    }
}

pub(crate) fn render_cart<S: CartStore>(cart: &QuoteCart<S>) -> String {
    CartListing(cart.items(), cart.total_quantity()).to_string()
}
