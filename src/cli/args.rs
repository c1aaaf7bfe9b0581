use clap::{Parser, Subcommand};

use crate::catalog::SortOrder;

/// antiqkart - browse the handicraft catalog and manage your wishlist
#[derive(Parser)]
#[command(name = "antiqkart")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print listings as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory for configuration and the saved cart. Defaults to ~/.antiqkart
    #[arg(long, global = true, env = "ANTIQKART_DATA_DIR")]
    pub data_dir: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Save the catalog backend URL and public key
    Configure {
        /// Backend project URL (prompted if absent)
        #[arg(long)]
        api_url: Option<String>,

        /// Public anonymous key (prompted if absent)
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Show configuration and cart status
    Status,
    /// Remove the saved backend configuration
    Reset {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage the wishlist cart
    Cart {
        #[command(subcommand)]
        action: Option<CartCommand>,
    },
    /// Search products, states and collections
    Search {
        /// Search terms
        #[arg(required = true)]
        query: Vec<String>,

        /// Use the backend's full-text search instead of local ranking
        #[arg(long)]
        remote: bool,
    },
    /// List catalog products
    Products {
        /// Collection name or slug
        #[arg(short, long)]
        collection: Option<String>,

        /// State name or slug
        #[arg(short, long)]
        region: Option<String>,

        /// Only GI-tagged products
        #[arg(long)]
        gi_tagged: bool,

        /// Sort order
        #[arg(short, long, value_enum, default_value_t = SortOrder::Newest)]
        sort: SortOrder,

        /// Keep products whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,

        /// Maximum number of products fetched
        #[arg(short, long)]
        limit: Option<usize>,

        /// Group the listing by collection
        #[arg(short, long)]
        grouped: bool,
    },
    /// List festivals, or the products featured for one
    Festivals {
        /// Festival slug
        slug: Option<String>,
    },
    /// Show the page behind a storefront path, e.g. /states/rajasthan
    Open {
        /// Storefront path
        path: String,
    },
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show cart items, most recently added first
    List,
    /// Add a product to the cart
    Add {
        product_id: String,
    },
    /// Remove a product from the cart
    Remove {
        product_id: String,
    },
}
