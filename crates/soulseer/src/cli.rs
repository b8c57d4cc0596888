//! Clap derive structures for the `soulseer` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// soulseer -- command-line client for the SoulSeer marketplace
#[derive(Debug, Parser)]
#[command(
    name = "soulseer",
    version,
    about = "Browse the SoulSeer marketplace, message readers, and manage payments",
    long_about = "A command-line client for the SoulSeer spiritual-reading marketplace.\n\n\
        Every command runs through the same client state layer the apps use:\n\
        session tokens are refreshed transparently and failures carry the\n\
        backend's own message.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "SOULSEER_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend URL (overrides profile)
    #[arg(long, env = "SOULSEER_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Session token (overrides keyring and profile)
    #[arg(long, env = "SOULSEER_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Stripe publishable key (overrides profile)
    #[arg(long, env = "SOULSEER_STRIPE_KEY", global = true, hide_env = true)]
    pub stripe_key: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SOULSEER_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Print the client state snapshot after the command
    #[arg(long, global = true)]
    pub state: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates (local development backends)
    #[arg(long, short = 'k', env = "SOULSEER_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (default: profile value, else 30)
    #[arg(long, env = "SOULSEER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in, log out, and inspect the session
    Auth(AuthArgs),

    /// Read and send messages, pay for paid messages
    #[command(alias = "msg", alias = "m")]
    Messages(MessagesArgs),

    /// Browse and manage marketplace products
    #[command(alias = "prod", alias = "p")]
    Products(ProductsArgs),

    /// Wallet deposits, reader payouts, checkout, saved cards
    #[command(alias = "pay")]
    Payments(PaymentsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Log in and store the session token in the system keyring
    Login {
        /// Account email (defaults to the profile's email)
        #[arg(long, short = 'e')]
        email: Option<String>,

        /// Read the password from this environment variable instead of prompting
        #[arg(long)]
        password_env: Option<String>,
    },

    /// End the session and forget the stored token
    Logout,

    /// Show whether a session token is available
    Status,
}

// ── Messages ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct MessagesArgs {
    #[command(subcommand)]
    pub command: MessagesCommand,
}

#[derive(Debug, Subcommand)]
pub enum MessagesCommand {
    /// List the messages of a conversation
    #[command(alias = "ls")]
    List {
        /// Conversation ID
        conversation: String,
    },

    /// Send a message
    Send {
        /// Recipient user ID
        #[arg(long)]
        to: String,

        /// Message text
        #[arg(long, short = 't')]
        text: String,

        /// Existing conversation ID
        #[arg(long, short = 'c')]
        conversation: Option<String>,
    },

    /// Pay for a paid message
    Pay {
        /// Message ID
        message: String,

        /// How to settle the payment
        #[arg(long, short = 'm', default_value = "wallet")]
        method: PayMethod,
    },

    /// Confirm a card payment with the backend after the SDK succeeded
    Confirm {
        /// Payment intent ID (`pi_...`)
        payment_intent: String,
    },

    /// Make a message paid or free
    Settings {
        /// Message ID
        message: String,

        /// Whether the message is paid
        #[arg(long)]
        paid: Option<bool>,

        /// Price in dollars
        #[arg(long)]
        price: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PayMethod {
    /// Debit the prepaid wallet
    Wallet,
    /// Card payment confirmed through Stripe
    Stripe,
}

// ── Products ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

/// Catalogue filters shared by `list` and `author`.
#[derive(Debug, Default, Args)]
pub struct ProductFilters {
    /// Product type (e.g. reading, course, physical)
    #[arg(long = "type")]
    pub product_type: Option<String>,

    /// Category name
    #[arg(long)]
    pub category: Option<String>,

    /// Free-text search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort order (e.g. price, -createdAt)
    #[arg(long)]
    pub sort: Option<String>,

    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u32>,

    /// Results per page
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List products
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filters: ProductFilters,

        /// Fetch every page, appending to the listing
        #[arg(long, short = 'a')]
        all: bool,
    },

    /// Show one product
    Get {
        /// Product ID
        id: String,
    },

    /// List featured products
    Featured,

    /// List product categories
    Categories,

    /// List a seller's products
    Author {
        /// Author user ID
        author: String,

        #[command(flatten)]
        filters: ProductFilters,
    },

    /// Products related to a product (same type and first category)
    Related {
        /// Product ID
        id: String,
    },

    /// Create a product
    Create {
        /// JSON file with the product fields
        #[arg(long, short = 'F')]
        from_file: Option<PathBuf>,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Update a product
    Update {
        /// Product ID
        id: String,

        /// JSON file with the fields to change
        #[arg(long, short = 'F')]
        from_file: Option<PathBuf>,

        #[command(flatten)]
        fields: ProductFields,
    },

    /// Delete a product
    #[command(alias = "rm")]
    Delete {
        /// Product ID
        id: String,
    },

    /// Toggle the featured flag (admin)
    Feature {
        /// Product ID
        id: String,
    },
}

#[derive(Debug, Default, Args)]
pub struct ProductFields {
    /// Title
    #[arg(long)]
    pub title: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Price in dollars
    #[arg(long)]
    pub price: Option<f64>,

    /// Product type
    #[arg(long = "kind")]
    pub product_type: Option<String>,

    /// Category (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Image URL
    #[arg(long)]
    pub image: Option<String>,
}

// ── Payments ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PaymentsArgs {
    #[command(subcommand)]
    pub command: PaymentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PaymentsCommand {
    /// Create a wallet deposit intent
    Deposit {
        /// Amount in dollars
        amount: f64,

        /// Confirm the deposit with the payment SDK right away
        #[arg(long)]
        confirm: bool,
    },

    /// Confirm a payment intent with its client secret
    ConfirmCard {
        /// Read the client secret from this environment variable instead of prompting
        #[arg(long)]
        secret_env: Option<String>,
    },

    /// Reader Connect account
    #[command(subcommand)]
    Reader(ReaderCommand),

    /// Start a hosted checkout for a product
    Checkout {
        /// Product ID
        product: String,

        /// Where Stripe sends the buyer after paying
        #[arg(long)]
        success_url: String,

        /// Where Stripe sends the buyer on cancel
        #[arg(long)]
        cancel_url: String,
    },

    /// Saved payment methods
    #[command(subcommand)]
    Methods(MethodsCommand),
}

#[derive(Debug, Subcommand)]
pub enum ReaderCommand {
    /// Create the caller's Connect account and print the onboarding link
    Create,

    /// Show Connect account details
    Show {
        /// Another user's ID (admin)
        #[arg(long)]
        user: Option<String>,
    },

    /// Pay out earnings
    Payout {
        /// Amount in dollars
        amount: f64,

        /// Another reader's ID (admin)
        #[arg(long)]
        reader: Option<String>,
    },

    /// Print an Express-dashboard login link
    LoginLink {
        /// Another user's ID (admin)
        #[arg(long)]
        user: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum MethodsCommand {
    /// List saved payment methods
    #[command(alias = "ls")]
    List,

    /// Add a card (number and CVC are prompted for)
    Add {
        /// Expiry month (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        exp_month: u32,

        /// Expiry year (four digits)
        #[arg(long)]
        exp_year: u32,
    },

    /// Remove a saved payment method
    #[command(alias = "rm")]
    Remove {
        /// Payment method ID (`pm_...`)
        id: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a profile value
    Set {
        /// Profile key (e.g. api_url, email, stripe_publishable_key)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a session token for the active profile in the system keyring
    SetToken,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
