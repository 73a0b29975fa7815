//! CLI argument definitions for livraria.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `connectivity` | Check that the courier API base URL is reachable |
//! | `login` | Configure the API URL and sign in |
//! | `logout` | Forget the stored session token |
//! | `test-login` | Log in with credentials and probe an authenticated endpoint |
//! | `quotes` | Request courier quotes for an order |
//! | `select` | Select one quote of the order's latest quote request |
//! | `label` | Create the expedition for the selected quote |
//! | `create` | One-shot expedition creation by selection policy |
//! | `auto-create` | Run unattended creation for an order |
//! | `order-status` | Change an order's status and run the status hook |
//! | `status` | Refresh the expedition status from tracking |
//! | `expedition` | Show the expedition stored on an order |
//! | `set-option` | Update an allow-listed option |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--home` | `$LIVRARIA_HOME` | Directory holding the store |
//! | `--orders` | none | JSON file with the orders to operate on |
//! | `-v` | warn | Increase log verbosity (repeatable) |
//!
//! # Examples
//!
//! ```bash
//! livraria login --url https://api.courier.test --username shop@example.com --password secret
//! livraria --orders orders.json quotes 1042 --pretty
//! livraria --orders orders.json select 1042 --quote-request qr-1 --quote q-2
//! livraria --orders orders.json label 1042
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "livraria",
    author,
    version,
    about = "Courier expedition orchestration for shop orders"
)]
pub struct Cli {
    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Directory holding the livraria store. Defaults to `$LIVRARIA_HOME`,
    /// else `~/.livraria`.
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// JSON file containing an array of orders. Notes and status changes are
    /// written back after the command.
    #[arg(long, global = true)]
    pub orders: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the configured base URL answers.
    Connectivity,

    /// Store the API URL and sign in.
    Login(LoginArgs),

    /// Forget the session token. The server is not contacted.
    Logout,

    /// Log in with the given credentials and confirm API access.
    TestLogin(CredentialArgs),

    /// Request courier quotes for an order.
    Quotes(CustomOrderArgs),

    /// Select a quote of the order's latest quote request.
    Select(SelectArgs),

    /// Create the expedition for the order's selected quote.
    Label(OrderArgs),

    /// Request quotes, pick one by policy and create the expedition.
    Create(CustomOrderArgs),

    /// Run unattended creation for an order.
    AutoCreate(OrderArgs),

    /// Set an order status and run the status-change hook.
    OrderStatus(OrderStatusArgs),

    /// Refresh the expedition status from tracking.
    Status(StatusArgs),

    /// Show the expedition stored on an order.
    Expedition(OrderArgs),

    /// Update an allow-listed option.
    SetOption(SetOptionArgs),
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Courier API base URL.
    #[arg(long)]
    pub url: String,

    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Do not store the credentials for silent re-login.
    #[arg(long, default_value_t = false)]
    pub no_remember: bool,
}

#[derive(Debug, Args)]
pub struct CredentialArgs {
    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct OrderArgs {
    pub order_id: u64,
}

#[derive(Debug, Args)]
pub struct CustomOrderArgs {
    pub order_id: u64,

    /// JSON file with custom packages, content, COD, insurance and delivery
    /// options.
    #[arg(long)]
    pub custom: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SelectArgs {
    pub order_id: u64,

    #[arg(long = "quote-request")]
    pub quote_request_id: String,

    #[arg(long = "quote")]
    pub quote_id: String,

    /// Sender profile to attach billing information from.
    #[arg(long = "sender-profile")]
    pub sender_profile_id: Option<String>,
}

#[derive(Debug, Args)]
pub struct OrderStatusArgs {
    pub order_id: u64,

    /// New order status, e.g. `completed`.
    pub status: String,
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    pub order_id: u64,

    /// Tracking number to look up instead of the stored AWB.
    #[arg(long)]
    pub awb: Option<String>,
}

#[derive(Debug, Args)]
pub struct SetOptionArgs {
    pub name: String,
    pub value: String,
}
