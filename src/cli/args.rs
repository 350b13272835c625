//! Clap argument types and CLI-flag config overrides.

use clap::Parser;
use std::path::PathBuf;

use presence_picker::config::Config;
use presence_picker::models::{ChartKind, IdField};

/// Pick a user from a presence analyzer and chart their presence.
#[derive(Parser, Debug)]
#[command(
    name = "presence-picker",
    version = presence_picker::constants::VERSION,
    about = super::ABOUT_STYLED,
)]
pub struct Cli {
    /// Config file to use instead of ./.presence-picker.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Users listing URL.
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Record field carrying the user id ("index" for array position).
    #[arg(long, global = true)]
    pub id_field: Option<IdField>,

    /// Log debug output to stderr.
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// List users from the users endpoint.
    Users,

    /// Show the chart for one user.
    Show(ShowArgs),

    /// Pick users interactively, one id per line on stdin.
    Pick(PickArgs),

    /// Print version information.
    Version,
}

/// Arguments for the `show` subcommand.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// User id, as listed by `users`.
    pub user: String,

    /// Chart to draw (presence_weekday, mean_time_weekday, presence_start_end).
    #[arg(long)]
    pub chart: Option<ChartKind>,
}

/// Arguments for the `pick` subcommand.
#[derive(Parser, Debug)]
pub struct PickArgs {
    /// Chart to draw (presence_weekday, mean_time_weekday, presence_start_end).
    #[arg(long)]
    pub chart: Option<ChartKind>,
}

impl Cli {
    /// Apply global flag overrides on top of the loaded config.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(ref endpoint) = self.endpoint {
            config.source.users_endpoint = endpoint.clone();
        }
        if let Some(ref field) = self.id_field {
            config.source.id_field = field.clone();
        }
        let chart = match &self.command {
            Command::Show(args) => args.chart,
            Command::Pick(args) => args.chart,
            Command::Users | Command::Version => None,
        };
        if let Some(kind) = chart {
            config.chart.kind = kind;
        }
    }
}
