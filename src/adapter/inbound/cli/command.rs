//! Command-line interface definitions.
//!
//! Defines the CLI structure for farewatch using `clap`: a long-running
//! `run` command plus one-shot commands for managing routes and reading
//! price history.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use super::paths;
use crate::domain::AirportSet;

/// Flight fare watcher
#[derive(Parser, Debug)]
#[command(name = "farewatch")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Path to the SQLite database (overrides the config file)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Poll every route until interrupted
    Run(RunArgs),

    /// Manage tracked routes
    #[command(subcommand)]
    Route(RouteCommand),

    /// Show the price history of a route
    History(HistoryArgs),

    /// Show the best price ever recorded for a route
    Best(RouteArg),

    /// Import a legacy flight_records.jsonl file into a route's history
    Import(ImportArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),

    /// Print the search link for a route's best recorded flight
    Link(RouteArg),
}

/// Arguments for `farewatch run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Check every route once and exit
    #[arg(long)]
    pub once: bool,
}

/// Subcommands for `farewatch route`.
#[derive(Subcommand, Debug)]
pub enum RouteCommand {
    /// Add a route to watch
    Add(Box<RouteAddArgs>),
    /// List tracked routes
    List,
    /// Show one route with its best price
    Show(RouteArg),
    /// Stop tracking a route and delete its history
    Remove(RouteArg),
}

/// Subcommands for `farewatch check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate the configuration file
    Config,
}

/// A route id argument.
#[derive(Args, Debug)]
pub struct RouteArg {
    /// Route id
    pub route: String,
}

/// Arguments for `farewatch route add`.
#[derive(Args, Debug)]
pub struct RouteAddArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Route id (derived from the name when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Origin airports: CDG,ORY | country:France | city:Lyon@120
    #[arg(long)]
    pub origin: AirportSet,

    /// Destination airports, same forms as --origin
    #[arg(long)]
    pub destination: AirportSet,

    /// First possible departure date (YYYY-MM-DD)
    #[arg(long)]
    pub start: NaiveDate,

    /// Last possible return date (YYYY-MM-DD)
    #[arg(long)]
    pub end: NaiveDate,

    /// Shortest stay in days
    #[arg(long)]
    pub min_days: u32,

    /// Longest stay in days
    #[arg(long)]
    pub max_days: u32,

    /// Longest acceptable flight in hours
    #[arg(long)]
    pub max_flight_hours: Option<u32>,

    /// Alert when the price is at or under this amount
    #[arg(long)]
    pub price_limit: Option<Decimal>,
}

/// Arguments for `farewatch history`.
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Route id
    pub route: String,

    /// Only show the most recent N days
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for `farewatch import`.
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Route id
    pub route: String,

    /// Path to the JSON lines file
    pub file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_route_add() {
        let cli = Cli::try_parse_from([
            "farewatch",
            "--json",
            "route",
            "add",
            "--name",
            "Paris to Tokyo",
            "--origin",
            "CDG,ORY",
            "--destination",
            "country:Japan",
            "--start",
            "2025-05-01",
            "--end",
            "2025-05-31",
            "--min-days",
            "7",
            "--max-days",
            "14",
            "--price-limit",
            "650",
        ])
        .unwrap();

        assert!(cli.json);
        let Commands::Route(RouteCommand::Add(args)) = cli.command else {
            panic!("expected route add");
        };
        assert_eq!(args.origin.to_string(), "CDG,ORY");
        assert_eq!(args.destination.to_string(), "country:Japan");
        assert_eq!(args.price_limit, Some(Decimal::from(650)));
    }

    #[test]
    fn rejects_bad_airport_set() {
        let result = Cli::try_parse_from([
            "farewatch", "route", "add", "--name", "x", "--origin", "PARIS", "--destination",
            "JFK", "--start", "2025-05-01", "--end", "2025-05-31", "--min-days", "1",
            "--max-days", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["farewatch", "history", "paris-tokyo", "-q", "--limit", "5"])
            .unwrap();
        assert!(cli.quiet);
        let Commands::History(args) = cli.command else {
            panic!("expected history");
        };
        assert_eq!(args.limit, Some(5));
    }
}
