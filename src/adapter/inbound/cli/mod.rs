//! Command-line adapter.
//!
//! [`execute`] loads the configuration, installs logging, and dispatches
//! to one handler module per subcommand.

pub mod check;
pub mod command;
pub mod diagnostic;
pub mod history;
pub mod import;
pub mod link;
pub mod output;
pub mod paths;
pub mod route;
pub mod run;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use command::{CheckCommand, Cli, Commands, RouteCommand};
use output::OutputConfig;

use crate::domain::RouteId;
use crate::error::{ConfigError, Result};
use crate::infrastructure::bootstrap::Services;
use crate::infrastructure::config::Config;

/// Run one CLI invocation.
///
/// # Errors
///
/// Returns a rendered report; configuration errors point into the file.
pub async fn execute(cli: Cli) -> miette::Result<()> {
    output::configure(
        OutputConfig::new(cli.json, cli.quiet, cli.verbose),
        &cli.color,
    );

    let name = cli.config.display().to_string();
    let content = read_config(&cli.config).map_err(|e| diagnostic::report(e, None))?;
    let source = content.as_deref().map(|text| (name.as_str(), text));

    let config = match content.as_deref() {
        Some(text) => Config::parse_toml(text).map_err(|e| diagnostic::report(e, source))?,
        None => Config::default(),
    };
    init_logging(&cli, &config);

    dispatch(cli, config, content.is_some())
        .await
        .map_err(|e| diagnostic::report(e, source))
}

/// Read the config file. A missing file at the default location means
/// "use defaults"; a missing file that was asked for is an error.
fn read_config(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound && path == paths::default_config() => Ok(None),
        Err(e) => Err(ConfigError::ReadFile(e).into()),
    }
}

fn init_logging(cli: &Cli, config: &Config) {
    let mut logging = config.logging.clone();
    // One-shot commands only log problems unless asked for more.
    if !matches!(cli.command, Commands::Run(_)) && cli.verbose == 0 {
        logging.level = "warn".into();
    }
    logging.with_verbosity(cli.verbose).with_json(cli.json).init();
}

/// Database path: `--database`, then `[database] path`, then the default.
fn database_path(cli: &Cli, config: &Config) -> PathBuf {
    cli.database
        .clone()
        .or_else(|| config.database.path.clone())
        .unwrap_or_else(paths::default_database)
}

async fn dispatch(cli: Cli, config: Config, config_found: bool) -> Result<()> {
    if let Commands::Check(CheckCommand::Config) = &cli.command {
        check::execute_config(&cli.config, config_found, &config);
        return Ok(());
    }

    let database = database_path(&cli, &config);
    let services = Services::open(config, database)?;

    match cli.command {
        Commands::Run(args) => run::execute(&args, services).await,
        Commands::Route(RouteCommand::Add(args)) => route::add(&services, *args).await,
        Commands::Route(RouteCommand::List) => route::list(&services).await,
        Commands::Route(RouteCommand::Show(arg)) => {
            route::show(&services, &RouteId::new(arg.route)).await
        }
        Commands::Route(RouteCommand::Remove(arg)) => {
            route::remove(&services, &RouteId::new(arg.route)).await
        }
        Commands::History(args) => history::execute(&services, &args).await,
        Commands::Best(arg) => history::best(&services, &RouteId::new(arg.route)).await,
        Commands::Import(args) => import::execute(&services, &args).await,
        Commands::Link(arg) => link::execute(&services, &RouteId::new(arg.route)).await,
        Commands::Check(CheckCommand::Config) => Ok(()),
    }
}
