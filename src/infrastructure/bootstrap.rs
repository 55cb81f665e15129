//! Infrastructure bootstrap helpers for runtime wiring.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::{TelegramConfig, TelegramNotifier};
use crate::adapter::outbound::fetcher::{CommandFetcher, HttpFetcher};
use crate::adapter::outbound::resolver::{AirportCatalog, CatalogResolver, LiteralResolver};
use crate::adapter::outbound::sqlite::database::connection::open;
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::application::alert::AlertPolicy;
use crate::application::history::HistoryService;
use crate::application::route::RouteService;
use crate::application::scheduler::Scheduler;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::fetcher::{FetcherConfig, API_KEY_ENV};
use crate::infrastructure::config::resolver::ResolverConfig;
use crate::infrastructure::config::settings::Config;
use crate::port::{AirportResolver, LogNotifier, Notifier, NotifierRegistry, PriceFetcher};

/// Open (and migrate) the SQLite store, creating the parent directory.
///
/// # Errors
/// Returns an error if the directory or database cannot be created.
pub fn open_store(path: &Path) -> Result<SqliteStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let pool = open(&path.to_string_lossy())?;
    info!(path = %path.display(), "Opened price database");
    Ok(SqliteStore::new(pool))
}

/// Build the airport resolver: a catalog when configured, literal otherwise.
///
/// # Errors
/// Returns an error if the catalog files cannot be read.
pub fn build_resolver(config: &ResolverConfig) -> Result<Arc<dyn AirportResolver>> {
    match config.catalog_paths() {
        Some((airports, countries)) => {
            let catalog = AirportCatalog::load(airports, countries)?;
            info!(airports = catalog.len(), "Airport catalog loaded");
            Ok(Arc::new(
                CatalogResolver::new(catalog).with_train_speed(config.train_speed_kmh),
            ))
        }
        None => Ok(Arc::new(LiteralResolver)),
    }
}

/// Build the configured price fetcher.
///
/// # Errors
/// Returns [`ConfigError::MissingField`] when no fetcher is configured.
pub fn build_fetcher(config: Option<&FetcherConfig>) -> Result<Arc<dyn PriceFetcher>> {
    match config {
        Some(FetcherConfig::Command { program, args }) => {
            Ok(Arc::new(CommandFetcher::new(program, args.clone())))
        }
        Some(FetcherConfig::Http { url }) => {
            let url = Url::parse(url)?;
            let api_key = std::env::var(API_KEY_ENV).ok();
            Ok(Arc::new(HttpFetcher::new(url).with_api_key(api_key)))
        }
        None => Err(ConfigError::MissingField { field: "fetcher" }.into()),
    }
}

/// Build notifier registry from configuration.
#[cfg(feature = "telegram")]
pub fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));

    if config.telegram.enabled {
        if let Some(tg_config) = TelegramConfig::from_env() {
            let tg_config = tg_config.with_min_severity(config.telegram.min_severity);
            registry.register(Box::new(TelegramNotifier::new(tg_config)));
            info!("Telegram notifier enabled");
        } else {
            warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    registry
}

/// Build notifier registry from configuration (non-telegram variant).
#[cfg(not(feature = "telegram"))]
pub fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));
    if config.telegram.enabled {
        warn!("Telegram enabled in config but the binary was built without the telegram feature");
    }
    registry
}

/// The wired application: store, services, and optionally a scheduler.
pub struct Services {
    pub config: Config,
    pub database: PathBuf,
    pub store: Arc<SqliteStore>,
    pub history: Arc<HistoryService>,
    pub routes: RouteService,
    pub scheduler: Option<Arc<Scheduler>>,
}

impl Services {
    /// Open the database and build the route and history services.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened.
    pub fn open(config: Config, database: PathBuf) -> Result<Self> {
        let store = Arc::new(open_store(&database)?);
        let history = Arc::new(HistoryService::new(
            store.clone(),
            config.history.same_day,
        ));
        let routes = RouteService::new(store.clone(), history.clone());
        Ok(Self {
            config,
            database,
            store,
            history,
            routes,
            scheduler: None,
        })
    }

    /// Attach a scheduler built from the configured fetcher, resolver, and
    /// notifiers. Route changes made through [`Services::routes`] are
    /// mirrored into it from now on.
    ///
    /// # Errors
    /// Returns an error if no fetcher is configured or the catalog fails
    /// to load.
    pub fn with_scheduler(mut self) -> Result<Self> {
        let fetcher = build_fetcher(self.config.fetcher.as_ref())?;
        let resolver = build_resolver(&self.config.resolver)?;
        let notifier: Arc<dyn Notifier> = Arc::new(build_notifier_registry(&self.config));
        let scheduler = Arc::new(Scheduler::new(
            self.config.scheduler.clone(),
            fetcher,
            resolver,
            self.store.clone(),
            self.history.clone(),
            AlertPolicy::new(self.config.alerts.clone()),
            notifier,
        ));
        self.routes = RouteService::new(self.store.clone(), self.history.clone())
            .with_scheduler(scheduler.clone());
        self.scheduler = Some(scheduler);
        Ok(self)
    }

    /// Save configured seed routes that are not stored yet.
    ///
    /// Returns how many were added. Stored routes win over seeds, so edits
    /// made through the CLI survive a restart.
    ///
    /// # Errors
    /// Returns an error if a seed is invalid or the store fails.
    pub async fn seed_routes(&self) -> Result<usize> {
        let mut added = 0;
        for route in self.config.seed_routes()? {
            if self.routes.get(route.id()).await?.is_none() {
                self.routes.add(route).await?;
                added += 1;
            }
        }
        Ok(added)
    }

    /// Hand every stored route to the scheduler. Returns the route count.
    ///
    /// # Errors
    /// Returns an error if the store cannot list routes.
    pub async fn watch_stored_routes(&self) -> Result<usize> {
        let routes = self.routes.list().await?;
        let count = routes.len();
        if let Some(scheduler) = &self.scheduler {
            for route in routes {
                scheduler.watch(route);
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn literal_resolver_without_catalog() {
        let resolver = build_resolver(&ResolverConfig::default()).unwrap();
        let set = "country:FR".parse().unwrap();
        assert!(matches!(resolver.resolve(&set), Err(Error::Resolution(_))));
    }

    #[test]
    fn missing_fetcher_is_a_config_error() {
        assert!(matches!(
            build_fetcher(None),
            Err(Error::Config(ConfigError::MissingField { field: "fetcher" }))
        ));
    }

    #[test]
    fn fetcher_from_config() {
        let http = FetcherConfig::Http {
            url: "https://fares.example.com/cheapest".into(),
        };
        assert_eq!(build_fetcher(Some(&http)).unwrap().name(), "http");

        let command = FetcherConfig::Command {
            program: "scraper".into(),
            args: vec![],
        };
        assert_eq!(build_fetcher(Some(&command)).unwrap().name(), "command");
    }

    #[test]
    fn registry_always_logs() {
        let registry = build_notifier_registry(&Config::default());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn seeds_are_added_once_and_watched() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::parse_toml(
            r#"
            [fetcher]
            type = "command"
            program = "true"

            [[routes]]
            name = "Paris to NYC"
            origin = "CDG"
            destination = "JFK"
            start = "2025-05-01"
            end = "2025-05-31"
            min_days = 7
            max_days = 14
            "#,
        )
        .unwrap();

        let services = Services::open(config.clone(), dir.path().join("db/farewatch.db"))
            .unwrap()
            .with_scheduler()
            .unwrap();
        assert_eq!(services.seed_routes().await.unwrap(), 1);
        assert_eq!(services.seed_routes().await.unwrap(), 0);
        assert_eq!(services.watch_stored_routes().await.unwrap(), 1);

        let scheduler = services.scheduler.as_ref().unwrap();
        assert_eq!(scheduler.snapshot()[0].route_name, "Paris to NYC");
    }
}
