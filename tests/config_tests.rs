//! Configuration loading from files and seeding routes into a database.

mod support;

use farewatch::domain::RouteId;
use farewatch::error::{ConfigError, Error};
use farewatch::infrastructure::bootstrap::Services;
use farewatch::infrastructure::config::Config;
use rust_decimal_macros::dec;
use support::TempDb;
use tokio_test::assert_ok;

const EXAMPLE: &str = include_str!("../config.example.toml");

#[test]
fn example_config_is_valid() {
    let config = Config::parse_toml(EXAMPLE).unwrap();
    assert_eq!(config.scheduler.interval_secs, 86_400);
    assert_eq!(config.alerts.jump_lookback_days, 3);

    let seeds = config.seed_routes().unwrap();
    assert_eq!(seeds.len(), 1);
    assert_eq!(seeds[0].id(), &RouteId::from_name("Paris to New York"));
    assert_eq!(seeds[0].price_limit(), Some(dec!(450)));
    assert_eq!(seeds[0].max_flight_hours(), 12);
}

#[test]
fn missing_file_is_a_read_error() {
    let db = TempDb::create();
    let result = Config::load(db.dir().join("absent.toml"));
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}

#[test]
fn invalid_seed_names_the_route() {
    let toml = r#"
[[routes]]
name = "Backwards"
origin = "CDG"
destination = "JFK"
start = "2025-05-31"
end = "2025-05-01"
min_days = 7
max_days = 14
"#;
    match Config::parse_toml(toml) {
        Err(Error::Config(ConfigError::InvalidRoute { name, .. })) => {
            assert_eq!(name, "Backwards");
        }
        other => panic!("expected invalid route, got {other:?}"),
    }
}

#[test]
fn out_of_range_values_are_rejected() {
    for (toml, field) in [
        ("[scheduler]\ninterval_secs = 0\n", "scheduler.interval_secs"),
        ("[alerts]\ndrop_threshold = 1.5\n", "alerts.drop_threshold"),
        ("[fetcher]\ntype = \"http\"\nurl = \"not a url\"\n", "fetcher.url"),
    ] {
        match Config::parse_toml(toml) {
            Err(Error::Config(ConfigError::InvalidValue { field: got, .. })) => {
                assert_eq!(got, field);
            }
            other => panic!("expected invalid {field}, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn seeding_adds_missing_routes_only() {
    let db = TempDb::create();
    let config = Config::parse_toml(EXAMPLE).unwrap();

    let services = Services::open(config.clone(), db.path().clone()).unwrap();
    assert_eq!(services.seed_routes().await.unwrap(), 1);
    assert_eq!(services.seed_routes().await.unwrap(), 0);

    let id = RouteId::from_name("Paris to New York");
    let edited = services
        .routes
        .require(&id)
        .await
        .unwrap()
        .with_price_limit(Some(dec!(400)))
        .unwrap();
    assert_ok!(services.routes.update(edited).await);
    drop(services);

    let services = Services::open(config, db.path().clone()).unwrap();
    assert_eq!(services.seed_routes().await.unwrap(), 0);
    assert_eq!(
        services.routes.require(&id).await.unwrap().price_limit(),
        Some(dec!(400))
    );
}
