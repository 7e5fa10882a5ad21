//! Spaceflight news API binary entrypoint.
//! Boots the Axum HTTP server and the daily launch/event sync.

use shuttle_axum::ShuttleAxum;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spaceflight_news_api::{build_app, metrics::Metrics, sync, AppConfig};

/// `RUST_LOG` filter (default `info`); `LOG_FORMAT=json` switches to JSON lines.
/// The runtime may already have installed a subscriber, in which case ours is
/// skipped.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let _ = if json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = AppConfig::load()?;
    let app = build_app(&cfg)?;

    let mut router = app.router;
    if cfg.metrics {
        let metrics = Metrics::init(cfg.cache.lookup_ttl_secs)?;
        router = router.merge(metrics.router());
    }

    if cfg.sync.enabled {
        let handle = sync::start_scheduler(app.worker.clone(), &cfg.schedule()).await?;
        // Keep the scheduler alive until shutdown.
        tokio::spawn(async move {
            let _ = tokio::signal::ctrl_c().await;
            handle.stop().await;
        });
    } else {
        info!("sync scheduler disabled");
    }

    Ok(router.into())
}
