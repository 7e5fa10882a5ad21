use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder, describe the series and publish the
    /// configured lookup TTL as a static gauge.
    pub fn init(lookup_ttl_secs: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new().install_recorder()?;

        describe_counter!("lookup_cache_hits_total", "Lookup cache hits by kind.");
        describe_counter!("lookup_cache_misses_total", "Lookup cache misses by kind.");
        describe_counter!(
            "lookup_negative_cached_total",
            "Empty lookup results stored as negative cache entries."
        );
        describe_counter!("sync_runs_total", "Sync runs started by kind.");
        describe_counter!(
            "sync_records_upserted_total",
            "Records upserted by sync runs."
        );
        describe_counter!(
            "sync_record_errors_total",
            "Records skipped because decode or upsert failed."
        );
        describe_counter!(
            "sync_page_errors_total",
            "Sync runs ended by a failed page fetch."
        );
        describe_counter!(
            "sync_auth_errors_total",
            "Sync runs ended because the upstream rejected the token."
        );
        describe_gauge!("sync_last_run_ts", "Unix ts when a sync run last finished.");
        describe_gauge!("lookup_cache_ttl_secs", "Configured positive lookup TTL.");

        gauge!("lookup_cache_ttl_secs").set(lookup_ttl_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
