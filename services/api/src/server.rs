use crate::cli::ServeArgs;
use crate::demo::seed_marketplace;
use crate::infra::{system_marketplace, AppState};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use creatorhub::config::AppConfig;
use creatorhub::error::AppError;
use creatorhub::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let marketplace = system_marketplace(&config.marketplace);
    if args.seed_demo {
        match seed_marketplace(&marketplace.lifecycle) {
            Ok(seeded) => info!(campaign_id = %seeded.campaign_id, "demo data seeded"),
            Err(err) => warn!(error = %err, "demo seeding failed, starting empty"),
        }
    }

    let app = with_marketplace_routes(marketplace)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        publish_on_create = config.marketplace.publish_on_create,
        enforce_influencer_cap = config.marketplace.enforce_influencer_cap,
        "marketplace api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
