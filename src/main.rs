//! Roastery Checkout - order checkout service

use anyhow::Result;
use roastery_checkout::config::AppConfig;
use roastery_checkout::publisher::{EventPublisher, NatsPublisher, NoopPublisher};
use roastery_checkout::store::PgStore;
use roastery_checkout::{http, CheckoutStores, OrderService};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = AppConfig::from_env()?;
    let store = PgStore::connect(&config.database_url, config.max_connections).await?;
    store.migrate().await?;

    let events: Arc<dyn EventPublisher> = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => Arc::new(NatsPublisher::new(client, config.nats_subject.clone())),
            Err(e) => {
                tracing::warn!(error = %e, "NATS unavailable, order events will not be published");
                Arc::new(NoopPublisher)
            }
        },
        None => Arc::new(NoopPublisher),
    };

    let service = OrderService::new(store.clone(), CheckoutStores::backed_by(store), config.checkout).with_publisher(events);
    let app = http::router(Arc::new(service));

    tracing::info!(port = config.port, deadline_ms = config.checkout.deadline.as_millis() as u64, aggregation = ?config.checkout.aggregation, "roastery-checkout listening");
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
