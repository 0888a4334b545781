use std::sync::Arc;

use kirana_core::{FixedLocationResolver, IdentityStore, StaticIdentityStore};
use kirana_gateway::{Config, HttpDispatchGateway};
use kirana_lead::{OfferSession, SessionConfig};
use kirana_nearby::{PollerConfig, ProximityPoller};
use kirana_shared::MaskedPhone;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "kirana_agent=debug,kirana_lead=debug,kirana_nearby=debug,kirana_gateway=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().expect("Failed to load config");

    let identity = Arc::new(StaticIdentityStore::new(config.identity.stored_phone.clone()));
    let vendor = identity.identity_or_default();
    tracing::info!("starting kirana agent for vendor {}", MaskedPhone(&vendor));

    let gateway = Arc::new(HttpDispatchGateway::new(
        &config.gateway.base_url,
        config.gateway.timeout(),
    )?);

    // Optional proximity watch alongside the lead session
    let poller = match config.nearby.watch_term.as_deref() {
        Some(term) if !term.trim().is_empty() => {
            let resolver = FixedLocationResolver::new(config.nearby.default_origin());
            let poller = ProximityPoller::start(
                gateway.clone(),
                &resolver,
                PollerConfig {
                    poll_interval: config.nearby.poll_interval(),
                },
            )
            .await;
            poller.set_term(term);

            let mut results = poller.results();
            tokio::spawn(async move {
                while results.changed().await.is_ok() {
                    let hubs = results.borrow().clone();
                    tracing::info!("{} nearby hubs in view", hubs.len());
                }
            });
            Some(poller)
        }
        _ => None,
    };

    let session = OfferSession::new(
        gateway,
        vendor,
        SessionConfig {
            offer_window_seconds: config.leads.offer_window_seconds,
            ..Default::default()
        },
    );
    let outcome = session.spawn().join().await;
    tracing::info!("offer session finished: {:?}", outcome);

    if let Some(poller) = poller {
        poller.shutdown();
    }
    Ok(())
}
