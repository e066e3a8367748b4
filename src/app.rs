use crate::app_state::AppState;
use crate::config::CartographConfig;
use crate::error::{Context, Result};
use crate::health::HealthProber;
use crate::layout::{FileLayoutStore, LayoutStore};
use crate::presenter::PresenterServer;
use crate::service::TopologyService;
use crate::upstream::RouteCatalogClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

pub struct TopologyApp {
    state: AppState,
    presenter: PresenterServer,
    refresh_interval: Option<Duration>,
    shutdown: tokio_util::sync::CancellationToken,
}

impl TopologyApp {
    pub fn initialise(config: CartographConfig) -> Result<Self> {
        let catalog = RouteCatalogClient::new(&config.upstream.base_url).with_context(|| {
            format!("invalid upstream base url {}", config.upstream.base_url)
        })?;
        let prober = HealthProber::new();
        let layout: Arc<dyn LayoutStore> = Arc::new(FileLayoutStore::new(&config.layout.path));
        let service = TopologyService::new(catalog, prober, layout);

        let presenter = PresenterServer::build(&config.presenter)
            .context("failed to construct presenter server")?;

        tracing::info!(
            upstream = config.upstream.base_url.as_str(),
            layout_path = config.layout.path.as_str(),
            "cartograph initialised"
        );

        Ok(Self {
            state: AppState { service },
            presenter,
            refresh_interval: config.refresh.interval_secs.map(Duration::from_secs),
            shutdown: tokio_util::sync::CancellationToken::new(),
        })
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            state,
            presenter,
            refresh_interval,
            shutdown,
        } = self;

        let generation = state.service.spawn_refresh();
        tracing::info!(generation, "initial topology refresh started");

        let server_state = state.clone();
        let server_shutdown = shutdown.clone();
        let mut presenter_task =
            tokio::spawn(async move { presenter.serve(server_state, server_shutdown).await });

        if let Some(interval) = refresh_interval {
            let service = state.service.clone();
            let token = shutdown.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = sleep(interval) => {
                            let generation = service.spawn_refresh();
                            tracing::debug!(generation, "scheduled topology refresh started");
                        }
                    }
                }
            });
        }

        tracing::info!("cartograph service ready; press Ctrl+C to stop");

        tokio::select! {
            res = &mut presenter_task => {
                tracing::warn!("presenter server task terminated unexpectedly");
                return match res {
                    Ok(result) => result,
                    Err(join_err) => Err(join_err.into()),
                };
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown signal received");
            }
        }

        shutdown.cancel();
        match presenter_task.await {
            Ok(result) => result,
            Err(join_err) => Err(join_err.into()),
        }
    }
}
