mod api;
mod middleware;

use std::sync::Arc;

use showcount_core::AppConfig;
use showcount_geocode::GoogleGeocoder;
use showcount_llm::{AnthropicClient, ClaudeDateNormalizer, ClaudeShowExtractor};
use showcount_resolver::{Pipeline, PipelineConfig};
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState, Upstreams};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = showcount_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting showcount-server");

    let pool_config = showcount_db::PoolConfig::from_app_config(&config);
    let pool = showcount_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = showcount_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations complete");

    let (pipeline, upstreams) = build_pipeline(&config, &pool)?;
    let app = build_app(
        AppState {
            pool,
            pipeline,
            upstreams,
        },
        config.max_upload_bytes,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

fn build_pipeline(config: &AppConfig, pool: &PgPool) -> anyhow::Result<(Pipeline, Upstreams)> {
    let llm = Arc::new(
        AnthropicClient::with_base_url(
            config.anthropic_api_key.as_deref(),
            &config.anthropic_base_url,
            config.llm_timeout_secs,
        )?
        .with_retry(config.llm_max_retries, config.llm_retry_backoff_base_ms),
    );

    let geocoder =
        GoogleGeocoder::new(config.google_maps_api_key.as_deref(), config.geocode_timeout_secs)?;
    let upstreams = Upstreams {
        extraction: config.anthropic_api_key.is_some(),
        geocoding: geocoder.is_enabled(),
    };
    if !upstreams.extraction {
        tracing::warn!("ANTHROPIC_API_KEY not set; parse requests will fail at extraction");
    }
    if !upstreams.geocoding {
        tracing::warn!("GOOGLE_MAPS_API_KEY not set; new venues will not be geocoded");
    }

    let pipeline = Pipeline::new(
        Arc::new(ClaudeShowExtractor::new(
            Arc::clone(&llm),
            config.extraction_model.clone(),
        )),
        Arc::new(ClaudeDateNormalizer::new(llm, config.date_model.clone())),
        Arc::new(showcount_db::PgCatalogStore::new(pool.clone())),
        Arc::new(geocoder),
        PipelineConfig::from_app_config(config),
    );
    Ok((pipeline, upstreams))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
