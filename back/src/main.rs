use std::sync::Arc;

use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use todo_back::{config::Args, store::TodoStore, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = args.settings()?;

    let store = TodoStore::connect(&settings.database_url).await?;
    store.migrate().await?;

    let app = todo_back::app(Arc::new(AppState::new(store)));
    let addr = settings.address();

    match &settings.tls {
        Some(tls) => {
            let config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;

            info!(%addr, "listening with tls");
            axum_server::bind_rustls(addr, config)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(%addr, "listening");
            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}
