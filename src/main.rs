use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pethub_client::{
    app,
    auth::{store::SessionStore, SessionContext},
    config::settings::Settings,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;

    let session = SessionContext::restore(SessionStore::new(&settings.session_dir))?;
    info!(
        "session restored (signed in: {}, active profile: {:?})",
        session.is_signed_in(),
        session.active_profile()
    );

    let app_state = AppState::new(&settings, session)?;
    let app = app(app_state);

    info!("Server running on http://localhost:{}", settings.port);

    let listener = tokio::net::TcpListener::bind(settings.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
