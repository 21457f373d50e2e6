#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use naver_oauth_server::auth::LoginFlow;
    use naver_oauth_server::handlers;
    use naver_oauth_server::models::{AppConfig, AppState};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let app_config = Arc::new(AppConfig::from_env()?);
    let login_flow = Arc::new(LoginFlow::new(&app_config)?);

    if !app_config.verify_state {
        tracing::warn!("OAUTH_STATE_VERIFY is off; callback state values are not checked");
    }

    let app_state = AppState {
        config: app_config.clone(),
        login_flow,
    };

    let app = handlers::router(app_state);

    let listener = tokio::net::TcpListener::bind(app_config.bind_addr).await?;
    tracing::info!("listening on http://{}", app_config.bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
