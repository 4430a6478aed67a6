use server::config::RelayConfig;
use server::{app, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RelayConfig::from_env().expect("invalid relay configuration");
    let state = AppState::new(config.channel_capacity);
    let app = app(state, &config.static_root);

    info!(
        "location relay listening on http://{} (static root {})",
        config.addr,
        config.static_root.display()
    );
    axum::serve(tokio::net::TcpListener::bind(config.addr).await.unwrap(), app)
        .await
        .unwrap();
}
