use mock_server::{Account, DEFAULT_API_KEY, DEFAULT_APP_KEY};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let api_key = std::env::var("PINGFM_API_KEY").unwrap_or_else(|_| DEFAULT_API_KEY.to_string());
    let app_key =
        std::env::var("PINGFM_USER_APP_KEY").unwrap_or_else(|_| DEFAULT_APP_KEY.to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, "listening; base url http://{addr}/v1");
    mock_server::run_with(listener, Account::demo(&api_key, &app_key)).await
}
