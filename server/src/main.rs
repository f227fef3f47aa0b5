use std::error::Error;

use env_logger::Env;
use hotel_server::{config::ServerConfig, AppState};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let state = AppState::new(&config)?;
    if let Some(admin) = &config.admin {
        let id = state.seed_admin(&admin.email, &admin.password).await?;
        log::info!("admin account {} ready (user {id})", admin.email);
    }

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    log::info!("listening on http://{addr}{}", hotel_server::API_PREFIX);

    let app = hotel_server::with_cors(hotel_server::app(state), &config.frontend_url);
    axum::serve(listener, app).await?;
    Ok(())
}
