use std::sync::Arc;

use leap::config::Config;
use leap::state::AppState;
use leap::store::FileStore;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(2);
        }
    };

    let state = Arc::new(AppState::new(FileStore::new(&config.data_dir)));
    let app = leap::app(state, &config.static_dir);

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("bind {} failed: {e}", config.addr);
            std::process::exit(1);
        }
    };

    log::info!("Server running at http://{}", config.addr);
    log::info!("Static files: {}", config.static_dir.display());
    log::info!("Data dir:     {}", config.data_dir.display());
    log::info!("API base:     http://{}/api", config.addr);

    if let Err(e) = axum::serve(listener, app).await {
        log::error!("server error: {e}");
        std::process::exit(1);
    }
}
