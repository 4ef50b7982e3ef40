use log::{error, info};
use service::{config::Config, logging::Logger};

#[tokio::main]
async fn main() {
    let config = Config::new();
    Logger::init_logger(&config as &Config);

    info!("Starting momentum_rs [{}]...", config.runtime_env());

    if let Err(e) = web::init_server(config).await {
        error!("Server failed to start: {e}");
        std::process::exit(1);
    }
}
