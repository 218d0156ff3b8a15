use clinicdesk::config::AppConfig;

#[tokio::main]
async fn main() {
    clinicdesk::init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = clinicdesk::run(config).await {
        tracing::error!("ClinicDesk exited: {e}");
        std::process::exit(1);
    }
}
