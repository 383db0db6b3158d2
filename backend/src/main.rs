use anyhow::{anyhow, Result};
use channel_stats::build_rocket;
use channel_stats::config::{
    create_app_state, init_logger, load_environment, setup_collect_scheduler, AppConfig,
};
use chrono::Utc;
use log::info;

#[rocket::main]
async fn main() -> Result<()> {
    load_environment();
    init_logger();
    info!("Starting channel stats service...");

    let config = AppConfig::from_env()?;
    let state = create_app_state(&config)?;
    let collector = state.collector.clone();

    let _scheduler = setup_collect_scheduler(collector.clone(), &config.collect_schedule).await?;

    if config.collect_on_startup {
        tokio::spawn(async move {
            info!("Running initial collection...");
            collector.collect(Utc::now()).await;
        });
    }

    let figment = rocket::Config::figment().merge(("port", config.port));
    info!("Service starting on port {}", config.port);
    build_rocket(figment, state)
        .launch()
        .await
        .map_err(|e| anyhow!("server failed: {e}"))?;

    Ok(())
}
