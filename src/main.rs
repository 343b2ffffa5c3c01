mod config;
mod quiz;
mod storage;
mod web;

use std::sync::Arc;

use config::Config;
use dotenv::dotenv;
use quiz::{content::ContentStore, flow::QuizFlow};
use storage::{spawn_sweeper, InMemStorage};

type MainResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[tokio::main]
async fn main() {
    // `.env` is optional; the environment alone is enough
    let dotenv_loaded = dotenv().is_ok();

    pretty_env_logger::init();
    log::info!("Starting study quiz...");
    if !dotenv_loaded {
        log::debug!("No .env file found");
    }

    if let Err(err) = run().await {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

async fn run() -> MainResult {
    let config = Config::from_env()?;

    log::info!("Loading quiz content from {}", config.content_path.display());
    let content = ContentStore::open(&config.content_path)?;
    if content.is_empty() {
        log::warn!("No usable rows in {}", config.content_path.display());
    }
    log::info!(
        "Content loaded: {} items across {} subjects",
        content.len(),
        content.subjects().count()
    );

    let flow = Arc::new(QuizFlow::new(
        Arc::new(content),
        config.questions_per_attempt,
    ));
    let storage = Arc::new(InMemStorage::new(
        config.session_idle_timeout,
        config.max_sessions,
    ));
    spawn_sweeper(storage.clone(), config.session_idle_timeout / 2);
    let app = web::App::new(flow, storage);

    let (addr, server) = warp::serve(web::routes(app)).try_bind_with_graceful_shutdown(
        config.bind_addr,
        async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", err);
                std::future::pending::<()>().await;
            }
        },
    )?;
    log::info!("Listening on http://{}", addr);

    server.await;
    log::info!("Shutting down");
    Ok(())
}
