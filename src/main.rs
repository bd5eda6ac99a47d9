use dockwatch::monitor::SystemClock;
use dockwatch::notify::TelegramNotifier;
use dockwatch::runtime::DockerStatusSource;
use dockwatch::startup::{self, StartupError};

#[tokio::main]
async fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        log::error!("{e}");
    }
}

async fn run() -> Result<(), StartupError> {
    // A missing .env file is not an error
    let _ = dotenv::dotenv();

    let scheduler = startup::prepare(
        |key| std::env::var(key).ok(),
        |config| {
            let source = DockerStatusSource::connect()?;
            let notifier = TelegramNotifier::new(&config.telegram)?;
            Ok((source, notifier))
        },
        SystemClock,
    )
    .await?;

    scheduler.run().await;
    Ok(())
}
