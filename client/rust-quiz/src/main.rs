use anyhow::{bail, Context};
use langquest_client::{
    config::Config, metrics, services::HttpQuizBackend, terminal, QuizSessionMachine,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: langquest quiz <level-id> | langquest hangman";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the game on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "langquest_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(
        "Configuration loaded for environment: {:?}",
        std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string())
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut lines = terminal::stdin_lines();

    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        ["quiz", level_id] => {
            let backend = HttpQuizBackend::new(&config).context("Failed to build quiz API client")?;
            tracing::info!("Using quiz API at {}", config.api_base_url);
            let machine = QuizSessionMachine::new(Arc::new(backend));
            terminal::quiz::run(&machine, level_id, &mut lines).await?;
        }
        ["hangman"] => terminal::hangman::run(&mut lines).await?,
        _ => bail!(USAGE),
    }

    if config.print_metrics {
        print!("{}", metrics::render_metrics()?);
    }

    Ok(())
}
