use clap::Parser;
use snowterm::{config, Args, CardConfig, ScenarioOutcome};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    config::init_logging(&args)?;
    let card = CardConfig::try_from(&args)?;
    info!(?card, "starting card");

    let outcome = snowterm::app::run(card).await;

    // Ensure terminal is in a good state before exiting
    use std::io::{self, Write};
    let _ = io::stderr().flush();
    let _ = io::stdout().flush();

    match outcome? {
        Some(ScenarioOutcome::Completed) => println!("С наступающим! ❄️"),
        Some(ScenarioOutcome::LockedOut) => println!("⛔ Доступ запрещён"),
        None => {}
    }
    Ok(())
}
