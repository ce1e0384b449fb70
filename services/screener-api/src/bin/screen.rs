//! One-shot CLI runner: `screen <strategy> [top_n] [limit]`.
//!
//! Runs the same pipeline as the HTTP service and prints the shaped
//! records as pretty JSON on stdout.

use std::sync::Arc;
use tracing::Level;

use screener_api::screen::{run_screen, ScreenParams, Strategy};
use screener_api::{config::Settings, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean JSON
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let strategy = match args.next().as_deref().map(str::parse::<Strategy>) {
        Some(Ok(strategy)) => strategy,
        _ => {
            let names: Vec<&str> = Strategy::ALL.iter().map(|s| s.name()).collect();
            eprintln!("Usage: screen <strategy> [top_n] [limit]");
            eprintln!("Strategies: {}", names.join(", "));
            std::process::exit(2);
        }
    };

    let settings = Settings::from_env();
    let state = Arc::new(AppState::from_settings(&settings));

    let mut params = ScreenParams::defaults_for(strategy);
    if let Some(top_n) = args.next().and_then(|v| v.parse().ok()) {
        params.top_n = top_n;
    }
    if let Some(limit) = args.next().and_then(|v| v.parse().ok()) {
        params.limit = limit;
    }

    let records = run_screen(&state, strategy, params).await;
    println!("{}", serde_json::to_string_pretty(&records)?);

    Ok(())
}
