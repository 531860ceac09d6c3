//! Run the pipeline once against the live API.
//!
//! Run with: cargo run -p orchestrator --example run_pipeline -- explain "some text"
//!
//! Configuration via .env file or environment variables:
//!   KIMI_API_KEY  - Moonshot API key (required)
//!   KIMI_API_URL  - API URL (default: https://api.moonshot.cn/v1)

use std::env;

use orchestrator::{Action, ContentPayload, Orchestrator};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("orchestrator=info".parse()?))
        .init();

    let mut args = env::args().skip(1);
    let action: Action = args
        .next()
        .ok_or("usage: run_pipeline <action> <text>")?
        .parse()?;
    let text = args.collect::<Vec<_>>().join(" ");

    let orchestrator = Orchestrator::from_env()?;
    println!("Light model: {}", orchestrator.config().light_profile.model_name);
    println!("Heavy model: {}", orchestrator.config().heavy_profile.model_name);

    let result = orchestrator
        .execute(ContentPayload::text(text), action, None)
        .await;

    println!("=== {} ===", action);
    println!("{}", result);

    Ok(())
}
