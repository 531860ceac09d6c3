//! Upload a file for extraction and print the extracted text.
//!
//! Run with: cargo run -p kimi-client --example test_extract -- path/to/file.pdf
//!
//! Make sure to set environment variables in .env:
//!   KIMI_API_KEY - Moonshot API key for authentication

use std::env;
use std::path::PathBuf;

use kimi_client::{ExtractionService, KimiClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or("usage: test_extract <file>")?;

    let client = KimiClient::from_env()?;
    println!("API URL: {}", client.config().api_url);

    let file = client.upload(&path).await?;
    println!("Uploaded {} as {} ({} bytes)", file.filename, file.remote_id, file.bytes);

    let text = client.extracted_text(&file).await?;
    println!("=== Extracted ===");
    println!("{}", text);
    println!("=================");

    client.delete(&file).await?;
    println!("Remote file deleted");

    Ok(())
}
