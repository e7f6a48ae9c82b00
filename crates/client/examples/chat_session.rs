//! Example: A chat session that survives credential expiry
//!
//! This example builds a client from environment variables and performs a
//! few requests. If the session expires mid-run, the refresh-and-replay
//! machinery handles it without the calling code noticing.
//!
//! # Setup
//!
//! 1. Point the client at a Colloquy deployment: ```bash export
//!    COLLOQUY_BASE_URL=https://chat.example.com/api ```
//!
//! 2. Optionally set an API key: ```bash export COLLOQUY_API_KEY=... ```
//!
//! 3. Run this example: ```bash cargo run --example chat_session -p
//!    colloquy-client ```

use colloquy_client::{ClientConfig, ColloquyClient, TracingNavigator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    println!("Colloquy Chat Session Example");
    println!("=============================\n");

    // Example 1: Load configuration (environment first, file fallback)
    let config = match ClientConfig::load() {
        Ok(config) => {
            println!("✓ Configuration loaded");
            println!("  Base URL:   {}", config.base_url);
            println!("  Refresh at: {}", config.refresh_path);
            println!("  Login at:   {}\n", config.login_destination);
            config
        }
        Err(e) => {
            println!("ℹ️  No configuration found ({})", e);
            println!("   To use: export COLLOQUY_BASE_URL=https://chat.example.com/api\n");
            return Ok(());
        }
    };

    // Example 2: Build the client with a navigator that logs redirects
    let navigator = std::sync::Arc::new(TracingNavigator::new());
    navigator.set_current_path("/rooms/lobby");

    let client = ColloquyClient::with_navigator(config, navigator)?;
    println!("✓ Client ready\n");

    // Example 3: Fetch the room list; an expired session is refreshed and
    // the request replayed before this returns
    println!("📡 Fetching joined rooms");
    match client.get::<serde_json::Value>("/rooms").await {
        Ok(rooms) => {
            println!("✓ Rooms fetched:");
            println!("  {}\n", rooms);
        }
        Err(e) => {
            println!("✗ Request failed: {}\n", e);
        }
    }

    // Example 4: Post a message
    println!("💬 Posting a message to the lobby");
    let body = serde_json::json!({ "text": "hello from the example" });
    match client.post::<_, serde_json::Value>("/rooms/lobby/messages", &body).await {
        Ok(created) => println!("✓ Message posted: {}\n", created),
        Err(e) => println!("✗ Post failed: {}\n", e),
    }

    // Example 5: Refresh-aware navigation guard
    if client.is_refreshing() {
        println!("⏳ Refresh in flight, waiting for it to settle");
        client.wait_for_refresh().await;
    }
    println!("✓ No refresh in flight; safe to navigate");

    Ok(())
}
