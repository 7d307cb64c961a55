/*
 * Responsibility
 * - Start the tokio runtime for the server host
 * - Call app::run() (no logic here)
 */
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    api_guard::app::run().await
}
