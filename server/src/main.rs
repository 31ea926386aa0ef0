use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::Server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let config = ServerConfig::parse();

    info!("Starting hangman server...");
    info!(
        "{} guesses per game, secret revealed {}, minimum word length {}",
        config.guesses, config.reveal_secret, config.min_length
    );

    let server = Server::bind(&config).await?;
    server.run().await?;

    Ok(())
}
