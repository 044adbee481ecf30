mod admin_commands;
mod app;
mod commands;
mod config;
mod countdown;
mod messaging;
mod models;
mod notifier;
mod store;
mod utils;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
