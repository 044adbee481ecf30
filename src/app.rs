use std::sync::Arc;

use anyhow::{Context as _, Result};
use teloxide::{prelude::*, update_listeners::webhooks};

use crate::{
    commands::{self, Context},
    config::{self, Config, Transport},
    countdown::SystemClock,
    messaging::{BotOutbound, Outbound},
    store::PgUserStore,
};

fn init_logging() {
    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned());
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&filters)
        .init();
}

pub(crate) async fn run() -> Result<()> {
    // Deployments provide the environment directly; `.env` is for local runs.
    let dotenv = if std::env::var_os("RAILWAY_ENVIRONMENT").is_none() {
        Some(dotenvy::dotenv())
    } else {
        None
    };

    init_logging();

    match dotenv {
        Some(Ok(path)) => log::info!("loaded {}", path.display()),
        Some(Err(err)) => log::info!("no .env file loaded: {}", err),
        None => {}
    }

    config::report_env();
    let config = Config::from_env()?;
    log::info!("database: {}", config::mask_database_url(&config.database_url));

    let store = PgUserStore::connect(&config)
        .await
        .context("database connection failed")?;
    store
        .ensure_schema()
        .await
        .context("could not create the users table")?;
    log::info!("connected to database");

    let bot = Bot::new(config.bot_token.clone());
    let me = bot.get_me().await.context("bot authorization failed")?;
    log::info!(
        "authorized on account {}",
        me.user.username.as_deref().unwrap_or("<unnamed>")
    );

    let outbound: Arc<dyn Outbound> = Arc::new(BotOutbound::new(bot.clone()));
    let context = Arc::new(Context::new(
        config.admin_id,
        config.countdown_target,
        Arc::new(store),
        outbound,
        Arc::new(SystemClock),
    ));

    let mut dispatcher = Dispatcher::builder(bot.clone(), commands::schema())
        .dependencies(dptree::deps![context])
        .enable_ctrlc_handler()
        .build();

    match config.transport {
        Transport::Polling => {
            log::info!("starting in polling mode");
            if let Err(err) = bot.delete_webhook().drop_pending_updates(true).await {
                log::warn!("could not delete webhook: {}", err);
            }
            dispatcher.dispatch().await;
        }
        Transport::Webhook { url, address } => {
            log::info!("starting in webhook mode at {} (listening on {})", url, address);
            let listener = webhooks::axum(bot, webhooks::Options::new(address, url))
                .await
                .context("could not set up webhook")?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await;
        }
    }

    log::info!("bot stopped");
    Ok(())
}
