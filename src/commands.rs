use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::{
    admin_commands,
    countdown::{Clock, Countdown},
    messaging::{Outbound, Outgoing},
    models::Incoming,
    notifier::{Activity, AdminNotifier},
    store::{StoreError, StoreResult, UserStore},
    utils::{Error, HandlerResult},
};

/// First word of the countdown button text.
const COUNTDOWN_TOKEN: &str = "Узнать";

const WELCOME: &str = "Здравствуйте, этот бот будет показывать время до великой даты \
                       отправления в Казань! Просто нажмите на кнопку снизу";
const ONBOARDING_FAILED: &str = "Ошибка! Скоро мы исправим!";
const UNKNOWN_COMMAND: &str = "Неизвестная команда";

/// Target of an admin lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum UserRef {
    Id(i64),
    Handle(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Command {
    Start,
    Countdown,
    Delete(i64),
    List,
    Get(UserRef),
    Exists(i64),
    /// An admin command whose argument is missing or not a number.
    Malformed {
        command: &'static str,
        argument: Option<String>,
    },
    Unrecognized,
}

impl Command {
    pub(crate) fn parse(text: &str) -> Self {
        let mut tokens = text.split_whitespace();
        let Some(head) = tokens.next() else {
            return Command::Unrecognized;
        };
        let argument = tokens.next();

        match head {
            "/start" => Command::Start,
            _ if head.starts_with("/start@") => Command::Start,
            COUNTDOWN_TOKEN => Command::Countdown,
            "list" => Command::List,
            "delete" => parse_id("delete", argument).map_or_else(|e| e, Command::Delete),
            "exists" => parse_id("exists", argument).map_or_else(|e| e, Command::Exists),
            "get" => match argument.and_then(|a| a.strip_prefix('@')) {
                Some(handle) if !handle.is_empty() => {
                    Command::Get(UserRef::Handle(handle.to_owned()))
                }
                _ => parse_id("get", argument)
                    .map_or_else(|e| e, |id| Command::Get(UserRef::Id(id))),
            },
            _ => Command::Unrecognized,
        }
    }

    /// Whether only the administrator may run this command.
    pub(crate) fn is_admin(&self) -> bool {
        matches!(
            self,
            Command::Delete(_)
                | Command::List
                | Command::Get(_)
                | Command::Exists(_)
                | Command::Malformed { .. }
        )
    }
}

fn parse_id(command: &'static str, argument: Option<&str>) -> Result<i64, Command> {
    argument
        .and_then(|a| a.parse::<i64>().ok())
        .ok_or_else(|| Command::Malformed {
            command,
            argument: argument.map(str::to_owned),
        })
}

/// Everything a handler needs; shared by all updates.
pub(crate) struct Context {
    pub admin_id: i64,
    pub countdown_target: DateTime<FixedOffset>,
    pub store: Arc<dyn UserStore>,
    pub outbound: Arc<dyn Outbound>,
    pub notifier: AdminNotifier,
    pub clock: Arc<dyn Clock>,
}

impl Context {
    pub(crate) fn new(
        admin_id: i64,
        countdown_target: DateTime<FixedOffset>,
        store: Arc<dyn UserStore>,
        outbound: Arc<dyn Outbound>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let notifier = AdminNotifier::new(admin_id, *countdown_target.offset(), outbound.clone());
        Self {
            admin_id,
            countdown_target,
            store,
            outbound,
            notifier,
            clock,
        }
    }

    pub(crate) fn is_admin(&self, user_id: i64) -> bool {
        user_id == self.admin_id
    }
}

pub(crate) fn schema() -> UpdateHandler<Error> {
    Update::filter_message()
        .filter_map(Incoming::from_message)
        .map(|incoming: Incoming| Command::parse(&incoming.text))
        .endpoint(on_message)
}

async fn on_message(context: Arc<Context>, incoming: Incoming, command: Command) -> HandlerResult {
    dispatch(&context, &incoming, command).await;
    Ok(())
}

/// Runs one command to completion. Store and transport failures are logged
/// here and never reach the dispatcher loop.
pub(crate) async fn dispatch(context: &Context, incoming: &Incoming, command: Command) {
    let result = if command.is_admin() {
        if context.is_admin(incoming.user_id) {
            admin_commands::handle(context, incoming, command).await
        } else {
            log::warn!(
                "user {} (@{}) is not allowed to run {:?}",
                incoming.user_id,
                incoming.handle(),
                command
            );
            command_unknown(context, incoming).await
        }
    } else {
        match command {
            Command::Start => command_start(context, incoming).await,
            Command::Countdown => command_countdown(context, incoming).await,
            _ => command_unknown(context, incoming).await,
        }
    };

    if let Err(err) = result {
        log::error!("failed to reply to user {}: {}", incoming.user_id, err);
    }
}

/// Returns whether a new record was created.
async fn ensure_user(context: &Context, incoming: &Incoming) -> StoreResult<bool> {
    match context.store.create(incoming.user_id, incoming.handle()).await {
        Ok(()) => Ok(true),
        Err(StoreError::AlreadyExists) => Ok(false),
        Err(err) => Err(err),
    }
}

async fn command_start(context: &Context, incoming: &Incoming) -> HandlerResult {
    log::info!("user {} (@{}) started the bot", incoming.user_id, incoming.handle());

    let created = match ensure_user(context, incoming).await {
        Ok(created) => created,
        Err(err) => {
            log::error!("could not register user {}: {}", incoming.user_id, err);
            return context
                .outbound
                .send(Outgoing::new(incoming.chat_id, ONBOARDING_FAILED))
                .await;
        }
    };

    let reply = context
        .outbound
        .send(Outgoing::new(incoming.chat_id, WELCOME).with_countdown_keyboard())
        .await;

    if created {
        log::info!("registered user {}", incoming.user_id);
        context.notifier.notify(incoming, Activity::Onboarded).await;
    }

    reply
}

async fn command_countdown(context: &Context, incoming: &Incoming) -> HandlerResult {
    log::info!(
        "user {} (@{}) asked how long is left until the great date",
        incoming.user_id,
        incoming.handle()
    );

    if let Err(err) = context.store.increment_count(incoming.user_id).await {
        log::error!("could not count query of user {}: {}", incoming.user_id, err);
    }

    let countdown = Countdown::between(context.countdown_target, context.clock.now());
    let reply = context
        .outbound
        .send(Outgoing::new(incoming.chat_id, countdown.message()).with_countdown_keyboard())
        .await;

    context
        .notifier
        .notify(incoming, Activity::CountdownQuery)
        .await;

    reply
}

async fn command_unknown(context: &Context, incoming: &Incoming) -> HandlerResult {
    log::info!(
        "user {} (@{}) wrote: {}",
        incoming.user_id,
        incoming.handle(),
        incoming.text
    );

    context
        .outbound
        .send(Outgoing::new(incoming.chat_id, UNKNOWN_COMMAND))
        .await
}
