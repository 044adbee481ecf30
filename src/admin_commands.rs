use crate::{
    commands::{Command, Context, UserRef},
    messaging::Outgoing,
    models::{Incoming, User},
    store::StoreError,
    utils::{escape_chars, HandlerResult},
};

const USER_DELETED: &str = "Пользователь удален";
const USER_EXISTS: &str = "Пользователь существует";
const USER_MISSING: &str = "Пользователь не существует";
const USER_NOT_FOUND: &str = "Пользователь не найден";

/// Runs an administrator command. The caller has already checked that the
/// actor is the administrator.
pub(crate) async fn handle(context: &Context, incoming: &Incoming, command: Command) -> HandlerResult {
    match command {
        Command::Delete(id) => command_delete(context, incoming, id).await,
        Command::List => command_list(context, incoming).await,
        Command::Get(user) => command_get(context, incoming, user).await,
        Command::Exists(id) => command_exists(context, incoming, id).await,
        Command::Malformed { command, argument } => {
            command_malformed(context, incoming, command, argument).await
        }
        Command::Start | Command::Countdown | Command::Unrecognized => {
            log::warn!("{:?} is not an admin command, ignoring", command);
            Ok(())
        }
    }
}

/// One MarkdownV2 line describing a user.
fn user_line(user: &User) -> String {
    let handle = if user.username.is_empty() {
        "нет".to_owned()
    } else {
        format!("@{}", escape_chars(user.username.as_str()))
    };
    format!("username: {}, id: `{}`, count: {}", handle, user.id, user.count)
}

fn usage(command: &str) -> &'static str {
    match command {
        "delete" => "delete <id>",
        "get" => "get <id> или get @username",
        _ => "exists <id>",
    }
}

async fn reply(context: &Context, incoming: &Incoming, text: &str) -> HandlerResult {
    context
        .outbound
        .send(Outgoing::new(incoming.chat_id, text).reply_to(incoming.message_id))
        .await
}

async fn send_user(context: &Context, incoming: &Incoming, user: &User) -> HandlerResult {
    context
        .outbound
        .send(Outgoing::new(incoming.chat_id, user_line(user)).markdown())
        .await
}

async fn command_delete(context: &Context, incoming: &Incoming, id: i64) -> HandlerResult {
    log::info!("deleting user {}", id);
    if let Err(err) = context.store.delete(id).await {
        log::error!("could not delete user {}: {}", id, err);
        return Ok(());
    }
    reply(context, incoming, USER_DELETED).await
}

async fn command_list(context: &Context, incoming: &Incoming) -> HandlerResult {
    let users = match context.store.list_all().await {
        Ok(users) => users,
        Err(err) => {
            log::error!("could not list users: {}", err);
            return Ok(());
        }
    };

    log::info!("listing {} users", users.len());
    for user in &users {
        if let Err(err) = send_user(context, incoming, user).await {
            log::error!("could not send user {} to the admin: {}", user.id, err);
        }
    }
    Ok(())
}

async fn command_get(context: &Context, incoming: &Incoming, user: UserRef) -> HandlerResult {
    let found = match &user {
        UserRef::Id(id) => context.store.get(*id).await,
        UserRef::Handle(handle) => context.store.get_by_handle(handle).await,
    };

    match found {
        Ok(found) => send_user(context, incoming, &found).await,
        Err(StoreError::NotFound) => reply(context, incoming, USER_NOT_FOUND).await,
        Err(err) => {
            log::error!("could not get user {:?}: {}", user, err);
            Ok(())
        }
    }
}

async fn command_exists(context: &Context, incoming: &Incoming, id: i64) -> HandlerResult {
    let text = if context.store.exists(id).await {
        USER_EXISTS
    } else {
        USER_MISSING
    };
    log::info!("user {}: {}", id, text);
    reply(context, incoming, text).await
}

async fn command_malformed(
    context: &Context,
    incoming: &Incoming,
    command: &str,
    argument: Option<String>,
) -> HandlerResult {
    log::warn!("bad argument {:?} for {}", argument, command);
    reply(
        context,
        incoming,
        &format!("Неверный аргумент. Использование: {}", usage(command)),
    )
    .await
}
