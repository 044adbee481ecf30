use std::sync::Arc;

use chrono::FixedOffset;
use teloxide::{types::ChatId, utils::html};

use crate::{
    messaging::{Outbound, Outgoing},
    models::Incoming,
};

/// What the user did that the administrator hears about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Activity {
    Onboarded,
    CountdownQuery,
}

impl Activity {
    fn headline(self) -> &'static str {
        match self {
            Activity::Onboarded => "🆕 Новый пользователь",
            Activity::CountdownQuery => {
                "📩 Пользователь хотел посмотреть сколько осталось до великой даты"
            }
        }
    }
}

/// Best-effort activity reports to the administrator account.
#[derive(Clone)]
pub(crate) struct AdminNotifier {
    admin_id: i64,
    offset: FixedOffset,
    outbound: Arc<dyn Outbound>,
}

impl AdminNotifier {
    pub(crate) fn new(admin_id: i64, offset: FixedOffset, outbound: Arc<dyn Outbound>) -> Self {
        Self {
            admin_id,
            offset,
            outbound,
        }
    }

    /// Never fails: delivery errors are logged. Does nothing when the
    /// administrator is the actor.
    pub(crate) async fn notify(&self, incoming: &Incoming, activity: Activity) {
        if incoming.user_id == self.admin_id {
            return;
        }

        let message = Outgoing::new(ChatId(self.admin_id), self.summary(incoming, activity)).html();
        if let Err(err) = self.outbound.send(message).await {
            log::error!(
                "failed to notify admin about user {}: {}",
                incoming.user_id,
                err
            );
        }
    }

    pub(crate) fn summary(&self, incoming: &Incoming, activity: Activity) -> String {
        let sent_at = incoming
            .sent_at
            .with_timezone(&self.offset)
            .format("%Y-%m-%d %H:%M:%S");

        format!(
            "{}\n👤 Username: @{}\n👤 Имя: {}\n📝 Текст: {}\n⏰ Время: {}\n<a href=\"tg://user?id={}\">Профиль пользователя</a>",
            activity.headline(),
            html::escape(incoming.handle()),
            html::escape(&incoming.full_name()),
            html::escape(&incoming.text),
            sent_at,
            incoming.user_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::{testing::RecordingOutbound, Format};

    const ADMIN: i64 = 900;

    fn notifier() -> (AdminNotifier, Arc<RecordingOutbound>) {
        let outbound = Arc::new(RecordingOutbound::default());
        let offset = FixedOffset::east_opt(3 * 3600).unwrap();
        (AdminNotifier::new(ADMIN, offset, outbound.clone()), outbound)
    }

    #[tokio::test]
    async fn sends_summary_to_admin() {
        let (notifier, outbound) = notifier();
        let incoming = Incoming::text_from(7, "Узнать время 🤫");

        notifier.notify(&incoming, Activity::CountdownQuery).await;

        let sent = outbound.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, ChatId(ADMIN));
        assert_eq!(sent[0].format, Format::Html);
        assert!(sent[0].text.contains("@user7"));
        assert!(sent[0].text.contains("tg://user?id=7"));
    }

    #[tokio::test]
    async fn admin_actions_are_not_reported() {
        let (notifier, outbound) = notifier();

        notifier
            .notify(&Incoming::text_from(ADMIN, "Узнать"), Activity::CountdownQuery)
            .await;

        assert!(outbound.sent().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_swallowed() {
        let (notifier, outbound) = notifier();
        outbound.set_failing(true);

        notifier
            .notify(&Incoming::text_from(7, "/start"), Activity::Onboarded)
            .await;

        assert_eq!(outbound.sent().len(), 1);
    }

    #[test]
    fn summary_escapes_html_and_uses_reference_zone() {
        let (notifier, _) = notifier();
        let mut incoming = Incoming::text_from(7, "<b>hi</b> & bye");
        incoming.first_name = "Ann".to_owned();
        incoming.last_name = Some("Lee".to_owned());

        let summary = notifier.summary(&incoming, Activity::CountdownQuery);

        assert!(summary.contains("📝 Текст: &lt;b&gt;hi&lt;/b&gt; &amp; bye"));
        assert!(summary.contains("👤 Имя: Ann Lee"));
        // 1_773_000_000 is 2026-03-08 20:00:00 UTC.
        assert!(summary.contains("⏰ Время: 2026-03-08 23:00:00"));
    }
}
