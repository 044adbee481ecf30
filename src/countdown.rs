use chrono::{DateTime, Duration, FixedOffset, Utc};

pub(crate) trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Default)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Time left until the great date, or time since it passed.
///
/// Both variants carry a non-negative span rounded to whole seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Countdown {
    Remaining(Duration),
    Elapsed(Duration),
}

impl Countdown {
    pub(crate) fn between(target: DateTime<FixedOffset>, now: DateTime<Utc>) -> Self {
        let seconds = round_to_seconds(target.with_timezone(&Utc) - now);

        if seconds < 0 {
            Countdown::Elapsed(Duration::seconds(-seconds))
        } else {
            Countdown::Remaining(Duration::seconds(seconds))
        }
    }

    pub(crate) fn message(&self) -> String {
        match self {
            Countdown::Remaining(span) => format_duration(*span),
            Countdown::Elapsed(span) => {
                format!("Великая дата уже наступила! Прошло {}", format_duration(*span))
            }
        }
    }
}

/// Rounds half away from zero.
fn round_to_seconds(span: Duration) -> i64 {
    let millis = span.num_milliseconds();
    let seconds = (millis.abs() + 500) / 1000;
    if millis < 0 {
        -seconds
    } else {
        seconds
    }
}

/// Renders a span as `DD дней, HH часов, MM минут, SS секунд`.
///
/// The sign is ignored and sub-second parts are truncated.
pub(crate) fn format_duration(span: Duration) -> String {
    let total = span.num_seconds().abs();

    format!(
        "{:02} дней, {:02} часов, {:02} минут, {:02} секунд",
        total / 86_400,
        (total / 3_600) % 24,
        (total / 60) % 60,
        total % 60
    )
}
