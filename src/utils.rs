use lazy_static::lazy_static;
use regex::Regex;

pub(crate) type Error = Box<dyn std::error::Error + Send + Sync>;
pub(crate) type HandlerResult<R = ()> = Result<R, Error>;

lazy_static! {
    static ref RE: Regex = Regex::new(r"([_*\[\]()~`>#+\-=|{}.!\\])").unwrap();
}

/// Escapes every character that Telegram treats as MarkdownV2 syntax.
pub(crate) fn escape_chars<T>(text: T) -> String
where
    T: Into<String>,
{
    RE.replace_all(&text.into(), r"\$1").to_string()
}
