use once_cell::sync::Lazy;
use regex::Regex;

static EVENT_HANDLER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Once|On)([A-Z][a-zA-Z]*)$").expect("valid regex"));

/// The event an `@Event` method listens to, derived from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    pub event_type: String,
    pub once: bool,
}

/// `OnMessageCreate` listens to `messageCreate`; `OnceReady` to `ready`, once.
pub fn parse_event_name(name: &str) -> Option<EventBinding> {
    let captures = EVENT_HANDLER_NAME.captures(name)?;
    let once = &captures[1] == "Once";
    let event = &captures[2];

    let mut chars = event.chars();
    let first = chars.next()?;
    let event_type = first.to_lowercase().chain(chars).collect();
    Some(EventBinding { event_type, once })
}
