//! Message formatting for Telegram notifications.

use crate::port::outbound::notifier::{Event, Severity};

/// Format an event as a `MarkdownV2` message, or `None` if it is below
/// `min_severity`.
pub fn format_event_message(event: &Event, min_severity: Severity) -> Option<String> {
    let severity = event.severity();
    if severity < min_severity {
        return None;
    }
    let emoji = match event {
        Event::NewBestEver(_) => "📉",
        Event::PriceDrop(_) | Event::BelowLimit(_) => "🎯",
        Event::PriceJump(_) => "📈",
        Event::RouteDegraded { .. } | Event::StorageDegraded { .. } => "⚠️",
        Event::RouteRecovered { .. } => "✅",
    };
    Some(format!(
        "{emoji} *{}*\n\n{}",
        escape_markdown(event.title()),
        escape_markdown(&event.message())
    ))
}

/// Escape special characters for Telegram `MarkdownV2`.
pub fn escape_markdown(text: &str) -> String {
    let special_chars = [
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
    ];
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        if special_chars.contains(&c) {
            result.push('\\');
        }
        result.push(c);
    }

    result
}
