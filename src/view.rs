// Presentation helpers shared by front ends

use crate::filter::Filter;
use crate::models::TodoItem;
use crate::notify::{Level, Notification};
use colored::Colorize;

/// "1 item left" / "N items left"
pub fn items_left_label(count: usize) -> String {
    format!("{} item{} left", count, if count == 1 { "" } else { "s" })
}

/// Message shown when a query under `filter` comes back empty
pub fn empty_state_message(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "No todos yet! Add one above to get started.",
        Filter::Active => "No active todos! Great job!",
        Filter::Completed => "No completed todos yet. Start checking some off!",
    }
}

/// One line per item: checkbox, id, text
pub fn render_item(item: &TodoItem) -> String {
    let mark = if item.completed { "[x]" } else { "[ ]" };
    let text = if item.completed {
        item.text.strikethrough().dimmed().to_string()
    } else {
        item.text.clone()
    };
    format!("{} {} {}", mark, item.id.to_string().dimmed(), text)
}

pub fn render_notification(notification: &Notification) -> String {
    let message = notification.message.as_str();
    match notification.level {
        Level::Success => message.green().to_string(),
        Level::Error => message.red().bold().to_string(),
        Level::Info => message.blue().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_items_left_pluralization() {
        assert_eq!(items_left_label(0), "0 items left");
        assert_eq!(items_left_label(1), "1 item left");
        assert_eq!(items_left_label(2), "2 items left");
    }

    #[test]
    fn test_empty_state_per_filter() {
        assert!(empty_state_message(Filter::All).starts_with("No todos yet"));
        assert!(empty_state_message(Filter::Active).starts_with("No active todos"));
        assert!(empty_state_message(Filter::Completed).starts_with("No completed todos"));
    }

    #[test]
    fn test_render_item() {
        colored::control::set_override(false);

        let mut item = TodoItem::new(42, "Buy milk".to_string(), 42);
        assert_eq!(render_item(&item), "[ ] 42 Buy milk");

        item.completed = true;
        assert_eq!(render_item(&item), "[x] 42 Buy milk");
    }

    #[test]
    fn test_render_notification_keeps_message() {
        colored::control::set_override(false);

        let n = Notification::new(Level::Success, "Todo added successfully!");
        assert_eq!(render_notification(&n), "Todo added successfully!");
    }
}
