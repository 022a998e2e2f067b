//! Minimal HTML helpers for messages sent with the platform's HTML parse mode.

use crate::types::UserId;

/// Escape `&`, `<`, `>` and `"` so `text` can be embedded in HTML markup.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// An inline mention of `user_id` displayed as `name`.
#[must_use]
pub fn mention(user_id: UserId, name: &str) -> String {
    format!("<a href=\"tg://user?id={user_id}\">{}</a>", escape(name))
}
