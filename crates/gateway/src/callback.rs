//! Wire formats the gateway hands out: deep links and callback payloads.

/// Prefix of the "I've joined" callback payload.
pub const CALLBACK_PREFIX: &str = "jg_done";

const DEEP_LINK_BASE: &str = "https://t.me/";

/// `https://t.me/{bot_username}?start={token}`.
#[must_use]
pub fn deep_link(bot_username: &str, token: &str) -> String {
    format!(
        "{DEEP_LINK_BASE}{}?start={token}",
        bot_username.trim_start_matches('@')
    )
}

/// Callback payload carried by the retry button.
#[must_use]
pub fn callback_data(token: &str) -> String {
    format!("{CALLBACK_PREFIX}:{token}")
}

/// Extract the token from a retry payload, or `None` if `data` is not one.
#[must_use]
pub fn parse_callback_data(data: &str) -> Option<&str> {
    let token = data.strip_prefix(CALLBACK_PREFIX)?.strip_prefix(':')?.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_link_format() {
        assert_eq!(deep_link("files_bot", "abc"), "https://t.me/files_bot?start=abc");
        assert_eq!(deep_link("@files_bot", "abc"), "https://t.me/files_bot?start=abc");
    }

    #[test]
    fn callback_roundtrip() {
        let data = callback_data("tok_en-1");
        assert_eq!(data, "jg_done:tok_en-1");
        assert_eq!(parse_callback_data(&data), Some("tok_en-1"));
    }

    #[test]
    fn foreign_payloads_are_rejected() {
        assert_eq!(parse_callback_data("other:tok"), None);
        assert_eq!(parse_callback_data("jg_done"), None);
        assert_eq!(parse_callback_data("jg_done:"), None);
        assert_eq!(parse_callback_data("jg_donex:tok"), None);
        assert_eq!(parse_callback_data("jg_done: tok "), Some("tok"));
    }
}
