//! Rendering of Telegram formatting entities into Bot API HTML.
//!
//! Captions arrive as plain text plus a list of entities whose offsets are
//! measured in UTF-16 code units. Re-sending the caption later requires the
//! HTML form, so it is rendered once when a file is archived.

use joingate_core::html::escape;

use crate::types::MessageEntity;

struct Span {
    start: usize,
    end: usize,
    open: String,
    close: &'static str,
}

fn tags(entity: &MessageEntity) -> Option<(String, &'static str)> {
    let simple = |tag: &'static str, close: &'static str| Some((format!("<{tag}>"), close));
    match entity.kind.as_str() {
        "bold" => simple("b", "</b>"),
        "italic" => simple("i", "</i>"),
        "underline" => simple("u", "</u>"),
        "strikethrough" => simple("s", "</s>"),
        "spoiler" => simple("tg-spoiler", "</tg-spoiler>"),
        "code" => simple("code", "</code>"),
        "blockquote" => simple("blockquote", "</blockquote>"),
        "expandable_blockquote" => Some(("<blockquote expandable>".to_owned(), "</blockquote>")),
        "pre" => match &entity.language {
            Some(lang) => Some((
                format!("<pre><code class=\"language-{}\">", escape(lang)),
                "</code></pre>",
            )),
            None => simple("pre", "</pre>"),
        },
        "text_link" => entity
            .url
            .as_ref()
            .map(|url| (format!("<a href=\"{}\">", escape(url)), "</a>")),
        "text_mention" => entity
            .user
            .as_ref()
            .map(|user| (format!("<a href=\"tg://user?id={}\">", user.id), "</a>")),
        "custom_emoji" => entity.custom_emoji_id.as_ref().map(|id| {
            (
                format!("<tg-emoji emoji-id=\"{}\">", escape(id)),
                "</tg-emoji>",
            )
        }),
        // url, mention, hashtag, ... are recognised by clients without markup.
        _ => None,
    }
}

/// Render `text` with its `entities` as HTML.
///
/// Text outside of tags is escaped. Entities with unknown types are dropped;
/// ranges past the end of the text are clamped.
#[must_use]
pub fn render_html(text: &str, entities: &[MessageEntity]) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let len = units.len();

    let mut spans: Vec<Span> = entities
        .iter()
        .filter_map(|entity| {
            let start = entity.offset.min(len);
            let end = entity.offset.saturating_add(entity.length).min(len);
            if start >= end {
                return None;
            }
            let (open, close) = tags(entity)?;
            Some(Span {
                start,
                end,
                open,
                close,
            })
        })
        .collect();
    // Outer entities first when several start at the same position.
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut boundaries: Vec<usize> = spans.iter().flat_map(|s| [s.start, s.end]).collect();
    boundaries.push(0);
    boundaries.push(len);
    boundaries.sort_unstable();
    boundaries.dedup();

    let mut out = String::with_capacity(text.len() + spans.len() * 8);
    let mut open: Vec<&Span> = Vec::new();
    let mut next = spans.iter().peekable();

    for window in boundaries.windows(2) {
        let (pos, until) = (window[0], window[1]);

        while let Some(top) = open.last()
            && top.end <= pos
        {
            out.push_str(top.close);
            open.pop();
        }
        while let Some(span) = next.next_if(|s| s.start == pos) {
            out.push_str(&span.open);
            open.push(span);
        }

        out.push_str(&escape(&String::from_utf16_lossy(&units[pos..until])));
    }

    while let Some(span) = open.pop() {
        out.push_str(span.close);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::User;

    fn entity(kind: &str, offset: usize, length: usize) -> MessageEntity {
        MessageEntity {
            kind: kind.to_owned(),
            offset,
            length,
            url: None,
            user: None,
            language: None,
            custom_emoji_id: None,
        }
    }

    #[test]
    fn plain_text_is_escaped() {
        assert_eq!(render_html("a < b & c", &[]), "a &lt; b &amp; c");
        assert_eq!(render_html("", &[]), "");
    }

    #[test]
    fn simple_entities() {
        let html = render_html(
            "bold and italic",
            &[entity("bold", 0, 4), entity("italic", 9, 6)],
        );
        assert_eq!(html, "<b>bold</b> and <i>italic</i>");
    }

    #[test]
    fn nested_entities() {
        let html = render_html(
            "all bold",
            &[entity("italic", 4, 4), entity("bold", 0, 8)],
        );
        assert_eq!(html, "<b>all <i>bold</i></b>");
    }

    #[test]
    fn offsets_count_utf16_units() {
        // The emoji takes two UTF-16 code units.
        let html = render_html("😀 hi", &[entity("bold", 3, 2)]);
        assert_eq!(html, "😀 <b>hi</b>");
    }

    #[test]
    fn links_and_mentions() {
        let mut link = entity("text_link", 0, 4);
        link.url = Some("https://example.com/?a=1&b=2".into());
        let mut mention = entity("text_mention", 5, 3);
        mention.user = Some(User {
            id: 42,
            is_bot: false,
            first_name: "Ann".into(),
            username: None,
        });

        let html = render_html("site Ann", &[link, mention]);
        assert_eq!(
            html,
            "<a href=\"https://example.com/?a=1&amp;b=2\">site</a> <a href=\"tg://user?id=42\">Ann</a>"
        );
    }

    #[test]
    fn pre_with_language() {
        let mut pre = entity("pre", 0, 6);
        pre.language = Some("rust".into());
        assert_eq!(
            render_html("fn x()", &[pre]),
            "<pre><code class=\"language-rust\">fn x()</code></pre>"
        );
    }

    #[test]
    fn unknown_and_out_of_range_entities() {
        let html = render_html(
            "#tag text",
            &[entity("hashtag", 0, 4), entity("bold", 5, 100)],
        );
        assert_eq!(html, "#tag <b>text</b>");

        let html = render_html("abc", &[entity("bold", 10, 2)]);
        assert_eq!(html, "abc");
    }
}
