use serde::{Deserialize, Serialize};

/// What pressing an inline button does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    /// Open a URL.
    Url(String),
    /// Send a callback query carrying this payload back to the bot.
    Callback(String),
}

/// A single inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub action: ButtonAction,
}

impl InlineButton {
    /// A button that opens `url`.
    pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Url(url.into()),
        }
    }

    /// A button that sends `data` back as a callback query.
    pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            action: ButtonAction::Callback(data.into()),
        }
    }
}

/// Platform-neutral inline keyboard attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    /// Row lengths, top to bottom.
    #[must_use]
    pub fn row_sizes(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    /// Iterate over all buttons in reading order.
    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_sizes_and_buttons() {
        let kb = InlineKeyboard {
            rows: vec![
                vec![
                    InlineButton::url("a", "https://t.me/a"),
                    InlineButton::url("b", "https://t.me/b"),
                ],
                vec![InlineButton::callback("done", "x:y")],
            ],
        };
        assert_eq!(kb.row_sizes(), vec![2, 1]);
        assert_eq!(kb.buttons().count(), 3);
        assert_eq!(
            kb.buttons().last().unwrap().action,
            ButtonAction::Callback("x:y".into())
        );
    }
}
