//! Long-polling update loop.
//!
//! Every routed update becomes one task on a [`TaskTracker`], bounded by a
//! semaphore. Polling stops when the shutdown token is cancelled; in-flight
//! tasks are awaited and the last offset is acknowledged so handled updates
//! are not delivered again after a restart.

use std::sync::Arc;
use std::time::Duration;

use joingate_core::{ChatRef, IngestRequest, RetryRequest, StartRequest, UserRef};
use joingate_gateway::Gateway;
use joingate_platform::PlatformError;
use joingate_telegram::{TelegramClient, Update, User};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Default pause after a failed `getUpdates` call.
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(3);

const PRIVATE_CHAT: &str = "private";

/// Unit of work extracted from an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Start(StartRequest),
    Retry(RetryRequest),
    Ingest(IngestRequest),
}

impl Route {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Retry(_) => "retry",
            Self::Ingest(_) => "ingest",
        }
    }
}

fn user_ref(user: &User) -> UserRef {
    UserRef::new(user.id, Some(user.first_name.clone()))
}

/// Decide what, if anything, an update asks the gateway to do.
///
/// Callback queries always become retries; the gateway ignores payloads it
/// did not issue. Messages are only considered in private chats: `/start`
/// becomes a start request and media becomes an ingestion candidate.
pub fn route(update: Update, bot_username: &str) -> Option<Route> {
    if let Some(query) = update.callback_query {
        return Some(Route::Retry(RetryRequest {
            callback_id: query.id,
            user: user_ref(&query.from),
            data: query.data.unwrap_or_default(),
            prompt: query
                .message
                .map(|message| (ChatRef::Id(message.chat.id), message.message_id)),
        }));
    }

    let message = update.message?;
    if message.chat.kind != PRIVATE_CHAT {
        return None;
    }
    let from = message.from.as_ref().filter(|user| !user.is_bot)?;
    let user = user_ref(from);
    let chat = ChatRef::Id(message.chat.id);

    if let Some((command, payload)) = message.command(bot_username) {
        return (command == "start").then(|| {
            Route::Start(StartRequest {
                user,
                chat,
                message_id: message.message_id,
                payload: payload.map(str::to_owned),
            })
        });
    }

    let kind = message.media_kind()?;
    Some(Route::Ingest(IngestRequest {
        user,
        chat,
        message_id: message.message_id,
        kind: Some(kind),
        caption_html: message.caption_html(),
    }))
}

async fn dispatch(gateway: &Gateway, route: Route) {
    let kind = route.kind();
    let result = match route {
        Route::Start(request) => gateway.handle_start(request).await,
        Route::Retry(request) => gateway.handle_retry(request).await,
        Route::Ingest(request) => gateway.handle_ingest(request).await,
    };
    match result {
        Ok(outcome) => debug!(route = kind, %outcome, "update handled"),
        Err(e) => error!(route = kind, error = %e, "update failed"),
    }
}

/// Pulls updates from Telegram and feeds them to the gateway.
pub struct Dispatcher {
    client: Arc<TelegramClient>,
    gateway: Arc<Gateway>,
    max_concurrent: usize,
    error_backoff: Duration,
}

impl Dispatcher {
    pub fn new(client: Arc<TelegramClient>, gateway: Arc<Gateway>, max_concurrent: usize) -> Self {
        Self {
            client,
            gateway,
            max_concurrent: max_concurrent.max(1),
            error_backoff: DEFAULT_ERROR_BACKOFF,
        }
    }

    /// Override the pause after a failed poll.
    #[must_use]
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Poll until `shutdown` is cancelled, then drain in-flight work.
    pub async fn run(&self, shutdown: CancellationToken) {
        let tracker = TaskTracker::new();
        let permits = Arc::new(Semaphore::new(self.max_concurrent));
        let bot_username = self.gateway.settings().bot_username.clone();
        let mut offset: Option<i64> = None;

        info!(
            bot = %bot_username,
            max_concurrent = self.max_concurrent,
            "polling for updates"
        );

        'poll: loop {
            let polled = tokio::select! {
                biased;
                () = shutdown.cancelled() => break 'poll,
                polled = self.client.get_updates(offset) => polled,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    let delay = match e {
                        PlatformError::RateLimited {
                            retry_after: Some(retry_after),
                        } => retry_after,
                        _ => self.error_backoff,
                    };
                    warn!(error = %e, ?delay, "polling failed, backing off");
                    tokio::select! {
                        biased;
                        () = shutdown.cancelled() => break 'poll,
                        () = tokio::time::sleep(delay) => continue 'poll,
                    }
                }
            };

            for update in updates {
                let next_offset = update.update_id + 1;
                if let Some(route) = route(update, &bot_username) {
                    let permit = tokio::select! {
                        biased;
                        () = shutdown.cancelled() => break 'poll,
                        permit = Arc::clone(&permits).acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => break 'poll,
                        },
                    };
                    let gateway = Arc::clone(&self.gateway);
                    tracker.spawn(async move {
                        dispatch(&gateway, route).await;
                        drop(permit);
                    });
                }
                offset = Some(next_offset);
            }
        }

        tracker.close();
        info!(in_flight = tracker.len(), "shutting down, waiting for in-flight updates");
        tracker.wait().await;

        if let Some(offset) = offset
            && let Err(e) = self.client.acknowledge(offset).await
        {
            warn!(error = %e, offset, "failed to acknowledge handled updates");
        }
    }
}

#[cfg(test)]
mod tests {
    use joingate_core::MediaKind;
    use joingate_crypto::TokenCodec;
    use joingate_platform::testing::MockPlatform;
    use joingate_state_memory::MemoryRecordStore;
    use joingate_telegram::TelegramConfig;

    use super::*;

    const BOT: &str = "files_bot";

    fn update(json: &str) -> Update {
        serde_json::from_str(json).unwrap()
    }

    fn message_update(chat_type: &str, extra: &str) -> Update {
        update(&format!(
            r#"{{
                "update_id": 10,
                "message": {{
                    "message_id": 5,
                    "from": {{"id": 42, "is_bot": false, "first_name": "Ann"}},
                    "chat": {{"id": 42, "type": "{chat_type}"}},
                    "date": 0
                    {extra}
                }}
            }}"#
        ))
    }

    #[test]
    fn start_with_payload() {
        let routed = route(message_update("private", r#", "text": "/start abc""#), BOT);
        let Some(Route::Start(request)) = routed else {
            panic!("expected a start route, got {routed:?}");
        };
        assert_eq!(request.user, UserRef::new(42, Some("Ann".into())));
        assert_eq!(request.chat, ChatRef::Id(42));
        assert_eq!(request.message_id, 5);
        assert_eq!(request.payload.as_deref(), Some("abc"));
    }

    #[test]
    fn start_without_payload_and_addressed_form() {
        let routed = route(message_update("private", r#", "text": "/start""#), BOT);
        assert!(matches!(routed, Some(Route::Start(StartRequest { payload: None, .. }))));

        let routed = route(
            message_update("private", r#", "text": "/start@files_bot xyz""#),
            BOT,
        );
        assert!(matches!(routed, Some(Route::Start(StartRequest { payload: Some(_), .. }))));
    }

    #[test]
    fn start_payload_is_the_first_word() {
        let routed = route(
            message_update("private", r#", "text": "/start abc please send it""#),
            BOT,
        );
        let Some(Route::Start(request)) = routed else {
            panic!("expected a start route, got {routed:?}");
        };
        assert_eq!(request.payload.as_deref(), Some("abc"));
    }

    #[test]
    fn other_commands_and_text_are_ignored() {
        assert_eq!(route(message_update("private", r#", "text": "/help""#), BOT), None);
        assert_eq!(route(message_update("private", r#", "text": "hello""#), BOT), None);
        assert_eq!(
            route(message_update("private", r#", "text": "/start@other_bot x""#), BOT),
            None
        );
    }

    #[test]
    fn group_messages_are_ignored() {
        assert_eq!(route(message_update("group", r#", "text": "/start abc""#), BOT), None);
        assert_eq!(
            route(
                message_update(
                    "supergroup",
                    r#", "document": {"file_id": "d", "file_unique_id": "u"}"#
                ),
                BOT
            ),
            None
        );
    }

    #[test]
    fn media_becomes_ingest_with_caption_html() {
        let routed = route(
            message_update(
                "private",
                r#",
                "video": {"file_id": "v", "file_unique_id": "u"},
                "caption": "new <ep>",
                "caption_entities": [{"type": "bold", "offset": 0, "length": 3}]"#,
            ),
            BOT,
        );
        let Some(Route::Ingest(request)) = routed else {
            panic!("expected an ingest route, got {routed:?}");
        };
        assert_eq!(request.kind, Some(MediaKind::Video));
        assert_eq!(request.caption_html.as_deref(), Some("<b>new</b> &lt;ep&gt;"));
        assert_eq!(request.message_id, 5);
    }

    #[test]
    fn callback_becomes_retry() {
        let routed = route(
            update(
                r#"{
                    "update_id": 11,
                    "callback_query": {
                        "id": "cb-1",
                        "from": {"id": 42, "is_bot": false, "first_name": "Ann"},
                        "data": "jg_done:tok",
                        "message": {
                            "message_id": 77,
                            "chat": {"id": 42, "type": "private"},
                            "date": 0
                        }
                    }
                }"#,
            ),
            BOT,
        );
        let Some(Route::Retry(request)) = routed else {
            panic!("expected a retry route, got {routed:?}");
        };
        assert_eq!(request.callback_id, "cb-1");
        assert_eq!(request.data, "jg_done:tok");
        assert_eq!(request.prompt, Some((ChatRef::Id(42), 77)));
    }

    #[test]
    fn callback_without_data_or_message() {
        let routed = route(
            update(
                r#"{
                    "update_id": 12,
                    "callback_query": {
                        "id": "cb-2",
                        "from": {"id": 42, "first_name": "Ann"}
                    }
                }"#,
            ),
            BOT,
        );
        let Some(Route::Retry(request)) = routed else {
            panic!("expected a retry route, got {routed:?}");
        };
        assert!(request.data.is_empty());
        assert_eq!(request.prompt, None);
    }

    #[test]
    fn bot_senders_and_empty_updates_are_ignored() {
        let routed = route(
            update(
                r#"{
                    "update_id": 13,
                    "message": {
                        "message_id": 1,
                        "from": {"id": 9, "is_bot": true, "first_name": "Other"},
                        "chat": {"id": 9, "type": "private"},
                        "text": "/start abc"
                    }
                }"#,
            ),
            BOT,
        );
        assert_eq!(routed, None);
        assert_eq!(route(update(r#"{"update_id": 14}"#), BOT), None);
    }

    #[tokio::test]
    async fn run_returns_once_cancelled() {
        let gateway = joingate_gateway::GatewayBuilder::new()
            .platform(Arc::new(MockPlatform::new()))
            .store(Arc::new(MemoryRecordStore::new()))
            .codec(TokenCodec::new(b"secret").unwrap())
            .archive_chat(ChatRef::Id(-100))
            .bot_username(BOT)
            .build()
            .unwrap();
        let client = TelegramClient::new(
            TelegramConfig::new("1:x").with_api_url("http://127.0.0.1:1"),
        )
        .unwrap();
        let dispatcher = Dispatcher::new(Arc::new(client), Arc::new(gateway), 4);

        let shutdown = CancellationToken::new();
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), dispatcher.run(shutdown))
            .await
            .unwrap();
    }
}
