use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use joingate_core::{
    ButtonAction, ChatRef, FileId, FileRecord, IngestRequest, MediaKind, MemberStatus,
    RetryRequest, StartRequest, UserRef,
};
use joingate_crypto::TokenCodec;
use joingate_gateway::{
    DEFAULT_CALLBACK_DEADLINE, GateOutcome, Gateway, GatewayBuilder, GatewayError, callback_data,
    parse_callback_data,
};
use joingate_platform::testing::{MockPlatform, PlatformCall};
use joingate_platform::{CallbackNotice, ParseMode};
use joingate_state::{RecordStore, StateError};
use joingate_state_memory::MemoryRecordStore;

const SECRET: &[u8] = b"scenario-secret";
const ARCHIVE: i64 = -100_500;
const USER: i64 = 42;
const ADMIN: i64 = 1;
const START_MESSAGE_ID: i64 = 7;

struct Harness {
    platform: Arc<MockPlatform>,
    store: Arc<MemoryRecordStore>,
    gateway: Gateway,
}

fn harness(targets: &[&str]) -> Harness {
    harness_with_deadline(targets, DEFAULT_CALLBACK_DEADLINE)
}

fn harness_with_deadline(targets: &[&str], callback_deadline: Duration) -> Harness {
    let platform = Arc::new(MockPlatform::new().with_username("files_bot"));
    let store = Arc::new(MemoryRecordStore::new());
    let gateway = GatewayBuilder::new()
        .platform(platform.clone())
        .store(store.clone())
        .codec(TokenCodec::new(SECRET).unwrap())
        .targets(
            targets
                .iter()
                .map(|t| joingate_core::JoinTarget::parse(t).unwrap())
                .collect(),
        )
        .admins([ADMIN])
        .archive_chat(ChatRef::Id(ARCHIVE))
        .buttons_per_row(2)
        .bot_username("files_bot")
        .callback_deadline(callback_deadline)
        .build()
        .unwrap();
    Harness {
        platform,
        store,
        gateway,
    }
}

impl Harness {
    fn join(&self, chat: ChatRef) {
        self.platform.set_member(&chat, USER, MemberStatus::Member);
    }

    async fn archived_file(&self, archive_message_id: i64) -> (FileId, String) {
        let record = FileRecord::new(
            FileId::generate(),
            ChatRef::Id(ARCHIVE),
            archive_message_id,
            MediaKind::Document,
            ADMIN,
        );
        self.store.upsert(&record).await.unwrap();
        let token = self.gateway.issue_token(&record.file_id);
        (record.file_id, token)
    }
}

fn user() -> UserRef {
    UserRef::new(USER, Some("Ann".into()))
}

fn start(token: Option<&str>) -> StartRequest {
    StartRequest {
        user: user(),
        chat: ChatRef::Id(USER),
        message_id: START_MESSAGE_ID,
        payload: token.map(str::to_owned),
    }
}

fn retry(data: &str, prompt_message_id: i64) -> RetryRequest {
    RetryRequest {
        callback_id: "cb-1".into(),
        user: user(),
        data: data.to_owned(),
        prompt: Some((ChatRef::Id(USER), prompt_message_id)),
    }
}

fn answers(platform: &MockPlatform) -> Vec<(String, Option<CallbackNotice>)> {
    platform
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            PlatformCall::AnswerCallback {
                callback_id,
                notice,
            } => Some((callback_id, notice)),
            _ => None,
        })
        .collect()
}

// Scenario 1: user has not joined; the join prompt is shown and nothing is
// delivered.
#[tokio::test]
async fn not_joined_shows_prompt() {
    let h = harness(&["@a", "@b", "-100123|https://t.me/+c"]);
    h.join(ChatRef::Handle("@a".into()));
    let (_, token) = h.archived_file(10).await;

    let outcome = h.gateway.handle_start(start(Some(&token))).await.unwrap();
    assert_eq!(outcome, GateOutcome::PromptShown);

    assert!(h.platform.copies().is_empty());
    let sent = h.platform.sent_messages();
    assert_eq!(sent.len(), 1);
    let prompt = &sent[0];
    assert_eq!(prompt.text, h.gateway.settings().texts.force_sub_message);
    assert_eq!(prompt.parse_mode, Some(ParseMode::Html));
    assert_eq!(prompt.reply_to, Some(START_MESSAGE_ID));

    let keyboard = prompt.keyboard.as_ref().unwrap();
    assert_eq!(keyboard.row_sizes(), vec![2, 1, 1]);
    assert_eq!(
        keyboard.rows[1][0].action,
        ButtonAction::Url("https://t.me/+c".into())
    );
    let retry_button = &keyboard.rows[2][0];
    assert_eq!(
        retry_button.action,
        ButtonAction::Callback(callback_data(&token))
    );
    assert_eq!(h.gateway.metrics().snapshot().prompts_shown, 1);
}

// Scenario 2: user has joined everything and holds a valid token.
#[tokio::test]
async fn joined_user_receives_file() {
    let h = harness(&["@a"]);
    h.join(ChatRef::Handle("@a".into()));
    let (file_id, token) = h.archived_file(10).await;

    let outcome = h.gateway.handle_start(start(Some(&token))).await.unwrap();
    assert_eq!(outcome, GateOutcome::Delivered { file_id });

    assert_eq!(
        h.platform.copies(),
        vec![(ChatRef::Id(USER), ChatRef::Id(ARCHIVE), 10)]
    );
    assert!(h.platform.sent_messages().is_empty());
}

// Scenario 3: a tampered token is rejected before any lookup or copy.
#[tokio::test]
async fn tampered_token_is_rejected() {
    let h = harness(&["@a"]);
    h.join(ChatRef::Handle("@a".into()));
    let (_, token) = h.archived_file(10).await;

    let mut chars: Vec<char> = token.chars().collect();
    let last = chars.len() - 1;
    chars[last] = if chars[last] == 'A' { 'B' } else { 'A' };
    let tampered: String = chars.into_iter().collect();

    let outcome = h.gateway.handle_start(start(Some(&tampered))).await.unwrap();
    assert_eq!(outcome, GateOutcome::InvalidToken);
    assert!(h.platform.copies().is_empty());

    let sent = h.platform.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, h.gateway.settings().texts.invalid_link);
    assert_eq!(sent[0].parse_mode, None);
}

// Scenario 4: the user joins after seeing the prompt and presses the button.
#[tokio::test]
async fn retry_after_joining_delivers() {
    let h = harness(&["@a"]);
    let (file_id, token) = h.archived_file(10).await;

    let outcome = h.gateway.handle_start(start(Some(&token))).await.unwrap();
    assert_eq!(outcome, GateOutcome::PromptShown);

    h.join(ChatRef::Handle("@a".into()));
    h.platform.clear_calls();

    let outcome = h
        .gateway
        .handle_retry(retry(&callback_data(&token), 1001))
        .await
        .unwrap();
    assert_eq!(outcome, GateOutcome::Delivered { file_id });

    assert_eq!(answers(&h.platform), vec![("cb-1".to_owned(), None)]);
    assert!(h.platform.calls().contains(&PlatformCall::DeleteMessage {
        chat: ChatRef::Id(USER),
        message_id: 1001,
    }));
    assert_eq!(
        h.platform.copies(),
        vec![(ChatRef::Id(USER), ChatRef::Id(ARCHIVE), 10)]
    );
}

#[tokio::test]
async fn retry_still_not_joined_alerts_once() {
    let h = harness(&["@a"]);
    h.platform
        .set_member(&ChatRef::Handle("@a".into()), USER, MemberStatus::Left);
    let (_, token) = h.archived_file(10).await;

    let outcome = h
        .gateway
        .handle_retry(retry(&callback_data(&token), 1001))
        .await
        .unwrap();
    assert_eq!(outcome, GateOutcome::StillNotJoined);

    let answered = answers(&h.platform);
    assert_eq!(answered.len(), 1);
    let notice = answered[0].1.as_ref().unwrap();
    assert!(notice.show_alert);
    assert_eq!(notice.text, h.gateway.settings().texts.not_joined_notice);

    assert!(h.platform.copies().is_empty());
    assert!(
        !h.platform
            .calls()
            .iter()
            .any(|c| matches!(c, PlatformCall::DeleteMessage { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn slow_membership_check_answers_within_deadline() {
    let h = harness(&["@a"]);
    h.join(ChatRef::Handle("@a".into()));
    h.platform.delay_memberships(Duration::from_secs(60));
    let (_, token) = h.archived_file(10).await;

    let started = tokio::time::Instant::now();
    let outcome = h
        .gateway
        .handle_retry(retry(&callback_data(&token), 1001))
        .await
        .unwrap();
    assert_eq!(outcome, GateOutcome::StillNotJoined);
    assert!(started.elapsed() < Duration::from_secs(60));

    let answered = answers(&h.platform);
    assert_eq!(answered.len(), 1);
    assert!(answered[0].1.as_ref().unwrap().show_alert);
    assert!(h.platform.copies().is_empty());
}

#[tokio::test(start_paused = true)]
async fn membership_check_within_deadline_delivers() {
    let h = harness_with_deadline(&["@a"], Duration::from_secs(2));
    h.join(ChatRef::Handle("@a".into()));
    h.platform.delay_memberships(Duration::from_secs(1));
    let (file_id, token) = h.archived_file(10).await;

    let outcome = h
        .gateway
        .handle_retry(retry(&callback_data(&token), 1001))
        .await
        .unwrap();
    assert_eq!(outcome, GateOutcome::Delivered { file_id });
    assert_eq!(answers(&h.platform), vec![("cb-1".to_owned(), None)]);
}

#[tokio::test]
async fn foreign_callback_is_answered_and_ignored() {
    let h = harness(&["@a"]);

    let outcome = h
        .gateway
        .handle_retry(retry("something_else:abc", 1001))
        .await
        .unwrap();
    assert_eq!(outcome, GateOutcome::Ignored);
    assert_eq!(answers(&h.platform), vec![("cb-1".to_owned(), None)]);
    assert!(h.platform.membership_queries().is_empty());
}

#[tokio::test]
async fn retry_with_failed_prompt_delete_still_delivers() {
    let h = harness(&[]);
    h.platform.fail_deletes(true);
    let (file_id, token) = h.archived_file(3).await;

    let outcome = h
        .gateway
        .handle_retry(retry(&callback_data(&token), 1001))
        .await
        .unwrap();
    assert_eq!(outcome, GateOutcome::Delivered { file_id });
}

#[tokio::test]
async fn retry_with_tampered_token_after_join() {
    let h = harness(&[]);

    let outcome = h
        .gateway
        .handle_retry(retry(&callback_data("bm90LWEtdG9rZW4"), 1001))
        .await
        .unwrap();
    assert_eq!(outcome, GateOutcome::InvalidToken);

    let sent = h.platform.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat, ChatRef::Id(USER));
    assert_eq!(sent[0].reply_to, None);
}

#[tokio::test]
async fn membership_error_short_circuits_and_fails_closed() {
    let h = harness(&["@a", "@b"]);
    h.platform.break_chat(&ChatRef::Handle("@a".into()));
    h.join(ChatRef::Handle("@b".into()));
    let (_, token) = h.archived_file(10).await;

    let outcome = h.gateway.handle_start(start(Some(&token))).await.unwrap();
    assert_eq!(outcome, GateOutcome::PromptShown);
    assert_eq!(
        h.platform.membership_queries(),
        vec![ChatRef::Handle("@a".into())]
    );
}

#[tokio::test]
async fn no_targets_means_no_gate() {
    let h = harness(&[]);
    let (file_id, token) = h.archived_file(10).await;

    let outcome = h.gateway.handle_start(start(Some(&token))).await.unwrap();
    assert_eq!(outcome, GateOutcome::Delivered { file_id });
    assert!(h.platform.membership_queries().is_empty());
}

#[tokio::test]
async fn valid_token_without_record() {
    let h = harness(&[]);
    let token = h.gateway.issue_token(&FileId::generate());

    let outcome = h.gateway.handle_start(start(Some(&token))).await.unwrap();
    assert_eq!(outcome, GateOutcome::FileNotFound);
    assert!(h.platform.copies().is_empty());
    assert_eq!(
        h.platform.sent_messages()[0].text,
        h.gateway.settings().texts.file_not_found
    );
}

#[tokio::test]
async fn record_deleted_after_ingest_is_not_found() {
    let h = harness(&[]);
    let GateOutcome::Saved { file_id, link } = h
        .gateway
        .handle_ingest(ingest(ADMIN, Some(MediaKind::Document)))
        .await
        .unwrap()
    else {
        panic!("ingest should save");
    };
    let token = link.rsplit_once("start=").unwrap().1;
    assert!(h.store.delete(&file_id).await.unwrap());
    h.platform.clear_calls();

    let outcome = h.gateway.handle_start(start(Some(token))).await.unwrap();
    assert_eq!(outcome, GateOutcome::FileNotFound);
    assert!(h.platform.copies().is_empty());
    let sent = h.platform.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, h.gateway.settings().texts.file_not_found);
    assert_eq!(sent[0].reply_to, Some(START_MESSAGE_ID));
}

#[tokio::test]
async fn copy_failure_reports_delivery_failed() {
    let h = harness(&[]);
    h.platform.fail_copies(true);
    let (_, token) = h.archived_file(10).await;

    let outcome = h.gateway.handle_start(start(Some(&token))).await.unwrap();
    assert_eq!(outcome, GateOutcome::DeliveryFailed);
    assert_eq!(
        h.platform.sent_messages()[0].text,
        h.gateway.settings().texts.delivery_failed
    );
    assert_eq!(h.gateway.metrics().snapshot().delivery_failures, 1);
}

#[tokio::test]
async fn start_without_payload_welcomes() {
    let h = harness(&["@a"]);

    let outcome = h.gateway.handle_start(start(None)).await.unwrap();
    assert_eq!(outcome, GateOutcome::Welcomed);
    assert!(h.platform.membership_queries().is_empty());

    let sent = h.platform.sent_messages();
    assert!(
        sent[0]
            .text
            .contains("<a href=\"tg://user?id=42\">Ann</a>"),
        "unexpected welcome: {}",
        sent[0].text
    );
    assert_eq!(sent[0].parse_mode, Some(ParseMode::Html));
}

fn ingest(user_id: i64, kind: Option<MediaKind>) -> IngestRequest {
    IngestRequest {
        user: UserRef::new(user_id, None),
        chat: ChatRef::Id(user_id),
        message_id: 55,
        kind,
        caption_html: Some("<b>Episode 1</b>".into()),
    }
}

#[tokio::test]
async fn admin_ingest_saves_and_links() {
    let h = harness(&["@a"]);

    let outcome = h
        .gateway
        .handle_ingest(ingest(ADMIN, Some(MediaKind::Video)))
        .await
        .unwrap();
    let (file_id, link) = match outcome {
        GateOutcome::Saved { file_id, link } => (file_id, link),
        other => panic!("expected Saved, got {other:?}"),
    };

    assert_eq!(
        h.platform.copies(),
        vec![(ChatRef::Id(ARCHIVE), ChatRef::Id(ADMIN), 55)]
    );

    let record = h.store.get(&file_id).await.unwrap().unwrap();
    assert_eq!(record.kind, MediaKind::Video);
    assert_eq!(record.archive_chat, ChatRef::Id(ARCHIVE));
    assert_eq!(record.caption.as_deref(), Some("<b>Episode 1</b>"));
    assert_eq!(record.saved_by, ADMIN);

    let token = link
        .strip_prefix("https://t.me/files_bot?start=")
        .unwrap();
    let codec = TokenCodec::new(SECRET).unwrap();
    assert_eq!(codec.resolve(token).as_deref(), Some(file_id.as_str()));

    let sent = h.platform.sent_messages();
    assert!(sent[0].text.contains(&format!("<code>{link}</code>")));
    assert_eq!(sent[0].reply_to, Some(55));
}

#[tokio::test]
async fn ingest_from_non_admin_is_silent() {
    let h = harness(&[]);
    let outcome = h
        .gateway
        .handle_ingest(ingest(USER, Some(MediaKind::Document)))
        .await
        .unwrap();
    assert_eq!(outcome, GateOutcome::Ignored);
    assert!(h.platform.calls().is_empty());
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn ingest_without_media_is_ignored() {
    let h = harness(&[]);
    let outcome = h.gateway.handle_ingest(ingest(ADMIN, None)).await.unwrap();
    assert_eq!(outcome, GateOutcome::Ignored);
    assert!(h.platform.calls().is_empty());
}

#[tokio::test]
async fn ingest_archive_failure() {
    let h = harness(&[]);
    h.platform.fail_copies(true);
    let outcome = h
        .gateway
        .handle_ingest(ingest(ADMIN, Some(MediaKind::Photo)))
        .await
        .unwrap();
    assert_eq!(outcome, GateOutcome::ArchiveFailed);
    assert!(h.store.is_empty());
    assert_eq!(
        h.platform.sent_messages()[0].text,
        h.gateway.settings().texts.archive_failed
    );
}

#[tokio::test]
async fn saved_link_delivers_end_to_end() {
    let h = harness(&["@a"]);
    h.join(ChatRef::Handle("@a".into()));

    let GateOutcome::Saved { file_id, link } = h
        .gateway
        .handle_ingest(ingest(ADMIN, Some(MediaKind::Audio)))
        .await
        .unwrap()
    else {
        panic!("ingest should save");
    };
    let token = link.rsplit_once("start=").unwrap().1;
    h.platform.clear_calls();

    let outcome = h.gateway.handle_start(start(Some(token))).await.unwrap();
    assert_eq!(outcome, GateOutcome::Delivered { file_id });
    // The mock numbers archive copies from 1001.
    assert_eq!(
        h.platform.copies(),
        vec![(ChatRef::Id(USER), ChatRef::Id(ARCHIVE), 1001)]
    );
}

struct BrokenStore;

#[async_trait]
impl RecordStore for BrokenStore {
    async fn upsert(&self, _record: &FileRecord) -> Result<(), StateError> {
        Err(StateError::Connection("redis down".into()))
    }

    async fn get(&self, _file_id: &FileId) -> Result<Option<FileRecord>, StateError> {
        Err(StateError::Connection("redis down".into()))
    }

    async fn delete(&self, _file_id: &FileId) -> Result<bool, StateError> {
        Err(StateError::Connection("redis down".into()))
    }
}

fn broken_store_gateway(platform: &Arc<MockPlatform>) -> Gateway {
    GatewayBuilder::new()
        .platform(platform.clone())
        .store(Arc::new(BrokenStore))
        .codec(TokenCodec::new(SECRET).unwrap())
        .admins([ADMIN])
        .archive_chat(ChatRef::Id(ARCHIVE))
        .bot_username("files_bot")
        .build()
        .unwrap()
}

#[tokio::test]
async fn store_failure_surfaces_as_error() {
    let platform = Arc::new(MockPlatform::new());
    let gateway = broken_store_gateway(&platform);
    let token = gateway.issue_token(&FileId::generate());

    let err = gateway.handle_start(start(Some(&token))).await.unwrap_err();
    assert!(matches!(err, GatewayError::State(StateError::Connection(_))));
    assert_eq!(gateway.metrics().snapshot().store_errors, 1);
    assert!(platform.copies().is_empty());

    let sent = platform.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, gateway.settings().texts.temporary_failure);
    assert_eq!(sent[0].reply_to, Some(START_MESSAGE_ID));
}

#[tokio::test]
async fn ingest_store_failure_tells_admin_to_retry() {
    let platform = Arc::new(MockPlatform::new());
    let gateway = broken_store_gateway(&platform);

    let err = gateway
        .handle_ingest(ingest(ADMIN, Some(MediaKind::Document)))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::State(_)));
    assert_eq!(gateway.metrics().snapshot().store_errors, 1);

    let sent = platform.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, gateway.settings().texts.temporary_failure);
    assert!(!sent[0].text.contains("start="));
    assert_eq!(sent[0].reply_to, Some(55));
}

#[test]
fn retry_payload_carries_token() {
    let data = callback_data("abc");
    assert_eq!(parse_callback_data(&data), Some("abc"));
}

// Telegram caps `callback_data` at 64 bytes and `start` parameters at 64
// characters. Issued tokens are longer than both.
#[test]
fn issued_tokens_exceed_telegram_payload_limits() {
    let codec = TokenCodec::new(SECRET).unwrap();
    let token = codec.issue(FileId::generate().as_str());
    assert_eq!(token.len(), 102);
    assert_eq!(callback_data(&token).len(), 110);
    assert!(token.len() > 64);
}
