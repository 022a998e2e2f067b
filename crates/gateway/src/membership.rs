use joingate_core::{InlineButton, InlineKeyboard, JoinTarget, UserId};
use joingate_platform::DynPlatform;
use tracing::{debug, warn};

/// Whether `user_id` has joined every target.
///
/// Targets are checked in order and the first one that is not joined, or
/// whose membership cannot be queried, ends the evaluation with `false`.
/// An empty target list is trivially satisfied.
pub async fn is_joined_all(
    platform: &dyn DynPlatform,
    user_id: UserId,
    targets: &[JoinTarget],
) -> bool {
    for target in targets {
        match platform.get_chat_member(&target.check_ref(), user_id).await {
            Ok(status) if status.is_joined() => {}
            Ok(status) => {
                debug!(join_target = %target, user_id, ?status, "user has not joined");
                return false;
            }
            Err(e) => {
                warn!(
                    join_target = %target,
                    user_id,
                    error = %e,
                    "membership check failed, treating as not joined"
                );
                return false;
            }
        }
    }
    true
}

/// The join prompt keyboard.
///
/// One URL button per target labelled `"{join_label} {n}"` (1-based),
/// `buttons_per_row` to a row, then a final row with the single retry button.
/// A `buttons_per_row` of zero is treated as one.
pub fn build_join_keyboard(
    targets: &[JoinTarget],
    buttons_per_row: usize,
    join_label: &str,
    done_label: &str,
    callback_data: &str,
) -> InlineKeyboard {
    let joins: Vec<InlineButton> = targets
        .iter()
        .enumerate()
        .map(|(i, target)| InlineButton::url(format!("{join_label} {}", i + 1), target.join_url()))
        .collect();

    let mut rows: Vec<Vec<InlineButton>> = joins
        .chunks(buttons_per_row.max(1))
        .map(<[InlineButton]>::to_vec)
        .collect();
    rows.push(vec![InlineButton::callback(done_label, callback_data)]);

    InlineKeyboard { rows }
}

#[cfg(test)]
mod tests {
    use joingate_core::{ButtonAction, ChatRef, MemberStatus};
    use joingate_platform::testing::MockPlatform;

    use super::*;

    fn targets(raw: &[&str]) -> Vec<JoinTarget> {
        raw.iter().map(|r| JoinTarget::parse(r).unwrap()).collect()
    }

    #[tokio::test]
    async fn empty_targets_are_satisfied() {
        let mock = MockPlatform::new();
        assert!(is_joined_all(&mock, 1, &[]).await);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn all_joined_statuses_pass() {
        let mock = MockPlatform::new();
        let ts = targets(&["@a", "-100|https://t.me/+b"]);
        mock.set_member(&ChatRef::Handle("@a".into()), 1, MemberStatus::Restricted);
        mock.set_member(&ChatRef::Id(-100), 1, MemberStatus::Creator);
        assert!(is_joined_all(&mock, 1, &ts).await);
        assert_eq!(mock.membership_queries().len(), 2);
    }

    #[tokio::test]
    async fn left_or_kicked_fails() {
        let mock = MockPlatform::new();
        let ts = targets(&["@a"]);
        mock.set_member(&ChatRef::Handle("@a".into()), 1, MemberStatus::Left);
        assert!(!is_joined_all(&mock, 1, &ts).await);
        mock.set_member(&ChatRef::Handle("@a".into()), 1, MemberStatus::Kicked);
        assert!(!is_joined_all(&mock, 1, &ts).await);
    }

    #[tokio::test]
    async fn first_failure_short_circuits() {
        let mock = MockPlatform::new();
        let ts = targets(&["@a", "@b"]);
        mock.break_chat(&ChatRef::Handle("@a".into()));
        mock.set_member(&ChatRef::Handle("@b".into()), 1, MemberStatus::Member);

        assert!(!is_joined_all(&mock, 1, &ts).await);
        assert_eq!(
            mock.membership_queries(),
            vec![ChatRef::Handle("@a".into())]
        );
    }

    #[tokio::test]
    async fn bare_invite_link_never_passes() {
        let mock = MockPlatform::new();
        let ts = targets(&["https://t.me/+invite"]);
        assert!(!is_joined_all(&mock, 1, &ts).await);
    }

    #[test]
    fn keyboard_wraps_rows() {
        let ts = targets(&["@a", "@b", "-1|https://t.me/+c"]);
        let kb = build_join_keyboard(&ts, 2, "Join", "Done", "jg_done:t");

        assert_eq!(kb.row_sizes(), vec![2, 1, 1]);
        let labels: Vec<&str> = kb.buttons().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["Join 1", "Join 2", "Join 3", "Done"]);
        assert_eq!(kb.rows[0][1].action, ButtonAction::Url("https://t.me/b".into()));
        assert_eq!(kb.rows[1][0].action, ButtonAction::Url("https://t.me/+c".into()));
        assert_eq!(
            kb.rows[2][0].action,
            ButtonAction::Callback("jg_done:t".into())
        );
    }

    #[test]
    fn keyboard_zero_per_row_is_one() {
        let ts = targets(&["@a", "@b"]);
        let kb = build_join_keyboard(&ts, 0, "Join", "Done", "x");
        assert_eq!(kb.row_sizes(), vec![1, 1, 1]);
    }

    #[test]
    fn keyboard_without_targets_has_only_retry_row() {
        let kb = build_join_keyboard(&[], 3, "Join", "Done", "x");
        assert_eq!(kb.row_sizes(), vec![1]);
    }
}
