//! Recency-ranked conversation list with display-name derivation.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use causerie_shared::constants::{DIRECT_PARTICIPANTS, DUPLICATE_NAME_SUFFIX};
use causerie_shared::{ChatId, UserId};
use causerie_store::Conversation;

use crate::context::AppContext;
use crate::error::ChatError;

/// The user's conversations, most recently active first.
///
/// `names` holds the derived display names in ranked order; `index` maps a
/// display name back to its conversation.  When two entries end up with the
/// same display name the index keeps the later one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentChats {
    pub names: Vec<String>,
    pub index: HashMap<String, ChatId>,
}

fn display_name(conversation: &Conversation, user_id: &UserId) -> String {
    if conversation.participants.len() == DIRECT_PARTICIPANTS {
        conversation
            .participants
            .iter()
            .find(|p| *p != user_id)
            .map(|p| p.to_string())
            .unwrap_or_else(|| conversation.name.clone())
    } else {
        conversation.name.clone()
    }
}

/// List the user's conversations ranked by last activity.
///
/// Conversations that never saw a message sort last, in their stored
/// relative order.  A display name colliding with an earlier entry gets one
/// "(copy)" suffix; a third conversation with the same base name is not
/// disambiguated further and produces a second identical "(copy)" entry.
pub fn list_recent_chats(ctx: &AppContext, user_id: &UserId) -> Result<RecentChats, ChatError> {
    // The message snapshot belongs to whichever conversation gets opened
    // next, so switching to the recents view drops it.
    ctx.messages.clear()?;
    ctx.gateway.refresh_conversations_for(user_id)?;

    let mut ranked: Vec<Conversation> = ctx
        .conversations
        .find_all()?
        .into_iter()
        .filter(|c| c.is_participant(user_id))
        .collect();

    ranked.sort_by(|a, b| match (a.last_activity, b.last_activity) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    debug!(user = %user_id, count = ranked.len(), "ranked recent chats");

    let mut names = Vec::with_capacity(ranked.len());
    let mut index = HashMap::new();
    for conversation in ranked {
        let mut name = display_name(&conversation, user_id);
        if names.contains(&name) {
            name.push_str(DUPLICATE_NAME_SUFFIX);
        }
        index.insert(name.clone(), conversation.id);
        names.push(name);
    }

    Ok(RecentChats { names, index })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chats::{create_group, open_direct_chat};
    use crate::testutil::{context_with_users, TestContext};
    use causerie_store::{Conversation, MessageRepository};
    use chrono::{Duration, Utc};

    fn seed_conversation(
        fx: &TestContext,
        participants: &[&str],
        name: &str,
        seconds_ago: Option<i64>,
    ) -> ChatId {
        let conversation = Conversation {
            id: ChatId::new(),
            name: name.to_string(),
            participants: participants.iter().map(|u| UserId::from(*u)).collect(),
            message_ids: Vec::new(),
            last_activity: seconds_ago.map(|s| Utc::now() - Duration::seconds(s)),
            color: "#9C27B0".to_string(),
        };
        fx.ctx.gateway.persist_conversation(conversation.clone()).unwrap();
        conversation.id
    }

    #[test]
    fn ranks_by_activity_with_missing_timestamps_last() {
        let fx = context_with_users(&["alice", "bob", "carol", "dave"]);
        let c1 = seed_conversation(&fx, &["alice", "bob"], "bob", Some(60));
        let c2 = seed_conversation(&fx, &["alice", "carol"], "carol", None);
        let c3 = seed_conversation(&fx, &["alice", "dave"], "dave", Some(10));

        let recents = list_recent_chats(&fx.ctx, &"alice".into()).unwrap();

        assert_eq!(recents.names, ["dave", "bob", "carol"]);
        assert_eq!(recents.index["dave"], c3);
        assert_eq!(recents.index["bob"], c1);
        assert_eq!(recents.index["carol"], c2);
    }

    #[test]
    fn idle_conversations_keep_their_stored_order() {
        let fx = context_with_users(&["alice", "bob", "carol", "dave"]);
        seed_conversation(&fx, &["alice", "bob"], "bob", None);
        seed_conversation(&fx, &["alice", "carol"], "carol", None);
        seed_conversation(&fx, &["alice", "dave"], "dave", None);

        let recents = list_recent_chats(&fx.ctx, &"alice".into()).unwrap();
        assert_eq!(recents.names, ["bob", "carol", "dave"]);
    }

    #[test]
    fn other_users_conversations_are_excluded() {
        let fx = context_with_users(&["alice", "bob", "carol", "dave"]);
        seed_conversation(&fx, &["alice", "bob"], "bob", Some(10));
        seed_conversation(&fx, &["carol", "dave"], "dave", Some(5));

        let recents = list_recent_chats(&fx.ctx, &"alice".into()).unwrap();
        assert_eq!(recents.names, ["bob"]);
    }

    #[test]
    fn direct_chats_display_the_other_participant() {
        let fx = context_with_users(&["alice", "bob", "carol", "dave"]);
        open_direct_chat(&fx.ctx, "alice", "bob").unwrap();
        create_group(
            &fx.ctx,
            "alice",
            &["bob".into(), "carol".into(), "dave".into()],
            "book club",
        )
        .unwrap();

        let recents = list_recent_chats(&fx.ctx, &"alice".into()).unwrap();
        assert!(recents.names.contains(&"bob".to_string()));
        assert!(recents.names.contains(&"book club".to_string()));
    }

    #[test]
    fn colliding_names_get_one_copy_suffix() {
        let fx = context_with_users(&["alice", "bob", "carol", "dave"]);
        seed_conversation(&fx, &["alice", "bob", "carol"], "friends", Some(10));
        let later = seed_conversation(&fx, &["alice", "bob", "dave"], "friends", Some(20));

        let recents = list_recent_chats(&fx.ctx, &"alice".into()).unwrap();
        assert_eq!(recents.names, ["friends", "friends(copy)"]);
        assert_eq!(recents.index["friends(copy)"], later);
    }

    #[test]
    fn third_collision_is_not_further_disambiguated() {
        let fx = context_with_users(&["alice", "bob", "carol", "dave"]);
        seed_conversation(&fx, &["alice", "bob", "carol"], "friends", Some(10));
        seed_conversation(&fx, &["alice", "carol", "dave"], "friends", Some(20));
        let last = seed_conversation(&fx, &["alice", "bob", "dave"], "friends", Some(30));

        let recents = list_recent_chats(&fx.ctx, &"alice".into()).unwrap();

        // Known quirk kept from the original behavior: the suffix is applied
        // once, so the second and third entries read identically and the
        // index keeps the later conversation under the suffixed name.
        assert_eq!(recents.names, ["friends", "friends(copy)", "friends(copy)"]);
        assert_eq!(recents.index["friends(copy)"], last);
    }

    #[test]
    fn listing_clears_the_message_snapshot() {
        let fx = context_with_users(&["alice", "bob"]);
        let chat = open_direct_chat(&fx.ctx, "alice", "bob").unwrap().chat_id;
        crate::messaging::send_message(&fx.ctx, &chat, &"alice".into(), None, "hi").unwrap();
        assert!(!fx.messages.find_by_conversation(&chat).unwrap().is_empty());

        list_recent_chats(&fx.ctx, &"alice".into()).unwrap();
        assert!(fx.messages.find_by_conversation(&chat).unwrap().is_empty());
    }
}
