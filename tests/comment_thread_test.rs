//! Longer operation sequences against the comment-thread store.
//!
//! The unit tests beside the store cover each operation; these runs mix
//! operations the way a busy item page would and check the count invariant
//! after every step.

use chrono::Utc;
use recirc::comments::CommentThread;
use recirc::models::{Comment, CommentAuthor};

fn comment(id: i64) -> Comment {
    Comment {
        id,
        content: format!("comment {id}"),
        author: CommentAuthor {
            id: 1,
            username: "alice".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        },
        parent: None,
        replies: Vec::new(),
        reply_count: 0,
        is_reply: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn reply(id: i64, parent: i64) -> Comment {
    Comment {
        parent: Some(parent),
        is_reply: true,
        ..comment(id)
    }
}

#[test]
fn interleaved_mutations_never_break_the_count_invariant() {
    let mut thread = CommentThread::default();

    // Build up five top-level comments, each with a growing pile of replies,
    // deleting and editing along the way.
    for id in 1..=5 {
        thread = thread.add_comment(comment(id));
        assert!(thread.counts_consistent(), "after add_comment({id})");

        for r in 0..id {
            thread = thread.add_reply(id, reply(100 * id + r, id));
            assert!(thread.counts_consistent(), "after add_reply to {id}");
        }
    }

    // Delete one reply from each comment that has any.
    for id in 1..=5 {
        thread = thread.delete_comment(100 * id);
        assert!(thread.counts_consistent(), "after deleting reply of {id}");
    }

    // Edit a top-level comment and a reply.
    let mut edited = comment(3);
    edited.content = "edited top-level".to_string();
    thread = thread.update_comment(edited);
    assert!(thread.counts_consistent());

    let mut edited_reply = reply(502, 5);
    edited_reply.content = "edited reply".to_string();
    thread = thread.update_comment(edited_reply);
    assert!(thread.counts_consistent());

    // Drop a whole top-level comment, replies and all.
    thread = thread.delete_comment(5);
    assert!(thread.counts_consistent());
    assert_eq!(thread.len(), 4);
}

#[test]
fn unknown_targets_are_silently_ignored() {
    let mut thread = CommentThread::new(vec![comment(1), comment(2)]);
    thread = thread.add_reply(1, reply(10, 1));

    let before: Vec<i64> = thread.comments().iter().map(|c| c.id).collect();

    // None of these ids exist anywhere in the thread.
    let after = thread
        .add_reply(999, reply(11, 999))
        .delete_comment(999)
        .update_comment(comment(999));

    let after_ids: Vec<i64> = after.comments().iter().map(|c| c.id).collect();
    assert_eq!(before, after_ids);
    assert_eq!(after.comments()[0].replies.len(), 1);
    assert!(after.counts_consistent());
}

#[test]
fn deleting_every_comment_empties_the_thread() {
    let mut thread = CommentThread::default();
    for id in 1..=4 {
        thread = thread.add_comment(comment(id)).add_reply(id, reply(10 + id, id));
    }

    // Replies first, then their parents, in arbitrary order.
    for id in [12, 3, 11, 1, 14, 4, 13, 2] {
        thread = thread.delete_comment(id);
        assert!(thread.counts_consistent(), "after delete_comment({id})");
    }

    assert!(thread.is_empty());
    assert_eq!(thread.total_count(), 0);
}

#[test]
fn newest_comment_stays_first_through_mutations() {
    let mut thread = CommentThread::default();
    for id in 1..=3 {
        thread = thread.add_comment(comment(id));
    }
    thread = thread.add_reply(2, reply(20, 2)).delete_comment(1);

    let ids: Vec<i64> = thread.comments().iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![3, 2]);
}
