//! Local comment-thread state for a single post.
//!
//! The backend serves top-level comments with their replies inline. After the
//! initial load every mutation (create/reply/edit/delete) is reconciled
//! locally once the corresponding API call succeeds, with no re-fetch. The
//! thread is only ever two levels deep: top-level comments own a flat list of
//! replies, and replies own nothing.
//!
//! Every operation builds new state instead of mutating in place, so a failed
//! API call can simply drop the candidate thread and keep the old one.

use crate::models::Comment;

#[derive(Debug, Clone, Default)]
pub struct CommentThread {
    comments: Vec<Comment>,
}

impl CommentThread {
    /// Wrap a freshly fetched list of top-level comments.
    pub fn new(comments: Vec<Comment>) -> Self {
        Self { comments }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    /// Total number of comments including replies, as shown in the page header.
    pub fn total_count(&self) -> i64 {
        self.comments
            .iter()
            .map(|c| 1 + c.replies.len() as i64)
            .sum()
    }

    /// Prepend a newly created top-level comment.
    pub fn add_comment(&self, comment: Comment) -> Self {
        let mut comments = Vec::with_capacity(self.comments.len() + 1);
        comments.push(comment);
        comments.extend(self.comments.iter().cloned());
        Self { comments }
    }

    /// Append `reply` to the top-level comment with id `parent_id` and bump
    /// its reply count. Leaves the thread unchanged when no parent matches.
    pub fn add_reply(&self, parent_id: i64, reply: Comment) -> Self {
        let comments = self
            .comments
            .iter()
            .map(|comment| {
                if comment.id == parent_id {
                    let mut replies = comment.replies.clone();
                    replies.push(reply.clone());
                    Comment {
                        reply_count: comment.reply_count + 1,
                        replies,
                        ..comment.clone()
                    }
                } else {
                    comment.clone()
                }
            })
            .collect();
        Self { comments }
    }

    /// Replace a comment by id, wherever it lives: at the top level, or
    /// inside some top-level comment's replies.
    pub fn update_comment(&self, updated: Comment) -> Self {
        let comments = self
            .comments
            .iter()
            .map(|comment| {
                if comment.id == updated.id {
                    return updated.clone();
                }
                if comment.replies.iter().any(|r| r.id == updated.id) {
                    let replies = comment
                        .replies
                        .iter()
                        .map(|r| {
                            if r.id == updated.id {
                                updated.clone()
                            } else {
                                r.clone()
                            }
                        })
                        .collect();
                    return Comment {
                        replies,
                        ..comment.clone()
                    };
                }
                comment.clone()
            })
            .collect();
        Self { comments }
    }

    /// Remove a comment by id. A top-level match drops the comment and all of
    /// its replies; a reply match rebuilds the owning comment with the reply
    /// filtered out and the count decremented, floored at zero.
    pub fn delete_comment(&self, id: i64) -> Self {
        let comments = self
            .comments
            .iter()
            .filter(|comment| comment.id != id)
            .map(|comment| {
                if comment.replies.iter().any(|r| r.id == id) {
                    let replies: Vec<Comment> = comment
                        .replies
                        .iter()
                        .filter(|r| r.id != id)
                        .cloned()
                        .collect();
                    Comment {
                        reply_count: (comment.reply_count - 1).max(0),
                        replies,
                        ..comment.clone()
                    }
                } else {
                    comment.clone()
                }
            })
            .collect();
        Self { comments }
    }

    /// Holds for any sequence of thread operations; checked by tests after
    /// each step.
    pub fn counts_consistent(&self) -> bool {
        self.comments
            .iter()
            .all(|c| c.reply_count == c.replies.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommentAuthor;
    use chrono::Utc;

    fn author() -> CommentAuthor {
        CommentAuthor {
            id: 1,
            username: "alice".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    fn comment(id: i64) -> Comment {
        Comment {
            id,
            content: format!("comment {id}"),
            author: author(),
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
    fn add_comment_prepends() {
        let thread = CommentThread::new(vec![comment(1)])
            .add_comment(comment(2))
            .add_comment(comment(3));
        let ids: Vec<i64> = thread.comments().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(thread.counts_consistent());
    }

    #[test]
    fn add_reply_appends_and_bumps_count() {
        let thread = CommentThread::new(vec![comment(1), comment(2)])
            .add_reply(1, reply(10, 1))
            .add_reply(1, reply(11, 1));
        let parent = &thread.comments()[0];
        assert_eq!(parent.reply_count, 2);
        assert_eq!(parent.replies.len(), 2);
        assert_eq!(parent.replies[1].id, 11);
        assert!(thread.counts_consistent());
    }

    #[test]
    fn add_reply_to_unknown_parent_is_a_no_op() {
        let before = CommentThread::new(vec![comment(1)]);
        let after = before.add_reply(99, reply(10, 99));
        assert_eq!(after.len(), 1);
        assert!(after.comments()[0].replies.is_empty());
        assert!(after.counts_consistent());
    }

    #[test]
    fn update_replaces_top_level_comment() {
        let thread = CommentThread::new(vec![comment(1), comment(2)]);
        let mut edited = comment(2);
        edited.content = "edited".to_string();
        let after = thread.update_comment(edited);
        assert_eq!(after.comments()[1].content, "edited");
        assert_eq!(after.comments()[0].content, "comment 1");
    }

    #[test]
    fn update_replaces_nested_reply() {
        let thread = CommentThread::new(vec![comment(1)]).add_reply(1, reply(10, 1));
        let mut edited = reply(10, 1);
        edited.content = "actually nevermind".to_string();
        let after = thread.update_comment(edited);
        assert_eq!(after.comments()[0].replies[0].content, "actually nevermind");
        assert!(after.counts_consistent());
    }

    #[test]
    fn delete_removes_top_level_comment_with_replies() {
        let thread = CommentThread::new(vec![comment(1), comment(2)]).add_reply(1, reply(10, 1));
        let after = thread.delete_comment(1);
        assert_eq!(after.len(), 1);
        assert_eq!(after.comments()[0].id, 2);
    }

    #[test]
    fn delete_removes_reply_and_decrements_count() {
        let thread = CommentThread::new(vec![comment(1)])
            .add_reply(1, reply(10, 1))
            .add_reply(1, reply(11, 1));
        let after = thread.delete_comment(10);
        let parent = &after.comments()[0];
        assert_eq!(parent.reply_count, 1);
        assert_eq!(parent.replies.len(), 1);
        assert_eq!(parent.replies[0].id, 11);
        assert!(after.counts_consistent());
    }

    #[test]
    fn delete_unknown_id_leaves_thread_unchanged() {
        let thread = CommentThread::new(vec![comment(1)]).add_reply(1, reply(10, 1));
        let after = thread.delete_comment(999);
        assert_eq!(after.len(), 1);
        assert_eq!(after.comments()[0].replies.len(), 1);
        assert!(after.counts_consistent());
    }

    #[test]
    fn delete_does_not_disturb_original_thread() {
        let before = CommentThread::new(vec![comment(1)]).add_reply(1, reply(10, 1));
        let _ = before.delete_comment(10);
        // The source thread must be untouched by the rebuild.
        assert_eq!(before.comments()[0].replies.len(), 1);
        assert_eq!(before.comments()[0].reply_count, 1);
    }

    #[test]
    fn reply_count_floors_at_zero_on_inconsistent_input() {
        // A backend payload could claim zero replies while carrying one.
        let mut parent = comment(1);
        parent.replies.push(reply(10, 1));
        parent.reply_count = 0;
        let after = CommentThread::new(vec![parent]).delete_comment(10);
        assert_eq!(after.comments()[0].reply_count, 0);
    }

    #[test]
    fn mixed_operation_sequence_keeps_counts_consistent() {
        let mut thread = CommentThread::new(Vec::new());
        thread = thread.add_comment(comment(1));
        assert!(thread.counts_consistent());
        thread = thread.add_comment(comment(2));
        thread = thread.add_reply(1, reply(10, 1));
        assert!(thread.counts_consistent());
        thread = thread.add_reply(2, reply(11, 2));
        thread = thread.add_reply(2, reply(12, 2));
        assert!(thread.counts_consistent());
        thread = thread.delete_comment(11);
        assert!(thread.counts_consistent());
        let mut edited = reply(12, 2);
        edited.content = "edited".to_string();
        thread = thread.update_comment(edited);
        assert!(thread.counts_consistent());
        thread = thread.delete_comment(1);
        assert!(thread.counts_consistent());
        assert_eq!(thread.total_count(), 2);
    }
}
