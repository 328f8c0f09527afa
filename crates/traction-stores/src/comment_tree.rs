//! Pure tree operations over nested comment lists.
//!
//! Comments render newest-first at the top level; replies append in arrival
//! order under their parent at any depth. All operations are synchronous and
//! touch only the slice they are given.

use traction_client::comments::Comment;

/// Find a comment by id anywhere in the tree.
fn find_mut<'a>(nodes: &'a mut [Comment], id: &str) -> Option<&'a mut Comment> {
    for node in nodes {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_mut(&mut node.replies, id) {
            return Some(found);
        }
    }
    None
}

/// Insert a new comment into the tree.
///
/// A parentless comment is prepended to the top level. A reply is appended
/// to its parent's `replies`, wherever the parent sits. A reply whose parent
/// is not present is dropped; returns whether the comment was placed.
pub fn insert(nodes: &mut Vec<Comment>, comment: Comment) -> bool {
    match comment.parent_id.clone() {
        None => {
            nodes.insert(0, comment);
            true
        }
        Some(parent_id) => match find_mut(nodes, &parent_id) {
            Some(parent) => {
                parent.replies.push(comment);
                true
            }
            None => false,
        },
    }
}

/// Replace a comment's content fields in place, keeping its `replies`.
/// A comment that is not in the tree is left alone; returns whether a node
/// was updated.
pub fn update(nodes: &mut [Comment], updated: Comment) -> bool {
    match find_mut(nodes, &updated.id) {
        Some(node) => {
            let replies = std::mem::take(&mut node.replies);
            *node = updated;
            node.replies = replies;
            true
        }
        None => false,
    }
}

/// Remove a comment wherever it sits; its descendants go with it.
/// Returns whether a node was removed.
pub fn remove(nodes: &mut Vec<Comment>, id: &str) -> bool {
    if let Some(index) = nodes.iter().position(|node| node.id == id) {
        nodes.remove(index);
        return true;
    }
    for node in nodes {
        if remove(&mut node.replies, id) {
            return true;
        }
    }
    false
}

/// Count every comment in the tree, replies included.
pub fn count(nodes: &[Comment]) -> usize {
    nodes.iter().map(|node| 1 + count(&node.replies)).sum()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use chrono::Utc;

    fn comment(id: &str, parent_id: Option<&str>) -> Comment {
        Comment {
            id: id.to_string(),
            issue_id: "iss-1".to_string(),
            parent_id: parent_id.map(String::from),
            user_id: "usr-1".to_string(),
            body: format!("body of {}", id),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            edited_at: None,
            user: None,
            replies: Vec::new(),
        }
    }

    #[test]
    fn test_parentless_insert_prepends() {
        let mut tree = vec![comment("c1", None)];
        assert!(insert(&mut tree, comment("c2", None)));
        assert_eq!(tree[0].id, "c2");
        assert_eq!(tree[1].id, "c1");
    }

    #[test]
    fn test_reply_appends_at_depth_one() {
        let mut tree = vec![comment("c1", None)];
        tree[0].replies.push(comment("r1", Some("c1")));
        tree[0].replies.push(comment("r2", Some("c1")));

        assert!(insert(&mut tree, comment("r3", Some("c1"))));
        let replies: Vec<&str> = tree[0].replies.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(replies, ["r1", "r2", "r3"]);
    }

    #[test]
    fn test_reply_appends_at_depth_two() {
        let mut tree = vec![comment("c1", None)];
        tree[0].replies.push(comment("r1", Some("c1")));

        assert!(insert(&mut tree, comment("rr1", Some("r1"))));
        assert_eq!(tree[0].replies[0].replies[0].id, "rr1");
    }

    #[test]
    fn test_reply_to_missing_parent_is_dropped() {
        let mut tree = vec![comment("c1", None)];
        assert!(!insert(&mut tree, comment("orphan", Some("gone"))));
        assert_eq!(count(&tree), 1);
    }

    #[test]
    fn test_update_preserves_replies() {
        let mut tree = vec![comment("c1", None)];
        tree[0].replies.push(comment("r1", Some("c1")));
        tree[0].replies.push(comment("r2", Some("c1")));

        let mut edited = comment("c1", None);
        edited.body = "edited".to_string();
        assert!(update(&mut tree, edited));

        assert_eq!(tree[0].body, "edited");
        assert_eq!(tree[0].replies.len(), 2);
    }

    #[test]
    fn test_update_missing_comment_is_noop() {
        let mut tree = vec![comment("c1", None)];
        assert!(!update(&mut tree, comment("gone", None)));
        assert_eq!(tree[0].body, "body of c1");
    }

    #[test]
    fn test_remove_takes_subtree() {
        let mut tree = vec![comment("c1", None), comment("c2", None)];
        tree[0].replies.push(comment("r1", Some("c1")));
        tree[0].replies[0].replies.push(comment("rr1", Some("r1")));

        assert!(remove(&mut tree, "c1"));
        assert_eq!(count(&tree), 1);
        assert_eq!(tree[0].id, "c2");
    }

    #[test]
    fn test_remove_nested_reply() {
        let mut tree = vec![comment("c1", None)];
        tree[0].replies.push(comment("r1", Some("c1")));
        tree[0].replies[0].replies.push(comment("rr1", Some("r1")));

        assert!(remove(&mut tree, "rr1"));
        assert_eq!(tree[0].replies[0].replies.len(), 0);
        assert!(!remove(&mut tree, "rr1"));
    }
}
