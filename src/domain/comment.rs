use std::collections::HashSet;

/// Insertion-ordered, duplicate-free set of normalized comment texts.
///
/// Comments carry no server-assigned id, so identity is the normalized text.
/// Iteration order is first-seen order, which the caption heuristic relies on.
#[derive(Debug, Clone, Default)]
pub struct CommentSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl CommentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a comment. Returns false for duplicates and for blank text.
    pub fn insert(&mut self, text: String) -> bool {
        if text.trim().is_empty() || self.seen.contains(&text) {
            return false;
        }
        self.seen.insert(text.clone());
        self.order.push(text);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Split off the first-seen entry (the post caption) from the comments.
    pub fn into_caption_and_comments(self) -> (Option<String>, Vec<String>) {
        let mut order = self.order;
        if order.is_empty() {
            return (None, order);
        }
        let caption = order.remove(0);
        (Some(caption), order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_of(items: &[&str]) -> CommentSet {
        let mut set = CommentSet::new();
        for item in items {
            set.insert((*item).to_string());
        }
        set
    }

    #[test]
    fn test_insert_preserves_order() {
        let set = set_of(&["c", "a", "b"]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicates_are_noop() {
        let mut set = set_of(&["a", "b"]);
        assert!(!set.insert("a".into()));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_blank_text_never_stored() {
        let mut set = CommentSet::new();
        assert!(!set.insert(String::new()));
        assert!(!set.insert("  \n ".into()));
        assert!(set.is_empty());
    }

    #[test]
    fn test_caption_exclusion() {
        let (caption, comments) = set_of(&["A", "B", "C"]).into_caption_and_comments();
        assert_eq!(caption.as_deref(), Some("A"));
        assert_eq!(comments, vec!["B", "C"]);
    }

    #[test]
    fn test_caption_exclusion_empty() {
        let (caption, comments) = CommentSet::new().into_caption_and_comments();
        assert!(caption.is_none());
        assert!(comments.is_empty());
    }

    #[test]
    fn test_caption_exclusion_single() {
        let (caption, comments) = set_of(&["only"]).into_caption_and_comments();
        assert_eq!(caption.as_deref(), Some("only"));
        assert!(comments.is_empty());
    }
}
