use dashmap::DashMap;

/// Which draft each editor currently has open.
///
/// Advisory bookkeeping only. Correctness comes from draft versions and the
/// serialized confirmation write.
#[derive(Debug, Default)]
pub struct EditorSessions {
    open: DashMap<String, String>,
}

impl EditorSessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `draft_id` as the editor's open draft and returns the draft it
    /// replaces, if different. Other editors holding the same draft lose it.
    pub fn open(&self, editor_id: &str, draft_id: &str) -> Option<String> {
        self.open
            .retain(|editor, open_draft| editor == editor_id || open_draft != draft_id);
        self.open
            .insert(editor_id.to_string(), draft_id.to_string())
            .filter(|previous| previous != draft_id)
    }

    /// Drops every session holding `draft_id`.
    pub fn release_draft(&self, draft_id: &str) {
        self.open.retain(|_, open_draft| open_draft != draft_id);
    }

    pub fn open_draft_of(&self, editor_id: &str) -> Option<String> {
        self.open.get(editor_id).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_second_draft_releases_first() {
        let sessions = EditorSessions::new();
        assert_eq!(sessions.open("ed-1", "d1"), None);
        assert_eq!(sessions.open("ed-1", "d1"), None);
        assert_eq!(sessions.open("ed-1", "d2"), Some("d1".to_string()));
        assert_eq!(sessions.open_draft_of("ed-1").as_deref(), Some("d2"));
    }

    #[test]
    fn test_draft_moves_between_editors() {
        let sessions = EditorSessions::new();
        sessions.open("ed-1", "d1");
        sessions.open("ed-2", "d1");
        assert_eq!(sessions.open_draft_of("ed-1"), None);
        assert_eq!(sessions.open_draft_of("ed-2").as_deref(), Some("d1"));

        sessions.release_draft("d1");
        assert_eq!(sessions.open_draft_of("ed-2"), None);
    }
}
