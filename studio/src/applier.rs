//! Edit applier: first-occurrence substitution committed as a history entry.

use serde::{Deserialize, Serialize};

use crate::document::{DocumentStore, EditSource};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    Applied,
    /// Target no longer in the document: stale or already applied.
    TargetMissing,
    /// Empty target; nothing sensible to replace.
    NotActionable,
}

impl ApplyOutcome {
    pub fn applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied)
    }
}

/// Replace the first occurrence of `target`. `None` if it does not occur.
pub fn replace_first(document: &str, target: &str, replacement: &str) -> Option<String> {
    if target.is_empty() {
        return None;
    }
    let start = document.find(target)?;
    let mut next = String::with_capacity(document.len() - target.len() + replacement.len());
    next.push_str(&document[..start]);
    next.push_str(replacement);
    next.push_str(&document[start + target.len()..]);
    Some(next)
}

pub fn apply(
    store: &mut DocumentStore,
    target: &str,
    replacement: &str,
    suppress_highlight: bool,
) -> ApplyOutcome {
    if target.is_empty() {
        return ApplyOutcome::NotActionable;
    }
    let Some(next) = replace_first(store.current(), target, replacement) else {
        tracing::debug!(target_len = target.len(), "Apply skipped; target not in document");
        return ApplyOutcome::TargetMissing;
    };

    let changed = if suppress_highlight || replacement.is_empty() {
        None
    } else {
        Some(replacement.to_string())
    };
    store.commit(next, changed, EditSource::Suggestion);
    tracing::info!(
        revision = store.revision(),
        highlighted = !suppress_highlight,
        "Applied suggested edit"
    );
    ApplyOutcome::Applied
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_only_first_occurrence() {
        let mut store = DocumentStore::new("bad bad");
        assert_eq!(apply(&mut store, "bad", "good", false), ApplyOutcome::Applied);
        assert_eq!(store.current(), "good bad");
        assert_eq!(store.last_changed(), Some("good"));
        assert_eq!(store.current_snapshot().source, EditSource::Suggestion);
    }

    #[test]
    fn second_apply_is_noop_once_target_is_gone() {
        let mut store = DocumentStore::new("I has a dog");
        assert!(apply(&mut store, "has", "have", false).applied());
        let revision = store.revision();

        assert_eq!(apply(&mut store, "has", "have", false), ApplyOutcome::TargetMissing);
        assert_eq!(store.current(), "I have a dog");
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn suppressed_highlight_records_no_changed_span() {
        let mut store = DocumentStore::new("very important");
        apply(&mut store, "very important", "crucial", true);
        assert_eq!(store.current(), "crucial");
        assert_eq!(store.last_changed(), None);
    }

    #[test]
    fn deletion_records_no_changed_span() {
        let mut store = DocumentStore::new("a really really long day");
        apply(&mut store, "really ", "", false);
        assert_eq!(store.current(), "a really long day");
        assert_eq!(store.last_changed(), None);
    }

    #[test]
    fn empty_target_is_not_actionable() {
        let mut store = DocumentStore::new("text");
        assert_eq!(apply(&mut store, "", "x", false), ApplyOutcome::NotActionable);
        assert_eq!(store.len(), 1);
        assert_eq!(replace_first("text", "", "x"), None);
    }

    #[test]
    fn replace_first_handles_multibyte_boundaries() {
        assert_eq!(
            replace_first("naïve naïve", "naïve", "naive").as_deref(),
            Some("naive naïve")
        );
    }
}
