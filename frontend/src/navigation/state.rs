use std::collections::HashSet;

/// One observer report, reduced to what the controller needs.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionEntry {
    /// Section id for the active-section watch, reveal key for the reveal watch.
    pub key: String,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn new(key: impl Into<String>, is_intersecting: bool) -> Self {
        Self {
            key: key.into(),
            is_intersecting,
        }
    }
}

/// Fragment id of an in-page link, `None` for links that go elsewhere.
pub fn anchor_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// The section that should own the active marker after a batch of entries.
/// Entries are taken in observer order and the last intersecting one wins.
pub fn resolve_active_section(entries: &[IntersectionEntry]) -> Option<&str> {
    entries
        .iter()
        .filter(|entry| entry.is_intersecting && !entry.key.is_empty())
        .last()
        .map(|entry| entry.key.as_str())
}

/// Index of the nav link that should carry the active marker for `section_id`.
/// Only the first matching link is returned.
pub fn active_link_index<S: AsRef<str>>(link_hrefs: &[S], section_id: &str) -> Option<usize> {
    link_hrefs
        .iter()
        .position(|href| anchor_id(href.as_ref()) == Some(section_id))
}

/// One key per reveal target, by document position. Element ids are not
/// used, so an id such as `reveal-1` cannot shadow another target.
pub fn reveal_keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("reveal-{}", i)).collect()
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct NavigationState {
    pub active_section_id: Option<String>,
    pub revealed_ids: HashSet<String>,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a batch of active-section entries. Returns the new active id
    /// when the batch contains an intersecting section.
    pub fn apply_section_entries(&mut self, entries: &[IntersectionEntry]) -> Option<String> {
        let id = resolve_active_section(entries)?.to_string();
        self.active_section_id = Some(id.clone());
        Some(id)
    }

    /// Latches every intersecting key. Returns only the keys revealed by this batch.
    pub fn apply_reveal_entries(&mut self, entries: &[IntersectionEntry]) -> Vec<String> {
        let mut newly = Vec::new();
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            if self.revealed_ids.insert(entry.key.clone()) {
                newly.push(entry.key.clone());
            }
        }
        newly
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(raw: &[(&str, bool)]) -> Vec<IntersectionEntry> {
        raw.iter()
            .map(|(key, on)| IntersectionEntry::new(*key, *on))
            .collect()
    }

    #[test]
    fn anchor_id_only_accepts_fragments() {
        assert_eq!(anchor_id("#planning"), Some("planning"));
        assert_eq!(anchor_id("#"), None);
        assert_eq!(anchor_id("tarifs.html"), None);
        assert_eq!(anchor_id("https://example.com/#about"), None);
        assert_eq!(anchor_id(""), None);
    }

    #[test]
    fn last_intersecting_entry_wins() {
        let batch = entries(&[("hero", true), ("cours", true), ("tarifs", false)]);
        assert_eq!(resolve_active_section(&batch), Some("cours"));
    }

    #[test]
    fn no_intersecting_entry_resolves_to_none() {
        let batch = entries(&[("hero", false), ("cours", false)]);
        assert_eq!(resolve_active_section(&batch), None);
        assert_eq!(resolve_active_section(&[]), None);
    }

    #[test]
    fn leaving_sections_keep_previous_active() {
        let mut state = NavigationState::new();
        state.apply_section_entries(&entries(&[("cours", true)]));
        assert_eq!(state.apply_section_entries(&entries(&[("cours", false)])), None);
        assert_eq!(state.active_section_id.as_deref(), Some("cours"));
    }

    #[test]
    fn first_matching_link_is_active() {
        let links = ["#hero", "planning.html", "#cours", "#cours"];
        assert_eq!(active_link_index(&links, "cours"), Some(2));
        assert_eq!(active_link_index(&links, "contact"), None);
    }

    #[test]
    fn reveal_keys_are_unique_per_target() {
        let keys = reveal_keys(3);
        assert_eq!(keys, vec!["reveal-0", "reveal-1", "reveal-2"]);
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(reveal_keys(0).is_empty());
    }

    #[test]
    fn reveal_is_a_one_way_latch() {
        let mut state = NavigationState::new();
        assert_eq!(
            state.apply_reveal_entries(&entries(&[("reveal-0", true), ("reveal-1", false)])),
            vec!["reveal-0".to_string()]
        );
        // Scrolled away and back again.
        assert!(state
            .apply_reveal_entries(&entries(&[("reveal-0", false)]))
            .is_empty());
        assert!(state
            .apply_reveal_entries(&entries(&[("reveal-0", true)]))
            .is_empty());
        assert!(state.revealed_ids.contains("reveal-0"));
        assert!(!state.revealed_ids.contains("reveal-1"));
        assert_eq!(state.revealed_ids.len(), 1);
    }
}
