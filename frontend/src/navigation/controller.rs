use log::debug;

use crate::config::Layout;
use crate::navigation::state::{
    active_link_index, anchor_id, IntersectionEntry, NavigationState,
};

/// The slice of the browser the navigation controller reads and writes.
pub trait Viewport {
    /// Rendered height of the page header, `None` when the page has none.
    fn header_height(&self) -> Option<f64>;
    fn scroll_y(&self) -> f64;
    /// Top edge of the element with `id`, relative to the viewport top.
    fn element_top(&self, id: &str) -> Option<f64>;
    fn smooth_scroll_to(&self, top: f64);
    fn set_layout_variable(&self, name: &str, value: &str);
    /// Clears the active marker from every nav link, then sets it on `index`.
    fn set_active_link(&self, index: Option<usize>);
    fn mark_revealed(&self, key: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickDisposition {
    /// The controller scrolled; the default navigation must be prevented.
    Intercepted,
    /// Leave the click to the browser.
    Default,
}

/// Document scroll offset that puts an element `element_top` px below the
/// viewport top at `header_offset + padding` px instead.
pub fn scroll_target(scroll_y: f64, element_top: f64, header_offset: f64, padding: f64) -> f64 {
    (scroll_y + element_top - header_offset - padding).max(0.0)
}

pub struct NavigationController<V> {
    viewport: V,
    layout: Layout,
    link_hrefs: Vec<String>,
    state: NavigationState,
}

impl<V: Viewport> NavigationController<V> {
    pub fn new(viewport: V, layout: Layout, link_hrefs: Vec<String>) -> Self {
        Self {
            viewport,
            layout,
            link_hrefs,
            state: NavigationState::new(),
        }
    }

    /// Read fresh on every call so resizes are always reflected.
    pub fn compute_header_offset(&self) -> f64 {
        self.viewport
            .header_height()
            .unwrap_or(self.layout.fallback_header_height)
    }

    /// Smooth-scrolls to `anchor_id`. Returns the scroll offset requested,
    /// or `None` when the page has no such element.
    pub fn scroll_to_anchor(&self, anchor_id: &str, extra_padding: f64) -> Option<f64> {
        let top = self.viewport.element_top(anchor_id)?;
        let target = scroll_target(
            self.viewport.scroll_y(),
            top,
            self.compute_header_offset(),
            extra_padding,
        );
        debug!("Scrolling to #{} at {}px", anchor_id, target);
        self.viewport.smooth_scroll_to(target);
        Some(target)
    }

    /// In-page links with an existing target are scrolled to; anything
    /// else, including fragments with no matching element, is left to the browser.
    pub fn handle_nav_click(&self, href: &str) -> ClickDisposition {
        let Some(id) = anchor_id(href) else {
            return ClickDisposition::Default;
        };
        match self.scroll_to_anchor(id, self.layout.anchor_padding) {
            Some(_) => ClickDisposition::Intercepted,
            None => {
                debug!("No element for #{}, using default navigation", id);
                ClickDisposition::Default
            }
        }
    }

    pub fn on_section_entries(&mut self, entries: &[IntersectionEntry]) {
        if let Some(id) = self.state.apply_section_entries(entries) {
            let index = active_link_index(&self.link_hrefs, &id);
            debug!("Active section #{} (link {:?})", id, index);
            self.viewport.set_active_link(index);
        }
    }

    /// Returns the keys revealed by this batch; each key is reported once.
    pub fn on_reveal_entries(&mut self, entries: &[IntersectionEntry]) -> Vec<String> {
        let newly = self.state.apply_reveal_entries(entries);
        for key in &newly {
            debug!("Revealed {}", key);
            self.viewport.mark_revealed(key);
        }
        newly
    }

    /// Reveals every key at once, for browsers with no intersection support.
    pub fn reveal_all(&mut self, keys: &[String]) -> Vec<String> {
        let entries: Vec<IntersectionEntry> = keys
            .iter()
            .map(|key| IntersectionEntry::new(key.as_str(), true))
            .collect();
        self.on_reveal_entries(&entries)
    }

    /// Publishes the header offset as a CSS custom property and returns it.
    pub fn sync_header_height_variable(&self) -> f64 {
        let offset = self.compute_header_offset();
        self.viewport.set_layout_variable(
            &self.layout.header_height_variable,
            &format!("{}px", offset),
        );
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::state::reveal_keys;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// In-memory page: element tops are document offsets, scrolling settles instantly.
    #[derive(Default)]
    pub struct FakeViewport {
        pub header: Cell<Option<f64>>,
        pub scroll: Cell<f64>,
        pub elements: HashMap<String, f64>,
        pub scrolls: RefCell<Vec<f64>>,
        pub variables: RefCell<HashMap<String, String>>,
        pub active_links: RefCell<Vec<Option<usize>>>,
        pub revealed: RefCell<Vec<String>>,
    }

    impl FakeViewport {
        pub fn with_sections(header: Option<f64>, sections: &[(&str, f64)]) -> Self {
            Self {
                header: Cell::new(header),
                elements: sections
                    .iter()
                    .map(|(id, top)| (id.to_string(), *top))
                    .collect(),
                ..Self::default()
            }
        }

        pub fn current_active(&self) -> Option<usize> {
            self.active_links.borrow().last().copied().flatten()
        }
    }

    impl Viewport for FakeViewport {
        fn header_height(&self) -> Option<f64> {
            self.header.get()
        }

        fn scroll_y(&self) -> f64 {
            self.scroll.get()
        }

        fn element_top(&self, id: &str) -> Option<f64> {
            self.elements.get(id).map(|top| top - self.scroll.get())
        }

        fn smooth_scroll_to(&self, top: f64) {
            self.scroll.set(top);
            self.scrolls.borrow_mut().push(top);
        }

        fn set_layout_variable(&self, name: &str, value: &str) {
            self.variables
                .borrow_mut()
                .insert(name.to_string(), value.to_string());
        }

        fn set_active_link(&self, index: Option<usize>) {
            self.active_links.borrow_mut().push(index);
        }

        fn mark_revealed(&self, key: &str) {
            self.revealed.borrow_mut().push(key.to_string());
        }
    }

    fn links() -> Vec<String> {
        ["#accueil", "#cours", "#tarifs", "contact.html", "#contact"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn controller(viewport: FakeViewport) -> NavigationController<FakeViewport> {
        NavigationController::new(viewport, Layout::default(), links())
    }

    #[test]
    fn header_offset_falls_back_without_header() {
        let nav = controller(FakeViewport::with_sections(None, &[]));
        assert_eq!(nav.compute_header_offset(), 110.0);
    }

    #[test]
    fn header_offset_is_recomputed_after_resize() {
        let nav = controller(FakeViewport::with_sections(Some(80.0), &[]));
        assert_eq!(nav.compute_header_offset(), 80.0);
        nav.viewport.header.set(Some(64.0));
        assert_eq!(nav.compute_header_offset(), 64.0);
    }

    #[test]
    fn anchor_click_lands_below_header_with_padding() {
        let viewport = FakeViewport::with_sections(Some(72.0), &[("cours", 1500.0)]);
        viewport.scroll.set(300.0);
        let nav = controller(viewport);

        assert_eq!(nav.handle_nav_click("#cours"), ClickDisposition::Intercepted);
        assert_eq!(nav.viewport.scrolls.borrow().as_slice(), &[1420.0]);
        // Once settled, the target sits exactly header + 8px below the viewport top.
        assert_eq!(nav.viewport.element_top("cours"), Some(72.0 + 8.0));
    }

    #[test]
    fn anchor_click_uses_fallback_header() {
        let nav = controller(FakeViewport::with_sections(None, &[("tarifs", 900.0)]));
        nav.handle_nav_click("#tarifs");
        assert_eq!(nav.viewport.element_top("tarifs"), Some(118.0));
    }

    #[test]
    fn scroll_target_never_goes_above_page_top() {
        assert_eq!(scroll_target(0.0, 20.0, 72.0, 8.0), 0.0);
    }

    #[test]
    fn missing_target_is_left_to_the_browser() {
        let nav = controller(FakeViewport::with_sections(Some(72.0), &[]));
        assert_eq!(nav.handle_nav_click("#nowhere"), ClickDisposition::Default);
        assert!(nav.viewport.scrolls.borrow().is_empty());
    }

    #[test]
    fn external_links_are_not_intercepted() {
        let nav = controller(FakeViewport::with_sections(Some(72.0), &[("cours", 500.0)]));
        assert_eq!(nav.handle_nav_click("contact.html"), ClickDisposition::Default);
        assert_eq!(nav.handle_nav_click("#"), ClickDisposition::Default);
        assert!(nav.viewport.scrolls.borrow().is_empty());
    }

    #[test]
    fn intersections_move_a_single_active_marker() {
        let mut nav = controller(FakeViewport::with_sections(Some(72.0), &[]));

        nav.on_section_entries(&[IntersectionEntry::new("accueil", true)]);
        assert_eq!(nav.viewport.current_active(), Some(0));

        nav.on_section_entries(&[
            IntersectionEntry::new("cours", true),
            IntersectionEntry::new("tarifs", true),
            IntersectionEntry::new("accueil", false),
        ]);
        assert_eq!(nav.viewport.current_active(), Some(2));
        assert_eq!(nav.state.active_section_id.as_deref(), Some("tarifs"));

        nav.on_section_entries(&[IntersectionEntry::new("contact", true)]);
        assert_eq!(nav.viewport.current_active(), Some(4));
    }

    #[test]
    fn leaving_entries_do_not_touch_links() {
        let mut nav = controller(FakeViewport::with_sections(Some(72.0), &[]));
        nav.on_section_entries(&[IntersectionEntry::new("cours", true)]);
        nav.on_section_entries(&[IntersectionEntry::new("cours", false)]);
        assert_eq!(nav.viewport.active_links.borrow().len(), 1);
    }

    #[test]
    fn section_without_link_clears_marker() {
        let mut nav = controller(FakeViewport::with_sections(Some(72.0), &[]));
        nav.on_section_entries(&[IntersectionEntry::new("cours", true)]);
        nav.on_section_entries(&[IntersectionEntry::new("galerie", true)]);
        assert_eq!(nav.viewport.current_active(), None);
    }

    #[test]
    fn reveal_marks_each_element_once() {
        let mut nav = controller(FakeViewport::with_sections(Some(72.0), &[]));
        nav.on_reveal_entries(&[
            IntersectionEntry::new("equipe", true),
            IntersectionEntry::new("reveal-1", false),
        ]);
        nav.on_reveal_entries(&[IntersectionEntry::new("equipe", false)]);
        let again = nav.on_reveal_entries(&[
            IntersectionEntry::new("equipe", true),
            IntersectionEntry::new("reveal-1", true),
        ]);
        assert_eq!(again, vec!["reveal-1".to_string()]);
        assert_eq!(
            nav.viewport.revealed.borrow().as_slice(),
            &["equipe".to_string(), "reveal-1".to_string()]
        );
    }

    #[test]
    fn every_reveal_target_gets_its_own_latch() {
        let mut nav = controller(FakeViewport::with_sections(Some(72.0), &[]));
        let keys = reveal_keys(2);
        nav.on_reveal_entries(&[IntersectionEntry::new(keys[0].as_str(), true)]);
        let second = nav.on_reveal_entries(&[IntersectionEntry::new(keys[1].as_str(), true)]);
        assert_eq!(second, vec![keys[1].clone()]);
        assert_eq!(nav.viewport.revealed.borrow().len(), 2);
    }

    #[test]
    fn reveal_all_marks_targets_not_yet_revealed() {
        let mut nav = controller(FakeViewport::with_sections(Some(72.0), &[]));
        let keys = reveal_keys(3);
        nav.on_reveal_entries(&[IntersectionEntry::new(keys[1].as_str(), true)]);
        assert_eq!(
            nav.reveal_all(&keys),
            vec![keys[0].clone(), keys[2].clone()]
        );
        assert_eq!(nav.state.revealed_ids.len(), 3);
        assert!(nav.reveal_all(&keys).is_empty());
    }

    #[test]
    fn header_variable_follows_header_height() {
        let nav = controller(FakeViewport::with_sections(Some(72.0), &[]));
        assert_eq!(nav.sync_header_height_variable(), 72.0);
        nav.viewport.header.set(None);
        nav.sync_header_height_variable();
        assert_eq!(
            nav.viewport.variables.borrow().get("--header-height").map(String::as_str),
            Some("110px")
        );
    }
}
