//! Gallery selection: a capacity-bounded pick list feeding the draft

use crate::platform::KeyValueStorage;
use crate::source::Photo;
use crate::state::{self, CollageImage, CollageState, DraftStore};
use crate::{Error, Result, MAX_IMAGES};

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
    /// At capacity; the selection is unchanged
    Rejected,
}

/// Where the UI should go next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Explore,
    Collage,
    Gallery,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Explore => "/",
            Route::Collage => "/collage",
            Route::Gallery => "/gallery",
        }
    }
}

/// Tracks which photos are picked, in pick order.
#[derive(Debug, Clone)]
pub struct SelectionController {
    selected: Vec<String>,
    capacity: usize,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionController {
    pub fn new() -> Self {
        Self::with_capacity(MAX_IMAGES)
    }

    /// Capacity is clamped to 1..=4 so a commit can always form a valid collage.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            selected: Vec::new(),
            capacity: capacity.clamp(1, MAX_IMAGES),
        }
    }

    pub fn toggle(&mut self, id: &str) -> Toggle {
        if let Some(pos) = self.selected.iter().position(|s| s == id) {
            self.selected.remove(pos);
            return Toggle::Deselected;
        }
        if self.at_capacity() {
            log::debug!("selection full, ignoring {}", id);
            return Toggle::Rejected;
        }
        self.selected.push(id.to_string());
        Toggle::Selected
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn at_capacity(&self) -> bool {
        self.selected.len() >= self.capacity
    }

    /// The "create collage" action is enabled iff something is picked.
    pub fn can_create(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Unselected cards are disabled once the selection is full.
    pub fn is_disabled(&self, id: &str) -> bool {
        self.at_capacity() && !self.is_selected(id)
    }

    /// Counter text, e.g. `2 / 4 selected`
    pub fn summary(&self) -> String {
        format!("{} / {} selected", self.count(), self.capacity)
    }

    /// Resolve picks against the live photo list.
    pub fn resolve(&self, photos: &[Photo]) -> Result<Vec<CollageImage>> {
        self.selected
            .iter()
            .map(|id| {
                photos
                    .iter()
                    .find(|p| &p.id == id)
                    .map(Photo::to_collage_image)
                    .ok_or_else(|| Error::Validation(format!("selected image '{}' is not loaded", id)))
            })
            .collect()
    }

    /// Turn the picks into a saved draft and route to the collage view.
    ///
    /// Nothing is saved when the selection cannot form a collage.
    pub fn commit<S: KeyValueStorage>(
        &self,
        photos: &[Photo],
        drafts: &DraftStore<S>,
    ) -> Result<(CollageState, Route)> {
        let images = self.resolve(photos)?;
        let state = state::create(images)?;
        drafts.save(&state)?;
        log::info!("created collage draft with {} images", state.len());
        Ok((state, Route::Collage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;

    fn photos(n: usize) -> Vec<Photo> {
        (0..n)
            .map(|i| Photo {
                id: format!("p{}", i),
                preview_uri: format!("https://x.test/{}.jpg", i),
                alt_text: Some(format!("photo {}", i)),
            })
            .collect()
    }

    #[test]
    fn fifth_pick_is_a_noop() {
        let mut sel = SelectionController::new();
        for i in 0..4 {
            assert_eq!(sel.toggle(&format!("p{}", i)), Toggle::Selected);
        }
        assert!(sel.at_capacity());
        assert_eq!(sel.toggle("p4"), Toggle::Rejected);
        assert_eq!(sel.count(), 4);
        assert!(sel.is_disabled("p4"));
        assert!(!sel.is_disabled("p0"));
    }

    #[test]
    fn deselect_frees_a_slot() {
        let mut sel = SelectionController::new();
        for i in 0..4 {
            sel.toggle(&format!("p{}", i));
        }
        assert_eq!(sel.toggle("p1"), Toggle::Deselected);
        assert_eq!(sel.count(), 3);
        assert_eq!(sel.toggle("p4"), Toggle::Selected);
        assert_eq!(sel.selected(), ["p0", "p2", "p3", "p4"]);
        assert_eq!(sel.summary(), "4 / 4 selected");
    }

    #[test]
    fn create_action_tracks_emptiness() {
        let mut sel = SelectionController::new();
        assert!(!sel.can_create());
        sel.toggle("p0");
        assert!(sel.can_create());
        sel.clear();
        assert!(!sel.can_create());
    }

    #[test]
    fn commit_saves_draft_in_pick_order() {
        let drafts = DraftStore::new(MemoryStorage::new());
        let mut sel = SelectionController::new();
        sel.toggle("p2");
        sel.toggle("p0");
        let (state, route) = sel.commit(&photos(3), &drafts).unwrap();
        assert_eq!(route, Route::Collage);
        assert_eq!(state.images()[0].id, "p2");
        assert_eq!(state.images()[0].alt.as_deref(), Some("photo 2"));
        assert_eq!(drafts.load(), Some(state));
    }

    #[test]
    fn empty_commit_fails_without_saving() {
        let drafts = DraftStore::new(MemoryStorage::new());
        let sel = SelectionController::new();
        let err = sel.commit(&photos(2), &drafts).unwrap_err();
        assert!(err.is_validation());
        assert!(drafts.load().is_none());
    }

    #[test]
    fn unknown_pick_fails() {
        let drafts = DraftStore::new(MemoryStorage::new());
        let mut sel = SelectionController::new();
        sel.toggle("ghost");
        assert!(matches!(sel.commit(&photos(2), &drafts), Err(Error::Validation(_))));
    }
}
