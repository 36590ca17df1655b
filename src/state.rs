//! Draft collage state: construction, pure mutations and the singleton slot
//!
//! A draft is the one collage being composed before export. It is replaced
//! wholesale on every change; nothing mutates a `CollageState` in place.

use crate::platform::KeyValueStorage;
use crate::{Error, Result, DRAFT_KEY, MAX_IMAGES};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One picture placed in a collage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollageImage {
    pub id: String,
    /// Image URI: `http(s)://`, `data:` or a local path
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

impl CollageImage {
    pub fn new(id: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            src: src.into(),
            alt: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

/// How the images are arranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollageLayout {
    #[default]
    Grid,
    Horizontal,
    Vertical,
}

impl CollageLayout {
    pub const ALL: [CollageLayout; 3] = [
        CollageLayout::Grid,
        CollageLayout::Horizontal,
        CollageLayout::Vertical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollageLayout::Grid => "grid",
            CollageLayout::Horizontal => "horizontal",
            CollageLayout::Vertical => "vertical",
        }
    }
}

impl fmt::Display for CollageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollageLayout {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        CollageLayout::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "unknown layout '{}' (expected grid, horizontal or vertical)",
                    s
                ))
            })
    }
}

/// The draft collage: 1 to 4 images and a layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollageState {
    images: Vec<CollageImage>,
    layout: CollageLayout,
}

/// Build a new draft from the picked images with the default `grid` layout.
pub fn create(images: Vec<CollageImage>) -> Result<CollageState> {
    check_count(images.len())?;
    Ok(CollageState {
        images,
        layout: CollageLayout::Grid,
    })
}

fn check_count(count: usize) -> Result<()> {
    if count == 0 || count > MAX_IMAGES {
        return Err(Error::Validation(format!(
            "Collage must have between 1 and {} images",
            MAX_IMAGES
        )));
    }
    Ok(())
}

impl CollageState {
    pub fn images(&self) -> &[CollageImage] {
        &self.images
    }

    pub fn layout(&self) -> CollageLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Always false: a state holds 1 to 4 images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Same images, different layout.
    pub fn with_layout(&self, layout: CollageLayout) -> CollageState {
        CollageState {
            images: self.images.clone(),
            layout,
        }
    }

    /// Move the image at `from` to position `to`, keeping everything else in order.
    pub fn reordered(&self, from: usize, to: usize) -> Result<CollageState> {
        let len = self.images.len();
        for index in [from, to] {
            if index >= len {
                return Err(Error::IndexOutOfRange { index, len });
            }
        }
        let mut images = self.images.clone();
        let moved = images.remove(from);
        images.insert(to, moved);
        Ok(CollageState {
            images,
            layout: self.layout,
        })
    }
}

/// Replace the layout of `state`.
pub fn update_layout(state: &CollageState, layout: CollageLayout) -> CollageState {
    state.with_layout(layout)
}

/// Move one image within `state`.
pub fn reorder_images(state: &CollageState, from: usize, to: usize) -> Result<CollageState> {
    state.reordered(from, to)
}

/// Serialized shape of a draft; validated before it becomes a `CollageState`
#[derive(Deserialize)]
struct StoredDraft {
    images: Vec<CollageImage>,
    layout: CollageLayout,
}

/// The singleton draft slot.
///
/// At most one draft exists per storage; `save` overwrites it and `load`
/// treats anything unreadable as "no draft".
pub struct DraftStore<S: KeyValueStorage> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> DraftStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DRAFT_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn save(&self, state: &CollageState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.storage.set_item(&self.key, &json)?;
        log::debug!(
            "saved draft: {} images, layout {}",
            state.len(),
            state.layout()
        );
        Ok(())
    }

    pub fn load(&self) -> Option<CollageState> {
        let raw = self.storage.get_item(&self.key)?;
        let stored: StoredDraft = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("ignoring malformed draft in '{}': {}", self.key, e);
                return None;
            }
        };
        if let Err(e) = check_count(stored.images.len()) {
            log::warn!("ignoring invalid draft in '{}': {}", self.key, e);
            return None;
        }
        Some(CollageState {
            images: stored.images,
            layout: stored.layout,
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove_item(&self.key)
    }
}
