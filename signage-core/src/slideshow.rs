use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::DocumentId;

/// An ordered sequence of slides, shown by slideshow widgets.
/// The slideshow only references its slides, it doesn't own them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slideshow {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    /// The slides in the order they are shown
    #[serde(default)]
    pub slides: Vec<DocumentId>,
    pub creator_id: String,
    pub creation_date: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Photo,
    YouTube,
    Web,
    Image,
    Video,
    /// Anything the client doesn't know how to render specifically
    #[serde(other)]
    Generic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SlideKind,
    /// Seconds on screen, where 0 or nothing means the configured default
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub data: Value,
    pub creator_id: String,
    pub creation_date: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SlideshowError {
    #[error("Slide index {index} is out of bounds for a slideshow of {len} slides")]
    IndexOutOfBounds { index: i64, len: usize },
}

/// Moves the item at `old_index` to `new_index`.
///
/// Both indices must point at existing items. On error the list is untouched.
pub fn move_item<T>(items: &mut Vec<T>, old_index: i64, new_index: i64) -> Result<(), SlideshowError> {
    let len = items.len();
    let check = |index: i64| {
        usize::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or(SlideshowError::IndexOutOfBounds { index, len })
    };

    let old = check(old_index)?;
    let new = check(new_index)?;

    let item = items.remove(old);
    items.insert(new, item);

    Ok(())
}

impl Slideshow {
    /// Moves a slide to a new position in the show.
    pub fn reorder(&mut self, old_index: i64, new_index: i64) -> Result<(), SlideshowError> {
        move_item(&mut self.slides, old_index, new_index)
    }

    /// Removes every reference to the slide, returning true if any was removed
    pub fn detach_slide(&mut self, slide_id: &DocumentId) -> bool {
        let before = self.slides.len();
        self.slides.retain(|s| s != slide_id);

        before != self.slides.len()
    }
}

#[cfg(test)]
mod test {
    use super::{move_item, SlideKind, SlideshowError};

    fn letters() -> Vec<char> {
        vec!['a', 'b', 'c', 'd']
    }

    #[test]
    fn moving_is_remove_then_insert() {
        for old in 0..4 {
            for new in 0..4 {
                let mut moved = letters();
                move_item(&mut moved, old, new).unwrap();

                let mut expected = letters();
                let item = expected.remove(old as usize);
                expected.insert(new as usize, item);

                assert_eq!(moved, expected, "moving {} to {}", old, new);
            }
        }

        let mut items = letters();
        move_item(&mut items, 0, 3).unwrap();
        assert_eq!(items, vec!['b', 'c', 'd', 'a']);
    }

    #[test]
    fn out_of_bounds_moves_are_rejected_without_mutation() {
        let mut items = letters();

        assert_eq!(
            move_item(&mut items, 0, 4),
            Err(SlideshowError::IndexOutOfBounds { index: 4, len: 4 })
        );
        assert_eq!(
            move_item(&mut items, -1, 0),
            Err(SlideshowError::IndexOutOfBounds { index: -1, len: 4 })
        );
        assert_eq!(
            move_item(&mut items, 2, -3),
            Err(SlideshowError::IndexOutOfBounds { index: -3, len: 4 })
        );
        assert_eq!(items, letters());

        let mut empty: Vec<char> = vec![];
        assert!(move_item(&mut empty, 0, 0).is_err());
    }

    #[test]
    fn unknown_slide_types_fall_back_to_generic() {
        let kind: SlideKind = serde_json::from_str("\"hologram\"").unwrap();
        assert_eq!(kind, SlideKind::Generic);

        let kind: SlideKind = serde_json::from_str("\"youtube\"").unwrap();
        assert_eq!(kind, SlideKind::YouTube);
    }
}
