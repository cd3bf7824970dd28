//! Story data model shared between reel crates.
//!
//! A [`Story`] is an ordered list of [`Snap`]s (timed images) published by a
//! [`StoryOwner`]. The model also carries the persisted resume position
//! ([`Story::last_played_snap_index`]): the snap at which playback picks up
//! the next time the story is displayed.
//!
//! # Features
//!
//! - **Serde support**: story feeds are shipped as JSON documents, so every
//!   type derives `Serialize`/`Deserialize`
//! - **Shared resume position**: the resume index is an atomic so a story can
//!   be shared (`Arc<Story>`) between the playback engine and the host
//!   without extra locking
//! - **Clamped writes**: an out-of-range resume index is clamped to the last
//!   snap instead of poisoning later playback
//!
//! # Examples
//!
//! ```rust
//! use reelmodel::{Snap, Story, StoryId, StoryOwner};
//!
//! let story = Story::new(
//!     StoryId::new("story-42"),
//!     StoryOwner::new("ana", "https://example.com/ana.png"),
//!     vec![
//!         Snap::new("https://example.com/1.jpg", "2h"),
//!         Snap::new("https://example.com/2.jpg", "1h"),
//!     ],
//! );
//!
//! assert_eq!(story.snap_count(), 2);
//! assert_eq!(story.last_played_snap_index(), 0);
//! story.set_last_played_snap_index(1);
//! assert_eq!(story.last_played_snap_index(), 1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

/// Opaque story identifier.
///
/// Feeds usually carry a backend identifier per story; the playback engine
/// only needs it to tag events, never to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoryId(String);

impl StoryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StoryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One timed image within a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snap {
    /// Where the image bytes live.
    pub url: String,
    /// Human-readable age of the snap ("2h", "yesterday"), shown in the
    /// header while the snap plays.
    #[serde(default)]
    pub last_updated: String,
}

impl Snap {
    pub fn new(url: impl Into<String>, last_updated: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            last_updated: last_updated.into(),
        }
    }
}

/// The account a story belongs to, as shown in the story header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryOwner {
    pub name: String,
    #[serde(default)]
    pub picture_url: String,
}

impl StoryOwner {
    pub fn new(name: impl Into<String>, picture_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            picture_url: picture_url.into(),
        }
    }
}

/// An ordered list of snaps plus the persisted resume position.
///
/// Snap order is the playback order; the model never reorders. The resume
/// index is atomic so the engine can persist progress on a shared
/// `Arc<Story>` while the host keeps its own reference.
#[derive(Debug, Serialize, Deserialize)]
pub struct Story {
    id: StoryId,
    owner: StoryOwner,
    snaps: Vec<Snap>,
    #[serde(default)]
    last_played_snap_index: AtomicUsize,
}

impl Story {
    pub fn new(id: StoryId, owner: StoryOwner, snaps: Vec<Snap>) -> Self {
        Self {
            id,
            owner,
            snaps,
            last_played_snap_index: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> &StoryId {
        &self.id
    }

    pub fn owner(&self) -> &StoryOwner {
        &self.owner
    }

    pub fn snaps(&self) -> &[Snap] {
        &self.snaps
    }

    pub fn snap(&self, index: usize) -> Option<&Snap> {
        self.snaps.get(index)
    }

    pub fn snap_count(&self) -> usize {
        self.snaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snaps.is_empty()
    }

    /// Returns the resume position, always a valid index when the story has
    /// snaps (a stored value past the end is clamped on read, which covers
    /// feeds deserialized with a stale index).
    pub fn last_played_snap_index(&self) -> usize {
        let index = self.last_played_snap_index.load(Ordering::SeqCst);
        match self.snaps.len() {
            0 => 0,
            len => index.min(len - 1),
        }
    }

    /// Persists the resume position. Out-of-range values are clamped to the
    /// last snap and logged instead of panicking.
    pub fn set_last_played_snap_index(&self, index: usize) {
        let clamped = match self.snaps.len() {
            0 => 0,
            len => index.min(len - 1),
        };
        if clamped != index {
            tracing::warn!(
                story = %self.id,
                requested = index,
                clamped,
                "resume index out of range, clamping"
            );
        }
        self.last_played_snap_index.store(clamped, Ordering::SeqCst);
    }
}

impl Clone for Story {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            owner: self.owner.clone(),
            snaps: self.snaps.clone(),
            last_played_snap_index: AtomicUsize::new(
                self.last_played_snap_index.load(Ordering::SeqCst),
            ),
        }
    }
}

impl PartialEq for Story {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.owner == other.owner && self.snaps == other.snaps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_snap_story() -> Story {
        Story::new(
            StoryId::new("story-1"),
            StoryOwner::new("ana", "https://example.com/ana.png"),
            vec![
                Snap::new("https://example.com/1.jpg", "3h"),
                Snap::new("https://example.com/2.jpg", "2h"),
                Snap::new("https://example.com/3.jpg", "1h"),
            ],
        )
    }

    #[test]
    fn test_new_story_resumes_at_zero() {
        let story = three_snap_story();
        assert_eq!(story.snap_count(), 3);
        assert_eq!(story.last_played_snap_index(), 0);
        assert!(!story.is_empty());
    }

    #[test]
    fn test_snap_accessor() {
        let story = three_snap_story();
        assert_eq!(story.snap(1).unwrap().url, "https://example.com/2.jpg");
        assert!(story.snap(3).is_none());
    }

    #[test]
    fn test_set_last_played_snap_index() {
        let story = three_snap_story();
        story.set_last_played_snap_index(2);
        assert_eq!(story.last_played_snap_index(), 2);
    }

    #[test]
    fn test_out_of_range_index_is_clamped() {
        let story = three_snap_story();
        story.set_last_played_snap_index(17);
        assert_eq!(story.last_played_snap_index(), 2);
    }

    #[test]
    fn test_empty_story_index_is_zero() {
        let story = Story::new(StoryId::new("empty"), StoryOwner::new("bo", ""), vec![]);
        assert!(story.is_empty());
        assert_eq!(story.last_played_snap_index(), 0);
        story.set_last_played_snap_index(5);
        assert_eq!(story.last_played_snap_index(), 0);
    }

    #[test]
    fn test_clone_copies_resume_index() {
        let story = three_snap_story();
        story.set_last_played_snap_index(1);
        let copy = story.clone();
        assert_eq!(copy.last_played_snap_index(), 1);

        // Les deux copies sont indépendantes
        copy.set_last_played_snap_index(2);
        assert_eq!(story.last_played_snap_index(), 1);
    }

    #[test]
    fn test_deserialize_feed_snippet() {
        let json = r#"{
            "id": "story-9",
            "owner": { "name": "leo", "picture_url": "https://example.com/leo.png" },
            "snaps": [
                { "url": "https://example.com/a.jpg", "last_updated": "5h" },
                { "url": "https://example.com/b.jpg" }
            ]
        }"#;

        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.id().as_str(), "story-9");
        assert_eq!(story.owner().name, "leo");
        assert_eq!(story.snap_count(), 2);
        assert_eq!(story.snap(1).unwrap().last_updated, "");
        assert_eq!(story.last_played_snap_index(), 0);
    }

    #[test]
    fn test_deserialize_stale_resume_index_clamped_on_read() {
        let json = r#"{
            "id": "story-9",
            "owner": { "name": "leo" },
            "snaps": [ { "url": "https://example.com/a.jpg" } ],
            "last_played_snap_index": 12
        }"#;

        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.last_played_snap_index(), 0);
    }

    #[test]
    fn test_serialize_round_trip() {
        let story = three_snap_story();
        story.set_last_played_snap_index(2);
        let json = serde_json::to_string(&story).unwrap();
        let back: Story = serde_json::from_str(&json).unwrap();
        assert_eq!(back, story);
        assert_eq!(back.last_played_snap_index(), 2);
    }
}
