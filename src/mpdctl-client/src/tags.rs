//! Per-purpose tag sets derived from what the daemon reports.

use mpdctl_core::{TagConfig, TagSet, TagType};
use serde::Serialize;

/// Tag sets of one partition.
///
/// `enabled` is narrowed from `mpd`; `search`, `browse` and `smart_playlist`
/// are narrowed from `enabled`, so each is a subset of the one above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRegistry {
    pub mpd: TagSet,
    pub enabled: TagSet,
    pub search: TagSet,
    pub browse: TagSet,
    pub smart_playlist: TagSet,
    /// Tag used wherever the album artist is needed.
    pub album_artist: TagType,
}

impl Default for TagRegistry {
    fn default() -> Self {
        Self {
            mpd: TagSet::new(),
            enabled: TagSet::new(),
            search: TagSet::new(),
            browse: TagSet::new(),
            smart_playlist: TagSet::new(),
            album_artist: TagType::Artist,
        }
    }
}

impl TagRegistry {
    pub fn build(mpd: TagSet, config: &TagConfig) -> Self {
        let enabled = mpd.intersect(&config.enabled, "tags.enabled");
        let search = enabled.intersect(&config.search, "tags.search");
        let browse = enabled.intersect(&config.browse, "tags.browse");
        let smart_playlist = enabled.intersect(&config.smart_playlist, "tags.smart_playlist");
        let album_artist = album_artist_tag(&enabled);
        Self {
            mpd,
            enabled,
            search,
            browse,
            smart_playlist,
            album_artist,
        }
    }

    /// Registry for a daemon that reports no usable tags.
    pub fn disabled() -> Self {
        Self {
            album_artist: album_artist_tag(&TagSet::new()),
            ..Self::default()
        }
    }

    /// The sort tag to request for `tag`: its dedicated sort variant when the
    /// daemon knows it, the tag itself otherwise.
    pub fn sort_tag(&self, tag: TagType) -> TagType {
        match tag.sort_variant() {
            Some(sort) if self.mpd.contains(sort) => sort,
            _ => tag,
        }
    }
}

fn album_artist_tag(enabled: &TagSet) -> TagType {
    if enabled.contains(TagType::AlbumArtist) {
        TagType::AlbumArtist
    } else {
        tracing::warn!("AlbumArtist tag not enabled, falling back to Artist");
        TagType::Artist
    }
}
