//! MPD tag types and bounded tag sets.
//!
//! The daemon reports the tags it supports; the client narrows that list per
//! purpose (enabled, search, browse, smart playlists) through [`TagSet::intersect`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound for any tag set held per connection.
pub const TAG_CAPACITY: usize = 64;

macro_rules! tag_types {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// The closed set of tag names this client understands.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TagType {
            $($variant),+
        }

        impl TagType {
            pub const ALL: &'static [TagType] = &[$(TagType::$variant),+];

            /// Protocol spelling of the tag.
            pub fn name(&self) -> &'static str {
                match self {
                    $(TagType::$variant => $name),+
                }
            }

            /// Exact-match lookup; names outside the enumeration yield `None`.
            pub fn parse(name: &str) -> Option<TagType> {
                match name {
                    $($name => Some(TagType::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

tag_types! {
    Artist => "Artist",
    ArtistSort => "ArtistSort",
    Album => "Album",
    AlbumSort => "AlbumSort",
    AlbumArtist => "AlbumArtist",
    AlbumArtistSort => "AlbumArtistSort",
    Title => "Title",
    TitleSort => "TitleSort",
    Track => "Track",
    Name => "Name",
    Genre => "Genre",
    Mood => "Mood",
    Date => "Date",
    OriginalDate => "OriginalDate",
    Composer => "Composer",
    ComposerSort => "ComposerSort",
    Performer => "Performer",
    Conductor => "Conductor",
    Work => "Work",
    Ensemble => "Ensemble",
    Movement => "Movement",
    MovementNumber => "MovementNumber",
    Location => "Location",
    Grouping => "Grouping",
    Comment => "Comment",
    Disc => "Disc",
    Label => "Label",
    MusicBrainzArtistId => "MUSICBRAINZ_ARTISTID",
    MusicBrainzAlbumId => "MUSICBRAINZ_ALBUMID",
    MusicBrainzAlbumArtistId => "MUSICBRAINZ_ALBUMARTISTID",
    MusicBrainzTrackId => "MUSICBRAINZ_TRACKID",
    MusicBrainzReleaseTrackId => "MUSICBRAINZ_RELEASETRACKID",
    MusicBrainzWorkId => "MUSICBRAINZ_WORKID",
    MusicBrainzReleaseGroupId => "MUSICBRAINZ_RELEASEGROUPID",
}

impl TagType {
    /// Tags that commonly carry several values and are rendered as arrays.
    pub fn is_multi_value(&self) -> bool {
        matches!(
            self,
            TagType::Artist
                | TagType::ArtistSort
                | TagType::AlbumArtist
                | TagType::AlbumArtistSort
                | TagType::Genre
                | TagType::Composer
                | TagType::ComposerSort
                | TagType::Performer
                | TagType::Conductor
                | TagType::Ensemble
                | TagType::MusicBrainzArtistId
                | TagType::MusicBrainzAlbumArtistId
        )
    }

    /// The dedicated sort tag the daemon may offer in place of this one.
    pub fn sort_variant(&self) -> Option<TagType> {
        match self {
            TagType::Artist => Some(TagType::ArtistSort),
            TagType::AlbumArtist => Some(TagType::AlbumArtistSort),
            TagType::Album => Some(TagType::AlbumSort),
            TagType::Composer => Some(TagType::ComposerSort),
            TagType::Title => Some(TagType::TitleSort),
            _ => None,
        }
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for TagType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// A configured tag list: either every tag the source offers, or named ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawTagSelection", into = "RawTagSelection")]
pub enum TagSelection {
    #[default]
    All,
    Only(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawTagSelection {
    Keyword(String),
    Names(Vec<String>),
}

impl TryFrom<RawTagSelection> for TagSelection {
    type Error = String;

    fn try_from(raw: RawTagSelection) -> Result<Self, Self::Error> {
        match raw {
            RawTagSelection::Keyword(keyword) if keyword == "all" => Ok(TagSelection::All),
            RawTagSelection::Keyword(other) => Err(format!(
                "expected \"all\" or a list of tag names, got {other:?}"
            )),
            RawTagSelection::Names(names) => Ok(TagSelection::Only(names)),
        }
    }
}

impl From<TagSelection> for RawTagSelection {
    fn from(selection: TagSelection) -> Self {
        match selection {
            TagSelection::All => RawTagSelection::Keyword("all".into()),
            TagSelection::Only(names) => RawTagSelection::Names(names),
        }
    }
}

/// Ordered, deduplicated and capacity-bounded set of tags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet {
    tags: Vec<TagType>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `tag` unless it is already present. Returns `false` when the
    /// set is full and the tag was dropped.
    pub fn push(&mut self, tag: TagType) -> bool {
        if self.tags.contains(&tag) {
            return true;
        }
        if self.tags.len() >= TAG_CAPACITY {
            tracing::warn!(tag = %tag, capacity = TAG_CAPACITY, "tag set is full, dropping tag");
            return false;
        }
        self.tags.push(tag);
        true
    }

    pub fn contains(&self, tag: TagType) -> bool {
        self.tags.contains(&tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TagType> + '_ {
        self.tags.iter().copied()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tags.iter().map(TagType::name).collect()
    }

    /// Narrows this set to the tags requested by `selection`.
    ///
    /// The result keeps this set's order and is always a subset of it.
    /// Requested names that are unknown or not offered here are logged
    /// against `label` and skipped.
    pub fn intersect(&self, selection: &TagSelection, label: &str) -> TagSet {
        let requested = match selection {
            TagSelection::All => return self.clone(),
            TagSelection::Only(names) => names,
        };

        let mut wanted = Vec::with_capacity(requested.len());
        for name in requested {
            match TagType::parse(name.trim()) {
                Some(tag) if self.contains(tag) => wanted.push(tag),
                Some(tag) => {
                    tracing::warn!(list = label, tag = %tag, "tag is not supported by MPD")
                }
                None => tracing::warn!(list = label, tag = %name, "unknown tag name"),
            }
        }

        let mut result = TagSet::new();
        for tag in self.iter().filter(|tag| wanted.contains(tag)) {
            result.push(tag);
        }
        result
    }

    /// Like [`TagSet::intersect`] for ad-hoc column names; unknown names are
    /// silently ignored since callers mix tag and non-tag columns.
    pub fn select_columns<S: AsRef<str>>(&self, columns: &[S]) -> TagSet {
        let mut result = TagSet::new();
        for tag in columns
            .iter()
            .filter_map(|name| TagType::parse(name.as_ref()))
            .filter(|tag| self.contains(*tag))
        {
            result.push(tag);
        }
        result
    }
}

impl FromIterator<TagType> for TagSet {
    fn from_iter<I: IntoIterator<Item = TagType>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.push(tag);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> TagSelection {
        TagSelection::Only(list.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn parse_round_trips_every_name() {
        for tag in TagType::ALL {
            assert_eq!(TagType::parse(tag.name()), Some(*tag));
        }
        assert_eq!(TagType::parse("artist"), None);
        assert_eq!(TagType::parse("Rating"), None);
    }

    #[test]
    fn push_deduplicates_and_bounds() {
        let mut set = TagSet::new();
        assert!(set.push(TagType::Artist));
        assert!(set.push(TagType::Artist));
        assert_eq!(set.len(), 1);

        let mut full = TagSet {
            tags: vec![TagType::Title; TAG_CAPACITY],
        };
        assert!(!full.push(TagType::Album));
        assert_eq!(full.len(), TAG_CAPACITY);
    }

    #[test]
    fn intersect_keeps_source_order() {
        let source: TagSet = [TagType::Artist, TagType::Album, TagType::Title]
            .into_iter()
            .collect();
        let result = source.intersect(&names(&["Title", "Artist"]), "tag_list");
        assert_eq!(
            result.iter().collect::<Vec<_>>(),
            vec![TagType::Artist, TagType::Title]
        );
    }

    #[test]
    fn intersect_skips_unsupported_and_unknown() {
        let source: TagSet = [TagType::Artist, TagType::Album].into_iter().collect();
        let result = source.intersect(&names(&["Genre", "Bogus", "Album"]), "tag_list_search");
        assert_eq!(result.iter().collect::<Vec<_>>(), vec![TagType::Album]);
    }

    #[test]
    fn intersect_is_always_a_subset() {
        let source: TagSet = [TagType::Artist, TagType::Genre, TagType::Date]
            .into_iter()
            .collect();
        let selections = [
            TagSelection::All,
            names(&[]),
            names(&["Date", "Date", "Title"]),
            names(&["MUSICBRAINZ_TRACKID", "Genre"]),
        ];
        for selection in &selections {
            let result = source.intersect(selection, "test");
            assert!(result.iter().all(|tag| source.contains(tag)));
        }
        assert_eq!(source.intersect(&TagSelection::All, "test"), source);
        assert!(source.intersect(&names(&[]), "test").is_empty());
    }

    #[test]
    fn select_columns_ignores_non_tags() {
        let source: TagSet = [TagType::Artist, TagType::Title].into_iter().collect();
        let cols = source.select_columns(&["Pos", "Title", "Duration", "Album"]);
        assert_eq!(cols.iter().collect::<Vec<_>>(), vec![TagType::Title]);
    }

    #[test]
    fn sort_variants() {
        assert_eq!(
            TagType::AlbumArtist.sort_variant(),
            Some(TagType::AlbumArtistSort)
        );
        assert_eq!(TagType::Genre.sort_variant(), None);
    }
}
