use crate::tags::TagType;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::time::Duration;

/// Queue-scoped song identifier assigned by the daemon.
///
/// Ids stay stable while the song remains in the queue; positions do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongId(pub u32);

impl From<u32> for SongId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Highest priority the daemon accepts for queue entries.
pub const QUEUE_PRIORITY_MAX: u32 = 255;

/// Audio format as reported for a song (`samplerate:bits:channels`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub bits: u8,
    pub channels: u8,
}

/// A queue entry as returned by listing and search commands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Song {
    pub uri: String,
    pub id: Option<SongId>,
    pub pos: Option<u32>,
    pub prio: u32,
    pub duration: Option<Duration>,
    /// Unix timestamp of the last modification, when known.
    pub last_modified: Option<u64>,
    pub audio_format: Option<AudioFormat>,
    tags: Vec<(TagType, String)>,
}

impl Song {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn add_tag(&mut self, tag: TagType, value: impl Into<String>) {
        self.tags.push((tag, value.into()));
    }

    pub fn with_tag(mut self, tag: TagType, value: impl Into<String>) -> Self {
        self.add_tag(tag, value);
        self
    }

    pub fn tag_values(&self, tag: TagType) -> impl Iterator<Item = &str> + '_ {
        self.tags
            .iter()
            .filter(move |(t, _)| *t == tag)
            .map(|(_, value)| value.as_str())
    }

    pub fn tag(&self, tag: TagType) -> Option<&str> {
        self.tag_values(tag).next()
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration.map(|d| d.as_secs()).unwrap_or(0)
    }

    pub fn is_stream(&self) -> bool {
        is_stream_uri(&self.uri)
    }
}

/// The subset of `status` the queue layer depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub queue_version: u32,
    pub queue_length: u32,
    /// Position of the current song, if any.
    pub song_pos: Option<u32>,
    pub next_song_id: Option<SongId>,
}

/// A raw `name: value` line from a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub name: String,
    pub value: String,
}

impl Pair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// How a target position is interpreted by position-taking commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Whence {
    #[default]
    Absolute,
    AfterCurrent,
    BeforeCurrent,
}

impl Whence {
    pub fn is_relative(&self) -> bool {
        !matches!(self, Whence::Absolute)
    }
}

impl TryFrom<u8> for Whence {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Whence::Absolute),
            1 => Ok(Whence::AfterCurrent),
            2 => Ok(Whence::BeforeCurrent),
            other => Err(format!("invalid whence value {other}")),
        }
    }
}

impl From<Whence> for u8 {
    fn from(value: Whence) -> Self {
        match value {
            Whence::Absolute => 0,
            Whence::AfterCurrent => 1,
            Whence::BeforeCurrent => 2,
        }
    }
}

/// Paging request represented as offset/limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub offset: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(offset: u32, limit: u32) -> Self {
        Self { offset, limit }
    }

    /// The explicit `[offset, offset + limit)` range sent to the daemon.
    pub fn window(&self) -> Range<u32> {
        self.offset..self.offset.saturating_add(self.limit)
    }

    pub fn contains(&self, index: u32) -> bool {
        self.window().contains(&index)
    }
}

/// Stream URIs carry a scheme (`http://...`); library paths never do.
pub fn is_stream_uri(uri: &str) -> bool {
    uri.contains("://")
}
