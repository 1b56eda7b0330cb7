//! Transport seam between the partition logic and the wire protocol library.
//!
//! A transport speaks the MPD line protocol: it sends one [`Command`] (or a
//! command list of them), then hands back the response as pairs, songs or a
//! status block until [`Transport::finish`] drains what is left and reports
//! whether the daemon acknowledged the request.

use mpdctl_core::{Pair, ProtocolVersion, Song, SongId, Status, TagType, Whence};
use std::ops::Range;
use thiserror::Error;

/// Requests the client issues. Each maps to one protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `commands`: the commands the current connection may use.
    AllowedCommands,
    /// `tagtypes all`: re-enables every tag on this connection.
    TagTypesAll,
    /// `tagtypes`: the tags the daemon reports.
    TagTypes,
    /// `config`: daemon paths, only answered over a local socket.
    Config,
    Status,
    DeleteId(SongId),
    /// `delete START:END`; an open end deletes through the last entry.
    DeleteRange { start: u32, end: Option<u32> },
    Add { uri: String },
    AddWhence { uri: String, to: u32, whence: Whence },
    Clear,
    PrioId { id: SongId, priority: u32 },
    Load { uri: String },
    /// `load URI 0: TO` with a position interpreted per `whence`.
    LoadRangeTo { uri: String, to: u32, whence: Whence },
    MoveIdWhence { id: SongId, to: u32, whence: Whence },
    Play,
    PlayId(SongId),
    /// `playlistid ID`: one queue entry.
    PlaylistId(SongId),
    /// `playlistinfo START:END`.
    PlaylistInfo { window: Range<u32> },
    /// `plchangesposid VERSION`: positions/ids changed since `version`.
    QueueChangesBrief { version: u32 },
    QueueSearch(QueueSearch),
}

impl Command {
    /// Protocol command word, used in logs and error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AllowedCommands => "commands",
            Command::TagTypesAll | Command::TagTypes => "tagtypes",
            Command::Config => "config",
            Command::Status => "status",
            Command::DeleteId(_) => "deleteid",
            Command::DeleteRange { .. } => "delete",
            Command::Add { .. } | Command::AddWhence { .. } => "add",
            Command::Clear => "clear",
            Command::PrioId { .. } => "prioid",
            Command::Load { .. } | Command::LoadRangeTo { .. } => "load",
            Command::MoveIdWhence { .. } => "moveid",
            Command::Play => "play",
            Command::PlayId(_) => "playid",
            Command::PlaylistId(_) => "playlistid",
            Command::PlaylistInfo { .. } => "playlistinfo",
            Command::QueueChangesBrief { .. } => "plchangesposid",
            Command::QueueSearch(search) => search.name(),
        }
    }
}

/// A search over the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueSearch {
    pub constraint: SearchConstraint,
    pub sort: Option<SortOrder>,
    pub window: Option<Range<u32>>,
}

impl QueueSearch {
    pub fn new(constraint: SearchConstraint) -> Self {
        Self {
            constraint,
            sort: None,
            window: None,
        }
    }

    fn name(&self) -> &'static str {
        "playlistsearch"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchConstraint {
    /// Case-insensitive substring match on one tag.
    Tag { tag: TagType, value: String },
    /// Case-insensitive substring match on any tag.
    AnyTag { value: String },
    /// A filter expression such as `((Artist == 'x') AND (Album != 'y'))`.
    Expression(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub descending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Tag(TagType),
    LastModified,
    Priority,
}

impl SortKey {
    pub fn name(&self) -> &'static str {
        match self {
            SortKey::Tag(tag) => tag.name(),
            SortKey::LastModified => "Last-Modified",
            SortKey::Priority => "prio",
        }
    }
}

/// What a transport reports when a request fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection itself is broken (I/O, framing, timeout).
    #[error("connection error: {message}")]
    Connection { message: String },
    /// The daemon answered with `ACK [code@index] {command} message`.
    #[error("[{code}] {{{command}}} {message}")]
    Server {
        code: u32,
        command: String,
        message: String,
    },
}

impl TransportError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, TransportError::Connection { .. })
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// One established connection to the daemon.
///
/// Calls are strictly sequential: a request is sent, its response is read
/// with the `recv_*` methods and closed with [`Transport::finish`] before the
/// next request starts.
pub trait Transport {
    /// Version from the connection greeting.
    fn server_version(&self) -> ProtocolVersion;

    /// True for unix-domain socket connections, where the daemon shares the
    /// client's filesystem.
    fn is_local(&self) -> bool;

    /// Sends a command, or queues it while a command list is open.
    fn send(&mut self, command: &Command) -> TransportResult<()>;

    fn command_list_begin(&mut self) -> TransportResult<()>;

    /// Closes the open command list and submits it.
    fn command_list_end(&mut self) -> TransportResult<()>;

    /// Next raw pair of the current response, `None` at its end.
    fn recv_pair(&mut self) -> TransportResult<Option<Pair>>;

    /// Next song of the current response, `None` at its end.
    fn recv_song(&mut self) -> TransportResult<Option<Song>>;

    /// Status block of the current response.
    fn recv_status(&mut self) -> TransportResult<Option<Status>>;

    /// Drains the rest of the response. Fails when the daemon rejected the
    /// request or the connection broke; a daemon error is cleared so the
    /// connection can be reused.
    fn finish(&mut self) -> TransportResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_follow_protocol_words() {
        assert_eq!(Command::AllowedCommands.name(), "commands");
        assert_eq!(
            Command::AddWhence {
                uri: "a".into(),
                to: 0,
                whence: Whence::AfterCurrent
            }
            .name(),
            "add"
        );
        assert_eq!(
            Command::QueueSearch(QueueSearch::new(SearchConstraint::AnyTag {
                value: "x".into()
            }))
            .name(),
            "playlistsearch"
        );
    }

    #[test]
    fn server_error_renders_like_an_ack() {
        let err = TransportError::Server {
            code: 50,
            command: "add".into(),
            message: "No such directory".into(),
        };
        assert_eq!(err.to_string(), "[50] {add} No such directory");
        assert!(!err.is_connection());
        assert!(TransportError::connection("reset").is_connection());
    }

    #[test]
    fn sort_key_names() {
        assert_eq!(SortKey::LastModified.name(), "Last-Modified");
        assert_eq!(SortKey::Priority.name(), "prio");
        assert_eq!(SortKey::Tag(TagType::AlbumArtistSort).name(), "AlbumArtistSort");
    }
}
