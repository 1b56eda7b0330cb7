use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional daemon features the client may rely on once negotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Stickers,
    Playlists,
    Fingerprint,
    AlbumArt,
    ReadPicture,
    Mount,
    Neighbors,
    Partitions,
    BinaryLimit,
    PlaylistRangeDelete,
    PositionWhence,
    AdvancedQueue,
    ConsumeOneshot,
    PlaylistDirAuto,
    Library,
    Tags,
}

impl Capability {
    pub const ALL: [Capability; 16] = [
        Capability::Stickers,
        Capability::Playlists,
        Capability::Fingerprint,
        Capability::AlbumArt,
        Capability::ReadPicture,
        Capability::Mount,
        Capability::Neighbors,
        Capability::Partitions,
        Capability::BinaryLimit,
        Capability::PlaylistRangeDelete,
        Capability::PositionWhence,
        Capability::AdvancedQueue,
        Capability::ConsumeOneshot,
        Capability::PlaylistDirAuto,
        Capability::Library,
        Capability::Tags,
    ];

    /// Human-readable name used in log lines.
    pub fn describe(&self) -> &'static str {
        match self {
            Capability::Stickers => "stickers",
            Capability::Playlists => "playlists",
            Capability::Fingerprint => "fingerprint",
            Capability::AlbumArt => "albumart",
            Capability::ReadPicture => "readpicture",
            Capability::Mount => "mounts",
            Capability::Neighbors => "neighbors",
            Capability::Partitions => "partitions",
            Capability::BinaryLimit => "binarylimit",
            Capability::PlaylistRangeDelete => "delete playlist range",
            Capability::PositionWhence => "position whence",
            Capability::AdvancedQueue => "advanced queue",
            Capability::ConsumeOneshot => "consume oneshot",
            Capability::PlaylistDirAuto => "playlist directory autoconfiguration",
            Capability::Library => "library",
            Capability::Tags => "tags",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Capability flags negotiated with the daemon. Everything is off by default
/// and only switched on by explicit evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub stickers: bool,
    pub playlists: bool,
    pub fingerprint: bool,
    pub albumart: bool,
    pub readpicture: bool,
    pub mount: bool,
    pub neighbors: bool,
    pub partitions: bool,
    pub binary_limit: bool,
    pub playlist_range_delete: bool,
    pub position_whence: bool,
    pub advanced_queue: bool,
    pub consume_oneshot: bool,
    pub playlist_dir_auto: bool,
    pub library: bool,
    pub tags: bool,
}

impl Capabilities {
    fn flag_mut(&mut self, capability: Capability) -> &mut bool {
        match capability {
            Capability::Stickers => &mut self.stickers,
            Capability::Playlists => &mut self.playlists,
            Capability::Fingerprint => &mut self.fingerprint,
            Capability::AlbumArt => &mut self.albumart,
            Capability::ReadPicture => &mut self.readpicture,
            Capability::Mount => &mut self.mount,
            Capability::Neighbors => &mut self.neighbors,
            Capability::Partitions => &mut self.partitions,
            Capability::BinaryLimit => &mut self.binary_limit,
            Capability::PlaylistRangeDelete => &mut self.playlist_range_delete,
            Capability::PositionWhence => &mut self.position_whence,
            Capability::AdvancedQueue => &mut self.advanced_queue,
            Capability::ConsumeOneshot => &mut self.consume_oneshot,
            Capability::PlaylistDirAuto => &mut self.playlist_dir_auto,
            Capability::Library => &mut self.library,
            Capability::Tags => &mut self.tags,
        }
    }

    pub fn enable(&mut self, capability: Capability) {
        *self.flag_mut(capability) = true;
    }

    pub fn is_enabled(&self, capability: Capability) -> bool {
        match capability {
            Capability::Stickers => self.stickers,
            Capability::Playlists => self.playlists,
            Capability::Fingerprint => self.fingerprint,
            Capability::AlbumArt => self.albumart,
            Capability::ReadPicture => self.readpicture,
            Capability::Mount => self.mount,
            Capability::Neighbors => self.neighbors,
            Capability::Partitions => self.partitions,
            Capability::BinaryLimit => self.binary_limit,
            Capability::PlaylistRangeDelete => self.playlist_range_delete,
            Capability::PositionWhence => self.position_whence,
            Capability::AdvancedQueue => self.advanced_queue,
            Capability::ConsumeOneshot => self.consume_oneshot,
            Capability::PlaylistDirAuto => self.playlist_dir_auto,
            Capability::Library => self.library,
            Capability::Tags => self.tags,
        }
    }

    pub fn enabled(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL
            .into_iter()
            .filter(move |cap| self.is_enabled(*cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_disabled() {
        let caps = Capabilities::default();
        assert_eq!(caps.enabled().count(), 0);
    }

    #[test]
    fn enable_sets_only_the_named_flag() {
        for cap in Capability::ALL {
            let mut caps = Capabilities::default();
            caps.enable(cap);
            assert!(caps.is_enabled(cap));
            assert_eq!(caps.enabled().collect::<Vec<_>>(), vec![cap]);
        }
    }
}
