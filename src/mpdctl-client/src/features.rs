//! Feature negotiation.
//!
//! Every pass starts from an all-disabled [`Features`] value and only enables
//! what the daemon proves it supports: a command in `commands`, a tag in
//! `tagtypes`, a usable directory, or a protocol version at or above a gate.
//! Probes that fail leave their features disabled and the pass continues.

use crate::directories::resolve_directory;
use crate::partition::Partition;
use crate::settings::{PartitionSnapshot, SettingsSink};
use crate::tags::TagRegistry;
use crate::transport::{Command, Transport};
use mpdctl_core::{Capabilities, Capability, ProtocolVersion, TagSet, TagType};
use serde::Serialize;
use std::path::PathBuf;

/// Commands whose presence in `commands` enables a capability.
const COMMAND_TABLE: &[(&str, Capability)] = &[
    ("sticker", Capability::Stickers),
    ("listplaylists", Capability::Playlists),
    ("getfingerprint", Capability::Fingerprint),
    ("albumart", Capability::AlbumArt),
    ("readpicture", Capability::ReadPicture),
    ("mount", Capability::Mount),
    ("listneighbors", Capability::Neighbors),
];

/// Minimum protocol versions. Each gate is checked on its own.
const VERSION_GATES: &[(ProtocolVersion, &[Capability])] = &[
    (ProtocolVersion::new(0, 22, 0), &[Capability::Partitions]),
    (ProtocolVersion::new(0, 22, 4), &[Capability::BinaryLimit]),
    (
        ProtocolVersion::new(0, 23, 3),
        &[Capability::PlaylistRangeDelete],
    ),
    (ProtocolVersion::new(0, 23, 5), &[Capability::PositionWhence]),
    (
        ProtocolVersion::new(0, 24, 0),
        &[
            Capability::AdvancedQueue,
            Capability::ConsumeOneshot,
            Capability::PlaylistDirAuto,
        ],
    ),
];

/// Result of one negotiation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub version: ProtocolVersion,
    pub capabilities: Capabilities,
    pub tags: TagRegistry,
    pub music_directory: Option<PathBuf>,
    pub playlist_directory: Option<PathBuf>,
}

impl Features {
    pub fn supports(&self, capability: Capability) -> bool {
        self.capabilities.is_enabled(capability)
    }
}

/// Sets the capabilities of every gate `version` reaches.
pub fn apply_version_gates(version: ProtocolVersion, capabilities: &mut Capabilities) {
    for (minimum, gated) in VERSION_GATES {
        for capability in gated.iter().copied() {
            if version.at_least(*minimum) {
                capabilities.enable(capability);
            } else if capability == Capability::PlaylistDirAuto {
                tracing::info!(
                    feature = %capability,
                    required = %minimum,
                    "playlist directory must be configured, MPD version too old"
                );
            } else {
                tracing::warn!(
                    feature = %capability,
                    required = %minimum,
                    "disabling feature, MPD version too old"
                );
            }
        }
    }
}

fn capability_for_command(name: &str) -> Option<Capability> {
    COMMAND_TABLE
        .iter()
        .find(|(command, _)| *command == name)
        .map(|(_, capability)| *capability)
}

impl<T: Transport> Partition<T> {
    /// Probes the daemon and replaces the feature snapshot.
    ///
    /// Never fails as a whole: a probe that errors is recovered and leaves its
    /// features disabled. The new snapshot becomes visible only once every
    /// probe has run, then it is published to `sink`.
    pub fn negotiate(&mut self, sink: &dyn SettingsSink) -> &Features {
        let version = self.transport().server_version();
        tracing::info!(partition = %self.name(), version = %version, "MPD protocol version");

        let mut features = Features {
            version,
            ..Features::default()
        };

        self.probe_commands(&mut features.capabilities);
        self.probe_tags(&mut features);
        self.probe_directories(&mut features);

        if let Err(err) = self.refresh_status() {
            tracing::warn!(partition = %self.name(), error = %err, "initial status read failed");
        }

        apply_version_gates(version, &mut features.capabilities);
        for capability in features.capabilities.enabled() {
            tracing::info!(partition = %self.name(), feature = %capability, "feature enabled");
        }

        self.features = features;
        self.publish(sink);
        &self.features
    }

    fn probe_commands(&mut self, capabilities: &mut Capabilities) {
        let pairs = match self.pairs(&Command::AllowedCommands) {
            Ok(pairs) => pairs,
            Err(err) => {
                tracing::warn!(partition = %self.name(), error = %err, "listing allowed commands failed");
                return;
            }
        };
        for pair in pairs.iter().filter(|pair| pair.name == "command") {
            if let Some(capability) = capability_for_command(&pair.value) {
                capabilities.enable(capability);
            }
        }
    }

    fn probe_tags(&mut self, features: &mut Features) {
        // A previous session may have narrowed the tag mask of this connection.
        if let Err(err) = self.execute(&Command::TagTypesAll) {
            tracing::warn!(partition = %self.name(), error = %err, "enabling all tag types failed");
        }
        let pairs = match self.pairs(&Command::TagTypes) {
            Ok(pairs) => pairs,
            Err(err) => {
                tracing::warn!(partition = %self.name(), error = %err, "listing tag types failed");
                Vec::new()
            }
        };

        let mut mpd = TagSet::new();
        for pair in pairs.iter().filter(|pair| pair.name == "tagtype") {
            match TagType::parse(&pair.value) {
                Some(tag) => {
                    mpd.push(tag);
                }
                None => tracing::warn!(tag = %pair.value, "unknown tag reported by MPD"),
            }
        }

        if mpd.is_empty() {
            tracing::warn!(partition = %self.name(), "MPD reports no known tags, disabling tags");
            features.tags = TagRegistry::disabled();
            return;
        }
        features.capabilities.enable(Capability::Tags);
        features.tags = TagRegistry::build(mpd, &self.settings().tags);
        tracing::debug!(
            partition = %self.name(),
            enabled = ?features.tags.enabled.names(),
            "tags negotiated"
        );
    }

    fn probe_directories(&mut self, features: &mut Features) {
        let mut probed_music = None;
        let mut probed_playlist = None;
        if self.transport().is_local() {
            match self.pairs(&Command::Config) {
                Ok(pairs) => {
                    for pair in pairs {
                        match pair.name.as_str() {
                            "music_directory" => probed_music = Some(pair.value),
                            "playlist_directory" => probed_playlist = Some(pair.value),
                            _ => {}
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(partition = %self.name(), error = %err, "reading MPD config failed")
                }
            }
        } else {
            tracing::debug!(partition = %self.name(), "not a local socket, skipping config probe");
        }

        let settings = self.settings();
        features.music_directory = resolve_directory(
            "music_directory",
            &settings.music_directory,
            probed_music.as_deref(),
        );
        features.playlist_directory = resolve_directory(
            "playlist_directory",
            &settings.playlist_directory,
            probed_playlist.as_deref(),
        );

        if features.music_directory.is_some() {
            features.capabilities.enable(Capability::Library);
        } else {
            tracing::warn!(partition = %self.name(), "no music directory, library features disabled");
        }
    }

    fn publish(&self, sink: &dyn SettingsSink) {
        let features = &self.features;
        let snapshot = PartitionSnapshot {
            partition: self.name(),
            protocol_version: features.version,
            features: &features.capabilities,
            tags: &features.tags,
            music_directory: features.music_directory.as_deref(),
            playlist_directory: features.playlist_directory.as_deref(),
            status: self.status(),
        };
        if let Err(err) = sink.publish(&snapshot) {
            tracing::warn!(partition = %self.name(), error = %err, "publishing settings failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ClientSettings, NoopSink, SinkError};
    use crate::testing::{Reply, ScriptedTransport};
    use mpdctl_core::{DirectorySetting, TagConfig, TagSelection};
    use std::cell::RefCell;
    use tempfile::tempdir;

    fn v(major: u32, minor: u32, patch: u32) -> ProtocolVersion {
        ProtocolVersion::new(major, minor, patch)
    }

    fn remote_settings() -> ClientSettings {
        ClientSettings {
            music_directory: DirectorySetting::None,
            playlist_directory: DirectorySetting::None,
            ..ClientSettings::default()
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        published: RefCell<Vec<serde_json::Value>>,
        fail: bool,
    }

    impl SettingsSink for RecordingSink {
        fn publish(&self, snapshot: &PartitionSnapshot<'_>) -> Result<(), SinkError> {
            if self.fail {
                return Err(SinkError::new("webserver gone"));
            }
            let value =
                serde_json::to_value(snapshot).map_err(|err| SinkError::new(err.to_string()))?;
            self.published.borrow_mut().push(value);
            Ok(())
        }
    }

    #[test]
    fn version_0_23_0_with_stickers_and_playlists() {
        let transport = ScriptedTransport::new(v(0, 23, 0))
            .reply(Reply::pairs("command", &["add", "sticker", "listplaylists", "frobnicate"]))
            .reply(Reply::Ok)
            .reply(Reply::pairs("tagtype", &["Artist", "Album", "Title"]))
            .reply(Reply::queue_status(12, 3));
        let mut partition = Partition::new(transport, remote_settings());
        let sink = RecordingSink::default();

        let caps = partition.negotiate(&sink).capabilities;

        assert!(caps.stickers);
        assert!(caps.playlists);
        assert!(caps.partitions);
        assert!(caps.binary_limit);
        assert!(!caps.playlist_range_delete);
        assert!(!caps.position_whence);
        assert!(!caps.advanced_queue);
        assert!(!caps.fingerprint);
        assert!(!caps.library);
        assert!(caps.tags);
        assert_eq!(partition.status().queue_length, 12);
        assert_eq!(
            partition.transport().commands(),
            vec![
                Command::AllowedCommands,
                Command::TagTypesAll,
                Command::TagTypes,
                Command::Status,
            ]
        );

        let published = sink.published.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0]["features"]["stickers"], true);
        assert_eq!(published[0]["status"]["queueLength"], 12);
    }

    #[test]
    fn gates_are_independent() {
        let cases = [
            (v(0, 21, 20), [false, false, false, false, false]),
            (v(0, 22, 0), [true, false, false, false, false]),
            (v(0, 22, 4), [true, true, false, false, false]),
            (v(0, 23, 3), [true, true, true, false, false]),
            (v(0, 23, 5), [true, true, true, true, false]),
            (v(0, 24, 0), [true, true, true, true, true]),
            (v(1, 0, 0), [true, true, true, true, true]),
        ];
        for (version, expected) in cases {
            let mut caps = Capabilities::default();
            apply_version_gates(version, &mut caps);
            let actual = [
                caps.partitions,
                caps.binary_limit,
                caps.playlist_range_delete,
                caps.position_whence,
                caps.advanced_queue && caps.consume_oneshot && caps.playlist_dir_auto,
            ];
            assert_eq!(actual, expected, "version {version}");
        }
    }

    #[test]
    fn negotiation_resets_previous_state() {
        let transport = ScriptedTransport::new(v(0, 20, 0))
            .reply(Reply::pairs("command", &["sticker", "albumart"]))
            .reply(Reply::Ok)
            .reply(Reply::pairs("tagtype", &["Artist"]))
            .reply(Reply::queue_status(0, 1))
            .reply(Reply::pairs("command", &["albumart"]))
            .reply(Reply::Ok)
            .reply(Reply::pairs("tagtype", &[]))
            .reply(Reply::queue_status(0, 1));
        let mut partition = Partition::new(transport, remote_settings());

        let first = partition.negotiate(&NoopSink).clone();
        assert!(first.capabilities.stickers);
        assert!(first.capabilities.tags);

        let second = partition.negotiate(&NoopSink).clone();
        assert!(!second.capabilities.stickers);
        assert!(second.capabilities.albumart);
        assert!(!second.capabilities.tags);
        assert!(second.tags.enabled.is_empty());
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let transport = ScriptedTransport::new(v(0, 23, 5))
            .reply(Reply::Ok)
            .reply(Reply::Ok)
            .reply(Reply::pairs("tagtype", &["Artist", "FancyNewTag", "AlbumArtist"]))
            .reply(Reply::queue_status(0, 1));
        let mut partition = Partition::new(transport, remote_settings());
        let features = partition.negotiate(&NoopSink);

        assert_eq!(features.tags.mpd.names(), vec!["Artist", "AlbumArtist"]);
        assert_eq!(features.tags.album_artist, TagType::AlbumArtist);
    }

    #[test]
    fn failed_probe_does_not_abort() {
        let transport = ScriptedTransport::new(v(0, 24, 0))
            .reply(Reply::ack(4, "commands", "you don't have permission"))
            .reply(Reply::Ok)
            .reply(Reply::pairs("tagtype", &["Artist", "Title"]))
            .reply(Reply::queue_status(5, 9));
        let settings = ClientSettings {
            tags: TagConfig {
                enabled: TagSelection::Only(vec!["Title".into()]),
                ..TagConfig::default()
            },
            ..remote_settings()
        };
        let mut partition = Partition::new(transport, settings);
        let features = partition.negotiate(&NoopSink);

        assert!(!features.capabilities.stickers);
        assert!(features.capabilities.tags);
        assert!(features.capabilities.advanced_queue);
        assert_eq!(features.tags.enabled.names(), vec!["Title"]);
        assert_eq!(features.tags.album_artist, TagType::Artist);
        assert!(partition.is_healthy());
        assert_eq!(partition.status().queue_version, 9);
    }

    #[test]
    fn rejected_tag_reset_still_lists_tags() {
        let transport = ScriptedTransport::new(v(0, 21, 0))
            .reply(Reply::Ok)
            .reply(Reply::ack(5, "tagtypes", "Unknown sub command"))
            .reply(Reply::pairs("tagtype", &["Artist", "Title"]))
            .reply(Reply::queue_status(0, 1));
        let mut partition = Partition::new(transport, remote_settings());
        let features = partition.negotiate(&NoopSink);

        assert!(features.capabilities.tags);
        assert_eq!(features.tags.mpd.names(), vec!["Artist", "Title"]);
        assert!(partition.is_healthy());
    }

    #[test]
    fn local_socket_probes_directories() {
        let music = tempdir().unwrap();
        let music_path = format!("{}/", music.path().display());
        let transport = ScriptedTransport::new(v(0, 23, 5))
            .local(true)
            .reply(Reply::Ok)
            .reply(Reply::Ok)
            .reply(Reply::Ok)
            .reply(Reply::Pairs(vec![
                mpdctl_core::Pair::new("music_directory", music_path.as_str()),
                mpdctl_core::Pair::new("playlist_directory", "/does/not/exist"),
            ]))
            .reply(Reply::queue_status(0, 1));
        let mut partition = Partition::new(transport, ClientSettings::default());
        let features = partition.negotiate(&NoopSink);

        assert_eq!(features.music_directory.as_deref(), Some(music.path()));
        assert_eq!(features.playlist_directory, None);
        assert!(features.capabilities.library);
        assert!(partition.transport().commands().contains(&Command::Config));
    }

    #[test]
    fn remote_connection_skips_config_probe() {
        let transport = ScriptedTransport::new(v(0, 23, 5))
            .reply(Reply::Ok)
            .reply(Reply::Ok)
            .reply(Reply::Ok)
            .reply(Reply::queue_status(0, 1));
        let mut partition = Partition::new(transport, ClientSettings::default());
        let features = partition.negotiate(&NoopSink);

        assert_eq!(features.music_directory, None);
        assert!(!features.capabilities.library);
        assert!(!partition.transport().commands().contains(&Command::Config));
    }

    #[test]
    fn publish_failure_is_not_fatal() {
        let transport = ScriptedTransport::new(v(0, 23, 5))
            .reply(Reply::pairs("command", &["sticker"]))
            .reply(Reply::Ok)
            .reply(Reply::Ok)
            .reply(Reply::queue_status(0, 1));
        let mut partition = Partition::new(transport, remote_settings());
        let sink = RecordingSink {
            fail: true,
            ..RecordingSink::default()
        };
        assert!(partition.negotiate(&sink).capabilities.stickers);
    }
}
