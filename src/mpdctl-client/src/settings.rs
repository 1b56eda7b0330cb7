use crate::tags::TagRegistry;
use mpdctl_core::{Capabilities, Config, DirectorySetting, ProtocolVersion, Status, TagConfig};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// The part of [`Config`] a partition needs.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub partition: String,
    pub music_directory: DirectorySetting,
    pub playlist_directory: DirectorySetting,
    pub tags: TagConfig,
    pub search_window_max: u32,
}

impl ClientSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            partition: config.mpd.partition.clone(),
            music_directory: config.mpd.music_directory.clone(),
            playlist_directory: config.mpd.playlist_directory.clone(),
            tags: config.tags.clone(),
            search_window_max: config.mpd.search_window_max,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// What a partition publishes after each negotiation pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionSnapshot<'a> {
    pub partition: &'a str,
    pub protocol_version: ProtocolVersion,
    pub features: &'a Capabilities,
    pub tags: &'a TagRegistry,
    pub music_directory: Option<&'a Path>,
    pub playlist_directory: Option<&'a Path>,
    pub status: &'a Status,
}

#[derive(Debug, Error)]
#[error("failed to publish partition settings: {message}")]
pub struct SinkError {
    pub message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Receives partition state for external consumers such as a web server.
pub trait SettingsSink {
    fn publish(&self, snapshot: &PartitionSnapshot<'_>) -> Result<(), SinkError>;
}

/// Sink for callers with nobody to notify.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl SettingsSink for NoopSink {
    fn publish(&self, _snapshot: &PartitionSnapshot<'_>) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn settings_follow_config() {
        let mut config = Config::default();
        config.mpd.partition = "kitchen".into();
        config.mpd.music_directory = DirectorySetting::from("none");
        config.mpd.search_window_max = 100;

        let settings = ClientSettings::from_config(&config);
        assert_eq!(settings.partition, "kitchen");
        assert_eq!(settings.music_directory, DirectorySetting::None);
        assert_eq!(settings.playlist_directory, DirectorySetting::Auto);
        assert_eq!(settings.search_window_max, 100);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let caps = Capabilities::default();
        let tags = TagRegistry::default();
        let status = Status::default();
        let music = PathBuf::from("/srv/music");
        let snapshot = PartitionSnapshot {
            partition: "default",
            protocol_version: ProtocolVersion::new(0, 23, 5),
            features: &caps,
            tags: &tags,
            music_directory: Some(&music),
            playlist_directory: None,
            status: &status,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["partition"], "default");
        assert_eq!(json["musicDirectory"], "/srv/music");
        assert!(json["playlistDirectory"].is_null());
        assert_eq!(json["protocolVersion"]["minor"], 23);
        assert_eq!(json["tags"]["albumArtist"], "Artist");
    }
}
