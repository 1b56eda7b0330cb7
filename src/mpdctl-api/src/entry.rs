//! Row formatting for queue listings and searches.

use crate::collaborators::{NoStickers, NoWebradios, StickerCache, WebradioLookup};
use crate::projection::project_tags;
use mpdctl_client::Features;
use mpdctl_core::{is_stream_uri, Capability, Song, TagSet};
use serde_json::{json, Map, Value};
use std::path::PathBuf;

/// Per-request formatting inputs, captured from the negotiated features
/// before the listing round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowContext {
    pub tags_enabled: bool,
    pub stickers: bool,
    /// Requested columns narrowed to the enabled tags.
    pub columns: TagSet,
}

impl RowContext {
    pub fn new<S: AsRef<str>>(features: &Features, requested: &[S]) -> Self {
        Self {
            tags_enabled: features.supports(Capability::Tags),
            stickers: features.supports(Capability::Stickers),
            columns: features.tags.enabled.select_columns(requested),
        }
    }
}

pub trait EntryFormatter {
    fn format(&self, song: &Song, context: &RowContext) -> Value;
}

/// Default row layout: position data, audio format, tag columns, the entry
/// type and, when the daemon has stickers, the cached sticker values.
pub struct QueueEntryFormatter {
    workdir: PathBuf,
    webradios: Box<dyn WebradioLookup>,
    stickers: Box<dyn StickerCache>,
}

impl QueueEntryFormatter {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            webradios: Box::new(NoWebradios),
            stickers: Box::new(NoStickers),
        }
    }

    pub fn with_webradios(mut self, webradios: impl WebradioLookup + 'static) -> Self {
        self.webradios = Box::new(webradios);
        self
    }

    pub fn with_stickers(mut self, stickers: impl StickerCache + 'static) -> Self {
        self.stickers = Box::new(stickers);
        self
    }
}

impl EntryFormatter for QueueEntryFormatter {
    fn format(&self, song: &Song, context: &RowContext) -> Value {
        let mut row = Map::new();
        row.insert("id".into(), json!(song.id.map(|id| id.0).unwrap_or(0)));
        row.insert("Pos".into(), json!(song.pos.unwrap_or(0)));
        row.insert("Priority".into(), json!(song.prio));
        let format = song.audio_format.unwrap_or_default();
        row.insert(
            "AudioFormat".into(),
            json!({
                "sampleRate": format.sample_rate,
                "bits": format.bits,
                "channels": format.channels,
            }),
        );
        project_tags(song, context.tags_enabled, &context.columns, &mut row);

        let kind = if is_stream_uri(&song.uri) {
            match self.webradios.lookup(&self.workdir, &song.uri) {
                Some(webradio) => {
                    row.insert("webradio".into(), Value::Object(webradio));
                    "webradio"
                }
                None => "stream",
            }
        } else {
            "song"
        };
        row.insert("type".into(), json!(kind));

        if context.stickers {
            row.insert(
                "stickers".into(),
                Value::Object(self.stickers.stickers(&song.uri)),
            );
        }
        Value::Object(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpdctl_core::{AudioFormat, SongId, TagType};
    use std::path::Path;

    struct OneRadio;

    impl WebradioLookup for OneRadio {
        fn lookup(&self, workdir: &Path, uri: &str) -> Option<Map<String, Value>> {
            assert_eq!(workdir, Path::new("/var/lib/mpdctl"));
            (uri == "http://radio.example/live").then(|| {
                let mut map = Map::new();
                map.insert("Name".into(), json!("Example FM"));
                map
            })
        }
    }

    struct PlayCounts;

    impl StickerCache for PlayCounts {
        fn stickers(&self, _uri: &str) -> Map<String, Value> {
            let mut map = Map::new();
            map.insert("playCount".into(), json!(3));
            map
        }
    }

    fn context(stickers: bool) -> RowContext {
        RowContext {
            tags_enabled: true,
            stickers,
            columns: [TagType::Title].into_iter().collect(),
        }
    }

    fn formatter() -> QueueEntryFormatter {
        QueueEntryFormatter::new("/var/lib/mpdctl")
            .with_webradios(OneRadio)
            .with_stickers(PlayCounts)
    }

    #[test]
    fn song_row_layout() {
        let mut song = Song::new("a/b.flac").with_tag(TagType::Title, "B");
        song.id = Some(SongId(12));
        song.pos = Some(3);
        song.prio = 7;
        song.audio_format = Some(AudioFormat {
            sample_rate: 44100,
            bits: 16,
            channels: 2,
        });

        let row = formatter().format(&song, &context(false));
        assert_eq!(row["id"], 12);
        assert_eq!(row["Pos"], 3);
        assert_eq!(row["Priority"], 7);
        assert_eq!(row["AudioFormat"]["sampleRate"], 44100);
        assert_eq!(row["Title"], "B");
        assert_eq!(row["type"], "song");
        assert!(row.get("stickers").is_none());
    }

    #[test]
    fn streams_and_webradios() {
        let formatter = formatter();
        let radio = formatter.format(&Song::new("http://radio.example/live"), &context(false));
        assert_eq!(radio["type"], "webradio");
        assert_eq!(radio["webradio"]["Name"], "Example FM");

        let stream = formatter.format(&Song::new("http://other.example/live"), &context(false));
        assert_eq!(stream["type"], "stream");
        assert!(stream.get("webradio").is_none());
    }

    #[test]
    fn stickers_only_with_capability() {
        let row = formatter().format(&Song::new("a.flac"), &context(true));
        assert_eq!(row["stickers"]["playCount"], 3);
    }
}
