//! Tag columns of a song as JSON fields.

use mpdctl_core::{Song, TagSet, TagType};
use serde_json::{Map, Value};

/// Writes the requested tag columns of `song` into `row`.
///
/// Multi-value tags become arrays. With tags disabled only a title derived
/// from the file name is written. `Duration`, `Last-Modified` and `uri` are
/// always present.
pub fn project_tags(
    song: &Song,
    tags_enabled: bool,
    columns: &TagSet,
    row: &mut Map<String, Value>,
) {
    if tags_enabled {
        for tag in columns.iter() {
            row.insert(tag.name().to_string(), tag_value(song, tag));
        }
    } else {
        row.insert(
            TagType::Title.name().to_string(),
            Value::from(file_name(&song.uri)),
        );
    }
    row.insert("Duration".into(), Value::from(song.duration_secs()));
    row.insert(
        "Last-Modified".into(),
        Value::from(song.last_modified.unwrap_or(0)),
    );
    row.insert("uri".into(), Value::from(song.uri.as_str()));
}

fn tag_value(song: &Song, tag: TagType) -> Value {
    if tag.is_multi_value() {
        Value::Array(song.tag_values(tag).map(Value::from).collect())
    } else {
        Value::from(song.tag(tag).unwrap_or_default())
    }
}

fn file_name(uri: &str) -> &str {
    let trimmed = uri.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn song() -> Song {
        let mut song = Song::new("Artist/Album/01 - Intro.flac")
            .with_tag(TagType::Artist, "One")
            .with_tag(TagType::Artist, "Two")
            .with_tag(TagType::Title, "Intro");
        song.duration = Some(Duration::from_secs(61));
        song.last_modified = Some(1_700_000_000);
        song
    }

    #[test]
    fn projects_requested_columns() {
        let columns: TagSet = [TagType::Title, TagType::Artist, TagType::Album]
            .into_iter()
            .collect();
        let mut row = Map::new();
        project_tags(&song(), true, &columns, &mut row);
        assert_eq!(
            Value::Object(row),
            json!({
                "Title": "Intro",
                "Artist": ["One", "Two"],
                "Album": "",
                "Duration": 61,
                "Last-Modified": 1_700_000_000u64,
                "uri": "Artist/Album/01 - Intro.flac"
            })
        );
    }

    #[test]
    fn disabled_tags_fall_back_to_file_name() {
        let columns: TagSet = [TagType::Artist].into_iter().collect();
        let mut row = Map::new();
        project_tags(&song(), false, &columns, &mut row);
        assert_eq!(row["Title"], "01 - Intro.flac");
        assert!(row.get("Artist").is_none());
        assert_eq!(row["Duration"], 61);
    }
}
