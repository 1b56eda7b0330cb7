//! Services the queue operations call out to.

use mpdctl_core::WebserverConfig;
use serde_json::{Map, Value};
use std::path::Path;

/// Scheme of playlists served by the embedded web server.
pub const LOCAL_PLAYLIST_SCHEME: &str = "mpdctl://";

/// Turns a playlist URI from a request into one MPD can load.
pub trait PlaylistUriResolver {
    fn resolve(&self, uri: &str) -> String;
}

/// Rewrites `mpdctl://path` to the web server URL serving `path`; every
/// other URI is passed through.
#[derive(Debug, Clone)]
pub struct HttpUriResolver {
    base: String,
}

impl HttpUriResolver {
    pub fn new(webserver: &WebserverConfig) -> Self {
        Self {
            base: format!("http://{}:{}/", webserver.host, webserver.port),
        }
    }
}

impl Default for HttpUriResolver {
    fn default() -> Self {
        Self::new(&WebserverConfig::default())
    }
}

impl PlaylistUriResolver for HttpUriResolver {
    fn resolve(&self, uri: &str) -> String {
        match uri.strip_prefix(LOCAL_PLAYLIST_SCHEME) {
            Some(path) => format!("{}{}", self.base, path),
            None => uri.to_string(),
        }
    }
}

/// Looks up saved webradio metadata for a stream URI.
pub trait WebradioLookup {
    fn lookup(&self, workdir: &Path, uri: &str) -> Option<Map<String, Value>>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoWebradios;

impl WebradioLookup for NoWebradios {
    fn lookup(&self, _workdir: &Path, _uri: &str) -> Option<Map<String, Value>> {
        None
    }
}

/// Cached sticker values by song URI.
pub trait StickerCache {
    fn stickers(&self, uri: &str) -> Map<String, Value>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoStickers;

impl StickerCache for NoStickers {
    fn stickers(&self, _uri: &str) -> Map<String, Value> {
        Map::new()
    }
}
