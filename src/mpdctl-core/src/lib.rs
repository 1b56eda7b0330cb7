pub mod capabilities;
pub mod config;
pub mod logging;
pub mod models;
pub mod paths;
pub mod tags;
pub mod version;

pub use capabilities::{Capabilities, Capability};
pub use config::{
    Config, ConfigError, DirectorySetting, LogLevel, LoggingConfig, MpdConfig, TagConfig,
    ValidationError, WebserverConfig, DEFAULT_SEARCH_WINDOW_MAX,
};
pub use logging::{init_logging, LoggingError, LoggingGuard};
pub use models::{
    is_stream_uri, AudioFormat, PageRequest, Pair, Song, SongId, Status, Whence, QUEUE_PRIORITY_MAX,
};
pub use paths::{AppDirs, DirsError};
pub use tags::{TagSelection, TagSet, TagType, TAG_CAPACITY};
pub use version::{ProtocolVersion, VersionParseError};

pub const APP_NAME: &str = "mpdctl";
pub const APP_AUTHOR: &str = "mpdctl";
pub const APP_QUALIFIER: &str = "io";
