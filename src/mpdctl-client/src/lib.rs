//! Client side of one MPD partition.
//!
//! A [`Partition`] owns its [`Transport`], negotiates features on connect
//! ([`Partition::negotiate`]) and runs requests either one at a time
//! ([`Partition::request`]) or as command-list transactions
//! ([`Partition::transaction`], [`Partition::run_batch`]).

pub mod batch;
pub mod directories;
pub mod error;
pub mod features;
pub mod partition;
pub mod settings;
pub mod tags;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;

pub use batch::CommandList;
pub use directories::resolve_directory;
pub use error::{ClientError, ClientResult};
pub use features::{apply_version_gates, Features};
pub use partition::{ConnectionHealth, Partition};
pub use settings::{ClientSettings, NoopSink, PartitionSnapshot, SettingsSink, SinkError};
pub use tags::TagRegistry;
pub use transport::{
    Command, QueueSearch, SearchConstraint, SortKey, SortOrder, Transport, TransportError,
    TransportResult,
};
