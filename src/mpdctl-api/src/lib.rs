//! JSON-RPC queue operations for one MPD partition.
//!
//! [`QueueApi`] decodes requests into [`ApiCall`]s, runs them against its
//! [`mpdctl_client::Partition`] and answers with a [`Response`] envelope.
//! Listings and searches live in [`query`], mutations in [`queue`].

mod api;
pub mod collaborators;
pub mod entry;
pub mod jsonrpc;
pub mod projection;
pub mod protocol;
pub mod query;
pub mod queue;

pub use api::QueueApi;
pub use collaborators::{
    HttpUriResolver, NoStickers, NoWebradios, PlaylistUriResolver, StickerCache, WebradioLookup,
};
pub use entry::{EntryFormatter, QueueEntryFormatter, RowContext};
pub use jsonrpc::{ApiMethod, Facility, ListPage, Message, Response, ResultBody, Severity};
pub use projection::project_tags;
pub use protocol::{ApiCall, ApiError, ApiRequest};
pub use query::{resolve_sort, MATCH_ALL_EXPRESSION};
