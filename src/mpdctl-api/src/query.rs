//! Paginated queue listing and searching.
//!
//! Every query first reads `status` for the queue length, then lists or
//! searches in a second round trip. The two reads are not atomic: when the
//! queue changes in between, the reported total can be off by that change.

use crate::api::QueueApi;
use crate::entry::RowContext;
use crate::jsonrpc::ListPage;
use mpdctl_client::{
    ClientResult, Command, QueueSearch, SearchConstraint, SortKey, SortOrder, TagRegistry,
    Transport,
};
use mpdctl_core::{PageRequest, Song, TagType};
use serde_json::Value;

/// Filter expression that matches every queue entry.
pub const MATCH_ALL_EXPRESSION: &str = "(base '')";

#[derive(Default)]
struct Rows {
    data: Vec<Value>,
    total_time: u64,
}

impl Rows {
    fn push(&mut self, row: Value, song: &Song) {
        self.total_time += song.duration_secs();
        self.data.push(row);
    }

    fn into_page(self, total_entities: i64, offset: u32) -> ListPage {
        let returned_entities = u32::try_from(self.data.len()).unwrap_or(u32::MAX);
        ListPage {
            data: self.data,
            total_time: self.total_time,
            total_entities,
            offset,
            returned_entities,
        }
    }
}

impl<T: Transport> QueueApi<T> {
    /// Lists one window of the queue. An offset at or past the end of the
    /// queue restarts at the first entry.
    pub fn list<S: AsRef<str>>(
        &mut self,
        page: PageRequest,
        cols: &[S],
    ) -> ClientResult<ListPage> {
        let status = self.partition.refresh_status()?;
        let offset = if page.offset >= status.queue_length {
            if page.offset > 0 {
                tracing::debug!(
                    offset = page.offset,
                    queue_length = status.queue_length,
                    "offset past end of queue, restarting at 0"
                );
            }
            0
        } else {
            page.offset
        };
        let window = PageRequest::new(offset, page.limit).window();

        let context = RowContext::new(self.partition.features(), cols);
        let formatter = &self.formatter;
        let mut rows = Rows::default();
        self.partition
            .for_each_song(&Command::PlaylistInfo { window }, |song| {
                rows.push(formatter.format(&song, &context), &song)
            })?;
        Ok(rows.into_page(i64::from(status.queue_length), offset))
    }

    /// Substring search on one tag, or on any tag when `filter` is not a tag
    /// name. The daemon returns every match; paging happens here, and the
    /// total counts all matches.
    pub fn search<S: AsRef<str>>(
        &mut self,
        filter: &str,
        text: &str,
        page: PageRequest,
        cols: &[S],
    ) -> ClientResult<ListPage> {
        self.partition.refresh_status()?;
        let constraint = match TagType::parse(filter) {
            Some(tag) => SearchConstraint::Tag {
                tag,
                value: text.to_string(),
            },
            None => SearchConstraint::AnyTag {
                value: text.to_string(),
            },
        };

        let context = RowContext::new(self.partition.features(), cols);
        let formatter = &self.formatter;
        let mut rows = Rows::default();
        let mut matched: u32 = 0;
        self.partition.for_each_song(
            &Command::QueueSearch(QueueSearch::new(constraint)),
            |song| {
                if page.contains(matched) {
                    rows.push(formatter.format(&song, &context), &song);
                }
                matched = matched.saturating_add(1);
            },
        )?;
        Ok(rows.into_page(i64::from(matched), page.offset))
    }

    /// Filter-expression search with optional sorting and a daemon-side
    /// window. `limit == 0` asks for up to `search_window_max` entries.
    ///
    /// The total is only known when no expression was given; otherwise it is
    /// reported as [`ListPage::UNKNOWN_TOTAL`].
    pub fn search_advanced<S: AsRef<str>>(
        &mut self,
        expression: &str,
        sort: &str,
        descending: bool,
        page: PageRequest,
        cols: &[S],
    ) -> ClientResult<ListPage> {
        let status = self.partition.refresh_status()?;
        let match_all = expression.is_empty();
        let expression = if match_all {
            MATCH_ALL_EXPRESSION
        } else {
            expression
        };
        let window = if page.limit == 0 {
            let max = self.partition.settings().search_window_max;
            page.offset..page.offset.saturating_add(max)
        } else {
            page.window()
        };
        let search = QueueSearch {
            constraint: SearchConstraint::Expression(expression.to_string()),
            sort: resolve_sort(sort, descending, &self.partition.features().tags),
            window: Some(window),
        };

        let context = RowContext::new(self.partition.features(), cols);
        let formatter = &self.formatter;
        let mut rows = Rows::default();
        self.partition
            .for_each_song(&Command::QueueSearch(search), |song| {
                rows.push(formatter.format(&song, &context), &song)
            })?;

        let total = if match_all {
            i64::from(status.queue_length)
        } else {
            ListPage::UNKNOWN_TOTAL
        };
        Ok(rows.into_page(total, page.offset))
    }
}

/// Maps a requested sort name to what the daemon should sort by.
///
/// Tags are replaced by their sort variant when the daemon offers it.
/// `LastModified` sorts on the modification time with the direction flipped,
/// so "ascending" lists the newest entries first. `Priority` sorts on the
/// queue priority. Anything else is logged and the search runs unsorted.
pub fn resolve_sort(name: &str, descending: bool, tags: &TagRegistry) -> Option<SortOrder> {
    if let Some(tag) = TagType::parse(name) {
        return Some(SortOrder {
            key: SortKey::Tag(tags.sort_tag(tag)),
            descending,
        });
    }
    match name {
        "LastModified" => Some(SortOrder {
            key: SortKey::LastModified,
            descending: !descending,
        }),
        "Priority" => Some(SortOrder {
            key: SortKey::Priority,
            descending,
        }),
        "" => None,
        other => {
            tracing::warn!(sort = other, "unknown sort tag, searching unsorted");
            None
        }
    }
}
