use crate::collaborators::{HttpUriResolver, PlaylistUriResolver};
use crate::entry::{EntryFormatter, QueueEntryFormatter};
use crate::jsonrpc::{ListPage, Response};
use crate::protocol::{ApiCall, ApiError, ApiRequest};
use mpdctl_client::{ClientResult, Command, Partition, Transport};
use mpdctl_core::{AppDirs, Config, PageRequest};
use std::path::PathBuf;

/// Serves queue requests for one partition.
pub struct QueueApi<T: Transport> {
    pub(crate) partition: Partition<T>,
    pub(crate) formatter: Box<dyn EntryFormatter>,
    pub(crate) resolver: Box<dyn PlaylistUriResolver>,
}

impl<T: Transport> QueueApi<T> {
    pub fn new(partition: Partition<T>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            partition,
            formatter: Box::new(QueueEntryFormatter::new(workdir)),
            resolver: Box::new(HttpUriResolver::default()),
        }
    }

    pub fn from_config(partition: Partition<T>, config: &Config, dirs: &AppDirs) -> Self {
        Self {
            partition,
            formatter: Box::new(QueueEntryFormatter::new(dirs.workdir())),
            resolver: Box::new(HttpUriResolver::new(&config.webserver)),
        }
    }

    pub fn with_formatter(mut self, formatter: impl EntryFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    pub fn with_resolver(mut self, resolver: impl PlaylistUriResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn partition(&self) -> &Partition<T> {
        &self.partition
    }

    pub fn partition_mut(&mut self) -> &mut Partition<T> {
        &mut self.partition
    }

    pub fn into_partition(self) -> Partition<T> {
        self.partition
    }

    /// Decodes and runs one request. Undecodable requests are returned as
    /// errors for the caller to answer.
    pub fn handle_json(&mut self, input: &str) -> Result<Response, ApiError> {
        let request = ApiRequest::from_json(input)?;
        Ok(self.dispatch(request))
    }

    pub fn dispatch(&mut self, request: ApiRequest) -> Response {
        let ApiRequest { id, call } = request;
        let method = call.method();
        tracing::debug!(
            partition = %self.partition.name(),
            id,
            method = ?method,
            "handling request"
        );

        let outcome: ClientResult<Option<ListPage>> = match call {
            ApiCall::QueueList {
                offset,
                limit,
                cols,
            } => self.list(PageRequest::new(offset, limit), &cols).map(Some),
            ApiCall::QueueSearch {
                filter,
                searchstr,
                offset,
                limit,
                cols,
            } => self
                .search(&filter, &searchstr, PageRequest::new(offset, limit), &cols)
                .map(Some),
            ApiCall::QueueSearchAdv {
                expression,
                sort,
                sortdesc,
                offset,
                limit,
                cols,
            } => self
                .search_advanced(
                    &expression,
                    &sort,
                    sortdesc,
                    PageRequest::new(offset, limit),
                    &cols,
                )
                .map(Some),
            ApiCall::QueueRmSongIds { song_ids } => self.remove_ids(song_ids).map(|()| None),
            ApiCall::QueueAppendUris { uris, play } => self
                .with_play(play, |api| api.append_uris(uris))
                .map(|()| None),
            ApiCall::QueueInsertUris {
                uris,
                to,
                whence,
                play,
            } => self
                .with_play(play, |api| api.insert_uris(uris, to, whence))
                .map(|()| None),
            ApiCall::QueueReplaceUris { uris, play } => self
                .replace_uris(uris)
                .and_then(|()| self.restart_if(play))
                .map(|()| None),
            ApiCall::QueueAppendPlaylists { plists, play } => self
                .with_play(play, |api| api.append_playlists(plists))
                .map(|()| None),
            ApiCall::QueueInsertPlaylists {
                plists,
                to,
                whence,
                play,
            } => self
                .with_play(play, |api| api.insert_playlists(plists, to, whence))
                .map(|()| None),
            ApiCall::QueueReplacePlaylists { plists, play } => self
                .replace_playlists(plists)
                .and_then(|()| self.restart_if(play))
                .map(|()| None),
            ApiCall::QueuePrioSet { song_ids, priority } => {
                self.set_priority(song_ids, priority).map(|()| None)
            }
            ApiCall::QueuePrioSetHighest { song_ids } => {
                self.set_priority_highest(song_ids).map(|()| None)
            }
            ApiCall::QueueMoveRelative {
                song_ids,
                to,
                whence,
            } => self.move_relative(song_ids, to, whence).map(|()| None),
            ApiCall::QueueCrop {} => self.crop(false).map(|()| None),
            ApiCall::QueueCropOrClear {} => self.crop(true).map(|()| None),
        };

        match outcome {
            Ok(Some(page)) => Response::list(id, method, page),
            Ok(None) => Response::ok(id, method),
            Err(err) => {
                tracing::warn!(
                    partition = %self.partition.name(),
                    method = ?method,
                    error = %err,
                    "request failed"
                );
                Response::error(id, method, err.user_message())
            }
        }
    }

    /// Runs `mutate`, then plays the first song it added when `play` is set.
    fn with_play<F>(&mut self, play: bool, mutate: F) -> ClientResult<()>
    where
        F: FnOnce(&mut Self) -> ClientResult<()>,
    {
        if !play {
            return mutate(self);
        }
        let before = self.partition.refresh_status()?.queue_version;
        mutate(self)?;
        self.play_newly_inserted(before)
    }

    fn restart_if(&mut self, play: bool) -> ClientResult<()> {
        if play {
            self.partition.execute(&Command::Play)
        } else {
            Ok(())
        }
    }
}
