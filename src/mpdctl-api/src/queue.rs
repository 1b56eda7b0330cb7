//! Queue mutations, each submitted as one command list.

use crate::api::QueueApi;
use mpdctl_client::{ClientError, ClientResult, Command, Transport};
use mpdctl_core::{Capability, SongId, Whence, QUEUE_PRIORITY_MAX};

impl<T: Transport> QueueApi<T> {
    pub fn remove_ids(&mut self, ids: Vec<SongId>) -> ClientResult<()> {
        self.partition
            .run_batch("deleteid", ids, |_, id| Command::DeleteId(id))
    }

    pub fn append_uris(&mut self, uris: Vec<String>) -> ClientResult<()> {
        self.partition
            .run_batch("add", uris, |_, uri| Command::Add { uri })
    }

    /// Inserts `uris` starting at `to`; each following uri goes one position
    /// further.
    pub fn insert_uris(
        &mut self,
        uris: Vec<String>,
        to: u32,
        whence: Whence,
    ) -> ClientResult<()> {
        self.require_whence(whence)?;
        self.partition.run_batch("add", uris, |index, uri| Command::AddWhence {
            uri,
            to: offset_position(to, index),
            whence,
        })
    }

    /// Clears the queue and appends `uris`. Nothing is appended when the
    /// clear cannot be queued.
    pub fn replace_uris(&mut self, uris: Vec<String>) -> ClientResult<()> {
        self.partition.transaction("add", |list| {
            if !list.push(Command::Clear) {
                return;
            }
            for uri in uris {
                if !list.push(Command::Add { uri }) {
                    break;
                }
            }
        })
    }

    /// Plays the first song added to the queue after `since_version`.
    pub fn play_newly_inserted(&mut self, since_version: u32) -> ClientResult<()> {
        let changes = self
            .partition
            .pairs(&Command::QueueChangesBrief {
                version: since_version,
            })?;
        let id = changes
            .iter()
            .find(|pair| pair.name == "Id")
            .and_then(|pair| pair.value.parse::<u32>().ok());
        match id {
            Some(id) => self.partition.execute(&Command::PlayId(SongId(id))),
            None => {
                tracing::warn!(
                    partition = %self.partition.name(),
                    since_version,
                    "no queue changes, nothing to play"
                );
                Ok(())
            }
        }
    }

    /// Sets the priority of `ids`. Values above the daemon maximum are
    /// clamped.
    pub fn set_priority(&mut self, ids: Vec<SongId>, priority: u32) -> ClientResult<()> {
        let priority = clamp_priority(priority);
        self.partition
            .run_batch("prioid", ids, |_, id| Command::PrioId { id, priority })
    }

    /// Gives `ids` a priority one above the song that plays next.
    pub fn set_priority_highest(&mut self, ids: Vec<SongId>) -> ClientResult<()> {
        let status = self.partition.refresh_status()?;
        let mut priority = 1;
        if let Some(next) = status.next_song_id {
            let songs = self.partition.songs(&Command::PlaylistId(next))?;
            if let Some(song) = songs.first() {
                priority = song.prio.saturating_add(1);
            }
        }
        self.set_priority(ids, priority)
    }

    pub fn append_playlists(&mut self, plists: Vec<String>) -> ClientResult<()> {
        let resolver = &self.resolver;
        self.partition.run_batch("load", plists, |_, plist| Command::Load {
            uri: resolver.resolve(&plist),
        })
    }

    /// Inserts whole playlists starting at `to`, advancing one position per
    /// playlist.
    pub fn insert_playlists(
        &mut self,
        plists: Vec<String>,
        to: u32,
        whence: Whence,
    ) -> ClientResult<()> {
        self.require_whence(whence)?;
        let resolver = &self.resolver;
        self.partition
            .run_batch("load", plists, |index, plist| Command::LoadRangeTo {
                uri: resolver.resolve(&plist),
                to: offset_position(to, index),
                whence,
            })
    }

    pub fn replace_playlists(&mut self, plists: Vec<String>) -> ClientResult<()> {
        let resolver = &self.resolver;
        self.partition.transaction("load", |list| {
            if !list.push(Command::Clear) {
                return;
            }
            for plist in plists {
                if !list.push(Command::Load {
                    uri: resolver.resolve(&plist),
                }) {
                    break;
                }
            }
        })
    }

    pub fn move_relative(
        &mut self,
        ids: Vec<SongId>,
        to: u32,
        whence: Whence,
    ) -> ClientResult<()> {
        self.require_whence(whence)?;
        self.partition
            .run_batch("moveid", ids, |index, id| Command::MoveIdWhence {
                id,
                to: offset_position(to, index),
                whence,
            })
    }

    /// Removes everything but the current song. Without a current song the
    /// queue is cleared when `or_clear` is set, otherwise nothing happens and
    /// an error is returned.
    pub fn crop(&mut self, or_clear: bool) -> ClientResult<()> {
        let status = self.partition.refresh_status()?;
        match status.song_pos {
            Some(pos) => {
                let length = status.queue_length;
                if length <= 1 {
                    return Ok(());
                }
                self.partition.transaction("delete", |list| {
                    if pos + 1 < length
                        && !list.push(Command::DeleteRange {
                            start: pos + 1,
                            end: None,
                        })
                    {
                        return;
                    }
                    if pos > 0 {
                        list.push(Command::DeleteRange {
                            start: 0,
                            end: Some(pos),
                        });
                    }
                })
            }
            None if or_clear => self.partition.execute(&Command::Clear),
            None => {
                tracing::error!(partition = %self.partition.name(), "can not crop the queue");
                Err(ClientError::Precondition(
                    "Can not crop the queue".to_string(),
                ))
            }
        }
    }

    fn require_whence(&self, whence: Whence) -> ClientResult<()> {
        let supported = self.partition.features().supports(Capability::PositionWhence);
        if whence.is_relative() && !supported {
            return Err(ClientError::Unsupported {
                feature: "relative queue positions",
            });
        }
        Ok(())
    }
}

fn offset_position(to: u32, index: usize) -> u32 {
    to.saturating_add(u32::try_from(index).unwrap_or(u32::MAX))
}

fn clamp_priority(priority: u32) -> u32 {
    if priority > QUEUE_PRIORITY_MAX {
        tracing::warn!(
            priority,
            max = QUEUE_PRIORITY_MAX,
            "queue priority limit reached, clamping"
        );
        QUEUE_PRIORITY_MAX
    } else {
        priority
    }
}
