//! Connection state of one MPD partition.

use crate::error::{ClientError, ClientResult};
use crate::features::Features;
use crate::settings::ClientSettings;
use crate::transport::{Command, Transport, TransportError, TransportResult};
use mpdctl_core::{Pair, Song, Status};

/// Whether the connection can take the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionHealth {
    #[default]
    Healthy,
    /// The transport broke; an external reconnect policy has to replace it.
    Failed,
}

/// One partition: a connection, its negotiated features and the last queue
/// status read over it.
///
/// Requests run strictly one after another. Every request is finished before
/// its method returns, so the connection is never left mid-response.
pub struct Partition<T: Transport> {
    transport: T,
    settings: ClientSettings,
    pub(crate) features: Features,
    status: Status,
    health: ConnectionHealth,
}

impl<T: Transport> Partition<T> {
    pub fn new(transport: T, settings: ClientSettings) -> Self {
        Self {
            transport,
            settings,
            features: Features::default(),
            status: Status::default(),
            health: ConnectionHealth::Healthy,
        }
    }

    pub fn name(&self) -> &str {
        &self.settings.partition
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    /// The capability snapshot of the last negotiation pass.
    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Queue status as of the last status read.
    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn health(&self) -> ConnectionHealth {
        self.health
    }

    pub fn is_healthy(&self) -> bool {
        self.health == ConnectionHealth::Healthy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Sends `command`, reads its response with `read` and always finishes
    /// the response. The first failure wins and goes through [`Self::recover`].
    pub fn request<R, F>(&mut self, command: &Command, read: F) -> ClientResult<R>
    where
        F: FnOnce(&mut T) -> TransportResult<R>,
    {
        tracing::trace!(partition = %self.name(), command = command.name(), "request");
        let outcome = self
            .transport
            .send(command)
            .and_then(|()| read(&mut self.transport));
        let finished = self.transport.finish();
        match (outcome, finished) {
            (Ok(value), Ok(())) => Ok(value),
            (Err(err), _) | (Ok(_), Err(err)) => Err(self.recover(command.name(), err)),
        }
    }

    /// Runs a command whose response carries no data.
    pub fn execute(&mut self, command: &Command) -> ClientResult<()> {
        self.request(command, |_| Ok(()))
    }

    pub fn pairs(&mut self, command: &Command) -> ClientResult<Vec<Pair>> {
        self.request(command, |transport| {
            let mut pairs = Vec::new();
            while let Some(pair) = transport.recv_pair()? {
                pairs.push(pair);
            }
            Ok(pairs)
        })
    }

    /// Streams the songs of a response into `on_song`.
    pub fn for_each_song<F>(&mut self, command: &Command, mut on_song: F) -> ClientResult<()>
    where
        F: FnMut(Song),
    {
        self.request(command, |transport| {
            while let Some(song) = transport.recv_song()? {
                on_song(song);
            }
            Ok(())
        })
    }

    pub fn songs(&mut self, command: &Command) -> ClientResult<Vec<Song>> {
        let mut songs = Vec::new();
        self.for_each_song(command, |song| songs.push(song))?;
        Ok(songs)
    }

    /// Reads `status` and refreshes the cached queue version and length.
    pub fn refresh_status(&mut self) -> ClientResult<Status> {
        let status = self.request(&Command::Status, |transport| transport.recv_status())?;
        match status {
            Some(status) => {
                self.status = status;
                Ok(status)
            }
            None => Err(ClientError::Precondition(
                "MPD returned an empty status".to_string(),
            )),
        }
    }

    /// The unified recovery step after a failed round trip.
    ///
    /// Daemon errors are reported and cleared by the transport, so the
    /// connection stays usable. Connection errors mark the partition failed.
    pub fn recover(&mut self, context: &str, err: TransportError) -> ClientError {
        match &err {
            TransportError::Server { code, message, .. } => {
                tracing::error!(
                    partition = %self.name(),
                    command = context,
                    code,
                    "MPD error: {message}"
                );
            }
            TransportError::Connection { message } => {
                tracing::error!(
                    partition = %self.name(),
                    command = context,
                    "MPD connection error: {message}"
                );
                self.health = ConnectionHealth::Failed;
            }
        }
        ClientError::from_transport(context, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Recorded, Reply, ScriptedTransport};
    use mpdctl_core::ProtocolVersion;

    fn partition(transport: ScriptedTransport) -> Partition<ScriptedTransport> {
        Partition::new(transport, ClientSettings::default())
    }

    #[test]
    fn refresh_status_updates_cache() {
        let mut partition = partition(
            ScriptedTransport::new(ProtocolVersion::new(0, 23, 5))
                .reply(Reply::queue_status(30, 7)),
        );
        let status = partition.refresh_status().unwrap();
        assert_eq!(status.queue_length, 30);
        assert_eq!(partition.status().queue_version, 7);
        assert!(partition.is_healthy());
    }

    #[test]
    fn daemon_errors_keep_connection_healthy() {
        let mut partition = partition(
            ScriptedTransport::new(ProtocolVersion::new(0, 23, 5))
                .reply(Reply::ack(50, "add", "No such directory")),
        );
        let err = partition
            .execute(&Command::Add {
                uri: "missing".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ClientError::Protocol { code: 50, .. }));
        assert!(partition.is_healthy());
        assert_eq!(partition.transport().recorded().last(), Some(&Recorded::Finish));
    }

    #[test]
    fn connection_errors_mark_partition_failed() {
        let mut partition = partition(
            ScriptedTransport::new(ProtocolVersion::new(0, 23, 5))
                .reply(Reply::Connection("reset by peer".into())),
        );
        let err = partition.pairs(&Command::AllowedCommands).unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
        assert_eq!(partition.health(), ConnectionHealth::Failed);
    }

    #[test]
    fn empty_status_is_a_precondition_failure() {
        let mut partition =
            partition(ScriptedTransport::new(ProtocolVersion::new(0, 23, 5)).reply(Reply::Ok));
        assert!(matches!(
            partition.refresh_status(),
            Err(ClientError::Precondition(_))
        ));
    }
}
