//! In-memory daemon for tests.
//!
//! [`ScriptedTransport`] answers each request with the next canned [`Reply`]
//! and records everything it is asked to do, so tests can assert on the
//! exact command sequence a partition produced.

use crate::transport::{Command, Transport, TransportError, TransportResult};
use mpdctl_core::{Pair, ProtocolVersion, Song, Status};
use std::collections::VecDeque;

/// Response to one request (a single command or a whole command list).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Ok,
    Pairs(Vec<Pair>),
    Songs(Vec<Song>),
    Status(Status),
    /// Daemon-side error, reported by `finish`.
    Ack {
        code: u32,
        command: String,
        message: String,
    },
    /// Broken connection, reported by the first read of the response.
    Connection(String),
}

impl Reply {
    /// Pairs sharing one name, e.g. `command: sticker`.
    pub fn pairs(name: &str, values: &[&str]) -> Self {
        Reply::Pairs(values.iter().map(|value| Pair::new(name, *value)).collect())
    }

    pub fn ack(code: u32, command: &str, message: &str) -> Self {
        Reply::Ack {
            code,
            command: command.to_string(),
            message: message.to_string(),
        }
    }

    pub fn queue_status(queue_length: u32, queue_version: u32) -> Self {
        Reply::Status(Status {
            queue_length,
            queue_version,
            ..Status::default()
        })
    }
}

/// Log entry for everything the transport was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    Command(Command),
    SendFailed(Command),
    ListBegin,
    ListEnd,
    Finish,
}

#[derive(Debug)]
pub struct ScriptedTransport {
    version: ProtocolVersion,
    local: bool,
    replies: VecDeque<Reply>,
    current: Option<Reply>,
    in_list: bool,
    sends: usize,
    fail_send_at: Option<usize>,
    fail_list_begin: Option<TransportError>,
    log: Vec<Recorded>,
}

impl ScriptedTransport {
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            local: false,
            replies: VecDeque::new(),
            current: None,
            in_list: false,
            sends: 0,
            fail_send_at: None,
            fail_list_begin: None,
            log: Vec::new(),
        }
    }

    /// Pretends to be connected over a unix-domain socket.
    pub fn local(mut self, local: bool) -> Self {
        self.local = local;
        self
    }

    pub fn reply(mut self, reply: Reply) -> Self {
        self.replies.push_back(reply);
        self
    }

    pub fn push_reply(&mut self, reply: Reply) {
        self.replies.push_back(reply);
    }

    /// Makes the `index`-th call to `send` (counting from zero) fail.
    pub fn fail_send_at(mut self, index: usize) -> Self {
        self.fail_send_at = Some(index);
        self
    }

    /// Makes the next `command_list_begin` fail with `error`.
    pub fn fail_list_begin(mut self, error: TransportError) -> Self {
        self.fail_list_begin = Some(error);
        self
    }

    pub fn recorded(&self) -> &[Recorded] {
        &self.log
    }

    /// Commands that reached the wire, in order.
    pub fn commands(&self) -> Vec<Command> {
        self.log
            .iter()
            .filter_map(|entry| match entry {
                Recorded::Command(command) => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    fn start_response(&mut self) {
        self.current = Some(self.replies.pop_front().unwrap_or(Reply::Ok));
    }

    fn broken(&self) -> Option<TransportError> {
        match &self.current {
            Some(Reply::Connection(message)) => Some(TransportError::connection(message.clone())),
            _ => None,
        }
    }
}

impl Transport for ScriptedTransport {
    fn server_version(&self) -> ProtocolVersion {
        self.version
    }

    fn is_local(&self) -> bool {
        self.local
    }

    fn send(&mut self, command: &Command) -> TransportResult<()> {
        let index = self.sends;
        self.sends += 1;
        if self.fail_send_at == Some(index) {
            self.log.push(Recorded::SendFailed(command.clone()));
            return Err(TransportError::connection(format!(
                "failed to send {}",
                command.name()
            )));
        }
        self.log.push(Recorded::Command(command.clone()));
        if !self.in_list {
            self.start_response();
        }
        Ok(())
    }

    fn command_list_begin(&mut self) -> TransportResult<()> {
        if let Some(err) = self.fail_list_begin.take() {
            return Err(err);
        }
        self.log.push(Recorded::ListBegin);
        self.in_list = true;
        Ok(())
    }

    fn command_list_end(&mut self) -> TransportResult<()> {
        self.log.push(Recorded::ListEnd);
        self.in_list = false;
        self.start_response();
        Ok(())
    }

    fn recv_pair(&mut self) -> TransportResult<Option<Pair>> {
        if let Some(err) = self.broken() {
            return Err(err);
        }
        match &mut self.current {
            Some(Reply::Pairs(pairs)) if !pairs.is_empty() => Ok(Some(pairs.remove(0))),
            _ => Ok(None),
        }
    }

    fn recv_song(&mut self) -> TransportResult<Option<Song>> {
        if let Some(err) = self.broken() {
            return Err(err);
        }
        match &mut self.current {
            Some(Reply::Songs(songs)) if !songs.is_empty() => Ok(Some(songs.remove(0))),
            _ => Ok(None),
        }
    }

    fn recv_status(&mut self) -> TransportResult<Option<Status>> {
        if let Some(err) = self.broken() {
            return Err(err);
        }
        match self.current.take() {
            Some(Reply::Status(status)) => {
                self.current = Some(Reply::Ok);
                Ok(Some(status))
            }
            other => {
                self.current = other;
                Ok(None)
            }
        }
    }

    fn finish(&mut self) -> TransportResult<()> {
        self.log.push(Recorded::Finish);
        match self.current.take() {
            Some(Reply::Ack {
                code,
                command,
                message,
            }) => Err(TransportError::Server {
                code,
                command,
                message,
            }),
            Some(Reply::Connection(message)) => Err(TransportError::Connection { message }),
            _ => Ok(()),
        }
    }
}
