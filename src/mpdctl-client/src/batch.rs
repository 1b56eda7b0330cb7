//! Command-list transactions.
//!
//! A transaction queues several commands and submits them as one request.
//! The daemon executes the list until its first failing command; on the
//! client side queueing stops at the first command that cannot be sent.

use crate::error::{ClientError, ClientResult};
use crate::partition::Partition;
use crate::transport::{Command, Transport, TransportError};

/// An open command list handed to transaction bodies.
pub struct CommandList<'a, T: Transport> {
    transport: &'a mut T,
    queued: usize,
    failure: Option<(usize, TransportError)>,
}

impl<'a, T: Transport> CommandList<'a, T> {
    fn new(transport: &'a mut T) -> Self {
        Self {
            transport,
            queued: 0,
            failure: None,
        }
    }

    /// Queues `command`. Returns `false` once a command could not be queued;
    /// from then on nothing else is sent.
    pub fn push(&mut self, command: Command) -> bool {
        if self.failure.is_some() {
            return false;
        }
        match self.transport.send(&command) {
            Ok(()) => {
                self.queued += 1;
                true
            }
            Err(err) => {
                tracing::error!(
                    command = command.name(),
                    index = self.queued,
                    error = %err,
                    "failed to queue command"
                );
                self.failure = Some((self.queued, err));
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.queued
    }

    pub fn is_empty(&self) -> bool {
        self.queued == 0
    }

    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }
}

impl<T: Transport> Partition<T> {
    /// Opens a command list, lets `fill` queue commands, then always closes
    /// the list and finishes the response. The response is finished even when
    /// the list could not be opened.
    ///
    /// Succeeds only if every command was queued and the daemon acknowledged
    /// the list. A queueing failure is reported as [`ClientError::Enqueue`];
    /// the commands queued before it are still submitted.
    pub fn transaction<F>(&mut self, context: &'static str, fill: F) -> ClientResult<()>
    where
        F: FnOnce(&mut CommandList<'_, T>),
    {
        if let Err(err) = self.transport_mut().command_list_begin() {
            let finished = self.transport_mut().finish();
            let err = self.recover(context, err);
            if let Err(late) = finished {
                let _ = self.recover(context, late);
            }
            return Err(err);
        }

        let failure = {
            let mut list = CommandList::new(self.transport_mut());
            fill(&mut list);
            list.failure
        };

        let ended = self.transport_mut().command_list_end();
        let finished = self.transport_mut().finish();
        let response = ended.and(finished);

        match failure {
            None => response.map_err(|err| self.recover(context, err)),
            Some((index, err)) => {
                if let Err(late) = response {
                    let _ = self.recover(context, late);
                }
                let message = err.to_string();
                if err.is_connection() {
                    let _ = self.recover(context, err);
                }
                Err(ClientError::Enqueue {
                    command: context,
                    index,
                    message,
                })
            }
        }
    }

    /// Turns each item into a command and submits them in one transaction.
    ///
    /// Items are consumed in order and each is attempted at most once; after
    /// the first failure the remaining items are dropped unsent.
    pub fn run_batch<I, F>(
        &mut self,
        context: &'static str,
        items: I,
        mut to_command: F,
    ) -> ClientResult<()>
    where
        I: IntoIterator,
        F: FnMut(usize, I::Item) -> Command,
    {
        self.transaction(context, |list| {
            for (index, item) in items.into_iter().enumerate() {
                if !list.push(to_command(index, item)) {
                    break;
                }
            }
        })
    }
}
