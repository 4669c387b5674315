use std::{
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    time::Duration,
};

use crate::{
    assets::{
        decode::{PreparedImage, decode_image},
        loader::{ImageLoader, ImageSource},
    },
    foundation::error::{MemeError, MemeResult},
};

/// Sequence number handed out for one load request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(pub u64);

/// Result of one load request, delivered back to the editor.
#[derive(Debug)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub source: ImageSource,
    pub result: MemeResult<PreparedImage>,
}

/// Issues increasing tickets and collects completions, possibly out of order.
///
/// Only the most recently issued ticket is current; completions for older tickets are stale
/// and must be dropped by the consumer.
#[derive(Debug)]
pub struct LoadQueue {
    next: u64,
    latest: Option<LoadTicket>,
    tx: Sender<LoadCompletion>,
    rx: Receiver<LoadCompletion>,
}

impl Default for LoadQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            next: 1,
            latest: None,
            tx,
            rx,
        }
    }

    pub fn issue(&mut self) -> LoadTicket {
        let ticket = LoadTicket(self.next);
        self.next += 1;
        self.latest = Some(ticket);
        ticket
    }

    pub fn latest(&self) -> Option<LoadTicket> {
        self.latest
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.latest == Some(ticket)
    }

    /// Give up on `ticket`; a completion that arrives later is treated as stale.
    pub fn retire(&mut self, ticket: LoadTicket) {
        if self.latest == Some(ticket) {
            self.latest = None;
        }
    }

    pub fn sender(&self) -> Sender<LoadCompletion> {
        self.tx.clone()
    }

    /// Resolve and decode `source` off the calling thread, then post the completion back.
    ///
    /// Network fetches block on a dedicated thread; only the decode runs on the rayon pool.
    pub fn spawn(&self, ticket: LoadTicket, loader: ImageLoader, source: ImageSource) {
        let tx = self.sender();
        if !loader.needs_network(&source) {
            rayon::spawn(move || {
                let result = loader.load(&source);
                post(&tx, ticket, source, result);
            });
            return;
        }

        let fallback = (tx.clone(), source.clone());
        let spawned = std::thread::Builder::new()
            .name(format!("memeforge-fetch-{}", ticket.0))
            .spawn(move || match loader.fetch(&source) {
                Ok(bytes) => rayon::spawn(move || {
                    let result = decode_image(bytes.as_slice());
                    post(&tx, ticket, source, result);
                }),
                Err(err) => post(&tx, ticket, source, Err(err)),
            });
        if let Err(err) = spawned {
            let (tx, source) = fallback;
            let err = MemeError::load(format!("failed to start fetch thread: {err}"));
            post(&tx, ticket, source, Err(err));
        }
    }

    pub fn try_next(&self) -> Option<LoadCompletion> {
        self.rx.try_recv().ok()
    }

    /// Block up to `timeout` for the next completion.
    pub fn next_timeout(&self, timeout: Duration) -> Option<LoadCompletion> {
        match self.rx.recv_timeout(timeout) {
            Ok(c) => Some(c),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

fn post(
    tx: &Sender<LoadCompletion>,
    ticket: LoadTicket,
    source: ImageSource,
    result: MemeResult<PreparedImage>,
) {
    // The receiver is gone once the editor is dropped.
    let _ = tx.send(LoadCompletion {
        ticket,
        source,
        result,
    });
}

#[cfg(test)]
#[path = "../../tests/unit/editor/loads.rs"]
mod tests;
