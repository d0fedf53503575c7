//! Background chunk reader.
//!
//! Reads run on a dedicated thread so the caller never blocks on I/O. Each
//! response carries the request token it was issued with; the window drops
//! any response whose token is no longer the newest. Reads are not
//! cancellable, so a superseded read still runs to completion.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use crate::core::chunk::{Chunk, ChunkReader, ReadError};
use crate::core::window::SeekTicket;

/// A finished read, tagged with the token it was requested under.
#[derive(Debug)]
pub struct LoadResponse {
    pub token: u64,
    pub result: Result<Chunk, ReadError>,
}

struct LoadRequest {
    ticket: SeekTicket,
    reader: ChunkReader,
}

pub struct ChunkLoader {
    requests: Option<Sender<LoadRequest>>,
    responses: Receiver<LoadResponse>,
    thread: Option<JoinHandle<()>>,
}

impl ChunkLoader {
    /// Starts the reader thread.
    pub fn spawn() -> std::io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<LoadRequest>();
        let (resp_tx, resp_rx) = mpsc::channel();

        let thread = thread::Builder::new()
            .name("logwarp-reader".into())
            .spawn(move || {
                // Exits once every sender is dropped
                for LoadRequest { ticket, reader } in req_rx {
                    trace!(token = ticket.token, offset = ticket.offset, "reading window");
                    let result = ticket.read(&reader);
                    if resp_tx
                        .send(LoadResponse {
                            token: ticket.token,
                            result,
                        })
                        .is_err()
                    {
                        return; // Receiver dropped, exit
                    }
                }
                debug!("reader thread stopping");
            })?;

        Ok(Self {
            requests: Some(req_tx),
            responses: resp_rx,
            thread: Some(thread),
        })
    }

    /// Queues a read. Hands the ticket back if the reader thread is gone.
    pub fn submit(&self, ticket: SeekTicket, reader: ChunkReader) -> Result<(), SeekTicket> {
        let Some(tx) = &self.requests else {
            return Err(ticket);
        };
        tx.send(LoadRequest { ticket, reader })
            .map_err(|mpsc::SendError(req)| req.ticket)
    }

    /// Whether the reader thread is still alive.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Next finished read, if one is ready.
    pub fn try_recv(&self) -> Option<LoadResponse> {
        match self.responses.try_recv() {
            Ok(resp) => Some(resp),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Waits up to `timeout` for the next finished read.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<LoadResponse> {
        match self.responses.recv_timeout(timeout) {
            Ok(resp) => Some(resp),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl std::fmt::Debug for ChunkLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkLoader")
            .field("running", &self.requests.is_some())
            .finish()
    }
}

impl Drop for ChunkLoader {
    fn drop(&mut self) {
        // Closing the request channel ends the thread's loop
        self.requests.take();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
