//! Capture plumbing: where captured bytes come from and the worker that persists them.
//!
//! Camera bindings implement [`FrameSource`]. Persisting a frame is handed to a single
//! [`CaptureWriter`] thread so the interactive thread never blocks on disk I/O; the caller gets a
//! [`CaptureTicket`] to collect the outcome whenever it is ready to report it.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::fs::write_new;

const WRITER_THREAD_NAME: &str = "capture-writer";

/// Producer of encoded image bytes, typically a camera binding.
pub trait FrameSource {
    fn grab(&mut self) -> anyhow::Result<Vec<u8>>;
}

/// Frame source that replays an existing image file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for FileSource {
    fn grab(&mut self) -> anyhow::Result<Vec<u8>> {
        fs::read(&self.path).with_context(|| format!("reading frame from {}", self.path.display()))
    }
}

#[derive(Debug)]
struct CaptureJob {
    target: PathBuf,
    bytes: Vec<u8>,
    reply: Sender<CatalogResult<PathBuf>>,
}

/// Pending outcome of a submitted capture.
#[derive(Debug)]
pub struct CaptureTicket {
    target: PathBuf,
    reply: Receiver<CatalogResult<PathBuf>>,
}

impl CaptureTicket {
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Block until the writer has finished with this capture.
    pub fn wait(self) -> CatalogResult<PathBuf> {
        self.reply.recv().unwrap_or(Err(CatalogError::WorkerStopped))
    }

    /// Non-blocking poll; `None` while the write is still queued or running.
    pub fn try_result(&self) -> Option<CatalogResult<PathBuf>> {
        match self.reply.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => Some(Err(CatalogError::WorkerStopped)),
        }
    }
}

/// Single background thread writing captured frames to their targets in submission order.
#[derive(Debug)]
pub struct CaptureWriter {
    queue: Option<Sender<CaptureJob>>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureWriter {
    pub fn spawn() -> anyhow::Result<Self> {
        let (queue, jobs) = mpsc::channel::<CaptureJob>();
        let worker = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || run_writer(jobs))
            .context("spawning capture writer thread")?;
        Ok(Self { queue: Some(queue), worker: Some(worker) })
    }

    /// Queue `bytes` for writing to `target`, which must not exist yet.
    pub fn submit(&self, target: PathBuf, bytes: Vec<u8>) -> CaptureTicket {
        let (reply, outcome) = mpsc::channel();
        let job = CaptureJob { target: target.clone(), bytes, reply };

        // A rejected job drops its reply sender, which the ticket reports as `WorkerStopped`.
        if let Some(queue) = &self.queue {
            let _ = queue.send(job);
        }
        CaptureTicket { target, reply: outcome }
    }

    /// Grab one frame from `source` and queue it for `target`.
    pub fn capture<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        target: PathBuf,
    ) -> anyhow::Result<CaptureTicket> {
        let bytes = source.grab()?;
        Ok(self.submit(target, bytes))
    }

    /// Stop accepting work and wait for queued captures to finish.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.queue.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("capture writer thread panicked");
            }
        }
    }
}

impl Drop for CaptureWriter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_writer(jobs: Receiver<CaptureJob>) {
    debug!("capture writer started");
    for job in jobs {
        let result = write_new(&job.target, &job.bytes).map(|()| job.target.clone());
        match &result {
            Ok(path) => info!(path = %path.display(), bytes = job.bytes.len(), "photo saved"),
            Err(err) => warn!(path = %job.target.display(), error = %err, "photo capture failed"),
        }
        // The submitter may have dropped its ticket; the file is written either way.
        let _ = job.reply.send(result);
    }
    debug!("capture writer stopped");
}
