//! speech — spoken feedback on a single background worker
//!
//! The frame loop must never wait for audio. Messages go into a one-slot
//! mailbox drained by one dedicated thread; a message that arrives while
//! another is still pending replaces it. At most one message is playing and
//! at most one is waiting, however fast the loop produces them.

use std::process::Command;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

// ── Speakers ─────────────────────────────────────────────────────────────────

/// Something that can render a sentence as audio. Blocking is fine: it runs
/// on the worker thread.
pub trait Speaker: Send {
    fn speak(&mut self, text: &str) -> Result<()>;
}

/// Writes messages to the log instead of playing them.
#[derive(Debug, Default)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&mut self, text: &str) -> Result<()> {
        info!(target: "speech", "{text}");
        Ok(())
    }
}

/// Runs an external TTS program (e.g. `espeak`, `say`) with the message as
/// its final argument and waits for it to exit.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) -> Result<()> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .status()
            .with_context(|| format!("failed to run TTS program `{}`", self.program))?;
        if !status.success() {
            bail!("TTS program `{}` exited with {status}", self.program);
        }
        Ok(())
    }
}

/// Collects spoken messages; handy in tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct RecordingSpeaker {
    spoken: Arc<Mutex<Vec<String>>>,
}

impl RecordingSpeaker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Speaker for RecordingSpeaker {
    fn speak(&mut self, text: &str) -> Result<()> {
        if let Ok(mut v) = self.spoken.lock() {
            v.push(text.to_string());
        }
        Ok(())
    }
}

// ── Worker ───────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Mailbox {
    pending: Option<String>,
    closed: bool,
    superseded: u64,
}

struct Shared {
    mailbox: Mutex<Mailbox>,
    ready: Condvar,
}

/// Handle to the speech thread.
pub struct SpeechWorker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl SpeechWorker {
    pub fn spawn<S: Speaker + 'static>(speaker: S) -> Result<Self> {
        let shared = Arc::new(Shared {
            mailbox: Mutex::new(Mailbox::default()),
            ready: Condvar::new(),
        });
        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name("speech".into())
            .spawn(move || run_worker(worker_shared, speaker))
            .context("failed to spawn speech worker")?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Queue `text`, replacing any message that has not started playing.
    pub fn say(&self, text: impl Into<String>) {
        let Ok(mut mailbox) = self.shared.mailbox.lock() else {
            return;
        };
        if mailbox.closed {
            return;
        }
        if let Some(old) = mailbox.pending.replace(text.into()) {
            mailbox.superseded += 1;
            debug!(dropped = %old, "superseded pending speech");
        }
        self.shared.ready.notify_one();
    }

    /// Number of messages dropped because a newer one replaced them.
    pub fn superseded(&self) -> u64 {
        self.shared
            .mailbox
            .lock()
            .map(|m| m.superseded)
            .unwrap_or(0)
    }

    /// Play whatever is still pending, then stop and join the thread.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Ok(mut mailbox) = self.shared.mailbox.lock() {
            mailbox.closed = true;
        }
        self.shared.ready.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("speech worker panicked");
            }
        }
    }
}

impl Drop for SpeechWorker {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker<S: Speaker>(shared: Arc<Shared>, mut speaker: S) {
    loop {
        let next = {
            let Ok(mut mailbox) = shared.mailbox.lock() else {
                return;
            };
            while mailbox.pending.is_none() && !mailbox.closed {
                mailbox = match shared.ready.wait(mailbox) {
                    Ok(guard) => guard,
                    Err(_) => return,
                };
            }
            match mailbox.pending.take() {
                Some(text) => text,
                // Closed and drained.
                None => return,
            }
        };

        if let Err(e) = speaker.speak(&next) {
            warn!("speech failed: {e:#}");
        }
    }
}
