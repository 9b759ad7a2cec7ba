//! The speech-recognition capability and the microphone session built on top of it.
//!
//! Recognition itself is a black box behind `SpeechEngine`. An engine delivers lifecycle events
//! and at most one useful transcript per session. `Microphone` drives a session and tracks the
//! listening state shown next to the mic control.

use crate::{MicUnavailable, Result};
use anyhow::{bail, Context};
use std::collections::VecDeque;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace};

pub const STATUS_UNSUPPORTED: &str = "Mic not supported";
pub const STATUS_LISTENING: &str = "Listening...";
pub const STATUS_IDLE: &str = "Start Listening";

/// Something a speech engine reports during a session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SpeechEvent {
    Start,
    /// A final transcript.
    Result(String),
    End,
}

/// A speech-recognition engine.
#[async_trait::async_trait]
pub trait SpeechEngine {
    /// Whether the host can do recognition at all. Read once, when a `Microphone` is built.
    fn is_supported(&self) -> bool;

    /// Begins a listening session.
    async fn start(&mut self) -> Result<()>;

    /// Ends the current session. Results produced afterwards are of no interest.
    async fn stop(&mut self) -> Result<()>;

    /// Waits for the next event, or returns `None` once the engine has nothing more to say.
    async fn next_event(&mut self) -> Result<Option<SpeechEvent>>;
}

/// Drives listening sessions on an engine.
pub struct Microphone<E> {
    engine: E,
    supported: bool,
    listening: bool,
    stopped: bool,
}

impl<E> Microphone<E>
where
    E: SpeechEngine + Send,
{
    pub fn new(engine: E) -> Self {
        let supported = engine.is_supported();
        if !supported {
            debug!("Speech recognition is not supported here");
        }
        Self {
            engine,
            supported,
            listening: false,
            stopped: false,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// The label shown next to the mic control.
    pub fn status(&self) -> &'static str {
        if !self.supported {
            STATUS_UNSUPPORTED
        } else if self.listening {
            STATUS_LISTENING
        } else {
            STATUS_IDLE
        }
    }

    /// Runs one session and returns its transcript, if the engine produced one.
    ///
    /// Only the first result is kept. The session is stopped as soon as it arrives and anything
    /// the engine says afterwards, other than `End`, is ignored.
    ///
    /// # Errors
    /// - `MicUnavailable` when the engine is not supported.
    /// - Any error from the engine.
    pub async fn listen(&mut self) -> Result<Option<String>> {
        if !self.supported {
            return Err(MicUnavailable.into());
        }
        self.stopped = false;
        self.engine
            .start()
            .await
            .context("Unable to start listening")?;

        let mut transcript = None;
        while let Some(event) = self.engine.next_event().await? {
            trace!("speech event {event:?}");
            match event {
                SpeechEvent::Start => self.listening = true,
                SpeechEvent::Result(text) => {
                    if self.stopped || transcript.is_some() {
                        continue;
                    }
                    transcript = Some(text);
                    self.stop().await?;
                }
                SpeechEvent::End => break,
            }
        }
        self.listening = false;
        Ok(transcript)
    }

    /// Stops listening. Results arriving after this are dropped.
    pub async fn stop(&mut self) -> Result<()> {
        self.stopped = true;
        self.engine.stop().await
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

/// Reads one line of text per session from `reader` and reports it as the final transcript. In a
/// terminal this is plain dictation: whatever is typed, or piped in, is what was "heard".
pub struct LineEngine<R> {
    reader: R,
    queue: VecDeque<SpeechEvent>,
    active: bool,
}

impl<R> LineEngine<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            queue: VecDeque::new(),
            active: false,
        }
    }
}

#[async_trait::async_trait]
impl<R> SpeechEngine for LineEngine<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn is_supported(&self) -> bool {
        true
    }

    async fn start(&mut self) -> Result<()> {
        if !self.active {
            self.active = true;
            self.queue.push_back(SpeechEvent::Start);
        }
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if self.active {
            self.active = false;
            self.queue.push_back(SpeechEvent::End);
        }
        Ok(())
    }

    async fn next_event(&mut self) -> Result<Option<SpeechEvent>> {
        if let Some(event) = self.queue.pop_front() {
            return Ok(Some(event));
        }
        if !self.active {
            return Ok(None);
        }
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .await
            .context("Unable to read the transcript")?;
        let text = line.trim();
        if read > 0 && !text.is_empty() {
            self.queue.push_back(SpeechEvent::Result(text.to_string()));
        } else {
            self.active = false;
            self.queue.push_back(SpeechEvent::End);
        }
        Ok(self.queue.pop_front())
    }
}

/// Plays back a fixed list of events, one session's worth per `start`.
#[derive(Debug, Default, Clone)]
pub struct ScriptedEngine {
    script: VecDeque<SpeechEvent>,
    started: bool,
    starts: usize,
    stops: usize,
}

impl ScriptedEngine {
    pub fn new(script: impl IntoIterator<Item = SpeechEvent>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A session that hears `transcript` once.
    pub fn hearing(transcript: impl Into<String>) -> Self {
        Self::new([
            SpeechEvent::Start,
            SpeechEvent::Result(transcript.into()),
            SpeechEvent::End,
        ])
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn stops(&self) -> usize {
        self.stops
    }
}

#[async_trait::async_trait]
impl SpeechEngine for ScriptedEngine {
    fn is_supported(&self) -> bool {
        true
    }

    async fn start(&mut self) -> Result<()> {
        self.started = true;
        self.starts += 1;
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.stops += 1;
        Ok(())
    }

    async fn next_event(&mut self) -> Result<Option<SpeechEvent>> {
        if !self.started {
            return Ok(None);
        }
        let event = self.script.pop_front();
        if matches!(event, Some(SpeechEvent::End) | None) {
            self.started = false;
        }
        Ok(event)
    }
}

/// The engine of a host without speech recognition.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedEngine;

#[async_trait::async_trait]
impl SpeechEngine for UnsupportedEngine {
    fn is_supported(&self) -> bool {
        false
    }

    async fn start(&mut self) -> Result<()> {
        bail!(MicUnavailable)
    }

    async fn stop(&mut self) -> Result<()> {
        Ok(())
    }

    async fn next_event(&mut self) -> Result<Option<SpeechEvent>> {
        Ok(None)
    }
}
