//! Ambient track playback.
//!
//! The timer only ever asks for play, stop and a play/pause toggle. Every
//! failure (missing file, no output device, undecodable track) is logged and
//! the player falls back to silence.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::{debug, info, warn};

use crate::error::AudioError;

pub trait AmbientPlayer {
    /// Start the track from the beginning, looping until stopped
    fn play(&mut self);
    fn stop(&mut self);
    /// Pause when playing, resume when paused. Returns whether audio is now playing.
    fn toggle(&mut self) -> bool;
    fn is_playing(&self) -> bool;
}

/// Player used when audio is disabled or unavailable.
/// Tracks the requested state so the mute indicator stays meaningful.
#[derive(Debug, Default)]
pub struct SilentPlayer {
    loaded: bool,
    playing: bool,
}

impl SilentPlayer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AmbientPlayer for SilentPlayer {
    fn play(&mut self) {
        self.loaded = true;
        self.playing = true;
    }

    fn stop(&mut self) {
        self.loaded = false;
        self.playing = false;
    }

    fn toggle(&mut self) -> bool {
        if self.loaded {
            self.playing = !self.playing;
        }
        self.playing
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Loops a track through the default output device using rodio
pub struct RodioPlayer {
    track: PathBuf,
    // Dropping the stream silences every sink attached to it
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
}

impl RodioPlayer {
    pub fn new(track: impl Into<PathBuf>) -> Self {
        Self {
            track: track.into(),
            output: None,
            sink: None,
        }
    }

    fn output_handle(&mut self) -> Result<&OutputStreamHandle, AudioError> {
        if self.output.is_none() {
            let output =
                OutputStream::try_default().map_err(|e| AudioError::Init(e.to_string()))?;
            self.output = Some(output);
        }
        match &self.output {
            Some((_, handle)) => Ok(handle),
            None => Err(AudioError::Init("output stream unavailable".into())),
        }
    }

    fn start_looping(&mut self) -> Result<Sink, AudioError> {
        if !self.track.exists() {
            return Err(AudioError::MissingResource(self.track.clone()));
        }

        let file = File::open(&self.track).map_err(|source| AudioError::Open {
            path: self.track.clone(),
            source,
        })?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|e| AudioError::Decode(e.to_string()))?;

        let handle = self.output_handle()?;
        let sink = Sink::try_new(handle).map_err(|e| AudioError::Init(e.to_string()))?;
        sink.append(source.repeat_infinite());
        sink.play();
        Ok(sink)
    }
}

impl AmbientPlayer for RodioPlayer {
    fn play(&mut self) {
        self.stop();
        match self.start_looping() {
            Ok(sink) => {
                info!(track = %self.track.display(), "ambient audio started");
                self.sink = Some(sink);
            }
            Err(err) => {
                warn!(error = %err, "ambient audio skipped");
            }
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            debug!("ambient audio stopped");
        }
    }

    fn toggle(&mut self) -> bool {
        match &self.sink {
            Some(sink) if sink.is_paused() => {
                sink.play();
                true
            }
            Some(sink) => {
                sink.pause();
                false
            }
            None => false,
        }
    }

    fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .map(|sink| !sink.is_paused() && !sink.empty())
            .unwrap_or(false)
    }
}
