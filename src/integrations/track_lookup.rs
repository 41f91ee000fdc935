use std::collections::HashMap;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::models::PandoraTrack;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no playlist item buffered for '{0}'")]
    Missing(String),
}

pub trait TrackLookup: Send {
    fn lookup(&self, uri: &str) -> Result<PandoraTrack, LookupError>;
    /// `Err` means the check itself failed (network); `Ok(false)` means rejected.
    fn check_playable(&self, track: &PandoraTrack) -> Result<bool>;
}

pub trait PlayabilityProbe: Send {
    fn is_playable(&self, audio_url: &str) -> Result<bool>;
}

pub struct BufferedTrackLookup<P: PlayabilityProbe> {
    items: HashMap<String, PandoraTrack>,
    probe: P,
}

impl<P: PlayabilityProbe> BufferedTrackLookup<P> {
    pub fn new(probe: P) -> Self {
        Self {
            items: HashMap::new(),
            probe,
        }
    }

    pub fn probe_mut(&mut self) -> &mut P {
        &mut self.probe
    }

    pub fn insert(&mut self, track: PandoraTrack) {
        self.items.insert(track.uri.clone(), track);
    }

    pub fn remove(&mut self, uri: &str) -> Option<PandoraTrack> {
        self.items.remove(uri)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<P: PlayabilityProbe> TrackLookup for BufferedTrackLookup<P> {
    fn lookup(&self, uri: &str) -> Result<PandoraTrack, LookupError> {
        self.items
            .get(uri)
            .cloned()
            .ok_or_else(|| LookupError::Missing(uri.to_string()))
    }

    fn check_playable(&self, track: &PandoraTrack) -> Result<bool> {
        if track.audio_url.trim().is_empty() {
            return Ok(false);
        }
        self.probe.is_playable(&track.audio_url)
    }
}

/// Sends a `HEAD` to the audio URL; only HTTP 200 counts as playable.
pub struct HttpPlayabilityProbe {
    client: Client,
}

impl HttpPlayabilityProbe {
    pub fn new() -> Result<Self> {
        Self::new_with_timeout(Duration::from_secs(3))
    }

    pub fn new_with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build playability client")?;
        Ok(Self { client })
    }
}

impl PlayabilityProbe for HttpPlayabilityProbe {
    fn is_playable(&self, audio_url: &str) -> Result<bool> {
        let response = self
            .client
            .head(audio_url)
            .send()
            .with_context(|| format!("failed checking audio URL {audio_url}"))?;
        Ok(response.status() == StatusCode::OK)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeAnswer {
    Playable,
    Unplayable,
    NetworkError,
}

#[derive(Debug, Clone, Default)]
pub struct StaticPlayabilityProbe {
    answers: HashMap<String, ProbeAnswer>,
}

impl StaticPlayabilityProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, audio_url: impl Into<String>, answer: ProbeAnswer) -> Self {
        self.set_answer(audio_url, answer);
        self
    }

    pub fn set_answer(&mut self, audio_url: impl Into<String>, answer: ProbeAnswer) {
        self.answers.insert(audio_url.into(), answer);
    }

    pub fn answer(&self, audio_url: &str) -> Option<ProbeAnswer> {
        self.answers.get(audio_url).copied()
    }
}

impl PlayabilityProbe for StaticPlayabilityProbe {
    fn is_playable(&self, audio_url: &str) -> Result<bool> {
        match self.answer(audio_url) {
            Some(ProbeAnswer::Playable) => Ok(true),
            Some(ProbeAnswer::Unplayable) | None => Ok(false),
            Some(ProbeAnswer::NetworkError) => {
                Err(anyhow!("simulated network error for {audio_url}"))
            }
        }
    }
}
