use std::time::Duration;

use anyhow::{anyhow, Result};

use crate::integrations::track_lookup::ProbeAnswer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackSource {
    Simulated(ProbeAnswer),
    AudioUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Track { uri: String, source: TrackSource },
    Change(Option<String>),
    Pause,
    Resume,
    Seek(u64),
    Wait(Duration),
    Translate(String),
    Quit,
}

impl SessionCommand {
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if !trimmed.starts_with('/') {
            return Err(anyhow!("session commands must start with '/'"));
        }

        let mut parts = trimmed[1..].split_whitespace();
        let cmd = parts.next().ok_or_else(|| anyhow!("empty command"))?;
        let args = parts.collect::<Vec<_>>();

        match cmd {
            "track" => {
                let [uri, source] = args.as_slice() else {
                    return Err(anyhow!(
                        "usage: /track <uri> <playable|unplayable|error|http-url>"
                    ));
                };
                Ok(Self::Track {
                    uri: (*uri).to_string(),
                    source: parse_source(source)?,
                })
            }
            "change" => match args.as_slice() {
                [] => Ok(Self::Change(None)),
                [uri] => Ok(Self::Change(Some((*uri).to_string()))),
                _ => Err(anyhow!("usage: /change [uri]")),
            },
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "seek" => {
                let [value] = args.as_slice() else {
                    return Err(anyhow!("usage: /seek <ms>"));
                };
                let position = value
                    .parse::<u64>()
                    .map_err(|_| anyhow!("seek position must be a whole number of ms"))?;
                Ok(Self::Seek(position))
            }
            "wait" => {
                let [value] = args.as_slice() else {
                    return Err(anyhow!("usage: /wait <seconds>"));
                };
                let seconds = value
                    .parse::<f64>()
                    .map_err(|_| anyhow!("wait must be a number of seconds"))?;
                if !seconds.is_finite() || seconds < 0.0 {
                    return Err(anyhow!("wait must be a non-negative number of seconds"));
                }
                let duration = Duration::try_from_secs_f64(seconds)
                    .map_err(|err| anyhow!("wait of {seconds}s is out of range: {err}"))?;
                Ok(Self::Wait(duration))
            }
            "translate" => {
                let [uri] = args.as_slice() else {
                    return Err(anyhow!("usage: /translate <uri>"));
                };
                Ok(Self::Translate((*uri).to_string()))
            }
            "quit" | "q" => Ok(Self::Quit),
            _ => Err(anyhow!("unknown command: {cmd}")),
        }
    }
}

fn parse_source(value: &str) -> Result<TrackSource> {
    if value.starts_with("http://") || value.starts_with("https://") {
        return Ok(TrackSource::AudioUrl(value.to_string()));
    }

    match value.to_ascii_lowercase().as_str() {
        "playable" | "ok" => Ok(TrackSource::Simulated(ProbeAnswer::Playable)),
        "unplayable" => Ok(TrackSource::Simulated(ProbeAnswer::Unplayable)),
        "error" => Ok(TrackSource::Simulated(ProbeAnswer::NetworkError)),
        _ => Err(anyhow!(
            "invalid track source '{value}' (expected playable, unplayable, error or an http url)"
        )),
    }
}
