use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::domain::commands::{SessionCommand, TrackSource};
use crate::domain::events::{EventBus, PlaybackEvent, PlaybackListener};
use crate::domain::models::{PandoraTrack, Track};
use crate::integrations::playback::SimulatedHost;
use crate::integrations::track_lookup::{
    BufferedTrackLookup, HttpPlayabilityProbe, PlayabilityProbe, StaticPlayabilityProbe,
};
use crate::playback::{
    Clock, GestureDetector, ManualClock, SystemClock, TrackTransitionController,
};
use crate::storage::config::RuntimeConfig;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub debug: bool,
    pub config_path: Option<PathBuf>,
    pub realtime: bool,
    pub http_probe: bool,
    pub script: Option<PathBuf>,
}

pub struct SessionProbe {
    scripted: StaticPlayabilityProbe,
    http: Option<HttpPlayabilityProbe>,
}

impl SessionProbe {
    pub fn offline() -> Self {
        Self {
            scripted: StaticPlayabilityProbe::new(),
            http: None,
        }
    }

    pub fn with_http(http: HttpPlayabilityProbe) -> Self {
        Self {
            scripted: StaticPlayabilityProbe::new(),
            http: Some(http),
        }
    }
}

impl PlayabilityProbe for SessionProbe {
    fn is_playable(&self, audio_url: &str) -> Result<bool> {
        match (self.scripted.answer(audio_url), &self.http) {
            (Some(_), _) | (None, None) => self.scripted.is_playable(audio_url),
            (None, Some(http)) => http.is_playable(audio_url),
        }
    }
}

pub type SessionDetector = GestureDetector<SimulatedHost, BufferedTrackLookup<SessionProbe>>;

struct CollectingListener(Arc<Mutex<Vec<PlaybackEvent>>>);

impl PlaybackListener for CollectingListener {
    fn on_event(&mut self, event: &PlaybackEvent) {
        if let Ok(mut events) = self.0.lock() {
            events.push(event.clone());
        }
    }
}

pub struct Session {
    pub running: bool,
    pub status_message: String,
    detector: SessionDetector,
    manual_clock: Option<ManualClock>,
    events: Arc<Mutex<Vec<PlaybackEvent>>>,
    host_calls: Arc<Mutex<Vec<String>>>,
}

impl Session {
    pub fn new(double_click_interval: Duration, probe: SessionProbe) -> Self {
        let clock = ManualClock::new();
        Self::build(
            double_click_interval,
            probe,
            Box::new(clock.clone()),
            Some(clock),
        )
    }

    pub fn new_realtime(double_click_interval: Duration, probe: SessionProbe) -> Self {
        Self::build(double_click_interval, probe, Box::new(SystemClock), None)
    }

    fn build(
        double_click_interval: Duration,
        probe: SessionProbe,
        clock: Box<dyn Clock>,
        manual_clock: Option<ManualClock>,
    ) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let host_calls = Arc::new(Mutex::new(Vec::new()));

        let mut bus = EventBus::new();
        bus.subscribe(Box::new(CollectingListener(events.clone())));

        let controller = TrackTransitionController::new(
            SimulatedHost::new(host_calls.clone()),
            BufferedTrackLookup::new(probe),
            Box::new(bus),
        );

        Self {
            running: true,
            status_message: "Ready".to_string(),
            detector: GestureDetector::new(controller, clock, double_click_interval),
            manual_clock,
            events,
            host_calls,
        }
    }

    pub fn detector(&self) -> &SessionDetector {
        &self.detector
    }

    pub fn host_calls(&self) -> Vec<String> {
        self.host_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn take_events(&mut self) -> Vec<PlaybackEvent> {
        self.events
            .lock()
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    pub fn submit_line(&mut self, line: &str) -> Result<Vec<PlaybackEvent>> {
        let command = SessionCommand::parse(line)?;
        self.execute(command);
        Ok(self.take_events())
    }

    pub fn execute(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Track { uri, source } => self.buffer_track(uri, source),
            SessionCommand::Change(uri) => {
                let track = match uri {
                    Some(uri) => Track::new(uri.clone(), uri),
                    None => Track::without_uri("untitled"),
                };
                self.change_track(&track);
            }
            SessionCommand::Pause => {
                self.detector.pause();
                self.status_message = "Paused".to_string();
            }
            SessionCommand::Resume => {
                self.detector.resume();
                self.status_message = "Playing".to_string();
            }
            SessionCommand::Seek(position_ms) => {
                self.detector.controller_mut().host_mut().seek(position_ms);
                self.status_message = format!("Position {position_ms} ms");
            }
            SessionCommand::Wait(duration) => {
                let advanced = match &self.manual_clock {
                    Some(clock) => clock.advance(duration),
                    None => {
                        thread::sleep(duration);
                        true
                    }
                };
                self.status_message = if advanced {
                    format!("Waited {:.3}s", duration.as_secs_f64())
                } else {
                    warn!(seconds = duration.as_secs_f64(), "clock cannot advance that far");
                    format!("Clock cannot advance by {:.3}s", duration.as_secs_f64())
                };
            }
            SessionCommand::Translate(uri) => {
                self.status_message = match self.detector.translate_uri(&uri) {
                    Ok(audio_url) => format!("{uri} -> {audio_url}"),
                    Err(err) => format!("Translate failed: {err}"),
                };
            }
            SessionCommand::Quit => {
                self.running = false;
                self.status_message = "Bye".to_string();
            }
        }
    }

    fn buffer_track(&mut self, uri: String, source: TrackSource) {
        let lookup = self.detector.controller_mut().lookup_mut();
        let audio_url = match source {
            TrackSource::AudioUrl(url) => url,
            TrackSource::Simulated(answer) => {
                let url = format!("sim://{uri}");
                lookup.probe_mut().scripted.set_answer(url.clone(), answer);
                url
            }
        };
        lookup.insert(PandoraTrack {
            uri: uri.clone(),
            audio_url,
        });
        self.status_message = format!("Buffered {uri} ({} tracks)", lookup.len());
    }

    fn change_track(&mut self, track: &Track) {
        let name = track.uri.as_deref().unwrap_or(track.name.as_str());
        self.status_message = match self.detector.change_track(track) {
            Ok(true) => format!("Now playing {name}"),
            Ok(false) => format!("Host refused {name}"),
            Err(err) if err.is_terminal() => format!("Stopped: {err}"),
            Err(err) => format!("Skipped: {err}"),
        };
    }
}

pub fn replay<R: BufRead, W: Write>(session: &mut Session, reader: R, mut out: W) -> Result<()> {
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed reading script line {}", idx + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match session.submit_line(line) {
            Ok(events) => {
                for event in events {
                    let json =
                        serde_json::to_string(&event).context("failed to serialize event")?;
                    writeln!(out, "{json}").context("failed writing event")?;
                }
                info!(line = idx + 1, status = %session.status_message, "command applied");
            }
            Err(err) => {
                warn!(line = idx + 1, error = %err, "skipping invalid command");
            }
        }

        if !session.running {
            break;
        }
    }

    out.flush().context("failed flushing output")
}

pub fn run(options: RunOptions) -> Result<()> {
    init_tracing(options.debug);

    let config = match &options.config_path {
        Some(path) => RuntimeConfig::load_from_path(path),
        None => RuntimeConfig::load(),
    }
    .context("load runtime config")?;

    let probe = if options.http_probe {
        SessionProbe::with_http(HttpPlayabilityProbe::new_with_timeout(
            Duration::from_millis(config.playability.timeout_ms),
        )?)
    } else {
        SessionProbe::offline()
    };

    let interval = config.pandora.double_click_interval()?;
    let mut session = if options.realtime {
        Session::new_realtime(interval, probe)
    } else {
        Session::new(interval, probe)
    };

    let stdout = io::stdout();
    match &options.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script: {}", path.display()))?;
            replay(&mut session, BufReader::new(file), stdout.lock())
        }
        None => replay(&mut session, io::stdin().lock(), stdout.lock()),
    }
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "pandora_playback=debug"
    } else {
        "pandora_playback=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrations::track_lookup::ProbeAnswer;

    #[test]
    fn scripted_answers_take_precedence_over_http() {
        let http = HttpPlayabilityProbe::new_with_timeout(Duration::from_millis(200))
            .expect("build probe");
        let mut probe = SessionProbe::with_http(http);
        probe
            .scripted
            .set_answer("http://127.0.0.1:9/never-contacted", ProbeAnswer::Playable);

        assert!(probe
            .is_playable("http://127.0.0.1:9/never-contacted")
            .expect("scripted answer"));
    }

    #[test]
    fn offline_probe_rejects_unknown_urls() {
        let probe = SessionProbe::offline();
        assert!(!probe
            .is_playable("https://audio.example/unknown")
            .expect("offline answer"));
    }

    #[test]
    fn bare_change_reports_skip_without_touching_host() {
        let mut session = Session::new(Duration::from_secs(2), SessionProbe::offline());
        session.execute(SessionCommand::Change(None));

        assert_eq!(session.status_message, "Skipped: track has no URI");
        assert!(session.host_calls().is_empty());
    }
}
