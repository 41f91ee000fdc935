use tracing::{debug, error, warn};

use crate::domain::events::{EventSink, PlaybackEvent};
use crate::domain::models::Track;
use crate::integrations::playback::HostPlayback;
use crate::integrations::track_lookup::TrackLookup;
use crate::playback::error::TransitionError;

pub const SKIP_LIMIT: u32 = 5;

pub struct TrackTransitionController<H, L> {
    host: H,
    lookup: L,
    events: Box<dyn EventSink>,
    consecutive_skips: u32,
}

impl<H: HostPlayback, L: TrackLookup> TrackTransitionController<H, L> {
    pub fn new(host: H, lookup: L, events: Box<dyn EventSink>) -> Self {
        Self {
            host,
            lookup,
            events,
            consecutive_skips: 0,
        }
    }

    pub fn change_track(&mut self, track: &Track) -> Result<bool, TransitionError> {
        let Some(uri) = track.playable_uri() else {
            warn!(track = %track.name, "no URI for Pandora track, track cannot be played");
            return Err(TransitionError::NoUri);
        };

        let item = match self.lookup.lookup(uri) {
            Ok(item) => item,
            Err(err) => {
                error!(uri = %uri, error = %err, "error changing Pandora track: lookup failed");
                return Err(TransitionError::Lookup {
                    uri: uri.to_string(),
                    reason: err.to_string(),
                });
            }
        };

        let rejection = match self.lookup.check_playable(&item) {
            Ok(true) => None,
            Ok(false) => Some("audio URL was rejected by the provider".to_string()),
            Err(err) => Some(format!("{err:#}")),
        };
        if let Some(reason) = rejection {
            return Err(self.register_skip(uri, reason));
        }

        self.consecutive_skips = 0;
        debug!(uri = %uri, "Pandora track is playable");
        self.events.publish(PlaybackEvent::TrackChanged {
            track: track.clone(),
        });
        Ok(self.host.change_track(track))
    }

    pub fn translate_uri(&self, uri: &str) -> Result<String, TransitionError> {
        self.lookup
            .lookup(uri)
            .map(|item| item.audio_url)
            .map_err(|err| TransitionError::Lookup {
                uri: uri.to_string(),
                reason: err.to_string(),
            })
    }

    pub fn consecutive_skips(&self) -> u32 {
        self.consecutive_skips
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn lookup_mut(&mut self) -> &mut L {
        &mut self.lookup
    }

    pub(crate) fn publish(&mut self, event: PlaybackEvent) {
        self.events.publish(event);
    }

    fn register_skip(&mut self, uri: &str, reason: String) -> TransitionError {
        // Capped: once at the limit, every further failure stays terminal.
        self.consecutive_skips = (self.consecutive_skips + 1).min(SKIP_LIMIT);

        if self.consecutive_skips >= SKIP_LIMIT {
            let err = TransitionError::MaxSkipLimitExceeded { limit: SKIP_LIMIT };
            error!(uri = %uri, reason = %reason, "{err}");
            self.events.publish(PlaybackEvent::SkipLimitExceeded);
            return err;
        }

        let err = TransitionError::Unplayable {
            uri: uri.to_string(),
            reason,
        };
        error!(skips = self.consecutive_skips, "{err}");
        self.host.prepare_next_track();
        err
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::models::PandoraTrack;
    use crate::integrations::playback::SimulatedHost;
    use crate::integrations::track_lookup::{
        BufferedTrackLookup, ProbeAnswer, StaticPlayabilityProbe,
    };

    struct RecordingSink(Arc<Mutex<Vec<PlaybackEvent>>>);

    impl EventSink for RecordingSink {
        fn publish(&mut self, event: PlaybackEvent) {
            self.0.lock().expect("lock events").push(event);
        }
    }

    type Controller =
        TrackTransitionController<SimulatedHost, BufferedTrackLookup<StaticPlayabilityProbe>>;
    type Log<T> = Arc<Mutex<Vec<T>>>;

    fn controller() -> (Controller, Log<String>, Log<PlaybackEvent>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let probe = StaticPlayabilityProbe::new()
            .with_answer("http://audio/good", ProbeAnswer::Playable)
            .with_answer("http://audio/bad", ProbeAnswer::Unplayable)
            .with_answer("http://audio/down", ProbeAnswer::NetworkError);
        let mut lookup = BufferedTrackLookup::new(probe);
        for (uri, audio_url) in [
            ("pandora:track:good", "http://audio/good"),
            ("pandora:track:bad", "http://audio/bad"),
            ("pandora:track:down", "http://audio/down"),
        ] {
            lookup.insert(PandoraTrack {
                uri: uri.to_string(),
                audio_url: audio_url.to_string(),
            });
        }
        let controller = TrackTransitionController::new(
            SimulatedHost::new(calls.clone()),
            lookup,
            Box::new(RecordingSink(events.clone())),
        );
        (controller, calls, events)
    }

    #[test]
    fn playable_track_is_handed_to_host() {
        let (mut controller, calls, events) = controller();
        let track = Track::new("pandora:track:good", "Good");

        assert_eq!(controller.change_track(&track), Ok(true));
        assert_eq!(
            *calls.lock().expect("lock calls"),
            vec!["change_track:pandora:track:good"]
        );
        assert_eq!(
            *events.lock().expect("lock events"),
            vec![PlaybackEvent::TrackChanged { track }]
        );
    }

    #[test]
    fn network_error_counts_as_unplayable() {
        let (mut controller, calls, _) = controller();
        let err = controller
            .change_track(&Track::new("pandora:track:down", "Down"))
            .expect_err("network failure should reject the track");

        assert!(matches!(err, TransitionError::Unplayable { .. }));
        assert!(err.to_string().contains("simulated network error"));
        assert_eq!(controller.consecutive_skips(), 1);
        assert_eq!(
            *calls.lock().expect("lock calls"),
            vec!["prepare_next_track"]
        );
    }

    #[test]
    fn lookup_miss_leaves_counter_untouched() {
        let (mut controller, calls, events) = controller();
        controller
            .change_track(&Track::new("pandora:track:bad", "Bad"))
            .expect_err("bad track");

        let err = controller
            .change_track(&Track::new("pandora:track:unknown", "Unknown"))
            .expect_err("unknown track");

        assert!(matches!(err, TransitionError::Lookup { ref uri, .. } if uri == "pandora:track:unknown"));
        assert_eq!(controller.consecutive_skips(), 1);
        assert_eq!(calls.lock().expect("lock calls").len(), 1);
        assert!(events.lock().expect("lock events").is_empty());
    }

    #[test]
    fn blank_uri_is_treated_as_missing() {
        let (mut controller, _, _) = controller();
        let track = Track {
            uri: Some("   ".to_string()),
            name: "Blank".to_string(),
        };
        assert_eq!(controller.change_track(&track), Err(TransitionError::NoUri));
    }

    #[test]
    fn host_refusal_is_reported_but_still_resets_skips() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let probe = StaticPlayabilityProbe::new()
            .with_answer("http://audio/good", ProbeAnswer::Playable);
        let mut lookup = BufferedTrackLookup::new(probe);
        lookup.insert(PandoraTrack {
            uri: "pandora:track:good".to_string(),
            audio_url: "http://audio/good".to_string(),
        });
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut controller = TrackTransitionController::new(
            SimulatedHost::new(calls).rejecting_changes(),
            lookup,
            Box::new(RecordingSink(events)),
        );

        assert_eq!(
            controller.change_track(&Track::new("pandora:track:good", "Good")),
            Ok(false)
        );
        assert_eq!(controller.consecutive_skips(), 0);
    }

    #[test]
    fn translate_uri_returns_audio_url_without_side_effects() {
        let (controller, calls, events) = controller();
        assert_eq!(controller.lookup().len(), 3);
        assert_eq!(
            controller.translate_uri("pandora:track:bad"),
            Ok("http://audio/bad".to_string())
        );
        assert!(matches!(
            controller.translate_uri("pandora:track:nope"),
            Err(TransitionError::Lookup { .. })
        ));
        assert_eq!(controller.consecutive_skips(), 0);
        assert!(calls.lock().expect("lock calls").is_empty());
        assert!(events.lock().expect("lock events").is_empty());
    }
}
