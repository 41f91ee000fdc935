use serde::Serialize;
use tracing::debug;

use crate::domain::models::Track;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlaybackEvent {
    TrackChanged { track: Track },
    SkipLimitExceeded,
    #[serde(rename = "doubleclicked")]
    DoubleClicked,
}

impl PlaybackEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TrackChanged { .. } => "track_changed",
            Self::SkipLimitExceeded => "skip_limit_exceeded",
            Self::DoubleClicked => "doubleclicked",
        }
    }
}

pub trait EventSink: Send {
    fn publish(&mut self, event: PlaybackEvent);
}

pub trait PlaybackListener: Send {
    fn on_event(&mut self, event: &PlaybackEvent);
}

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<Box<dyn PlaybackListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn PlaybackListener>) {
        self.listeners.push(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl EventSink for EventBus {
    fn publish(&mut self, event: PlaybackEvent) {
        debug!(
            event = event.name(),
            listeners = self.listeners.len(),
            "publishing playback event"
        );
        for listener in &mut self.listeners {
            listener.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl PlaybackListener for Recorder {
        fn on_event(&mut self, event: &PlaybackEvent) {
            self.0
                .lock()
                .expect("lock events")
                .push(event.name().to_string());
        }
    }

    #[test]
    fn publish_reaches_every_listener_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(Box::new(Recorder(seen.clone())));
        bus.subscribe(Box::new(Recorder(seen.clone())));

        bus.publish(PlaybackEvent::DoubleClicked);
        bus.publish(PlaybackEvent::SkipLimitExceeded);

        assert_eq!(
            *seen.lock().expect("lock events"),
            vec![
                "doubleclicked",
                "doubleclicked",
                "skip_limit_exceeded",
                "skip_limit_exceeded"
            ]
        );
    }

    #[test]
    fn publish_without_listeners_is_a_no_op() {
        let mut bus = EventBus::new();
        bus.publish(PlaybackEvent::DoubleClicked);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn events_serialize_with_their_name_tag() {
        let event = PlaybackEvent::TrackChanged {
            track: Track::new("pandora:track:1", "Song"),
        };
        let json = serde_json::to_value(&event).expect("serialize event");
        assert_eq!(json["event"], "track_changed");
        assert_eq!(json["track"]["uri"], "pandora:track:1");

        let json = serde_json::to_value(PlaybackEvent::DoubleClicked).expect("serialize event");
        assert_eq!(json["event"], "doubleclicked");
    }
}
