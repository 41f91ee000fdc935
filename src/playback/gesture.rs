use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::events::PlaybackEvent;
use crate::domain::models::Track;
use crate::integrations::playback::HostPlayback;
use crate::integrations::track_lookup::TrackLookup;
use crate::playback::clock::Clock;
use crate::playback::error::TransitionError;
use crate::playback::transition::TrackTransitionController;

/// Detects a pause followed quickly by a resume or track change.
///
/// Nothing runs in the background: the pending click is checked, and expired,
/// only when the next action arrives.
pub struct GestureDetector<H, L> {
    controller: TrackTransitionController<H, L>,
    clock: Box<dyn Clock>,
    double_click_interval: Duration,
    click_time: Option<Instant>,
}

impl<H: HostPlayback, L: TrackLookup> GestureDetector<H, L> {
    pub fn new(
        controller: TrackTransitionController<H, L>,
        clock: Box<dyn Clock>,
        double_click_interval: Duration,
    ) -> Self {
        Self {
            controller,
            clock,
            double_click_interval,
            click_time: None,
        }
    }

    pub fn is_double_click(&mut self) -> bool {
        let double_clicked = self.click_time.is_some_and(|clicked| {
            self.clock.now().saturating_duration_since(clicked) < self.double_click_interval
        });

        if !double_clicked {
            self.click_time = None;
        }
        double_clicked
    }

    pub fn change_track(&mut self, track: &Track) -> Result<bool, TransitionError> {
        if self.is_double_click() {
            self.trigger_double_clicked();
        }
        self.controller.change_track(track)
    }

    pub fn resume(&mut self) -> bool {
        // Position zero means the track never started; no gesture to detect.
        if self.controller.host().time_position() > 0 && self.is_double_click() {
            self.trigger_double_clicked();
        }
        self.controller.host_mut().resume()
    }

    pub fn pause(&mut self) -> bool {
        if self.controller.host().time_position() > 0 {
            self.click_time = Some(self.clock.now());
        }
        self.controller.host_mut().pause()
    }

    pub fn translate_uri(&self, uri: &str) -> Result<String, TransitionError> {
        self.controller.translate_uri(uri)
    }

    pub fn is_pending(&self) -> bool {
        self.click_time.is_some()
    }

    pub fn double_click_interval(&self) -> Duration {
        self.double_click_interval
    }

    pub fn controller(&self) -> &TrackTransitionController<H, L> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut TrackTransitionController<H, L> {
        &mut self.controller
    }

    fn trigger_double_clicked(&mut self) {
        self.click_time = None;
        debug!("double click detected");
        self.controller.publish(PlaybackEvent::DoubleClicked);
    }
}
