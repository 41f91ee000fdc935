use std::sync::{Arc, Mutex};

use crate::domain::models::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

pub trait HostPlayback: Send {
    fn change_track(&mut self, track: &Track) -> bool;
    fn resume(&mut self) -> bool;
    fn pause(&mut self) -> bool;
    /// Current position in milliseconds.
    fn time_position(&self) -> u64;
    fn prepare_next_track(&mut self);
}

pub struct SimulatedHost {
    calls: Arc<Mutex<Vec<String>>>,
    position_ms: u64,
    state: PlaybackState,
    accept_changes: bool,
}

impl SimulatedHost {
    pub fn new(calls: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            calls,
            position_ms: 0,
            state: PlaybackState::Stopped,
            accept_changes: true,
        }
    }

    pub fn rejecting_changes(mut self) -> Self {
        self.accept_changes = false;
        self
    }

    pub fn seek(&mut self, position_ms: u64) {
        self.position_ms = position_ms;
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl HostPlayback for SimulatedHost {
    fn change_track(&mut self, track: &Track) -> bool {
        self.record(format!(
            "change_track:{}",
            track.uri.as_deref().unwrap_or_default()
        ));
        if self.accept_changes {
            self.position_ms = 0;
            self.state = PlaybackState::Playing;
        }
        self.accept_changes
    }

    fn resume(&mut self) -> bool {
        self.record("resume".to_string());
        self.state = PlaybackState::Playing;
        true
    }

    fn pause(&mut self) -> bool {
        self.record("pause".to_string());
        self.state = PlaybackState::Paused;
        true
    }

    fn time_position(&self) -> u64 {
        self.position_ms
    }

    fn prepare_next_track(&mut self) {
        self.record("prepare_next_track".to_string());
    }
}
