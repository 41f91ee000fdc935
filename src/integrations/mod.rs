pub mod playback;
pub mod track_lookup;
