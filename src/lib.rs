pub mod app;
pub mod domain;
pub mod integrations;
pub mod playback;
pub mod storage;
