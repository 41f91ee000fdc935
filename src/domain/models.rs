use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Track {
    pub uri: Option<String>,
    pub name: String,
}

impl Track {
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uri: Some(uri.into()),
            name: name.into(),
        }
    }

    pub fn without_uri(name: impl Into<String>) -> Self {
        Self {
            uri: None,
            name: name.into(),
        }
    }

    pub fn playable_uri(&self) -> Option<&str> {
        self.uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PandoraTrack {
    pub uri: String,
    pub audio_url: String,
}
