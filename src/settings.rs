use serde::{Deserialize, Serialize};

/// Persisted picker preferences.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub fullscreen: bool,
}

impl Settings {
    pub fn toggled_fullscreen(self) -> Self {
        Self {
            fullscreen: !self.fullscreen,
        }
    }
}
