//! Server configuration.

use std::path::PathBuf;

/// Default port of the display board.
pub const DEFAULT_DISPLAY_PORT: u16 = 4000;

/// Default port of the lookup application.
pub const DEFAULT_LOOKUP_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for paths no route handles.
    pub public_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            public_dir: None,
        }
    }

    pub fn with_public_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.public_dir = dir;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", DEFAULT_DISPLAY_PORT)
    }
}
