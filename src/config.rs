use serde::Deserialize;

/// Which handler implementation the binary serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    #[default]
    Default,
    Proxy,
    Video,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub handler: HandlerKind,
    #[serde(default = "default_proxy_base")]
    pub proxy_base: String,
    #[serde(default = "default_video_path")]
    pub video_path: String,
}

fn default_port() -> u16 {
    8080
}

fn default_proxy_base() -> String {
    "http://httpbin.org/".to_string()
}

fn default_video_path() -> String {
    "assets/video.mp4".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            handler: HandlerKind::default(),
            proxy_base: default_proxy_base(),
            video_path: default_video_path(),
        }
    }
}

impl Config {
    /// Loads the YAML file named by the `CONFIG` env var (default
    /// `config.yaml`); a missing or invalid file falls back to defaults.
    pub fn load() -> Self {
        let path = std::env::var("CONFIG").unwrap_or_else(|_| "config.yaml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_yaml::from_str(&raw) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(%path, error = %e, "invalid config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
