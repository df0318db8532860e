use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration loaded from `config.yaml` with environment overrides.
///
/// Sections:
/// - `server`: listen address and the SO_LINGER hint applied to accepted
///   sockets
/// - `static_files`: document root and index file name for static serving
///
/// The `LISTEN` environment variable overrides `server.listen_addr`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticFilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Seconds to linger on close; `null` disables SO_LINGER.
    pub linger_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaticFilesConfig {
    pub root: PathBuf,
    /// File served when a request URI ends with `/`.
    pub index: String,
}

impl Config {
    /// Loads configuration from `config.yaml` in the working directory,
    /// falling back to defaults if the file is absent or malformed.
    pub fn load() -> Self {
        match Self::load_from_file("config.yaml") {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::debug!("No usable config.yaml ({}), using defaults", e);
                Self::load_defaults()
            }
        }
    }

    /// Loads configuration from the given YAML file, layered over the
    /// built-in defaults. The `LISTEN` environment variable wins over both.
    pub fn load_from_file(path: &str) -> anyhow::Result<Self> {
        let settings = Self::builder()
            .add_source(config::File::new(path, config::FileFormat::Yaml))
            .build()?;
        let mut cfg: Config = settings.try_deserialize()?;
        cfg.apply_env();
        Ok(cfg)
    }

    fn load_defaults() -> Self {
        let settings = Self::builder()
            .build()
            .expect("default configuration is well-formed");
        let mut cfg: Config = settings
            .try_deserialize()
            .expect("default configuration deserialises");
        cfg.apply_env();
        cfg
    }

    fn builder() -> config::builder::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder()
            .set_default("server.listen_addr", "127.0.0.1:8080")
            .expect("valid default")
            .set_default("server.linger_secs", 1i64)
            .expect("valid default")
            .set_default("static_files.root", "public")
            .expect("valid default")
            .set_default("static_files.index", "index.html")
            .expect("valid default")
    }

    fn apply_env(&mut self) {
        if let Ok(addr) = std::env::var("LISTEN") {
            self.server.listen_addr = addr;
        }
    }
}
