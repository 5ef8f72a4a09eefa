//! # Configuration
//!
//! Settings resolve in layers: defaults → config file → environment → CLI
//! flags. The environment and CLI layers arrive together as [`Overrides`]
//! (clap reads `TERMFOLIO_*` variables for any flag not given on the
//! command line).
//!
//! Every field of the TOML file is optional:
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! ws_port = 8080
//! tcp_port = 23234        # 0 disables the raw terminal listener
//! ws_path = "/ws"
//! allowed_origins = []    # empty allows every origin
//!
//! [session]
//! render_interval_ms = 500
//! read_deadline_ms = 5000
//! queue_capacity = 256
//! enqueue_wait_ms = 100
//! cols = 80               # starting size for raw terminal clients
//! rows = 24
//!
//! [ui]
//! theme = "cyberpunk"     # or "plain"
//!
//! [log]
//! level = "info"
//! file = "termfolio.log"  # omit to log to stderr
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use simplelog::LevelFilter;
use termfolio_core::{Geometry, SessionOptions};

use crate::theme::Palette;

// ============================================================================
// File layout (all fields optional)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub session: SessionSection,
    #[serde(default)]
    pub ui: UiSection,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub ws_port: Option<u16>,
    pub tcp_port: Option<u16>,
    pub ws_path: Option<String>,
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    pub render_interval_ms: Option<u64>,
    pub read_deadline_ms: Option<u64>,
    pub queue_capacity: Option<usize>,
    pub enqueue_wait_ms: Option<u64>,
    pub cols: Option<u16>,
    pub rows: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiSection {
    pub theme: Option<Palette>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

/// Values from the environment and command line. `None` = not given.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub ws_port: Option<u16>,
    pub tcp_port: Option<u16>,
    pub theme: Option<Palette>,
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_CONFIG_FILE: &str = "termfolio.toml";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_WS_PORT: u16 = 8080;
pub const DEFAULT_TCP_PORT: u16 = 23234;
pub const DEFAULT_WS_PATH: &str = "/ws";

// ============================================================================
// Resolved settings
// ============================================================================

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub ws_port: u16,
    /// `None` when the raw terminal listener is disabled.
    pub tcp_port: Option<u16>,
    pub ws_path: String,
    pub allowed_origins: Vec<String>,
    /// Options for web-socket sessions, which start at the fallback size.
    pub session: SessionOptions,
    /// Starting size for raw terminal sessions.
    pub tcp_geometry: Geometry,
    pub palette: Palette,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Session options for a raw terminal client.
    pub fn tcp_session(&self) -> SessionOptions {
        SessionOptions {
            geometry: self.tcp_geometry,
            ..self.session.clone()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Loading
// ============================================================================

/// Where the file layer came from. Loading runs before the logger exists,
/// so the caller reports this once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    File(PathBuf),
    Missing(PathBuf),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::File(path) => write!(f, "loaded config from {}", path.display()),
            Origin::Missing(path) => {
                write!(f, "no config file at {}, using defaults", path.display())
            }
        }
    }
}

/// Load the config file at `path`. A missing file yields the defaults.
pub fn load(path: &Path) -> Result<(FileConfig, Origin), ConfigError> {
    if !path.exists() {
        return Ok((FileConfig::default(), Origin::Missing(path.to_path_buf())));
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&contents)?;
    Ok((config, Origin::File(path.to_path_buf())))
}

/// Parse config file contents.
pub fn parse(contents: &str) -> Result<FileConfig, ConfigError> {
    Ok(toml::from_str(contents)?)
}

// ============================================================================
// Resolution
// ============================================================================

/// Collapse the layers into concrete settings.
pub fn resolve(file: &FileConfig, overrides: &Overrides) -> Result<Settings, ConfigError> {
    let defaults = SessionOptions::default();
    let session_section = &file.session;

    let queue_capacity = session_section
        .queue_capacity
        .unwrap_or(defaults.queue_capacity);
    if queue_capacity == 0 {
        return Err(ConfigError::Invalid {
            key: "session.queue_capacity",
            reason: "must be at least 1".to_string(),
        });
    }

    let ws_path = file
        .server
        .ws_path
        .clone()
        .unwrap_or_else(|| DEFAULT_WS_PATH.to_string());
    if !ws_path.starts_with('/') {
        return Err(ConfigError::Invalid {
            key: "server.ws_path",
            reason: format!("{ws_path:?} must start with '/'"),
        });
    }

    let level = overrides
        .log_level
        .clone()
        .or_else(|| file.log.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let log_level = LevelFilter::from_str(&level).map_err(|_| ConfigError::Invalid {
        key: "log.level",
        reason: format!("unknown level {level:?}"),
    })?;

    let millis = |value: Option<u64>, default: Duration| {
        value.map(Duration::from_millis).unwrap_or(default)
    };
    let session = SessionOptions {
        render_interval: millis(session_section.render_interval_ms, defaults.render_interval),
        read_deadline: millis(session_section.read_deadline_ms, defaults.read_deadline),
        enqueue_wait: millis(session_section.enqueue_wait_ms, defaults.enqueue_wait),
        queue_capacity,
        ..defaults
    };
    if session.render_interval.is_zero() || session.read_deadline.is_zero() {
        return Err(ConfigError::Invalid {
            key: "session",
            reason: "render_interval_ms and read_deadline_ms must be positive".to_string(),
        });
    }
    let tcp_geometry = Geometry::new(
        session_section.cols.unwrap_or(Geometry::FALLBACK.cols()),
        session_section.rows.unwrap_or(Geometry::FALLBACK.rows()),
    );

    // Port 0 disables the raw terminal listener.
    let tcp_port = overrides
        .tcp_port
        .or(file.server.tcp_port)
        .unwrap_or(DEFAULT_TCP_PORT);

    Ok(Settings {
        host: overrides
            .host
            .clone()
            .or_else(|| file.server.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        ws_port: overrides
            .ws_port
            .or(file.server.ws_port)
            .unwrap_or(DEFAULT_WS_PORT),
        tcp_port: (tcp_port != 0).then_some(tcp_port),
        ws_path,
        allowed_origins: file.server.allowed_origins.clone().unwrap_or_default(),
        session,
        tcp_geometry,
        palette: overrides.theme.or(file.ui.theme).unwrap_or_default(),
        log_level,
        log_file: overrides.log_file.clone().or_else(|| file.log.file.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_resolves_to_defaults() {
        let settings = resolve(&parse("").unwrap(), &Overrides::default()).unwrap();
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.ws_port, 8080);
        assert_eq!(settings.tcp_port, Some(23234));
        assert_eq!(settings.ws_path, "/ws");
        assert!(settings.allowed_origins.is_empty());
        assert_eq!(settings.session.render_interval, Duration::from_millis(500));
        assert_eq!(settings.session.queue_capacity, 256);
        assert_eq!(settings.session.geometry, Geometry::FALLBACK);
        assert_eq!(settings.tcp_geometry, Geometry::FALLBACK);
        assert_eq!(settings.palette, Palette::Cyberpunk);
        assert_eq!(settings.log_level, LevelFilter::Info);
        assert_eq!(settings.log_file, None);
    }

    #[test]
    fn file_values_override_defaults() {
        let file = parse(
            r#"
            [server]
            host = "127.0.0.1"
            ws_port = 9000
            tcp_port = 0
            allowed_origins = ["https://genar.me"]

            [session]
            render_interval_ms = 250
            queue_capacity = 8
            cols = 120
            rows = 50

            [ui]
            theme = "plain"

            [log]
            level = "debug"
            file = "server.log"
            "#,
        )
        .unwrap();
        let settings = resolve(&file, &Overrides::default()).unwrap();
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.ws_port, 9000);
        assert_eq!(settings.tcp_port, None);
        assert_eq!(settings.allowed_origins, vec!["https://genar.me"]);
        assert_eq!(settings.session.render_interval, Duration::from_millis(250));
        assert_eq!(settings.session.queue_capacity, 8);
        assert_eq!(settings.tcp_session().geometry, Geometry::new(120, 50));
        assert_eq!(settings.session.geometry, Geometry::FALLBACK);
        assert_eq!(settings.palette, Palette::Plain);
        assert_eq!(settings.log_level, LevelFilter::Debug);
        assert_eq!(settings.log_file, Some(PathBuf::from("server.log")));
    }

    #[test]
    fn overrides_win_over_the_file() {
        let file = parse("[server]\nws_port = 9000\n[ui]\ntheme = \"plain\"\n").unwrap();
        let overrides = Overrides {
            ws_port: Some(7000),
            theme: Some(Palette::Cyberpunk),
            log_level: Some("warn".to_string()),
            ..Overrides::default()
        };
        let settings = resolve(&file, &overrides).unwrap();
        assert_eq!(settings.ws_port, 7000);
        assert_eq!(settings.palette, Palette::Cyberpunk);
        assert_eq!(settings.log_level, LevelFilter::Warn);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(parse("[server\nhost ="), Err(ConfigError::Parse(_))));
        assert!(matches!(
            parse("[server]\nport = 1\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let zero_queue = parse("[session]\nqueue_capacity = 0\n").unwrap();
        assert!(matches!(
            resolve(&zero_queue, &Overrides::default()),
            Err(ConfigError::Invalid { key: "session.queue_capacity", .. })
        ));

        let bad_level = Overrides {
            log_level: Some("loud".to_string()),
            ..Overrides::default()
        };
        assert!(matches!(
            resolve(&FileConfig::default(), &bad_level),
            Err(ConfigError::Invalid { key: "log.level", .. })
        ));

        let bad_path = parse("[server]\nws_path = \"ws\"\n").unwrap();
        assert!(resolve(&bad_path, &Overrides::default()).is_err());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let path = Path::new("/nonexistent/termfolio.toml");
        let (config, origin) = load(path).unwrap();
        assert!(config.server.host.is_none());
        assert_eq!(origin, Origin::Missing(path.to_path_buf()));
        assert_eq!(
            origin.to_string(),
            "no config file at /nonexistent/termfolio.toml, using defaults"
        );
    }

    #[test]
    fn existing_file_is_read_and_reported() {
        let path = std::env::temp_dir().join(format!("termfolio-{}.toml", std::process::id()));
        std::fs::write(&path, "[server]\nws_port = 9000\n").unwrap();
        let loaded = load(&path);
        std::fs::remove_file(&path).unwrap();

        let (config, origin) = loaded.unwrap();
        assert_eq!(config.server.ws_port, Some(9000));
        assert_eq!(origin, Origin::File(path.clone()));
        assert!(origin.to_string().starts_with("loaded config from "));
    }
}
