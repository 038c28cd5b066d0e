//! Loading of the server credentials and of the calendar to work on
//!
//! They are read from an INI file (`config.ini` in the current directory by default):
//! ```ini
//! [caldav]
//! url = https://my.server.com/remote.php/dav
//! username = john
//! password = secret_password
//! calendar_name = Personal
//! ```

use std::fmt::{Debug, Formatter};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// The file [`load_config`] reads, relative to the current working directory
pub const CONFIG_FILE: &str = "config.ini";

/// Why a configuration could not be loaded.
///
/// Callers that only care whether the app is configured can treat every variant the same way.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("configuration file {0:?} not found")]
    NotFound(PathBuf),
    #[error("unable to read configuration file {path:?}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("missing [caldav] section")]
    MissingSection,
    #[error("missing key `{0}` in the [caldav] section")]
    MissingKey(&'static str),
    #[error("{0} is required")]
    EmptyField(&'static str),
}


/// Everything needed to reach the tasks of a calendar
#[derive(Clone, PartialEq)]
pub struct Configuration {
    pub server_url: String,
    pub username: String,
    pub password: String,
    /// The display name of the calendar to work on
    pub calendar_name: String,
}

impl Configuration {
    /// Build a configuration from user input (e.g. form fields).
    /// Every field is required to be non-empty.
    pub fn from_fields<S: Into<String>>(server_url: S, username: S, password: S, calendar_name: S) -> Result<Self, ConfigError> {
        let config = Self {
            server_url: server_url.into(),
            username: username.into(),
            password: password.into(),
            calendar_name: calendar_name.into(),
        };

        let fields = [
            ("url", &config.server_url),
            ("username", &config.username),
            ("password", &config.password),
            ("calendar_name", &config.calendar_name),
        ];
        for (name, value) in fields.iter() {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField(*name));
            }
        }
        Ok(config)
    }
}

impl Debug for Configuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Configuration")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("calendar_name", &self.calendar_name)
            .finish()
    }
}


#[derive(Deserialize)]
struct ConfigFile {
    caldav: Option<CalDavSection>,
}

#[derive(Deserialize)]
struct CalDavSection {
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    calendar_name: Option<String>,
}

/// An INI source whose values are taken as written: no escape sequence, no quote removal.
///
/// `config::FileFormat::Ini` would turn e.g. `\n` in a password into an actual newline.
struct VerbatimIni {
    content: String,
    origin: String,
}

impl VerbatimIni {
    fn new(content: String, path: &Path) -> Self {
        Self { content, origin: path.display().to_string() }
    }
}

impl Debug for VerbatimIni {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerbatimIni")
            .field("origin", &self.origin)
            .finish()
    }
}

impl config::Source for VerbatimIni {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new(Self { content: self.content.clone(), origin: self.origin.clone() })
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let options = ini::ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ini::ParseOption::default()
        };
        let ini = ini::Ini::load_from_str_opt(&self.content, options)
            .map_err(|err| config::ConfigError::Foreign(Box::new(err)))?;

        let origin = Some(&self.origin);
        let mut root = config::Map::new();
        for (section, properties) in ini.iter() {
            let mut table = config::Map::new();
            for (key, value) in properties.iter() {
                table.insert(key.to_lowercase(), config::Value::new(origin, value));
            }
            match section {
                None => root.extend(table),
                Some(name) => {
                    root.insert(name.to_lowercase(), config::Value::new(origin, config::ValueKind::Table(table)));
                },
            }
        }
        Ok(root)
    }
}

/// Load the configuration from [`CONFIG_FILE`]
pub fn load_config() -> Result<Configuration, ConfigError> {
    load_config_from(Path::new(CONFIG_FILE))
}

/// Load the configuration from an INI file.
///
/// The `[caldav]` section must contain `url`, `username`, `password` and `calendar_name`. There is no default value.
pub fn load_config_from(path: &Path) -> Result<Configuration, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        },
        Err(err) => {
            return Err(ConfigError::Unreadable { path: path.to_path_buf(), reason: err.to_string() });
        },
        Ok(content) => content,
    };

    let unreadable = |err: config::ConfigError| ConfigError::Unreadable { path: path.to_path_buf(), reason: err.to_string() };
    let file: ConfigFile = config::Config::builder()
        .add_source(VerbatimIni::new(content, path))
        .build()
        .map_err(unreadable)?
        .try_deserialize()
        .map_err(unreadable)?;

    let section = file.caldav.ok_or(ConfigError::MissingSection)?;
    let config = Configuration {
        server_url: section.url.ok_or(ConfigError::MissingKey("url"))?,
        username: section.username.ok_or(ConfigError::MissingKey("username"))?,
        password: section.password.ok_or(ConfigError::MissingKey("password"))?,
        calendar_name: section.calendar_name.ok_or(ConfigError::MissingKey("calendar_name"))?,
    };
    log::debug!("Loaded configuration from {:?}: {:?}", path, config);
    Ok(config)
}
