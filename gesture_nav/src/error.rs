//! Error type shared by the session drivers, sources, config and window.

use std::error::Error as StdError;

#[derive(Debug)]
pub enum Error {
    /// Reading a recording or config file, or writing a recording.
    Io(std::io::Error),
    /// Encoding a recorded landmark line.
    Json(serde_json::Error),
    /// Parsing the TOML config.
    Config(toml::de::Error),
    /// Opening or updating the overlay window.
    Window(String),
    /// A caller-supplied value outside its valid range.
    InvalidArgument(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err)     => write!(f, "io error: {}", err),
            Error::Json(err)   => write!(f, "landmark record error: {}", err),
            Error::Config(err) => write!(f, "configuration error: {}", err),
            Error::Window(msg) => write!(f, "window error: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Io(err)     => Some(err),
            Error::Json(err)   => Some(err),
            Error::Config(err) => Some(err),
            Error::Window(_) | Error::InvalidArgument(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<toml::de::Error> for Error {
    fn from(value: toml::de::Error) -> Self {
        Self::Config(value)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
