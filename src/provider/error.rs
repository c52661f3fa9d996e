use std::convert::From;
use std::error;
use std::fmt;
use std::io;
use std::result;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ErrorKind {
    StateParse,
    StateWrite,
    ConfigParse,
    ConfigMissing,
    IOError(io::Error),
}

impl Error {
    pub fn new(kind: ErrorKind, msg: &str) -> Self {
        Error {
            kind,
            message: Some(msg.to_owned()),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(io_error: io::Error) -> Error {
        Error::from(ErrorKind::IOError(io_error))
    }
}

impl From<serde_json::Error> for Error {
    fn from(json_error: serde_json::Error) -> Error {
        Error::new(
            ErrorKind::StateParse,
            format!("Could not parse calendar state: {}", json_error).as_str(),
        )
    }
}

impl From<toml::de::Error> for Error {
    fn from(toml_error: toml::de::Error) -> Error {
        Error::new(
            ErrorKind::ConfigParse,
            format!("Could not parse config: {}", toml_error).as_str(),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.kind.as_str(), msg),
            None => write!(f, "{}", self.kind.as_str()),
        }
    }
}

impl error::Error for Error {}

impl ErrorKind {
    pub fn as_str(&self) -> String {
        match self {
            ErrorKind::StateParse => "invalid calendar state".to_owned(),
            ErrorKind::StateWrite => "could not write calendar state".to_owned(),
            ErrorKind::ConfigParse => "invalid config format".to_owned(),
            ErrorKind::ConfigMissing => "config file not found".to_owned(),
            ErrorKind::IOError(err) => err.to_string(),
        }
    }
}
