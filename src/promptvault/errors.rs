use std::fmt;
use std::convert::From;
use std::error::Error as StdError;
use std::io::Error as IoError;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug)]
pub enum ErrorKind {
    /// persisted data could not be read or parsed
    LoadFailure,
    /// write-back of the profile store failed
    SaveFailure,
    EmptyName,
    DuplicateName,
    /// a prompt was submitted without a category or without instructions
    EmptySubmission,
    NoProfile,
    NotFound,
    Export,
    Json(serde_json::Error),
    InternalIo(IoError),
    Generic,
}

#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub desc: String,
    pub detail: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, desc: &str) -> Error {
        Error {
            kind: kind,
            desc: desc.to_string(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: String) -> Error {
        self.detail = Some(detail);
        self
    }

    pub fn load_failure(detail: String) -> Error {
        Error::new(ErrorKind::LoadFailure, "Could not load your profile data.").with_detail(detail)
    }

    pub fn save_failure(detail: String) -> Error {
        Error::new(ErrorKind::SaveFailure, "Could not save your profile data.").with_detail(detail)
    }

    pub fn is_load_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::LoadFailure)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.detail {
            Some(ref d) => write!(f, "{} ({})", &self.desc, d),
            None => write!(f, "{}", &self.desc),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self.kind {
            ErrorKind::InternalIo(ref e) => Some(e),
            ErrorKind::Json(ref e) => Some(e),
            _ => None,
        }
    }
}

#[macro_export]
macro_rules! specific_fail {
    ($short:expr) => {{
        use $crate::errors::{Error, ErrorKind};
        Err(::std::convert::From::from(
            Error {
                kind: ErrorKind::Generic,
                desc: $short,
                detail: None
            }
        ))
    }}
}

#[macro_export]
macro_rules! specific_fail_str {
    ($s:expr) => {
        $crate::specific_fail!($s.to_string())
    }
}

impl From<IoError> for Error {
    fn from(err: IoError) -> Error {
        Error {
            desc: err.to_string(),
            kind: ErrorKind::InternalIo(err),
            detail: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error {
            desc: format!("JSON error: {}", err),
            kind: ErrorKind::Json(err),
            detail: None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: format!("YAML error: {}", err),
            detail: None,
        }
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: format!("Base64 decode error: {}", err),
            detail: None,
        }
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: format!("regex error: {}", err),
            detail: None,
        }
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: "formatting error".to_string(),
            detail: None,
        }
    }
}

impl From<String> for Error {
    fn from(err: String) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: err,
            detail: None,
        }
    }
}

impl From<&str> for Error {
    fn from(err: &str) -> Error {
        Error {
            kind: ErrorKind::Generic,
            desc: err.to_string(),
            detail: None,
        }
    }
}
