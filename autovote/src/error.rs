use snafu::{Backtrace, Snafu};
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Unable to write token file {:?}: {}", path, source))]
    TokenFileWrite {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Unable to serialize tokens: {}", source))]
    TokenSerialize {
        source: serde_json::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Unable to write log file {:?}: {}", path, source))]
    LogWrite {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Unable to read log file {:?}: {}", path, source))]
    LogRead {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Unable to build HTTP client: {}", source))]
    HttpClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    #[snafu(display("Invalid schedule time: {}", msg))]
    InvalidSchedule { msg: String },

    #[snafu(display("{}", msg))]
    Validation { msg: String },

    #[snafu(display("Token index {} is out of range, {} tokens stored", index, len))]
    IndexOutOfRange { index: usize, len: usize },

    #[snafu(display("A batch run is already in progress"))]
    RunInProgress,

    #[snafu(display("{}", msg))]
    Whatever { msg: String },
}

// Allow string slices to be converted to Error
impl From<&str> for Error {
    fn from(val: &str) -> Self {
        Self::Whatever {
            msg: val.to_string(),
        }
    }
}

impl From<String> for Error {
    fn from(val: String) -> Self {
        Self::Whatever { msg: val }
    }
}
