//! Error types
use serde_json;
use std::{convert::From, error, fmt, result};

#[derive(Debug)]
pub enum Error {
    /// Bad credentials, or an expired session the cloud would not renew.
    Auth(String),
    /// Transport failure talking to a cloud endpoint.
    Network(reqwest::Error),
    /// The endpoint answered with something other than the expected shape.
    Protocol(String),
    /// No device matched the requested alias or device id.
    NotFound(String),
    /// More than one device matched the requested alias.
    Ambiguous(String),
    /// The cloud or the device itself rejected the command.
    Device(CloudError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Auth(msg) => f.write_str(&format!("Authentication failed: {}", msg)),
            Error::Network(_) => f.write_str("Error connecting to the cloud endpoint"),
            Error::Protocol(msg) => {
                f.write_str(&format!("Unexpected response from the cloud: {}", msg))
            }
            Error::NotFound(msg) => f.write_str(msg),
            Error::Ambiguous(msg) => f.write_str(msg),
            Error::Device(err) => f.write_str(&format!(
                "Command rejected: ({}) {}",
                err.error_code, err.msg
            )),
        }
    }
}

impl error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Error::Protocol(error.to_string())
        } else {
            Error::Network(error)
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Protocol(error.to_string())
    }
}

impl From<CloudError> for Error {
    fn from(error: CloudError) -> Self {
        Error::Device(error)
    }
}

pub type Result<T> = result::Result<T, Error>;

/// The `error_code`/`msg` pair the cloud wraps every failure in.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CloudError {
    pub error_code: i32,
    pub msg: String,
}

impl fmt::Display for CloudError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&format!("{}: {}", self.error_code, self.msg))
    }
}

impl error::Error for CloudError {}
