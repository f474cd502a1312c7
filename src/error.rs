use std::{error, fmt, result};

use quick_xml::Error as XmlError;
use reqwest::Error as HttpError;

#[derive(Debug)]
pub enum ErrorKind {
    /// The given email address could not be parsed.
    InvalidEmailAddress,
    /// No password was given for the mailbox.
    MissingCredentials,
    /// An error from the http client.
    Http(HttpError),
    /// A redirect probe answered with something other than `302 Found`.
    UnexpectedStatus(u16),
    /// The server responded with some unexpected data.
    UnexpectedBehavior,
    /// Every autodiscover endpoint was tried and none of them succeeded.
    AllEndpointsFailed(Vec<Error>),
    /// The winning response body was not well formed xml.
    Parse(XmlError),
    /// The winning response parsed but did not have the expected user
    /// settings shape.
    MalformedResponse,
    #[cfg(feature = "json")]
    /// Failed to serialize the given data to JSON.
    SerializeJSON,
}

#[derive(Debug)]
pub struct Error {
    message: String,
    kind: ErrorKind,
}

impl Error {
    pub fn new<M: Into<String>>(kind: ErrorKind, message: M) -> Self {
        Self {
            message: message.into(),
            kind,
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.kind() {
            ErrorKind::Http(e) => Some(e),
            ErrorKind::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<HttpError> for Error {
    fn from(http_error: HttpError) -> Self {
        Error::new(ErrorKind::Http(http_error), "Error from the http client")
    }
}

impl From<XmlError> for Error {
    fn from(xml_error: XmlError) -> Self {
        Error::new(ErrorKind::Parse(xml_error), "Failed to parse response xml")
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[macro_export]
macro_rules! failed {
    ($kind:expr, $($arg:tt)*) => {{
		use crate::error::Error;

        let kind = $kind;
        let message = format!($($arg)*);
        return Err(Error::new( kind, message ));
    }};
}

pub type Result<T> = result::Result<T, Error>;
