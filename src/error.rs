use std::fmt;
use std::io::Error as IoError;

// failures that keep the server from coming up at all
#[derive(Debug)]
#[non_exhaustive]
pub enum ServerError {
    /// The fixed port could not be bound (already in use, permission denied).
    Bind(IoError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Bind(e) => write!(f, "failed to bind listener: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Bind(e) => Some(e),
        }
    }
}

// failures of one upload session; never fatal to the listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    /// No `boundary=` token was found in the request headers.
    MissingBoundary,
    /// No `filename="..."` appeared anywhere in the received bytes.
    MissingFilename,
    /// The part body or its terminating boundary marker could not be located.
    MissingTerminator,
    /// The file content was not valid UTF-8.
    UnsupportedEncoding,
}

impl ParseError {
    // human-readable message, shown on the error page and in progress frames
    pub fn message(&self) -> &'static str {
        match self {
            ParseError::MissingBoundary => "request is missing a multipart boundary",
            ParseError::MissingFilename => "no filename found in the upload",
            ParseError::MissingTerminator => "upload ended before the closing boundary",
            ParseError::UnsupportedEncoding => "file is not valid UTF-8 text",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ParseError {}
