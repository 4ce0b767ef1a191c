/// Core error type.
///
/// Adapter crates map their specific failures into this type; the driver loop
/// decides what to do with a failure from its [`ErrorKind`] alone.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected HTTP status {status} from {endpoint}")]
    Protocol { endpoint: String, status: u16 },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("malformed API response: {0}")]
    Shape(#[from] ShapeError),

    #[error("bad homework record: {0}")]
    Status(#[from] StatusError),

    #[error("notify error: {0}")]
    Notify(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Ways the API payload can fail validation, in the order they are checked.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("response payload is empty")]
    EmptyPayload,

    #[error("response has wrong type: expected object, got {0}")]
    WrongType(&'static str),

    #[error("response has no `homeworks` key")]
    MissingKey,

    #[error("`homeworks` has wrong format: expected array, got {0}")]
    WrongFormat(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("unknown homework status: {}", .0.as_deref().unwrap_or("<absent>"))]
    UnknownStatus(Option<String>),

    #[error("homework record has no `homework_name`")]
    MissingHomeworkName,
}

/// Closed classification of [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Transport,
    Protocol,
    Decode,
    Shape,
    Status,
    Notify,
    Io,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Protocol { .. } => ErrorKind::Protocol,
            Error::Decode(_) => ErrorKind::Decode,
            Error::Shape(_) => ErrorKind::Shape,
            Error::Status(_) => ErrorKind::Status,
            Error::Notify(_) => ErrorKind::Notify,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether this failure must stop the process instead of the current cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Config | ErrorKind::Io)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
