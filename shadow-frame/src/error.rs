//! The error type of the crate.

/// An error raised while attaching or wiring a shadow container.
#[derive(Debug)]
pub enum Error {
    /// The requested mode is neither `open` nor `closed`.
    InvalidMode(String),
    /// The embedded surface cannot be created or read.
    SurfaceUnavailable(String),
    /// An open shadow container is already exposed on the host element.
    ShadowRootExists,
    /// A backend operation failed.
    BackendError {
        msg: String,
        err: Option<Box<dyn std::error::Error>>,
    },
}

impl Error {
    pub(crate) fn backend(msg: impl Into<String>) -> Self {
        Self::BackendError {
            msg: msg.into(),
            err: None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidMode(mode) => {
                write!(f, "Invalid shadow root mode {:?}", mode)?;
            }
            Error::SurfaceUnavailable(msg) => {
                write!(f, "The embedded surface is unavailable: {}", msg)?;
            }
            Error::ShadowRootExists => {
                write!(f, "The host element already has an open shadow root")?;
            }
            Error::BackendError { msg, err } => {
                if let Some(err) = err {
                    write!(f, "{}: {}", msg, err)?;
                } else {
                    write!(f, "{}", msg)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::BackendError { err: Some(err), .. } => Some(err.as_ref()),
            _ => None,
        }
    }
}
