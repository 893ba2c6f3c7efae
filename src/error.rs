#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid state for '{entity}': {reason}")]
    InvalidState { entity: String, reason: &'static str },
    #[error("identity '{id}' is already in use")]
    InvalidIdentity { id: String },
    #[error("failed to render scene")]
    Render(#[from] std::fmt::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidState,
    InvalidIdentity,
    Render,
}

impl Error {
    pub fn invalid_state(entity: impl ToString, reason: &'static str) -> Self {
        Error::InvalidState {
            entity: entity.to_string(),
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidState { .. } => ErrorKind::InvalidState,
            Error::InvalidIdentity { .. } => ErrorKind::InvalidIdentity,
            Error::Render(_) => ErrorKind::Render,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
