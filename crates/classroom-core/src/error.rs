//! Shared error type across classroom crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed frame.
    BadRequest,
    /// Known event with a payload that does not match its schema.
    InvalidPayload,
    /// Rate limited.
    RateLimited,
    /// Payload too large.
    PayloadTooLarge,
    /// Not allowed by policy.
    NotAllowed,
    /// Unsupported config or protocol version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::InvalidPayload => "INVALID_PAYLOAD",
            ClientCode::RateLimited => "RATE_LIMITED",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::NotAllowed => "NOT_ALLOWED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ClassroomError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum ClassroomError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("rate limited")]
    RateLimited,
    #[error("payload too large")]
    PayloadTooLarge,
    #[error("not allowed: {0}")]
    NotAllowed(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ClassroomError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ClassroomError::BadRequest(_) => ClientCode::BadRequest,
            ClassroomError::InvalidPayload(_) => ClientCode::InvalidPayload,
            ClassroomError::RateLimited => ClientCode::RateLimited,
            ClassroomError::PayloadTooLarge => ClientCode::PayloadTooLarge,
            ClassroomError::NotAllowed(_) => ClientCode::NotAllowed,
            ClassroomError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            ClassroomError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Errors a session reports back to the sender and then keeps going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ClassroomError::BadRequest(_)
                | ClassroomError::InvalidPayload(_)
                | ClassroomError::NotAllowed(_)
                | ClassroomError::RateLimited
        )
    }
}
