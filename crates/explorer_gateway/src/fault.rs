use thiserror::Error;

/// Fault taxonomy for everything that can go wrong talking to the platform.
/// Callers always receive one of these as a tagged value; the gateway never
/// lets an error unwind past its boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Network-level failure: connect, DNS, timeout, broken transfer.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The platform answered outside the 2xx range.
    #[error("http status {status}")]
    Http { status: u16 },
    /// The platform answered 2xx but reported a structured error, or the
    /// payload did not decode into the expected shape.
    #[error("endpoint fault: {0}")]
    Application(String),
    /// No authenticated session.
    #[error("user not authenticated")]
    Unauthenticated,
    /// Authenticated, but the console capability is missing.
    #[error("access denied: {reason}")]
    AccessDenied { reason: String },
}

impl Fault {
    /// Short tag used when a fault is stored as a structured response.
    pub fn kind(&self) -> &'static str {
        match self {
            Fault::Transport(_) => "NetworkError",
            Fault::Http { .. } => "HttpError",
            Fault::Application(_) => "ApplicationError",
            Fault::Unauthenticated => "AuthenticationError",
            Fault::AccessDenied { .. } => "AuthorizationError",
        }
    }
}
