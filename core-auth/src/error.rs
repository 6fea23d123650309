use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// The user declined an interactive authorization prompt.
    #[error("Authorization consent declined")]
    ConsentDeclined,

    #[error("Token acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, AuthError>;
