use service_core::error::AppError;
use thiserror::Error;

/// Service-layer outcomes that are not successes.
///
/// Resolution and verification misses are expected results, not faults;
/// only storage unavailability is treated as exceptional.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The member-tier write landed but the account mirror did not. The
    /// primary write is not rolled back; the tiers converge on the next
    /// successful mirrored write.
    #[error("Account mirror write failed: {0}")]
    MirrorWrite(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Handle already taken")]
    HandleTaken,

    #[error("Member not found")]
    MemberNotFound,

    #[error("Verification code not found or already used")]
    ChallengeNotFound,

    #[error("Verification code expired")]
    ChallengeExpired,

    #[error("Email error: {0}")]
    Email(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::anyhow!(e)),
            ServiceError::MirrorWrite(e) => {
                AppError::DatabaseError(anyhow::anyhow!("account mirror write failed: {}", e))
            }
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::InvalidCredentials => {
                AppError::AuthError(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::HandleTaken => AppError::Conflict(anyhow::anyhow!("Handle already taken")),
            ServiceError::MemberNotFound => AppError::NotFound(anyhow::anyhow!("Member not found")),
            ServiceError::ChallengeNotFound => {
                AppError::NotFound(anyhow::anyhow!("Verification code not found or already used"))
            }
            ServiceError::ChallengeExpired => {
                AppError::Gone(anyhow::anyhow!("Verification code expired"))
            }
            ServiceError::Email(e) => AppError::EmailError(e),
        }
    }
}
