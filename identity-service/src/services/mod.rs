//! Services layer.
//!
//! Identity resolution and mutation, one-time verification codes,
//! recovery by alternate keys, and the collaborators (store, mail) they
//! depend on.

mod challenge;
mod database;
mod email;
pub mod error;
mod identity;
mod recovery;

pub use challenge::ChallengeService;
pub use database::Database;
pub use email::{EmailProvider, EmailService, MockEmailService};
pub use error::ServiceError;
pub use identity::{handle_suggestions, HandleAvailability, IdentityService, ProfileField};
pub use recovery::RecoveryService;
