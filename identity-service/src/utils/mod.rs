pub mod contact;
pub mod secret;

pub use contact::{contact_suffix, normalize_contact};
pub use secret::{hash_secret, StoredSecret};
