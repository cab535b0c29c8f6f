pub mod account;
pub mod bulletin;
pub mod challenge;
pub mod member;
pub mod publication;

pub use account::{Account, AccountState};
pub use bulletin::SecurityBulletin;
pub use challenge::{Challenge, ChallengePurpose};
pub use member::{
    AccessSummary, BroadcastRecipient, MemberContact, MemberProfile, MemberState, ProfileResponse,
};
pub use publication::Publication;
