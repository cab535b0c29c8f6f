//! Identity recovery by alternate keys, for members who forgot their
//! handle.

use crate::models::MemberContact;
use crate::services::{Database, ServiceError};
use crate::utils::contact_suffix;

#[derive(Clone)]
pub struct RecoveryService {
    db: Database,
}

impl RecoveryService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Exact match on member id plus congregation number.
    pub async fn resolve_by_membership(
        &self,
        member_id: i64,
        congregation_number: &str,
    ) -> Result<MemberContact, ServiceError> {
        self.db
            .find_contact_by_member_and_congregation(member_id, congregation_number)
            .await?
            .ok_or(ServiceError::MemberNotFound)
    }

    /// Match on the trailing eight digits of the stored contact.
    ///
    /// Linear over the whole population. Acceptable at the current scale;
    /// the query projects only id and contact columns.
    pub async fn resolve_by_phone_suffix(
        &self,
        phone: &str,
    ) -> Result<MemberContact, ServiceError> {
        let needle = contact_suffix(phone);
        if needle.is_empty() {
            return Err(ServiceError::MemberNotFound);
        }

        let contacts = self.db.list_member_contacts().await?;
        contacts
            .into_iter()
            .find(|row| {
                row.contact
                    .as_deref()
                    .map(|stored| contact_suffix(stored) == needle)
                    .unwrap_or(false)
            })
            .ok_or(ServiceError::MemberNotFound)
    }
}
