//! Role attachment engine
//!
//! Grants roles, writes role profiles and adds contacts for a resolved
//! entity. Every write is insert-if-absent. Nothing is written in a dry run
//! or for a placeholder id, but seeded references are still checked and
//! contact type names still resolved, so a dry run fails where a live run
//! would.

use crate::db::contacts::{add_address, add_email, add_phone, NewAddress};
use crate::db::lookups::resolve_or_create;
use crate::db::roles::{
    self, ensure_role_seeded, CustomerProfile, EmployeeProfile, SubletProviderProfile,
    VendorProfile,
};
use crate::legacy::AddressFields;
use crate::models::{EntityId, RunMode};
use roster_common::db::{LookupTable, RoleCode};
use roster_common::Result;
use sqlx::SqlitePool;
use tracing::debug;

/// Contact offered for an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Contact<'a> {
    Phone { phone_type: &'a str, number: Option<&'a str> },
    Email { email_type: &'a str, email: Option<&'a str> },
    Address { address_type: &'a str, fields: &'a AddressFields },
}

impl Contact<'_> {
    /// Whether every text field is blank after trimming
    pub fn is_blank(&self) -> bool {
        let blank = |value: Option<&str>| value.map_or(true, |v| v.trim().is_empty());
        match self {
            Contact::Phone { number, .. } => blank(*number),
            Contact::Email { email, .. } => blank(*email),
            Contact::Address { fields, .. } => fields.is_blank(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactOutcome {
    /// All fields blank
    Skipped,
    /// Passed on to the target (a no-op when already present or in a dry run)
    Offered,
}

pub struct RoleAttacher {
    db: SqlitePool,
    mode: RunMode,
}

impl RoleAttacher {
    pub fn new(db: SqlitePool, mode: RunMode) -> Self {
        Self { db, mode }
    }

    fn writes_for(&self, entity: EntityId) -> bool {
        self.mode.writes() && entity.is_materialized()
    }

    pub async fn grant_role(&self, entity: EntityId, role: RoleCode) -> Result<()> {
        if !self.writes_for(entity) {
            return ensure_role_seeded(&self.db, role).await;
        }

        if roles::grant_role(&self.db, entity, role).await? {
            debug!(entity = %entity, role = %role, "Role granted");
        }
        Ok(())
    }

    pub async fn upsert_customer_profile(&self, entity: EntityId, profile: &CustomerProfile) -> Result<bool> {
        if !self.writes_for(entity) {
            return Ok(false);
        }
        roles::insert_customer_profile(&self.db, entity, profile).await
    }

    pub async fn upsert_vendor_profile(&self, entity: EntityId, profile: &VendorProfile) -> Result<bool> {
        if !self.writes_for(entity) {
            return Ok(false);
        }
        roles::insert_vendor_profile(&self.db, entity, profile).await
    }

    pub async fn upsert_employee_profile(&self, entity: EntityId, profile: &EmployeeProfile) -> Result<bool> {
        if !self.writes_for(entity) {
            return Ok(false);
        }
        roles::insert_employee_profile(&self.db, entity, profile).await
    }

    pub async fn upsert_sublet_provider_profile(
        &self,
        entity: EntityId,
        profile: &SubletProviderProfile,
    ) -> Result<bool> {
        if !self.writes_for(entity) {
            return Ok(false);
        }
        roles::insert_sublet_provider_profile(&self.db, entity, profile).await
    }

    pub async fn add_contact(
        &self,
        entity: EntityId,
        contact: &Contact<'_>,
        is_primary: bool,
    ) -> Result<ContactOutcome> {
        if contact.is_blank() {
            return Ok(ContactOutcome::Skipped);
        }

        let (table, type_name) = match contact {
            Contact::Phone { phone_type, .. } => (LookupTable::PhoneTypes, *phone_type),
            Contact::Email { email_type, .. } => (LookupTable::EmailTypes, *email_type),
            Contact::Address { address_type, .. } => (LookupTable::AddressTypes, *address_type),
        };
        let type_id = resolve_or_create(&self.db, table, type_name, self.mode).await?;

        if !self.writes_for(entity) {
            return Ok(ContactOutcome::Offered);
        }

        match contact {
            Contact::Phone { number, .. } => {
                let number = number.unwrap_or_default().trim();
                add_phone(&self.db, entity, type_id, number, is_primary).await?;
            }
            Contact::Email { email, .. } => {
                let email = email.unwrap_or_default().trim();
                add_email(&self.db, entity, type_id, email, is_primary).await?;
            }
            Contact::Address { fields, .. } => {
                add_address(&self.db, entity, type_id, &NewAddress::from(*fields), is_primary).await?;
            }
        }

        Ok(ContactOutcome::Offered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::{insert_person, NewPerson};
    use roster_common::db::{create_schema, open_target_pool};
    use tempfile::TempDir;

    async fn setup() -> (TempDir, SqlitePool, EntityId) {
        let temp_dir = TempDir::new().unwrap();
        let pool = open_target_pool(&temp_dir.path().join("target.db"), None)
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        let id = insert_person(
            &pool,
            &NewPerson {
                display_name: "Ann Lee".to_string(),
                first_name: "Ann".to_string(),
                middle_name: None,
                last_name: "Lee".to_string(),
                date_of_birth: None,
            },
        )
        .await
        .unwrap();
        (temp_dir, pool, id)
    }

    async fn count(pool: &SqlitePool, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_blank_contacts_are_skipped() {
        let (_dir, pool, id) = setup().await;
        let attacher = RoleAttacher::new(pool.clone(), RunMode::Live);
        let blank_address = AddressFields::default();

        let outcomes = [
            attacher
                .add_contact(id, &Contact::Phone { phone_type: "home", number: Some("  ") }, true)
                .await
                .unwrap(),
            attacher
                .add_contact(id, &Contact::Email { email_type: "personal", email: None }, true)
                .await
                .unwrap(),
            attacher
                .add_contact(id, &Contact::Address { address_type: "mailing", fields: &blank_address }, true)
                .await
                .unwrap(),
        ];

        assert!(outcomes.iter().all(|o| *o == ContactOutcome::Skipped));
        assert_eq!(count(&pool, "entity_phones").await, 0);
        assert_eq!(count(&pool, "entity_addresses").await, 0);
    }

    #[tokio::test]
    async fn test_address_is_insert_if_absent() {
        let (_dir, pool, id) = setup().await;
        let attacher = RoleAttacher::new(pool.clone(), RunMode::Live);
        let fields = AddressFields {
            line1: Some("12 Elm St".to_string()),
            postal_code: Some("55401".to_string()),
            ..Default::default()
        };
        let contact = Contact::Address { address_type: "mailing", fields: &fields };

        attacher.add_contact(id, &contact, true).await.unwrap();
        attacher.add_contact(id, &contact, true).await.unwrap();

        assert_eq!(count(&pool, "entity_addresses").await, 1);
        let city: String = sqlx::query_scalar("SELECT city FROM entity_addresses")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(city, "");
    }

    #[tokio::test]
    async fn test_unknown_phone_type_is_created() {
        let (_dir, pool, id) = setup().await;
        let attacher = RoleAttacher::new(pool.clone(), RunMode::Live);

        let outcome = attacher
            .add_contact(id, &Contact::Phone { phone_type: "pager", number: Some("555-0100") }, false)
            .await
            .unwrap();

        assert_eq!(outcome, ContactOutcome::Offered);
        assert_eq!(count(&pool, "phone_types").await, 5);
        assert_eq!(count(&pool, "entity_phones").await, 1);
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let (_dir, pool, id) = setup().await;
        let attacher = RoleAttacher::new(pool.clone(), RunMode::DryRun);

        attacher.grant_role(id, RoleCode::Customer).await.unwrap();
        attacher
            .upsert_customer_profile(id, &CustomerProfile::default())
            .await
            .unwrap();
        let outcome = attacher
            .add_contact(id, &Contact::Email { email_type: "personal", email: Some("ann@example.com") }, true)
            .await
            .unwrap();

        assert_eq!(outcome, ContactOutcome::Offered);
        assert_eq!(count(&pool, "entity_roles").await, 0);
        assert_eq!(count(&pool, "customer_profiles").await, 0);
        assert_eq!(count(&pool, "entity_emails").await, 0);
    }

    #[tokio::test]
    async fn test_placeholder_entity_is_never_written() {
        let (_dir, pool, _id) = setup().await;
        let attacher = RoleAttacher::new(pool.clone(), RunMode::Live);

        attacher.grant_role(EntityId(-1), RoleCode::Vendor).await.unwrap();
        assert_eq!(count(&pool, "entity_roles").await, 0);
    }
}
