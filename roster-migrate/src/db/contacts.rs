//! Phone, email and address rows
//!
//! Each table is unique on the entity, the type and the contact text, so
//! adding a contact twice is a no-op. Blank address parts are stored as
//! empty strings to keep the composite key meaningful.

use crate::legacy::AddressFields;
use crate::models::EntityId;
use roster_common::Result;
use sqlx::SqlitePool;

/// Address as stored: blank parts are empty strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewAddress {
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl From<&AddressFields> for NewAddress {
    fn from(fields: &AddressFields) -> Self {
        Self {
            line1: fields.line1.clone().unwrap_or_default(),
            line2: fields.line2.clone(),
            city: fields.city.clone().unwrap_or_default(),
            state: fields.state.clone().unwrap_or_default(),
            postal_code: fields.postal_code.clone().unwrap_or_default(),
        }
    }
}

pub async fn add_phone(
    pool: &SqlitePool,
    entity: EntityId,
    phone_type_id: i64,
    number: &str,
    is_primary: bool,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO entity_phones (entity_id, phone_type_id, number, is_primary) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(entity.get())
    .bind(phone_type_id)
    .bind(number)
    .bind(is_primary)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn add_email(
    pool: &SqlitePool,
    entity: EntityId,
    email_type_id: i64,
    email: &str,
    is_primary: bool,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO entity_emails (entity_id, email_type_id, email, is_primary) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(entity.get())
    .bind(email_type_id)
    .bind(email)
    .bind(is_primary)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn add_address(
    pool: &SqlitePool,
    entity: EntityId,
    address_type_id: i64,
    address: &NewAddress,
    is_primary: bool,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO entity_addresses (
            entity_id, address_type_id, line1, line2, city, state, postal_code, is_primary
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entity.get())
    .bind(address_type_id)
    .bind(&address.line1)
    .bind(&address.line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(is_primary)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
