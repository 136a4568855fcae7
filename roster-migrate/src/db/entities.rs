//! Canonical entity rows and their person/organization extensions

use crate::models::EntityId;
use chrono::NaiveDate;
use roster_common::db::{EntityKind, OrgType};
use roster_common::Result;
use sqlx::SqlitePool;

/// Person to create
#[derive(Debug, Clone, PartialEq)]
pub struct NewPerson {
    pub display_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Organization to create
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrganization {
    pub display_name: String,
    pub org_type: OrgType,
    pub legal_name: String,
    pub trade_name: Option<String>,
    pub tax_id: Option<String>,
}

async fn insert_entity(pool: &SqlitePool, kind: EntityKind, display_name: &str) -> Result<EntityId> {
    let result = sqlx::query(
        r#"
        INSERT INTO entities (kind, display_name, is_active, created_at, updated_at)
        VALUES (?, ?, 1, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(kind.code())
    .bind(display_name)
    .execute(pool)
    .await?;

    Ok(EntityId(result.last_insert_rowid()))
}

/// Create a PERSON entity plus its person row
pub async fn insert_person(pool: &SqlitePool, person: &NewPerson) -> Result<EntityId> {
    let id = insert_entity(pool, EntityKind::Person, &person.display_name).await?;

    sqlx::query(
        r#"
        INSERT INTO persons (entity_id, first_name, middle_name, last_name, date_of_birth)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.get())
    .bind(&person.first_name)
    .bind(&person.middle_name)
    .bind(&person.last_name)
    .bind(person.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string()))
    .execute(pool)
    .await?;

    Ok(id)
}

/// Create an ORGANIZATION entity plus its organization row
pub async fn insert_organization(pool: &SqlitePool, org: &NewOrganization) -> Result<EntityId> {
    let id = insert_entity(pool, EntityKind::Organization, &org.display_name).await?;

    sqlx::query(
        r#"
        INSERT INTO organizations (entity_id, org_type, legal_name, trade_name, tax_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.get())
    .bind(org.org_type.code())
    .bind(&org.legal_name)
    .bind(&org.trade_name)
    .bind(&org.tax_id)
    .execute(pool)
    .await?;

    Ok(id)
}

/// Kind code of a persisted entity
pub async fn entity_kind(pool: &SqlitePool, id: EntityId) -> Result<Option<String>> {
    let kind: Option<String> = sqlx::query_scalar("SELECT kind FROM entities WHERE id = ?")
        .bind(id.get())
        .fetch_optional(pool)
        .await?;
    Ok(kind)
}
