//! Role grants and role profiles
//!
//! A grant is the (entity, role) pair; a profile is the 1:1 role extension
//! created with it. Both are insert-if-absent, so a profile keeps whatever
//! its first writer stored.

use crate::models::EntityId;
use chrono::NaiveDate;
use roster_common::db::RoleCode;
use roster_common::{Error, Result};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerProfile {
    pub legacy_customer_id: Option<String>,
    pub customer_type_id: Option<i64>,
    pub pricing_plan_id: Option<i64>,
    pub credit_limit: Option<f64>,
    pub tax_exempt: bool,
    pub tax_id: Option<String>,
    pub allow_charge: bool,
    pub send_statements: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorProfile {
    pub legacy_vendor_id: Option<String>,
    pub vendor_category_id: Option<i64>,
    pub legacy_category: Option<String>,
    pub account_number: Option<String>,
    pub tax_id: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeProfile {
    pub legacy_employee_id: Option<String>,
    pub employee_status_id: Option<i64>,
    pub job_title: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub pay_rate: Option<f64>,
    pub pay_type: Option<String>,
    pub is_timeclock_enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubletProviderProfile {
    pub legacy_company_name: Option<String>,
}

/// Profile table and legacy id column of a role
fn profile_table(role: RoleCode) -> (&'static str, &'static str) {
    match role {
        RoleCode::Customer => ("customer_profiles", "legacy_customer_id"),
        RoleCode::Vendor => ("vendor_profiles", "legacy_vendor_id"),
        RoleCode::Employee => ("employee_profiles", "legacy_employee_id"),
        RoleCode::SubletProvider => ("sublet_provider_profiles", "legacy_company_name"),
    }
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Fail unless `role` is seeded in `roles`
pub async fn ensure_role_seeded(pool: &SqlitePool, role: RoleCode) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE code = ?)")
        .bind(role.code())
        .fetch_one(pool)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(Error::MissingReference(format!(
            "role {} is not seeded; run `roster create` or `roster update`",
            role
        )))
    }
}

/// Grant `role` to `entity`; returns whether a new grant was written
pub async fn grant_role(pool: &SqlitePool, entity: EntityId, role: RoleCode) -> Result<bool> {
    ensure_role_seeded(pool, role).await?;

    let result = sqlx::query(
        "INSERT OR IGNORE INTO entity_roles (entity_id, role_code, assigned_at) \
         VALUES (?, ?, CURRENT_TIMESTAMP)",
    )
    .bind(entity.get())
    .bind(role.code())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Role codes held by `entity`, sorted
pub async fn roles_of(pool: &SqlitePool, entity: EntityId) -> Result<Vec<String>> {
    let roles: Vec<String> = sqlx::query_scalar(
        "SELECT role_code FROM entity_roles WHERE entity_id = ? ORDER BY role_code",
    )
    .bind(entity.get())
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

/// Entity whose `role` profile carries `legacy_id`
pub async fn find_entity_by_legacy_id(
    pool: &SqlitePool,
    role: RoleCode,
    legacy_id: &str,
) -> Result<Option<EntityId>> {
    let (table, column) = profile_table(role);
    let sql = format!("SELECT entity_id FROM {} WHERE {} = ?", table, column);

    let id: Option<i64> = sqlx::query_scalar(&sql)
        .bind(legacy_id)
        .fetch_optional(pool)
        .await?;
    Ok(id.map(EntityId))
}

pub async fn insert_customer_profile(
    pool: &SqlitePool,
    entity: EntityId,
    profile: &CustomerProfile,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO customer_profiles (
            entity_id, legacy_customer_id, customer_type_id, pricing_plan_id,
            credit_limit, tax_exempt, tax_id, allow_charge, send_statements, notes
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entity.get())
    .bind(&profile.legacy_customer_id)
    .bind(profile.customer_type_id)
    .bind(profile.pricing_plan_id)
    .bind(profile.credit_limit)
    .bind(profile.tax_exempt)
    .bind(&profile.tax_id)
    .bind(profile.allow_charge)
    .bind(profile.send_statements)
    .bind(&profile.notes)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn insert_vendor_profile(
    pool: &SqlitePool,
    entity: EntityId,
    profile: &VendorProfile,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO vendor_profiles (
            entity_id, legacy_vendor_id, vendor_category_id, legacy_category,
            account_number, tax_id, is_active
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entity.get())
    .bind(&profile.legacy_vendor_id)
    .bind(profile.vendor_category_id)
    .bind(&profile.legacy_category)
    .bind(&profile.account_number)
    .bind(&profile.tax_id)
    .bind(profile.is_active)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn insert_employee_profile(
    pool: &SqlitePool,
    entity: EntityId,
    profile: &EmployeeProfile,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO employee_profiles (
            entity_id, legacy_employee_id, employee_status_id, job_title, hire_date,
            termination_date, pay_rate, pay_type, is_timeclock_enabled
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entity.get())
    .bind(&profile.legacy_employee_id)
    .bind(profile.employee_status_id)
    .bind(&profile.job_title)
    .bind(format_date(profile.hire_date))
    .bind(format_date(profile.termination_date))
    .bind(profile.pay_rate)
    .bind(&profile.pay_type)
    .bind(profile.is_timeclock_enabled)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

pub async fn insert_sublet_provider_profile(
    pool: &SqlitePool,
    entity: EntityId,
    profile: &SubletProviderProfile,
) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO sublet_provider_profiles (entity_id, legacy_company_name) \
         VALUES (?, ?)",
    )
    .bind(entity.get())
    .bind(&profile.legacy_company_name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::entities::{insert_organization, NewOrganization};
    use roster_common::db::{create_schema, open_target_pool, OrgType};
    use tempfile::TempDir;

    async fn setup_with_org() -> (TempDir, SqlitePool, EntityId) {
        let temp_dir = TempDir::new().unwrap();
        let pool = open_target_pool(&temp_dir.path().join("target.db"), None)
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();

        let id = insert_organization(
            &pool,
            &NewOrganization {
                display_name: "Acme Supply Co".to_string(),
                org_type: OrgType::Business,
                legal_name: "Acme Supply Co".to_string(),
                trade_name: None,
                tax_id: None,
            },
        )
        .await
        .unwrap();
        (temp_dir, pool, id)
    }

    #[tokio::test]
    async fn test_grant_is_idempotent() {
        let (_dir, pool, id) = setup_with_org().await;

        assert!(grant_role(&pool, id, RoleCode::Vendor).await.unwrap());
        assert!(!grant_role(&pool, id, RoleCode::Vendor).await.unwrap());
        assert!(grant_role(&pool, id, RoleCode::SubletProvider).await.unwrap());

        assert_eq!(roles_of(&pool, id).await.unwrap(), vec!["SUBLET_PROVIDER", "VENDOR"]);
    }

    #[tokio::test]
    async fn test_unseeded_role_is_fatal() {
        let (_dir, pool, id) = setup_with_org().await;
        sqlx::query("DELETE FROM roles WHERE code = 'VENDOR'")
            .execute(&pool)
            .await
            .unwrap();

        let err = grant_role(&pool, id, RoleCode::Vendor).await.unwrap_err();
        assert!(matches!(err, Error::MissingReference(_)));
    }

    #[tokio::test]
    async fn test_profile_first_write_wins() {
        let (_dir, pool, id) = setup_with_org().await;

        let first = VendorProfile {
            legacy_vendor_id: Some("V1".to_string()),
            account_number: Some("A-1".to_string()),
            is_active: true,
            ..Default::default()
        };
        let second = VendorProfile {
            legacy_vendor_id: Some("V1".to_string()),
            account_number: Some("B-2".to_string()),
            is_active: false,
            ..Default::default()
        };

        assert!(insert_vendor_profile(&pool, id, &first).await.unwrap());
        assert!(!insert_vendor_profile(&pool, id, &second).await.unwrap());

        let account: String =
            sqlx::query_scalar("SELECT account_number FROM vendor_profiles WHERE entity_id = ?")
                .bind(id.get())
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(account, "A-1");

        assert_eq!(
            find_entity_by_legacy_id(&pool, RoleCode::Vendor, "V1").await.unwrap(),
            Some(id)
        );
        assert_eq!(
            find_entity_by_legacy_id(&pool, RoleCode::Customer, "V1").await.unwrap(),
            None
        );
    }
}
