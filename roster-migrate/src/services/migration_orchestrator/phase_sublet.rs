//! Phase 5: SUBLET PROVIDERS
//!
//! Companies named on sublet work orders. The company name doubles as the
//! legacy id, and as the organization key it merges with a vendor of the
//! same name.

use super::{MigrationOrchestrator, SectionStats};
use crate::db::roles::SubletProviderProfile;
use crate::legacy::SubletCompanyRecord;
use crate::services::entity_resolver::{EntityResolver, OrganizationInput};
use roster_common::db::{EntityKind, OrgType, RoleCode};
use roster_common::Result;
use tracing::{debug, info, warn};

impl MigrationOrchestrator {
    /// Phase 5: SUBLET PROVIDERS - resolve organizations, grant SUBLET_PROVIDER
    pub(super) async fn phase_sublet(&mut self) -> Result<SectionStats> {
        info!("Phase 5: SUBLET PROVIDERS");

        let rows = self.source.sublet_companies().await?;
        let mut stats = SectionStats::default();

        for row in &rows {
            stats.rows_read += 1;
            let record = SubletCompanyRecord::from_row(row);

            let Some(name) = record.company_name.as_deref() else {
                warn!("Sublet provider skipped: blank company name");
                stats.skipped_blank_name += 1;
                continue;
            };

            let key = EntityResolver::organization_key(name);
            let resolution = match self.rediscover(RoleCode::SubletProvider, Some(name)).await? {
                Some(found) => found,
                None => {
                    self.resolver
                        .resolve_or_create_org(&OrganizationInput {
                            legal_name: name,
                            org_type: OrgType::Business,
                            display_name: name,
                            tax_id: None,
                        })
                        .await?
                }
            };

            self.remember(RoleCode::SubletProvider, Some(name), &key, resolution);
            stats.record(EntityKind::Organization, resolution.outcome);
            debug!(company = name, entity = %resolution.id, outcome = ?resolution.outcome, "Sublet provider resolved");

            self.attacher
                .grant_role(resolution.id, RoleCode::SubletProvider)
                .await?;
            self.attacher
                .upsert_sublet_provider_profile(
                    resolution.id,
                    &SubletProviderProfile {
                        legacy_company_name: Some(name.to_string()),
                    },
                )
                .await?;
        }

        Ok(stats)
    }
}
