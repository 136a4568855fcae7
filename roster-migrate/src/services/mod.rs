//! Migration engines and the orchestrator that drives them

pub mod entity_resolver;
pub mod migration_orchestrator;
pub mod role_attacher;
pub mod timeclock;
pub mod vendor_classifier;

pub use entity_resolver::{EntityResolver, Resolution, ResolutionOutcome};
pub use migration_orchestrator::{MigrationOrchestrator, MigrationReport, MigrationStatistics};
pub use role_attacher::{Contact, ContactOutcome, RoleAttacher};
pub use timeclock::{classify_action, reconstruct, Reconstruction};
pub use vendor_classifier::{VendorCategory, VendorClassifier};
