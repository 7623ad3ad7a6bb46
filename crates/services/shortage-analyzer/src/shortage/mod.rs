//! Role, employment and organization roll-ups plus the masking check.

pub mod aggregator;
pub mod masking;

pub use aggregator::{
    compute_employment_shortage, compute_organization_shortage, compute_role_shortage, rank_roles,
    ShortageAggregator, UNASSIGNED_EMPLOYMENT,
};
pub use masking::detect_masking;
