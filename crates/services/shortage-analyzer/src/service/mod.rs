pub mod analysis;
pub mod cache;
pub mod pool;

pub use analysis::AnalysisService;
pub use cache::{RunCache, TtlCache};
pub use pool::{RoleWorkerPool, TaskDeadline};
