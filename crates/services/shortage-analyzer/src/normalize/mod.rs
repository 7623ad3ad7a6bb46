//! Slot inference and conversion of raw inputs into daily rates.

pub mod actual;
pub mod loader;
pub mod need;
pub mod time_grid;

pub use actual::{EmploymentActual, NormalizedActual, RoleActual};
pub use loader::{DataLoader, LoadedData};
pub use need::{NormalizedNeed, RoleNeed};
pub use time_grid::infer_time_grid;
