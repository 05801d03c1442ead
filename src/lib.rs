// taskman - file-backed task manager

pub mod config;
pub mod error;
pub mod filter;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use config::Config;
pub use error::StoreError;
pub use filter::TaskFilter;
pub use store::{CompleteOutcome, TaskStore};
pub use task::{Priority, Status, Task};
