pub mod directory;
pub mod migrations;
pub mod pool;
pub mod workflows;

// Keep re-exports unique so downstream crates see a single symbol per helper.
pub use directory::{DirectoryFetchError, PgDirectory};
pub use migrations::run_migrations;
pub use pool::{create_pool_from_url, create_pool_from_url_checked, DbPoolError, PgPool};
pub use workflows::{PgWorkflowStore, WorkflowStorageError};
