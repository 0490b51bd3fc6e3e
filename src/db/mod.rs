pub mod config;
pub mod exec;
pub mod log;
pub mod maintenance;
pub mod manager;
pub mod migrate;
pub mod pool;
pub mod pragmas;
pub mod rows;
pub mod stats;

pub use config::DbConfig;
pub use exec::UpdateResult;
pub use manager::DatabaseManager;
pub use pool::PooledConnection;
pub use stats::DbStats;
