pub mod backup;
pub mod log;
