pub mod fetch;
pub mod format;
pub mod merge;
pub mod store;
pub mod types;
