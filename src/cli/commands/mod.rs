//! CLI command implementations

pub mod describe;
pub mod query;
pub mod report;
pub mod run;

pub use describe::handle_describe;
pub use query::handle_query;
pub use report::handle_report;
pub use run::handle_run;
