pub mod models;
pub mod query;
pub mod intake;
pub mod template;
pub mod enumerator;
pub mod config;
pub mod engine;
pub mod reporting;
pub mod logging;

// Re-export commonly used items
pub use models::*;
pub use query::*;
pub use intake::*;
pub use template::*;
pub use enumerator::*;
pub use config::*;
pub use engine::*;
pub use reporting::*;
