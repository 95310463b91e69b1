//! CLI command implementations

pub mod fmt;
pub mod inspect;
pub mod validate;

pub use fmt::FmtArgs;
pub use inspect::InspectArgs;
pub use validate::ValidateArgs;
