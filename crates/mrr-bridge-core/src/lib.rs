pub mod aggregate;
pub mod error;
pub mod types;

#[cfg(feature = "bridge")]
pub mod bridge;

#[cfg(feature = "quarterly")]
pub mod quarterly;

#[cfg(feature = "concentration")]
pub mod concentration;

pub use error::MrrError;
pub use types::*;

/// Standard result type for all mrr-bridge operations
pub type MrrResult<T> = Result<T, MrrError>;
