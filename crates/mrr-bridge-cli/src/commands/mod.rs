pub mod bridge;
pub mod concentration;
pub mod quarterly;
