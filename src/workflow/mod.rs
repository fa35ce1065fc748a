pub mod conversion;
pub mod metadata;

pub use conversion::*;
pub use metadata::*;
