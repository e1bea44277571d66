pub mod conversion;
pub mod model;
mod validate;
pub mod vocabulary;

pub use conversion::*;
pub use model::*;
pub use vocabulary::*;
