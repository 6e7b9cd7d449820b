pub mod catalog;
pub mod error;
pub mod memory;
pub mod rolling;
pub mod traits;
pub mod types;

pub use catalog::*;
pub use error::*;
pub use memory::{MemorySnapshot, MemorySource};
pub use rolling::*;
pub use traits::*;
pub use types::*;
