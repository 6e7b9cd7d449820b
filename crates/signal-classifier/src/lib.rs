pub mod classifier;


pub use classifier::*;
pub use indicator_core::Directionality;
