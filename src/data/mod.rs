pub mod registry;
pub mod symbol;

pub use registry::TickerRegistry;
pub use symbol::normalize;
