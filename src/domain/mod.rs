// Domain types and value objects
mod bar;
mod timeframe;

pub use bar::Bar;
pub use timeframe::Timeframe;
