pub mod chart_data;
pub mod console;

pub use chart_data::*;
pub use console::*;
