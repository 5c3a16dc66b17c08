pub mod analyzer;
pub mod console;
pub mod presenter;

pub use console::Console;
