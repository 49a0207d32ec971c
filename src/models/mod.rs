pub mod condition;
pub mod evaluation;
pub mod forecast;

pub use condition::*;
pub use evaluation::*;
pub use forecast::*;
