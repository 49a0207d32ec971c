pub mod email;

pub use email::EmailAction;
