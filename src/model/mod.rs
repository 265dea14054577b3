pub mod request;
pub mod target;

pub use request::*;
pub use target::*;
