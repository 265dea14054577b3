pub mod cache;
pub mod collector;
pub mod preprocessor;
pub mod reconciler;
pub mod schema;
pub mod transform;

pub use cache::*;
pub use collector::*;
pub use preprocessor::*;
pub use reconciler::*;
pub use schema::*;
pub use transform::*;
