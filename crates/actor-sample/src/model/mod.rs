//! Plain data owned by the sample actors. Nothing in here knows about the runtime.

pub mod counter;
pub mod greeter;

pub use counter::*;
pub use greeter::*;
