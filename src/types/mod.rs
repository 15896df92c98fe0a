//! Type definitions for studiopulse

mod error;
mod rollup;
mod session;

pub use error::*;
pub use rollup::*;
pub use session::*;
