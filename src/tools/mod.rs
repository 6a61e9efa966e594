pub mod write;
pub mod list;
pub mod verify;
pub mod create;
mod error;

pub use error::{Context, Error, Result, Source};
