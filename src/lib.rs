pub mod model;
pub mod pixel;
pub mod dcm;
pub mod generate;
pub mod config;
pub mod tools;

pub use generate::{GenerationParams, GenerationReport, Generator};
pub use dcm::{Encoder, EncoderSettings};
