pub mod container;
pub mod engine;
pub mod error;
pub mod item;
pub mod presets;
pub mod request;
pub mod types;
pub mod worker;

pub use error::{Error, Result};
