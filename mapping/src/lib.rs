mod config;
mod error;
mod filter;
mod image;
mod mapper;
mod pipeline;
mod serde_utils;
mod targets;

pub use config::*;
pub use error::*;
pub use filter::*;
pub use image::*;
pub use mapper::*;
pub use pipeline::*;
pub use targets::*;
