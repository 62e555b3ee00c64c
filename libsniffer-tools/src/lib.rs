#[macro_use]
extern crate log;

mod config;
mod engine;
mod error;
mod frame;
mod handler;
mod timestamp;

pub use config::Config;
pub use engine::*;
pub use error::*;
pub use frame::Frame;
pub use handler::*;
pub use timestamp::Timestamp;
