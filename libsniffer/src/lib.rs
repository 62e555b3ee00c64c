#[macro_use]
extern crate log;

mod bpf;
mod decoder;
mod filter;
mod layers;
mod record;
mod report;
mod sniffer;

#[cfg(test)]
mod testutil;

pub use decoder::{decode, decode_frame, DecodeError, Layer};
pub use filter::*;
pub use layers::ProtocolKind;
pub use record::*;
pub use report::*;
pub use sniffer::*;

pub use pnet_base::MacAddr;
