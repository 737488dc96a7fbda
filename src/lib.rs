pub mod error;
pub mod net;
pub mod policy;
pub mod synth;
pub mod topo;
pub mod viz;

pub use error::{Error, Result};

#[cfg(test)]
mod test;
