//! Facade crate: the `Context` value every entry point threads through,
//! the chain-client capability seam, and the concrete error aggregate that
//! only this crate (depending on every leaf) is positioned to define.

pub mod client;
pub mod context;
pub mod error;

pub use client::{ChainClient, ChainClients};
pub use context::Context;
pub use error::SigilError;
