//! limgraph - Language-independent model graphs
//!
//! Converts the symbols a compiler front end exports into a LIM graph,
//! applies path filters and keeps the result in a compact binary format.

pub mod builder;
pub mod cli;
pub mod core;
pub mod filter;
pub mod frontend;
pub mod lim;

pub use core::config::Config;
pub use core::error::{Error, Result};
