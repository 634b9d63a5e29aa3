//! Quorum — autonomous DAO operations daemon.
//!
//! A multi-persona agent runtime that monitors community, mining and
//! governance signals, lets role-specialized personas decide on them
//! independently, and coordinates the high-impact decisions before
//! acting.

pub mod brain;
pub mod config;
pub mod daemon;
pub mod error;
pub mod memory;
pub mod registry;
pub mod store;
pub mod tasks;
pub mod types;
