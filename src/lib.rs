//! kallbazdb - A minimal persistent key-value store on an append-only log
//!
//! The log is a flat file of checksummed frames; reads scan it end to end and
//! the last record for a key wins. An in-memory backend implements the same
//! [`store::Store`] contract.

pub mod cli;
pub mod config;
pub mod observability;
pub mod storage;
pub mod store;
