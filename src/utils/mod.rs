//! # utils
//!
//! crate utilities

pub mod fmt;
pub mod path;
#[cfg(target_family = "unix")]
pub mod smb;
