#![crate_name = "smb_scenario_client"]
#![crate_type = "lib"]

//! # smb-scenario-client
//!
//! smb-scenario-client is a SMB2 client meant to be driven by short scripted scenarios,
//! such as load test iterations. Every operation reports a plain outcome instead of
//! raising errors, so scripts can branch on it.
//!
//! The SMB protocol is provided by [pavao](https://github.com/veeso/pavao) (libsmbclient),
//! while the mounted share is exposed through the [remotefs](https://github.com/remotefs-rs/remotefs-rs) `RemoteFs` trait.
//!
//! ## Get started
//!
//! ```toml
//! smb-scenario-client = "^0.1"
//! ```
//!
//! these features are supported:
//!
//! - `find`: enable `find()` method for the mounted share. (*enabled by default*)
//! - `no-log`: disable logging. By default, this library will log via the `log` crate.
//!
//! ### Client lifecycle
//!
//! A client either holds the whole resource chain (transport, session, mounted share)
//! or does not exist at all. Construction failures are reported to a diagnostic sink
//! and yield `None`.
//!
//! ```rust,no_run
//! use smb_scenario_client::SmbClient;
//!
//! let mut client = SmbClient::new("localhost:445", "user", "pwd", "User Volume")
//!     .expect("could not connect");
//!
//! assert!(client.is_connected());
//! let result = client.append_line("hello.txt", "Hello, World!");
//! assert!(result.success, "{}", result.message);
//! println!("{}", client.read_file("hello.txt"));
//! assert!(client.delete_file("hello.txt").success);
//! // release share, session and connection
//! client.close();
//! ```
//!
//! ### Errors
//!
//! Every error text surfaced by the client starts with [`ERROR_SENTINEL`], which
//! is never added twice.
//!

#![doc(html_playground_url = "https://play.rust-lang.org")]

// -- crates
#[macro_use]
extern crate log;

mod auth;
mod backend;
mod client;
mod diagnostics;
mod error;
mod result;

pub use auth::{Dialer, NtlmInitiator};
#[cfg(target_family = "unix")]
pub use backend::{PavaoBackend, PavaoSession, SmbFs, TcpTransport};
pub use backend::{Session, ShareOf, SmbBackend, Transport};
pub use client::{SmbClient, DIRECTORY_NOT_EMPTY};
pub use diagnostics::{DiagnosticSink, LogSink};
pub use error::ClientError;
pub use result::{OperationResult, SharesListResult, NOT_INITIALIZED};
pub use utils::fmt::{is_tagged, tag_error, ERROR_SENTINEL};

// -- utils
pub(crate) mod utils;
