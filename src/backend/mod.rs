//! # backend
//!
//! Seam between the client and the SMB protocol library.
//!
//! A backend acquires the resource chain the client holds, in order:
//! a [`Transport`] to the server, an authenticated [`Session`] negotiated over it
//! and a mounted share, which is any [`RemoteFs`] implementation.
//! Unmounting the share is `RemoteFs::disconnect`.

use remotefs::{RemoteFs, RemoteResult};

use crate::auth::NtlmInitiator;

#[cfg(target_family = "unix")]
mod libsmbclient;
#[cfg(target_family = "unix")]
pub use self::libsmbclient::{PavaoBackend, PavaoSession, SmbFs, TcpTransport};

/// Transport level connection to the server
pub trait Transport {
    /// Close the connection. Closing an already closed transport is a no-op.
    fn close(&mut self) -> RemoteResult<()>;
}

/// Authenticated session on a server
pub trait Session {
    /// Handle to a mounted share
    type Share: RemoteFs;

    /// Names of the disk shares exposed by the server, in server order
    fn list_share_names(&mut self) -> RemoteResult<Vec<String>>;

    /// Mount `share`
    fn mount(&mut self, share: &str) -> RemoteResult<Self::Share>;

    /// Log off. Logging off twice is a no-op.
    fn logoff(&mut self) -> RemoteResult<()>;
}

/// Protocol library driving the client stages
pub trait SmbBackend {
    type Transport: Transport;
    type Session: Session;

    /// Open a transport connection to `address` (`host:port`)
    fn open_transport(&self, address: &str) -> RemoteResult<Self::Transport>;

    /// Negotiate an authenticated session over `transport`
    fn negotiate(
        &self,
        transport: &mut Self::Transport,
        initiator: &NtlmInitiator,
    ) -> RemoteResult<Self::Session>;
}

/// Share handle type produced by backend `B`
pub type ShareOf<B> = <<B as SmbBackend>::Session as Session>::Share;
