//! # client
//!
//! Smb client: the resource chain (transport, dialer, session, share) and
//! the file and directory operations issued on the mounted share.

mod dir;
mod file;

pub use dir::DIRECTORY_NOT_EMPTY;

use std::fmt;

use remotefs::RemoteFs;

use crate::auth::{Dialer, NtlmInitiator};
use crate::backend::{Session, ShareOf, SmbBackend, Transport};
use crate::diagnostics::DiagnosticSink;
use crate::error::ClientError;
use crate::result::{OperationResult, SharesListResult};
use crate::utils::fmt::tag_error;

#[cfg(target_family = "unix")]
use crate::backend::PavaoBackend;
#[cfg(target_family = "unix")]
use crate::diagnostics::LogSink;

/// SMB client bound to a single mounted share.
///
/// A client is built by [`SmbClient::connect`], which either acquires the whole
/// chain or returns nothing. [`SmbClient::close`] releases the share, the session
/// and the transport in this order; it is also run on drop.
///
/// A client is meant to be driven by a single caller.
pub struct SmbClient<B: SmbBackend> {
    transport: Option<B::Transport>,
    dialer: Option<Dialer>,
    session: Option<B::Session>,
    share: Option<ShareOf<B>>,
    sink: Box<dyn DiagnosticSink>,
}

#[cfg(target_family = "unix")]
impl SmbClient<PavaoBackend> {
    /// Connect to `address` (`host:port`) with the default libsmbclient backend,
    /// logging failures through the `log` facade.
    pub fn new(address: &str, username: &str, password: &str, share: &str) -> Option<Self> {
        Self::connect(
            &PavaoBackend::default(),
            address,
            username,
            password,
            share,
            Box::new(LogSink),
        )
    }
}

impl<B: SmbBackend> SmbClient<B> {
    /// Connect to `address`, authenticate and mount `share`.
    ///
    /// Returns `None` if any stage fails; the failure is reported to `sink`
    /// and whatever was acquired before the failing stage is released.
    pub fn connect(
        backend: &B,
        address: &str,
        username: &str,
        password: &str,
        share: &str,
        sink: Box<dyn DiagnosticSink>,
    ) -> Option<Self> {
        let mut client = Self::empty(sink);
        match client.establish(backend, address, NtlmInitiator::new(username, password), share) {
            Ok(()) => Some(client),
            Err(err) => {
                client.report(&err);
                client.close();
                None
            }
        }
    }

    /// Same as [`SmbClient::connect`], but returns the failure to the caller
    pub fn try_connect(
        backend: &B,
        address: &str,
        initiator: NtlmInitiator,
        share: &str,
        sink: Box<dyn DiagnosticSink>,
    ) -> Result<Self, ClientError> {
        let mut client = Self::empty(sink);
        match client.establish(backend, address, initiator, share) {
            Ok(()) => Ok(client),
            Err(err) => {
                client.close();
                Err(err)
            }
        }
    }

    /// Check whether the client can currently talk to the server,
    /// by listing the server shares.
    pub fn is_connected(&mut self) -> bool {
        self.transport.is_some()
            && self.dialer.is_some()
            && self.share.is_some()
            && self.get_shares().success
    }

    /// Whether a share is currently mounted
    pub fn is_mounted(&self) -> bool {
        self.share.is_some()
    }

    /// Release share, session and transport, in this order.
    ///
    /// Each release is attempted regardless of the previous ones; release
    /// errors are reported to the diagnostic sink and never returned.
    /// Closing a closed client is a no-op.
    pub fn close(&mut self) {
        if let Some(mut share) = self.share.take() {
            trace!("unmounting share");
            if let Err(err) = share.disconnect() {
                self.report(format!("could not unmount share: {}", err));
            }
        }
        if let Some(mut session) = self.session.take() {
            trace!("logging off");
            if let Err(err) = session.logoff() {
                self.report(format!("could not log off: {}", err));
            }
        }
        self.dialer = None;
        if let Some(mut transport) = self.transport.take() {
            trace!("closing transport");
            if let Err(err) = transport.close() {
                self.report(format!("could not close connection: {}", err));
            }
        }
    }

    /// List the disk shares exposed by the server
    pub fn get_shares(&mut self) -> SharesListResult {
        let session = match self.session.as_mut() {
            Some(session) => session,
            None => return SharesListResult::failed(OperationResult::not_initialized()),
        };
        match session.list_share_names() {
            Ok(shares) => {
                debug!("found {} shares", shares.len());
                SharesListResult::ok(shares)
            }
            Err(err) => SharesListResult::failed(OperationResult::from_error(err)),
        }
    }

    // -- private

    fn empty(sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            transport: None,
            dialer: None,
            session: None,
            share: None,
            sink,
        }
    }

    fn establish(
        &mut self,
        backend: &B,
        address: &str,
        initiator: NtlmInitiator,
        share: &str,
    ) -> Result<(), ClientError> {
        info!("connecting to {}", address);
        let transport = self
            .transport
            .insert(backend.open_transport(address).map_err(ClientError::Connection)?);
        let dialer = self.dialer.insert(Dialer::new(initiator));
        let session = self
            .session
            .insert(dialer.dial(backend, transport).map_err(ClientError::Auth)?);
        info!("mounting share {}", share);
        self.share = Some(session.mount(share).map_err(ClientError::Mount)?);
        info!("share {} mounted on {}", share, address);
        Ok(())
    }

    fn share_mut(&mut self) -> Result<&mut ShareOf<B>, ClientError> {
        self.share.as_mut().ok_or(ClientError::NotInitialized)
    }

    fn report<E: ToString>(&self, err: E) {
        self.sink.error(&tag_error(err));
    }
}

impl<B: SmbBackend> Drop for SmbClient<B> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<B: SmbBackend> fmt::Debug for SmbClient<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmbClient")
            .field("transport", &self.transport.is_some())
            .field("dialer", &self.dialer)
            .field("session", &self.session.is_some())
            .field("share", &self.share.is_some())
            .finish()
    }
}
