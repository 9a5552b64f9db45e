//! # auth
//!
//! Credential initiator and session dialer

use std::fmt;

use remotefs::RemoteResult;

use crate::backend::SmbBackend;

/// NTLM credential initiator.
///
/// Building an initiator never fails; credentials are only checked by the
/// server once the initiator is used to negotiate a session.
#[derive(Default, Clone)]
pub struct NtlmInitiator {
    pub(crate) user: String,
    pub(crate) password: String,
    pub(crate) domain: Option<String>,
}

impl NtlmInitiator {
    pub fn new<S: AsRef<str>>(user: S, password: S) -> Self {
        Self {
            user: user.as_ref().to_string(),
            password: password.as_ref().to_string(),
            domain: None,
        }
    }

    /// Construct NtlmInitiator with the provided domain (workgroup)
    pub fn domain<S: AsRef<str>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.as_ref().to_string());
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn domain_name(&self) -> Option<&str> {
        self.domain.as_deref()
    }
}

impl fmt::Debug for NtlmInitiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NtlmInitiator")
            .field("user", &self.user)
            .field("password", &"********")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Negotiates authenticated sessions over a transport with its initiator
#[derive(Debug, Clone)]
pub struct Dialer {
    initiator: NtlmInitiator,
}

impl Dialer {
    pub fn new(initiator: NtlmInitiator) -> Self {
        Self { initiator }
    }

    pub fn initiator(&self) -> &NtlmInitiator {
        &self.initiator
    }

    /// Negotiate a session on `transport`
    pub fn dial<B: SmbBackend>(
        &self,
        backend: &B,
        transport: &mut B::Transport,
    ) -> RemoteResult<B::Session> {
        debug!("negotiating session as {}", self.initiator.user);
        backend.negotiate(transport, &self.initiator)
    }
}
