//! # libsmbclient backend
//!
//! Backend built on `pavao`, the libsmbclient binding

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use libc::mode_t;
use pavao::{SmbClient, SmbCredentials, SmbMode, SmbOpenOptions, SmbOptions};
use remotefs::fs::{File, Metadata, ReadStream, UnixPex, Welcome, WriteStream};
use remotefs::{RemoteError, RemoteErrorType, RemoteFs, RemoteResult};

use super::{Session, SmbBackend, Transport};
use crate::auth::NtlmInitiator;
use crate::utils::{path as path_utils, smb as smb_utils};

const DEFAULT_WORKGROUP: &str = "WORKGROUP";

/// libsmbclient backend configuration
#[derive(Debug, Clone)]
pub struct PavaoBackend {
    workgroup: String,
    case_sensitive: bool,
    one_share_per_server: bool,
    connect_timeout: Option<Duration>,
}

impl Default for PavaoBackend {
    fn default() -> Self {
        Self {
            workgroup: DEFAULT_WORKGROUP.to_string(),
            case_sensitive: false,
            one_share_per_server: true,
            connect_timeout: None,
        }
    }
}

impl PavaoBackend {
    /// Workgroup used when the initiator carries no domain
    pub fn workgroup<S: AsRef<str>>(mut self, workgroup: S) -> Self {
        self.workgroup = workgroup.as_ref().to_string();
        self
    }

    /// Whether paths on the share are matched case sensitively
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Whether libsmbclient keeps a single share connection per server
    pub fn one_share_per_server(mut self, one_share_per_server: bool) -> Self {
        self.one_share_per_server = one_share_per_server;
        self
    }

    /// Timeout for opening the transport connection
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    fn options(&self) -> SmbOptions {
        SmbOptions::default()
            .case_sensitive(self.case_sensitive)
            .one_share_per_server(self.one_share_per_server)
    }

    fn credentials(&self, server: &str, share: &str, initiator: &NtlmInitiator) -> SmbCredentials {
        SmbCredentials::default()
            .server(server)
            .share(share)
            .username(initiator.user())
            .password(initiator.password())
            .workgroup(initiator.domain_name().unwrap_or(self.workgroup.as_str()))
    }

    fn connect_stream(&self, address: &str) -> io::Result<TcpStream> {
        let mut last_err = io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("could not resolve {}", address),
        );
        for addr in address.to_socket_addrs()? {
            let stream = match self.connect_timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match stream {
                Ok(stream) => return Ok(stream),
                Err(err) => {
                    debug!("could not connect to {}: {}", addr, err);
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }
}

impl SmbBackend for PavaoBackend {
    type Transport = TcpTransport;
    type Session = PavaoSession;

    fn open_transport(&self, address: &str) -> RemoteResult<TcpTransport> {
        trace!("opening tcp connection to {}", address);
        let stream = self
            .connect_stream(address)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::ConnectionError, e))?;
        debug!("connected to {}", address);
        Ok(TcpTransport {
            address: address.to_string(),
            stream: Some(stream),
        })
    }

    fn negotiate(
        &self,
        transport: &mut TcpTransport,
        initiator: &NtlmInitiator,
    ) -> RemoteResult<PavaoSession> {
        // libsmbclient dials its own connection; the transport stream stays idle
        // and only gates the session on the server being reachable
        if !transport.is_open() {
            return Err(RemoteError::new_ex(
                RemoteErrorType::NotConnected,
                "transport is closed",
            ));
        }
        let server = format!("smb://{}", transport.address);
        trace!("negotiating session with {}", server);
        let client = SmbClient::new(self.credentials(&server, "", initiator), self.options())
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::AuthenticationFailed, e))?;
        // libsmbclient authenticates lazily; enumerate shares to force the handshake
        client
            .list_dir("")
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::AuthenticationFailed, e))?;
        debug!("session established with {} as {}", server, initiator.user());
        Ok(PavaoSession {
            config: self.clone(),
            server,
            initiator: initiator.clone(),
            client: Some(client),
        })
    }
}

/// TCP connection to the server
pub struct TcpTransport {
    address: String,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl Transport for TcpTransport {
    fn close(&mut self) -> RemoteResult<()> {
        match self.stream.take() {
            Some(stream) => {
                trace!("closing tcp connection to {}", self.address);
                stream
                    .shutdown(Shutdown::Both)
                    .map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
            }
            None => Ok(()),
        }
    }
}

/// Authenticated libsmbclient context bound to the server root
pub struct PavaoSession {
    config: PavaoBackend,
    server: String,
    initiator: NtlmInitiator,
    client: Option<SmbClient>,
}

impl PavaoSession {
    fn client(&self) -> RemoteResult<&SmbClient> {
        self.client.as_ref().ok_or_else(|| {
            RemoteError::new_ex(RemoteErrorType::NotConnected, "session is logged off")
        })
    }
}

impl Session for PavaoSession {
    type Share = SmbFs;

    fn list_share_names(&mut self) -> RemoteResult<Vec<String>> {
        trace!("listing shares on {}", self.server);
        let dirents = self
            .client()?
            .list_dir("")
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::ProtocolError, e))?;
        Ok(dirents
            .iter()
            .filter(|d| smb_utils::is_disk_share(d))
            .map(|d| d.name().to_string())
            .collect())
    }

    fn mount(&mut self, share: &str) -> RemoteResult<SmbFs> {
        self.client()?;
        let share = match share.starts_with('/') {
            true => share.to_string(),
            false => format!("/{}", share),
        };
        trace!("mounting {}{}", self.server, share);
        let client = SmbClient::new(
            self.config
                .credentials(&self.server, &share, &self.initiator),
            self.config.options(),
        )
        .map_err(|e| RemoteError::new_ex(RemoteErrorType::ConnectionError, e))?;
        let mut fs = SmbFs {
            client: Some(client),
            share,
            wrkdir: PathBuf::from("/"),
        };
        fs.connect()?;
        Ok(fs)
    }

    fn logoff(&mut self) -> RemoteResult<()> {
        if self.client.take().is_some() {
            debug!("logged off from {}", self.server);
        }
        Ok(())
    }
}

/// Mounted SMB share
pub struct SmbFs {
    client: Option<SmbClient>,
    share: String,
    wrkdir: PathBuf,
}

impl SmbFs {
    /// Name of the mounted share
    pub fn share(&self) -> &str {
        &self.share
    }

    /// Return a reference to the inner `pavao::SmbClient`, if mounted
    pub fn client(&self) -> Option<&SmbClient> {
        self.client.as_ref()
    }

    // -- private

    fn check_connection(&self) -> RemoteResult<&SmbClient> {
        trace!("checking connection...");
        match self.client.as_ref() {
            Some(client) => Ok(client),
            None => {
                error!("share {} is not mounted", self.share);
                Err(RemoteError::new_ex(
                    RemoteErrorType::NotConnected,
                    "share is not mounted",
                ))
            }
        }
    }

    fn get_uri<P: AsRef<Path>>(&self, p: P) -> String {
        let p = path_utils::absolutize(self.wrkdir.as_path(), p.as_ref());
        p.to_string_lossy().to_string()
    }

    fn stat_uri(&self, uri: &str) -> RemoteResult<File> {
        trace!("get stat for {}", uri);
        self.check_connection()?
            .stat(uri)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::StatFailed, e))
            .map(|stat| smb_utils::smbstat_to_file(uri, stat))
    }

    fn open_with_options(
        &self,
        path: &Path,
        metadata: &Metadata,
        options: SmbOpenOptions,
        mut reader: Box<dyn Read>,
    ) -> RemoteResult<u64> {
        let client = self.check_connection()?;
        let path = self.get_uri(path);
        let mode = u32::from(metadata.mode.unwrap_or_else(|| UnixPex::from(0o644))) as mode_t;
        let mut file = client
            .open_with(path, options.mode(mode))
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotOpenFile, e))?;
        io::copy(&mut reader, &mut file)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
    }
}

impl RemoteFs for SmbFs {
    fn connect(&mut self) -> RemoteResult<Welcome> {
        // stat the root to check whether the share is reachable
        let root = self.get_uri("/");
        self.stat_uri(&root)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::ConnectionError, e))?;
        debug!("share {} mounted", self.share);
        Ok(Welcome::default())
    }

    fn disconnect(&mut self) -> RemoteResult<()> {
        if self.client.take().is_some() {
            debug!("share {} unmounted", self.share);
        }
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        self.client.is_some()
    }

    fn pwd(&mut self) -> RemoteResult<PathBuf> {
        self.check_connection().map(|_| self.wrkdir.clone())
    }

    fn change_dir(&mut self, dir: &Path) -> RemoteResult<PathBuf> {
        self.check_connection()?;
        let dir = path_utils::absolutize(self.wrkdir.as_path(), dir);
        trace!("changing directory to {}", dir.display());
        if self.stat(dir.as_path())?.is_dir() {
            self.wrkdir = dir;
            debug!("new working directory: {}", self.wrkdir.display());
            Ok(self.wrkdir.clone())
        } else {
            error!("cannot enter directory {}. Not a directory", dir.display());
            Err(RemoteError::new_ex(
                RemoteErrorType::BadFile,
                "not a directory",
            ))
        }
    }

    fn list_dir(&mut self, path: &Path) -> RemoteResult<Vec<File>> {
        let client = self.check_connection()?;
        let path = self.get_uri(path);
        trace!("listing files at {}", path);
        let dirents = client
            .list_dir(path.as_str())
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::StatFailed, e))?;
        // entries are not stat'd; only `.` and `..` are skipped
        Ok(dirents
            .iter()
            .filter_map(|d| smb_utils::dirent_to_file(Path::new(&path), d))
            .collect())
    }

    fn stat(&mut self, path: &Path) -> RemoteResult<File> {
        let path = self.get_uri(path);
        self.stat_uri(&path)
    }

    fn setstat(&mut self, _path: &Path, _metadata: Metadata) -> RemoteResult<()> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn exists(&mut self, path: &Path) -> RemoteResult<bool> {
        trace!("checking if {} exists...", path.display());
        match self.stat(path) {
            Ok(_) => Ok(true),
            Err(RemoteError {
                kind: RemoteErrorType::StatFailed,
                ..
            }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn remove_file(&mut self, path: &Path) -> RemoteResult<()> {
        let client = self.check_connection()?;
        let path = self.get_uri(path);
        trace!("removing file {}", path);
        client
            .unlink(path)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotRemoveFile, e))
    }

    fn remove_dir(&mut self, path: &Path) -> RemoteResult<()> {
        let client = self.check_connection()?;
        let path = self.get_uri(path);
        trace!("removing directory at {}", path);
        client
            .rmdir(path)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotRemoveFile, e))
    }

    fn create_dir(&mut self, path: &Path, mode: UnixPex) -> RemoteResult<()> {
        if self.exists(path)? {
            return Err(RemoteError::new(RemoteErrorType::DirectoryAlreadyExists));
        }
        let client = self.check_connection()?;
        let path = self.get_uri(path);
        trace!("making directory at {}", path);
        client
            .mkdir(path, SmbMode::from(u32::from(mode) as mode_t))
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::FileCreateDenied, e))
    }

    fn symlink(&mut self, _path: &Path, _target: &Path) -> RemoteResult<()> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn copy(&mut self, _src: &Path, _dest: &Path) -> RemoteResult<()> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn mov(&mut self, src: &Path, dest: &Path) -> RemoteResult<()> {
        let client = self.check_connection()?;
        let src = self.get_uri(src);
        let dest = self.get_uri(dest);
        trace!("moving {} to {}", src, dest);
        client
            .rename(src, dest)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::ProtocolError, e))
    }

    fn exec(&mut self, _cmd: &str) -> RemoteResult<(u32, String)> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn append_file(
        &mut self,
        path: &Path,
        metadata: &Metadata,
        reader: Box<dyn Read + Send>,
    ) -> RemoteResult<u64> {
        trace!("opening file at {} for append", path.display());
        // the file must exist; callers fall back to `create_file`
        self.open_with_options(
            path,
            metadata,
            SmbOpenOptions::default().append(true).write(true),
            reader,
        )
    }

    fn create_file(
        &mut self,
        path: &Path,
        metadata: &Metadata,
        reader: Box<dyn Read + Send>,
    ) -> RemoteResult<u64> {
        trace!("creating file at {}", path.display());
        self.open_with_options(
            path,
            metadata,
            SmbOpenOptions::default()
                .create(true)
                .truncate(true)
                .write(true),
            reader,
        )
    }

    fn open_file(&mut self, path: &Path, mut dest: Box<dyn Write + Send>) -> RemoteResult<u64> {
        let client = self.check_connection()?;
        let path = self.get_uri(path);
        trace!("opening file at {} for read", path);
        let mut file = client
            .open_with(path, SmbOpenOptions::default().read(true))
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::CouldNotOpenFile, e))?;
        io::copy(&mut file, &mut dest).map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
    }

    fn append(&mut self, _path: &Path, _metadata: &Metadata) -> RemoteResult<WriteStream> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn create(&mut self, _path: &Path, _metadata: &Metadata) -> RemoteResult<WriteStream> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn open(&mut self, _path: &Path) -> RemoteResult<ReadStream> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }
}
