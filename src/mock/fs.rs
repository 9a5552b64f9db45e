//! ## Memory fs
//!
//! In-memory share used by the mock backend

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use remotefs::fs::{File, FileType, Metadata, ReadStream, UnixPex, Welcome, WriteStream};
use remotefs::{RemoteError, RemoteErrorType, RemoteFs, RemoteResult};

use super::MockState;
use crate::utils::path as path_utils;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    File(Vec<u8>),
    Dir,
    Link(PathBuf),
}

pub type Tree = BTreeMap<PathBuf, Node>;

/// Share whose content lives in the mock state
pub struct MemoryFs {
    state: Rc<RefCell<MockState>>,
    mounted: bool,
    wrkdir: PathBuf,
}

impl MemoryFs {
    pub fn new(state: Rc<RefCell<MockState>>) -> Self {
        state
            .borrow_mut()
            .tree
            .entry(PathBuf::from("/"))
            .or_insert(Node::Dir);
        Self {
            state,
            mounted: true,
            wrkdir: PathBuf::from("/"),
        }
    }

    fn check(&self) -> RemoteResult<()> {
        match self.mounted {
            true => Ok(()),
            false => Err(RemoteError::new_ex(
                RemoteErrorType::NotConnected,
                "share is not mounted",
            )),
        }
    }

    fn uri(&self, p: &Path) -> PathBuf {
        path_utils::absolutize(self.wrkdir.as_path(), p)
    }

    fn node(&self, p: &Path) -> Option<Node> {
        self.state.borrow().tree.get(p).cloned()
    }

    fn is_dir(&self, p: &Path) -> bool {
        matches!(self.node(p), Some(Node::Dir))
    }

    fn parent_is_dir(&self, p: &Path) -> bool {
        p.parent().map(|parent| self.is_dir(parent)).unwrap_or(false)
    }

    fn children(&self, dir: &Path) -> Vec<PathBuf> {
        self.state
            .borrow()
            .tree
            .keys()
            .filter(|k| k.parent() == Some(dir))
            .cloned()
            .collect()
    }

    fn to_file(path: &Path, node: &Node) -> File {
        let metadata = match node {
            Node::Dir => Metadata::default().file_type(FileType::Directory),
            Node::Link(_) => Metadata::default().file_type(FileType::Symlink),
            Node::File(data) => Metadata::default()
                .file_type(FileType::File)
                .size(data.len() as u64),
        };
        File {
            path: path.to_path_buf(),
            metadata,
        }
    }

    fn not_found(p: &Path) -> RemoteError {
        RemoteError::new_ex(
            RemoteErrorType::NoSuchFileOrDirectory,
            format!("{}: no such file or directory", p.display()),
        )
    }

    fn read_all(mut reader: Box<dyn Read>) -> RemoteResult<Vec<u8>> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))?;
        Ok(data)
    }
}

impl RemoteFs for MemoryFs {
    fn connect(&mut self) -> RemoteResult<Welcome> {
        self.check()?;
        Ok(Welcome::default())
    }

    fn disconnect(&mut self) -> RemoteResult<()> {
        if !self.mounted {
            return Ok(());
        }
        self.mounted = false;
        let mut state = self.state.borrow_mut();
        state.journal.push(String::from("umount"));
        match state.fail_release {
            true => Err(RemoteError::new_ex(
                RemoteErrorType::ProtocolError,
                "tree disconnect failed",
            )),
            false => Ok(()),
        }
    }

    fn is_connected(&mut self) -> bool {
        self.mounted
    }

    fn pwd(&mut self) -> RemoteResult<PathBuf> {
        self.check().map(|_| self.wrkdir.clone())
    }

    fn change_dir(&mut self, dir: &Path) -> RemoteResult<PathBuf> {
        self.check()?;
        let dir = self.uri(dir);
        match self.is_dir(&dir) {
            true => {
                self.wrkdir = dir;
                Ok(self.wrkdir.clone())
            }
            false => Err(RemoteError::new_ex(
                RemoteErrorType::BadFile,
                "not a directory",
            )),
        }
    }

    fn list_dir(&mut self, path: &Path) -> RemoteResult<Vec<File>> {
        self.check()?;
        let path = self.uri(path);
        match self.node(&path) {
            Some(Node::Dir) => {}
            Some(_) => {
                return Err(RemoteError::new_ex(
                    RemoteErrorType::BadFile,
                    "not a directory",
                ))
            }
            None => return Err(Self::not_found(&path)),
        }
        let state = self.state.borrow();
        Ok(self
            .children(&path)
            .iter()
            .filter_map(|p| state.tree.get(p).map(|node| Self::to_file(p, node)))
            .collect())
    }

    fn stat(&mut self, path: &Path) -> RemoteResult<File> {
        self.check()?;
        let path = self.uri(path);
        self.node(&path)
            .map(|node| Self::to_file(&path, &node))
            .ok_or_else(|| {
                RemoteError::new_ex(
                    RemoteErrorType::StatFailed,
                    format!("{}: no such file or directory", path.display()),
                )
            })
    }

    fn setstat(&mut self, _path: &Path, _metadata: Metadata) -> RemoteResult<()> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn exists(&mut self, path: &Path) -> RemoteResult<bool> {
        self.check()?;
        let path = self.uri(path);
        Ok(self.node(&path).is_some())
    }

    fn remove_file(&mut self, path: &Path) -> RemoteResult<()> {
        self.check()?;
        let path = self.uri(path);
        match self.node(&path) {
            Some(Node::File(_)) | Some(Node::Link(_)) => {
                self.state.borrow_mut().tree.remove(&path);
                Ok(())
            }
            Some(Node::Dir) => Err(RemoteError::new_ex(
                RemoteErrorType::CouldNotRemoveFile,
                "is a directory",
            )),
            None => Err(Self::not_found(&path)),
        }
    }

    fn remove_dir(&mut self, path: &Path) -> RemoteResult<()> {
        self.check()?;
        let path = self.uri(path);
        if !self.is_dir(&path) {
            return Err(Self::not_found(&path));
        }
        if !self.children(&path).is_empty() {
            return Err(RemoteError::new_ex(
                RemoteErrorType::CouldNotRemoveFile,
                "directory not empty",
            ));
        }
        self.state.borrow_mut().tree.remove(&path);
        Ok(())
    }

    fn create_dir(&mut self, path: &Path, _mode: UnixPex) -> RemoteResult<()> {
        self.check()?;
        let path = self.uri(path);
        if self.node(&path).is_some() {
            return Err(RemoteError::new(RemoteErrorType::DirectoryAlreadyExists));
        }
        if !self.parent_is_dir(&path) {
            return Err(RemoteError::new_ex(
                RemoteErrorType::FileCreateDenied,
                "parent directory does not exist",
            ));
        }
        self.state.borrow_mut().tree.insert(path, Node::Dir);
        Ok(())
    }

    fn symlink(&mut self, _path: &Path, _target: &Path) -> RemoteResult<()> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn copy(&mut self, _src: &Path, _dest: &Path) -> RemoteResult<()> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn mov(&mut self, src: &Path, dest: &Path) -> RemoteResult<()> {
        self.check()?;
        let src = self.uri(src);
        let dest = self.uri(dest);
        if self.node(&src).is_none() {
            return Err(Self::not_found(&src));
        }
        if self.node(&dest).is_some() || !self.parent_is_dir(&dest) {
            return Err(RemoteError::new_ex(
                RemoteErrorType::ProtocolError,
                "cannot rename to destination",
            ));
        }
        let mut state = self.state.borrow_mut();
        let moved: Vec<PathBuf> = state
            .tree
            .keys()
            .filter(|k| k.starts_with(&src))
            .cloned()
            .collect();
        for old in moved {
            if let (Some(node), Ok(rel)) = (state.tree.remove(&old), old.strip_prefix(&src)) {
                let new = match rel.as_os_str().is_empty() {
                    true => dest.clone(),
                    false => dest.join(rel),
                };
                state.tree.insert(new, node);
            }
        }
        Ok(())
    }

    fn exec(&mut self, _cmd: &str) -> RemoteResult<(u32, String)> {
        Err(RemoteError::new(RemoteErrorType::UnsupportedFeature))
    }

    fn append_file(
        &mut self,
        path: &Path,
        _metadata: &Metadata,
        reader: Box<dyn Read + Send>,
    ) -> RemoteResult<u64> {
        self.check()?;
        let path = self.uri(path);
        if !matches!(self.node(&path), Some(Node::File(_))) {
            return Err(RemoteError::new_ex(
                RemoteErrorType::CouldNotOpenFile,
                format!("{}: no such file", path.display()),
            ));
        }
        let data = Self::read_all(reader)?;
        let written = data.len() as u64;
        if let Some(Node::File(content)) = self.state.borrow_mut().tree.get_mut(&path) {
            content.extend(data);
        }
        Ok(written)
    }

    fn create_file(
        &mut self,
        path: &Path,
        _metadata: &Metadata,
        reader: Box<dyn Read + Send>,
    ) -> RemoteResult<u64> {
        self.check()?;
        let path = self.uri(path);
        if self.is_dir(&path) || !self.parent_is_dir(&path) {
            return Err(RemoteError::new_ex(
                RemoteErrorType::CouldNotOpenFile,
                format!("cannot create {}", path.display()),
            ));
        }
        let data = Self::read_all(reader)?;
        let written = data.len() as u64;
        self.state.borrow_mut().tree.insert(path, Node::File(data));
        Ok(written)
    }

    fn open_file(&mut self, path: &Path, mut dest: Box<dyn Write + Send>) -> RemoteResult<u64> {
        self.check()?;
        let path = self.uri(path);
        match self.node(&path) {
            Some(Node::File(data)) => {
                io::copy(&mut data.as_slice(), &mut dest)
                    .map_err(|e| RemoteError::new_ex(RemoteErrorType::IoError, e))
            }
            Some(_) => Err(RemoteError::new_ex(
                RemoteErrorType::CouldNotOpenFile,
                "not a regular file",
            )),
            None => Err(Self::not_found(&path)),
        }
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
