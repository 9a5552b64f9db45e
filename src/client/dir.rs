//! # dir
//!
//! Directory operations on the mounted share

use std::path::Path;

use remotefs::fs::UnixPex;
use remotefs::{File, RemoteFs};

use super::SmbClient;
use crate::backend::SmbBackend;
use crate::error::ClientError;
use crate::result::OperationResult;

/// Message returned when deleting a directory which still has entries
pub const DIRECTORY_NOT_EMPTY: &str = "directory is not empty";

impl<B: SmbBackend> SmbClient<B> {
    /// Create directory `name`
    pub fn create_dir(&mut self, name: &str) -> OperationResult {
        let result = self.share_mut().and_then(|share| {
            trace!("creating directory {}", name);
            share
                .create_dir(Path::new(name), UnixPex::from(0o755))
                .map_err(ClientError::Operation)
        });
        match result {
            Ok(()) => OperationResult::ok("Folder created successfully"),
            Err(err) => err.into(),
        }
    }

    /// Rename (or move) directory `old_path` to `new_path`
    pub fn rename_dir(&mut self, old_path: &str, new_path: &str) -> OperationResult {
        match self.rename(old_path, new_path) {
            Ok(()) => OperationResult::ok("Folder renamed successfully"),
            Err(err) => err.into(),
        }
    }

    /// Whether `name` can be listed. Listing failures are reported and yield `false`.
    pub fn dir_exists(&mut self, name: &str) -> bool {
        match self.list(name) {
            Ok(_) => true,
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Delete directory `name`, only if it is empty.
    pub fn delete_dir(&mut self, name: &str) -> OperationResult {
        let entries = match self.list(name) {
            Ok(entries) => entries,
            Err(err) => return err.into(),
        };
        if !entries.is_empty() {
            debug!("{} has {} entries; not removing it", name, entries.len());
            return OperationResult::failed(DIRECTORY_NOT_EMPTY);
        }
        let result = self.share_mut().and_then(|share| {
            trace!("removing directory {}", name);
            share
                .remove_dir(Path::new(name))
                .map_err(ClientError::Operation)
        });
        match result {
            Ok(()) => OperationResult::ok("Folder deleted successfully"),
            Err(err) => err.into(),
        }
    }

    /// Whether `name` is a directory. Stat failures are reported and yield `false`.
    pub fn is_dir(&mut self, name: &str) -> bool {
        let lookup = self.share_mut().and_then(|share| {
            share
                .stat(Path::new(name))
                .map_err(ClientError::Operation)
        });
        match lookup {
            Ok(file) => file.is_dir(),
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    /// Names of the entries in directory `name`.
    ///
    /// Returns `None` both when the listing fails and when the directory is
    /// empty; use [`SmbClient::try_list_files_in_dir`] to tell them apart.
    pub fn list_files_in_dir(&mut self, name: &str) -> Option<Vec<String>> {
        match self.try_list_files_in_dir(name) {
            Ok(names) if names.is_empty() => {
                self.report(format!("no files found in {}", name));
                None
            }
            Ok(names) => Some(names),
            Err(err) => {
                self.report(&err);
                None
            }
        }
    }

    /// Names of the entries in directory `name`, returning failures
    pub fn try_list_files_in_dir(&mut self, name: &str) -> Result<Vec<String>, ClientError> {
        self.list(name)
            .map(|entries| entries.iter().map(|f| f.name()).collect())
    }

    // -- private

    fn list(&mut self, name: &str) -> Result<Vec<File>, ClientError> {
        trace!("listing {}", name);
        self.share_mut()?
            .list_dir(Path::new(name))
            .map_err(ClientError::Operation)
    }
}
