//! # file
//!
//! File operations on the mounted share

use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use remotefs::fs::Metadata;
use remotefs::RemoteFs;

use super::SmbClient;
use crate::backend::SmbBackend;
use crate::error::ClientError;
use crate::result::OperationResult;

impl<B: SmbBackend> SmbClient<B> {
    /// Append `line` to `file_name`, on a new line if the file is not empty
    pub fn append_line(&mut self, file_name: &str, line: &str) -> OperationResult {
        self.append_bytes(file_name, line.as_bytes(), true)
    }

    /// Append `text` to `file_name`, as is
    pub fn append_string(&mut self, file_name: &str, text: &str) -> OperationResult {
        self.append_bytes(file_name, text.as_bytes(), false)
    }

    /// Append `data` at the end of `file_name`, creating the file if it cannot be
    /// opened for append.
    ///
    /// When `add_newline_prefix` is set and the file is not empty, a `\n` is
    /// written before `data`.
    pub fn append_bytes(
        &mut self,
        file_name: &str,
        data: &[u8],
        add_newline_prefix: bool,
    ) -> OperationResult {
        match self.try_append_bytes(file_name, data, add_newline_prefix) {
            Ok(written) => {
                debug!("appended {} bytes to {}", written, file_name);
                OperationResult::ok("Bytes appended successfully")
            }
            Err(err) => err.into(),
        }
    }

    /// Copy the local file at `source` to `dest` on the share, replacing `dest`
    pub fn copy_file<P: AsRef<Path>>(&mut self, source: P, dest: &str) -> OperationResult {
        let share = match self.share_mut() {
            Ok(share) => share,
            Err(err) => return err.into(),
        };
        let source = source.as_ref();
        trace!("copying {} to {}", source.display(), dest);
        let reader = match std::fs::File::open(source) {
            Ok(reader) => reader,
            Err(err) => {
                return OperationResult::from_error(format!("{}: {}", source.display(), err))
            }
        };
        let size = reader.metadata().map(|m| m.len()).unwrap_or_default();
        match share.create_file(
            Path::new(dest),
            &Metadata::default().size(size),
            Box::new(reader),
        ) {
            Ok(written) => {
                debug!("copied {} bytes to {}", written, dest);
                OperationResult::ok("File copied successfully")
            }
            Err(err) => OperationResult::from_error(err),
        }
    }

    /// Read the whole content of `file_name`.
    ///
    /// Any failure is reported to the diagnostic sink and yields an empty string,
    /// so a failed read looks like an empty file. Use [`SmbClient::try_read_file`]
    /// to tell them apart.
    ///
    /// Content is decoded as UTF-8 and invalid sequences are replaced with
    /// `U+FFFD`; use [`SmbClient::try_read_bytes`] for the raw content.
    pub fn read_file(&mut self, file_name: &str) -> String {
        self.try_read_file(file_name).unwrap_or_else(|err| {
            self.report(&err);
            String::new()
        })
    }

    /// Read the whole content of `file_name` as lossy UTF-8, returning failures
    pub fn try_read_file(&mut self, file_name: &str) -> Result<String, ClientError> {
        self.try_read_bytes(file_name)
            .map(|data| String::from_utf8_lossy(&data).into_owned())
    }

    /// Read the raw content of `file_name`, returning failures
    pub fn try_read_bytes(&mut self, file_name: &str) -> Result<Vec<u8>, ClientError> {
        let share = self.share_mut()?;
        trace!("reading {}", file_name);
        let buffer = SharedBuffer::default();
        share
            .open_file(Path::new(file_name), Box::new(buffer.clone()))
            .map_err(ClientError::Operation)?;
        Ok(buffer.take())
    }

    /// Remove `file_name`
    pub fn remove_file(&mut self, file_name: &str) -> OperationResult {
        match self.try_remove_file(file_name) {
            Ok(()) => OperationResult::ok("File removed successfully"),
            Err(err) => err.into(),
        }
    }

    /// Alias of [`SmbClient::remove_file`]
    pub fn delete_file(&mut self, file_name: &str) -> OperationResult {
        match self.try_remove_file(file_name) {
            Ok(()) => OperationResult::ok("File deleted successfully"),
            Err(err) => err.into(),
        }
    }

    /// Rename (or move) `old_path` to `new_path`
    pub fn rename_file(&mut self, old_path: &str, new_path: &str) -> OperationResult {
        match self.rename(old_path, new_path) {
            Ok(()) => OperationResult::ok("File renamed successfully"),
            Err(err) => err.into(),
        }
    }

    /// Whether `file_name` can be stat'd. Lookup failures are reported and yield `false`.
    pub fn file_exists(&mut self, file_name: &str) -> bool {
        let lookup = self.share_mut().and_then(|share| {
            share
                .stat(Path::new(file_name))
                .map_err(ClientError::Operation)
        });
        match lookup {
            Ok(_) => true,
            Err(err) => {
                self.report(&err);
                false
            }
        }
    }

    // -- private

    fn try_append_bytes(
        &mut self,
        file_name: &str,
        data: &[u8],
        add_newline_prefix: bool,
    ) -> Result<u64, ClientError> {
        let share = self.share_mut()?;
        let path = Path::new(file_name);
        // a file which cannot be stat'd is about to be created
        let size = share.stat(path).map(|f| f.metadata().size).unwrap_or(0);
        let mut payload = Vec::with_capacity(data.len() + 1);
        if size > 0 && add_newline_prefix {
            payload.push(b'\n');
        }
        payload.extend_from_slice(data);
        let metadata = Metadata::default().size(payload.len() as u64);
        trace!("appending {} bytes to {} at {}", payload.len(), file_name, size);
        match share.append_file(path, &metadata, Box::new(Cursor::new(payload.clone()))) {
            Ok(written) => Ok(written),
            Err(err) => {
                debug!("could not open {} for append ({}); creating it", file_name, err);
                share
                    .create_file(path, &metadata, Box::new(Cursor::new(payload)))
                    .map_err(ClientError::Operation)
            }
        }
    }

    fn try_remove_file(&mut self, file_name: &str) -> Result<(), ClientError> {
        trace!("removing file {}", file_name);
        self.share_mut()?
            .remove_file(Path::new(file_name))
            .map_err(ClientError::Operation)
    }

    pub(super) fn rename(&mut self, old_path: &str, new_path: &str) -> Result<(), ClientError> {
        trace!("renaming {} to {}", old_path, new_path);
        self.share_mut()?
            .mov(Path::new(old_path), Path::new(new_path))
            .map_err(ClientError::Operation)
    }
}

/// Write sink whose content is retrieved after the share filled it
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn take(&self) -> Vec<u8> {
        let mut data = self.0.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *data)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut data = self.0.lock().unwrap_or_else(|e| e.into_inner());
        data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
