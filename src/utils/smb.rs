//! # smb utils
//!
//! Conversions between pavao and remotefs types

use libc::mode_t;
use pavao::{SmbDirent, SmbDirentType, SmbStat};
use remotefs::{
    fs::{FileType, Metadata, UnixPex},
    File,
};
use std::path::{Path, PathBuf};

/// Convert `SmbStat` to `File`
pub fn smbstat_to_file<S: AsRef<str>>(uri: S, stat: SmbStat) -> File {
    let mode = mode_t::from(stat.mode);
    File {
        path: PathBuf::from(uri.as_ref()),
        metadata: Metadata::default()
            .accessed(stat.accessed)
            .created(stat.created)
            .file_type(get_file_type_from_stat(&stat))
            .gid(stat.gid)
            .mode(UnixPex::from(mode as u32))
            .modified(stat.modified)
            .size(stat.size)
            .uid(stat.uid),
    }
}

/// Convert a directory entry of `parent` to `File`, without querying the server.
/// Returns `None` for the `.` and `..` links.
pub fn dirent_to_file(parent: &Path, dirent: &SmbDirent) -> Option<File> {
    if !is_child_name(dirent.name()) {
        return None;
    }
    Some(File {
        path: parent.join(dirent.name()),
        metadata: Metadata::default().file_type(dirent_file_type(dirent.get_type())),
    })
}

/// Whether `name` designates a real child of the listed directory
pub fn is_child_name(name: &str) -> bool {
    !matches!(name, "." | "..")
}

/// File type of a directory entry; anything which is neither a directory nor a link
/// is reported as a file
pub fn dirent_file_type(dirent_type: SmbDirentType) -> FileType {
    match dirent_type {
        SmbDirentType::Dir => FileType::Directory,
        SmbDirentType::Link => FileType::Symlink,
        _ => FileType::File,
    }
}

/// Whether a server level entry is a disk share
pub fn is_disk_share(dirent: &SmbDirent) -> bool {
    dirent.get_type() == SmbDirentType::FileShare
}

fn get_file_type_from_stat(stat: &SmbStat) -> FileType {
    match stat.mode {
        mode if mode.is_dir() => FileType::Directory,
        mode if mode.is_symlink() => FileType::Symlink,
        _ => FileType::File,
    }
}
