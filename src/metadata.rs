//! Resolution of per-entry metadata without following symbolic links.

use crate::error::{Error, Result};
use chrono::{DateTime, Local};
use std::ffi::{CStr, OsStr};
use std::fmt;
use std::fs;
use std::mem;
use std::os::unix::fs::MetadataExt as _;
use std::path::Path;
use std::ptr;

const MAX_LOOKUP_BUFFER: usize = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EntryType {
    Regular,
    Directory,
    Symlink,
    Other,
}

impl EntryType {
    fn from_mode(mode: u32) -> Self {
        match mode & libc::S_IFMT as u32 {
            m if m == libc::S_IFREG as u32 => Self::Regular,
            m if m == libc::S_IFDIR as u32 => Self::Directory,
            m if m == libc::S_IFLNK as u32 => Self::Symlink,
            _ => Self::Other,
        }
    }
}

bitflags::bitflags! {
    /// Owner/group/other read/write/execute bits.
    pub(crate) struct Permissions: u32 {
        const OWNER_READ = 0o400;
        const OWNER_WRITE = 0o200;
        const OWNER_EXEC = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC = 0o010;
        const OTHER_READ = 0o004;
        const OTHER_WRITE = 0o002;
        const OTHER_EXEC = 0o001;
    }
}

/// A numeric owner or group id, with its account name when one is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Identity {
    pub id: u32,
    pub name: Option<String>,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name {
            Some(ref name) => f.pad(name),
            None => f.pad(&self.id.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EntryMetadata {
    pub entry_type: EntryType,
    pub permissions: Permissions,
    pub owner: Identity,
    pub group: Identity,
    pub size: u64,
    pub modified_at: DateTime<Local>,
}

/// Best-effort mapping from numeric ids to account names.
///
/// `None` means "no such account" and is a normal answer, not a failure.
pub(crate) trait IdentityLookup {
    fn user_name(&self, uid: u32) -> Option<String>;
    fn group_name(&self, gid: u32) -> Option<String>;
}

/// Looks names up in the system user and group databases.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SystemIdentity;

/// Never resolves a name; every id renders numerically.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct NumericIdentity;

impl IdentityLookup for NumericIdentity {
    fn user_name(&self, _uid: u32) -> Option<String> {
        None
    }

    fn group_name(&self, _gid: u32) -> Option<String> {
        None
    }
}

impl IdentityLookup for SystemIdentity {
    fn user_name(&self, uid: u32) -> Option<String> {
        let mut buf = vec![0 as libc::c_char; initial_buffer_size(libc::_SC_GETPW_R_SIZE_MAX)];
        loop {
            let mut pwd: libc::passwd = unsafe { mem::zeroed() };
            let mut result: *mut libc::passwd = ptr::null_mut();
            let rc = unsafe {
                libc::getpwuid_r(uid, &mut pwd, buf.as_mut_ptr(), buf.len(), &mut result)
            };
            match rc {
                libc::ERANGE if buf.len() < MAX_LOOKUP_BUFFER => {
                    let len = buf.len() * 2;
                    buf.resize(len, 0);
                }
                0 if !result.is_null() => {
                    let name = unsafe { CStr::from_ptr(pwd.pw_name) };
                    return Some(name.to_string_lossy().into_owned());
                }
                _ => {
                    tracing::trace!(uid, rc, "no user name");
                    return None;
                }
            }
        }
    }

    fn group_name(&self, gid: u32) -> Option<String> {
        let mut buf = vec![0 as libc::c_char; initial_buffer_size(libc::_SC_GETGR_R_SIZE_MAX)];
        loop {
            let mut grp: libc::group = unsafe { mem::zeroed() };
            let mut result: *mut libc::group = ptr::null_mut();
            let rc = unsafe {
                libc::getgrgid_r(gid, &mut grp, buf.as_mut_ptr(), buf.len(), &mut result)
            };
            match rc {
                libc::ERANGE if buf.len() < MAX_LOOKUP_BUFFER => {
                    let len = buf.len() * 2;
                    buf.resize(len, 0);
                }
                0 if !result.is_null() => {
                    let name = unsafe { CStr::from_ptr(grp.gr_name) };
                    return Some(name.to_string_lossy().into_owned());
                }
                _ => {
                    tracing::trace!(gid, rc, "no group name");
                    return None;
                }
            }
        }
    }
}

fn initial_buffer_size(name: libc::c_int) -> usize {
    match unsafe { libc::sysconf(name) } {
        n if n > 0 => n as usize,
        _ => 1024,
    }
}

/// Resolves the metadata of `dir/name`, reporting on a symlink itself rather
/// than on its target.
#[tracing::instrument(level = "debug", skip(identity))]
pub(crate) fn resolve(
    dir: &Path,
    name: &OsStr,
    identity: &dyn IdentityLookup,
) -> Result<EntryMetadata> {
    let path = dir.join(name);
    let unavailable = |source| Error::MetadataUnavailable {
        path: path.clone(),
        source,
    };

    let stat = fs::symlink_metadata(&path).map_err(unavailable)?;
    let modified_at = stat.modified().map_err(unavailable)?;

    let mode = stat.mode();
    Ok(EntryMetadata {
        entry_type: EntryType::from_mode(mode),
        permissions: Permissions::from_bits_truncate(mode),
        owner: Identity {
            id: stat.uid(),
            name: identity.user_name(stat.uid()),
        },
        group: Identity {
            id: stat.gid(),
            name: identity.group_name(stat.gid()),
        },
        size: stat.size(),
        modified_at: DateTime::from(modified_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::{symlink, PermissionsExt as _};

    #[test]
    fn symlink_to_directory_is_reported_as_link() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        symlink(dir.path().join("target"), dir.path().join("link")).unwrap();

        let meta = resolve(dir.path(), OsStr::new("link"), &NumericIdentity).unwrap();
        assert_eq!(meta.entry_type, EntryType::Symlink);

        let meta = resolve(dir.path(), OsStr::new("target"), &NumericIdentity).unwrap();
        assert_eq!(meta.entry_type, EntryType::Directory);
    }

    #[test]
    fn dangling_symlink_still_resolves() {
        let dir = tempfile::tempdir().unwrap();
        symlink(dir.path().join("nowhere"), dir.path().join("dangling")).unwrap();

        let meta = resolve(dir.path(), OsStr::new("dangling"), &NumericIdentity).unwrap();
        assert_eq!(meta.entry_type, EntryType::Symlink);
    }

    #[test]
    fn regular_file_size_and_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data");
        fs::write(&path, b"hello").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        let meta = resolve(dir.path(), OsStr::new("data"), &NumericIdentity).unwrap();
        assert_eq!(meta.entry_type, EntryType::Regular);
        assert_eq!(meta.size, 5);
        assert_eq!(
            meta.permissions,
            Permissions::OWNER_READ | Permissions::OWNER_WRITE | Permissions::GROUP_READ
        );
    }

    #[test]
    fn vanished_entry_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(dir.path(), OsStr::new("gone"), &NumericIdentity).unwrap_err();
        assert!(matches!(err, Error::MetadataUnavailable { .. }));
    }

    #[test]
    fn unknown_ids_fall_back_to_numbers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("f"), b"").unwrap();

        let meta = resolve(dir.path(), OsStr::new("f"), &NumericIdentity).unwrap();
        assert_eq!(meta.owner.name, None);
        assert_eq!(meta.owner.to_string(), meta.owner.id.to_string());
        assert_eq!(meta.group.to_string(), meta.group.id.to_string());
    }

    #[test]
    fn system_lookup_tolerates_missing_accounts() {
        // Ids this large are not expected to exist in any account database.
        assert_eq!(SystemIdentity.user_name(u32::MAX - 7), None);
        assert_eq!(SystemIdentity.group_name(u32::MAX - 7), None);
    }

    #[test]
    fn entry_type_from_mode_bits() {
        assert_eq!(EntryType::from_mode(libc::S_IFREG as u32 | 0o644), EntryType::Regular);
        assert_eq!(EntryType::from_mode(libc::S_IFDIR as u32 | 0o755), EntryType::Directory);
        assert_eq!(EntryType::from_mode(libc::S_IFLNK as u32 | 0o777), EntryType::Symlink);
        assert_eq!(EntryType::from_mode(libc::S_IFIFO as u32 | 0o600), EntryType::Other);
    }
}
