//! Fixed-width rendering of entry metadata.

use crate::metadata::{EntryMetadata, EntryType, Permissions};
use std::ffi::OsStr;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SEPARATOR_WIDTH: usize = 80;

const PERMISSION_CHARS: [(Permissions, char); 9] = [
    (Permissions::OWNER_READ, 'r'),
    (Permissions::OWNER_WRITE, 'w'),
    (Permissions::OWNER_EXEC, 'x'),
    (Permissions::GROUP_READ, 'r'),
    (Permissions::GROUP_WRITE, 'w'),
    (Permissions::GROUP_EXEC, 'x'),
    (Permissions::OTHER_READ, 'r'),
    (Permissions::OTHER_WRITE, 'w'),
    (Permissions::OTHER_EXEC, 'x'),
];

/// Renders a type character followed by nine `rwx` flags, e.g. `drwxr-x---`.
pub(crate) fn permission_string(entry_type: EntryType, permissions: Permissions) -> String {
    let mut s = String::with_capacity(10);
    s.push(match entry_type {
        EntryType::Directory => 'd',
        EntryType::Symlink => 'l',
        EntryType::Regular | EntryType::Other => '-',
    });
    for (flag, c) in PERMISSION_CHARS.iter() {
        s.push(if permissions.contains(*flag) { *c } else { '-' });
    }
    s
}

pub(crate) fn header() -> String {
    format!(
        "{:<12}{:<8}{:<8}{:<10}{:<20} NAME",
        "PERMISSIONS", "OWNER", "GROUP", "SIZE", "MODIFIED"
    )
}

pub(crate) fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

pub(crate) fn row(meta: &EntryMetadata, name: &OsStr) -> String {
    format!(
        "{:<12}{:<8}{:<8}{:<10}{:<20} {}",
        permission_string(meta.entry_type, meta.permissions),
        meta.owner,
        meta.group,
        meta.size,
        meta.modified_at.format(TIME_FORMAT).to_string(),
        name.to_string_lossy(),
    )
}
