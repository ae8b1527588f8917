//! # Search Path Resolution
//!
//! The kernel hands searches either a drive path or a UNC path:
//!
//! ```text
//! C:\DOCS\*.TXT               drive C (attached share), rest "DOCS\*.TXT"
//! \\VBOXSRV\share\DOCS\*.TXT  share "share" on the host, rest "DOCS\*.TXT"
//! ```
//!
//! The rest is split at its last backslash into the directory to open and
//! the pattern to match.

use crate::codec::CCHMAXPATHCOMP;
use crate::error::Os2Error;

/// Longest path the guest accepts
pub const CCHMAXPATH: usize = 260;

/// Longest UNC server name
const MAX_SERVER_NAME: usize = 11;

/// Server names that address the host
const HOST_SERVER_PREFIXES: [&[u8]; 4] = [b"vboxsrv", b"vboxsvr", b"vboxfs", b"vboxsf"];

/// Guest path separator
pub const SEPARATOR: u8 = b'\\';

/// Where a search path is rooted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRoot<'a> {
    /// Attached drive letter (upper case)
    Drive(u8),
    /// Host share named in a UNC path
    Unc { share: &'a [u8] },
}

/// A resolved search path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedPath<'a> {
    pub root: PathRoot<'a>,
    /// Path below the root, without a leading separator
    pub rest: &'a [u8],
}

impl<'a> ParsedPath<'a> {
    /// Directory part and pattern part of `rest`
    pub fn split(&self) -> (&'a [u8], &'a [u8]) {
        split_dir_pattern(self.rest)
    }
}

/// Split at the last separator. A path without one is all pattern.
pub fn split_dir_pattern(path: &[u8]) -> (&[u8], &[u8]) {
    match path.iter().rposition(|&b| b == SEPARATOR) {
        Some(i) => (&path[..i], &path[i + 1..]),
        None => (&path[..0], path),
    }
}

fn strip_separator(path: &[u8]) -> &[u8] {
    path.strip_prefix(&[SEPARATOR]).unwrap_or(path)
}

/// Resolve a guest search path.
pub fn parse_search_path(path: &[u8]) -> Result<ParsedPath<'_>, Os2Error> {
    if path.len() >= 2 && path[1] == b':' {
        let drive = path[0].to_ascii_uppercase();
        if !drive.is_ascii_uppercase() {
            return Err(Os2Error::InvalidDrive);
        }
        let rest = strip_separator(&path[2..]);
        if rest.len() > CCHMAXPATH {
            return Err(Os2Error::FilenameExcedRange);
        }
        return Ok(ParsedPath {
            root: PathRoot::Drive(drive),
            rest,
        });
    }

    if let Some(unc) = path.strip_prefix(b"\\\\") {
        let server_end = unc
            .iter()
            .position(|&b| b == SEPARATOR)
            .ok_or(Os2Error::InvalidName)?;
        if server_end > MAX_SERVER_NAME {
            return Err(Os2Error::InvalidName);
        }
        let server = &unc[..server_end];
        let known = HOST_SERVER_PREFIXES.iter().any(|prefix| {
            server.len() >= prefix.len() && server[..prefix.len()].eq_ignore_ascii_case(prefix)
        });
        if !known {
            return Err(Os2Error::BadNetName);
        }

        let tail = &unc[server_end + 1..];
        let share_end = tail.iter().position(|&b| b == SEPARATOR).unwrap_or(tail.len());
        if share_end == 0 || share_end > CCHMAXPATHCOMP - 1 {
            return Err(Os2Error::InvalidName);
        }
        let share = &tail[..share_end];
        let rest = strip_separator(&tail[share_end..]);
        if rest.len() > CCHMAXPATH {
            return Err(Os2Error::FilenameExcedRange);
        }

        return Ok(ParsedPath {
            root: PathRoot::Unc { share },
            rest,
        });
    }

    Err(Os2Error::PathNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_drive_path() {
        let p = parse_search_path(b"c:\\SHARE\\*.TXT").unwrap();
        assert_eq!(p.root, PathRoot::Drive(b'C'));
        assert_eq!(p.rest, b"SHARE\\*.TXT");
        assert_eq!(p.split(), (&b"SHARE"[..], &b"*.TXT"[..]));
    }

    #[test]
    fn test_drive_root() {
        let p = parse_search_path(b"D:\\*").unwrap();
        assert_eq!(p.split(), (&b""[..], &b"*"[..]));
        assert_eq!(parse_search_path(b"1:\\*"), Err(Os2Error::InvalidDrive));
    }

    #[test]
    fn test_unc_path() {
        let p = parse_search_path(b"\\\\VBoxSrv\\docs\\sub\\a*").unwrap();
        assert_eq!(p.root, PathRoot::Unc { share: b"docs" });
        assert_eq!(p.rest, b"sub\\a*");

        let p = parse_search_path(b"\\\\vboxsf\\docs").unwrap();
        assert_eq!(p.rest, b"");
    }

    #[test]
    fn test_unc_errors() {
        assert_eq!(parse_search_path(b"\\\\server\\docs\\*"), Err(Os2Error::BadNetName));
        assert_eq!(parse_search_path(b"\\\\vboxsrv"), Err(Os2Error::InvalidName));
        assert_eq!(
            parse_search_path(b"\\\\vboxsrvtoolong\\docs\\*"),
            Err(Os2Error::InvalidName)
        );
        assert_eq!(parse_search_path(b"\\\\vboxsrv\\\\*"), Err(Os2Error::InvalidName));
    }

    #[test]
    fn test_relative_and_long_paths() {
        assert_eq!(parse_search_path(b"DOCS\\*"), Err(Os2Error::PathNotFound));

        let mut long = b"C:\\".to_vec();
        long.extend_from_slice(&vec![b'a'; CCHMAXPATH + 1]);
        assert_eq!(parse_search_path(&long), Err(Os2Error::FilenameExcedRange));
    }
}
