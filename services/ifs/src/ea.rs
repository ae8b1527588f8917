//! # Extended Attribute Lists
//!
//! Shared folders carry no extended attributes, but the EA-returning info
//! levels still have to answer with an FEA list naming every EA the
//! caller asked for, each with an empty value.
//!
//! ```text
//! GEALIST: | cbList u32 | cbName u8 | name.. | NUL | cbName u8 | ...
//! FEALIST: | cbList u32 | fEA u8 | cbName u8 | cbValue u16 | name.. | NUL | ...
//! ```

use alloc::vec::Vec;

use crate::error::Os2Error;

/// EAOP block at the start of EA-level find buffers
pub const EAOP_SIZE: usize = 12;

/// Smallest FEA list space a find buffer must offer
pub const MIN_EA_SIZE: usize = 128;

/// Largest EA list
pub const MAX_EA_SIZE: usize = 65536;

/// cbList written when the requested list does not fit
pub const FEA_DIDNT_FIT: u32 = 0xEF;

/// Fixed part of one FEA entry
const FEA_HEADER: usize = 4;

/// Fixed part of one GEA entry (cbName + terminator)
const GEA_OVERHEAD: usize = 2;

/// Parsed GEA list: names of the requested EAs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GeaList<'a> {
    names: Vec<&'a [u8]>,
}

impl<'a> GeaList<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, Os2Error> {
        if bytes.len() < 4 {
            return Err(Os2Error::EaListInconsistent);
        }
        let cb_list = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        if cb_list > MAX_EA_SIZE {
            return Err(Os2Error::EaListTooLong);
        }
        if cb_list < 4 || cb_list > bytes.len() {
            return Err(Os2Error::EaListInconsistent);
        }

        let mut names = Vec::new();
        let mut pos = 4;
        while pos < cb_list {
            let cb_name = bytes[pos] as usize;
            let end = pos + GEA_OVERHEAD + cb_name;
            if end > cb_list {
                return Err(Os2Error::EaListInconsistent);
            }
            names.push(&bytes[pos + 1..pos + 1 + cb_name]);
            pos = end;
        }

        Ok(Self { names })
    }

    pub fn names(&self) -> &[&'a [u8]] {
        &self.names
    }

    /// Size of the matching FEA list with empty values
    pub fn fea_list_len(&self) -> usize {
        4 + self
            .names
            .iter()
            .map(|n| FEA_HEADER + n.len() + 1)
            .sum::<usize>()
    }
}

/// Build the empty-valued FEA list for `gea` in at most `max` bytes.
///
/// Returns the list and whether it had to be replaced by the 4-byte
/// "didn't fit" marker.
pub fn build_empty_fea_list(gea: &GeaList<'_>, max: usize) -> Result<(Vec<u8>, bool), Os2Error> {
    let max = max.min(MAX_EA_SIZE - 1);
    if max < 4 {
        return Err(Os2Error::BufferOverflow);
    }

    let needed = gea.fea_list_len();
    if needed > max {
        return Ok((FEA_DIDNT_FIT.to_le_bytes().to_vec(), true));
    }

    let mut out = Vec::with_capacity(needed);
    out.extend_from_slice(&(needed as u32).to_le_bytes());
    for name in gea.names() {
        out.push(0);
        out.push(name.len() as u8);
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name);
        out.push(0);
    }
    Ok((out, false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn gea_bytes(names: &[&[u8]]) -> Vec<u8> {
        let mut body = Vec::new();
        for n in names {
            body.push(n.len() as u8);
            body.extend_from_slice(n);
            body.push(0);
        }
        let mut out = ((body.len() + 4) as u32).to_le_bytes().to_vec();
        out.extend_from_slice(&body);
        out
    }

    #[test]
    fn test_parse_gea_list() {
        let raw = gea_bytes(&[b".LONGNAME", b".TYPE"]);
        let gea = GeaList::parse(&raw).unwrap();
        assert_eq!(gea.names(), &[&b".LONGNAME"[..], &b".TYPE"[..]]);
        assert_eq!(gea.fea_list_len(), 4 + (4 + 9 + 1) + (4 + 5 + 1));
    }

    #[test]
    fn test_parse_rejects_overrun() {
        let mut raw = gea_bytes(&[b"ABC"]);
        raw[4] = 40;
        assert_eq!(GeaList::parse(&raw), Err(Os2Error::EaListInconsistent));

        let mut raw = gea_bytes(&[b"ABC"]);
        raw[..4].copy_from_slice(&0x2_0000u32.to_le_bytes());
        assert_eq!(GeaList::parse(&raw), Err(Os2Error::EaListTooLong));
    }

    #[test]
    fn test_empty_fea_list() {
        let raw = gea_bytes(&[b".TYPE"]);
        let gea = GeaList::parse(&raw).unwrap();
        let (fea, didnt_fit) = build_empty_fea_list(&gea, 128).unwrap();
        assert!(!didnt_fit);
        assert_eq!(fea.len(), 14);
        assert_eq!(&fea[..4], &14u32.to_le_bytes());
        assert_eq!(&fea[4..8], &[0, 5, 0, 0]);
        assert_eq!(&fea[8..], b".TYPE\0");
    }

    #[test]
    fn test_fea_list_didnt_fit() {
        let raw = gea_bytes(&[b".LONGNAME"]);
        let gea = GeaList::parse(&raw).unwrap();
        let (fea, didnt_fit) = build_empty_fea_list(&gea, 10).unwrap();
        assert!(didnt_fit);
        assert_eq!(fea, vec![0xEF, 0, 0, 0]);

        assert_eq!(build_empty_fea_list(&gea, 3), Err(Os2Error::BufferOverflow));
    }

    #[test]
    fn test_empty_gea_list() {
        let raw = 4u32.to_le_bytes();
        let gea = GeaList::parse(&raw).unwrap();
        let (fea, didnt_fit) = build_empty_fea_list(&gea, 4).unwrap();
        assert!(!didnt_fit);
        assert_eq!(fea, 4u32.to_le_bytes().to_vec());
    }
}
