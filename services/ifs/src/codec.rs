//! # Name Transcoding
//!
//! The host speaks UTF-8, the guest speaks its active code page. Every
//! conversion goes through UTF-16 code units:
//!
//! ```text
//! host UTF-8 ──decode──> UTF-16 ──from_ucs2──> guest code page
//! guest bytes ──to_ucs2──> UTF-16 ──encode──> host UTF-8
//! ```
//!
//! Conversions are best effort: on error the output still holds what
//! could be converted (unmappable characters become `?`) and the error is
//! returned so the caller can log it.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Longest name component in bytes, including the terminator
pub const CCHMAXPATHCOMP: usize = 256;

/// Substitute for unmappable characters
const SUBST: u8 = b'?';

/// Transcoding errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Source was not valid UTF-8
    InvalidUtf8,
    /// A character has no representation in the target code page
    Unmappable,
    /// Output was cut at the length limit
    Truncated,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::InvalidUtf8 => write!(f, "invalid UTF-8"),
            CodecError::Unmappable => write!(f, "unmappable character"),
            CodecError::Truncated => write!(f, "name truncated"),
        }
    }
}

/// Guest code page conversion
pub trait Codec: Send + Sync {
    /// Guest bytes to UTF-16 code units
    fn to_ucs2(&self, native: &[u8], out: &mut Vec<u16>) -> Result<(), CodecError>;

    /// UTF-16 code units to guest bytes
    fn from_ucs2(&self, units: &[u16], out: &mut Vec<u8>) -> Result<(), CodecError>;

    /// Host UTF-8 to guest bytes, at most `max - 1` bytes written
    fn utf8_to_native(&self, src: &[u8], dst: &mut Vec<u8>, max: usize) -> Result<(), CodecError> {
        dst.clear();
        let mut result = Ok(());

        let mut units = Vec::with_capacity(src.len());
        for chunk in src.utf8_chunks() {
            units.extend(chunk.valid().encode_utf16());
            if !chunk.invalid().is_empty() {
                units.push(char::REPLACEMENT_CHARACTER as u16);
                result = Err(CodecError::InvalidUtf8);
            }
        }

        // One character at a time so a cut never splits a multibyte sequence
        let limit = max.saturating_sub(1);
        let mut piece = Vec::with_capacity(4);
        let mut pair = [0u16; 2];
        for c in char::decode_utf16(units.iter().copied()) {
            let c = c.unwrap_or(char::REPLACEMENT_CHARACTER);
            piece.clear();
            if let Err(e) = self.from_ucs2(c.encode_utf16(&mut pair), &mut piece) {
                result = result.and(Err(e));
            }
            if dst.len() + piece.len() > limit {
                result = result.and(Err(CodecError::Truncated));
                break;
            }
            dst.extend_from_slice(&piece);
        }

        if let Err(e) = result {
            log::warn!("utf8_to_native: {}", e);
        }
        result
    }

    /// Guest bytes to host UTF-8
    fn native_to_utf8(&self, src: &[u8], dst: &mut Vec<u8>) -> Result<(), CodecError> {
        dst.clear();
        let mut units = Vec::with_capacity(src.len());
        let mut result = self.to_ucs2(src, &mut units);

        for c in char::decode_utf16(units.iter().copied()) {
            let c = match c {
                Ok(c) => c,
                Err(_) => {
                    result = result.and(Err(CodecError::Unmappable));
                    char::REPLACEMENT_CHARACTER
                }
            };
            let mut tmp = [0u8; 4];
            dst.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
        }

        if let Err(e) = result {
            log::warn!("native_to_utf8: {}", e);
        }
        result
    }
}

/// Supported guest code pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum CodePage {
    /// IBM PC (US)
    Cp437 = 437,
    /// ISO-8859-1
    Latin1 = 819,
    /// UTF-8
    Utf8 = 1208,
}

impl CodePage {
    pub fn from_id(id: u16) -> Option<Self> {
        match id {
            437 => Some(CodePage::Cp437),
            819 => Some(CodePage::Latin1),
            1208 => Some(CodePage::Utf8),
            _ => None,
        }
    }

    pub fn id(self) -> u16 {
        self as u16
    }
}

/// Upper half (0x80..=0xFF) of code page 437
static CP437_HIGH: [u16; 128] = [
    0x00C7, 0x00FC, 0x00E9, 0x00E2, 0x00E4, 0x00E0, 0x00E5, 0x00E7, //
    0x00EA, 0x00EB, 0x00E8, 0x00EF, 0x00EE, 0x00EC, 0x00C4, 0x00C5, //
    0x00C9, 0x00E6, 0x00C6, 0x00F4, 0x00F6, 0x00F2, 0x00FB, 0x00F9, //
    0x00FF, 0x00D6, 0x00DC, 0x00A2, 0x00A3, 0x00A5, 0x20A7, 0x0192, //
    0x00E1, 0x00ED, 0x00F3, 0x00FA, 0x00F1, 0x00D1, 0x00AA, 0x00BA, //
    0x00BF, 0x2310, 0x00AC, 0x00BD, 0x00BC, 0x00A1, 0x00AB, 0x00BB, //
    0x2591, 0x2592, 0x2593, 0x2502, 0x2524, 0x2561, 0x2562, 0x2556, //
    0x2555, 0x2563, 0x2551, 0x2557, 0x255D, 0x255C, 0x255B, 0x2510, //
    0x2514, 0x2534, 0x252C, 0x251C, 0x2500, 0x253C, 0x255E, 0x255F, //
    0x255A, 0x2554, 0x2569, 0x2566, 0x2560, 0x2550, 0x256C, 0x2567, //
    0x2568, 0x2564, 0x2565, 0x2559, 0x2558, 0x2552, 0x2553, 0x256B, //
    0x256A, 0x2518, 0x250C, 0x2588, 0x2584, 0x258C, 0x2590, 0x2580, //
    0x03B1, 0x00DF, 0x0393, 0x03C0, 0x03A3, 0x03C3, 0x00B5, 0x03C4, //
    0x03A6, 0x0398, 0x03A9, 0x03B4, 0x221E, 0x03C6, 0x03B5, 0x2229, //
    0x2261, 0x00B1, 0x2265, 0x2264, 0x2320, 0x2321, 0x00F7, 0x2248, //
    0x00B0, 0x2219, 0x00B7, 0x221A, 0x207F, 0x00B2, 0x25A0, 0x00A0, //
];

/// Table driven codec for the built-in code pages
pub struct CodecContext {
    page: CodePage,
}

impl CodecContext {
    pub fn new(page: CodePage) -> Self {
        log::debug!("codec: guest code page {}", page.id());
        Self { page }
    }

    /// Boxed context, ready to hand to the driver
    pub fn boxed(page: CodePage) -> Box<dyn Codec> {
        Box::new(Self::new(page))
    }

    pub fn page(&self) -> CodePage {
        self.page
    }

    fn encode_unit(&self, unit: u16) -> Option<u8> {
        if unit < 0x80 {
            return Some(unit as u8);
        }
        match self.page {
            CodePage::Latin1 => u8::try_from(unit).ok(),
            CodePage::Cp437 => CP437_HIGH
                .iter()
                .position(|&u| u == unit)
                .map(|i| 0x80 + i as u8),
            CodePage::Utf8 => None,
        }
    }
}

impl Codec for CodecContext {
    fn to_ucs2(&self, native: &[u8], out: &mut Vec<u16>) -> Result<(), CodecError> {
        out.clear();
        match self.page {
            CodePage::Utf8 => {
                let mut result = Ok(());
                for chunk in native.utf8_chunks() {
                    out.extend(chunk.valid().encode_utf16());
                    if !chunk.invalid().is_empty() {
                        out.push(char::REPLACEMENT_CHARACTER as u16);
                        result = Err(CodecError::InvalidUtf8);
                    }
                }
                result
            }
            CodePage::Latin1 => {
                out.extend(native.iter().map(|&b| b as u16));
                Ok(())
            }
            CodePage::Cp437 => {
                out.extend(native.iter().map(|&b| {
                    if b < 0x80 {
                        b as u16
                    } else {
                        CP437_HIGH[(b - 0x80) as usize]
                    }
                }));
                Ok(())
            }
        }
    }

    fn from_ucs2(&self, units: &[u16], out: &mut Vec<u8>) -> Result<(), CodecError> {
        out.clear();
        let mut result = Ok(());

        if self.page == CodePage::Utf8 {
            for c in char::decode_utf16(units.iter().copied()) {
                let c = c.unwrap_or_else(|_| {
                    result = Err(CodecError::Unmappable);
                    char::REPLACEMENT_CHARACTER
                });
                let mut tmp = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut tmp).as_bytes());
            }
            return result;
        }

        for c in char::decode_utf16(units.iter().copied()) {
            let byte = c
                .ok()
                .and_then(|c| u16::try_from(c as u32).ok())
                .and_then(|u| self.encode_unit(u));
            match byte {
                Some(b) => out.push(b),
                None => {
                    out.push(SUBST);
                    result = Err(CodecError::Unmappable);
                }
            }
        }
        result
    }
}
