use crate::FontError;
use crate::buffer::FontBuffer;

use super::TableRecord;

/// A representation of the [maxp table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6maxp.html).
///
/// Only the glyph count matters for locating glyph records; the memory
/// sizing fields that follow it in version 1.0 tables are left unread.
#[derive(Debug)]
pub struct Maxp {
    /// 0x00005000 for CFF outlines, 0x00010000 for TrueType outlines
    version: u32,

    /// The number of glyphs in the font
    num_glyphs: u16,
}

impl Maxp {
    pub(crate) fn parse(buffer: &FontBuffer, record: &TableRecord) -> Result<Self, FontError> {
        let start = record.start();

        Ok(Self {
            version: buffer.read_u32_at(start)?,
            num_glyphs: buffer.read_u16_at(start + 4)?,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }
}
