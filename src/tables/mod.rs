use std::collections::BTreeMap;
use std::fmt;

use log::trace;
use thiserror::Error;

use crate::FontError;
use crate::buffer::FontBuffer;

pub mod cmap;
pub mod head;
pub mod loca;
pub mod maxp;

/// An enum for the tables this crate consults when resolving a codepoint
/// to the location of its outline data.
/// For more information, see the [Apple Documentation Table 2](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6.html)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TableTag {
    Cmap,
    Glyf,
    Head,
    Hmtx,
    Loca,
    Maxp,
}

impl TryFrom<&[u8]> for TableTag {
    type Error = ();

    fn try_from(value: &[u8]) -> Result<Self, ()> {
        Ok(match value {
            b"cmap" => Self::Cmap,
            b"glyf" => Self::Glyf,
            b"head" => Self::Head,
            b"hmtx" => Self::Hmtx,
            b"loca" => Self::Loca,
            b"maxp" => Self::Maxp,
            _ => Err(())?,
        })
    }
}

impl fmt::Display for TableTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Cmap => "cmap",
            Self::Glyf => "glyf",
            Self::Head => "head",
            Self::Hmtx => "hmtx",
            Self::Loca => "loca",
            Self::Maxp => "maxp",
        })
    }
}

/// Represents the error messages which may occur when parsing tables
/// from the raw font binary.
#[derive(Error, Debug)]
pub enum TableError {
    /// The leading four bytes are not one of the sfnt versions this
    /// crate reads (TrueType, legacy Mac 'true', or CFF-flavored 'OTTO').
    #[error("0x{0:08X} is not a TrueType or OpenType font signature")]
    InvalidSignature(u32),

    /// A table this crate needs is absent from the table directory.
    #[error("the required '{0}' table is missing from the table directory")]
    MissingRequiredTable(TableTag),

    /// No character-map subtable with a Unicode, Windows or Macintosh
    /// encoding was found.
    #[error("the font carries no usable character-map subtable")]
    NoUsableCmap,

    /// The selected character-map subtable uses an encoding format other
    /// than 0, 4, 6 or 12.
    #[error("character-map subtable format {0} is not supported")]
    UnsupportedCmapFormat(u16),

    /// The character-map subtable declares lengths or counts that do not
    /// fit inside the font buffer.
    #[error("character-map subtable layout is inconsistent with the font buffer")]
    MalformedSubtable,

    /// The 'loca' table holds `numGlyphs + 1` entries, so any index above
    /// `numGlyphs` has no record to point at.
    #[error("glyph index {index} is out of range for a font with {num_glyphs} glyphs")]
    GlyphIndexOutOfRange { index: u32, num_glyphs: u16 },
}

// sfnt versions accepted at the start of the table directory.
const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
const SFNT_VERSION_TRUE: u32 = 0x7472_7565;
const SFNT_VERSION_OTTO: u32 = 0x4F54_544F;

/// Represents the byte range one table occupies inside the font binary.
///
/// The table directory also stores a checksum per table; it plays no part
/// in locating data and is discarded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    /// The offset of the table, in bytes, from the beginning of the
    /// font binary.
    pub offset: u32,

    /// The length of the table in bytes, excluding any padding that may
    /// follow it.
    pub length: u32,
}

impl TableRecord {
    /// The table start as a buffer offset.
    pub(crate) fn start(&self) -> usize {
        self.offset as usize
    }
}

/// Represents the table directory and maps a table tag to the byte range
/// it occupies in the font binary.
///
/// The directory begins with a 12 byte header (sfnt version, table count
/// and three binary-search hints this crate has no use for), followed by
/// one 16 byte entry per table. Entries with unrecognized tags are
/// skipped without error.
#[derive(Debug)]
pub struct TableDirectory {
    /// A Binary Tree Map keyed by the recognized table tags; a table the
    /// font does not carry is simply absent from the map.
    inner: BTreeMap<TableTag, TableRecord>,
}

impl TableDirectory {
    /// Parses the table directory from the start of the font buffer.
    ///
    /// The buffer is only read, never mutated, so parsing the same bytes
    /// twice yields the same directory.
    ///
    /// # Errors
    ///
    /// Fails with [`TableError::InvalidSignature`] when the leading four
    /// bytes are not a known sfnt version, and with a buffer error when
    /// the declared table count points past the end of the buffer.
    pub fn parse(buffer: &FontBuffer) -> Result<Self, FontError> {
        // The fixed directory header is 12 bytes, so anything shorter
        // cannot be a font at all.
        buffer.get(0, 12)?;

        let signature = buffer.read_u32_at(0)?;

        if signature != SFNT_VERSION_TRUETYPE
            && signature != SFNT_VERSION_TRUE
            && signature != SFNT_VERSION_OTTO
        {
            return Err(TableError::InvalidSignature(signature).into());
        }

        let num_tables = buffer.read_u16_at(4)?;

        let mut inner = BTreeMap::new();

        // Entries are 16 bytes each: tag, checksum, offset, length. Only
        // the tags recognized by TableTag are kept.
        for i in 0..num_tables {
            let entry = 12 + usize::from(i) * 16;

            let Ok(tag) = TableTag::try_from(buffer.get(entry, 4)?) else {
                continue;
            };

            let record = TableRecord {
                offset: buffer.read_u32_at(entry + 8)?,
                length: buffer.read_u32_at(entry + 12)?,
            };

            trace!(
                "table '{tag}' at offset {}, {} bytes",
                record.offset, record.length
            );

            inner.insert(tag, record);
        }

        Ok(Self { inner })
    }

    /// Returns the byte range of `tag`, if the font carries that table.
    pub fn get(&self, tag: TableTag) -> Option<TableRecord> {
        self.inner.get(&tag).copied()
    }

    /// Like [`TableDirectory::get`], but a missing table is an error.
    pub(crate) fn require(&self, tag: TableTag) -> Result<TableRecord, TableError> {
        self.get(tag).ok_or(TableError::MissingRequiredTable(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::{TableDirectory, TableError, TableRecord, TableTag};
    use crate::FontError;
    use crate::buffer::FontBuffer;

    fn directory(signature: u32, entries: &[(&[u8; 4], u32, u32)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&signature.to_be_bytes());
        data.extend_from_slice(&(entries.len() as u16).to_be_bytes());
        data.extend_from_slice(&[0; 6]); // searchRange, entrySelector, rangeShift
        for (tag, offset, length) in entries {
            data.extend_from_slice(*tag);
            data.extend_from_slice(&[0; 4]); // checksum
            data.extend_from_slice(&offset.to_be_bytes());
            data.extend_from_slice(&length.to_be_bytes());
        }
        data
    }

    #[test]
    fn recognized_tags_are_recorded() {
        let data = directory(
            0x00010000,
            &[(b"cmap", 0x100, 0x40), (b"loca", 0x200, 0x10)],
        );
        let parsed = TableDirectory::parse(&FontBuffer::new(&data)).unwrap();

        assert_eq!(
            parsed.get(TableTag::Cmap),
            Some(TableRecord {
                offset: 0x100,
                length: 0x40
            })
        );
        assert_eq!(
            parsed.get(TableTag::Loca),
            Some(TableRecord {
                offset: 0x200,
                length: 0x10
            })
        );
        assert_eq!(parsed.get(TableTag::Glyf), None);
    }

    #[test]
    fn unrecognized_tags_are_skipped() {
        let data = directory(0x00010000, &[(b"GSUB", 0x100, 0x40), (b"head", 0x80, 54)]);
        let parsed = TableDirectory::parse(&FontBuffer::new(&data)).unwrap();

        assert!(parsed.get(TableTag::Head).is_some());
        assert!(parsed.require(TableTag::Cmap).is_err());
    }

    #[test]
    fn all_three_signatures_are_accepted() {
        for signature in [0x00010000, 0x74727565, 0x4F54544F] {
            let data = directory(signature, &[]);
            assert!(TableDirectory::parse(&FontBuffer::new(&data)).is_ok());
        }
    }

    #[test]
    fn unknown_signature_is_rejected() {
        let data = directory(0xDEADBEEF, &[]);
        let err = TableDirectory::parse(&FontBuffer::new(&data)).unwrap_err();

        assert!(matches!(
            err,
            FontError::Table(TableError::InvalidSignature(0xDEADBEEF))
        ));
    }

    #[test]
    fn truncated_directory_is_a_bounds_error() {
        // Claims four tables but carries no entries at all.
        let mut data = directory(0x00010000, &[]);
        data[5] = 4;

        assert!(matches!(
            TableDirectory::parse(&FontBuffer::new(&data)),
            Err(FontError::Buffer(_))
        ));
    }

    #[test]
    fn short_buffer_is_a_bounds_error() {
        let data = [0x00, 0x01, 0x00];
        assert!(matches!(
            TableDirectory::parse(&FontBuffer::new(&data)),
            Err(FontError::Buffer(_))
        ));
    }
}
