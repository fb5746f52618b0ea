use thiserror::Error;

use buffer::{FontBuffer, FontBufferError};
use tables::cmap::{self, GlyphIndexTable};
use tables::head::Head;
use tables::loca;
use tables::maxp::Maxp;
use tables::{TableDirectory, TableError, TableRecord, TableTag};

pub mod buffer;
pub mod tables;

#[derive(Debug, Error)]
pub enum FontError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Buffer(#[from] FontBufferError),
}

/// A loaded TrueType or OpenType font.
///
/// Borrows the raw font binary for its own lifetime and derives, once at
/// load time, everything needed to resolve a codepoint to the location
/// of its outline data: the table directory, the header and glyph count,
/// and the decoded codepoint to glyph-index mapping. Nothing is mutated
/// after a successful load apart from the cosmetic display size, so
/// shared references to a `Font` can be used from any number of readers.
#[derive(Debug)]
pub struct Font<'a> {
    buffer: FontBuffer<'a>,
    directory: TableDirectory,
    head: Head,
    maxp: Maxp,
    glyph_index: GlyphIndexTable,
    display_size: u16,
}

impl<'a> Font<'a> {
    /// Parses the table directory, the 'head' and 'maxp' tables, and the
    /// selected character-map subtable.
    ///
    /// Loading either succeeds completely or fails without producing a
    /// handle; there is no partially-initialized state to clean up.
    ///
    /// # Errors
    ///
    /// Any of the parse-time error conditions: an unknown signature, a
    /// missing 'cmap', 'head' or 'maxp' table, no usable or supported
    /// character-map subtable, a subtable inconsistent with the buffer,
    /// or any field read falling outside the buffer.
    pub fn load(data: &'a [u8]) -> Result<Self, FontError> {
        let buffer = FontBuffer::new(data);
        let directory = TableDirectory::parse(&buffer)?;

        let head = Head::parse(&buffer, &directory.require(TableTag::Head)?)?;
        let maxp = Maxp::parse(&buffer, &directory.require(TableTag::Maxp)?)?;
        let glyph_index = cmap::resolve(&buffer, &directory.require(TableTag::Cmap)?)?;

        Ok(Self {
            buffer,
            directory,
            head,
            maxp,
            glyph_index,
            display_size: 0,
        })
    }

    /// Sets the size the font will be displayed at. Purely cosmetic
    /// metadata for the consumer of the glyph data; parsing and lookups
    /// are unaffected by it.
    pub fn set_display_size(&mut self, size: u16) {
        self.display_size = size;
    }

    pub fn display_size(&self) -> u16 {
        self.display_size
    }

    /// Returns the glyph index for `codepoint`, or 0 when the font does
    /// not cover it. Codepoints outside the Basic Multilingual Plane are
    /// not decoded and always resolve to 0.
    pub fn lookup_glyph(&self, codepoint: u32) -> u32 {
        self.glyph_index.get(codepoint)
    }

    /// Returns the byte offset of the glyph's outline record, relative
    /// to the start of the 'glyf' table.
    ///
    /// # Errors
    ///
    /// Fails when `glyph_index` exceeds the glyph count, when the font
    /// carries no 'loca' table, or when the 'loca' entry lies outside
    /// the buffer.
    pub fn glyph_record_offset(&self, glyph_index: u32) -> Result<u32, FontError> {
        let record = self.directory.require(TableTag::Loca)?;

        loca::glyph_record_offset(
            &self.buffer,
            &record,
            self.head.index_to_loc_format,
            self.maxp.num_glyphs(),
            glyph_index,
        )
    }

    /// The parsed 'head' table.
    pub fn head(&self) -> &Head {
        &self.head
    }

    /// The glyph count from the 'maxp' table.
    pub fn num_glyphs(&self) -> u16 {
        self.maxp.num_glyphs()
    }

    /// The byte range of `tag`, if the font carries that table.
    pub fn table(&self, tag: TableTag) -> Option<TableRecord> {
        self.directory.get(tag)
    }
}
