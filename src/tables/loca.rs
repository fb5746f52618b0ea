use crate::FontError;
use crate::buffer::FontBuffer;

use super::head::IndexToLocFormat;
use super::{TableError, TableRecord};

/// Reads the offset of one glyph's outline record from the
/// [loca table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6loca.html).
///
/// The table holds `numGlyphs + 1` entries, the extra one marking the end
/// of the last glyph, so `glyph_index == num_glyphs` is still addressable.
/// Short-format entries store the offset divided by two; the value
/// returned here is always the real offset, relative to the start of the
/// 'glyf' table.
pub(crate) fn glyph_record_offset(
    buffer: &FontBuffer,
    loca: &TableRecord,
    format: IndexToLocFormat,
    num_glyphs: u16,
    glyph_index: u32,
) -> Result<u32, FontError> {
    if glyph_index > u32::from(num_glyphs) {
        return Err(TableError::GlyphIndexOutOfRange {
            index: glyph_index,
            num_glyphs,
        }
        .into());
    }

    let index = glyph_index as usize;

    match format {
        IndexToLocFormat::Short => {
            let stored = buffer.read_u16_at(loca.start() + 2 * index)?;
            Ok(u32::from(stored) * 2)
        }
        IndexToLocFormat::Long => Ok(buffer.read_u32_at(loca.start() + 4 * index)?),
    }
}

#[cfg(test)]
mod tests {
    use super::glyph_record_offset;
    use crate::FontError;
    use crate::buffer::FontBuffer;
    use crate::tables::head::IndexToLocFormat;
    use crate::tables::{TableError, TableRecord};

    #[test]
    fn short_entries_are_scaled_by_two() {
        let data = [
            0x00, 0x00, // offset [0]: 0
            0x00, 0x0A, // offset [1]: 10, meaning byte offset 20
            0x00, 0x18, // offset [2]: 24, meaning byte offset 48
        ];
        let loca = TableRecord {
            offset: 0,
            length: 6,
        };
        let buffer = FontBuffer::new(&data);

        let offset =
            glyph_record_offset(&buffer, &loca, IndexToLocFormat::Short, 2, 1).unwrap();
        assert_eq!(offset, 20);

        let offset =
            glyph_record_offset(&buffer, &loca, IndexToLocFormat::Short, 2, 2).unwrap();
        assert_eq!(offset, 48);
    }

    #[test]
    fn long_entries_are_used_directly() {
        let data = [
            0x00, 0x00, 0x00, 0x00, // offset [0]: 0
            0x00, 0x00, 0x01, 0x40, // offset [1]: 320
        ];
        let loca = TableRecord {
            offset: 0,
            length: 8,
        };
        let buffer = FontBuffer::new(&data);

        let offset =
            glyph_record_offset(&buffer, &loca, IndexToLocFormat::Long, 1, 1).unwrap();
        assert_eq!(offset, 320);
    }

    #[test]
    fn index_past_num_glyphs_is_rejected() {
        let data = [0u8; 6];
        let loca = TableRecord {
            offset: 0,
            length: 6,
        };
        let buffer = FontBuffer::new(&data);

        assert!(matches!(
            glyph_record_offset(&buffer, &loca, IndexToLocFormat::Short, 2, 3),
            Err(FontError::Table(TableError::GlyphIndexOutOfRange {
                index: 3,
                num_glyphs: 2
            }))
        ));
    }

    #[test]
    fn entry_past_the_table_is_a_bounds_error() {
        // numGlyphs claims more entries than the buffer holds.
        let data = [0u8; 4];
        let loca = TableRecord {
            offset: 0,
            length: 4,
        };
        let buffer = FontBuffer::new(&data);

        assert!(matches!(
            glyph_record_offset(&buffer, &loca, IndexToLocFormat::Short, 8, 5),
            Err(FontError::Buffer(_))
        ));
    }
}
