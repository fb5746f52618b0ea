use crate::FontError;
use crate::buffer::FontBuffer;

use super::TableRecord;

/// Selects between 16-bit and 32-bit entries in the 'loca' table.
///
/// The short format stores every offset divided by two, which keeps the
/// table half the size for fonts whose outline data fits in 128 KiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexToLocFormat {
    Short,
    Long,
}

impl From<i16> for IndexToLocFormat {
    fn from(value: i16) -> Self {
        // Zero means short; the format defines no third variant, so
        // anything else is taken as long.
        if value == 0 { Self::Short } else { Self::Long }
    }
}

/// A representation of the [head table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html).
///
/// Only `index_to_loc_format` participates in locating glyph records;
/// the remaining fields are carried for callers that size or position
/// the rendered output.
#[derive(Debug)]
pub struct Head {
    /// The version of the head table,
    /// it's almost guaranteed to be set to 0x00010000
    pub version: u32,

    /// Font revision set by the font author/manufacturer
    pub font_revision: u32,

    /// Checksum adjustment over the whole font, not consulted here
    pub checksum_adjustment: u32,

    /// Magic number, obsolete, always set to 0x5F0F3CF5
    pub magic_number: u32,

    /// Flags which guide font rendering and processing
    pub flags: u16,

    /// Units per em (ranges from 64 to 16384)
    pub units_per_em: u16,

    /// Date the font was created
    pub created: i64,

    /// Date the font was last modified
    pub modified: i64,

    /// The minimum x value for all glyph bounding boxes
    pub x_min: i16,

    /// The minimum y value for all glyph bounding boxes
    pub y_min: i16,

    /// The maximum x value for all glyph bounding boxes
    pub x_max: i16,

    /// The maximum y value for all glyph bounding boxes
    pub y_max: i16,

    /// Bold, italic and similar style bits
    pub mac_style: u16,

    /// Smallest readable size in pixels
    pub lowest_rec_ppem: u16,

    /// Font direction hint
    pub font_direction_hint: i16,

    /// 0 for short 'loca' offsets and 1 for long
    pub index_to_loc_format: IndexToLocFormat,

    /// Glyph data format (0 is the current outline format)
    pub glyph_data_format: i16,
}

impl Head {
    /// Reads the head table from its recorded byte range.
    ///
    /// All fields sit at fixed offsets from the table start, so a table
    /// shorter than its 54 byte layout fails with a buffer error.
    pub(crate) fn parse(buffer: &FontBuffer, record: &TableRecord) -> Result<Self, FontError> {
        let start = record.start();

        Ok(Self {
            version: buffer.read_u32_at(start)?,
            font_revision: buffer.read_u32_at(start + 4)?,
            checksum_adjustment: buffer.read_u32_at(start + 8)?,
            magic_number: buffer.read_u32_at(start + 12)?,
            flags: buffer.read_u16_at(start + 16)?,
            units_per_em: buffer.read_u16_at(start + 18)?,
            created: buffer.read_i64_at(start + 20)?,
            modified: buffer.read_i64_at(start + 28)?,
            x_min: buffer.read_i16_at(start + 36)?,
            y_min: buffer.read_i16_at(start + 38)?,
            x_max: buffer.read_i16_at(start + 40)?,
            y_max: buffer.read_i16_at(start + 42)?,
            mac_style: buffer.read_u16_at(start + 44)?,
            lowest_rec_ppem: buffer.read_u16_at(start + 46)?,
            font_direction_hint: buffer.read_i16_at(start + 48)?,
            index_to_loc_format: buffer.read_i16_at(start + 50)?.into(),
            glyph_data_format: buffer.read_i16_at(start + 52)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Head, IndexToLocFormat};
    use crate::buffer::FontBuffer;
    use crate::tables::TableRecord;

    fn head_bytes(index_to_loc_format: i16) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&0x00010000u32.to_be_bytes()); // version
        data.extend_from_slice(&0x00020000u32.to_be_bytes()); // fontRevision
        data.extend_from_slice(&[0; 4]); // checkSumAdjustment
        data.extend_from_slice(&0x5F0F3CF5u32.to_be_bytes()); // magicNumber
        data.extend_from_slice(&[0; 2]); // flags
        data.extend_from_slice(&1000u16.to_be_bytes()); // unitsPerEm
        data.extend_from_slice(&[0; 16]); // created + modified
        data.extend_from_slice(&(-120i16).to_be_bytes()); // xMin
        data.extend_from_slice(&(-300i16).to_be_bytes()); // yMin
        data.extend_from_slice(&1200i16.to_be_bytes()); // xMax
        data.extend_from_slice(&900i16.to_be_bytes()); // yMax
        data.extend_from_slice(&[0; 4]); // macStyle + lowestRecPPEM
        data.extend_from_slice(&2i16.to_be_bytes()); // fontDirectionHint
        data.extend_from_slice(&index_to_loc_format.to_be_bytes());
        data.extend_from_slice(&[0; 2]); // glyphDataFormat
        data
    }

    #[test]
    fn parses_fixed_layout() {
        let data = head_bytes(0);
        let record = TableRecord {
            offset: 0,
            length: data.len() as u32,
        };
        let head = Head::parse(&FontBuffer::new(&data), &record).unwrap();

        assert_eq!(head.magic_number, 0x5F0F3CF5);
        assert_eq!(head.units_per_em, 1000);
        assert_eq!(
            (head.x_min, head.y_min, head.x_max, head.y_max),
            (-120, -300, 1200, 900)
        );
        assert_eq!(head.font_direction_hint, 2);
        assert_eq!(head.index_to_loc_format, IndexToLocFormat::Short);
    }

    #[test]
    fn long_loca_format() {
        let data = head_bytes(1);
        let record = TableRecord {
            offset: 0,
            length: data.len() as u32,
        };
        let head = Head::parse(&FontBuffer::new(&data), &record).unwrap();

        assert_eq!(head.index_to_loc_format, IndexToLocFormat::Long);
    }

    #[test]
    fn truncated_table_is_a_bounds_error() {
        let data = head_bytes(0);
        let record = TableRecord {
            offset: 0,
            length: 54,
        };

        assert!(Head::parse(&FontBuffer::new(&data[..40]), &record).is_err());
    }
}
