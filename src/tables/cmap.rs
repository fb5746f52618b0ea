use log::{debug, warn};

use crate::FontError;
use crate::buffer::FontBuffer;

use super::{TableError, TableRecord};

/// A codepoint to glyph-index mapping covering the Basic Multilingual
/// Plane, built once from the selected character-map subtable.
///
/// Every font gets its own instance, owned by the handle that loaded it.
/// Codepoints the font does not cover, and codepoints outside the BMP,
/// stay at glyph index 0, the conventional missing-glyph slot.
pub struct GlyphIndexTable {
    bmp: Box<[u32]>,
}

impl GlyphIndexTable {
    const PLANE_RANGE: usize = 0x10000;

    fn new() -> Self {
        Self {
            bmp: vec![0; Self::PLANE_RANGE].into_boxed_slice(),
        }
    }

    /// Entries are stored as u32 so format 12 glyph identifiers are kept
    /// without truncation. Codepoints past the BMP are ignored.
    fn set(&mut self, codepoint: u32, glyph: u32) {
        if let Some(slot) = self.bmp.get_mut(codepoint as usize) {
            *slot = glyph;
        }
    }

    /// Returns the glyph index for `codepoint`, or 0 when the codepoint
    /// is unmapped or lies outside the BMP.
    pub fn get(&self, codepoint: u32) -> u32 {
        self.bmp.get(codepoint as usize).copied().unwrap_or(0)
    }
}

impl std::fmt::Debug for GlyphIndexTable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mapped = self.bmp.iter().filter(|&&glyph| glyph != 0).count();
        write!(f, "GlyphIndexTable({mapped} mapped codepoints)")
    }
}

// Subtable selection slots, in decreasing priority:
// Unicode full repertoire, then Unicode BMP, then legacy Macintosh.
const CLASS_FULL: usize = 0;
const CLASS_BMP: usize = 1;
const CLASS_MAC: usize = 2;

/// Selects the best encoding subtable of the
/// [cmap table](https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6cmap.html)
/// and decodes it into a [`GlyphIndexTable`].
///
/// Subtable records are scanned in file order and sorted into three
/// priority classes by platform and encoding. Each class keeps a single
/// slot, so a later record replaces an earlier one of the same class.
/// The highest-priority class with a recorded subtable wins:
///
/// | platform | encoding | class |
/// |---|---|---|
/// | 0 (Unicode) | 4 | full repertoire |
/// | 3 (Windows) | 10 | full repertoire |
/// | 0 (Unicode) | 3 | BMP |
/// | 3 (Windows) | 1 | BMP |
/// | 1 (Macintosh) | any | legacy |
///
/// Records with any other platform or encoding are ignored.
pub(crate) fn resolve(
    buffer: &FontBuffer,
    record: &TableRecord,
) -> Result<GlyphIndexTable, FontError> {
    let table_start = record.start();
    let num_subtables = buffer.read_u16_at(table_start + 2)?;

    let mut offsets = [0u32; 3];

    for i in 0..num_subtables {
        let entry = table_start + 4 + usize::from(i) * 8;
        let platform_id = buffer.read_u16_at(entry)?;
        let encoding_id = buffer.read_u16_at(entry + 2)?;

        let class = match (platform_id, encoding_id) {
            (0, 4) | (3, 10) => CLASS_FULL,
            (0, 3) | (3, 1) => CLASS_BMP,
            (1, _) => CLASS_MAC,
            _ => continue,
        };

        offsets[class] = buffer.read_u32_at(entry + 4)?;
    }

    let Some(subtable_offset) = offsets.iter().copied().find(|&offset| offset != 0) else {
        return Err(TableError::NoUsableCmap.into());
    };

    let subtable_start = table_start
        .checked_add(subtable_offset as usize)
        .ok_or(TableError::MalformedSubtable)?;
    let format = subtable_u16(buffer, subtable_start)?;

    debug!("decoding cmap format {format} subtable at table offset {subtable_offset}");

    let mut table = GlyphIndexTable::new();

    match format {
        0 => decode_format0(buffer, subtable_start, &mut table)?,
        4 => decode_format4(buffer, subtable_start, &mut table)?,
        6 => decode_format6(buffer, subtable_start, &mut table)?,
        12 => decode_format12(buffer, subtable_start, &mut table)?,
        other => return Err(TableError::UnsupportedCmapFormat(other).into()),
    }

    Ok(table)
}

// Structural subtable fields that point outside the buffer mean the
// subtable lies about its own layout, which fails the whole load.
fn subtable_u16(buffer: &FontBuffer, offset: usize) -> Result<u16, TableError> {
    buffer
        .read_u16_at(offset)
        .map_err(|_| TableError::MalformedSubtable)
}

fn subtable_i16(buffer: &FontBuffer, offset: usize) -> Result<i16, TableError> {
    buffer
        .read_i16_at(offset)
        .map_err(|_| TableError::MalformedSubtable)
}

fn subtable_u32(buffer: &FontBuffer, offset: usize) -> Result<u32, TableError> {
    buffer
        .read_u32_at(offset)
        .map_err(|_| TableError::MalformedSubtable)
}

/// Format 0, the byte encoding table: a flat 256-entry array of glyph
/// indices directly indexed by codepoint.
fn decode_format0(
    buffer: &FontBuffer,
    start: usize,
    table: &mut GlyphIndexTable,
) -> Result<(), FontError> {
    // format, length and language precede the array
    let glyphs = buffer
        .get(start + 6, 256)
        .map_err(|_| TableError::MalformedSubtable)?;

    for (codepoint, &glyph) in glyphs.iter().enumerate() {
        table.set(codepoint as u32, u32::from(glyph));
    }

    Ok(())
}

/// Format 4, segment mapping to delta values: four parallel arrays of
/// `segCount` entries describing codepoint ranges.
///
/// A segment with `idRangeOffset` zero maps `j` to `j + idDelta` modulo
/// 65536. Otherwise the glyph index lives in an array reached by adding
/// `idRangeOffset` to the address of the `idRangeOffset[i]` field itself,
/// an indirection inherited from the days when parsers walked the table
/// with a moving pointer. Fonts in the wild carry dangling offsets here,
/// so an indirect read landing outside the subtable leaves the codepoint
/// unmapped instead of failing the load.
fn decode_format4(
    buffer: &FontBuffer,
    start: usize,
    table: &mut GlyphIndexTable,
) -> Result<(), FontError> {
    let declared_len = subtable_u16(buffer, start + 2)?;
    let seg_count = usize::from(subtable_u16(buffer, start + 6)? / 2);

    // The parallel arrays follow the 14 byte header, with a reserved
    // 2 byte pad between endCode and startCode.
    let end_codes = start + 14;
    let start_codes = end_codes + 2 * seg_count + 2;
    let id_deltas = start_codes + 2 * seg_count;
    let id_range_offsets = id_deltas + 2 * seg_count;

    let arrays_end = id_range_offsets
        .checked_add(2 * seg_count)
        .ok_or(TableError::MalformedSubtable)?;
    if arrays_end > buffer.len() {
        return Err(TableError::MalformedSubtable.into());
    }

    // Indirect reads are additionally bounded by the length the subtable
    // declares for itself.
    let glyph_array_end = start
        .checked_add(usize::from(declared_len))
        .ok_or(TableError::MalformedSubtable)?
        .min(buffer.len());

    for i in 0..seg_count {
        let end_code = subtable_u16(buffer, end_codes + 2 * i)?;
        let start_code = subtable_u16(buffer, start_codes + 2 * i)?;
        let id_delta = subtable_i16(buffer, id_deltas + 2 * i)?;
        let range_offset_field = id_range_offsets + 2 * i;
        let id_range_offset = subtable_u16(buffer, range_offset_field)?;

        let mut skipped = 0u32;

        for j in start_code..=end_code {
            if id_range_offset == 0 {
                table.set(u32::from(j), u32::from(j.wrapping_add(id_delta as u16)));
                continue;
            }

            let address = range_offset_field
                + usize::from(id_range_offset)
                + 2 * usize::from(j - start_code);

            if address + 2 > glyph_array_end {
                skipped += 1;
                continue;
            }

            let glyph = subtable_u16(buffer, address)?;
            table.set(u32::from(j), u32::from(glyph));
        }

        if skipped > 0 {
            warn!(
                "segment U+{start_code:04X}..U+{end_code:04X}: {skipped} glyph \
                 array reads fall outside the subtable, left unmapped"
            );
        }
    }

    Ok(())
}

/// Format 6, the trimmed table: a contiguous run of glyph indices for
/// codepoints `firstCode..firstCode + entryCount`.
fn decode_format6(
    buffer: &FontBuffer,
    start: usize,
    table: &mut GlyphIndexTable,
) -> Result<(), FontError> {
    let first_code = subtable_u16(buffer, start + 6)?;
    let entry_count = subtable_u16(buffer, start + 8)?;

    let entries = start + 10;
    let entries_end = entries
        .checked_add(2 * usize::from(entry_count))
        .ok_or(TableError::MalformedSubtable)?;
    if entries_end > buffer.len() {
        return Err(TableError::MalformedSubtable.into());
    }

    for k in 0..usize::from(entry_count) {
        let codepoint = u32::from(first_code) + k as u32;

        if codepoint > 0xFFFF {
            warn!(
                "trimmed table runs past U+FFFF, dropping {} trailing entries",
                usize::from(entry_count) - k
            );
            break;
        }

        let glyph = subtable_u16(buffer, entries + 2 * k)?;
        table.set(codepoint, u32::from(glyph));
    }

    Ok(())
}

/// Format 12, segmented coverage: groups of `{startCharCode, endCharCode,
/// startGlyphID}` mapping whole codepoint ranges to consecutive glyphs.
///
/// Groups are clamped to the BMP; a group starting past U+FFFF is skipped
/// outright since supplementary planes are not decoded.
fn decode_format12(
    buffer: &FontBuffer,
    start: usize,
    table: &mut GlyphIndexTable,
) -> Result<(), FontError> {
    let num_groups = subtable_u32(buffer, start + 12)?;

    let groups = start + 16;
    let groups_end = (num_groups as usize)
        .checked_mul(12)
        .and_then(|len| groups.checked_add(len))
        .ok_or(TableError::MalformedSubtable)?;
    if groups_end > buffer.len() {
        return Err(TableError::MalformedSubtable.into());
    }

    for g in 0..num_groups as usize {
        let group = groups + g * 12;
        let start_char_code = subtable_u32(buffer, group)?;
        let end_char_code = subtable_u32(buffer, group + 4)?;
        let start_glyph_id = subtable_u32(buffer, group + 8)?;

        if start_char_code > 0xFFFF {
            continue;
        }

        for j in start_char_code..=end_char_code.min(0xFFFF) {
            table.set(j, j - start_char_code + start_glyph_id);
        }
    }

    Ok(())
}
