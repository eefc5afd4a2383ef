use std::collections::HashMap;

use super::FontError;
use super::reader::Reader;

/// Resolve every code point of the font's Unicode BMP subtable to an advance width.
///
/// `widths` is the hmtx advance-width array, indexed by glyph id.
pub(crate) fn code_point_widths(
    cmap: &Reader<'_>,
    widths: &[u16],
) -> Result<HashMap<u32, u16>, FontError> {
    let subtable = find_format4_subtable(cmap)?;
    parse_format4(&subtable, widths)
}

/// Pick the format-4 subtable: (3, 1) or (0, 3) first, else the first format 4 found.
fn find_format4_subtable<'a>(cmap: &Reader<'a>) -> Result<Reader<'a>, FontError> {
    let num_tables = usize::from(cmap.u16_at(2)?);

    let mut fallback = None;
    for i in 0..num_tables {
        let record = 4 + i * 8;
        let platform_id = cmap.u16_at(record)?;
        let encoding_id = cmap.u16_at(record + 2)?;
        let offset = cmap.u32_at(record + 4)? as usize;

        let subtable = cmap.tail(offset)?;
        if subtable.u16_at(0)? != 4 {
            continue;
        }
        if matches!((platform_id, encoding_id), (3, 1) | (0, 3)) {
            return Ok(subtable);
        }
        fallback.get_or_insert(subtable);
    }

    fallback.ok_or(FontError::NoUnicodeCmap)
}

fn parse_format4(sub: &Reader<'_>, widths: &[u16]) -> Result<HashMap<u32, u16>, FontError> {
    let seg_count_x2 = usize::from(sub.u16_at(6)?);
    let seg_count = seg_count_x2 / 2;

    // endCode[n], reservedPad, startCode[n], idDelta[n], idRangeOffset[n], glyphIdArray[]
    let end_codes = 14;
    let start_codes = end_codes + seg_count_x2 + 2;
    let id_deltas = start_codes + seg_count_x2;
    let id_range_offsets = id_deltas + seg_count_x2;

    let mut map = HashMap::new();
    for seg in 0..seg_count {
        let end = u32::from(sub.u16_at(end_codes + seg * 2)?);
        let start = u32::from(sub.u16_at(start_codes + seg * 2)?);
        let delta = u32::from(sub.u16_at(id_deltas + seg * 2)?);
        let range_offset_pos = id_range_offsets + seg * 2;
        let range_offset = usize::from(sub.u16_at(range_offset_pos)?);

        if start == 0xFFFF {
            break;
        }

        for code in start..=end {
            let glyph = if range_offset == 0 {
                (code + delta) & 0xFFFF
            } else {
                // idRangeOffset is relative to its own position in the table.
                let pos = range_offset_pos + range_offset + (code - start) as usize * 2;
                match u32::from(sub.u16_at(pos)?) {
                    0 => 0,
                    id => (id + delta) & 0xFFFF,
                }
            };
            map.insert(code, glyph_width(widths, glyph as usize));
        }
    }

    Ok(map)
}

/// Glyphs past the end of hmtx share the last advance width.
fn glyph_width(widths: &[u16], glyph: usize) -> u16 {
    widths
        .get(glyph)
        .or_else(|| widths.last())
        .copied()
        .unwrap_or(0)
}
