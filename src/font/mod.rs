//! TrueType metrics extraction.
//!
//! Only the tables needed to lay out text and describe the font in a PDF
//! are read: `head`, `hhea`, `hmtx` and the format-4 `cmap` subtable.
//! All reads are bounds-checked; a malformed file yields a [`FontError`],
//! never a panic.

mod cmap;
mod reader;

use std::collections::HashMap;

use tracing::debug;

use reader::Reader;

/// Errors raised while parsing a TrueType font.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum FontError {
    #[error("not a TrueType font (signature {0:#010x})")]
    InvalidSignature(u32),

    #[error("missing required table '{0}'")]
    MissingTable(&'static str),

    #[error("table '{table}' truncated at offset {offset}")]
    Truncated { table: &'static str, offset: usize },

    #[error("no format 4 Unicode cmap subtable")]
    NoUnicodeCmap,

    #[error("invalid font: {0}")]
    Malformed(&'static str),
}

const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;
const SFNT_VERSION_APPLE: u32 = u32::from_be_bytes(*b"true");
const SFNT_VERSION_CFF: u32 = u32::from_be_bytes(*b"OTTO");

/// Horizontal metrics of a font, in font design units.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    units_per_em: u16,
    ascender: i16,
    descender: i16,
    bbox: [i16; 4],
    widths: HashMap<u32, u16>,
    default_width: u16,
}

impl FontMetrics {
    /// Parse the metrics of a TrueType/OpenType font file.
    #[tracing::instrument(level = "debug", skip(data), fields(len = data.len()))]
    pub fn parse(data: &[u8]) -> Result<Self, FontError> {
        let file = Reader::new(data, "offset table");

        let signature = file.u32_at(0)?;
        if !matches!(
            signature,
            SFNT_VERSION_TRUETYPE | SFNT_VERSION_APPLE | SFNT_VERSION_CFF
        ) {
            return Err(FontError::InvalidSignature(signature));
        }

        let num_tables = usize::from(file.u16_at(4)?);
        let mut tables = HashMap::with_capacity(num_tables);
        for i in 0..num_tables {
            let record = 12 + i * 16;
            let tag = file.tag_at(record)?;
            let offset = file.u32_at(record + 8)? as usize;
            let length = file.u32_at(record + 12)? as usize;
            tables.insert(tag, (offset, length));
        }

        let head = table(&file, &tables, "head")?;
        if head.len() < 54 {
            return Err(FontError::Truncated {
                table: "head",
                offset: head.len(),
            });
        }
        let units_per_em = head.u16_at(18)?;
        if units_per_em == 0 {
            return Err(FontError::Malformed("unitsPerEm is zero"));
        }
        let bbox = [
            head.i16_at(36)?,
            head.i16_at(38)?,
            head.i16_at(40)?,
            head.i16_at(42)?,
        ];

        let hhea = table(&file, &tables, "hhea")?;
        if hhea.len() < 36 {
            return Err(FontError::Truncated {
                table: "hhea",
                offset: hhea.len(),
            });
        }
        let ascender = hhea.i16_at(4)?;
        let descender = hhea.i16_at(6)?;
        let num_h_metrics = usize::from(hhea.u16_at(34)?);

        let hmtx = table(&file, &tables, "hmtx")?;
        let advances = (0..num_h_metrics)
            .map(|i| hmtx.u16_at(i * 4))
            .collect::<Result<Vec<_>, _>>()?;

        let cmap = table(&file, &tables, "cmap")?;
        let widths = cmap::code_point_widths(&cmap, &advances)?;

        let default_width = advances.first().copied().unwrap_or(0);

        debug!(
            units_per_em,
            num_h_metrics,
            mapped = widths.len(),
            "parsed font metrics"
        );

        Ok(Self {
            units_per_em,
            ascender,
            descender,
            bbox,
            widths,
            default_width,
        })
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    pub fn descender(&self) -> i16 {
        self.descender
    }

    /// `[xMin, yMin, xMax, yMax]` from the `head` table.
    pub fn bbox(&self) -> [i16; 4] {
        self.bbox
    }

    /// Number of code points with a cmap entry.
    pub fn mapped_count(&self) -> usize {
        self.widths.len()
    }

    /// Advance width of `c` in design units. Unmapped characters get the
    /// width of glyph 0.
    pub fn char_width(&self, c: char) -> u16 {
        self.widths
            .get(&u32::from(c))
            .copied()
            .unwrap_or(self.default_width)
    }

    /// Width of `text` in points when set at `font_size`.
    pub fn string_width(&self, text: &str, font_size: f64) -> f64 {
        let units: u64 = text.chars().map(|c| u64::from(self.char_width(c))).sum();
        units as f64 * font_size / f64::from(self.units_per_em)
    }

    /// Convert a design-unit value to the 1000-unit glyph space PDF uses.
    pub fn scale_to_1000(&self, value: i32) -> i32 {
        (f64::from(value) * 1000.0 / f64::from(self.units_per_em)).round() as i32
    }
}

fn table<'a>(
    file: &Reader<'a>,
    tables: &HashMap<[u8; 4], (usize, usize)>,
    name: &'static str,
) -> Result<Reader<'a>, FontError> {
    let mut tag = [b' '; 4];
    tag[..name.len()].copy_from_slice(name.as_bytes());
    let (offset, length) = tables
        .get(&tag)
        .copied()
        .ok_or(FontError::MissingTable(name))?;
    file.sub(offset, length, name)
}
