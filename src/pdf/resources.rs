//! Resources compiled into the crate.

/// DejaVu Sans subset to the Latin-1 and WinAnsi repertoire.
///
/// Glyph ids and the `cmap`, `hmtx`, `head` and `hhea` tables are those of
/// the full font; outlines outside the subset are empty and the layout
/// tables (`GPOS`, `GSUB`, `GDEF`, `MATH`, `kern`) are dropped.
pub const FONT_DATA: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// `/BaseFont` of [`FONT_DATA`], with the six-letter subset tag.
pub const FONT_NAME: &str = "AAAAAA+DejaVuSans";

/// sRGB IEC61966-2.1 display profile for the PDF/A output intent.
pub const SRGB_ICC_PROFILE: &[u8] = include_bytes!("../../assets/sRGB-IEC61966-2.1.icc");

pub const SRGB_IDENTIFIER: &str = "sRGB IEC61966-2.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icc_profile_header() {
        // declared size, then 'acsp' signature at offset 36
        let size = u32::from_be_bytes([
            SRGB_ICC_PROFILE[0],
            SRGB_ICC_PROFILE[1],
            SRGB_ICC_PROFILE[2],
            SRGB_ICC_PROFILE[3],
        ]);
        assert_eq!(size as usize, SRGB_ICC_PROFILE.len());
        assert_eq!(&SRGB_ICC_PROFILE[36..40], b"acsp");
        assert_eq!(&SRGB_ICC_PROFILE[16..20], b"RGB ");
    }

    #[test]
    fn font_is_truetype() {
        assert_eq!(&FONT_DATA[..4], &[0, 1, 0, 0]);
    }

    fn table_tags(font: &[u8]) -> Vec<[u8; 4]> {
        let count = usize::from(u16::from_be_bytes([font[4], font[5]]));
        (0..count)
            .map(|i| {
                let at = 12 + i * 16;
                [font[at], font[at + 1], font[at + 2], font[at + 3]]
            })
            .collect()
    }

    #[test]
    fn font_is_a_subset() {
        assert!(FONT_DATA.len() < 150_000);
        let tags = table_tags(FONT_DATA);
        for required in [b"cmap", b"glyf", b"head", b"hhea", b"hmtx", b"loca", b"maxp"] {
            assert!(tags.contains(required), "{}", String::from_utf8_lossy(required));
        }
        for dropped in [b"GPOS", b"GSUB", b"kern"] {
            assert!(!tags.contains(dropped));
        }

        let (tag, name) = FONT_NAME.split_once('+').unwrap();
        assert_eq!(tag.len(), 6);
        assert!(tag.bytes().all(|b| b.is_ascii_uppercase()));
        assert_eq!(name, "DejaVuSans");
    }

    #[test]
    fn subset_keeps_win_ansi_metrics() {
        let m = crate::font::FontMetrics::parse(FONT_DATA).unwrap();
        for code in 32u8..=255 {
            let c = super::super::encoding::win_ansi_char(code);
            if code == 0x7F || ((0x80..=0x9F).contains(&code) && c == char::from(code)) {
                continue;
            }
            assert!(m.char_width(c) > 0, "{code:#x}");
        }
    }

}
