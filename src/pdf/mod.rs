//! PDF/A-3B rendering of a Factur-X invoice.
//!
//! The document is a single A4 page drawn with an embedded TrueType font,
//! an sRGB output intent, XMP metadata declaring PDF/A-3B and the Factur-X
//! extension schema, and the CII XML attached as `factur-x.xml`.
//!
//! Objects are numbered in a fixed order and every timestamp comes from the
//! invoice issue date, so identical input always yields identical bytes.

mod content;
mod document;
mod encoding;
mod resources;
mod xmp;

pub use document::{PRODUCER, build_pdf, file_id};
pub use encoding::encode_win_ansi;
pub use resources::{FONT_DATA, FONT_NAME};
