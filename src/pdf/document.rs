use lopdf::xref::XrefType;
use lopdf::{Dictionary, Document, Object, Stream, StringFormat, dictionary};
use tracing::{debug, instrument};

use super::content::{PAGE_HEIGHT, PAGE_WIDTH, page_content};
use super::encoding::win_ansi_char;
use super::resources::{FONT_DATA, FONT_NAME, SRGB_ICC_PROFILE, SRGB_IDENTIFIER};
use super::xmp::build_xmp;
use crate::cii::FACTURX_FILENAME;
use crate::core::{FacturxError, Invoice, Totals};
use crate::font::FontMetrics;

/// `/Producer` in the info dictionary and XMP packet.
pub const PRODUCER: &str = concat!("facturx ", env!("CARGO_PKG_VERSION"));

/// Written verbatim after `%PDF-`. The second line is the binary marker comment.
const PDF_VERSION: &str = "1.7\n%\u{e2}\u{e3}\u{cf}\u{d3}";

const OBJECT_COUNT: usize = 15;

const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 255;

/// DejaVu Sans cap height (1493 units) in glyph space.
const CAP_HEIGHT: i64 = 729;
const STEM_V: i64 = 80;
/// Nonsymbolic.
const FONT_FLAGS: i64 = 32;

/// Assemble the single-page PDF/A-3B document with `xml` attached.
///
/// `invoice` must have passed validation and `totals` must come from it.
#[instrument(level = "debug", skip_all, fields(number = %invoice.number))]
pub fn build_pdf(
    invoice: &Invoice,
    totals: &Totals,
    xml: &str,
    metrics: &FontMetrics,
) -> Result<Vec<u8>, FacturxError> {
    let mut doc = Document::with_version(PDF_VERSION);
    doc.reference_table.cross_reference_type = XrefType::CrossReferenceTable;

    let catalog = doc.new_object_id();
    let info = doc.new_object_id();
    let pages = doc.new_object_id();
    let struct_tree = doc.new_object_id();
    let metadata = doc.new_object_id();
    let output_intent = doc.new_object_id();
    let filespec = doc.new_object_id();
    let page = doc.new_object_id();
    let icc = doc.new_object_id();
    let embedded_xml = doc.new_object_id();
    let contents = doc.new_object_id();
    let font = doc.new_object_id();
    let font_descriptor = doc.new_object_id();
    let widths = doc.new_object_id();
    let font_file = doc.new_object_id();

    doc.objects.insert(
        catalog,
        dictionary! {
            "Type" => "Catalog",
            "Pages" => pages,
            "MarkInfo" => dictionary! { "Marked" => true },
            "StructTreeRoot" => struct_tree,
            "Metadata" => metadata,
            "OutputIntents" => vec![Object::from(output_intent)],
            "Names" => dictionary! {
                "EmbeddedFiles" => dictionary! {
                    "Names" => vec![
                        Object::string_literal(FACTURX_FILENAME),
                        Object::from(filespec),
                    ],
                },
            },
            "AF" => vec![Object::from(filespec)],
        }
        .into(),
    );

    let title = format!("Facture {}", invoice.number);
    let pdf_date = format!("D:{}", invoice.issue_date);
    doc.objects.insert(
        info,
        dictionary! {
            "Title" => text_string(&title),
            "Producer" => text_string(PRODUCER),
            "CreationDate" => Object::string_literal(pdf_date.as_str()),
            "ModDate" => Object::string_literal(pdf_date.as_str()),
        }
        .into(),
    );

    doc.objects.insert(
        pages,
        dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::from(page)],
            "Count" => 1i64,
        }
        .into(),
    );

    doc.objects
        .insert(struct_tree, dictionary! { "Type" => "StructTreeRoot" }.into());

    let xmp = build_xmp(&title, &invoice.seller.name, PRODUCER, &invoice.issue_date);
    doc.objects.insert(
        metadata,
        Stream::new(
            dictionary! { "Type" => "Metadata", "Subtype" => "XML" },
            xmp.into_bytes(),
        )
        .with_compression(false)
        .into(),
    );

    doc.objects.insert(
        output_intent,
        dictionary! {
            "Type" => "OutputIntent",
            "S" => "GTS_PDFA1",
            "OutputConditionIdentifier" => Object::string_literal(SRGB_IDENTIFIER),
            "RegistryName" => Object::string_literal("http://www.color.org"),
            "Info" => Object::string_literal(SRGB_IDENTIFIER),
            "DestOutputProfile" => icc,
        }
        .into(),
    );

    doc.objects.insert(
        filespec,
        dictionary! {
            "Type" => "Filespec",
            "F" => Object::string_literal(FACTURX_FILENAME),
            "UF" => Object::string_literal(FACTURX_FILENAME),
            "Desc" => Object::string_literal("Factur-X XML invoice"),
            "AFRelationship" => "Alternative",
            "EF" => dictionary! { "F" => embedded_xml, "UF" => embedded_xml },
        }
        .into(),
    );

    doc.objects.insert(
        page,
        dictionary! {
            "Type" => "Page",
            "Parent" => pages,
            "MediaBox" => vec![
                Object::from(0i64),
                Object::from(0i64),
                Object::from(PAGE_WIDTH),
                Object::from(PAGE_HEIGHT),
            ],
            "Contents" => contents,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font },
            },
        }
        .into(),
    );

    let mut icc_hex = hex::encode_upper(SRGB_ICC_PROFILE).into_bytes();
    icc_hex.push(b'>');
    doc.objects.insert(
        icc,
        Stream::new(
            dictionary! { "N" => 3i64, "Filter" => "ASCIIHexDecode" },
            icc_hex,
        )
        .with_compression(false)
        .into(),
    );

    let xml_bytes = xml.as_bytes().to_vec();
    doc.objects.insert(
        embedded_xml,
        Stream::new(
            dictionary! {
                "Type" => "EmbeddedFile",
                "Subtype" => "text/xml",
                "Params" => dictionary! { "Size" => xml_bytes.len() as i64 },
            },
            xml_bytes,
        )
        .with_compression(false)
        .into(),
    );

    doc.objects.insert(
        contents,
        Stream::new(Dictionary::new(), page_content(invoice, totals, metrics))
            .with_compression(false)
            .into(),
    );

    doc.objects.insert(
        font,
        dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => FONT_NAME,
            "FirstChar" => i64::from(FIRST_CHAR),
            "LastChar" => i64::from(LAST_CHAR),
            "Encoding" => "WinAnsiEncoding",
            "Widths" => widths,
            "FontDescriptor" => font_descriptor,
        }
        .into(),
    );

    let scaled = |v: i16| i64::from(metrics.scale_to_1000(i32::from(v)));
    let bbox = metrics.bbox();
    doc.objects.insert(
        font_descriptor,
        dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => FONT_NAME,
            "Flags" => FONT_FLAGS,
            "FontBBox" => bbox.iter().map(|v| Object::from(scaled(*v))).collect::<Vec<_>>(),
            "ItalicAngle" => 0i64,
            "Ascent" => scaled(metrics.ascender()),
            "Descent" => scaled(metrics.descender()),
            "CapHeight" => CAP_HEIGHT,
            "StemV" => STEM_V,
            "FontFile2" => font_file,
        }
        .into(),
    );

    doc.objects.insert(widths, Object::Array(font_widths(metrics)));

    doc.objects.insert(
        font_file,
        Stream::new(
            dictionary! { "Length1" => FONT_DATA.len() as i64 },
            FONT_DATA.to_vec(),
        )
        .with_compression(false)
        .into(),
    );

    if doc.objects.len() != OBJECT_COUNT {
        return Err(FacturxError::Pdf(format!(
            "expected {OBJECT_COUNT} objects, built {}",
            doc.objects.len()
        )));
    }

    let id = file_id(&invoice.number, &invoice.issue_date).to_vec();
    doc.trailer.set("Root", catalog);
    doc.trailer.set("Info", info);
    doc.trailer.set(
        "ID",
        vec![
            Object::String(id.clone(), StringFormat::Hexadecimal),
            Object::String(id, StringFormat::Hexadecimal),
        ],
    );

    let mut out = Vec::new();
    doc.save_to(&mut out)
        .map_err(|e| FacturxError::Pdf(format!("failed to save PDF: {e}")))?;
    out.push(b'\n');

    debug!(bytes = out.len(), "pdf serialized");
    Ok(out)
}

/// A text string: literal when ASCII, UTF-16BE with BOM otherwise.
fn text_string(s: &str) -> Object {
    if s.is_ascii() {
        return Object::string_literal(s);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// `/Widths` for WinAnsi codes 32..=255 in glyph space.
pub fn font_widths(metrics: &FontMetrics) -> Vec<Object> {
    (FIRST_CHAR..=LAST_CHAR)
        .map(|code| {
            let width = metrics.char_width(win_ansi_char(code));
            Object::from(i64::from(metrics.scale_to_1000(i32::from(width))))
        })
        .collect()
}

/// 128-bit document identifier derived from invoice number and date.
///
/// Not a content hash. The same `number` and `date` always give the same id.
pub fn file_id(number: &str, date: &str) -> [u8; 16] {
    let input = format!("{number}_{date}");
    let mut hash = [0u8; 16];

    for (i, b) in input.bytes().enumerate() {
        let idx = i % 16;
        hash[idx] = hash[idx].wrapping_add(b).wrapping_mul(33);
        hash[idx] = hash[idx].wrapping_add((i as u8).wrapping_mul(7));
    }

    for i in 0..16 {
        hash[i] = hash[i].wrapping_add(hash[(i + 7) % 16]).wrapping_mul(31);
    }

    hash
}
