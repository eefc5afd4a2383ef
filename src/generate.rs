//! Entry points: validate, calculate, then render XML and PDF.

#[cfg(feature = "pdf")]
use std::sync::OnceLock;

use tracing::instrument;

use crate::cii::to_cii_xml;
use crate::core::{FacturxError, Invoice, try_calculate_totals, validate};
#[cfg(feature = "pdf")]
use crate::font::{FontError, FontMetrics};
#[cfg(feature = "pdf")]
use crate::pdf::{FONT_DATA, build_pdf};

/// Backs the free [`generate`] function; the font is parsed on first use.
#[cfg(feature = "pdf")]
static GENERATOR: OnceLock<Result<Generator, FontError>> = OnceLock::new();

/// Reusable generator holding the parsed metrics of the embedded font.
///
/// Construct once and share; generation takes `&self` and keeps no state
/// between calls.
///
/// ```
/// use facturx::Generator;
/// use facturx::core::*;
/// use rust_decimal_macros::dec;
///
/// let invoice = InvoiceBuilder::new("FA-001", "20240115")
///     .seller(PartyBuilder::new("ACME", "1 Rue", "75001", "Paris", "FR")
///         .siret("12345678900006").build())
///     .buyer(PartyBuilder::new("Client", "2 Rue", "69001", "Lyon", "FR").build())
///     .add_line(LineItemBuilder::new("Conseil", dec!(1), dec!(100)).build())
///     .build()
///     .unwrap();
///
/// let generator = Generator::new().unwrap();
/// let pdf = generator.generate(&invoice).unwrap();
/// assert!(pdf.starts_with(b"%PDF-1.7"));
/// ```
#[cfg(feature = "pdf")]
#[derive(Debug, Clone)]
pub struct Generator {
    metrics: FontMetrics,
}

#[cfg(feature = "pdf")]
impl Generator {
    /// Parse the embedded font. Fails only if the bundled font is broken.
    pub fn new() -> Result<Self, FacturxError> {
        let metrics = FontMetrics::parse(FONT_DATA)?;
        Ok(Self { metrics })
    }

    /// The process-wide generator used by the free functions.
    pub fn shared() -> Result<&'static Generator, FacturxError> {
        GENERATOR
            .get_or_init(|| FontMetrics::parse(FONT_DATA).map(|metrics| Generator { metrics }))
            .as_ref()
            .map_err(|e| FacturxError::Font(e.clone()))
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Produce the hybrid PDF/A-3B document for `invoice`.
    ///
    /// Validation runs first; an invalid invoice yields
    /// [`FacturxError::Validation`] and no output.
    #[instrument(level = "debug", skip_all, fields(number = %invoice.number))]
    pub fn generate(&self, invoice: &Invoice) -> Result<Vec<u8>, FacturxError> {
        validate(invoice)?;
        let totals = try_calculate_totals(invoice)?;
        let xml = to_cii_xml(invoice, &totals)?;
        let pdf = build_pdf(invoice, &totals, &xml, &self.metrics)?;
        tracing::debug!(xml_bytes = xml.len(), pdf_bytes = pdf.len(), "generated invoice");
        Ok(pdf)
    }

    /// Produce only the CII XML that [`generate`](Self::generate) would embed.
    pub fn generate_xml_only(&self, invoice: &Invoice) -> Result<String, FacturxError> {
        generate_xml_only(invoice)
    }
}

/// One-shot PDF generation through [`Generator::shared`].
#[cfg(feature = "pdf")]
pub fn generate(invoice: &Invoice) -> Result<Vec<u8>, FacturxError> {
    Generator::shared()?.generate(invoice)
}

/// Validate, calculate and serialize the CII XML only.
#[instrument(level = "debug", skip_all, fields(number = %invoice.number))]
pub fn generate_xml_only(invoice: &Invoice) -> Result<String, FacturxError> {
    validate(invoice)?;
    let totals = try_calculate_totals(invoice)?;
    to_cii_xml(invoice, &totals)
}
