use thiserror::Error;

#[cfg(feature = "pdf")]
use crate::font::FontError;

/// Errors that can occur while building or generating an invoice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FacturxError {
    /// The invoice description failed validation; nothing was generated.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Builder encountered invalid or missing configuration.
    #[error("builder error: {0}")]
    Builder(String),

    /// The embedded font program could not be parsed.
    #[cfg(feature = "pdf")]
    #[error("font error: {0}")]
    Font(#[from] FontError),

    /// XML generation error.
    #[error("XML error: {0}")]
    Xml(String),

    /// The PDF document could not be assembled or serialized.
    #[error("PDF error: {0}")]
    Pdf(String),
}

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "seller.siret", "lines[1].quantity").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
