//! # facturx
//!
//! Factur-X 1.0 invoice generation: a single-page PDF/A-3B document with
//! the EN 16931 CII XML attached as `factur-x.xml`.
//!
//! All monetary values use [`rust_decimal::Decimal`]; rounding happens only
//! when amounts are formatted (half-up, 2 decimals for amounts and 4 for
//! quantities and unit prices). Output is deterministic: the same invoice
//! always produces the same bytes.
//!
//! ## Quick Start
//!
//! ```rust
//! use facturx::core::*;
//! use rust_decimal_macros::dec;
//!
//! let invoice = InvoiceBuilder::new("FA-2024-001", "20240115")
//!     .seller(PartyBuilder::new("ACME SARL", "12 Rue de Rivoli", "75001", "Paris", "FR")
//!         .siret("12345678900006")
//!         .build())
//!     .buyer(PartyBuilder::new("Client SA", "3 Quai Perrache", "69002", "Lyon", "FR").build())
//!     .add_line(LineItemBuilder::new("Prestation de conseil", dec!(10), dec!(100)).build())
//!     .vat_regime(VatRegime::FranchiseExemption)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(calculate_totals(&invoice).grand_total, dec!(1000));
//!
//! let xml = facturx::generate_xml_only(&invoice).unwrap();
//! assert!(xml.contains("VATEX-FR-FRANCHISE"));
//!
//! let pdf = facturx::generate(&invoice).unwrap();
//! assert!(pdf.ends_with(b"%%EOF\n"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice types, builders, validation, SIRET checksum, totals |
//! | `cii` (default) | Factur-X BASIC CII XML generation, `generate_xml_only` |
//! | `pdf` (default) | Font metrics, PDF/A-3B rendering (via `lopdf`), `Generator`, `generate` |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "cii")]
pub mod cii;

#[cfg(feature = "pdf")]
pub mod font;

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "cii")]
mod generate;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;

#[cfg(feature = "cii")]
pub use generate::generate_xml_only;

#[cfg(feature = "pdf")]
pub use generate::{Generator, generate};
