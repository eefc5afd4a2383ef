//! Factur-X CII XML generation.
//!
//! Serializes an [`Invoice`](crate::core::Invoice) into UN/CEFACT Cross
//! Industry Invoice (D16B) XML for the Factur-X 1.0 BASIC profile.
//! Element order follows the CII schema exactly; validators are
//! order-sensitive.
//!
//! ```
//! use facturx::core::*;
//! use rust_decimal_macros::dec;
//!
//! let invoice = InvoiceBuilder::new("FA-001", "20240115")
//!     .seller(PartyBuilder::new("ACME", "1 Rue", "75001", "Paris", "FR")
//!         .siret("12345678900006").build())
//!     .buyer(PartyBuilder::new("Client", "2 Rue", "69001", "Lyon", "FR").build())
//!     .add_line(LineItemBuilder::new("Conseil", dec!(1), dec!(100)).build())
//!     .build()
//!     .unwrap();
//!
//! let xml = facturx::cii::to_cii_xml(&invoice, &calculate_totals(&invoice)).unwrap();
//! assert!(xml.contains("<ram:GrandTotalAmount>120.00</ram:GrandTotalAmount>"));
//! ```

mod invoice;
pub(crate) mod xml_utils;

pub use invoice::to_cii_xml;

/// Filename of the XML attachment inside the PDF.
pub const FACTURX_FILENAME: &str = "factur-x.xml";

/// Guideline identifier for the Factur-X 1.0 BASIC profile (BT-24).
pub const BASIC_PROFILE_URN: &str =
    "urn:cen.eu:en16931:2017#compliant#urn:factur-x.eu:1p0:basic";

/// XMP `fx:ConformanceLevel` value for the BASIC profile.
pub const BASIC_CONFORMANCE_LEVEL: &str = "BASIC";

/// Business process type (BT-23).
pub const BUSINESS_PROCESS_ID: &str = "A1";

/// All amounts are in euro.
pub const CURRENCY: &str = "EUR";

/// Payment terms (BT-20), required when an amount is due.
pub const PAYMENT_TERMS: &str = "Paiement à réception de facture";

/// CII namespace URIs.
pub mod cii_ns {
    pub const RSM: &str = "urn:un:unece:uncefact:data:standard:CrossIndustryInvoice:100";
    pub const RAM: &str =
        "urn:un:unece:uncefact:data:standard:ReusableAggregateBusinessInformationEntity:100";
    pub const UDT: &str = "urn:un:unece:uncefact:data:standard:UnqualifiedDataType:100";
    pub const QDT: &str = "urn:un:unece:uncefact:data:standard:QualifiedDataType:100";
}
