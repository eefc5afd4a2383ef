use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::FacturxError;
use super::types::*;
use super::validation;

/// Builder for constructing valid invoices.
///
/// ```
/// use facturx::core::*;
/// use rust_decimal_macros::dec;
///
/// let invoice = InvoiceBuilder::new("FA-2024-001", "20240115")
///     .seller(PartyBuilder::new("ACME SARL", "12 Rue de Rivoli", "75001", "Paris", "FR")
///         .siret("12345678900006")
///         .vat_number("FR12345678901")
///         .build())
///     .buyer(PartyBuilder::new("Client SA", "3 Quai Perrache", "69002", "Lyon", "FR").build())
///     .add_line(LineItemBuilder::new("Prestation de conseil", dec!(10), dec!(100)).build())
///     .vat_regime(VatRegime::Standard { rate: dec!(20) })
///     .build()
///     .unwrap();
///
/// assert_eq!(calculate_totals(&invoice).grand_total, dec!(1200));
/// ```
pub struct InvoiceBuilder {
    number: String,
    issue_date: String,
    seller: Option<Party>,
    buyer: Option<Party>,
    lines: Vec<LineItem>,
    vat_regime: VatRegime,
    custom_mentions: Option<String>,
    individual_entrepreneur: bool,
    payment: Option<Payment>,
}

impl InvoiceBuilder {
    /// Start an invoice. `issue_date` is `YYYYMMDD`.
    pub fn new(number: impl Into<String>, issue_date: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            issue_date: issue_date.into(),
            seller: None,
            buyer: None,
            lines: Vec::new(),
            vat_regime: VatRegime::Standard {
                rate: Decimal::new(20, 0),
            },
            custom_mentions: None,
            individual_entrepreneur: false,
            payment: None,
        }
    }

    /// Start an invoice from a calendar date.
    pub fn with_date(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self::new(number, issue_date.format("%Y%m%d").to_string())
    }

    pub fn seller(mut self, party: Party) -> Self {
        self.seller = Some(party);
        self
    }

    pub fn buyer(mut self, party: Party) -> Self {
        self.buyer = Some(party);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn vat_regime(mut self, regime: VatRegime) -> Self {
        self.vat_regime = regime;
        self
    }

    pub fn custom_mentions(mut self, mentions: impl Into<String>) -> Self {
        self.custom_mentions = Some(mentions.into());
        self
    }

    pub fn individual_entrepreneur(mut self, enabled: bool) -> Self {
        self.individual_entrepreneur = enabled;
        self
    }

    pub fn paid(mut self, date: NaiveDate, method: PaymentMethod) -> Self {
        self.payment = Some(Payment { date, method });
        self
    }

    /// Build the invoice and validate it. Returns the first validation failure.
    pub fn build(self) -> Result<Invoice, FacturxError> {
        let invoice = self.build_unchecked()?;
        validation::validate(&invoice)?;
        Ok(invoice)
    }

    /// Build without validation. Fails only if seller or buyer is missing.
    pub fn build_unchecked(self) -> Result<Invoice, FacturxError> {
        let seller = self
            .seller
            .ok_or_else(|| FacturxError::Builder("seller is required".into()))?;
        let buyer = self
            .buyer
            .ok_or_else(|| FacturxError::Builder("buyer is required".into()))?;

        Ok(Invoice {
            number: self.number,
            issue_date: self.issue_date,
            seller,
            buyer,
            lines: self.lines,
            vat_regime: self.vat_regime,
            custom_mentions: self.custom_mentions,
            individual_entrepreneur: self.individual_entrepreneur,
            payment: self.payment,
        })
    }
}

/// Builder for Party (seller/buyer).
pub struct PartyBuilder {
    name: String,
    address: String,
    postal_code: String,
    city: String,
    country_code: String,
    siret: Option<String>,
    vat_number: Option<String>,
    professional_ids: Vec<ProfessionalId>,
}

impl PartyBuilder {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        postal_code: impl Into<String>,
        city: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            postal_code: postal_code.into(),
            city: city.into(),
            country_code: country_code.into(),
            siret: None,
            vat_number: None,
            professional_ids: Vec::new(),
        }
    }

    pub fn siret(mut self, siret: impl Into<String>) -> Self {
        self.siret = Some(siret.into());
        self
    }

    pub fn vat_number(mut self, number: impl Into<String>) -> Self {
        self.vat_number = Some(number.into());
        self
    }

    pub fn professional_id(mut self, kind: impl Into<String>, value: impl Into<String>) -> Self {
        self.professional_ids.push(ProfessionalId {
            kind: kind.into(),
            value: value.into(),
        });
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            address: self.address,
            postal_code: self.postal_code,
            city: self.city,
            country_code: self.country_code,
            siret: self.siret,
            vat_number: self.vat_number,
            professional_ids: self.professional_ids,
        }
    }
}

/// Builder for LineItem.
pub struct LineItemBuilder {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    service_date: Option<NaiveDate>,
}

impl LineItemBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            service_date: None,
        }
    }

    pub fn service_date(mut self, date: NaiveDate) -> Self {
        self.service_date = Some(date);
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            service_date: self.service_date,
        }
    }
}
