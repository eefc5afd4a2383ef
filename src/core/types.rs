use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// BG-0: Invoice, the caller-owned description of one invoice.
///
/// The engine only ever borrows it; nothing in this crate mutates an `Invoice`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// BT-1: Invoice number.
    pub number: String,
    /// BT-2: Issue date as `YYYYMMDD` (CII date format code 102).
    pub issue_date: String,
    /// BG-4: Seller.
    pub seller: Party,
    /// BG-7: Buyer.
    pub buyer: Party,
    /// BG-25: Invoice lines, in display order.
    pub lines: Vec<LineItem>,
    /// VAT regime applying to the whole invoice.
    pub vat_regime: VatRegime,
    /// Free-text legal mentions. One source line per rendered line.
    #[serde(default)]
    pub custom_mentions: Option<String>,
    /// Append the "Entrepreneur Individuel" suffix to the seller name.
    #[serde(default)]
    pub individual_entrepreneur: bool,
    /// Set when the invoice has already been paid.
    #[serde(default)]
    pub payment: Option<Payment>,
}

/// BG-4 / BG-7: Party (seller or buyer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// BT-27 / BT-44: Name.
    pub name: String,
    /// BT-35 / BT-50: Street address.
    pub address: String,
    /// BT-38 / BT-53: Postal code.
    pub postal_code: String,
    /// BT-37 / BT-52: City.
    pub city: String,
    /// BT-40 / BT-55: Country code (ISO 3166-1 alpha-2).
    pub country_code: String,
    /// BT-30 / BT-47: SIRET, the 14-digit French establishment identifier.
    /// Mandatory for the seller, optional for a B2C buyer.
    #[serde(default)]
    pub siret: Option<String>,
    /// BT-31 / BT-48: VAT identifier (e.g. "FR12345678901").
    #[serde(default)]
    pub vat_number: Option<String>,
    /// Professional identifiers (ADELI, RPPS, ...).
    #[serde(default)]
    pub professional_ids: Vec<ProfessionalId>,
}

impl Party {
    /// SIRET, or `None` when absent or blank.
    pub fn siret(&self) -> Option<&str> {
        non_blank(self.siret.as_deref())
    }

    /// VAT identifier, or `None` when absent or blank.
    pub fn vat_number(&self) -> Option<&str> {
        non_blank(self.vat_number.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// A professional register identifier printed next to the SIRET.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfessionalId {
    /// Register name, e.g. "ADELI" or "RPPS".
    pub kind: String,
    pub value: String,
}

/// BG-25: Invoice line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// BT-153: Item name.
    pub description: String,
    /// BT-129: Invoiced quantity.
    pub quantity: Decimal,
    /// BT-146: Item net price (per unit, excluding VAT).
    pub unit_price: Decimal,
    /// Date the service was rendered, shown on the page only.
    #[serde(default)]
    pub service_date: Option<NaiveDate>,
}

impl LineItem {
    /// BT-131: Line net amount, unrounded.
    ///
    /// # Panics
    ///
    /// When the product overflows [`Decimal`]. Validated invoices never do;
    /// use [`checked_net_amount`](Self::checked_net_amount) otherwise.
    pub fn net_amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }

    /// Line net amount, or `None` when it does not fit in a [`Decimal`].
    pub fn checked_net_amount(&self) -> Option<Decimal> {
        self.quantity.checked_mul(self.unit_price)
    }
}

/// VAT regime applied to every line of the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VatRegime {
    /// Standard VAT at the given percentage (e.g. 20 for 20%).
    Standard { rate: Decimal },
    /// Franchise en base de TVA, art. 293 B du CGI.
    FranchiseExemption,
    /// Exemption for medical and paramedical care, art. 261-4-1° du CGI.
    HealthExemption,
}

impl VatRegime {
    /// UNTDID 5305 tax category code.
    pub fn category_code(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "S",
            Self::FranchiseExemption | Self::HealthExemption => "E",
        }
    }

    /// Percentage applied to the tax base. Exemptions always yield zero.
    pub fn rate(&self) -> Decimal {
        match self {
            Self::Standard { rate } => *rate,
            Self::FranchiseExemption | Self::HealthExemption => Decimal::ZERO,
        }
    }

    /// BT-121: VATEX exemption reason code.
    pub fn exemption_code(&self) -> Option<&'static str> {
        match self {
            Self::Standard { .. } => None,
            Self::FranchiseExemption => Some("VATEX-FR-FRANCHISE"),
            Self::HealthExemption => Some("VATEX-EU-O"),
        }
    }

    /// BT-120: Exemption reason text, also printed in the legal mentions.
    pub fn exemption_text(&self) -> Option<&'static str> {
        match self {
            Self::Standard { .. } => None,
            Self::FranchiseExemption => Some("TVA non applicable, art. 293 B du CGI"),
            Self::HealthExemption => Some("Exonération de TVA, art. 261-4-1° du CGI"),
        }
    }

    /// The regime line printed in the legal mentions area.
    pub fn legal_mention(&self) -> String {
        match self {
            Self::Standard { rate } => format!("TVA {}%", rate.round().normalize()),
            Self::FranchiseExemption | Self::HealthExemption => {
                self.exemption_text().unwrap_or_default().to_string()
            }
        }
    }
}

/// Payment already received for the invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub date: NaiveDate,
    pub method: PaymentMethod,
}

/// How a paid invoice was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Check,
    Card,
    Transfer,
}

impl PaymentMethod {
    /// French label used on the printed invoice.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "espèces",
            Self::Check => "chèque",
            Self::Card => "carte bancaire",
            Self::Transfer => "virement",
        }
    }
}

/// BG-22: Document totals, derived per generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// BT-106: Sum of all line net amounts.
    pub line_total: Decimal,
    /// BT-109: Invoice total without VAT. Equal to `line_total`, no allowances or charges.
    pub tax_base: Decimal,
    /// BT-110: Total VAT amount.
    pub tax_total: Decimal,
    /// BT-112: Invoice total with VAT.
    pub grand_total: Decimal,
    /// BT-115: Amount due for payment.
    pub due_amount: Decimal,
    /// BT-119: VAT rate applied (zero for exemptions).
    pub vat_rate: Decimal,
}
