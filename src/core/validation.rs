use rust_decimal::Decimal;

use super::calculation::try_calculate_totals;
use super::error::ValidationError;
use super::types::*;

/// Validate an invoice and return the first failure.
///
/// Checks run in a fixed order (number, date, lines, seller, buyer, regime),
/// so the reported field is stable for a given input.
pub fn validate(invoice: &Invoice) -> Result<(), ValidationError> {
    match validate_all(invoice).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Validate an invoice and return every failure found, in check order.
///
/// At most one error is reported per field: sub-checks on the same field
/// (length, digits, checksum) stop at the first that fails. Totals are
/// checked for overflow last, and only when every other check passed.
pub fn validate_all(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.number.trim().is_empty() {
        errors.push(ValidationError::new(
            "number",
            "invoice number cannot be empty",
        ));
    }

    validate_issue_date(&invoice.issue_date, &mut errors);

    if invoice.lines.is_empty() {
        errors.push(ValidationError::new(
            "lines",
            "invoice must have at least one line",
        ));
    }
    for (i, line) in invoice.lines.iter().enumerate() {
        validate_line(line, i, &mut errors);
    }

    validate_party(&invoice.seller, "seller", true, &mut errors);
    validate_party(&invoice.buyer, "buyer", false, &mut errors);

    if let VatRegime::Standard { rate } = invoice.vat_regime {
        if rate < Decimal::ZERO {
            errors.push(ValidationError::new(
                "vat_regime",
                "VAT rate cannot be negative",
            ));
        }
    }

    if errors.is_empty() {
        if let Err(err) = try_calculate_totals(invoice) {
            errors.push(err);
        }
    }

    errors
}

/// Check a SIRET: exactly 14 ASCII digits with a valid checksum.
pub fn is_valid_siret(siret: &str) -> bool {
    siret.len() == 14 && siret.bytes().all(|b| b.is_ascii_digit()) && siret_checksum_ok(siret)
}

/// Luhn-style checksum over 14 digits where the digits at odd (0-based)
/// positions are doubled.
///
/// The caller guarantees `digits` is 14 ASCII digits.
fn siret_checksum_ok(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = digit * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                digit
            }
        })
        .sum();
    sum % 10 == 0
}

/// `YYYYMMDD`, year in 2000..=2100, month 1..=12, day 1..=31.
///
/// Days are not checked against the month: `20240231` is accepted.
fn validate_issue_date(date: &str, errors: &mut Vec<ValidationError>) {
    if date.len() != 8 {
        errors.push(ValidationError::new(
            "issue_date",
            "date must be in YYYYMMDD format",
        ));
        return;
    }
    if !date.bytes().all(|b| b.is_ascii_digit()) {
        errors.push(ValidationError::new(
            "issue_date",
            "date must contain only digits",
        ));
        return;
    }

    let year = parse_digits(&date[0..4]);
    let month = parse_digits(&date[4..6]);
    let day = parse_digits(&date[6..8]);
    if !(2000..=2100).contains(&year) || !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        errors.push(ValidationError::new("issue_date", "invalid date values"));
    }
}

fn validate_line(line: &LineItem, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("lines[{index}]");

    if line.quantity <= Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{prefix}.quantity"),
            "quantity must be positive",
        ));
    }

    if line.unit_price < Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{prefix}.unit_price"),
            "unit price cannot be negative",
        ));
    }
}

fn validate_party(
    party: &Party,
    prefix: &str,
    siret_required: bool,
    errors: &mut Vec<ValidationError>,
) {
    if party.name.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.name"),
            format!("{prefix} name cannot be empty"),
        ));
    }

    match party.siret() {
        Some(siret) => validate_siret(siret, &format!("{prefix}.siret"), errors),
        None if siret_required => errors.push(ValidationError::new(
            format!("{prefix}.siret"),
            "SIRET must be 14 digits",
        )),
        None => {}
    }

    let country = &party.country_code;
    if country.chars().count() != 2 {
        errors.push(ValidationError::new(
            format!("{prefix}.country_code"),
            "country code must be 2 letters",
        ));
    } else if !country.chars().all(char::is_alphabetic) {
        errors.push(ValidationError::new(
            format!("{prefix}.country_code"),
            "country code must contain only letters",
        ));
    }
}

fn validate_siret(siret: &str, field: &str, errors: &mut Vec<ValidationError>) {
    if siret.len() != 14 {
        errors.push(ValidationError::new(field, "SIRET must be 14 digits"));
    } else if !siret.bytes().all(|b| b.is_ascii_digit()) {
        errors.push(ValidationError::new(
            field,
            "SIRET must contain only digits",
        ));
    } else if !siret_checksum_ok(siret) {
        errors.push(ValidationError::new(
            field,
            "SIRET checksum invalid (Luhn)",
        ));
    }
}

fn parse_digits(s: &str) -> u32 {
    s.bytes().fold(0, |n, b| n * 10 + u32::from(b - b'0'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn party(name: &str, siret: Option<&str>) -> Party {
        Party {
            name: name.into(),
            address: "1 Rue de la Paix".into(),
            postal_code: "75002".into(),
            city: "Paris".into(),
            country_code: "FR".into(),
            siret: siret.map(String::from),
            vat_number: None,
            professional_ids: Vec::new(),
        }
    }

    fn invoice() -> Invoice {
        Invoice {
            number: "FA-2024-001".into(),
            issue_date: "20240115".into(),
            seller: party("ACME", Some("12345678900006")),
            buyer: party("Client", None),
            lines: vec![LineItem {
                description: "Conseil".into(),
                quantity: dec!(1),
                unit_price: dec!(100),
                service_date: None,
            }],
            vat_regime: VatRegime::Standard { rate: dec!(20) },
            custom_mentions: None,
            individual_entrepreneur: false,
            payment: None,
        }
    }

    #[test]
    fn siret_checksum_known_values() {
        assert!(is_valid_siret("12345678900006"));
        assert!(is_valid_siret("98765432100006"));
        assert!(is_valid_siret("00000000000000"));
        assert!(!is_valid_siret("12345678901234"));
        assert!(!is_valid_siret("11111111111111"));
        assert!(!is_valid_siret("1234567890000"));
        assert!(!is_valid_siret("1234567890000A"));
    }

    #[test]
    fn odd_positions_are_doubled() {
        // A single 5 at position 1 doubles to 10 -> 1; at position 0 it stays 5.
        assert!(!is_valid_siret("05000000000000"));
        assert!(!is_valid_siret("50000000000000"));
        // 5 at position 0 plus 5 at position 2: 5 + 5 = 10.
        assert!(is_valid_siret("50500000000000"));
        // 9 at position 1 doubles to 18 -> 9, balanced by a 1 at position 0.
        assert!(is_valid_siret("19000000000000"));
    }

    #[test]
    fn valid_invoice_passes() {
        assert_eq!(validate(&invoice()), Ok(()));
    }

    #[test]
    fn february_31_is_accepted() {
        let mut inv = invoice();
        inv.issue_date = "20240231".into();
        assert_eq!(validate(&inv), Ok(()));
    }

    #[test]
    fn date_bounds() {
        for bad in ["1999-0101", "19991231", "21010101", "20241301", "20240100", "2024011A", "2024011"] {
            let mut inv = invoice();
            inv.issue_date = bad.into();
            let err = validate(&inv).unwrap_err();
            assert_eq!(err.field, "issue_date", "{bad}");
        }
        let mut inv = invoice();
        inv.issue_date = "21000101".into();
        assert_eq!(validate(&inv), Ok(()));
    }

    #[test]
    fn first_failure_wins() {
        let mut inv = invoice();
        inv.number = "   ".into();
        inv.seller.name = String::new();
        let all = validate_all(&inv);
        assert_eq!(all.len(), 2);
        assert_eq!(validate(&inv).unwrap_err().field, "number");
    }

    #[test]
    fn line_checks() {
        let mut inv = invoice();
        inv.lines[0].quantity = dec!(0);
        assert_eq!(validate(&inv).unwrap_err().field, "lines[0].quantity");

        inv.lines[0].quantity = dec!(-1);
        assert_eq!(validate(&inv).unwrap_err().field, "lines[0].quantity");

        inv.lines[0].quantity = dec!(1);
        inv.lines[0].unit_price = dec!(-0.01);
        assert_eq!(validate(&inv).unwrap_err().field, "lines[0].unit_price");

        inv.lines[0].unit_price = dec!(0);
        assert_eq!(validate(&inv), Ok(()));

        inv.lines.clear();
        assert_eq!(validate(&inv).unwrap_err().field, "lines");
    }

    #[test]
    fn seller_siret_is_mandatory() {
        let mut inv = invoice();
        inv.seller.siret = None;
        assert_eq!(validate(&inv).unwrap_err().field, "seller.siret");

        inv.seller.siret = Some("12345678901234".into());
        let err = validate(&inv).unwrap_err();
        assert_eq!(err.field, "seller.siret");
        assert!(err.message.contains("checksum"));
    }

    #[test]
    fn buyer_siret_checked_when_present() {
        let mut inv = invoice();
        inv.buyer.siret = Some("123".into());
        assert_eq!(validate(&inv).unwrap_err().field, "buyer.siret");

        inv.buyer.siret = Some("98765432100006".into());
        assert_eq!(validate(&inv), Ok(()));
    }

    #[test]
    fn country_code_checks() {
        let mut inv = invoice();
        inv.buyer.country_code = "FRA".into();
        assert_eq!(validate(&inv).unwrap_err().field, "buyer.country_code");

        inv.buyer.country_code = "F1".into();
        let err = validate(&inv).unwrap_err();
        assert_eq!(err.message, "country code must contain only letters");
    }

    #[test]
    fn negative_standard_rate_rejected() {
        let mut inv = invoice();
        inv.vat_regime = VatRegime::Standard { rate: dec!(-5) };
        assert_eq!(validate(&inv).unwrap_err().field, "vat_regime");

        inv.vat_regime = VatRegime::Standard { rate: dec!(0) };
        assert_eq!(validate(&inv), Ok(()));
    }

    #[test]
    fn blank_buyer_siret_is_absent() {
        let mut inv = invoice();
        inv.buyer.siret = Some(String::new());
        assert_eq!(validate(&inv), Ok(()));

        inv.buyer.siret = Some("   ".into());
        assert_eq!(validate(&inv), Ok(()));
    }

    #[test]
    fn blank_seller_siret_is_missing() {
        let mut inv = invoice();
        inv.seller.siret = Some(String::new());
        let err = validate(&inv).unwrap_err();
        assert_eq!(err.field, "seller.siret");
        assert_eq!(err.message, "SIRET must be 14 digits");
    }

    #[test]
    fn overflowing_amounts_fail_validation() {
        let mut inv = invoice();
        inv.lines[0].quantity = Decimal::from(10u64.pow(15));
        inv.lines[0].unit_price = Decimal::from(10u64.pow(15));
        let err = validate(&inv).unwrap_err();
        assert_eq!(err.field, "lines[0].quantity");
        assert_eq!(err.message, "line amount out of range");
    }

    #[test]
    fn overflow_is_not_reported_alongside_other_errors() {
        let mut inv = invoice();
        inv.number = String::new();
        inv.lines[0].quantity = Decimal::MAX;
        inv.lines[0].unit_price = Decimal::MAX;
        let fields: Vec<String> = validate_all(&inv).into_iter().map(|e| e.field).collect();
        assert_eq!(fields, ["number"]);
    }

}
