use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::ValidationError;
use super::types::{Invoice, Totals};

/// Compute the document totals for an invoice.
///
/// Arithmetic is exact; nothing is rounded here. Amounts are rounded only
/// when formatted (see [`format_amount`] and [`format_quantity`]).
///
/// # Panics
///
/// When an amount overflows [`Decimal`]. Invoices accepted by
/// [`validate`](super::validate) never do; use [`try_calculate_totals`] for
/// unvalidated input.
pub fn calculate_totals(invoice: &Invoice) -> Totals {
    // BR-CO-10: sum of line net amounts
    let line_total: Decimal = invoice.lines.iter().map(|line| line.net_amount()).sum();

    // No document-level allowances or charges are modelled.
    let tax_base = line_total;

    let vat_rate = invoice.vat_regime.rate();
    let tax_total = tax_base * vat_rate / dec!(100);

    // BR-CO-15
    let grand_total = tax_base + tax_total;

    Totals {
        line_total,
        tax_base,
        tax_total,
        grand_total,
        due_amount: grand_total,
        vat_rate,
    }
}

/// [`calculate_totals`] with overflow reported as a validation error.
pub fn try_calculate_totals(invoice: &Invoice) -> Result<Totals, ValidationError> {
    let mut line_total = Decimal::ZERO;
    for (i, line) in invoice.lines.iter().enumerate() {
        let amount = line.checked_net_amount().ok_or_else(|| {
            ValidationError::new(format!("lines[{i}].quantity"), "line amount out of range")
        })?;
        line_total = line_total
            .checked_add(amount)
            .ok_or_else(|| ValidationError::new("lines", "line total out of range"))?;
    }

    let tax_base = line_total;
    let vat_rate = invoice.vat_regime.rate();
    let tax_total = tax_base
        .checked_mul(vat_rate)
        .and_then(|v| v.checked_div(dec!(100)))
        .ok_or_else(|| ValidationError::new("vat_regime", "tax amount out of range"))?;
    let grand_total = tax_base
        .checked_add(tax_total)
        .ok_or_else(|| ValidationError::new("vat_regime", "grand total out of range"))?;

    Ok(Totals {
        line_total,
        tax_base,
        tax_total,
        grand_total,
        due_amount: grand_total,
        vat_rate,
    })
}

/// Format a monetary amount with exactly 2 decimals (half-up).
pub fn format_amount(value: Decimal) -> String {
    format_fixed(value, 2)
}

/// Format a unit price or quantity with exactly 4 decimals (half-up).
pub fn format_quantity(value: Decimal) -> String {
    format_fixed(value, 4)
}

fn format_fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", dp as usize, rounded)
}
