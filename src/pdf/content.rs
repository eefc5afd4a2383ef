//! The page template: one A4 page drawn with explicit coordinates.

use std::fmt::Write;

use chrono::NaiveDate;

use super::encoding::{displayed, encode_win_ansi};
use crate::core::{Invoice, Party, Totals, format_amount};
use crate::font::FontMetrics;

/// A4 in points.
pub const PAGE_WIDTH: f64 = 595.28;
pub const PAGE_HEIGHT: f64 = 841.89;

const MARGIN: f64 = 50.0;
const HEADER_HEIGHT: f64 = 70.0;
const FOOTER_HEIGHT: f64 = 35.0;
const ROW_HEIGHT: f64 = 22.0;
const MENTIONS_Y: f64 = 110.0;
const MENTION_LINE_SPACING: f64 = 11.0;

const COL_DESC: f64 = MARGIN;
const COL_PRICE: f64 = MARGIN + 350.0;
const DESC_WIDTH: f64 = 260.0;
const QTY_RIGHT: f64 = MARGIN + 330.0;
const PRICE_RIGHT: f64 = MARGIN + 420.0;
const TOTAL_RIGHT: f64 = PAGE_WIDTH - MARGIN;

const FOOTER_TEXT: &str = "Document généré conformément à la norme Factur-X 1.0 (Profil BASIC)";

#[derive(Clone, Copy)]
struct Rgb(f64, f64, f64);

const PRIMARY: Rgb = Rgb(0.173, 0.243, 0.314);
const ACCENT: Rgb = Rgb(0.204, 0.596, 0.859);
const GRAY: Rgb = Rgb(0.584, 0.647, 0.651);
const LIGHT_BG: Rgb = Rgb(0.925, 0.941, 0.945);
const TEXT: Rgb = Rgb(0.2, 0.2, 0.2);
const WHITE: Rgb = Rgb(1.0, 1.0, 1.0);
const SUBTLE: Rgb = Rgb(0.8, 0.8, 0.8);

/// Content-stream writer. Every operator goes through here.
struct Canvas<'a> {
    ops: String,
    metrics: &'a FontMetrics,
}

// `fmt::Write` for `String` is infallible.
impl<'a> Canvas<'a> {
    fn new(metrics: &'a FontMetrics) -> Self {
        Self {
            ops: String::with_capacity(8192),
            metrics,
        }
    }

    fn fill_color(&mut self, c: Rgb) {
        let _ = writeln!(self.ops, "{:.3} {:.3} {:.3} rg", c.0, c.1, c.2);
    }

    fn stroke_color(&mut self, c: Rgb) {
        let _ = writeln!(self.ops, "{:.3} {:.3} {:.3} RG", c.0, c.1, c.2);
    }

    fn line_width(&mut self, w: f64) {
        let _ = writeln!(self.ops, "{w} w");
    }

    fn fill_rect(&mut self, c: Rgb, x: f64, y: f64, w: f64, h: f64) {
        self.fill_color(c);
        let _ = writeln!(self.ops, "{x:.2} {y:.2} {w:.2} {h:.2} re f");
    }

    fn stroke_rect(&mut self, c: Rgb, x: f64, y: f64, w: f64, h: f64) {
        self.stroke_color(c);
        let _ = writeln!(self.ops, "{x:.2} {y:.2} {w:.2} {h:.2} re S");
    }

    fn line(&mut self, c: Rgb, width: f64, from: (f64, f64), to: (f64, f64)) {
        self.stroke_color(c);
        self.line_width(width);
        let _ = writeln!(
            self.ops,
            "{:.2} {:.2} m {:.2} {:.2} l S",
            from.0, from.1, to.0, to.1
        );
        self.line_width(1.0);
    }

    fn text(&mut self, text: &str, x: f64, y: f64, size: f64, c: Rgb) {
        self.ops.push_str("BT\n");
        self.fill_color(c);
        let _ = writeln!(self.ops, "/F1 {size:.0} Tf");
        let _ = writeln!(self.ops, "{x:.2} {y:.2} Td");
        let _ = writeln!(self.ops, "({}) Tj", encode_win_ansi(text));
        self.ops.push_str("ET\n");
    }

    /// Text whose right edge sits on `right`.
    fn text_right(&mut self, text: &str, right: f64, y: f64, size: f64, c: Rgb) {
        let x = right - self.width(text, size);
        self.text(text, x, y, size, c);
    }

    fn width(&self, text: &str, size: f64) -> f64 {
        self.metrics.string_width(&displayed(text), size)
    }

    /// Shorten `text` with a trailing "..." so it fits in `max` points.
    fn fit(&self, text: &str, size: f64, max: f64) -> String {
        if self.width(text, size) <= max {
            return text.to_string();
        }
        let budget = max - self.width("...", size);
        let mut used = 0.0;
        let mut end = 0;
        let mut buf = [0u8; 4];
        for (i, c) in text.char_indices() {
            used += self.width(c.encode_utf8(&mut buf), size);
            if used > budget {
                break;
            }
            end = i + c.len_utf8();
        }
        format!("{}...", text[..end].trim_end())
    }

    fn finish(mut self) -> Vec<u8> {
        self.ops.push_str("Q\n");
        self.ops.into_bytes()
    }
}

/// `YYYYMMDD` to `DD/MM/YYYY`. Anything else is returned unchanged.
fn display_issue_date(yyyymmdd: &str) -> String {
    match (yyyymmdd.get(0..4), yyyymmdd.get(4..6), yyyymmdd.get(6..8)) {
        (Some(y), Some(m), Some(d)) if yyyymmdd.len() == 8 => format!("{d}/{m}/{y}"),
        _ => yyyymmdd.to_string(),
    }
}

fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn euros(value: rust_decimal::Decimal) -> String {
    format!("{} EUR", format_amount(value))
}

/// Render the visual invoice page.
pub fn page_content(invoice: &Invoice, totals: &Totals, metrics: &FontMetrics) -> Vec<u8> {
    let mut c = Canvas::new(metrics);
    c.ops.push_str("q\n");

    draw_header(&mut c, invoice);
    draw_parties(&mut c, invoice);
    let table_bottom = draw_lines(&mut c, invoice);
    draw_totals(&mut c, totals, table_bottom);
    draw_mentions(&mut c, invoice);

    // Footer band
    c.fill_rect(LIGHT_BG, 0.0, 0.0, PAGE_WIDTH, FOOTER_HEIGHT);
    c.text(FOOTER_TEXT, MARGIN, 14.0, 7.0, GRAY);

    c.finish()
}

fn draw_header(c: &mut Canvas<'_>, invoice: &Invoice) {
    c.fill_rect(PRIMARY, 0.0, PAGE_HEIGHT - HEADER_HEIGHT, PAGE_WIDTH, HEADER_HEIGHT);
    c.text("FACTURE", MARGIN, PAGE_HEIGHT - 45.0, 28.0, WHITE);
    c.text(
        &format!("N° {}", invoice.number),
        MARGIN,
        PAGE_HEIGHT - 62.0,
        11.0,
        SUBTLE,
    );

    // Date badge
    let date_x = PAGE_WIDTH - MARGIN - 80.0;
    c.fill_rect(WHITE, date_x - 5.0, PAGE_HEIGHT - 50.0, 75.0, 20.0);
    c.text(
        &display_issue_date(&invoice.issue_date),
        date_x,
        PAGE_HEIGHT - 44.0,
        10.0,
        PRIMARY,
    );

    c.line(
        ACCENT,
        3.0,
        (0.0, PAGE_HEIGHT - HEADER_HEIGHT),
        (PAGE_WIDTH, PAGE_HEIGHT - HEADER_HEIGHT),
    );
}

fn draw_parties(c: &mut Canvas<'_>, invoice: &Invoice) {
    let top = PAGE_HEIGHT - 110.0;
    let block_width = (PAGE_WIDTH - 2.0 * MARGIN - 30.0) / 2.0;
    let buyer_x = PAGE_WIDTH / 2.0 + 15.0;

    let seller_name = if invoice.individual_entrepreneur {
        format!("{}, EI", invoice.seller.name)
    } else {
        invoice.seller.name.clone()
    };

    for (x, title, name, party) in [
        (MARGIN, "VENDEUR", seller_name, &invoice.seller),
        (buyer_x, "CLIENT", invoice.buyer.name.clone(), &invoice.buyer),
    ] {
        c.fill_rect(LIGHT_BG, x - 10.0, top - 70.0, block_width + 20.0, 85.0);
        c.text(title, x, top, 11.0, PRIMARY);
        let name = c.fit(&name, 10.0, block_width);
        c.text(&name, x, top - 18.0, 10.0, TEXT);
        let address = c.fit(&party.address, 9.0, block_width);
        c.text(&address, x, top - 33.0, 9.0, GRAY);
        c.text(
            &format!("{} {}", party.postal_code, party.city),
            x,
            top - 46.0,
            9.0,
            GRAY,
        );
        if let Some(ids) = identifier_line(party) {
            let ids = c.fit(&ids, 9.0, block_width);
            c.text(&ids, x, top - 59.0, 9.0, GRAY);
        }
    }
}

/// "SIRET: ... | ADELI: ..." or `None` when the party has no identifier.
fn identifier_line(party: &Party) -> Option<String> {
    let parts: Vec<String> = party
        .siret()
        .into_iter()
        .map(|siret| format!("SIRET: {siret}"))
        .chain(
            party
                .professional_ids
                .iter()
                .map(|id| format!("{}: {}", id.kind, id.value)),
        )
        .collect();
    (!parts.is_empty()).then(|| parts.join(" | "))
}

/// Draws the line table and returns the y of its bottom rule.
fn draw_lines(c: &mut Canvas<'_>, invoice: &Invoice) -> f64 {
    let table_top = PAGE_HEIGHT - 230.0;
    let table_width = PAGE_WIDTH - 2.0 * MARGIN + 20.0;

    c.fill_rect(PRIMARY, MARGIN - 10.0, table_top - 5.0, table_width, 25.0);
    c.text("Description", COL_DESC, table_top + 3.0, 10.0, WHITE);
    c.text_right("Qté", QTY_RIGHT, table_top + 3.0, 10.0, WHITE);
    c.text_right("Prix unit.", PRICE_RIGHT, table_top + 3.0, 10.0, WHITE);
    c.text_right("Total HT", TOTAL_RIGHT, table_top + 3.0, 10.0, WHITE);

    let mut y = table_top - 25.0;
    for (i, line) in invoice.lines.iter().enumerate() {
        if i % 2 == 0 {
            c.fill_rect(LIGHT_BG, MARGIN - 10.0, y - 5.0, table_width, ROW_HEIGHT);
        }

        let description = match line.service_date {
            Some(date) => {
                let suffix = format!(" ({})", display_date(date));
                let room = DESC_WIDTH - c.width(&suffix, 10.0);
                format!("{}{suffix}", c.fit(&line.description, 10.0, room))
            }
            None => c.fit(&line.description, 10.0, DESC_WIDTH),
        };

        c.text(&description, COL_DESC, y + 3.0, 10.0, TEXT);
        c.text_right(&format_amount(line.quantity), QTY_RIGHT, y + 3.0, 10.0, TEXT);
        c.text_right(&euros(line.unit_price), PRICE_RIGHT, y + 3.0, 10.0, TEXT);
        c.text_right(&euros(line.net_amount()), TOTAL_RIGHT, y + 3.0, 10.0, TEXT);

        y -= ROW_HEIGHT;
    }

    let rule_y = y + ROW_HEIGHT - 5.0;
    c.line(
        PRIMARY,
        0.5,
        (MARGIN - 10.0, rule_y),
        (PAGE_WIDTH - MARGIN + 10.0, rule_y),
    );
    y
}

fn draw_totals(c: &mut Canvas<'_>, totals: &Totals, table_bottom: f64) {
    let box_x = COL_PRICE - 40.0;
    let box_y = table_bottom - 85.0;
    let box_w = PAGE_WIDTH - MARGIN - box_x + 25.0;
    let box_h = 80.0;
    let label_x = COL_PRICE - 20.0;
    let first_row = box_y + box_h - 20.0;

    c.fill_rect(LIGHT_BG, box_x, box_y, box_w, box_h);
    c.stroke_rect(PRIMARY, box_x, box_y, box_w, box_h);

    c.text("Total HT:", label_x, first_row, 10.0, TEXT);
    c.text_right(&euros(totals.tax_base), TOTAL_RIGHT, first_row, 10.0, TEXT);

    c.text(
        &format!("TVA ({}%):", format_amount(totals.vat_rate)),
        label_x,
        first_row - 18.0,
        10.0,
        TEXT,
    );
    c.text_right(&euros(totals.tax_total), TOTAL_RIGHT, first_row - 18.0, 10.0, TEXT);

    // Grand total bar
    c.fill_rect(PRIMARY, box_x, box_y, box_w, 22.0);
    c.text("Total TTC:", label_x, box_y + 6.0, 11.0, WHITE);
    c.text_right(&euros(totals.grand_total), TOTAL_RIGHT, box_y + 6.0, 11.0, WHITE);
}

fn draw_mentions(c: &mut Canvas<'_>, invoice: &Invoice) {
    c.line(
        ACCENT,
        2.0,
        (MARGIN, MENTIONS_Y + 15.0),
        (MARGIN + 40.0, MENTIONS_Y + 15.0),
    );
    c.text("Mentions légales", MARGIN, MENTIONS_Y, 9.0, PRIMARY);
    c.text(
        &invoice.vat_regime.legal_mention(),
        MARGIN,
        MENTIONS_Y - 14.0,
        8.0,
        GRAY,
    );

    let mut y = MENTIONS_Y - 28.0;
    if let Some(payment) = &invoice.payment {
        let paid = format!(
            "Payée le {} par {}",
            display_date(payment.date),
            payment.method.label()
        );
        c.text(&paid, MARGIN, y, 8.0, GRAY);
        y -= MENTION_LINE_SPACING;
    }

    if let Some(mentions) = invoice.custom_mentions.as_deref().filter(|m| !m.is_empty()) {
        for line in mentions.split('\n') {
            c.text(line, MARGIN, y, 8.0, GRAY);
            y -= MENTION_LINE_SPACING;
        }
    }
}
