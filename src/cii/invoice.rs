use tracing::instrument;

use super::xml_utils::{XmlResult, XmlWriter};
use super::{BASIC_PROFILE_URN, BUSINESS_PROCESS_ID, CURRENCY, PAYMENT_TERMS, cii_ns};
use crate::core::*;

/// Generate Factur-X BASIC CII XML for an invoice and its totals.
///
/// The invoice is expected to be validated; this function only serializes.
#[instrument(level = "debug", skip_all, fields(number = %invoice.number))]
pub fn to_cii_xml(invoice: &Invoice, totals: &Totals) -> XmlResult {
    let regime = &invoice.vat_regime;
    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs(
        "rsm:CrossIndustryInvoice",
        &[
            ("xmlns:rsm", cii_ns::RSM),
            ("xmlns:ram", cii_ns::RAM),
            ("xmlns:udt", cii_ns::UDT),
            ("xmlns:qdt", cii_ns::QDT),
        ],
    )?;

    // --- ExchangedDocumentContext ---
    w.start_element("rsm:ExchangedDocumentContext")?;
    w.start_element("ram:BusinessProcessSpecifiedDocumentContextParameter")?;
    w.text_element("ram:ID", BUSINESS_PROCESS_ID)?;
    w.end_element("ram:BusinessProcessSpecifiedDocumentContextParameter")?;
    w.start_element("ram:GuidelineSpecifiedDocumentContextParameter")?;
    w.text_element("ram:ID", BASIC_PROFILE_URN)?;
    w.end_element("ram:GuidelineSpecifiedDocumentContextParameter")?;
    w.end_element("rsm:ExchangedDocumentContext")?;

    // --- ExchangedDocument ---
    w.start_element("rsm:ExchangedDocument")?;
    w.text_element("ram:ID", &invoice.number)?;
    // 380 = commercial invoice
    w.text_element("ram:TypeCode", "380")?;
    w.date_element("ram:IssueDateTime", &invoice.issue_date)?;
    w.end_element("rsm:ExchangedDocument")?;

    // --- SupplyChainTradeTransaction ---
    w.start_element("rsm:SupplyChainTradeTransaction")?;

    for (i, line) in invoice.lines.iter().enumerate() {
        write_line(&mut w, i + 1, line, regime)?;
    }

    // --- ApplicableHeaderTradeAgreement ---
    w.start_element("ram:ApplicableHeaderTradeAgreement")?;
    write_party(
        &mut w,
        "ram:SellerTradeParty",
        &invoice.seller,
        invoice.individual_entrepreneur,
    )?;
    write_party(&mut w, "ram:BuyerTradeParty", &invoice.buyer, false)?;
    w.end_element("ram:ApplicableHeaderTradeAgreement")?;

    // --- ApplicableHeaderTradeDelivery ---
    // BT-72 defaults to the issue date
    w.start_element("ram:ApplicableHeaderTradeDelivery")?;
    w.start_element("ram:ActualDeliverySupplyChainEvent")?;
    w.date_element("ram:OccurrenceDateTime", &invoice.issue_date)?;
    w.end_element("ram:ActualDeliverySupplyChainEvent")?;
    w.end_element("ram:ApplicableHeaderTradeDelivery")?;

    // --- ApplicableHeaderTradeSettlement ---
    w.start_element("ram:ApplicableHeaderTradeSettlement")?;
    w.text_element("ram:InvoiceCurrencyCode", CURRENCY)?;

    // BG-23: VAT breakdown
    w.start_element("ram:ApplicableTradeTax")?;
    w.amount_element("ram:CalculatedAmount", totals.tax_total)?;
    w.text_element("ram:TypeCode", "VAT")?;
    if let Some(reason) = regime.exemption_text() {
        w.text_element("ram:ExemptionReason", reason)?;
    }
    w.amount_element("ram:BasisAmount", totals.tax_base)?;
    w.text_element("ram:CategoryCode", regime.category_code())?;
    if let Some(code) = regime.exemption_code() {
        w.text_element("ram:ExemptionReasonCode", code)?;
    }
    w.amount_element("ram:RateApplicablePercent", totals.vat_rate)?;
    w.end_element("ram:ApplicableTradeTax")?;

    w.start_element("ram:SpecifiedTradePaymentTerms")?;
    w.text_element("ram:Description", PAYMENT_TERMS)?;
    w.end_element("ram:SpecifiedTradePaymentTerms")?;

    // BG-22: document totals
    w.start_element("ram:SpecifiedTradeSettlementHeaderMonetarySummation")?;
    w.amount_element("ram:LineTotalAmount", totals.line_total)?;
    w.amount_element("ram:TaxBasisTotalAmount", totals.tax_base)?;
    w.currency_amount_element("ram:TaxTotalAmount", totals.tax_total, CURRENCY)?;
    w.amount_element("ram:GrandTotalAmount", totals.grand_total)?;
    w.amount_element("ram:DuePayableAmount", totals.due_amount)?;
    w.end_element("ram:SpecifiedTradeSettlementHeaderMonetarySummation")?;

    w.end_element("ram:ApplicableHeaderTradeSettlement")?;

    w.end_element("rsm:SupplyChainTradeTransaction")?;
    w.end_element("rsm:CrossIndustryInvoice")?;

    w.into_string()
}

fn write_line(
    w: &mut XmlWriter,
    line_id: usize,
    line: &LineItem,
    regime: &VatRegime,
) -> Result<(), FacturxError> {
    w.start_element("ram:IncludedSupplyChainTradeLineItem")?;

    w.start_element("ram:AssociatedDocumentLineDocument")?;
    w.text_element("ram:LineID", &line_id.to_string())?;
    w.end_element("ram:AssociatedDocumentLineDocument")?;

    w.start_element("ram:SpecifiedTradeProduct")?;
    w.text_element("ram:Name", &line.description)?;
    w.end_element("ram:SpecifiedTradeProduct")?;

    w.start_element("ram:SpecifiedLineTradeAgreement")?;
    w.start_element("ram:NetPriceProductTradePrice")?;
    w.text_element("ram:ChargeAmount", &format_quantity(line.unit_price))?;
    w.end_element("ram:NetPriceProductTradePrice")?;
    w.end_element("ram:SpecifiedLineTradeAgreement")?;

    // C62 = unit (one)
    w.start_element("ram:SpecifiedLineTradeDelivery")?;
    w.quantity_element("ram:BilledQuantity", line.quantity, "C62")?;
    w.end_element("ram:SpecifiedLineTradeDelivery")?;

    w.start_element("ram:SpecifiedLineTradeSettlement")?;
    w.start_element("ram:ApplicableTradeTax")?;
    w.text_element("ram:TypeCode", "VAT")?;
    w.text_element("ram:CategoryCode", regime.category_code())?;
    w.amount_element("ram:RateApplicablePercent", regime.rate())?;
    w.end_element("ram:ApplicableTradeTax")?;
    w.start_element("ram:SpecifiedTradeSettlementLineMonetarySummation")?;
    w.amount_element("ram:LineTotalAmount", line.net_amount())?;
    w.end_element("ram:SpecifiedTradeSettlementLineMonetarySummation")?;
    w.end_element("ram:SpecifiedLineTradeSettlement")?;

    w.end_element("ram:IncludedSupplyChainTradeLineItem")?;
    Ok(())
}

fn write_party(
    w: &mut XmlWriter,
    element: &str,
    party: &Party,
    individual_entrepreneur: bool,
) -> Result<(), FacturxError> {
    w.start_element(element)?;

    if individual_entrepreneur {
        w.text_element("ram:Name", &format!("{}, Entrepreneur Individuel", party.name))?;
    } else {
        w.text_element("ram:Name", &party.name)?;
    }

    // 0002 = SIRENE (INSEE)
    if let Some(siret) = party.siret() {
        w.start_element("ram:SpecifiedLegalOrganization")?;
        w.text_element_with_attrs("ram:ID", siret, &[("schemeID", "0002")])?;
        w.end_element("ram:SpecifiedLegalOrganization")?;
    }

    w.start_element("ram:PostalTradeAddress")?;
    w.text_element("ram:PostcodeCode", &party.postal_code)?;
    w.text_element("ram:LineOne", &party.address)?;
    w.text_element("ram:CityName", &party.city)?;
    w.text_element("ram:CountryID", &party.country_code)?;
    w.end_element("ram:PostalTradeAddress")?;

    if let Some(vat) = party.vat_number() {
        w.start_element("ram:SpecifiedTaxRegistration")?;
        w.text_element_with_attrs("ram:ID", vat, &[("schemeID", "VA")])?;
        w.end_element("ram:SpecifiedTaxRegistration")?;
    }

    w.end_element(element)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample(regime: VatRegime) -> Invoice {
        InvoiceBuilder::new("FA-2024-001", "20240115")
            .seller(
                PartyBuilder::new("ACME SARL", "12 Rue de Rivoli", "75001", "Paris", "FR")
                    .siret("12345678900006")
                    .vat_number("FR12345678901")
                    .build(),
            )
            .buyer(PartyBuilder::new("Client SA", "3 Quai Perrache", "69002", "Lyon", "FR").build())
            .add_line(LineItemBuilder::new("Conseil", dec!(10), dec!(100)).build())
            .vat_regime(regime)
            .build()
            .unwrap()
    }

    fn xml_for(invoice: &Invoice) -> String {
        to_cii_xml(invoice, &calculate_totals(invoice)).unwrap()
    }

    fn position(xml: &str, needle: &str) -> usize {
        xml.find(needle)
            .unwrap_or_else(|| panic!("{needle} not found in\n{xml}"))
    }

    #[test]
    fn standard_rate_document() {
        let xml = xml_for(&sample(VatRegime::Standard { rate: dec!(20) }));

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<rsm:CrossIndustryInvoice"));
        assert!(xml.contains(&format!(r#"xmlns:rsm="{}""#, cii_ns::RSM)));
        assert!(xml.contains(&format!("<ram:ID>{BASIC_PROFILE_URN}</ram:ID>")));
        assert!(xml.contains("<ram:ID>A1</ram:ID>"));
        assert!(xml.contains("<ram:TypeCode>380</ram:TypeCode>"));
        assert!(xml.contains(r#"<udt:DateTimeString format="102">20240115</udt:DateTimeString>"#));
        assert!(xml.contains("<ram:LineID>1</ram:LineID>"));
        assert!(xml.contains("<ram:ChargeAmount>100.0000</ram:ChargeAmount>"));
        assert!(xml.contains(r#"<ram:BilledQuantity unitCode="C62">10.0000</ram:BilledQuantity>"#));
        assert!(xml.contains("<ram:RateApplicablePercent>20.00</ram:RateApplicablePercent>"));
        assert!(xml.contains(r#"<ram:ID schemeID="0002">12345678900006</ram:ID>"#));
        assert!(xml.contains(r#"<ram:ID schemeID="VA">FR12345678901</ram:ID>"#));
        assert!(xml.contains("<ram:InvoiceCurrencyCode>EUR</ram:InvoiceCurrencyCode>"));
        assert!(xml.contains("<ram:Description>Paiement à réception de facture</ram:Description>"));
        assert!(xml.contains("<ram:LineTotalAmount>1000.00</ram:LineTotalAmount>"));
        assert!(xml.contains("<ram:TaxBasisTotalAmount>1000.00</ram:TaxBasisTotalAmount>"));
        assert!(xml.contains(r#"<ram:TaxTotalAmount currencyID="EUR">200.00</ram:TaxTotalAmount>"#));
        assert!(xml.contains("<ram:GrandTotalAmount>1200.00</ram:GrandTotalAmount>"));
        assert!(xml.contains("<ram:DuePayableAmount>1200.00</ram:DuePayableAmount>"));
        assert!(!xml.contains("ExemptionReason"));
        assert!(xml.ends_with("</rsm:CrossIndustryInvoice>\n"));
    }

    #[test]
    fn top_level_blocks_in_schema_order() {
        let xml = xml_for(&sample(VatRegime::Standard { rate: dec!(20) }));
        let order = [
            "<rsm:ExchangedDocumentContext>",
            "<rsm:ExchangedDocument>",
            "<rsm:SupplyChainTradeTransaction>",
            "<ram:IncludedSupplyChainTradeLineItem>",
            "<ram:ApplicableHeaderTradeAgreement>",
            "<ram:SellerTradeParty>",
            "<ram:BuyerTradeParty>",
            "<ram:ApplicableHeaderTradeDelivery>",
            "<ram:ApplicableHeaderTradeSettlement>",
            "<ram:SpecifiedTradePaymentTerms>",
            "<ram:SpecifiedTradeSettlementHeaderMonetarySummation>",
        ];
        let positions: Vec<usize> = order.iter().map(|tag| position(&xml, tag)).collect();
        assert!(positions.windows(2).all(|p| p[0] < p[1]), "{positions:?}");
    }

    #[test]
    fn party_children_in_schema_order() {
        let xml = xml_for(&sample(VatRegime::Standard { rate: dec!(20) }));
        let seller = &xml[position(&xml, "<ram:SellerTradeParty>")..position(&xml, "</ram:SellerTradeParty>")];
        let order = [
            "<ram:Name>",
            "<ram:SpecifiedLegalOrganization>",
            "<ram:PostcodeCode>",
            "<ram:LineOne>",
            "<ram:CityName>",
            "<ram:CountryID>",
            "<ram:SpecifiedTaxRegistration>",
        ];
        let positions: Vec<usize> = order.iter().map(|tag| position(seller, tag)).collect();
        assert!(positions.windows(2).all(|p| p[0] < p[1]), "{positions:?}");
    }

    #[test]
    fn buyer_without_siret_omits_legal_organization() {
        let xml = xml_for(&sample(VatRegime::Standard { rate: dec!(20) }));
        let buyer = &xml[position(&xml, "<ram:BuyerTradeParty>")..position(&xml, "</ram:BuyerTradeParty>")];
        assert!(!buyer.contains("SpecifiedLegalOrganization"));
        assert!(!buyer.contains("SpecifiedTaxRegistration"));
    }

    #[test]
    fn blank_buyer_identifiers_are_omitted() {
        let mut inv = sample(VatRegime::Standard { rate: dec!(20) });
        inv.buyer.siret = Some(String::new());
        inv.buyer.vat_number = Some(" ".into());
        let xml = xml_for(&inv);
        let buyer = &xml[position(&xml, "<ram:BuyerTradeParty>")..position(&xml, "</ram:BuyerTradeParty>")];
        assert!(!buyer.contains("SpecifiedLegalOrganization"));
        assert!(!buyer.contains("SpecifiedTaxRegistration"));
        assert!(!xml.contains(r#"<ram:ID schemeID="0002"></ram:ID>"#));
    }

    #[test]
    fn franchise_exemption() {
        let xml = xml_for(&sample(VatRegime::FranchiseExemption));
        let tax = &xml[position(&xml, "<ram:ApplicableHeaderTradeSettlement>")..];

        assert!(tax.contains("<ram:ExemptionReasonCode>VATEX-FR-FRANCHISE</ram:ExemptionReasonCode>"));
        assert!(tax.contains(
            "<ram:ExemptionReason>TVA non applicable, art. 293 B du CGI</ram:ExemptionReason>"
        ));
        assert!(tax.contains("<ram:CategoryCode>E</ram:CategoryCode>"));
        assert!(tax.contains("<ram:RateApplicablePercent>0.00</ram:RateApplicablePercent>"));
        assert!(tax.contains("<ram:CalculatedAmount>0.00</ram:CalculatedAmount>"));
        assert!(xml.contains("<ram:GrandTotalAmount>1000.00</ram:GrandTotalAmount>"));

        let order = [
            "<ram:CalculatedAmount>",
            "<ram:TypeCode>VAT</ram:TypeCode>",
            "<ram:ExemptionReason>",
            "<ram:BasisAmount>",
            "<ram:CategoryCode>",
            "<ram:ExemptionReasonCode>",
            "<ram:RateApplicablePercent>",
        ];
        let positions: Vec<usize> = order.iter().map(|tag| position(tax, tag)).collect();
        assert!(positions.windows(2).all(|p| p[0] < p[1]), "{positions:?}");
    }

    #[test]
    fn health_exemption_code() {
        let xml = xml_for(&sample(VatRegime::HealthExemption));
        assert!(xml.contains("<ram:ExemptionReasonCode>VATEX-EU-O</ram:ExemptionReasonCode>"));
    }

    #[test]
    fn individual_entrepreneur_suffix_on_seller_only() {
        let mut invoice = sample(VatRegime::FranchiseExemption);
        invoice.individual_entrepreneur = true;
        let xml = xml_for(&invoice);
        assert!(xml.contains("<ram:Name>ACME SARL, Entrepreneur Individuel</ram:Name>"));
        assert!(xml.contains("<ram:Name>Client SA</ram:Name>"));
    }

    #[test]
    fn free_text_escaped_exactly_once() {
        let mut invoice = sample(VatRegime::Standard { rate: dec!(20) });
        invoice.lines[0].description = r#"Vis <M6> & écrous "inox""#.into();
        let xml = xml_for(&invoice);
        assert!(xml.contains(
            "<ram:Name>Vis &lt;M6&gt; &amp; écrous &quot;inox&quot;</ram:Name>"
        ));
        assert_eq!(xml.matches("&amp;").count(), 1);
        assert!(!xml.contains("&amp;lt;"));
        assert!(!xml.contains("&amp;amp;"));
    }

    #[test]
    fn one_block_per_line_numbered_from_one() {
        let mut invoice = sample(VatRegime::Standard { rate: dec!(20) });
        invoice.lines.push(LineItemBuilder::new("Audit", dec!(2), dec!(500)).build());
        let xml = xml_for(&invoice);
        assert_eq!(xml.matches("<ram:IncludedSupplyChainTradeLineItem>").count(), 2);
        assert!(position(&xml, "<ram:LineID>1</ram:LineID>") < position(&xml, "<ram:LineID>2</ram:LineID>"));
        assert!(xml.contains("<ram:LineTotalAmount>2000.00</ram:LineTotalAmount>"));
        assert!(xml.contains("<ram:GrandTotalAmount>2400.00</ram:GrandTotalAmount>"));
    }
}
