use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::io::Cursor;

use crate::core::{FacturxError, format_amount, format_quantity};

pub type XmlResult = Result<String, FacturxError>;

fn xml_io(e: impl std::fmt::Display) -> FacturxError {
    FacturxError::Xml(format!("write error: {e}"))
}

/// Drop characters XML 1.0 cannot carry: C0 controls other than tab,
/// line feed and carriage return, and the noncharacters U+FFFE and U+FFFF.
pub(crate) fn xml_safe(text: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        !matches!(c, '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
    }
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|c| allowed(*c)).collect())
    }
}

/// Indented XML writer with one-call helpers for the CII element shapes.
///
/// Text and attribute values pass through [`xml_safe`] and are then escaped
/// by `quick-xml` (`& < > " '`); callers pass raw strings.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, FacturxError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> XmlResult {
        let mut buf = self.writer.into_inner().into_inner();
        buf.push(b'\n');
        String::from_utf8(buf).map_err(|e| FacturxError::Xml(format!("UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, FacturxError> {
        self.writer
            .write_event(Event::Start(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, FacturxError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, xml_safe(v).as_ref()));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, FacturxError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, FacturxError> {
        self.text_element_with_attrs(name, text, &[])
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, FacturxError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(&xml_safe(text))))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Monetary amount, 2 decimals.
    pub fn amount_element(&mut self, name: &str, amount: Decimal) -> Result<&mut Self, FacturxError> {
        self.text_element(name, &format_amount(amount))
    }

    /// Monetary amount, 2 decimals, with a `currencyID` attribute.
    pub fn currency_amount_element(
        &mut self,
        name: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<&mut Self, FacturxError> {
        self.text_element_with_attrs(name, &format_amount(amount), &[("currencyID", currency)])
    }

    /// Quantity, 4 decimals, with a `unitCode` attribute.
    pub fn quantity_element(
        &mut self,
        name: &str,
        qty: Decimal,
        unit: &str,
    ) -> Result<&mut Self, FacturxError> {
        self.text_element_with_attrs(name, &format_quantity(qty), &[("unitCode", unit)])
    }

    /// `<name><udt:DateTimeString format="102">YYYYMMDD</udt:DateTimeString></name>`
    pub fn date_element(&mut self, name: &str, yyyymmdd: &str) -> Result<&mut Self, FacturxError> {
        self.start_element(name)?;
        self.text_element_with_attrs("udt:DateTimeString", yyyymmdd, &[("format", "102")])?;
        self.end_element(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn writes_indented_elements() {
        let mut w = XmlWriter::new().unwrap();
        w.start_element("a").unwrap();
        w.text_element("b", "x").unwrap();
        w.amount_element("c", dec!(1.005)).unwrap();
        w.quantity_element("d", dec!(2), "C62").unwrap();
        w.end_element("a").unwrap();
        let xml = w.into_string().unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains("\n<a>\n  <b>x</b>\n  <c>1.01</c>\n"));
        assert!(xml.contains(r#"<d unitCode="C62">2.0000</d>"#));
        assert!(xml.ends_with("</a>\n"));
    }

    #[test]
    fn escapes_text_and_attributes_once() {
        let mut w = XmlWriter::new().unwrap();
        w.text_element_with_attrs("n", r#"A & B <C> "D" 'E'"#, &[("k", "x&y")])
            .unwrap();
        let xml = w.into_string().unwrap();
        assert!(xml.contains(
            r#"<n k="x&amp;y">A &amp; B &lt;C&gt; &quot;D&quot; &apos;E&apos;</n>"#
        ));
        assert!(!xml.contains("&amp;amp;"));
    }

    #[test]
    fn date_element_uses_format_102() {
        let mut w = XmlWriter::new().unwrap();
        w.date_element("ram:IssueDateTime", "20240115").unwrap();
        let xml = w.into_string().unwrap();
        assert!(xml.contains(
            "<ram:IssueDateTime>\n  <udt:DateTimeString format=\"102\">20240115</udt:DateTimeString>\n</ram:IssueDateTime>"
        ));
    }

    #[test]
    fn control_characters_are_dropped() {
        assert_eq!(xml_safe("a\u{1}b\u{1F}c\u{FFFF}"), "abc");
        assert_eq!(xml_safe("tab\tline\nreturn\r"), "tab\tline\nreturn\r");
        assert!(matches!(xml_safe("plain é"), Cow::Borrowed(_)));

        let mut w = XmlWriter::new().unwrap();
        w.text_element_with_attrs("ram:Name", "a\u{1}b", &[("k", "x\u{0}y")])
            .unwrap();
        let xml = w.into_string().unwrap();
        assert!(xml.contains(r#"<ram:Name k="xy">ab</ram:Name>"#));
        assert!(!xml.contains('\u{1}'));
    }

}
