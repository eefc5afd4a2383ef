use quick_xml::escape::escape;

use crate::cii::xml_utils::xml_safe;
use crate::cii::{BASIC_CONFORMANCE_LEVEL, FACTURX_FILENAME};

/// Build the XMP metadata packet for a Factur-X PDF/A-3B document.
///
/// `date` is the invoice issue date as `YYYYMMDD`.
pub fn build_xmp(title: &str, creator: &str, producer: &str, date: &str) -> String {
    let timestamp = xmp_date(date);

    format!(
        r#"<?xpacket begin="{BOM}" id="W5M0MpCehiHzreSzNTczkc9d"?>
<x:xmpmeta xmlns:x="adobe:ns:meta/">
  <rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <rdf:Description rdf:about=""
        xmlns:dc="http://purl.org/dc/elements/1.1/">
      <dc:title>
        <rdf:Alt>
          <rdf:li xml:lang="x-default">{title}</rdf:li>
        </rdf:Alt>
      </dc:title>
      <dc:creator>
        <rdf:Seq>
          <rdf:li>{creator}</rdf:li>
        </rdf:Seq>
      </dc:creator>
    </rdf:Description>
    <rdf:Description rdf:about=""
        xmlns:pdf="http://ns.adobe.com/pdf/1.3/">
      <pdf:Producer>{producer}</pdf:Producer>
    </rdf:Description>
    <rdf:Description rdf:about=""
        xmlns:xmp="http://ns.adobe.com/xap/1.0/">
      <xmp:CreateDate>{timestamp}</xmp:CreateDate>
      <xmp:ModifyDate>{timestamp}</xmp:ModifyDate>
    </rdf:Description>
    <rdf:Description rdf:about=""
        xmlns:pdfaid="http://www.aiim.org/pdfa/ns/id/">
      <pdfaid:part>3</pdfaid:part>
      <pdfaid:conformance>B</pdfaid:conformance>
    </rdf:Description>
    <rdf:Description rdf:about=""
        xmlns:pdfaExtension="http://www.aiim.org/pdfa/ns/extension/"
        xmlns:pdfaSchema="http://www.aiim.org/pdfa/ns/schema#"
        xmlns:pdfaProperty="http://www.aiim.org/pdfa/ns/property#">
      <pdfaExtension:schemas>
        <rdf:Bag>
          <rdf:li rdf:parseType="Resource">
            <pdfaSchema:schema>Factur-X PDFA Extension Schema</pdfaSchema:schema>
            <pdfaSchema:namespaceURI>urn:factur-x:pdfa:CrossIndustryDocument:invoice:1p0#</pdfaSchema:namespaceURI>
            <pdfaSchema:prefix>fx</pdfaSchema:prefix>
            <pdfaSchema:property>
              <rdf:Seq>
                <rdf:li rdf:parseType="Resource">
                  <pdfaProperty:name>DocumentFileName</pdfaProperty:name>
                  <pdfaProperty:valueType>Text</pdfaProperty:valueType>
                  <pdfaProperty:category>external</pdfaProperty:category>
                  <pdfaProperty:description>Name of the embedded XML invoice file</pdfaProperty:description>
                </rdf:li>
                <rdf:li rdf:parseType="Resource">
                  <pdfaProperty:name>DocumentType</pdfaProperty:name>
                  <pdfaProperty:valueType>Text</pdfaProperty:valueType>
                  <pdfaProperty:category>external</pdfaProperty:category>
                  <pdfaProperty:description>INVOICE</pdfaProperty:description>
                </rdf:li>
                <rdf:li rdf:parseType="Resource">
                  <pdfaProperty:name>Version</pdfaProperty:name>
                  <pdfaProperty:valueType>Text</pdfaProperty:valueType>
                  <pdfaProperty:category>external</pdfaProperty:category>
                  <pdfaProperty:description>Version of the Factur-X XML schema</pdfaProperty:description>
                </rdf:li>
                <rdf:li rdf:parseType="Resource">
                  <pdfaProperty:name>ConformanceLevel</pdfaProperty:name>
                  <pdfaProperty:valueType>Text</pdfaProperty:valueType>
                  <pdfaProperty:category>external</pdfaProperty:category>
                  <pdfaProperty:description>Conformance level of the embedded Factur-X data</pdfaProperty:description>
                </rdf:li>
              </rdf:Seq>
            </pdfaSchema:property>
          </rdf:li>
        </rdf:Bag>
      </pdfaExtension:schemas>
    </rdf:Description>
    <rdf:Description rdf:about=""
        xmlns:fx="urn:factur-x:pdfa:CrossIndustryDocument:invoice:1p0#">
      <fx:DocumentFileName>{FACTURX_FILENAME}</fx:DocumentFileName>
      <fx:DocumentType>INVOICE</fx:DocumentType>
      <fx:Version>1.0</fx:Version>
      <fx:ConformanceLevel>{BASIC_CONFORMANCE_LEVEL}</fx:ConformanceLevel>
    </rdf:Description>
  </rdf:RDF>
</x:xmpmeta>
<?xpacket end="w"?>"#,
        BOM = '\u{FEFF}',
        title = escape(xml_safe(title)),
        creator = escape(xml_safe(creator)),
        producer = escape(xml_safe(producer)),
    )
}

/// `YYYYMMDD` to an XMP timestamp at midnight UTC.
fn xmp_date(date: &str) -> String {
    match (date.get(0..4), date.get(4..6), date.get(6..8)) {
        (Some(y), Some(m), Some(d)) => format!("{y}-{m}-{d}T00:00:00+00:00"),
        _ => date.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_carries_pdfa_and_facturx_identification() {
        let xmp = build_xmp("Facture FA-1", "ACME", "facturx", "20240115");
        assert!(xmp.starts_with("<?xpacket begin=\"\u{FEFF}\""));
        assert!(xmp.ends_with("<?xpacket end=\"w\"?>"));
        assert!(xmp.contains("<pdfaid:part>3</pdfaid:part>"));
        assert!(xmp.contains("<pdfaid:conformance>B</pdfaid:conformance>"));
        assert!(xmp.contains("<fx:DocumentFileName>factur-x.xml</fx:DocumentFileName>"));
        assert!(xmp.contains("<fx:ConformanceLevel>BASIC</fx:ConformanceLevel>"));
        assert!(xmp.contains("<rdf:li xml:lang=\"x-default\">Facture FA-1</rdf:li>"));
        assert!(xmp.contains("<rdf:li>ACME</rdf:li>"));
        assert!(xmp.contains("<xmp:CreateDate>2024-01-15T00:00:00+00:00</xmp:CreateDate>"));
        assert!(xmp.contains("<xmp:ModifyDate>2024-01-15T00:00:00+00:00</xmp:ModifyDate>"));
    }

    #[test]
    fn free_text_is_escaped() {
        let xmp = build_xmp("Facture <1>", "Dupont & Fils", "p", "20240115");
        assert!(xmp.contains("Facture &lt;1&gt;"));
        assert!(xmp.contains("<rdf:li>Dupont &amp; Fils</rdf:li>"));
    }

    #[test]
    fn control_characters_are_dropped() {
        let xmp = build_xmp("Facture \u{1}1", "Dupont\u{1B} & Fils", "p", "20240115");
        assert!(xmp.contains("Facture 1</rdf:li>"));
        assert!(xmp.contains("<rdf:li>Dupont &amp; Fils</rdf:li>"));
        assert!(!xmp.contains('\u{1}'));
        assert!(!xmp.contains('\u{1B}'));
    }

}
