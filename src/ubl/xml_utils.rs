use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::DespatchError;

fn xml_io(e: std::io::Error) -> DespatchError {
    DespatchError::Xml(format!("XML write error: {e}"))
}

/// Thin element-writer over quick-xml.
///
/// The writer produces a UTF-8 body without a declaration; the document is
/// finished by [`reserialize_latin1`], which adds the ISO-8859-1 declaration
/// and transcodes.
pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    pub fn into_string(self) -> Result<String, DespatchError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| DespatchError::Xml(format!("XML UTF-8 error: {e}")))
    }

    pub fn start_element(&mut self, name: &str) -> Result<&mut Self, DespatchError> {
        let elem = BytesStart::new(name);
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, DespatchError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn end_element(&mut self, name: &str) -> Result<&mut Self, DespatchError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, DespatchError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    pub fn text_element_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, DespatchError> {
        self.start_element_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }

    /// Write a quantity with a unitCode attribute.
    pub fn quantity_element(
        &mut self,
        name: &str,
        qty: Decimal,
        unit: &str,
    ) -> Result<&mut Self, DespatchError> {
        self.text_element_with_attrs(name, &format_quantity(qty), &[("unitCode", unit)])
    }
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a Decimal with exactly two decimal places, half-up.
pub fn format_quantity(d: Decimal) -> String {
    let rounded = d
        .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let s = rounded.to_string();
    match s.find('.') {
        Some(dot_pos) => {
            let decimals = s.len() - dot_pos - 1;
            if decimals < 2 {
                format!("{s}{}", "0".repeat(2 - decimals))
            } else {
                s
            }
        }
        None => format!("{s}.00"),
    }
}

/// Parse a generated document once and re-serialize it as ISO-8859-1 with
/// declaration.
///
/// The round trip guarantees the handed-off bytes are well-formed. Latin-1
/// covers exactly the first 256 code points, so each char at or below U+00FF
/// maps to one byte; anything above becomes a numeric character reference.
pub fn reserialize_latin1(xml: &str) -> Result<Vec<u8>, DespatchError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            // The declaration is replaced by the ISO-8859-1 one below.
            Ok(Event::Decl(_)) => {}
            Ok(event) => writer.write_event(event).map_err(xml_io)?,
            Err(e) => return Err(DespatchError::Xml(format!("XML parse error: {e}"))),
        }
    }
    let body = String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| DespatchError::Xml(format!("XML UTF-8 error: {e}")))?;

    let mut out = Vec::with_capacity(body.len() + 64);
    out.extend_from_slice(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n");
    for ch in body.chars() {
        let cp = ch as u32;
        if cp <= 0xFF {
            out.push(cp as u8);
        } else {
            out.extend_from_slice(format!("&#{cp};").as_bytes());
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn format_quantity_cases() {
        assert_eq!(format_quantity(dec!(1)), "1.00");
        assert_eq!(format_quantity(dec!(1.5)), "1.50");
        assert_eq!(format_quantity(dec!(49.90)), "49.90");
        assert_eq!(format_quantity(dec!(0.005)), "0.01");
        assert_eq!(format_quantity(dec!(120)), "120.00");
    }

    #[test]
    fn latin1_reserialization_keeps_accented_chars_as_bytes() {
        let bytes = reserialize_latin1("<a>Exportación</a>").unwrap();
        assert!(bytes.starts_with(b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>"));
        // 0xF3 is the Latin-1 byte for 'ó'.
        assert!(bytes.contains(&0xF3));
    }

    #[test]
    fn latin1_reserialization_escapes_wide_chars() {
        let bytes = reserialize_latin1("<a>\u{20AC}</a>").unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        assert!(text.contains("&#8364;"));
    }

    #[test]
    fn malformed_xml_is_rejected() {
        assert!(reserialize_latin1("<a><b></a>").is_err());
    }

    #[test]
    fn existing_declaration_is_replaced() {
        let bytes =
            reserialize_latin1("<?xml version=\"1.0\" encoding=\"UTF-8\"?><a>x</a>").unwrap();
        let text = String::from_utf8_lossy(&bytes).into_owned();
        assert_eq!(text.matches("<?xml").count(), 1);
        assert!(text.contains("ISO-8859-1"));
    }
}
