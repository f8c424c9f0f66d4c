//! DespatchAdvice rendering tests: structure, encoding, determinism.

#![cfg(feature = "ubl")]

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use quick_xml::Reader;
use quick_xml::events::Event;
use rust_decimal_macros::dec;

use remision::core::*;
use remision::ubl::despatch_advice_xml;

fn lima_instant() -> DateTime<FixedOffset> {
    FixedOffset::west_opt(5 * 3600)
        .unwrap()
        .with_ymd_and_hms(2024, 6, 15, 10, 30, 0)
        .unwrap()
}

fn company() -> Company {
    Company {
        name: "Andina Foods SAC".into(),
        trade_name: Some("Andina Foods".into()),
        vat: Some("20123456789".into()),
        identification: Some(Identification {
            kind: IdentificationKind::Ruc,
            number: "20123456789".into(),
        }),
        weight_unit: WeightUnit::Kilogram,
        credentials: None,
    }
}

fn base_guide() -> DeliveryGuide {
    GuideBuilder::new(1, "WH/OUT/00001", company())
        .document_number("T001-00000001")
        .receiver(Party {
            name: "Comercial Sur EIRL".into(),
            identification: Some(Identification {
                kind: IdentificationKind::Ruc,
                number: "20987654321".into(),
            }),
            address: Address {
                street: Some("Av. Arequipa 1234".into()),
                district: Some("Miraflores".into()),
                country_code: "PE".into(),
            },
        })
        .origin(Warehouse {
            name: "Lima DC".into(),
            address: Address {
                street: Some("Jr. Callao 500".into()),
                district: Some("Cercado de Lima".into()),
                country_code: "PE".into(),
            },
        })
        .transport_type(TransportType::Private)
        .operator(Driver {
            name: "Julio Paredes".into(),
            identification: Some(Identification {
                kind: IdentificationKind::Dni,
                number: "45678912".into(),
            }),
            license: Some("Q45678912".into()),
        })
        .vehicle(Vehicle {
            plate: "ABC-123".into(),
            category: None,
            extra_plates: vec!["XYZ-789".into()],
        })
        .reason(TransferReason::Sale)
        .departure_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        .gross_weight(dec!(120.5))
        .add_line("PA", "Pallet A", "NIU", dec!(1))
        .add_line("PB", "Pallet B", "NIU", dec!(2.5))
        .build()
}

/// Latin-1 decodes byte-per-char, so the document can be inspected as text.
fn decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn count_elements(xml: &str, local_name: &str) -> usize {
    let mut reader = Reader::from_str(xml);
    let mut count = 0;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == local_name.as_bytes() => {
                count += 1;
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => panic!("parse error: {e}"),
        }
    }
    count
}

#[test]
fn document_carries_declaration_and_header_fields() {
    let bytes = despatch_advice_xml(&base_guide(), lima_instant()).unwrap();
    let text = decode(&bytes);

    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>"));
    assert!(text.contains("<cbc:UBLVersionID>2.1</cbc:UBLVersionID>"));
    assert!(text.contains("<cbc:ID>T001-00000001</cbc:ID>"));
    assert!(text.contains("<cbc:IssueDate>2024-06-15</cbc:IssueDate>"));
    assert!(text.contains("<cbc:IssueTime>10:30:00</cbc:IssueTime>"));
    assert!(text.contains("<cbc:DespatchAdviceTypeCode>09</cbc:DespatchAdviceTypeCode>"));
}

#[test]
fn sender_and_receiver_blocks() {
    let bytes = despatch_advice_xml(&base_guide(), lima_instant()).unwrap();
    let text = decode(&bytes);

    // Sender RUC with scheme 6, trade name preferred over legal name.
    assert!(text.contains(r#"schemeID="6">20123456789<"#));
    assert!(text.contains("Andina Foods</cbc:RegistrationName>"));
    // Receiver identification and name.
    assert!(text.contains("20987654321"));
    assert!(text.contains("Comercial Sur EIRL"));
}

#[test]
fn private_transport_renders_driver_and_all_plates() {
    let bytes = despatch_advice_xml(&base_guide(), lima_instant()).unwrap();
    let text = decode(&bytes);

    assert!(text.contains("<cbc:TransportModeCode>02</cbc:TransportModeCode>"));
    assert!(text.contains("Julio Paredes"));
    assert_eq!(count_elements(&text, "TransportMeans"), 2);
    assert!(text.contains("<cbc:LicensePlateID>ABC-123</cbc:LicensePlateID>"));
    assert!(text.contains("<cbc:LicensePlateID>XYZ-789</cbc:LicensePlateID>"));
    assert_eq!(count_elements(&text, "CarrierParty"), 0);
}

#[test]
fn public_transport_renders_the_carrier_block() {
    let mut guide = base_guide();
    guide.transport_type = Some(TransportType::Public);
    guide.vehicle = None;
    guide.operator = None;
    guide.carrier = Some(Party {
        name: "Transportes Rapidos SA".into(),
        identification: Some(Identification {
            kind: IdentificationKind::Ruc,
            number: "20555555551".into(),
        }),
        address: Address::default(),
    });

    let text = decode(&despatch_advice_xml(&guide, lima_instant()).unwrap());
    assert!(text.contains("<cbc:TransportModeCode>01</cbc:TransportModeCode>"));
    assert_eq!(count_elements(&text, "CarrierParty"), 1);
    assert!(text.contains("Transportes Rapidos SA"));
    assert_eq!(count_elements(&text, "TransportMeans"), 0);
}

#[test]
fn zero_quantity_lines_are_filtered() {
    let mut guide = base_guide();
    guide.lines[1].quantity = dec!(0);

    let text = decode(&despatch_advice_xml(&guide, lima_instant()).unwrap());
    assert_eq!(count_elements(&text, "DespatchLine"), 1);
    assert!(!text.contains("Pallet B"));
}

#[test]
fn all_zero_quantities_render_an_empty_line_set() {
    let mut guide = base_guide();
    for line in &mut guide.lines {
        line.quantity = dec!(0);
    }

    let text = decode(&despatch_advice_xml(&guide, lima_instant()).unwrap());
    assert_eq!(count_elements(&text, "DespatchLine"), 0);
    // Still a well-formed document with the shipment block.
    assert_eq!(count_elements(&text, "Shipment"), 1);
}

#[test]
fn quantities_use_two_decimals_and_unit_codes() {
    let text = decode(&despatch_advice_xml(&base_guide(), lima_instant()).unwrap());
    assert!(text.contains(r#"unitCode="NIU">1.00<"#));
    assert!(text.contains(r#"unitCode="NIU">2.50<"#));
    assert!(text.contains(r#"unitCode="KGM">120.50<"#));
}

#[test]
fn weight_is_converted_to_kilograms() {
    let mut guide = base_guide();
    guide.shipper.weight_unit = WeightUnit::Gram;
    guide.gross_weight = dec!(120500);

    let text = decode(&despatch_advice_xml(&guide, lima_instant()).unwrap());
    assert!(text.contains(r#"unitCode="KGM">120.50<"#));
}

#[test]
fn related_document_block_is_optional() {
    let text = decode(&despatch_advice_xml(&base_guide(), lima_instant()).unwrap());
    assert_eq!(count_elements(&text, "AdditionalDocumentReference"), 0);

    let mut guide = base_guide();
    guide.related_document = Some(RelatedDocument {
        kind: RelatedDocumentType::Invoice,
        number: "F001-00000123".into(),
    });
    let text = decode(&despatch_advice_xml(&guide, lima_instant()).unwrap());
    assert_eq!(count_elements(&text, "AdditionalDocumentReference"), 1);
    assert!(text.contains("<cbc:DocumentTypeCode>01</cbc:DocumentTypeCode>"));
    assert!(text.contains("F001-00000123"));
}

#[test]
fn reason_label_is_emitted_in_latin1() {
    let mut guide = base_guide();
    guide.reason = Some(TransferReason::Export);

    let bytes = despatch_advice_xml(&guide, lima_instant()).unwrap();
    // 'ó' of "Exportación" as the Latin-1 byte 0xF3.
    assert!(bytes.contains(&0xF3));
    let text = decode(&bytes);
    assert!(text.contains("<cbc:HandlingCode>09</cbc:HandlingCode>"));
}

#[test]
fn rendering_is_deterministic_for_a_fixed_instant() {
    let guide = base_guide();
    let first = despatch_advice_xml(&guide, lima_instant()).unwrap();
    let second = despatch_advice_xml(&guide, lima_instant()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn serie_and_folio_come_from_the_document_number() {
    let mut guide = base_guide();
    guide.document_number = Some("AB12CD00099".into());

    let text = decode(&despatch_advice_xml(&guide, lima_instant()).unwrap());
    assert!(text.contains("<cbc:ID>AB12CD-00099</cbc:ID>"));
}

#[test]
fn rendering_without_a_number_fails() {
    let mut guide = base_guide();
    guide.document_number = None;
    assert!(matches!(
        despatch_advice_xml(&guide, lima_instant()),
        Err(DespatchError::Validation(_))
    ));
}

#[test]
fn the_document_reparses_cleanly() {
    let text = decode(&despatch_advice_xml(&base_guide(), lima_instant()).unwrap());
    // Strip the declaration: the reader consumes the rest.
    let body = text.split_once("?>").unwrap().1;
    assert!(count_elements(body, "DespatchAdvice") == 1);
}
