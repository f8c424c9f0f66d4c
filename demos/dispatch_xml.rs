//! Offline walk through the document side of a submission: validate a guide,
//! render the DespatchAdvice, and package the envelope.
//!
//! Run with: `cargo run --example dispatch_xml`

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use remision::core::*;
use remision::envelope;
use remision::store::{Clock, LimaClock};
use remision::ubl::despatch_advice_xml;

fn main() -> Result<(), DespatchError> {
    let guide = GuideBuilder::new(
        1,
        "WH/OUT/00042",
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
        },
    )
    .document_number("T001-00000042")
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
        extra_plates: Vec::new(),
    })
    .reason(TransferReason::Sale)
    .departure_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    .observation("Entrega en almacén central")
    .gross_weight(dec!(120.5))
    .add_line("PA", "Pallet A", "NIU", dec!(1))
    .add_line("PB", "Pallet B", "NIU", dec!(2.5))
    .build();

    let findings = check(&guide);
    if !findings.is_empty() {
        for finding in &findings {
            eprintln!("finding: {finding}");
        }
        return Err(DespatchError::Validation("guide is not submittable".into()));
    }
    println!("validation: ok");

    let xml = despatch_advice_xml(&guide, LimaClock.now())?;
    println!("rendered {} bytes of ISO-8859-1 XML", xml.len());

    let filename = format!(
        "{}-09-{}",
        guide.shipper.vat.as_deref().unwrap_or_default(),
        guide.document_number.as_deref().unwrap_or_default()
    );
    let envelope = envelope::package(&xml, &filename)?;
    println!("envelope: {}.zip", envelope.filename);
    println!("  sha256: {}", envelope.zip_sha256_hex);
    println!("  base64: {} chars", envelope.zip_b64.len());

    let extracted = envelope::unzip_first_xml(&envelope.zip_bytes)?;
    assert_eq!(extracted, xml);
    println!("zip round trip: ok");

    Ok(())
}
