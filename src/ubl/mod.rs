//! UBL 2.1 DespatchAdvice rendering for the Guía de Remisión Electrónica.
//!
//! The renderer computes and normalizes values (dates in Lima civil time,
//! two-decimal quantities, catalog labels, zero-quantity filtering) and
//! emits the document through [`xml_utils::XmlWriter`]. The result is parsed
//! once and re-serialized with an ISO-8859-1 declaration before handoff to
//! the signing service.

pub mod cdr;
pub mod xml_utils;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;

use crate::core::{
    Address, DeliveryGuide, DespatchError, Party, SerieFolio, TransportType,
};

use xml_utils::{XmlWriter, reserialize_latin1};

/// UBL namespaces for the DespatchAdvice document family.
pub mod ubl_ns {
    pub const DESPATCH_ADVICE: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:DespatchAdvice-2";
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
}

/// UBL grammar version.
pub const UBL_VERSION: &str = "2.1";

/// SUNAT customization of the DespatchAdvice schema.
pub const CUSTOMIZATION_ID: &str = "2.0";

/// Catálogo 01 document type code for a sender despatch advice.
pub const DESPATCH_DOCUMENT_CODE: &str = "09";

/// Render the signed-ready DespatchAdvice for a guide.
///
/// `issued_at` is the current Peruvian civil time; the same guide rendered at
/// the same instant yields byte-identical output.
pub fn despatch_advice_xml(
    guide: &DeliveryGuide,
    issued_at: DateTime<FixedOffset>,
) -> Result<Vec<u8>, DespatchError> {
    let number = guide.document_number.as_deref().ok_or_else(|| {
        DespatchError::Validation("the guide has no document number allocated".into())
    })?;
    let serie_folio = SerieFolio::parse(number)?;
    let receiver = guide
        .receiver
        .as_ref()
        .ok_or_else(|| DespatchError::Validation("the guide has no receiver".into()))?;
    let reason = guide
        .reason
        .ok_or_else(|| DespatchError::Validation("the guide has no transfer reason".into()))?;
    let transport_type = guide.transport_type.ok_or_else(|| {
        DespatchError::Validation("the guide has no transport type".into())
    })?;
    let departure_date = guide.departure_date.ok_or_else(|| {
        DespatchError::Validation("the guide has no departure date".into())
    })?;
    let ruc = guide.shipper.ruc()?;

    let mut w = XmlWriter::new();

    w.start_element_with_attrs(
        "DespatchAdvice",
        &[
            ("xmlns", ubl_ns::DESPATCH_ADVICE),
            ("xmlns:cac", ubl_ns::CAC),
            ("xmlns:cbc", ubl_ns::CBC),
        ],
    )?;

    w.text_element("cbc:UBLVersionID", UBL_VERSION)?;
    w.text_element("cbc:CustomizationID", CUSTOMIZATION_ID)?;
    w.text_element("cbc:ID", &format!("{}-{}", serie_folio.serie, serie_folio.folio))?;
    w.text_element("cbc:IssueDate", &issued_at.format("%Y-%m-%d").to_string())?;
    w.text_element("cbc:IssueTime", &issued_at.format("%H:%M:%S").to_string())?;
    w.text_element("cbc:DespatchAdviceTypeCode", DESPATCH_DOCUMENT_CODE)?;
    if let Some(observation) = &guide.observation {
        w.text_element("cbc:Note", observation)?;
    }

    if let Some(related) = &guide.related_document {
        w.start_element("cac:AdditionalDocumentReference")?;
        w.text_element("cbc:ID", &related.number)?;
        w.text_element("cbc:DocumentTypeCode", related.kind.code())?;
        w.end_element("cac:AdditionalDocumentReference")?;
    }

    // Sender block.
    w.start_element("cac:DespatchSupplierParty")?;
    w.text_element_with_attrs("cbc:CustomerAssignedAccountID", ruc, &[("schemeID", "6")])?;
    w.start_element("cac:Party")?;
    w.start_element("cac:PartyLegalEntity")?;
    w.text_element(
        "cbc:RegistrationName",
        guide.shipper.trade_name.as_deref().unwrap_or(&guide.shipper.name),
    )?;
    w.end_element("cac:PartyLegalEntity")?;
    w.end_element("cac:Party")?;
    w.end_element("cac:DespatchSupplierParty")?;

    // Receiver block.
    w.start_element("cac:DeliveryCustomerParty")?;
    w.start_element("cac:Party")?;
    if let Some(identification) = &receiver.identification {
        w.start_element("cac:PartyIdentification")?;
        w.text_element_with_attrs(
            "cbc:ID",
            &identification.number,
            &[("schemeID", identification.kind.code())],
        )?;
        w.end_element("cac:PartyIdentification")?;
    }
    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", &receiver.name)?;
    w.end_element("cac:PartyLegalEntity")?;
    w.end_element("cac:Party")?;
    w.end_element("cac:DeliveryCustomerParty")?;

    // Shipment block.
    w.start_element("cac:Shipment")?;
    w.text_element("cbc:ID", "1")?;
    w.text_element("cbc:HandlingCode", reason.code())?;
    w.text_element("cbc:HandlingInstructions", reason.label())?;
    let weight_kg = guide
        .shipper
        .weight_unit
        .to_kilograms(guide.gross_weight);
    w.quantity_element("cbc:GrossWeightMeasure", weight_kg, "KGM")?;

    w.start_element("cac:ShipmentStage")?;
    w.text_element("cbc:TransportModeCode", transport_type.code())?;
    w.start_element("cac:TransitPeriod")?;
    w.text_element("cbc:StartDate", &departure_date.format("%Y-%m-%d").to_string())?;
    w.end_element("cac:TransitPeriod")?;
    match transport_type {
        TransportType::Public => {
            if let Some(carrier) = &guide.carrier {
                write_carrier(&mut w, carrier)?;
            }
        }
        TransportType::Private => {
            write_private_transport(&mut w, guide)?;
        }
    }
    w.end_element("cac:ShipmentStage")?;

    w.start_element("cac:Delivery")?;
    write_address(&mut w, "cac:DeliveryAddress", &receiver.address)?;
    w.start_element("cac:Despatch")?;
    write_address(&mut w, "cac:DespatchAddress", &guide.origin.address)?;
    w.end_element("cac:Despatch")?;
    w.end_element("cac:Delivery")?;
    w.end_element("cac:Shipment")?;

    // One line per move with a positive quantity.
    let mut index = 0u32;
    for line in guide.lines.iter().filter(|l| l.quantity > Decimal::ZERO) {
        index += 1;
        w.start_element("cac:DespatchLine")?;
        w.text_element("cbc:ID", &index.to_string())?;
        w.quantity_element("cbc:DeliveredQuantity", line.quantity, &line.uom_code)?;
        w.start_element("cac:OrderLineReference")?;
        w.text_element("cbc:LineID", &index.to_string())?;
        w.end_element("cac:OrderLineReference")?;
        w.start_element("cac:Item")?;
        w.text_element("cbc:Description", &line.description)?;
        w.start_element("cac:SellersItemIdentification")?;
        w.text_element("cbc:ID", &line.product_code)?;
        w.end_element("cac:SellersItemIdentification")?;
        w.end_element("cac:Item")?;
        w.end_element("cac:DespatchLine")?;
    }

    w.end_element("DespatchAdvice")?;

    reserialize_latin1(&w.into_string()?)
}

fn write_carrier(w: &mut XmlWriter, carrier: &Party) -> Result<(), DespatchError> {
    w.start_element("cac:CarrierParty")?;
    if let Some(identification) = &carrier.identification {
        w.start_element("cac:PartyIdentification")?;
        w.text_element_with_attrs(
            "cbc:ID",
            &identification.number,
            &[("schemeID", identification.kind.code())],
        )?;
        w.end_element("cac:PartyIdentification")?;
    }
    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", &carrier.name)?;
    w.end_element("cac:PartyLegalEntity")?;
    w.end_element("cac:CarrierParty")?;
    Ok(())
}

fn write_private_transport(
    w: &mut XmlWriter,
    guide: &DeliveryGuide,
) -> Result<(), DespatchError> {
    if let Some(operator) = &guide.operator {
        w.start_element("cac:DriverPerson")?;
        if let Some(identification) = &operator.identification {
            w.text_element_with_attrs(
                "cbc:ID",
                &identification.number,
                &[("schemeID", identification.kind.code())],
            )?;
        }
        w.text_element("cbc:FirstName", &operator.name)?;
        if let Some(license) = &operator.license {
            w.text_element("cbc:JobTitle", license)?;
        }
        w.end_element("cac:DriverPerson")?;
    }
    if let Some(vehicle) = &guide.vehicle {
        w.start_element("cac:TransportMeans")?;
        w.start_element("cac:RoadTransport")?;
        w.text_element("cbc:LicensePlateID", &vehicle.plate)?;
        w.end_element("cac:RoadTransport")?;
        w.end_element("cac:TransportMeans")?;
        for plate in &vehicle.extra_plates {
            w.start_element("cac:TransportMeans")?;
            w.start_element("cac:RoadTransport")?;
            w.text_element("cbc:LicensePlateID", plate)?;
            w.end_element("cac:RoadTransport")?;
            w.end_element("cac:TransportMeans")?;
        }
    }
    Ok(())
}

fn write_address(w: &mut XmlWriter, tag: &str, address: &Address) -> Result<(), DespatchError> {
    w.start_element(tag)?;
    if let Some(district) = &address.district {
        w.text_element("cbc:CitySubdivisionName", district)?;
    }
    if let Some(street) = &address.street {
        w.start_element("cac:AddressLine")?;
        w.text_element("cbc:Line", street)?;
        w.end_element("cac:AddressLine")?;
    }
    w.start_element("cac:Country")?;
    w.text_element("cbc:IdentificationCode", &address.country_code)?;
    w.end_element("cac:Country")?;
    w.end_element(tag)?;
    Ok(())
}
