use super::error::ValidationError;
use super::types::*;

/// Run every pre-flight check on a delivery guide.
/// Returns all findings (not just the first); never mutates the guide.
///
/// A guide whose lines all have zero quantity passes validation: the
/// renderer filters those lines and SUNAT decides the document's fate.
pub fn check(guide: &DeliveryGuide) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match &guide.receiver {
        None => {
            errors.push(ValidationError::new(
                "receiver",
                "A delivery address partner is required.",
            ));
        }
        Some(receiver) => {
            if is_blank(&receiver.address.district) {
                errors.push(ValidationError::new(
                    "receiver.address.district",
                    "The district of the delivery address is required.",
                ));
            }
        }
    }

    if guide.transport_type.is_none() {
        errors.push(ValidationError::new(
            "transport_type",
            "The transport type is required.",
        ));
    }

    if guide.reason.is_none() {
        errors.push(ValidationError::new(
            "reason",
            "The reason for transfer is required.",
        ));
    }

    if guide.departure_date.is_none() {
        errors.push(ValidationError::new(
            "departure_date",
            "The departure start date is required.",
        ));
    }

    if guide.transport_type == Some(TransportType::Private) && guide.vehicle.is_none() {
        errors.push(ValidationError::new(
            "vehicle",
            "A vehicle is required for private transport.",
        ));
    }

    validate_company(&guide.shipper, &mut errors);
    validate_origin(&guide.origin, &mut errors);
    validate_operator(guide, &mut errors);

    errors
}

fn validate_company(company: &Company, errors: &mut Vec<ValidationError>) {
    match &company.identification {
        None => {
            errors.push(ValidationError::new(
                "shipper.identification",
                "The company must have a registered identification.",
            ));
        }
        Some(identification) => {
            if identification.kind != IdentificationKind::Ruc {
                errors.push(ValidationError::new(
                    "shipper.identification.kind",
                    "The company identification type must be RUC (code 6).",
                ));
            }
        }
    }

    if company.vat.as_deref().is_none_or(|v| v.trim().is_empty()) {
        errors.push(ValidationError::new(
            "shipper.vat",
            "An identification number is required for the company.",
        ));
    }
}

fn validate_origin(origin: &Warehouse, errors: &mut Vec<ValidationError>) {
    if is_blank(&origin.address.district) {
        errors.push(ValidationError::new(
            "origin.address.district",
            "The district of the warehouse address is required.",
        ));
    }
    if is_blank(&origin.address.street) {
        errors.push(ValidationError::new(
            "origin.address.street",
            "The street of the warehouse address is required.",
        ));
    }
}

fn validate_operator(guide: &DeliveryGuide, errors: &mut Vec<ValidationError>) {
    let Some(vehicle) = &guide.vehicle else {
        return;
    };

    // M1L vehicles on private transport may travel without a declared driver.
    let exempt = guide.transport_type == Some(TransportType::Private)
        && vehicle.category.as_deref() == Some(OPERATOR_EXEMPT_VEHICLE_CATEGORY);

    if !exempt && guide.operator.is_none() {
        errors.push(ValidationError::new(
            "operator",
            "An operator must be declared for the vehicle.",
        ));
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::codes::TransferReason;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

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

    fn receiver() -> Party {
        Party {
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
        }
    }

    fn origin() -> Warehouse {
        Warehouse {
            name: "Lima DC".into(),
            address: Address {
                street: Some("Jr. Callao 500".into()),
                district: Some("Cercado de Lima".into()),
                country_code: "PE".into(),
            },
        }
    }

    fn valid_guide() -> DeliveryGuide {
        DeliveryGuide {
            id: 1,
            name: "WH/OUT/00001".into(),
            shipper: company(),
            receiver: Some(receiver()),
            origin: origin(),
            state: SubmissionState::ToSend,
            document_number: None,
            ticket: None,
            error: None,
            operator: Some(Driver {
                name: "Julio Paredes".into(),
                identification: Some(Identification {
                    kind: IdentificationKind::Dni,
                    number: "45678912".into(),
                }),
                license: Some("Q45678912".into()),
            }),
            vehicle: Some(Vehicle {
                plate: "ABC-123".into(),
                category: None,
                extra_plates: Vec::new(),
            }),
            carrier: None,
            transport_type: Some(TransportType::Private),
            reason: Some(TransferReason::Sale),
            departure_date: NaiveDate::from_ymd_opt(2024, 6, 15),
            observation: None,
            related_document: None,
            gross_weight: dec!(120.5),
            lines: vec![TransferLine {
                product_code: "PA".into(),
                description: "Pallet A".into(),
                uom_code: "NIU".into(),
                quantity: dec!(1),
            }],
        }
    }

    #[test]
    fn valid_guide_has_no_findings() {
        assert!(check(&valid_guide()).is_empty());
    }

    #[test]
    fn missing_receiver() {
        let mut guide = valid_guide();
        guide.receiver = None;
        let errors = check(&guide);
        assert!(errors.iter().any(|e| e.field == "receiver"));
    }

    #[test]
    fn missing_receiver_district() {
        let mut guide = valid_guide();
        if let Some(r) = guide.receiver.as_mut() {
            r.address.district = None;
        }
        let errors = check(&guide);
        assert!(errors.iter().any(|e| e.field == "receiver.address.district"));
    }

    #[test]
    fn missing_company_vat_uses_the_canonical_message() {
        let mut guide = valid_guide();
        guide.shipper.vat = None;
        let errors = check(&guide);
        assert!(errors.iter().any(|e| {
            e.message == "An identification number is required for the company."
        }));
    }

    #[test]
    fn company_identification_must_be_ruc() {
        let mut guide = valid_guide();
        guide.shipper.identification = Some(Identification {
            kind: IdentificationKind::Dni,
            number: "45678912".into(),
        });
        let errors = check(&guide);
        assert!(errors.iter().any(|e| e.field == "shipper.identification.kind"));
    }

    #[test]
    fn private_transport_requires_vehicle() {
        let mut guide = valid_guide();
        guide.vehicle = None;
        guide.operator = None;
        let errors = check(&guide);
        assert!(errors.iter().any(|e| e.field == "vehicle"));
    }

    #[test]
    fn m1l_vehicle_exempts_operator_on_private_transport() {
        let mut guide = valid_guide();
        guide.operator = None;
        if let Some(v) = guide.vehicle.as_mut() {
            v.category = Some("M1L".into());
        }
        assert!(check(&guide).is_empty());

        // Same vehicle on public transport still needs an operator.
        guide.transport_type = Some(TransportType::Public);
        let errors = check(&guide);
        assert!(errors.iter().any(|e| e.field == "operator"));
    }

    #[test]
    fn all_findings_accumulate() {
        let mut guide = valid_guide();
        guide.receiver = None;
        guide.transport_type = None;
        guide.reason = None;
        guide.departure_date = None;
        guide.shipper.vat = None;
        let errors = check(&guide);
        assert!(errors.len() >= 5, "expected at least 5 findings, got {errors:?}");
    }

    #[test]
    fn zero_quantity_lines_pass_validation() {
        let mut guide = valid_guide();
        for line in &mut guide.lines {
            line.quantity = dec!(0);
        }
        assert!(check(&guide).is_empty());
    }
}
