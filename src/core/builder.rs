use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::codes::{RelatedDocumentType, TransferReason};
use super::types::*;

/// Builder for assembling delivery guides.
///
/// The builder does not validate; run [`crate::core::check`] on the result
/// before submitting.
///
/// ```
/// use remision::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let guide = GuideBuilder::new(1, "WH/OUT/00001", Company {
///         name: "Andina Foods SAC".into(),
///         trade_name: None,
///         vat: Some("20123456789".into()),
///         identification: Some(Identification {
///             kind: IdentificationKind::Ruc,
///             number: "20123456789".into(),
///         }),
///         weight_unit: WeightUnit::Kilogram,
///         credentials: None,
///     })
///     .reason(TransferReason::Sale)
///     .transport_type(TransportType::Public)
///     .departure_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
///     .add_line("PA", "Pallet A", "NIU", dec!(1))
///     .build();
///
/// assert_eq!(guide.lines.len(), 1);
/// ```
pub struct GuideBuilder {
    guide: DeliveryGuide,
}

impl GuideBuilder {
    pub fn new(id: GuideId, name: impl Into<String>, shipper: Company) -> Self {
        Self {
            guide: DeliveryGuide {
                id,
                name: name.into(),
                shipper,
                receiver: None,
                origin: Warehouse {
                    name: String::new(),
                    address: Address::default(),
                },
                state: SubmissionState::ToSend,
                document_number: None,
                ticket: None,
                error: None,
                operator: None,
                vehicle: None,
                carrier: None,
                transport_type: None,
                reason: None,
                departure_date: None,
                observation: None,
                related_document: None,
                gross_weight: Decimal::ZERO,
                lines: Vec::new(),
            },
        }
    }

    pub fn receiver(mut self, receiver: Party) -> Self {
        self.guide.receiver = Some(receiver);
        self
    }

    pub fn origin(mut self, origin: Warehouse) -> Self {
        self.guide.origin = origin;
        self
    }

    pub fn operator(mut self, operator: Driver) -> Self {
        self.guide.operator = Some(operator);
        self
    }

    pub fn vehicle(mut self, vehicle: Vehicle) -> Self {
        self.guide.vehicle = Some(vehicle);
        self
    }

    pub fn carrier(mut self, carrier: Party) -> Self {
        self.guide.carrier = Some(carrier);
        self
    }

    pub fn transport_type(mut self, transport_type: TransportType) -> Self {
        self.guide.transport_type = Some(transport_type);
        self
    }

    pub fn reason(mut self, reason: TransferReason) -> Self {
        self.guide.reason = Some(reason);
        self
    }

    pub fn departure_date(mut self, date: NaiveDate) -> Self {
        self.guide.departure_date = Some(date);
        self
    }

    pub fn observation(mut self, observation: impl Into<String>) -> Self {
        self.guide.observation = Some(observation.into());
        self
    }

    pub fn related_document(
        mut self,
        kind: RelatedDocumentType,
        number: impl Into<String>,
    ) -> Self {
        self.guide.related_document = Some(RelatedDocument {
            kind,
            number: number.into(),
        });
        self
    }

    pub fn document_number(mut self, number: impl Into<String>) -> Self {
        self.guide.document_number = Some(number.into());
        self
    }

    pub fn gross_weight(mut self, weight: Decimal) -> Self {
        self.guide.gross_weight = weight;
        self
    }

    pub fn add_line(
        mut self,
        product_code: impl Into<String>,
        description: impl Into<String>,
        uom_code: impl Into<String>,
        quantity: Decimal,
    ) -> Self {
        self.guide.lines.push(TransferLine {
            product_code: product_code.into(),
            description: description.into(),
            uom_code: uom_code.into(),
            quantity,
        });
        self
    }

    pub fn build(self) -> DeliveryGuide {
        self.guide
    }
}
