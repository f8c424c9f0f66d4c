use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::codes::{RelatedDocumentType, TransferReason};

/// Identifier of a delivery guide row in the record store.
pub type GuideId = u64;

/// A delivery guide (guía de remisión): one shipment to be declared to SUNAT.
///
/// The submission fields (`document_number`, `ticket`, `error`, `state`) are
/// owned by the orchestrator; everything else is business data loaded from
/// the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryGuide {
    pub id: GuideId,
    /// Internal picking reference (e.g. "WH/OUT/00042").
    pub name: String,
    /// The company issuing the guide.
    pub shipper: Company,
    /// The party receiving the goods.
    pub receiver: Option<Party>,
    /// Warehouse the goods depart from.
    pub origin: Warehouse,
    /// Submission state, separate from the picking's business state.
    pub state: SubmissionState,
    /// Serie + folio, e.g. "T001-00000001". Allocated once per submission;
    /// cleared only when SUNAT reports the number as a duplicate.
    pub document_number: Option<String>,
    /// Opaque SUNAT correlation id issued by a successful send.
    pub ticket: Option<String>,
    /// Last user-visible error, stored as HTML.
    pub error: Option<String>,
    /// Driver, required for private transport unless the vehicle is M1L.
    pub operator: Option<Driver>,
    pub vehicle: Option<Vehicle>,
    /// Third-party carrier, rendered for public transport.
    pub carrier: Option<Party>,
    pub transport_type: Option<TransportType>,
    pub reason: Option<TransferReason>,
    pub departure_date: Option<NaiveDate>,
    pub observation: Option<String>,
    pub related_document: Option<RelatedDocument>,
    /// Total gross weight in the company weight unit.
    pub gross_weight: Decimal,
    /// Ordered move lines; zero-quantity lines are kept here and filtered at
    /// render time.
    pub lines: Vec<TransferLine>,
}

/// Submission state of a guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    /// Not yet accepted by SUNAT; a submission may be pending or failed.
    ToSend,
    /// A valid CDR is attached to the record.
    Sent,
}

/// The issuing company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    /// Trade name reported to SUNAT; falls back to `name` when absent.
    pub trade_name: Option<String>,
    /// RUC (11-digit taxpayer number).
    pub vat: Option<String>,
    pub identification: Option<Identification>,
    pub weight_unit: WeightUnit,
    pub credentials: Option<SunatCredentials>,
}

/// SUNAT API credentials (clave SOL application credentials).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunatCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
}

/// A receiving party or third-party carrier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub identification: Option<Identification>,
    pub address: Address,
}

/// Warehouse of origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub name: String,
    pub address: Address,
}

/// A Peruvian address as SUNAT wants it: district is the significant unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub district: Option<String>,
    /// ISO 3166-1 alpha-2, normally "PE".
    pub country_code: String,
}

/// Identity document: kind + number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identification {
    pub kind: IdentificationKind,
    pub number: String,
}

/// Catálogo 06: identity document kinds accepted on despatch guides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentificationKind {
    /// 1: DNI.
    Dni,
    /// 4: Carnet de extranjería.
    ForeignerCard,
    /// 6: RUC. The only kind valid for the issuing company.
    Ruc,
    /// 7: Passport.
    Passport,
}

impl IdentificationKind {
    /// Catálogo 06 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Dni => "1",
            Self::ForeignerCard => "4",
            Self::Ruc => "6",
            Self::Passport => "7",
        }
    }

    /// Parse from a catálogo 06 code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Dni),
            "4" => Some(Self::ForeignerCard),
            "6" => Some(Self::Ruc),
            "7" => Some(Self::Passport),
            _ => None,
        }
    }
}

/// Catálogo 18: transport modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportType {
    /// 01: transport contracted out to a carrier.
    Public,
    /// 02: transport with the company's own vehicles.
    Private,
}

impl TransportType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Public => "01",
            Self::Private => "02",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::Public),
            "02" => Some(Self::Private),
            _ => None,
        }
    }
}

/// Vehicle class exempt from the operator requirement on private transport.
pub const OPERATOR_EXEMPT_VEHICLE_CATEGORY: &str = "M1L";

/// A transport vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub plate: String,
    /// MTC vehicle category (e.g. "M1L").
    pub category: Option<String>,
    /// Plates of additional vehicles (trailers, secondary units).
    pub extra_plates: Vec<String>,
}

/// The declared driver on private transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub identification: Option<Identification>,
    pub license: Option<String>,
}

/// One move line of the shipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferLine {
    pub product_code: String,
    pub description: String,
    /// UN/CEFACT unit code (e.g. "NIU", "KGM").
    pub uom_code: String,
    pub quantity: Decimal,
}

/// Reference to a related document (e.g. the invoice backing the transfer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedDocument {
    pub kind: RelatedDocumentType,
    pub number: String,
}

/// Company-wide weight unit for picking weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    Kilogram,
    Gram,
    Pound,
}

impl WeightUnit {
    /// UN/CEFACT unit code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Kilogram => "KGM",
            Self::Gram => "GRM",
            Self::Pound => "LBR",
        }
    }

    /// Convert a weight in this unit to kilograms, the unit SUNAT expects.
    pub fn to_kilograms(&self, weight: Decimal) -> Decimal {
        match self {
            Self::Kilogram => weight,
            Self::Gram => weight / dec!(1000),
            Self::Pound => weight * dec!(0.45359237),
        }
    }
}

impl Company {
    /// RUC of the company, once validation guaranteed it is present.
    pub(crate) fn ruc(&self) -> Result<&str, super::DespatchError> {
        self.vat.as_deref().ok_or_else(|| {
            super::DespatchError::Config("the company has no RUC configured".into())
        })
    }
}
