//! SUNAT catalog tables used on despatch guides.
//!
//! Catálogo 20 (reason for transfer) and the related-document catalog are
//! closed sets; both are modeled as sum types with translation tables to
//! their SUNAT codes and Spanish labels. `friendly_response_message` maps the
//! frequent SUNAT/OSE response codes to actionable explanations.

use serde::{Deserialize, Serialize};

/// Catálogo 20: reason for the transfer of goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferReason {
    /// 01: Venta.
    Sale,
    /// 02: Compra.
    Purchase,
    /// 04: Traslado entre establecimientos de la misma empresa.
    InternalTransfer,
    /// 08: Importación.
    Import,
    /// 09: Exportación.
    Export,
    /// 13: Otros.
    Other,
    /// 14: Venta sujeta a confirmación del comprador.
    SaleOnConfirmation,
    /// 18: Traslado emisor itinerante de comprobantes de pago.
    ItinerantSale,
}

impl TransferReason {
    /// Catálogo 20 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sale => "01",
            Self::Purchase => "02",
            Self::InternalTransfer => "04",
            Self::Import => "08",
            Self::Export => "09",
            Self::Other => "13",
            Self::SaleOnConfirmation => "14",
            Self::ItinerantSale => "18",
        }
    }

    /// Parse from a catálogo 20 code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::Sale),
            "02" => Some(Self::Purchase),
            "04" => Some(Self::InternalTransfer),
            "08" => Some(Self::Import),
            "09" => Some(Self::Export),
            "13" => Some(Self::Other),
            "14" => Some(Self::SaleOnConfirmation),
            "18" => Some(Self::ItinerantSale),
            _ => None,
        }
    }

    /// Label as printed on the guide.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sale => "Venta",
            Self::Purchase => "Compra",
            Self::InternalTransfer => {
                "Traslado entre establecimientos de la misma empresa"
            }
            Self::Import => "Importación",
            Self::Export => "Exportación",
            Self::Other => "Otros",
            Self::SaleOnConfirmation => "Venta sujeta a confirmación del comprador",
            Self::ItinerantSale => "Traslado emisor itinerante CP",
        }
    }
}

/// Related-document types referenced from a despatch guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelatedDocumentType {
    /// 01: Factura.
    Invoice,
    /// 02: Recibo por honorarios.
    FeeReceipt,
    /// 03: Boleta de venta.
    SaleTicket,
    /// 04: Liquidación de compra.
    PurchaseSettlement,
    /// 07: Nota de crédito.
    CreditNote,
    /// 08: Nota de débito.
    DebitNote,
    /// 09: Guía de remisión remitente.
    SenderDespatchAdvice,
    /// 12: Ticket de máquina registradora.
    CashRegisterTicket,
    /// 14: Recibo de servicios públicos.
    UtilityReceipt,
    /// 15: Boleto de transporte urbano.
    UrbanTransportTicket,
    /// 16: Boleto de viaje interprovincial.
    IntercityTransportTicket,
    /// 18: Documento emitido por AFP.
    PensionFundDocument,
    /// 20: Comprobante de retención.
    WithholdingReceipt,
    /// 21: Conocimiento de embarque.
    BillOfLading,
    /// 23: Póliza de adjudicación.
    AdjudicationPolicy,
    /// 24: Certificado de pago de regalías.
    RoyaltyCertificate,
    /// 25: Documento de atribución.
    AttributionDocument,
    /// 27: Seguro Complementario de Trabajo de Riesgo.
    RiskWorkInsurance,
    /// 28: Tarifa unificada de uso de aeropuerto.
    AirportFee,
    /// 29: Documentos emitidos por COFOPRI.
    CofopriDocument,
    /// 30: Documentos emitidos por empresas bancarias.
    BankDocument,
    /// 31: Guía de remisión transportista.
    CarrierDespatchAdvice,
    /// 32: Boleto de transporte aéreo.
    AirTransportTicket,
    /// 34: Documento del operador.
    OperatorDocument,
    /// 35: Documento del partícipe.
    ParticipantDocument,
    /// 36: Recibo de distribución de gas natural.
    NaturalGasReceipt,
    /// 37: Documentos por servicios de peaje.
    TollDocument,
    /// 40: Comprobante de percepción.
    PerceptionReceipt,
    /// 41: Comprobante de percepción por venta interna.
    DomesticPerceptionReceipt,
    /// 48: Comprobante de operaciones (Ley N° 29972).
    CooperativeOperationsReceipt,
    /// 49: Constancia de depósito de detracción.
    DetractionDepositSlip,
    /// 50: Declaración Aduanera de Mercancías (DAM).
    CustomsDeclaration,
    /// 52: Declaración simplificada (DS).
    SimplifiedCustomsDeclaration,
    /// 53: Declaración de mensajería o courier.
    CourierDeclaration,
    /// 55: BVME de transporte ferroviario.
    RailwayTransportTicket,
    /// 56: Comprobante de pago SEAE.
    ElectronicAuctionReceipt,
}

impl RelatedDocumentType {
    /// SUNAT related-document code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Invoice => "01",
            Self::FeeReceipt => "02",
            Self::SaleTicket => "03",
            Self::PurchaseSettlement => "04",
            Self::CreditNote => "07",
            Self::DebitNote => "08",
            Self::SenderDespatchAdvice => "09",
            Self::CashRegisterTicket => "12",
            Self::UtilityReceipt => "14",
            Self::UrbanTransportTicket => "15",
            Self::IntercityTransportTicket => "16",
            Self::PensionFundDocument => "18",
            Self::WithholdingReceipt => "20",
            Self::BillOfLading => "21",
            Self::AdjudicationPolicy => "23",
            Self::RoyaltyCertificate => "24",
            Self::AttributionDocument => "25",
            Self::RiskWorkInsurance => "27",
            Self::AirportFee => "28",
            Self::CofopriDocument => "29",
            Self::BankDocument => "30",
            Self::CarrierDespatchAdvice => "31",
            Self::AirTransportTicket => "32",
            Self::OperatorDocument => "34",
            Self::ParticipantDocument => "35",
            Self::NaturalGasReceipt => "36",
            Self::TollDocument => "37",
            Self::PerceptionReceipt => "40",
            Self::DomesticPerceptionReceipt => "41",
            Self::CooperativeOperationsReceipt => "48",
            Self::DetractionDepositSlip => "49",
            Self::CustomsDeclaration => "50",
            Self::SimplifiedCustomsDeclaration => "52",
            Self::CourierDeclaration => "53",
            Self::RailwayTransportTicket => "55",
            Self::ElectronicAuctionReceipt => "56",
        }
    }

    /// Parse from a SUNAT related-document code.
    pub fn from_code(code: &str) -> Option<Self> {
        ALL_RELATED_DOCUMENT_TYPES
            .iter()
            .copied()
            .find(|k| k.code() == code)
    }
}

/// All related-document types, in catalog order.
pub static ALL_RELATED_DOCUMENT_TYPES: &[RelatedDocumentType] = &[
    RelatedDocumentType::Invoice,
    RelatedDocumentType::FeeReceipt,
    RelatedDocumentType::SaleTicket,
    RelatedDocumentType::PurchaseSettlement,
    RelatedDocumentType::CreditNote,
    RelatedDocumentType::DebitNote,
    RelatedDocumentType::SenderDespatchAdvice,
    RelatedDocumentType::CashRegisterTicket,
    RelatedDocumentType::UtilityReceipt,
    RelatedDocumentType::UrbanTransportTicket,
    RelatedDocumentType::IntercityTransportTicket,
    RelatedDocumentType::PensionFundDocument,
    RelatedDocumentType::WithholdingReceipt,
    RelatedDocumentType::BillOfLading,
    RelatedDocumentType::AdjudicationPolicy,
    RelatedDocumentType::RoyaltyCertificate,
    RelatedDocumentType::AttributionDocument,
    RelatedDocumentType::RiskWorkInsurance,
    RelatedDocumentType::AirportFee,
    RelatedDocumentType::CofopriDocument,
    RelatedDocumentType::BankDocument,
    RelatedDocumentType::CarrierDespatchAdvice,
    RelatedDocumentType::AirTransportTicket,
    RelatedDocumentType::OperatorDocument,
    RelatedDocumentType::ParticipantDocument,
    RelatedDocumentType::NaturalGasReceipt,
    RelatedDocumentType::TollDocument,
    RelatedDocumentType::PerceptionReceipt,
    RelatedDocumentType::DomesticPerceptionReceipt,
    RelatedDocumentType::CooperativeOperationsReceipt,
    RelatedDocumentType::DetractionDepositSlip,
    RelatedDocumentType::CustomsDeclaration,
    RelatedDocumentType::SimplifiedCustomsDeclaration,
    RelatedDocumentType::CourierDeclaration,
    RelatedDocumentType::RailwayTransportTicket,
    RelatedDocumentType::ElectronicAuctionReceipt,
];

/// Curated explanations for the SUNAT/OSE response codes users hit most
/// often on despatch guides. The raw code and message are always stored
/// alongside; this text is prepended when the code is recognized.
pub fn friendly_response_message(code: &str) -> Option<&'static str> {
    match code {
        "98" => Some(
            "The request has not yet finished processing on the SUNAT side. \
             Retry in a few minutes; the ticket is kept.",
        ),
        "151" => Some(
            "The document name does not match the expected serie format. \
             Check that the serie is three uppercase letters plus a dash.",
        ),
        "154" => Some(
            "Your RUC is not authorized for electronic despatch guides. \
             Complete the enrollment in the SUNAT portal first.",
        ),
        "156" => Some("The zip file is corrupted; regenerate and resubmit the document."),
        "1033" => Some(
            "A document with this serie and folio already exists on the SUNAT \
             side. The number has been released; retrying will allocate a new one.",
        ),
        "1034" => Some(
            "Check the VAT configured on the company; this error usually means \
             the RUC on the document does not match the credentials used.",
        ),
        "2022" => Some(
            "The receiver name must contain at least 2 characters and no \
             special characters.",
        ),
        "2800" => Some(
            "The identity document type used for the receiver is not allowed. \
             Review the receiver's identification kind.",
        ),
        "2801" => Some(
            "The receiver DNI must be exactly 8 digits. Correct the \
             identification number on the receiver.",
        ),
        "4332" => Some(
            "One or more products have no product code configured. This \
             warning does not invalidate the document.",
        ),
        _ => None,
    }
}
