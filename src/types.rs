//! Common types shared by the camt adapter and the V11 pipeline.

use std::fmt;

/// A statement or notification level of a camt document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    /// Ordered statement entries.
    pub entries: Vec<Entry>,
}

/// One statement entry (camt `Ntry`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    /// Booking date, as written in the document.
    pub booking_date: Option<String>,

    /// Value date, as written in the document.
    pub value_date: Option<String>,

    /// Client BVR number (camt `NtryRef`).
    pub client_bvr_number: Option<String>,

    /// Raw reversal indicator; the string `"true"` marks a reversal.
    pub reversal_indicator: Option<String>,

    /// Nested entry detail groups (camt `NtryDtls`).
    pub detail_groups: Vec<EntryDetailGroup>,
}

/// A batch of transaction details under one entry (camt `NtryDtls`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryDetailGroup {
    /// Transaction details (camt `TxDtls`).
    pub transactions: Vec<TransactionDetail>,
}

/// Raw transaction detail (camt `TxDtls`), every leaf already unwrapped to
/// at most one value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionDetail {
    /// Structured references block; its presence gates V11 inclusion.
    pub refs: Option<References>,

    /// Proprietary transaction type code (camt `BkTxCd/Prtry/Cd`).
    pub transaction_code: Option<String>,

    /// Bank transaction sub-family code (camt `BkTxCd/Domn/Fmly/SubFmlyCd`).
    pub bank_transaction_code: Option<String>,

    /// Credit/debit indicator; `CRDT` marks a credit.
    pub credit_debit_indicator: Option<String>,

    /// BVR reference number (camt `RmtInf/Strd/CdtrRefInf/Ref`).
    pub bvr_reference: Option<String>,

    /// Transaction currency.
    pub currency: Option<String>,

    /// Transaction amount, as written in the document.
    pub amount: Option<String>,

    /// Submission timestamp (camt `RltdDts/AccptncDtTm`).
    pub submission_date: Option<String>,

    /// Charges currency (camt `Chrgs/TtlChrgsAndTaxAmt`).
    pub charges_currency: Option<String>,

    /// Charges amount.
    pub charges_amount: Option<String>,
}

/// Structured references of a transaction detail (camt `Refs`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct References {
    /// Account servicer reference.
    pub account_servicer_reference: Option<String>,

    /// End-to-end identification.
    pub end_to_end_id: Option<String>,
}

/// A transaction normalized for V11 encoding. Built once, never mutated.
///
/// Amounts and dates keep the raw document text; they are parsed at encoding
/// time so that malformed values degrade to zero-filled fields instead of
/// failing extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTransaction {
    /// Mapped 2-digit V11 transaction code.
    pub transaction_code: String,

    /// Bank transaction sub-family code.
    pub bank_transaction_code: Option<String>,

    /// Whether the detail is a credit.
    pub is_credit: bool,

    /// Whether the enclosing entry is a reversal.
    pub reversal: bool,

    /// Client BVR number; always non-empty.
    pub client_bvr_number: String,

    /// BVR reference number.
    pub bvr_reference_number: String,

    /// Transaction currency.
    pub currency: Option<String>,

    /// Raw transaction amount.
    pub amount: Option<String>,

    /// Submission date.
    pub submission_date: Option<String>,

    /// Processing date: the booking date of the enclosing entry.
    pub processing_date: Option<String>,

    /// Accounting date: the value date of the enclosing entry.
    pub accounting_date: Option<String>,

    /// Tax currency; the encoder falls back to the transaction currency.
    pub tax_currency: Option<String>,

    /// Raw tax amount.
    pub tax_amount: Option<String>,
}

/// Record-level fault, occupying the sequence slot a transaction would.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    /// A transaction detail carries no structured references block.
    MissingRefs,

    /// The enclosing entry carries no client BVR number.
    MissingBvrNumber,

    /// Unexpected failure while encoding an otherwise valid transaction.
    Unknown,
}

impl RecordError {
    /// Stable identifier surfaced in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordError::MissingRefs => "MissingRefs",
            RecordError::MissingBvrNumber => "MissingBvrNumber",
            RecordError::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One slot of the extractor's output sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedRecord {
    /// A fully normalized transaction.
    Transaction(NormalizedTransaction),

    /// A per-record fault; counted, never encoded.
    Error(RecordError),
}
