//! Walks a parsed statement and produces normalized V11 transaction records.

use crate::classify;
use crate::types::{
    Entry, ExtractedRecord, NormalizedTransaction, RecordError, Statement, TransactionDetail,
};

/// Extract the ordered sequence of normalized transactions from a statement.
///
/// Faults occupy their sequence slot as [`RecordError`] markers: a detail
/// without a structured references block becomes
/// [`RecordError::MissingRefs`]; a detail under an entry without a client
/// BVR number becomes [`RecordError::MissingBvrNumber`]. A detail that has a
/// BVR number but no BVR reference is neither a line nor a fault and is
/// dropped.
pub fn extract_transactions(statement: &Statement) -> Vec<ExtractedRecord> {
    let mut records = Vec::new();

    for entry in &statement.entries {
        let reversal = entry.reversal_indicator.as_deref() == Some("true");
        let client_bvr_number = entry
            .client_bvr_number
            .as_deref()
            .filter(|number| !number.is_empty());

        for group in &entry.detail_groups {
            for details in &group.transactions {
                if details.refs.is_none() {
                    tracing::warn!("transaction detail without structured references");
                    records.push(ExtractedRecord::Error(RecordError::MissingRefs));
                    continue;
                }

                let client_bvr_number = match client_bvr_number {
                    Some(number) => number,
                    None => {
                        tracing::warn!("entry without client BVR number");
                        records.push(ExtractedRecord::Error(RecordError::MissingBvrNumber));
                        continue;
                    }
                };

                let reference = match details.bvr_reference.as_deref() {
                    Some(reference) if !reference.is_empty() => reference,
                    _ => continue,
                };

                records.push(ExtractedRecord::Transaction(normalize(
                    details,
                    entry,
                    client_bvr_number,
                    reference,
                    reversal,
                )));
            }
        }
    }

    records
}

fn normalize(
    details: &TransactionDetail,
    entry: &Entry,
    client_bvr_number: &str,
    reference: &str,
    reversal: bool,
) -> NormalizedTransaction {
    NormalizedTransaction {
        transaction_code: classify::transaction_code(details.transaction_code.as_deref())
            .to_string(),
        bank_transaction_code: details.bank_transaction_code.clone(),
        is_credit: details.credit_debit_indicator.as_deref() == Some("CRDT"),
        reversal,
        client_bvr_number: client_bvr_number.to_string(),
        bvr_reference_number: reference.to_string(),
        currency: details.currency.clone(),
        amount: details.amount.clone(),
        submission_date: details.submission_date.clone(),
        processing_date: entry.booking_date.clone(),
        accounting_date: entry.value_date.clone(),
        tax_currency: details.charges_currency.clone(),
        tax_amount: details.charges_amount.clone(),
    }
}
