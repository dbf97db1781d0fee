//! V11 fixed-width record generation.
//!
//! Renders normalized transactions into the Swiss V11 payment-reconciliation
//! format, either the legacy type-3 layout (100 columns) or the current
//! type-4 layout (200 columns). Transactions are grouped by client BVR
//! number and sign; each group is followed by exactly one total record.

use crate::camt_format::CamtDocument;
use crate::classify;
use crate::error::Result;
use crate::extract::extract_transactions;
use crate::fields::{
    format_date_v3, format_date_v4, pad_decimal_without_dot, pad_left_zeroes, pad_right_spaces,
    pad_without_dot,
};
use crate::types::{ExtractedRecord, NormalizedTransaction, RecordError};
use crate::V11Version;
use rust_decimal::Decimal;
use std::io::Write;
use std::str::FromStr;

/// Result of one V11 generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct V11Output {
    /// Concatenated record lines, one total record per group.
    pub content: String,

    /// Record-level faults collected during extraction and encoding.
    pub errors: Vec<RecordError>,
}

impl V11Output {
    /// Write the generated content to any destination implementing `Write`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use camt_v11::camt_format::CamtDocument;
    /// use camt_v11::{v11_format, V11Version};
    ///
    /// let mut input = File::open("statement.xml")?;
    /// let document = CamtDocument::from_read(&mut input)?;
    ///
    /// let output = v11_format::generate(&document, V11Version::V4, "\r\n");
    /// let mut file = File::create("statement.v11")?;
    /// output.write_to(&mut file)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.content.as_bytes())?;
        Ok(())
    }
}

struct Group {
    client_bvr_number: String,
    positive: bool,
    members: Vec<NormalizedTransaction>,
}

/// Generate a V11 file from a parsed camt document.
///
/// A document without a statement level produces empty content. Record-level
/// faults never abort the batch; they are collected in the output's error
/// list while the remaining records are still generated.
pub fn generate(document: &CamtDocument, version: V11Version, separator: &str) -> V11Output {
    let statement = match &document.statement {
        Some(statement) => statement,
        None => return V11Output::default(),
    };

    let mut errors = Vec::new();
    let mut groups: Vec<Group> = Vec::new();

    for record in extract_transactions(statement) {
        match record {
            ExtractedRecord::Transaction(tx) => {
                let type_code =
                    classify::type_code_v4(&tx.transaction_code, tx.reversal, tx.is_credit);
                let positive = classify::is_positive(type_code);

                // Grouping is stable: first-encounter order of the
                // (BVR number, sign) key, original order within a group.
                match groups
                    .iter_mut()
                    .find(|g| g.client_bvr_number == tx.client_bvr_number && g.positive == positive)
                {
                    Some(group) => group.members.push(tx),
                    None => groups.push(Group {
                        client_bvr_number: tx.client_bvr_number.clone(),
                        positive,
                        members: vec![tx],
                    }),
                }
            }
            ExtractedRecord::Error(error) => errors.push(error),
        }
    }

    let mut rendered = Vec::with_capacity(groups.len());
    for group in &groups {
        let mut lines = Vec::with_capacity(group.members.len());
        for tx in &group.members {
            match encode_transaction(tx, version) {
                Ok(line) => lines.push(line),
                Err(error) => {
                    tracing::warn!("failed to encode transaction: {}", error);
                    errors.push(RecordError::Unknown);
                }
            }
        }

        match encode_total(&group.members, version) {
            Ok(total) => rendered.push(format!("{}{}{}", lines.join(separator), separator, total)),
            Err(error) => {
                tracing::warn!("failed to encode total record: {}", error);
                errors.push(RecordError::Unknown);
                if !lines.is_empty() {
                    rendered.push(lines.join(separator));
                }
            }
        }
    }

    V11Output {
        content: rendered.join(separator),
        errors,
    }
}

/// Render one transaction as a fixed-width V11 line.
pub fn encode_transaction(tx: &NormalizedTransaction, version: V11Version) -> Result<String> {
    match version {
        V11Version::V3 => encode_transaction_v3(tx),
        V11Version::V4 => encode_transaction_v4(tx),
    }
}

fn encode_transaction_v4(tx: &NormalizedTransaction) -> Result<String> {
    let type_code = classify::type_code_v4(&tx.transaction_code, tx.reversal, tx.is_credit);

    let mut line = String::with_capacity(200);
    line.push_str(&tx.transaction_code);
    line.push(type_code);
    line.push_str(classify::origin_code(tx.bank_transaction_code.as_deref()));
    line.push('1');
    line.push_str(&pad_left_zeroes(Some(&tx.client_bvr_number), 9)?);
    line.push_str(&pad_left_zeroes(Some(&tx.bvr_reference_number), 27)?);
    line.push_str(&pad_right_spaces(tx.currency.as_deref(), 3)?);
    line.push_str("00");
    line.push_str(&pad_without_dot(tx.amount.as_deref(), 10)?);
    line.push_str(&pad_right_spaces(None, 35)?);
    line.push_str(&format_date_v4(tx.submission_date.as_deref()));
    line.push_str(&format_date_v4(tx.processing_date.as_deref()));
    line.push_str(&format_date_v4(tx.accounting_date.as_deref()));
    line.push('0');
    line.push_str(&pad_right_spaces(
        tx.tax_currency.as_deref().or(tx.currency.as_deref()),
        3,
    )?);
    line.push_str("00");
    line.push_str(&pad_without_dot(tx.tax_amount.as_deref(), 4)?);
    line.push_str(&pad_right_spaces(None, 74)?);
    Ok(line)
}

fn encode_transaction_v3(tx: &NormalizedTransaction) -> Result<String> {
    let type_code = classify::type_code_v4(&tx.transaction_code, tx.reversal, tx.is_credit);
    let origin = classify::origin_code(tx.bank_transaction_code.as_deref());

    let mut line = String::with_capacity(100);
    line.push_str(&classify::type_code_v3(type_code, origin));
    line.push_str(&pad_left_zeroes(Some(&tx.client_bvr_number), 9)?);
    line.push_str(&pad_left_zeroes(Some(&tx.bvr_reference_number), 27)?);
    line.push_str(&pad_without_dot(tx.amount.as_deref(), 10)?);
    // Deposit reference placeholder.
    line.push_str("0000  0000");
    line.push_str(&format_date_v3(tx.submission_date.as_deref()));
    line.push_str(&format_date_v3(tx.processing_date.as_deref()));
    line.push_str(&format_date_v3(tx.accounting_date.as_deref()));
    // Microfilm number.
    line.push_str(&pad_left_zeroes(None, 9)?);
    // Rejection code.
    line.push('0');
    line.push_str(&pad_left_zeroes(None, 9)?);
    line.push_str(&pad_without_dot(tx.tax_amount.as_deref(), 4)?);
    Ok(line)
}

/// Render the total record closing a group, computed over all its members.
pub fn encode_total(members: &[NormalizedTransaction], version: V11Version) -> Result<String> {
    match version {
        V11Version::V3 => encode_total_v3(members),
        V11Version::V4 => encode_total_v4(members),
    }
}

fn encode_total_v4(members: &[NormalizedTransaction]) -> Result<String> {
    let lead = match members.first() {
        Some(lead) => lead,
        None => return Ok(String::new()),
    };

    let currency = lead.currency.as_deref();
    let type_code = classify::type_code_v4(&lead.transaction_code, lead.reversal, lead.is_credit);

    let mut line = String::with_capacity(200);
    line.push_str(if currency == Some("CHF") { "99" } else { "98" });
    line.push(if type_code == '2' { '2' } else { '1' });
    line.push_str("99");
    line.push('1');
    line.push_str(&pad_left_zeroes(Some(&lead.client_bvr_number), 9)?);
    // Sort key placeholder.
    line.push_str(&"9".repeat(27));
    line.push_str(&pad_right_spaces(currency, 3)?);
    line.push_str(&pad_decimal_without_dot(amount_total(members), 12)?);
    line.push_str(&pad_left_zeroes(Some(&members.len().to_string()), 12)?);
    line.push_str(&format_date_v4(lead.submission_date.as_deref()));
    line.push_str(&pad_right_spaces(
        lead.tax_currency.as_deref().or(currency),
        3,
    )?);
    line.push_str(&pad_decimal_without_dot(tax_total(members), 11)?);
    line.push_str(&pad_right_spaces(None, 109)?);
    Ok(line)
}

fn encode_total_v3(members: &[NormalizedTransaction]) -> Result<String> {
    let lead = match members.first() {
        Some(lead) => lead,
        None => return Ok(String::new()),
    };

    let type_code = classify::type_code_v4(&lead.transaction_code, lead.reversal, lead.is_credit);
    let origin = classify::origin_code(lead.bank_transaction_code.as_deref());
    let lead_code = classify::type_code_v3(type_code, origin);

    let mut line = String::with_capacity(100);
    line.push_str(if lead_code.ends_with('2') || lead_code.ends_with('8') {
        "999"
    } else {
        "995"
    });
    line.push_str(&pad_left_zeroes(Some(&lead.client_bvr_number), 9)?);
    line.push_str(&"9".repeat(27));
    line.push_str(&pad_decimal_without_dot(amount_total(members), 12)?);
    line.push_str(&pad_left_zeroes(Some(&members.len().to_string()), 12)?);
    line.push_str(&format_date_v3(lead.submission_date.as_deref()));
    line.push_str(&pad_decimal_without_dot(tax_total(members), 9)?);
    line.push_str(&pad_left_zeroes(None, 9)?);
    line.push_str(&pad_right_spaces(None, 13)?);
    Ok(line)
}

/// Sum of the parseable member amounts; absent or malformed amounts
/// contribute zero, matching the zero-filled line fields.
fn amount_total(members: &[NormalizedTransaction]) -> Decimal {
    members
        .iter()
        .filter_map(|tx| tx.amount.as_deref())
        .filter_map(|raw| Decimal::from_str(raw.trim()).ok())
        .sum()
}

fn tax_total(members: &[NormalizedTransaction]) -> Decimal {
    members
        .iter()
        .filter_map(|tx| tx.tax_amount.as_deref())
        .filter_map(|raw| Decimal::from_str(raw.trim()).ok())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn transaction(bvr_number: &str, amount: &str) -> NormalizedTransaction {
        NormalizedTransaction {
            transaction_code: "01".into(),
            bank_transaction_code: Some("AUTT".into()),
            is_credit: true,
            reversal: false,
            client_bvr_number: bvr_number.into(),
            bvr_reference_number: "000000000000000000000000001".into(),
            currency: Some("CHF".into()),
            amount: Some(amount.into()),
            submission_date: Some("2016-05-06T23:01:15".into()),
            processing_date: Some("2016-05-06".into()),
            accounting_date: Some("2016-05-07".into()),
            tax_currency: None,
            tax_amount: None,
        }
    }

    fn document(transactions: Vec<NormalizedTransaction>) -> CamtDocument {
        use crate::types::{Entry, EntryDetailGroup, References, Statement, TransactionDetail};

        let entries = transactions
            .into_iter()
            .map(|tx| Entry {
                booking_date: tx.processing_date.clone(),
                value_date: tx.accounting_date.clone(),
                client_bvr_number: Some(tx.client_bvr_number.clone()),
                reversal_indicator: None,
                detail_groups: vec![EntryDetailGroup {
                    transactions: vec![TransactionDetail {
                        refs: Some(References::default()),
                        transaction_code: Some("01".into()),
                        bank_transaction_code: tx.bank_transaction_code.clone(),
                        credit_debit_indicator: Some("CRDT".into()),
                        bvr_reference: Some(tx.bvr_reference_number.clone()),
                        currency: tx.currency.clone(),
                        amount: tx.amount.clone(),
                        submission_date: tx.submission_date.clone(),
                        charges_currency: tx.tax_currency.clone(),
                        charges_amount: tx.tax_amount.clone(),
                    }],
                }],
            })
            .collect();

        CamtDocument {
            statement: Some(Statement { entries }),
        }
    }

    #[test]
    fn test_type4_line_layout() {
        let line = encode_transaction(&transaction("123456789", "42.50"), V11Version::V4).unwrap();

        assert_eq!(line.len(), 200);
        assert_eq!(&line[0..2], "01"); // transaction code
        assert_eq!(&line[2..3], "1"); // type digit
        assert_eq!(&line[3..5], "03"); // origin
        assert_eq!(&line[5..6], "1");
        assert_eq!(&line[6..15], "123456789");
        assert_eq!(&line[15..42], "000000000000000000000000001");
        assert_eq!(&line[42..45], "CHF");
        assert_eq!(&line[45..47], "00");
        assert_eq!(&line[47..57], "0000004250");
        assert_eq!(&line[57..92], " ".repeat(35));
        assert_eq!(&line[92..100], "20160506"); // submission
        assert_eq!(&line[100..108], "20160506"); // processing
        assert_eq!(&line[108..116], "20160507"); // accounting
        assert_eq!(&line[116..117], "0");
        assert_eq!(&line[117..120], "CHF"); // tax currency falls back
        assert_eq!(&line[120..122], "00");
        assert_eq!(&line[122..126], "0000");
        assert_eq!(&line[126..200], " ".repeat(74));
    }

    #[test]
    fn test_type3_line_layout() {
        let line = encode_transaction(&transaction("123456789", "42.50"), V11Version::V3).unwrap();

        assert_eq!(line.len(), 100);
        assert_eq!(&line[0..3], "102"); // origin AUTT, normal booking
        assert_eq!(&line[3..12], "123456789");
        assert_eq!(&line[12..39], "000000000000000000000000001");
        assert_eq!(&line[39..49], "0000004250");
        assert_eq!(&line[49..59], "0000  0000");
        assert_eq!(&line[59..65], "160506");
        assert_eq!(&line[65..71], "160506");
        assert_eq!(&line[71..77], "160507");
        assert_eq!(&line[77..86], "000000000");
        assert_eq!(&line[86..87], "0");
        assert_eq!(&line[87..96], "000000000");
        assert_eq!(&line[96..100], "0000");
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let tx = transaction("123456789", "42.50");
        assert_eq!(
            encode_transaction(&tx, V11Version::V4).unwrap(),
            encode_transaction(&tx, V11Version::V4).unwrap()
        );
    }

    #[test]
    fn test_overflowing_bvr_number_fails() {
        let tx = transaction("1234567890", "42.50");
        assert!(encode_transaction(&tx, V11Version::V4).is_err());
    }

    #[test]
    fn test_total_v4_layout() {
        let members = vec![
            transaction("123456789", "10.00"),
            transaction("123456789", "20.00"),
        ];
        let total = encode_total(&members, V11Version::V4).unwrap();

        assert_eq!(total.len(), 200);
        assert_eq!(&total[0..2], "99"); // CHF
        assert_eq!(&total[2..3], "1");
        assert_eq!(&total[3..5], "99");
        assert_eq!(&total[5..6], "1");
        assert_eq!(&total[6..15], "123456789");
        assert_eq!(&total[15..42], "9".repeat(27));
        assert_eq!(&total[42..45], "CHF");
        assert_eq!(&total[45..57], "000000003000"); // 30.00
        assert_eq!(&total[57..69], "000000000002");
        assert_eq!(&total[69..77], "20160506");
        assert_eq!(&total[77..80], "CHF");
        assert_eq!(&total[80..91], "00000000000");
        assert_eq!(&total[91..200], " ".repeat(109));
    }

    #[test]
    fn test_total_v4_non_chf_code() {
        let mut tx = transaction("123456789", "10.00");
        tx.currency = Some("EUR".into());
        let total = encode_total(&[tx], V11Version::V4).unwrap();
        assert_eq!(&total[0..2], "98");
    }

    #[test]
    fn test_total_v3_layout() {
        let members = vec![
            transaction("123456789", "10.00"),
            transaction("123456789", "20.00"),
        ];
        let total = encode_total(&members, V11Version::V3).unwrap();

        assert_eq!(total.len(), 100);
        assert_eq!(&total[0..3], "999"); // lead code 102 ends in 2
        assert_eq!(&total[3..12], "123456789");
        assert_eq!(&total[12..39], "9".repeat(27));
        assert_eq!(&total[39..51], "000000003000");
        assert_eq!(&total[51..63], "000000000002");
        assert_eq!(&total[63..69], "160506");
        assert_eq!(&total[69..78], "000000000");
        assert_eq!(&total[78..87], "000000000");
        assert_eq!(&total[87..100], " ".repeat(13));
    }

    #[test]
    fn test_grouping_by_bvr_number() {
        let document = document(vec![
            transaction("111111111", "10.00"),
            transaction("222222222", "5.00"),
            transaction("111111111", "20.00"),
        ]);

        let output = generate(&document, V11Version::V4, "\n");
        assert!(output.errors.is_empty());

        let lines: Vec<&str> = output.content.split('\n').collect();
        assert_eq!(lines.len(), 5);

        // Group "111111111" keeps both lines in original order before its
        // own total; group order is first-encounter order.
        assert_eq!(&lines[0][6..15], "111111111");
        assert_eq!(&lines[1][6..15], "111111111");
        assert_eq!(&lines[2][0..2], "99");
        assert_eq!(&lines[2][45..57], "000000003000");
        assert_eq!(&lines[2][57..69], "000000000002");
        assert_eq!(&lines[3][6..15], "222222222");
        assert_eq!(&lines[4][0..2], "99");
        assert_eq!(&lines[4][45..57], "000000000500");
        assert_eq!(&lines[4][57..69], "000000000001");
    }

    #[test]
    fn test_faulty_detail_leaves_content_untouched() {
        let mut with_fault = document(vec![
            transaction("111111111", "10.00"),
            transaction("111111111", "20.00"),
        ]);
        // Second entry's detail loses its references block.
        with_fault.statement.as_mut().unwrap().entries[1].detail_groups[0].transactions[0].refs =
            None;

        let clean = document(vec![transaction("111111111", "10.00")]);

        let with_fault = generate(&with_fault, V11Version::V4, "\r\n");
        let clean = generate(&clean, V11Version::V4, "\r\n");

        assert_eq!(with_fault.errors, vec![RecordError::MissingRefs]);
        assert_eq!(with_fault.content, clean.content);
    }

    #[test]
    fn test_missing_statement_level_generates_nothing() {
        let document = CamtDocument { statement: None };
        let output = generate(&document, V11Version::V4, "\r\n");
        assert_eq!(output, V11Output::default());
    }

    #[test]
    fn test_encoding_failure_becomes_unknown_error() {
        // BVR number wider than its 9-digit slot: the line is dropped, the
        // batch completes, and the fault is surfaced as Unknown.
        let document = document(vec![
            transaction("1234567890", "10.00"),
            transaction("222222222", "5.00"),
        ]);

        let output = generate(&document, V11Version::V4, "\n");
        assert_eq!(
            output
                .errors
                .iter()
                .filter(|e| **e == RecordError::Unknown)
                .count(),
            2 // line and total record of the oversized group
        );
        assert!(output.content.contains("222222222"));
    }

    #[test]
    fn test_end_to_end_camt054() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Document xmlns="urn:iso:std:iso:20022:tech:xsd:camt.054.001.04">
  <BkToCstmrDbtCdtNtfctn>
    <Ntfctn>
      <Ntry>
        <NtryRef>123456789</NtryRef>
        <BookgDt><Dt>2016-05-06</Dt></BookgDt>
        <ValDt><Dt>2016-05-07</Dt></ValDt>
        <NtryDtls>
          <TxDtls>
            <Refs><AcctSvcrRef>SVCR-1</AcctSvcrRef></Refs>
            <Amt Ccy="CHF">42.50</Amt>
            <CdtDbtInd>CRDT</CdtDbtInd>
            <BkTxCd>
              <Domn><Cd>PMNT</Cd><Fmly><Cd>RCDT</Cd><SubFmlyCd>AUTT</SubFmlyCd></Fmly></Domn>
              <Prtry><Cd>01</Cd></Prtry>
            </BkTxCd>
            <RmtInf><Strd><CdtrRefInf><Ref>000000000000000000000000001</Ref></CdtrRefInf></Strd></RmtInf>
            <RltdDts><AccptncDtTm>2016-05-06T23:01:15</AccptncDtTm></RltdDts>
          </TxDtls>
        </NtryDtls>
      </Ntry>
    </Ntfctn>
  </BkToCstmrDbtCdtNtfctn>
</Document>"#;

        let parsed: CamtDocument = xml.parse().unwrap();
        let output = generate(&parsed, V11Version::V4, "\r\n");

        assert!(output.errors.is_empty());

        let lines: Vec<&str> = output.content.split("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), 200);
        assert_eq!(lines[1].len(), 200);
        assert_eq!(&lines[0][0..6], "011031");
        assert_eq!(&lines[0][6..15], "123456789");
        assert_eq!(&lines[0][47..57], "0000004250");
        assert_eq!(&lines[1][0..6], "991991");
        assert_eq!(&lines[1][45..57], "000000004250");
        assert_eq!(&lines[1][57..69], "000000000001");
    }
}
