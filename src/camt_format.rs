//! CAMT.053/054 (ISO 20022) XML adapter.
//!
//! Parses bank-to-customer statements (camt.053) and debit/credit
//! notifications (camt.054) into the normalized model consumed by the V11
//! pipeline. Only the subtree needed for V11 generation is read; the
//! ISO "array of one" convention is unwrapped here so the rest of the crate
//! sees at most one value per field.

use crate::error::{Error, Result};
use crate::types::{Entry, EntryDetailGroup, References, Statement, TransactionDetail};
use serde::Deserialize;
use std::io::Read;
use std::str::FromStr;

/// Namespace versions this adapter recognizes.
const KNOWN_NAMESPACES: [&str; 4] = [
    "urn:iso:std:iso:20022:tech:xsd:camt.053.001.02",
    "urn:iso:std:iso:20022:tech:xsd:camt.053.001.04",
    "urn:iso:std:iso:20022:tech:xsd:camt.054.001.02",
    "urn:iso:std:iso:20022:tech:xsd:camt.054.001.04",
];

/// A parsed camt document, reduced to the single statement or notification
/// level the V11 pipeline reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CamtDocument {
    /// The statement/notification level, when the document carries one.
    pub statement: Option<Statement>,
}

impl CamtDocument {
    /// Parse a camt.053/054 document from any source implementing `Read`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use camt_v11::camt_format::CamtDocument;
    ///
    /// let mut file = File::open("statement.xml")?;
    /// let document = CamtDocument::from_read(&mut file)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R) -> Result<Self> {
        let mut xml_content = String::new();
        reader.read_to_string(&mut xml_content)?;

        xml_content.parse()
    }
}

impl FromStr for CamtDocument {
    type Err = Error;

    fn from_str(xml: &str) -> Result<Self> {
        let document: DocumentXml = serde_xml_rs::from_str(xml)?;
        from_document(document)
    }
}

fn from_document(document: DocumentXml) -> Result<CamtDocument> {
    match document.namespace() {
        Some(ns) if KNOWN_NAMESPACES.contains(&ns.as_str()) => {}
        Some(ns) => return Err(Error::UnrecognizedFormat(ns)),
        None => return Err(Error::UnrecognizedFormat("missing xmlns".to_string())),
    }

    let level = document.bk_to_cstmr_stmt.or(document.bk_to_cstmr_ntfctn);
    let statement = match level {
        // camt.053 carries Stmt children, camt.054 carries Ntfctn; either
        // way only the first one is the statement level.
        Some(level) => level.stmt.into_iter().chain(level.ntfctn).next(),
        None => None,
    };

    Ok(CamtDocument {
        statement: statement.map(to_statement),
    })
}

fn to_statement(statement: StatementXml) -> Statement {
    Statement {
        entries: statement.ntry.into_iter().map(to_entry).collect(),
    }
}

fn to_entry(entry: EntryXml) -> Entry {
    Entry {
        booking_date: entry.bookg_dt.as_ref().and_then(DateXml::value),
        value_date: entry.val_dt.as_ref().and_then(DateXml::value),
        client_bvr_number: entry.ntry_ref,
        reversal_indicator: entry.rvsl_ind,
        detail_groups: entry.ntry_dtls.into_iter().map(to_detail_group).collect(),
    }
}

fn to_detail_group(details: EntryDetailsXml) -> EntryDetailGroup {
    EntryDetailGroup {
        transactions: details
            .tx_dtls
            .into_iter()
            .map(to_transaction_detail)
            .collect(),
    }
}

fn to_transaction_detail(details: TransactionDetailsXml) -> TransactionDetail {
    let (amount, currency) = split_amount(details.amt);
    let (charges_amount, charges_currency) =
        split_amount(details.chrgs.and_then(|c| c.ttl_chrgs_and_tax_amt));

    TransactionDetail {
        refs: details.refs.map(|refs| References {
            account_servicer_reference: refs.acct_svcr_ref,
            end_to_end_id: refs.end_to_end_id,
        }),
        transaction_code: details
            .bk_tx_cd
            .as_ref()
            .and_then(|code| code.prtry.as_ref())
            .and_then(|prtry| prtry.cd.clone()),
        bank_transaction_code: details
            .bk_tx_cd
            .as_ref()
            .and_then(|code| code.domn.as_ref())
            .and_then(|domain| domain.fmly.as_ref())
            .and_then(|family| family.sub_fmly_cd.clone()),
        credit_debit_indicator: details.cdt_dbt_ind,
        bvr_reference: details
            .rmt_inf
            .and_then(|rmt| rmt.strd.into_iter().next())
            .and_then(|strd| strd.cdtr_ref_inf)
            .and_then(|cdtr| cdtr.ref_val),
        currency,
        amount,
        submission_date: details.rltd_dts.and_then(|dates| dates.accptnc_dt_tm),
        charges_currency,
        charges_amount,
    }
}

fn split_amount(amount: Option<AmountXml>) -> (Option<String>, Option<String>) {
    match amount {
        Some(amount) => {
            let ccy = amount.ccy();
            (Some(amount.value), ccy)
        }
        None => (None, None),
    }
}

// XML structure definitions
#[derive(Debug, Deserialize)]
#[serde(rename = "Document")]
struct DocumentXml {
    #[serde(rename = "@xmlns")]
    xmlns: Option<String>,
    #[serde(rename = "xmlns")]
    xmlns_alt: Option<String>,
    #[serde(rename = "BkToCstmrStmt")]
    bk_to_cstmr_stmt: Option<BankToCustomerXml>,
    #[serde(rename = "BkToCstmrDbtCdtNtfctn")]
    bk_to_cstmr_ntfctn: Option<BankToCustomerXml>,
}

impl DocumentXml {
    fn namespace(&self) -> Option<String> {
        self.xmlns.clone().or_else(|| self.xmlns_alt.clone())
    }
}

#[derive(Debug, Deserialize)]
struct BankToCustomerXml {
    #[serde(rename = "Stmt", default)]
    stmt: Vec<StatementXml>,
    #[serde(rename = "Ntfctn", default)]
    ntfctn: Vec<StatementXml>,
}

#[derive(Debug, Deserialize)]
struct StatementXml {
    #[serde(rename = "Ntry", default)]
    ntry: Vec<EntryXml>,
}

#[derive(Debug, Deserialize)]
struct EntryXml {
    #[serde(rename = "NtryRef")]
    ntry_ref: Option<String>,
    #[serde(rename = "RvslInd")]
    rvsl_ind: Option<String>,
    #[serde(rename = "BookgDt")]
    bookg_dt: Option<DateXml>,
    #[serde(rename = "ValDt")]
    val_dt: Option<DateXml>,
    #[serde(rename = "NtryDtls", default)]
    ntry_dtls: Vec<EntryDetailsXml>,
}

#[derive(Debug, Deserialize)]
struct DateXml {
    #[serde(rename = "Dt")]
    dt: Option<String>,
    #[serde(rename = "DtTm")]
    dt_tm: Option<String>,
}

impl DateXml {
    fn value(&self) -> Option<String> {
        self.dt.clone().or_else(|| self.dt_tm.clone())
    }
}

#[derive(Debug, Deserialize)]
struct EntryDetailsXml {
    #[serde(rename = "TxDtls", default)]
    tx_dtls: Vec<TransactionDetailsXml>,
}

#[derive(Debug, Deserialize)]
struct TransactionDetailsXml {
    #[serde(rename = "Refs")]
    refs: Option<ReferencesXml>,
    #[serde(rename = "BkTxCd")]
    bk_tx_cd: Option<BankTransactionCodeXml>,
    #[serde(rename = "CdtDbtInd")]
    cdt_dbt_ind: Option<String>,
    #[serde(rename = "Amt")]
    amt: Option<AmountXml>,
    #[serde(rename = "RmtInf")]
    rmt_inf: Option<RemittanceInformationXml>,
    #[serde(rename = "RltdDts")]
    rltd_dts: Option<RelatedDatesXml>,
    #[serde(rename = "Chrgs")]
    chrgs: Option<ChargesXml>,
}

#[derive(Debug, Deserialize)]
struct ReferencesXml {
    #[serde(rename = "AcctSvcrRef")]
    acct_svcr_ref: Option<String>,
    #[serde(rename = "EndToEndId")]
    end_to_end_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BankTransactionCodeXml {
    #[serde(rename = "Domn")]
    domn: Option<DomainXml>,
    #[serde(rename = "Prtry")]
    prtry: Option<ProprietaryCodeXml>,
}

#[derive(Debug, Deserialize)]
struct DomainXml {
    #[serde(rename = "Fmly")]
    fmly: Option<FamilyXml>,
}

#[derive(Debug, Deserialize)]
struct FamilyXml {
    #[serde(rename = "SubFmlyCd")]
    sub_fmly_cd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProprietaryCodeXml {
    #[serde(rename = "Cd")]
    cd: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AmountXml {
    #[serde(rename = "$value")]
    value: String,
    #[serde(rename = "@Ccy")]
    ccy: Option<String>,
    #[serde(rename = "Ccy")]
    ccy_alt: Option<String>,
}

impl AmountXml {
    fn ccy(&self) -> Option<String> {
        self.ccy.clone().or_else(|| self.ccy_alt.clone())
    }
}

#[derive(Debug, Deserialize)]
struct RemittanceInformationXml {
    #[serde(rename = "Strd", default)]
    strd: Vec<StructuredRemittanceXml>,
}

#[derive(Debug, Deserialize)]
struct StructuredRemittanceXml {
    #[serde(rename = "CdtrRefInf")]
    cdtr_ref_inf: Option<CreditorReferenceXml>,
}

#[derive(Debug, Deserialize)]
struct CreditorReferenceXml {
    #[serde(rename = "Ref")]
    ref_val: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelatedDatesXml {
    #[serde(rename = "AccptncDtTm")]
    accptnc_dt_tm: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChargesXml {
    #[serde(rename = "TtlChrgsAndTaxAmt")]
    ttl_chrgs_and_tax_amt: Option<AmountXml>,
}
