//! CAMT to V11 Converter Library
//!
//! A library for deriving Swiss V11 payment-reconciliation files from
//! ISO 20022 camt.053 account statements and camt.054 debit/credit
//! notifications.
//!
//! # Pipeline
//!
//! - Parse a camt XML document into a normalized statement tree
//! - Extract and classify the embedded payment/reference records
//! - Encode each record as a fixed-width V11 line (type-3 or type-4 layout)
//! - Close every (BVR number, sign) group with a total record
//!
//! Record-level faults (missing references, missing BVR number, encoding
//! failures) are collected and surfaced next to the generated content; one
//! bad record never aborts a batch.
//!
//! # Examples
//!
//! ```no_run
//! use std::fs::File;
//! use camt_v11::camt_format::CamtDocument;
//! use camt_v11::{v11_format, V11Version};
//!
//! let mut file = File::open("statement.xml")?;
//! let document = CamtDocument::from_read(&mut file)?;
//!
//! let output = v11_format::generate(&document, V11Version::V4, "\r\n");
//! println!("{}", output.content);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod camt_format;
pub mod classify;
pub mod error;
pub mod extract;
pub mod fields;
pub mod types;
pub mod v11_format;

use std::str::FromStr;

// Re-export commonly used types
pub use camt_format::CamtDocument;
pub use error::{Error, Result};
pub use types::{ExtractedRecord, NormalizedTransaction, RecordError, Statement};
pub use v11_format::{generate, V11Output};

/// V11 field-layout versions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum V11Version {
    /// Legacy type-3 layout (100 columns).
    V3,

    /// Current type-4 layout (200 columns).
    #[default]
    V4,
}

impl FromStr for V11Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "3" | "3-100" | "3-128" => Ok(V11Version::V3),
            "4" => Ok(V11Version::V4),
            _ => Err(Error::InvalidVersion(s.to_string())),
        }
    }
}

impl V11Version {
    /// Get file extension for generated output.
    pub fn extension(&self) -> &'static str {
        "v11"
    }
}
