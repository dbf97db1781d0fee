//! Mappings from raw ISO codes to V11 code digits.
//!
//! All classifiers are pure lookups; unknown inputs fall back to the
//! default code instead of failing.

/// Map a raw proprietary transaction code to its 2-digit V11 code.
///
/// Unknown or absent codes fall back to `"01"`.
pub fn transaction_code(raw: Option<&str>) -> &'static str {
    match raw {
        Some("01") => "01",
        Some("03") => "02",
        Some("04") => "11",
        Some("11") => "03",
        Some("14") => "13",
        Some("21") => "21",
        Some("23") => "23",
        Some("31") => "31",
        Some("06") => "06",
        Some("46") => "46",
        _ => "01",
    }
}

/// Map a bank-transaction sub-family code to the V11 payment origin.
///
/// Unknown or absent sub-families fall back to `"03"`.
pub fn origin_code(sub_family: Option<&str>) -> &'static str {
    match sub_family {
        Some("CDPT") => "01",
        Some("DMCT") => "02",
        Some("AUTT") => "03",
        Some("ATXN") => "04",
        _ => "03",
    }
}

/// Whether a V11 transaction code designates a BVR booking; only the
/// charges codes `06` and `46` fall outside that class.
pub fn is_bvr_code(code: &str) -> bool {
    code != "06" && code != "46"
}

/// Version-4 transaction type digit.
///
/// `'1'` is a normal booking. A reversal becomes a rectification (`'3'`)
/// when the BVR class of the code agrees with the credit flag, otherwise a
/// counter-entry (`'2'`).
pub fn type_code_v4(transaction_code: &str, reversal: bool, is_credit: bool) -> char {
    if !reversal {
        return '1';
    }
    if is_bvr_code(transaction_code) == is_credit {
        '3'
    } else {
        '2'
    }
}

/// Sign of a transaction, keyed on the version-4 type digit. Only used to
/// key grouping; never written to a record.
pub fn is_positive(type_code: char) -> bool {
    type_code != '2'
}

/// Version-3 transaction type code, derived from the version-4 type digit
/// and the payment origin through two translation tables.
pub fn type_code_v3(type_code: char, origin: &str) -> String {
    let leading = match origin {
        "01" => '0',
        "02" => '2',
        "03" => '1',
        "04" => '3',
        _ => '1',
    };
    let trailing = match type_code {
        '1' => '2',
        '2' => '5',
        '3' => '8',
        _ => '2',
    };

    let code = format!("{}0{}", leading, trailing);
    // 105 is reported as 104.
    if code == "105" {
        "104".to_string()
    } else {
        code
    }
}
