use crate::core::JqError;

use super::Security;

/// Exchange suffixes the service uses, with their common aliases.
const SUFFIX_ALIASES: &[(&str, &str)] = &[
    ("XSHG", "XSHG"),
    ("SH", "XSHG"),
    ("SS", "XSHG"),
    ("SHA", "XSHG"),
    ("XSHE", "XSHE"),
    ("SZ", "XSHE"),
    ("SZA", "XSHE"),
    ("CCFX", "CCFX"),
    ("XSGE", "XSGE"),
    ("XDCE", "XDCE"),
    ("XZCE", "XZCE"),
    ("XINE", "XINE"),
    ("GFEX", "GFEX"),
    ("OF", "OF"),
];

fn exchange_for_digits(digits: &str) -> Option<&'static str> {
    match digits.as_bytes().first()? {
        b'0' | b'1' | b'2' | b'3' => Some("XSHE"),
        b'5' | b'6' | b'9' => Some("XSHG"),
        _ => None,
    }
}

fn is_six_digits(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_digit())
}

/// Normalize a security code to the service's `<code>.<exchange>` form.
///
/// Accepts bare six-digit stock/fund codes (`000001` → `000001.XSHE`, `600000` →
/// `600000.XSHG`), alias suffixes (`600000.SH`, `000001.sz`), and prefixed forms
/// (`sh600000`, `SZ000001`). Codes already carrying a known suffix are returned with the
/// suffix upper-cased.
///
/// # Errors
/// Returns `JqError::InvalidParams` when the exchange cannot be determined.
pub fn normalize_code(code: &str) -> Result<String, JqError> {
    let code = code.trim();
    let invalid = || JqError::InvalidParams(format!("cannot normalize security code '{code}'"));

    if let Some((base, suffix)) = code.rsplit_once('.') {
        let suffix = suffix.to_ascii_uppercase();
        let exchange = SUFFIX_ALIASES
            .iter()
            .find(|(alias, _)| *alias == suffix)
            .map(|(_, ex)| *ex)
            .ok_or_else(invalid)?;
        if base.is_empty() {
            return Err(invalid());
        }
        return Ok(format!("{base}.{exchange}"));
    }

    if code.len() == 8 && code.is_char_boundary(2) {
        let (prefix, digits) = code.split_at(2);
        if is_six_digits(digits) {
            let exchange = match prefix.to_ascii_lowercase().as_str() {
                "sh" => "XSHG",
                "sz" => "XSHE",
                _ => return Err(invalid()),
            };
            return Ok(format!("{digits}.{exchange}"));
        }
    }

    if is_six_digits(code) {
        let exchange = exchange_for_digits(code).ok_or_else(invalid)?;
        return Ok(format!("{code}.{exchange}"));
    }

    Err(invalid())
}

/// Anything that names one or more securities.
pub trait IntoCodes {
    /// The codes, in order, with surrounding whitespace and empty entries removed.
    fn into_codes(self) -> Vec<String>;
}

fn clean<'a>(it: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    it.into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl IntoCodes for &str {
    fn into_codes(self) -> Vec<String> {
        clean(self.split(','))
    }
}

impl IntoCodes for String {
    fn into_codes(self) -> Vec<String> {
        self.as_str().into_codes()
    }
}

impl IntoCodes for &String {
    fn into_codes(self) -> Vec<String> {
        self.as_str().into_codes()
    }
}

impl IntoCodes for &[&str] {
    fn into_codes(self) -> Vec<String> {
        clean(self.iter().copied())
    }
}

impl<const N: usize> IntoCodes for [&str; N] {
    fn into_codes(self) -> Vec<String> {
        clean(self)
    }
}

impl IntoCodes for Vec<&str> {
    fn into_codes(self) -> Vec<String> {
        clean(self)
    }
}

impl IntoCodes for &[String] {
    fn into_codes(self) -> Vec<String> {
        clean(self.iter().map(String::as_str))
    }
}

impl IntoCodes for Vec<String> {
    fn into_codes(self) -> Vec<String> {
        self.as_slice().into_codes()
    }
}

impl IntoCodes for &Security {
    fn into_codes(self) -> Vec<String> {
        vec![self.code.clone()]
    }
}

impl IntoCodes for &[Security] {
    fn into_codes(self) -> Vec<String> {
        self.iter().map(|s| s.code.clone()).collect()
    }
}

/// Collect codes and reject an empty selection.
pub(crate) fn require_codes(codes: impl IntoCodes, what: &str) -> Result<Vec<String>, JqError> {
    let codes = codes.into_codes();
    if codes.is_empty() {
        return Err(JqError::InvalidParams(format!("{what} is required")));
    }
    Ok(codes)
}
