//! Futures symbol ↔ delivery month.
//!
//! Exchange symbols follow `<ROOT><MONTH CODE><YY>`, e.g. `ZQZ25` for the
//! December 2025 30-day Fed Funds contract.

use crate::domain::YearMonth;

const MONTH_CODES: [char; 12] = ['F', 'G', 'H', 'J', 'K', 'M', 'N', 'Q', 'U', 'V', 'X', 'Z'];

/// Decode a symbol to its delivery month.
///
/// When `root` is non-empty the symbol must start with it (case-insensitive).
/// With an empty root any alphabetic prefix is accepted. Two-digit years map
/// to `20yy`. Returns `None` for anything else.
pub fn symbol_to_month(symbol: &str, root: &str) -> Option<YearMonth> {
    let s = symbol.trim().to_ascii_uppercase();
    let root = root.trim().to_ascii_uppercase();
    if !s.is_ascii() {
        return None;
    }

    let tail = if root.is_empty() {
        let split = s.len().checked_sub(3)?;
        let (prefix, tail) = s.split_at(split);
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        tail
    } else {
        s.strip_prefix(root.as_str())?
    };

    let mut chars = tail.chars();
    let code = chars.next()?;
    let yy = chars.as_str();
    if yy.len() != 2 || !yy.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let month = MONTH_CODES.iter().position(|&c| c == code)? as u32 + 1;
    let year = 2000 + yy.parse::<i32>().ok()?;
    YearMonth::new(year, month)
}

/// Encode a delivery month as `<ROOT><CODE><YY>`.
pub fn month_to_symbol(month: YearMonth, root: &str) -> String {
    let code = MONTH_CODES[(month.month() - 1) as usize];
    format!("{}{}{:02}", root.trim().to_ascii_uppercase(), code, month.year().rem_euclid(100))
}
