//! Amount formatting.

use serde_json::Value;

use crate::error::{PanelError, PanelResult};

/// Nanotons per TON.
pub const NANOTONS_PER_TON: u128 = 1_000_000_000;

/// Exact decimal TON amount with trailing zeros trimmed (`1500000000` -> `1.5`).
pub fn format_nanotons(nanotons: u128) -> String {
    let whole = nanotons / NANOTONS_PER_TON;
    let frac = nanotons % NANOTONS_PER_TON;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:09}", frac);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// Parse a decimal TON amount (`"0.001"`) into nanotons.
pub fn parse_ton(text: &str) -> Option<u128> {
    let text = text.trim();
    let (whole, frac) = text.split_once('.').unwrap_or((text, ""));
    if (whole.is_empty() && frac.is_empty()) || frac.len() > 9 {
        return None;
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let frac: u128 = if frac.is_empty() {
        0
    } else {
        format!("{:0<9}", frac).parse().ok()?
    };
    whole.checked_mul(NANOTONS_PER_TON)?.checked_add(frac)
}

/// Read the nanoton balance out of a backend `{"result": ...}` body.
pub fn balance_from_response(body: &str) -> PanelResult<u128> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| PanelError::InvalidResponse(format!("not JSON: {}", e)))?;
    match value.get("result") {
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map_err(|_| PanelError::InvalidResponse(format!("cannot convert {} to an integer", s))),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(u128::from)
            .ok_or_else(|| PanelError::InvalidResponse(format!("cannot convert {} to an integer", n))),
        Some(other) => Err(PanelError::InvalidResponse(format!(
            "cannot convert {} to an integer",
            other
        ))),
        None => Err(PanelError::InvalidResponse("missing result".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_nanotons() {
        assert_eq!(format_nanotons(0), "0");
        assert_eq!(format_nanotons(1_500_000_000), "1.5");
        assert_eq!(format_nanotons(1_000_000), "0.001");
        assert_eq!(format_nanotons(1), "0.000000001");
        assert_eq!(format_nanotons(42 * NANOTONS_PER_TON), "42");
    }

    #[test]
    fn test_parse_ton() {
        assert_eq!(parse_ton("0.001"), Some(1_000_000));
        assert_eq!(parse_ton("1"), Some(NANOTONS_PER_TON));
        assert_eq!(parse_ton(".5"), Some(500_000_000));
        assert_eq!(parse_ton("1.0000000001"), None);
        assert_eq!(parse_ton("-1"), None);
        assert_eq!(parse_ton(""), None);
        assert_eq!(parse_ton("."), None);
    }

    #[test]
    fn test_balance_from_response() {
        assert_eq!(balance_from_response(r#"{"result":"1500000000"}"#).unwrap(), 1_500_000_000);
        assert_eq!(balance_from_response(r#"{"result":0}"#).unwrap(), 0);
        assert!(balance_from_response(r#"{"result":"abc"}"#).is_err());
        assert!(balance_from_response(r#"{"error":"x"}"#).is_err());
        assert!(balance_from_response("<html>").is_err());
    }
}
