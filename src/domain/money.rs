use std::fmt;

/// Amounts are stored as integers in the smallest unit of the wallet currency.
/// For IDR that is the rupiah itself, for EUR/USD it is the cent.
pub type Amount = i64;

/// Number of decimal digits the currency's minor unit carries.
pub fn minor_digits(currency: &str) -> u32 {
    match currency.to_uppercase().as_str() {
        "IDR" | "JPY" | "KRW" | "VND" | "CLP" | "ISK" => 0,
        _ => 2,
    }
}

/// Format an amount with thousands grouping for display.
/// Example: (5000000, "IDR") -> "5,000,000", (123456, "EUR") -> "1,234.56"
pub fn format_amount(amount: Amount, currency: &str) -> String {
    let digits = minor_digits(currency);
    let scale = 10_i64.pow(digits);
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let units = abs / scale as u64;
    let fraction = abs % scale as u64;

    let raw = units.to_string();
    let mut grouped = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if digits == 0 {
        format!("{}{}", sign, grouped)
    } else {
        format!(
            "{}{}.{:0width$}",
            sign,
            grouped,
            fraction,
            width = digits as usize
        )
    }
}

/// Parse a user-entered amount into minor units of `currency`.
/// Grouping commas are accepted; negative amounts are rejected.
/// Example: ("50.5", "EUR") -> 5050, ("5,000,000", "IDR") -> 5000000
pub fn parse_amount(input: &str, currency: &str) -> Result<Amount, ParseAmountError> {
    let cleaned: String = input.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(ParseAmountError::Empty);
    }
    if cleaned.starts_with('-') {
        return Err(ParseAmountError::Negative);
    }

    let digits = minor_digits(currency) as usize;
    let (whole, fraction) = match cleaned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (cleaned.as_str(), ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(ParseAmountError::InvalidFormat);
    }

    if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return Err(ParseAmountError::InvalidFormat);
    }
    if fraction.len() > digits {
        return Err(ParseAmountError::TooPrecise { max_digits: digits });
    }

    let whole: Amount = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ParseAmountError::InvalidFormat)?
    };
    let fraction: Amount = if fraction.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", fraction, width = digits);
        padded.parse().map_err(|_| ParseAmountError::InvalidFormat)?
    };

    whole
        .checked_mul(10_i64.pow(digits as u32))
        .and_then(|w| w.checked_add(fraction))
        .ok_or(ParseAmountError::Overflow)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    Negative,
    InvalidFormat,
    TooPrecise { max_digits: usize },
    Overflow,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount is empty"),
            ParseAmountError::Negative => write!(f, "amount must not be negative"),
            ParseAmountError::InvalidFormat => write!(f, "invalid money format"),
            ParseAmountError::TooPrecise { max_digits } => {
                write!(f, "amount has more than {} decimal digits", max_digits)
            }
            ParseAmountError::Overflow => write!(f, "amount is too large"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(5_000_000, "IDR"), "5,000,000");
        assert_eq!(format_amount(50_000, "idr"), "50,000");
        assert_eq!(format_amount(999, "IDR"), "999");
        assert_eq!(format_amount(0, "IDR"), "0");
        assert_eq!(format_amount(-1_500, "IDR"), "-1,500");
        assert_eq!(format_amount(123_456, "EUR"), "1,234.56");
        assert_eq!(format_amount(5, "USD"), "0.05");
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("5,000,000", "IDR"), Ok(5_000_000));
        assert_eq!(parse_amount("50000", "IDR"), Ok(50_000));
        assert_eq!(parse_amount("50.5", "EUR"), Ok(5050));
        assert_eq!(parse_amount("12.34", "EUR"), Ok(1234));
        assert_eq!(parse_amount(".5", "EUR"), Ok(50));
        assert_eq!(parse_amount("100", "EUR"), Ok(10000));
    }

    #[test]
    fn test_parse_amount_invalid() {
        assert_eq!(parse_amount("", "IDR"), Err(ParseAmountError::Empty));
        assert_eq!(parse_amount("-10", "IDR"), Err(ParseAmountError::Negative));
        assert_eq!(
            parse_amount("10.5", "IDR"),
            Err(ParseAmountError::TooPrecise { max_digits: 0 })
        );
        assert_eq!(parse_amount("abc", "EUR"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("1.2.3", "EUR"), Err(ParseAmountError::InvalidFormat));
    }

    #[test]
    fn test_parse_amount_needs_a_digit() {
        assert_eq!(parse_amount(".", "EUR"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount(" . ", "IDR"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount(",.", "USD"), Err(ParseAmountError::InvalidFormat));
        assert_eq!(parse_amount("5.", "EUR"), Ok(500));
    }
}
