use crate::IcaError;
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::LazyLock;

/// Grammar accepted by number fields: optional sign, decimal digits with an
/// optional fraction (or a bare fraction), optional exponent.
pub const NUMBER_PATTERN: &str = r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$";

static NUMBER_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(NUMBER_PATTERN).ok());

// 2^63 and 2^64 as f64.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

pub fn is_number_text(text: &str) -> bool {
    NUMBER_RE.as_ref().is_some_and(|re| re.is_match(text))
}

/// Turn an integral float into an integer JSON number.
///
/// Values past the `u64` range keep every decimal digit of the float, so
/// `6.022e23` becomes `602200000000000027262976`.
pub fn integral_number(v: f64) -> Option<Number> {
    if !v.is_finite() || v.fract() != 0.0 {
        return None;
    }
    if v.abs() < I64_LIMIT {
        Some(Number::from(v as i64))
    } else if v > 0.0 && v < U64_LIMIT {
        Some(Number::from(v as u64))
    } else {
        format!("{v:.0}").parse().ok()
    }
}

/// Normalise number-field text.
///
/// Empty text maps to `""` (unset). Text outside the grammar is returned
/// verbatim (trimmed). Integral values become integers, everything else a
/// float. Values that overflow to infinity cannot be represented in JSON and
/// are rejected.
pub fn coerce_number(text: &str) -> Result<Value, IcaError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Value::String(String::new()));
    }
    if !is_number_text(text) {
        return Ok(Value::String(text.to_string()));
    }
    let Ok(parsed) = text.parse::<f64>() else {
        return Ok(Value::String(text.to_string()));
    };
    if !parsed.is_finite() {
        return Err(IcaError::NonFinite {
            what: "number field",
            text: text.to_string(),
        });
    }
    if let Some(int) = integral_number(parsed) {
        return Ok(Value::Number(int));
    }
    Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or_else(|| IcaError::NonFinite {
            what: "number field",
            text: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn grammar_compiles() {
        assert!(NUMBER_RE.is_some());
    }

    #[test]
    fn grammar_accepts_scientific_notation() {
        for ok in ["10", "-3", "+2", "1.", ".5", "10e9", "1.5E-3", "-0.25e+2"] {
            assert!(is_number_text(ok), "{ok}");
        }
        for bad in ["", "e5", "1e", "--1", "1.2.3", "abc", "1 0", "inf"] {
            assert!(!is_number_text(bad), "{bad}");
        }
    }

    #[test]
    fn integral_values_become_integers() {
        assert_eq!(coerce_number("10e9").unwrap(), json!(10_000_000_000_i64));
        assert_eq!(coerce_number("4.0").unwrap(), json!(4));
        assert_eq!(coerce_number("-0").unwrap(), json!(0));
        assert_eq!(coerce_number("2.5").unwrap(), json!(2.5));
    }

    #[test]
    fn large_integral_values_keep_their_digits() {
        let avogadro = coerce_number("6.022e23").unwrap();
        assert_eq!(avogadro.to_string(), "602200000000000027262976");
        assert_eq!(coerce_number("1e20").unwrap().to_string(), "100000000000000000000");
        assert_eq!(
            coerce_number("12345678901234567890").unwrap().to_string(),
            "12345678901234567168"
        );
        assert_eq!(coerce_number("-1e19").unwrap().to_string(), "-10000000000000000000");
    }

    #[test]
    fn empty_is_distinct_from_zero() {
        assert_eq!(coerce_number("   ").unwrap(), json!(""));
        assert_ne!(coerce_number("").unwrap(), coerce_number("0").unwrap());
    }

    #[test]
    fn unparsable_text_is_returned_verbatim() {
        assert_eq!(coerce_number(" 12abc ").unwrap(), json!("12abc"));
    }

    #[test]
    fn overflow_is_rejected() {
        let err = coerce_number("1e999").unwrap_err();
        assert!(err.to_string().contains("Non-finite"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::value::value_text;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn coercion_is_idempotent(text in r"[+-]?(?:[0-9]{1,12}(?:\.[0-9]{0,8})?|\.[0-9]{1,8})(?:[eE][+-]?[0-9]{1,2})?") {
            let first = coerce_number(&text).unwrap();
            let again = coerce_number(&value_text(&first)).unwrap();
            prop_assert_eq!(first, again);
        }

        #[test]
        fn large_integral_values_print_as_integers(
            mantissa in 1u32..1_000_000,
            exponent in 19i32..60,
        ) {
            let value = coerce_number(&format!("{mantissa}e{exponent}")).unwrap();
            let text = value_text(&value);
            prop_assert!(text.chars().all(|c| c.is_ascii_digit()), "{}", text);
            prop_assert_eq!(coerce_number(&text).unwrap(), value);
        }
    }
}
