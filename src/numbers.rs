//! Number/string conversions following ECMA-262 v5 semantics.

/// ToString applied to a number (ECMA-262 v5, 9.8.1).
///
/// Both zeroes print as "0". Magnitudes at or above 1e21 and below 1e-6
/// switch to exponent notation the way the language requires.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        // Rust's {:e} prints "1e21" / "1.5e-7"; the language wants an
        // explicit sign on positive exponents.
        let s = format!("{:e}", n);
        if let Some(pos) = s.find('e') {
            if !s[pos + 1..].starts_with('-') {
                return format!("{}e+{}", &s[..pos], &s[pos + 1..]);
            }
        }
        return s;
    }
    format!("{}", n)
}

fn is_ecma_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

/// ToNumber applied to a string (ECMA-262 v5, 9.3.1).
pub fn string_to_number(s: &str) -> f64 {
    let t = s.trim_matches(is_ecma_whitespace);
    if t.is_empty() {
        return 0.0;
    }

    // Hex integer literal.
    if let Some(digits) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        if digits.is_empty() {
            return f64::NAN;
        }
        let mut acc = 0.0f64;
        for c in digits.chars() {
            match c.to_digit(16) {
                Some(d) => acc = acc * 16.0 + d as f64,
                None => return f64::NAN,
            }
        }
        return acc;
    }

    let (sign, body) = match t.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, t.strip_prefix('+').unwrap_or(t)),
    };

    if body == "Infinity" {
        return sign * f64::INFINITY;
    }

    // The decimal grammar only admits digits, a dot and an exponent part.
    // Filtering first rejects the spellings Rust's parser would accept but
    // the language does not ("inf", "nan", embedded signs are checked by the
    // parse itself).
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }

    match body.parse::<f64>() {
        Ok(v) => sign * v,
        Err(_) => f64::NAN,
    }
}

/// ToInt32 (ECMA-262 v5, 9.5).
pub fn to_int32(n: f64) -> i32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    let m = n.trunc().rem_euclid(4294967296.0);
    if m >= 2147483648.0 {
        (m - 4294967296.0) as i32
    } else {
        m as i32
    }
}

/// ToUint32 (ECMA-262 v5, 9.6).
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() || n == 0.0 {
        return 0;
    }
    n.trunc().rem_euclid(4294967296.0) as u32
}

/// Parse a property name as an array index: a canonical base-10 string below
/// 2^32 - 1.
pub fn array_index_of(name: &str) -> Option<u32> {
    if name.is_empty() || name.len() > 10 {
        return None;
    }
    if name != "0" && name.starts_with('0') {
        return None;
    }
    let n: u64 = name.parse().ok()?;
    if n < u32::MAX as u64 {
        Some(n as u32)
    } else {
        None
    }
}
