//! # Utilities Module
//!
//! Input normalization and validation helpers shared by the service layer.

use rust_decimal::Decimal;

/// Shortest accepted phone number, in digits.
const MIN_TELEFONO_DIGITS: usize = 7;

/// Longest accepted phone number (E.164 limit), in digits.
const MAX_TELEFONO_DIGITS: usize = 15;

/// Exclusive upper bound of a `NUMERIC(19, 2)` balance.
const SALDO_LIMIT: i64 = 100_000_000_000_000_000;

/// Normalize a phone number to its canonical stored form.
///
/// Spaces, dashes, dots and parentheses are removed. A single leading `+`
/// is kept. What remains must be 7 to 15 ASCII digits.
///
/// ## Examples
///
/// ```rust,ignore
/// assert_eq!(normalize_telefono("(55) 1234-5678")?, "5512345678");
/// assert_eq!(normalize_telefono("+52 55 1234 5678")?, "+525512345678");
/// ```
pub fn normalize_telefono(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let (prefix, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '.' | '(' | ')' => {}
            other => return Err(format!("Caracter inválido en teléfono: {}", other)),
        }
    }

    if digits.len() < MIN_TELEFONO_DIGITS || digits.len() > MAX_TELEFONO_DIGITS {
        return Err(format!(
            "El teléfono debe tener entre {} y {} dígitos",
            MIN_TELEFONO_DIGITS, MAX_TELEFONO_DIGITS
        ));
    }

    Ok(format!("{}{}", prefix, digits))
}

/// Validate a transfer amount.
///
/// The amount must be positive and have at most two decimal places, which
/// is what the `NUMERIC(19, 2)` balance column can hold.
pub fn validate_monto(monto: Decimal) -> Result<Decimal, String> {
    if monto <= Decimal::ZERO {
        return Err("El monto debe ser mayor que cero".to_string());
    }

    // 1.50 has scale 2 but is fine; only digits that would be lost count
    let normalized = monto.normalize();
    if normalized.scale() > 2 {
        return Err("El monto admite como máximo dos decimales".to_string());
    }

    Ok(normalized)
}

/// Check that a balance fits the `NUMERIC(19, 2)` column: not negative,
/// below 10^17 and with at most two decimal places.
pub fn validate_saldo(saldo: Decimal) -> Result<Decimal, String> {
    if saldo < Decimal::ZERO {
        return Err("El saldo no puede ser negativo".to_string());
    }
    if saldo >= Decimal::from(SALDO_LIMIT) {
        return Err(format!("El saldo debe ser menor que {}", SALDO_LIMIT));
    }
    let normalized = saldo.normalize();
    if normalized.scale() > 2 {
        return Err("El saldo admite como máximo dos decimales".to_string());
    }
    Ok(normalized)
}

/// Hide all but the last four digits of a phone number, for logs.
pub fn mask_telefono(telefono: &str) -> String {
    let visible = telefono.chars().rev().take(4).collect::<Vec<_>>();
    let hidden = telefono.chars().count().saturating_sub(visible.len());
    let tail: String = visible.into_iter().rev().collect();
    format!("{}{}", "*".repeat(hidden), tail)
}
