use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// An argument is outside its domain (negative price, non-positive term, ...).
    #[error("invalid input `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },
    /// Inputs are individually valid but the requested quantity has a zero denominator.
    #[error("undefined result for `{quantity}`: {reason}")]
    UndefinedResult { quantity: String, reason: String },
}

impl CalcError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn undefined(quantity: &str, reason: impl Into<String>) -> Self {
        Self::UndefinedResult {
            quantity: quantity.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid-input",
            Self::UndefinedResult { .. } => "undefined-result",
        }
    }
}

pub(crate) fn ensure_non_negative(field: &str, value: f64) -> Result<f64, CalcError> {
    if !value.is_finite() {
        return Err(CalcError::invalid(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(CalcError::invalid(field, format!("must be >= 0, got {value}")));
    }
    Ok(value)
}

pub(crate) fn ensure_finite(field: &str, value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::invalid(field, format!("must be finite, got {value}")))
    }
}

pub(crate) fn ensure_positive_term(field: &str, term_months: i32) -> Result<u32, CalcError> {
    if term_months <= 0 {
        return Err(CalcError::invalid(
            field,
            format!("must be > 0 months, got {term_months}"),
        ));
    }
    Ok(term_months as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_negative_rejects_nan_and_negative() {
        assert!(ensure_non_negative("price", f64::NAN).is_err());
        assert!(ensure_non_negative("price", f64::INFINITY).is_err());
        let err = ensure_non_negative("price", -0.01).expect_err("negative must fail");
        assert_eq!(err.kind(), "invalid-input");
        assert!(err.to_string().contains("`price`"));
        assert_eq!(ensure_non_negative("price", 0.0), Ok(0.0));
    }

    #[test]
    fn positive_term_rejects_zero_and_negative() {
        assert!(ensure_positive_term("termMonths", 0).is_err());
        assert!(ensure_positive_term("termMonths", -12).is_err());
        assert_eq!(ensure_positive_term("termMonths", 36), Ok(36));
    }

    #[test]
    fn undefined_result_has_distinct_kind() {
        let err = CalcError::undefined("incomeCommitmentPercent", "monthly income is zero");
        assert_eq!(err.kind(), "undefined-result");
        assert_ne!(err.kind(), CalcError::invalid("x", "y").kind());
    }
}
