use crate::FwError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, FwError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(FwError::NonFinite { what, value: v })
    }
}

/// Check every entry of a flat buffer, reporting the first offender.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), FwError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(FwError::NonFinite { what, value }),
        None => Ok(()),
    }
}

/// Validate a strictly positive, finite input.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, FwError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(FwError::NotPositive { what, value: v })
    }
}

/// Validate a finite input that may be zero (masses, speeds).
pub fn ensure_non_negative(v: Real, what: &'static str) -> Result<Real, FwError> {
    let v = ensure_finite(v, what)?;
    if v >= 0.0 {
        Ok(v)
    } else {
        Err(FwError::Negative { what, value: v })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_all_finite_reports_first_offender() {
        assert!(ensure_all_finite(&[0.0, 1.0, 2.0], "buf").is_ok());
        let err = ensure_all_finite(&[0.0, Real::INFINITY, Real::NAN], "buf").unwrap_err();
        match err {
            FwError::NonFinite { value, .. } => assert!(value.is_infinite()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn ensure_positive_rejects_zero() {
        assert_eq!(
            ensure_positive(0.0, "chord"),
            Err(FwError::NotPositive {
                what: "chord",
                value: 0.0
            })
        );
        assert!(ensure_positive(-1.0, "chord").is_err());
        assert_eq!(ensure_positive(2.5, "chord").unwrap(), 2.5);
    }

    #[test]
    fn non_negative_accepts_zero() {
        assert_eq!(ensure_non_negative(0.0, "mass").unwrap(), 0.0);
        assert!(matches!(
            ensure_non_negative(-0.1, "mass"),
            Err(FwError::Negative { .. })
        ));
        assert!(matches!(
            ensure_non_negative(Real::NAN, "mass"),
            Err(FwError::NonFinite { .. })
        ));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn positive_values_pass_through(v in 1e-9f64..1e9) {
                prop_assert_eq!(ensure_positive(v, "v").unwrap(), v);
                prop_assert_eq!(ensure_non_negative(v, "v").unwrap(), v);
            }

            #[test]
            fn negative_values_are_rejected(v in -1e9f64..-1e-9) {
                prop_assert!(ensure_positive(v, "v").is_err());
                prop_assert!(ensure_non_negative(v, "v").is_err());
            }
        }
    }
}
