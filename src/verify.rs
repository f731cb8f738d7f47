//! Cross-check of the allele frequency SLiM reports against the one in its output record.

use itertools::Itertools;

use crate::errors::{Result, SlimcheckError};

/// The two frequencies that were compared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyMatch {
    pub recomputed: f64,
    pub reported: f64,
}

/// Extract the single frequency of a one-locus result.
///
/// An empty input means there was no segregating site or the report had no rows, which is an
/// error of its own rather than a frequency of zero.
pub fn single_frequency(values: impl IntoIterator<Item = f64>, origin: &str) -> Result<f64> {
    values.into_iter().exactly_one().map_err(|rest| {
        let len = rest.count();
        if len == 0 {
            SlimcheckError::NoData(origin.to_string())
        } else {
            SlimcheckError::Shape {
                origin: origin.to_string(),
                len,
            }
        }
    })
}

/// Compare two frequencies, a tolerance of zero requires exact equality.
pub fn compare_frequencies(recomputed: f64, reported: f64, tolerance: f64) -> Result<FrequencyMatch> {
    let matches = if tolerance == 0. {
        recomputed == reported
    } else {
        (recomputed - reported).abs() <= tolerance
    };
    if matches {
        Ok(FrequencyMatch {
            recomputed,
            reported,
        })
    } else {
        Err(SlimcheckError::FrequencyMismatch {
            recomputed,
            reported,
            tolerance,
        })
    }
}

/// Verify per-site frequencies of the record against the values of the frequency report.
pub fn verify_frequencies(
    recomputed: impl IntoIterator<Item = f64>,
    reported: impl IntoIterator<Item = f64>,
    tolerance: f64,
) -> Result<FrequencyMatch> {
    let recomputed = single_frequency(recomputed, "tree sequence")?;
    let reported = single_frequency(reported, "frequency report")?;
    let result = compare_frequencies(recomputed, reported, tolerance)?;
    log::info!(
        "Frequencies match: tree sequence {} / SLiM {}",
        result.recomputed,
        result.reported
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_frequencies() {
        let result = verify_frequencies([0.25], [0.25], 0.).unwrap();
        assert_eq!(
            result,
            FrequencyMatch {
                recomputed: 0.25,
                reported: 0.25
            }
        );
    }

    #[test]
    fn tolerance_absorbs_rounding() {
        assert!(verify_frequencies([0.1 + 0.2], [0.3], 1e-9).is_ok());
        assert!(matches!(
            verify_frequencies([0.1 + 0.2], [0.3], 0.),
            Err(SlimcheckError::FrequencyMismatch { .. })
        ));
    }

    #[test]
    fn mismatch_is_reported() {
        match verify_frequencies([0.5], [0.25], 1e-9) {
            Err(SlimcheckError::FrequencyMismatch {
                recomputed,
                reported,
                ..
            }) => {
                assert_eq!(recomputed, 0.5);
                assert_eq!(reported, 0.25);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn no_segregating_site_is_not_a_match() {
        // an empty result must never pass as a frequency of zero
        let result = verify_frequencies(Vec::<f64>::new(), Vec::<f64>::new(), 0.);
        match result {
            Err(SlimcheckError::NoData(origin)) => assert_eq!(origin, "tree sequence"),
            other => panic!("unexpected result {:?}", other),
        }
        let result = verify_frequencies([0.], Vec::<f64>::new(), 0.);
        match result {
            Err(SlimcheckError::NoData(origin)) => assert_eq!(origin, "frequency report"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn several_sites_are_a_shape_error() {
        match verify_frequencies([0.1, 0.2, 0.3], [0.1], 0.) {
            Err(SlimcheckError::Shape { len, .. }) => assert_eq!(len, 3),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
