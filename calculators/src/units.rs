//! Unit conversions and number formatting shared by the calculators.

pub(crate) const LB_TO_KG: f64 = 0.453_592;
pub(crate) const KG_TO_LB: f64 = 2.204_62;
pub(crate) const IN_TO_CM: f64 = 2.54;
/// Serum creatinine, µmol/L to mg/dL.
pub(crate) const UMOL_TO_MGDL: f64 = 0.0113;

/// Fixed-point rendering with trailing zeros removed (`7.00` -> `7`, `5.40` -> `5.4`).
pub(crate) fn trim_fixed(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    if !fixed.contains('.') {
        return fixed;
    }
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Nearest integer, as displayed for calorie and glucose figures.
pub(crate) fn round_whole(value: f64) -> String {
    format!("{}", value.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_fixed_drops_trailing_zeros() {
        assert_eq!(trim_fixed(7.0, 2), "7");
        assert_eq!(trim_fixed(5.404, 2), "5.4");
        assert_eq!(trim_fixed(5.457, 2), "5.46");
        assert_eq!(trim_fixed(120.0, 0), "120");
    }

    #[test]
    fn round_whole_rounds_to_nearest() {
        assert_eq!(round_whole(154.4), "154");
        assert_eq!(round_whole(154.6), "155");
    }
}
