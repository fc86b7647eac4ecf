//! Layer 0: the special functions (`erf`, `erfc`, `erfcx`, `Φ`, `φ`, `Φ⁻¹`) the rest of the
//! crate is built on.
//!
//! Exposed as a trait so callers can swap in a different numerical backend (e.g. a
//! vectorized or hardware-accelerated one) while the inversion engine and Black kernel stay
//! generic over it.

mod erf_cody;
mod normal_distribution;

use crate::special_function::erf_cody::{erf_cody, erfc_cody, erfcx_cody};
use crate::special_function::normal_distribution::{erfinv, inverse_norm_cdf, norm_cdf, norm_pdf};

/// The special functions required to price and invert Black's formula.
pub trait SpecialFn {
    /// The error function.
    fn erf(x: f64) -> f64;
    /// The complementary error function, `1 - erf(x)`.
    fn erfc(x: f64) -> f64;
    /// The scaled complementary error function, `exp(x²)·erfc(x)`.
    fn erfcx(x: f64) -> f64;
    /// The inverse error function.
    fn erfinv(x: f64) -> f64;
    /// The standard normal CDF, `Φ`.
    fn norm_cdf(x: f64) -> f64;
    /// The inverse standard normal CDF, `Φ⁻¹`.
    fn inverse_norm_cdf(x: f64) -> f64;
    /// The standard normal PDF, `φ`.
    fn norm_pdf(x: f64) -> f64;
}

/// The crate's default [`SpecialFn`] implementation: Cody's rational Chebyshev
/// approximations for `erf`/`erfc`/`erfcx`, and Wichura's AS 241 algorithm for `Φ⁻¹`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSpecialFn;

impl SpecialFn for DefaultSpecialFn {
    #[inline(always)]
    fn erf(x: f64) -> f64 {
        erf_cody(x)
    }

    #[inline(always)]
    fn erfc(x: f64) -> f64 {
        erfc_cody(x)
    }

    #[inline(always)]
    fn erfcx(x: f64) -> f64 {
        erfcx_cody(x)
    }

    #[inline(always)]
    fn erfinv(x: f64) -> f64 {
        erfinv(x)
    }

    #[inline(always)]
    fn norm_cdf(x: f64) -> f64 {
        norm_cdf(x)
    }

    #[inline(always)]
    fn inverse_norm_cdf(x: f64) -> f64 {
        inverse_norm_cdf(x)
    }

    #[inline(always)]
    fn norm_pdf(x: f64) -> f64 {
        norm_pdf(x)
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultSpecialFn, SpecialFn};
    use proptest::prelude::*;

    #[test]
    fn erf_known_values() {
        assert!((DefaultSpecialFn::erf(1.0) - 0.842_700_792_949_714_8).abs() < 1e-15);
        assert!((DefaultSpecialFn::erf(2.0) - 0.995_322_265_018_952_7).abs() < 1e-15);
    }

    #[test]
    fn norm_cdf_known_values() {
        assert_eq!(DefaultSpecialFn::norm_cdf(0.0), 0.5);
        assert!(
            (DefaultSpecialFn::inverse_norm_cdf(0.975) - 1.959_963_984_540_054_5).abs() < 1e-12
        );
    }

    proptest! {
        #[test]
        fn erfc_is_one_minus_erf(x in -6.0f64..6.0) {
            let erf = DefaultSpecialFn::erf(x);
            let erfc = DefaultSpecialFn::erfc(x);
            prop_assert!((erfc - (1.0 - erf)).abs() < 1e-12);
        }

        #[test]
        fn erf_is_odd(x in 0.0f64..6.0) {
            let pos = DefaultSpecialFn::erf(x);
            let neg = DefaultSpecialFn::erf(-x);
            prop_assert!((pos + neg).abs() < 1e-14);
        }

        #[test]
        fn erfcx_matches_scaled_erfc(x in 0.0f64..25.0) {
            let erfcx = DefaultSpecialFn::erfcx(x);
            let erfc = DefaultSpecialFn::erfc(x);
            let expected = (x * x).exp() * erfc;
            prop_assert!((erfcx - expected).abs() < 1e-6 * erfcx.max(1.0));
        }

        #[test]
        fn norm_cdf_matches_erfc_identity(x in -8.0f64..8.0) {
            let phi = DefaultSpecialFn::norm_cdf(x);
            let via_erfc = 0.5 * DefaultSpecialFn::erfc(-x * std::f64::consts::FRAC_1_SQRT_2);
            prop_assert!((phi - via_erfc).abs() < 1e-12);
        }

        #[test]
        fn inverse_norm_cdf_round_trips(p in 1e-6f64..(1.0 - 1e-6)) {
            let x = DefaultSpecialFn::inverse_norm_cdf(p);
            let p2 = DefaultSpecialFn::norm_cdf(x);
            prop_assert!((p2 - p).abs() < 1e-9);
        }

        #[test]
        fn norm_pdf_is_derivative_of_norm_cdf(x in -5.0f64..5.0) {
            let h = 1e-5;
            let numerical = (DefaultSpecialFn::norm_cdf(x + h) - DefaultSpecialFn::norm_cdf(x - h)) / (2.0 * h);
            let analytic = DefaultSpecialFn::norm_pdf(x);
            prop_assert!((numerical - analytic).abs() < 1e-6);
        }
    }
}
