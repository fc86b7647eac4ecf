//! The standard normal density, CDF, and CDF inverse.
//!
//! The inverse CDF uses Wichura's AS 241 algorithm (Wichura, M. J. (1988),
//! "Algorithm AS 241: The Percentage Points of the Normal Distribution",
//! Applied Statistics, 37, 477-484), whose rational-approximation coefficients
//! are part of the public ABI and must reproduce the published tables exactly.

use crate::fused_multiply_add::MulAdd;
use crate::special_function::erf_cody::erfc_cody;
use std::f64::consts::FRAC_1_SQRT_2;

const FRAC_SQRT_2_PI: f64 = f64::from_bits(0x3fd9_8845_33d4_3651);

#[must_use]
#[inline(always)]
pub(crate) fn norm_pdf(x: f64) -> f64 {
    FRAC_SQRT_2_PI * (-0.5 * x * x).exp()
}

#[must_use]
pub(crate) fn norm_cdf(z: f64) -> f64 {
    if z <= -10.0 {
        // Asymptotic expansion: avoids cancellation from `erfc` underflowing to 0.
        let z2 = z * z;
        let sum = 1.0 - 3.0 / z2 * (1.0 - 5.0 / z2 * (1.0 - 7.0 / z2 * (1.0 - 9.0 / z2)));
        return norm_pdf(z) * sum / (-z);
    }
    0.5 * erfc_cody(-z * FRAC_1_SQRT_2)
}

const SPLIT1: f64 = 0.425;
const SPLIT2: f64 = 5.0;
const CONST1: f64 = 0.180625;
const CONST2: f64 = 1.6;

// Central region: |p - 1/2| <= SPLIT1, rational approximation in r = CONST1 - (p - 1/2)^2.
const A0: f64 = 3.387_132_872_796_366_6e3;
const A1: f64 = 1.331_416_678_917_843_8e2;
const A2: f64 = 1.971_590_950_306_551_3e1;
const A3: f64 = 1.375_700_354_060_999_7e-1;
const A4: f64 = 3.222_798_760_532_227_9e-3;
const A5: f64 = 8.819_406_739_736_942_2e-9;
const A6: f64 = -2.255_990_254_842_358_6e-4;
const A7: f64 = -4.746_437_234_497_574_6e-7;

const B1: f64 = 4.231_333_700_160_889_4e1;
const B2: f64 = 6.719_977_024_834_090_3e2;
const B3: f64 = 5.393_940_140_444_437e3;
const B4: f64 = 2.212_934_772_845_822_2e4;
const B5: f64 = 3.930_789_580_009_271e4;
const B6: f64 = 2.137_095_782_853_846_7e4;
const B7: f64 = 3.688_718_129_730_834e3;

// Intermediate tails: SPLIT1 < |p - 1/2| <= SPLIT2, rational approximation in r derived from
// sqrt(-ln(min(p, 1-p))).
const C0: f64 = 1.425_197_833_398_596_8;
const C1: f64 = 4.014_927_420_399_003_2;
const C2: f64 = 2.959_691_052_956_842_7;
const C3: f64 = 1.781_881_047_159_090_7e-1;
const C4: f64 = 1.827_645_913_119_425e-2;
const C5: f64 = 7.868_691_311_019_04e-4;
const C6: f64 = 1.240_258_730_505_496e-5;
const C7: f64 = -1.086_422_664_538_269e-8;

const D1: f64 = 1.993_450_991_972_314_2e1;
const D2: f64 = 1.420_433_864_515_480_3e2;
const D3: f64 = 4.559_880_504_758_165e2;
const D4: f64 = 6.956_282_482_949_126e2;
const D5: f64 = 5.027_436_330_543_682e2;
const D6: f64 = 1.605_659_325_588_656_7e2;
const D7: f64 = 1.967_721_379_094_164_2e1;

// Far tails: |p - 1/2| > SPLIT2, rational approximation in the same r.
const E0: f64 = 6.657_905_469_445_201e0;
const E1: f64 = 5.463_784_911_164_114e0;
const E2: f64 = 1.784_826_539_917_291e0;
const E3: f64 = 2.965_605_718_285_048_6e-1;
const E4: f64 = 2.653_218_952_657_612e-2;
const E5: f64 = 1.242_660_947_388_078e-3;
const E6: f64 = 2.713_584_553_896_386e-5;
const E7: f64 = 2.016_819_793_609_897_7e-7;

const F1: f64 = 5.998_322_065_559_23e-1;
const F2: f64 = 1.369_298_809_227_358e-1;
const F3: f64 = 1.480_719_281_588_017e-2;
const F4: f64 = 7.868_691_311_019_04e-4;
const F5: f64 = 1.840_409_213_053_351e-5;
const F6: f64 = 1.421_511_459_746_918e-7;
const F7: f64 = 2.057_221_575_000_715e-10;

/// AS 241's inverse standard normal CDF. Valid for `p` in `(0, 1)`; `p = 0.5` returns exactly
/// `0.0`.
#[must_use]
pub(crate) fn inverse_norm_cdf(p: f64) -> f64 {
    let q = p - 0.5;
    if q.abs() <= SPLIT1 {
        let r = CONST1 - q * q;
        return q * poly7(r, A0, A1, A2, A3, A4, A5, A6, A7)
            / poly7_monic(r, B1, B2, B3, B4, B5, B6, B7);
    }

    let r0 = if q < 0.0 { p } else { 1.0 - p };
    if r0 <= 0.0 {
        return if q < 0.0 { f64::NEG_INFINITY } else { f64::INFINITY };
    }
    let mut r = (-r0.ln()).sqrt();

    let val = if r <= SPLIT2 {
        r -= CONST2;
        poly7(r, C0, C1, C2, C3, C4, C5, C6, C7) / poly7_monic(r, D1, D2, D3, D4, D5, D6, D7)
    } else {
        r -= SPLIT2;
        poly7(r, E0, E1, E2, E3, E4, E5, E6, E7) / poly7_monic(r, F1, F2, F3, F4, F5, F6, F7)
    };

    if q < 0.0 {
        -val
    } else {
        val
    }
}

#[inline(always)]
#[allow(clippy::too_many_arguments)]
fn poly7(r: f64, c0: f64, c1: f64, c2: f64, c3: f64, c4: f64, c5: f64, c6: f64, c7: f64) -> f64 {
    r.mul_add2(
        r.mul_add2(
            r.mul_add2(r.mul_add2(r.mul_add2(r.mul_add2(r.mul_add2(c7, c6), c5), c4), c3), c2),
            c1,
        ),
        c0,
    )
}

#[inline(always)]
fn poly7_monic(r: f64, c1: f64, c2: f64, c3: f64, c4: f64, c5: f64, c6: f64, c7: f64) -> f64 {
    r.mul_add2(
        r.mul_add2(
            r.mul_add2(r.mul_add2(r.mul_add2(r.mul_add2(r.mul_add2(c7, c6), c5), c4), c3), c2),
            c1,
        ),
        1.0,
    )
}

/// Inverse error function via `Φ⁻¹`: `erfinv(e) = Φ⁻¹((e + 1) / 2) / √2`.
#[must_use]
pub(crate) fn erfinv(e: f64) -> f64 {
    FRAC_1_SQRT_2 * inverse_norm_cdf(0.5 * (e + 1.0))
}

#[cfg(test)]
mod tests {
    use super::{inverse_norm_cdf, norm_cdf, norm_pdf};
    use crate::special_function::erf_cody::erf_cody;

    #[test]
    fn norm_pdf_at_zero() {
        assert!((norm_pdf(0.0) - 0.3989422804014327).abs() < 1e-15);
    }

    #[test]
    fn norm_cdf_at_zero() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn norm_cdf_symmetry() {
        for z in [0.1, 1.0, 2.5, 5.0, 9.5, 12.0] {
            assert!((norm_cdf(z) + norm_cdf(-z) - 1.0).abs() < 1e-14);
        }
    }

    #[test]
    fn inverse_norm_cdf_roundtrip() {
        for p in [0.001, 0.05, 0.3, 0.5, 0.7, 0.95, 0.999, 1e-8, 1.0 - 1e-8] {
            let z = inverse_norm_cdf(p);
            assert!((norm_cdf(z) - p).abs() < 1e-9, "p={p} z={z}");
        }
    }

    #[test]
    fn inverse_norm_cdf_antisymmetric() {
        assert!((inverse_norm_cdf(0.025) + inverse_norm_cdf(0.975)).abs() < 1e-12);
    }

    #[test]
    fn erf_consistency_with_erfc_cody() {
        let x = 0.3;
        assert!((erf_cody(x) + super::erfc_cody(x) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn norm_cdf_deep_left_tail_matches_erfc_formula() {
        let z = -12.0;
        let expected = 0.5 * super::erfc_cody(-z * std::f64::consts::FRAC_1_SQRT_2);
        assert!((norm_cdf(z) - expected).abs() < expected * 1e-6);
    }
}
