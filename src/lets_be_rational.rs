//! Layer 2: Peter Jäckel's "Let's Be Rational" inversion engine.
//!
//! Inverts the normalized Black call value `b(x, s)` for `s` given a target `beta`, using a
//! handful of rational-cubic initial guesses (one per region of `(x, beta)` space) followed by
//! up to two steps of third- (or, in extreme wings, fourth-) order Householder iteration. Every
//! region converges in at most two iterations; `f64::EPSILON`-scale residuals are treated as
//! exact.

use crate::black::{
    ln_inv_normalized_vega, normalized_black_call_ht, normalized_vega_ht,
    scaled_normalized_black_call_and_ln_vega,
};
use crate::constants::{
    ONE_OVER_SQRT_THREE, SQRT_DBL_MAX, SQRT_PI_OVER_TWO, SQRT_TWO_PI,
    TWO_PI_OVER_SQRT_TWENTY_SEVEN,
};
use crate::error::ImpliedVolError;
use crate::fused_multiply_add::MulAdd;
use crate::householder::{householder3_factor, householder4_factor};
use crate::option_type::OptionType;
use crate::rational_cubic::{
    convex_rational_cubic_control_parameter_to_fit_second_derivative_at_left_side,
    convex_rational_cubic_control_parameter_to_fit_second_derivative_at_right_side,
    rational_cubic_interpolation,
};
use crate::special_function::SpecialFn;
use std::f64::consts::{FRAC_1_SQRT_2, SQRT_2};
use std::ops::Neg;

/// Minimax rational approximation (order (7,7) / (6,7) depending on region) to
/// `b(x_c, s_c) / b_max` at the upper branch boundary `s_c = √2·√|x|`.
#[inline(always)]
fn b_u_over_b_max(s_c: f64) -> f64 {
    if s_c >= 2.449_489_742_783_178 {
        let y = s_c.recip();

        let g = y
            .mul_add2(-1.229_189_712_271_654_4, 6.589_280_957_677_407E2)
            .mul_add2(y, 6.169_692_835_129_17E2)
            .mul_add2(y, 2.983_680_162_805_663E2)
            .mul_add2(y, 8.488_089_220_080_239E1)
            .mul_add2(y, 1.455_319_886_249_397_7E1)
            .mul_add2(y, 1.375_163_082_077_259_1)
            .mul_add2(y, -4.605_394_817_212_609E-2)
            / y.mul_add2(5.206_084_752_279_256E2, 8.881_238_333_960_678E2)
                .mul_add2(y, 8.698_830_313_690_185E2)
                .mul_add2(y, 5.079_647_179_123_228E2)
                .mul_add2(y, 2.030_420_459_952_177_3E2)
                .mul_add2(y, 5.436_378_146_588_073E1)
                .mul_add2(y, 9.327_034_903_790_405)
                .mul_add2(y, 1.0);
        y.mul_add2(g, -1.253_314_137_315_500_3)
            .mul_add2(0.113_984_531_941_499_06 * y, 0.894_954_297_278_031_3)
    } else {
        let g = s_c
            .mul_add2(-3.386_756_817_001_176_5E-9, -8.733_991_026_156_887E-4)
            .mul_add2(s_c, -8.143_812_878_548_491E-3)
            .mul_add2(s_c, -3.512_133_741_041_69E-2)
            .mul_add2(s_c, -8.976_383_086_137_545E-2)
            .mul_add2(s_c, -1.416_368_116_424_721E-1)
            .mul_add2(s_c, -1.344_864_378_589_371E-1)
            .mul_add2(s_c, -6.063_099_880_334_851E-2)
            / s_c
                .mul_add2(1.421_206_743_529_177_8E-2, 1.324_801_623_892_073E-1)
                .mul_add2(s_c, 5.959_161_649_351_221E-1)
                .mul_add2(s_c, 1.652_734_794_196_848_7)
                .mul_add2(s_c, 3.018_638_953_766_389_6)
                .mul_add2(s_c, 3.650_335_036_015_884_6)
                .mul_add2(s_c, 2.722_003_340_655_505_5)
                .mul_add2(s_c, 1.0);

        s_c.mul_add2(g, 0.061_461_680_580_514_74)
            .mul_add2(s_c * s_c, 0.789_908_594_556_062_8)
    }
}

/// As [`b_u_over_b_max`], for the lower branch boundary.
#[inline(always)]
fn b_l_over_b_max(s_c: f64) -> f64 {
    if s_c < 0.709_929_573_971_953_9 {
        let g = s_c
            .mul_add2(4.542_510_209_361_606_4E-7, -6.403_639_934_147_98E-6)
            .mul_add2(s_c, 5.971_692_845_958_919E-3)
            .mul_add2(s_c, 3.976_063_144_567_705_5E-2)
            .mul_add2(s_c, 9.807_891_178_635_89E-2)
            .mul_add2(s_c, 8.074_107_237_288_286E-2)
            / s_c
                .mul_add2(6.125_459_704_983_172E-2, 4.613_270_710_865_565E-1)
                .mul_add2(s_c, 1.365_880_147_571_179)
                .mul_add2(s_c, 1.859_497_767_228_766_5)
                .mul_add2(s_c, 1.0);
        (s_c * s_c)
            * s_c.mul_add2(
                s_c.mul_add2(g, -0.096_727_192_813_394_37),
                0.075_609_966_402_963_62,
            )
    } else if s_c < 2.626_785_107_312_739_5 {
        s_c.mul_add2(6.971_140_063_983_471E-4, 6.584_925_270_230_231E-3)
            .mul_add2(s_c, 2.953_705_895_096_301_8E-2)
            .mul_add2(s_c, 6.917_130_174_466_835E-2)
            .mul_add2(s_c, 7.561_014_227_254_904E-2)
            .mul_add2(s_c, -2.708_128_856_468_558_7E-8)
            .mul_add2(s_c, 1.979_573_792_759_858E-9)
            / s_c
                .mul_add2(6.636_197_582_786_12E-3, 7.171_486_244_882_935E-2)
                .mul_add2(s_c, 3.783_162_225_306_046E-1)
                .mul_add2(s_c, 1.157_148_318_717_978_3)
                .mul_add2(s_c, 2.129_710_354_999_518)
                .mul_add2(s_c, 2.194_144_852_558_658)
                .mul_add2(s_c, 1.0)
    } else if s_c < 7.348_469_228_349_534 {
        s_c.mul_add2(1.701_257_940_724_605_5E-3, 1.002_291_337_825_409E-2)
            .mul_add2(s_c, 3.922_517_740_768_760_6E-2)
            .mul_add2(s_c, 7.403_965_818_682_282E-2)
            .mul_add2(s_c, 7.411_485_544_834_501E-2)
            .mul_add2(s_c, 5.311_803_397_279_465E-4)
            .mul_add2(s_c, -9.332_511_535_483_788E-5)
            / s_c
                .mul_add2(1.619_540_589_593_093_7E-2, 1.174_400_591_971_610_1E-1)
                .mul_add2(s_c, 5.323_125_844_350_184E-1)
                .mul_add2(s_c, 1.391_232_364_627_114)
                .mul_add2(s_c, 2.344_181_670_708_740_4)
                .mul_add2(s_c, 2.221_723_813_222_813_4)
                .mul_add2(s_c, 1.0)
    } else {
        s_c.mul_add2(1.693_020_807_842_147_5E-3, 5.183_252_617_163_152E-3)
            .mul_add2(s_c, 2.934_240_565_862_844_5E-2)
            .mul_add2(s_c, 3.921_610_857_820_463_6E-2)
            .mul_add2(s_c, 7.168_217_831_093_633E-2)
            .mul_add2(s_c, -1.511_669_248_501_119_6E-3)
            .mul_add2(s_c, 1.450_007_229_724_060_4E-3)
            / s_c
                .mul_add2(1.611_699_254_678_867_7E-2, 7.126_137_099_644_303E-2)
                .mul_add2(s_c, 3.754_374_213_737_579E-1)
                .mul_add2(s_c, 8.487_830_756_737_222E-1)
                .mul_add2(s_c, 1.682_315_917_528_153_2)
                .mul_add2(s_c, 1.617_631_350_230_541_5)
                .mul_add2(s_c, 1.0)
    }
}

/// `(f, f', f'')` of the lowest-branch inverse map `f_lower(s) = 2π/√27·|x|·Φ(-z)³`,
/// `z = |x|/(√3·s)`, as a function of `s` (the derivatives are with respect to `s`).
#[inline(always)]
fn compute_f_lower_map_and_first_two_derivatives<SpFn: SpecialFn>(
    theta_x: f64,
    s: f64,
) -> (f64, f64, f64) {
    debug_assert!(theta_x < 0.0);
    let ax = -theta_x;
    let z = ONE_OVER_SQRT_THREE * ax / s;
    let phi_m = 0.5 * SpFn::erfc(FRAC_1_SQRT_2 * z);
    let phim = SpFn::norm_pdf(z);
    let s2 = s * s;

    let f = TWO_PI_OVER_SQRT_TWENTY_SEVEN * ax * phi_m.powi(3);

    // f and its derivatives above are natural in s; the rational cubic interpolates
    // f against beta = b(theta_x, s), so reparameterize via v = dbeta/ds (the vega).
    let fp_s = 3.0 * TWO_PI_OVER_SQRT_TWENTY_SEVEN * ax * phi_m * phi_m * phim * (z / s);
    let fpp_s = -3.0 * TWO_PI_OVER_SQRT_TWENTY_SEVEN * ax * phi_m * phim * (z / s2)
        * (2.0 * z * phim).mul_add2(1.0, (2.0 * phim).mul_add2(1.0, -(phi_m * z * z)));

    let v = normalized_vega_ht(theta_x / s, 0.5 * s);
    let vp = v * (3.0 * z * z / s - 0.25 * s);

    let fp = fp_s / v;
    let fpp = (fpp_s * v - fp_s * vp) / (v * v * v);
    (f, fp, fpp)
}

#[inline(always)]
fn inverse_f_lower_map<SpFn: SpecialFn>(x: f64, f: f64) -> f64 {
    (x * ONE_OVER_SQRT_THREE
        / SpFn::inverse_norm_cdf(
            (f / (TWO_PI_OVER_SQRT_TWENTY_SEVEN * x.abs())).cbrt(),
        ))
    .abs()
}

/// `(f, f', f'')` of the highest-branch inverse map `f_upper(s) = Φ(-s/2)` (the value is
/// independent of `x`; the derivatives, taken w.r.t. `s`, are not).
#[inline(always)]
fn compute_f_upper_map_and_first_two_derivatives<SpFn: SpecialFn>(
    x: f64,
    s: f64,
) -> (f64, f64, f64) {
    let w = (x / s).powi(2);
    (
        0.5 * SpFn::erfc((0.5 * FRAC_1_SQRT_2) * s),
        -0.5 * (0.5 * w).exp(),
        SQRT_PI_OVER_TWO * ((0.125 * s).mul_add2(s, w).exp()) * w / s,
    )
}

#[inline(always)]
fn inverse_f_upper_map<SpFn: SpecialFn>(f: f64) -> f64 {
    -2.0 * SpFn::inverse_norm_cdf(f)
}

#[inline(always)]
fn implied_normalized_volatility_atm<SpFn: SpecialFn>(beta: f64) -> f64 {
    2.0 * SQRT_2 * SpFn::erfinv(beta)
}

/// Inverts `beta = b(θx, s)` for `s`, given `beta < b_max = exp(θx/2)`.
#[inline(always)]
fn lets_be_rational<SpFn: SpecialFn>(beta: f64, theta_x: f64) -> Result<f64, ImpliedVolError> {
    debug_assert!(theta_x < 0.0);
    debug_assert!(beta > 0.0);
    let b_max = (0.5 * theta_x).exp();
    if beta >= b_max {
        Err(ImpliedVolError::AboveMaximum)
    } else {
        Ok(lets_be_rational_unchecked::<SpFn>(beta, theta_x, b_max))
    }
}

#[allow(clippy::too_many_lines)]
fn lets_be_rational_unchecked<SpFn: SpecialFn>(beta: f64, theta_x: f64, b_max: f64) -> f64 {
    let mut s;
    let sqrt_ax = theta_x.neg().sqrt();
    let s_c = SQRT_2 * sqrt_ax;
    let ome = 1.0 - SpFn::erfcx(sqrt_ax);
    let b_c = 0.5 * b_max * ome;

    if beta < b_c {
        // LOWER HALF: s < s_c
        let s_l = (-SQRT_PI_OVER_TWO).mul_add2(ome, s_c);
        debug_assert!(s_l > 0.0);
        let b_l = b_l_over_b_max(s_c) * b_max;

        if beta < b_l {
            // LOWEST BRANCH: s < s_l
            let (f_lower_map_l, d_f_lower_map_l_d_beta, d2_f_lower_map_l_d_beta2) =
                compute_f_lower_map_and_first_two_derivatives::<SpFn>(theta_x, s_l);
            let r2 = convex_rational_cubic_control_parameter_to_fit_second_derivative_at_right_side(
                0.0,
                b_l,
                0.0,
                f_lower_map_l,
                1.0,
                d_f_lower_map_l_d_beta,
                d2_f_lower_map_l_d_beta2,
                true,
            );
            let mut f = rational_cubic_interpolation(
                beta,
                0.0,
                b_l,
                0.0,
                f_lower_map_l,
                1.0,
                d_f_lower_map_l_d_beta,
                r2,
            );

            if !(f > 0.0) {
                let t = beta / b_l;
                f = f_lower_map_l.mul_add2(t, b_l.mul_add2(-t, b_l)) * t;
            }

            s = inverse_f_lower_map::<SpFn>(theta_x, f);
            debug_assert!(s > 0.0);

            let ln_beta = beta.ln();

            let mut s_left = f64::MIN_POSITIVE;
            let mut s_right = s_l;
            let mut direction_reversal_count = 0;
            let mut ds_previous: f64 = 0.0;
            let mut ds = 0.0;

            for i in 0..2 {
                if i > 0 {
                    if ds * ds_previous < 0.0 {
                        direction_reversal_count += 1;
                    }
                    if direction_reversal_count == 3 || !(s > s_left && s < s_right) {
                        s = 0.5 * (s_left + s_right);
                        if (s_right - s_left) <= f64::EPSILON * s {
                            return s;
                        }
                        direction_reversal_count = 0;
                        ds_previous = 0.0;
                    } else {
                        ds_previous = ds;
                    }
                }
                debug_assert!(s > 0.0);
                debug_assert!(s.is_finite(), "s is not finite: s={s}");

                let h = theta_x / s;
                let t = 0.5 * s;
                let (bx, ln_vega) =
                    scaled_normalized_black_call_and_ln_vega::<SpFn>(0.5 * theta_x, h, t);

                let ln_b = bx.ln() + ln_vega;
                let b = ln_b.exp();
                let bpob = bx.recip();
                let bp = bpob * b;

                if b > beta && s < s_right {
                    s_right = s;
                } else if b < beta && s > s_left {
                    s_left = s;
                }

                if !(b > 0.0 && bp > 0.0) {
                    ds = 0.5 * (s_left + s_right) - s;
                } else {
                    let x2_over_s3 = h * h / s;
                    let b_h2 = t.mul_add2(-0.5, x2_over_s3);
                    let v = (ln_beta - ln_b) * ln_b / ln_beta * bx;
                    let lambda = ln_b.recip();

                    #[cfg(feature = "fma")]
                    let ot_lambda = lambda.mul_add2(2.0, 1.0);
                    #[cfg(not(feature = "fma"))]
                    let ot_lambda = lambda + lambda + 1.0;

                    let h2 = ot_lambda.mul_add2(-bpob, b_h2);
                    let c = 3.0 * (x2_over_s3 / s);
                    let b_h3 = b_h2.mul_add2(b_h2, -c) - 0.25;
                    let sq_bpob = bpob * bpob;
                    let bppob_triple = 3.0 * b_h2 * bpob;
                    let mu_plus_2 = (1.0 + lambda).mul_add2(6.0 * lambda, 2.0);
                    let h3 = bppob_triple.mul_add2(-ot_lambda, sq_bpob.mul_add2(mu_plus_2, b_h3));

                    ds = v * if theta_x < -190.0 {
                        householder4_factor(
                            v,
                            h2,
                            h3,
                            b_h2.mul_add2(b_h3 - 0.5, -((b_h2 - 2.0 / s) * 2.0 * c))
                                - (b_h3 * bpob * 4.0).mul_add2(
                                    -ot_lambda,
                                    bpob.mul_add2(
                                        sq_bpob.mul_add2(
                                            lambda
                                                .mul_add2(24.0, 36.0)
                                                .mul_add2(lambda, 22.0)
                                                .mul_add2(lambda, 6.0),
                                            -(2.0 * bppob_triple * mu_plus_2),
                                        ),
                                        -(bppob_triple * ot_lambda),
                                    ),
                                ),
                        )
                    } else {
                        householder3_factor(v, h2, h3)
                    };
                }

                if ds.abs() <= f64::EPSILON * s {
                    return s;
                }

                s += ds;
            }
            return s;
        }

        // LOWER MIDDLE: s_l <= s < s_c
        let v_l = normalized_vega_ht(theta_x / s_l, 0.5 * s_l);
        let v_c = normalized_vega_ht(theta_x / s_c, 0.5 * s_c);
        let r_lm = convex_rational_cubic_control_parameter_to_fit_second_derivative_at_right_side(
            b_l,
            b_c,
            s_l,
            s_c,
            v_l.recip(),
            v_c.recip(),
            0.0,
            false,
        );
        s = rational_cubic_interpolation(beta, b_l, b_c, s_l, s_c, v_l.recip(), v_c.recip(), r_lm);
        debug_assert!(s > 0.0);
    } else {
        // UPPER HALF: s_c <= s
        let s_u = SQRT_PI_OVER_TWO.mul_add2(2.0 - ome, s_c);
        debug_assert!(s_u > 0.0);
        let b_u = b_u_over_b_max(s_c) * b_max;

        if beta <= b_u {
            // UPPER MIDDLE: s_c <= s <= s_u
            let v_c = normalized_vega_ht(theta_x / s_c, 0.5 * s_c);
            let v_u = normalized_vega_ht(theta_x / s_u, 0.5 * s_u);
            let r_um = convex_rational_cubic_control_parameter_to_fit_second_derivative_at_left_side(
                b_c,
                b_u,
                s_c,
                s_u,
                v_c.recip(),
                v_u.recip(),
                0.0,
                false,
            );
            s = rational_cubic_interpolation(
                beta,
                b_c,
                b_u,
                s_c,
                s_u,
                v_c.recip(),
                v_u.recip(),
                r_um,
            );
            debug_assert!(s > 0.0);
        } else {
            // HIGHEST BRANCH: s_u < s
            let (f_upper_map_h, d_f_upper_map_h_d_beta, d2_f_upper_map_h_d_beta2) =
                compute_f_upper_map_and_first_two_derivatives::<SpFn>(theta_x, s_u);
            let mut f = if (-SQRT_DBL_MAX..SQRT_DBL_MAX).contains(&d2_f_upper_map_h_d_beta2) {
                let r_hh =
                    convex_rational_cubic_control_parameter_to_fit_second_derivative_at_left_side(
                        b_u,
                        b_max,
                        f_upper_map_h,
                        0.0,
                        d_f_upper_map_h_d_beta,
                        -0.5,
                        d2_f_upper_map_h_d_beta2,
                        true,
                    );
                rational_cubic_interpolation(
                    beta,
                    b_u,
                    b_max,
                    f_upper_map_h,
                    0.0,
                    d_f_upper_map_h_d_beta,
                    -0.5,
                    r_hh,
                )
            } else {
                f64::MIN
            };
            if f <= 0.0 {
                let h = b_max - b_u;
                let t = (beta - b_u) / h;
                f = f_upper_map_h.mul_add2(1.0 - t, 0.5 * h * t) * (1.0 - t);
            }
            s = inverse_f_upper_map::<SpFn>(f);
            if beta > 0.5 * b_max {
                let beta_bar = b_max - beta;
                for _ in 0..2 {
                    let h = theta_x / s;
                    let t = 0.5 * s;
                    let gp = (2.0 / std::f64::consts::PI).sqrt()
                        / (SpFn::erfcx((t + h) * FRAC_1_SQRT_2)
                            + SpFn::erfcx((t - h) * FRAC_1_SQRT_2));
                    debug_assert!(s > 0.0);
                    let g = (beta_bar * gp).ln() + ln_inv_normalized_vega(h, t);
                    let x2_over_s3 = h * h / s;
                    let b_h2 = t.mul_add2(-0.5, x2_over_s3);
                    let c = 3.0 * x2_over_s3 / s;
                    let b_h3 = b_h2.mul_add2(b_h2, -c - 0.25);
                    let v = -g / gp;
                    let h2 = b_h2 + gp;
                    let h3 = gp.mul_add2(2.0f64.mul_add2(gp, 3.0 * b_h2), b_h3);
                    let ds = v * if theta_x < -580.0 {
                        householder4_factor(
                            v,
                            h2,
                            h3,
                            gp.mul_add2(
                                4.0f64.mul_add2(
                                    b_h3,
                                    (6.0 * gp).mul_add2(b_h2.mul_add2(2.0, gp), 3.0 * b_h2 * b_h2),
                                ),
                                b_h2.mul_add2(b_h3 - 0.5, -((b_h2 - 2.0 / s) * 2.0 * c)),
                            ),
                        )
                    } else {
                        householder3_factor(v, h2, h3)
                    };

                    if ds.abs() <= f64::EPSILON * s {
                        return s;
                    }

                    s += ds;
                    debug_assert!(s > 0.0);
                }
                return s;
            }
        }
    }

    // MIDDLE BRANCHES (ITERATION)
    const MAX_ITERATIONS: usize = 2;
    for _ in 0..MAX_ITERATIONS {
        debug_assert!(s > 0.0);
        debug_assert!(theta_x < 0.0_f64);
        let h = theta_x / s;
        let t = 0.5 * s;
        let b = normalized_black_call_ht::<SpFn>(0.5 * theta_x, h, t);
        let bp = normalized_vega_ht(h, t);
        let nu = (beta - b) / bp;
        let h2 = t.mul_add2(-0.5, h * h / s);
        let h3 = h2.mul_add2(h2, -(3.0 * (h / s).powi(2))) - 0.25_f64;
        let ds = nu * householder3_factor(nu, h2, h3);

        if ds.abs() <= f64::EPSILON * s {
            return s;
        }

        s += ds;
        debug_assert!(s > 0.0);
    }
    s
}

/// Inverts Black's formula for the implied volatility `σ` given an observed price.
///
/// # Errors
/// Returns [`ImpliedVolError::BelowIntrinsic`] if `price` is below intrinsic value, or
/// [`ImpliedVolError::AboveMaximum`] if `price` is at or above the model's asymptotic upper
/// bound (`F` for calls, `K` for puts).
pub fn implied_black_volatility<SpFn: SpecialFn>(
    price: f64,
    f: f64,
    k: f64,
    t: f64,
    option_type: OptionType,
) -> Result<f64, ImpliedVolError> {
    if option_type.is_call() {
        implied_black_volatility_input_unchecked::<SpFn, true>(price, f, k, t)
    } else {
        implied_black_volatility_input_unchecked::<SpFn, false>(price, f, k, t)
    }
}

#[inline(always)]
pub(crate) fn implied_black_volatility_input_unchecked<SpFn: SpecialFn, const IS_CALL: bool>(
    price: f64,
    f: f64,
    k: f64,
    t: f64,
) -> Result<f64, ImpliedVolError> {
    let max_price = if IS_CALL { f } else { k };
    if price >= max_price {
        return Err(ImpliedVolError::AboveMaximum);
    }
    let intrinsic_value = (if IS_CALL { f - k } else { k - f }).max(0.0);
    if price < intrinsic_value {
        return Err(ImpliedVolError::BelowIntrinsic);
    }
    let normalized_time_value = (price - intrinsic_value) / (f.sqrt() * k.sqrt());
    if normalized_time_value <= f64::MIN_POSITIVE {
        return Ok(0.0);
    }
    Ok(if f == k {
        implied_normalized_volatility_atm::<SpFn>(normalized_time_value) / t.sqrt()
    } else {
        let theta_x = (f.ln() - k.ln()).abs().neg();
        lets_be_rational::<SpFn>(normalized_time_value, theta_x)? / t.sqrt()
    })
}

/// Inverts `β = b_q(x, s)` for `s`, given the observed normalized price `β`, log-moneyness
/// `x = ln(F/K)` and option sign `q`.
///
/// Reduces to the call/OTM representation via put-call parity,
/// `b_call(x, s) = b_put(x, s) + (exp(x/2) - exp(-x/2))`, and the symmetry
/// `b(x, s) - normalized_intrinsic(x) = b(-|x|, s) - normalized_intrinsic(-|x|)`, before
/// delegating to the same bounded-iteration engine as [`implied_black_volatility`].
///
/// # Errors
/// Returns [`ImpliedVolError::BelowIntrinsic`] if `β` is below the normalized intrinsic
/// value for `(x, q)`, or [`ImpliedVolError::AboveMaximum`] if `β` is at or above the
/// model's asymptotic upper bound for `(x, q)`.
pub fn normalized_implied_vol<SpFn: SpecialFn>(
    beta: f64,
    x: f64,
    option_type: OptionType,
) -> Result<f64, ImpliedVolError> {
    let intrinsic_call = (0.5 * x).exp() - (-0.5 * x).exp();
    let beta_call = if option_type.is_call() {
        beta
    } else {
        beta + intrinsic_call
    };
    let intrinsic_call_otm = intrinsic_call.max(0.0);
    if beta_call < intrinsic_call_otm {
        return Err(ImpliedVolError::BelowIntrinsic);
    }
    let normalized_time_value = beta_call - intrinsic_call_otm;
    if normalized_time_value <= f64::MIN_POSITIVE {
        return Ok(0.0);
    }
    if x == 0.0 {
        let b_max = 1.0;
        if normalized_time_value >= b_max {
            return Err(ImpliedVolError::AboveMaximum);
        }
        return Ok(implied_normalized_volatility_atm::<SpFn>(normalized_time_value));
    }
    let theta_x = -x.abs();
    lets_be_rational::<SpFn>(normalized_time_value, theta_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black::black_input_unchecked;
    use crate::special_function::DefaultSpecialFn;
    use proptest::prelude::*;
    use rand::Rng;

    pub(crate) const FOURTH_ROOT_DBL_EPSILON: f64 = f64::from_bits(0x3f20_0000_0000_0000);

    fn normalized_intrinsic(theta_x: f64) -> f64 {
        let x2 = theta_x * theta_x;
        if x2 < 98.0 * FOURTH_ROOT_DBL_EPSILON {
            return x2
                .mul_add2(1.0 / 92_897_280.0, 1.0 / 322_560.0)
                .mul_add2(x2, 1.0 / 1920.0)
                .mul_add2(x2, 1.0 / 120.0)
                .mul_add2(x2, 1.0 / 24.0)
                .mul_add2(x2, 1.0)
                * theta_x;
        }
        (0.5 * theta_x).exp() - (-0.5 * theta_x).exp()
    }

    fn scaled_normalized_black(theta_x: f64, s: f64) -> f64 {
        debug_assert!(s > 0.0 && theta_x != 0.0);
        let h = theta_x / s;
        let t = 0.5 * s;
        (if theta_x > 0.0 {
            normalized_intrinsic(theta_x) * SQRT_TWO_PI * (0.5 * t.mul_add2(t, h * h)).exp()
        } else {
            0.0
        }) + scaled_normalized_black_call_and_ln_vega::<DefaultSpecialFn>(0.5 * -theta_x.abs(), h, t)
            .0
    }

    fn black_accuracy_factor(x: f64, s: f64, theta: f64) -> f64 {
        if x == 0.0 {
            return if s.abs() < f64::EPSILON {
                1.0
            } else {
                s / (DefaultSpecialFn::erf((0.5 * FRAC_1_SQRT_2) * s)
                    * SQRT_TWO_PI
                    * (0.125 * s * s).exp())
            };
        }
        let theta_x = if theta < 0.0 { -x } else { x };
        if s <= 0.0 {
            return if theta_x > 0.0 { 0.0 } else { f64::MAX };
        }
        s / scaled_normalized_black(theta_x, s)
    }

    #[test]
    fn reconstruction_call_atm() {
        for i in 1..10000 {
            let price = 0.01 * f64::from(i);
            let f = 100.0;
            let k = f;
            let t = 1.0;
            const Q: bool = true;
            let sigma =
                implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(price, f, k, t)
                    .unwrap();
            let reprice = black_input_unchecked::<DefaultSpecialFn, Q>(f, k, sigma, t);
            debug_assert!(
                (price - reprice).abs() / price < 4.0 * f64::EPSILON,
                "{f},{k},{t},{sigma},{price},{reprice},{}",
                (price - reprice).abs() / price / f64::EPSILON
            );
        }
    }

    #[test]
    fn reconstruction_call_atm2() {
        for i in 1..=10000 {
            let f = 100.0;
            let k = f;
            let t = 1.0;
            const Q: bool = true;
            let sigma = 0.001 * f64::from(i);
            let price = black_input_unchecked::<DefaultSpecialFn, Q>(f, k, sigma, t);
            let sigma2 =
                implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(price, f, k, t)
                    .unwrap();
            debug_assert!(
                (sigma - sigma2).abs() / sigma
                    <= 1.0
                        + black_accuracy_factor(f.ln() - k.ln(), sigma * t.sqrt(), 1.0).recip()
                            * f64::EPSILON,
                "f: {f}, k: {k}, t: {t}, sigma: {sigma}, sigma2; {sigma2}, price: {price}"
            );
        }
    }

    #[test]
    fn reconstruction_put_atm() {
        for i in 1..100 {
            let price = 0.01 * f64::from(i);
            let f = 100.0;
            let k = f;
            let t = 1.0;
            const Q: bool = false;
            let sigma =
                implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(price, f, k, t)
                    .unwrap();
            let reprice = black_input_unchecked::<DefaultSpecialFn, Q>(f, k, sigma, t);
            assert!((price - reprice).abs() < f64::EPSILON * 100.0);
        }
    }

    #[test]
    fn reconstruction_random_call_itm() {
        let n = 100_000;
        let seed: [u8; 32] = [13; 32];
        let mut rng: rand::rngs::StdRng = rand::SeedableRng::from_seed(seed);
        for _ in 0..n {
            let (r, r2, r3): (f64, f64, f64) = rng.random();
            let price = (1.0 - r) + r * r2;
            let f = 1.0;
            let k = r;
            let t = 1e5 * r3;
            const Q: bool = true;
            let sigma =
                implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(price, f, k, t)
                    .unwrap();
            let reprice = black_input_unchecked::<DefaultSpecialFn, Q>(f, k, sigma, t);
            assert!(
                (price - reprice).abs() <= 1.5 * f64::EPSILON,
                "{f},{k},{t},{sigma},{price},{reprice},{}",
                (price - reprice).abs() / f64::EPSILON
            );
        }
    }

    #[test]
    fn reconstruction_random_call_otm() {
        let n = 100_000;
        let seed: [u8; 32] = [13; 32];
        let mut rng: rand::rngs::StdRng = rand::SeedableRng::from_seed(seed);
        for _ in 0..n {
            let (r, r2, r3): (f64, f64, f64) = rng.random();
            let price = r * r2;
            let f = r;
            let k = 1.0;
            let t = 1e5 * r3;
            const Q: bool = true;
            let sigma =
                implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(price, f, k, t)
                    .unwrap();
            let reprice = black_input_unchecked::<DefaultSpecialFn, Q>(f, k, sigma, t);
            assert!((price - reprice).abs() <= 1.5 * f64::EPSILON);
        }
    }

    #[test]
    fn reconstruction_random_put_itm() {
        let n = 100_000;
        let seed: [u8; 32] = [13; 32];
        let mut rng: rand::rngs::StdRng = rand::SeedableRng::from_seed(seed);
        for _ in 0..n {
            let (r, r2, r3): (f64, f64, f64) = rng.random();
            let price = r * r2;
            let f = 1.0;
            let k = r;
            let t = 1e5 * r3;
            const Q: bool = false;
            let sigma =
                implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(price, f, k, t)
                    .unwrap();
            let reprice = black_input_unchecked::<DefaultSpecialFn, Q>(f, k, sigma, t);
            assert!((price - reprice).abs() <= 1.5 * f64::EPSILON);
        }
    }

    #[test]
    fn reconstruction_random_put_otm() {
        let n = 100_000;
        let seed: [u8; 32] = [13; 32];
        let mut rng: rand::rngs::StdRng = rand::SeedableRng::from_seed(seed);
        for _ in 0..n {
            let (r, r2, r3): (f64, f64, f64) = rng.random();
            let price = (1.0 - r) + r * r2;
            let f = r;
            let k = 1.0;
            let t = 1e5 * r3;
            const Q: bool = false;
            let sigma =
                implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(price, f, k, t)
                    .unwrap();
            let reprice = black_input_unchecked::<DefaultSpecialFn, Q>(f, k, sigma, t);
            assert!((price - reprice).abs() <= 1.5 * f64::EPSILON);
        }
    }

    #[test]
    fn panic_case_short_dated_deep_otm() {
        let cases = [
            (73.425, 12173.425, 12100.0, 0.007_707_632_775_934_893_4),
            (73.425, 12173.425, 12100.0, 0.007_705_811_088_032_645),
            (73.425, 12173.425, 12100.0, 0.007_705_808_219_781_035),
            (73.425, 12173.425, 12100.0, 0.007_705_804_818_688_366),
        ];
        for (price, f, k, t) in cases {
            const Q: bool = true;
            let sigma =
                implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(price, f, k, t)
                    .unwrap();
            let reprice = black_input_unchecked::<DefaultSpecialFn, Q>(f, k, sigma, t);
            assert!((price - reprice).abs() / price <= 6.0 * f64::EPSILON);
        }
    }

    #[test]
    fn time_inf() {
        let price = 20.0;
        let f = 100.0;
        let k = 100.0;
        let t = f64::INFINITY;
        const Q: bool = true;
        let sigma = implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(price, f, k, t)
            .unwrap();
        assert_eq!(sigma, 0.0);
    }

    #[test]
    fn price_at_or_above_maximum_is_rejected() {
        const Q: bool = true;
        let err =
            implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(100.0, 100.0, 90.0, 1.0)
                .unwrap_err();
        assert_eq!(err, ImpliedVolError::AboveMaximum);
    }

    #[test]
    fn price_below_intrinsic_is_rejected() {
        const Q: bool = true;
        let err =
            implied_black_volatility_input_unchecked::<DefaultSpecialFn, Q>(5.0, 100.0, 90.0, 1.0)
                .unwrap_err();
        assert_eq!(err, ImpliedVolError::BelowIntrinsic);
    }

    #[test]
    fn check_relative_error_of_implied_vol() {
        let mut max_relative_error = 0.0;
        let mut error_count = 0;
        let n = 1_000_000;

        let seed: [u8; 32] = [42; 32];
        let mut rng: rand::rngs::StdRng = rand::SeedableRng::from_seed(seed);

        for _ in 0..n {
            let theta_x = -rng.random_range(1e-4..5.0);
            let s = rng.random_range(1e-3..5.0);

            let h = theta_x / s;
            let t = 0.5 * s;
            let beta = normalized_black_call_ht::<DefaultSpecialFn>(0.5 * theta_x, h, t);

            if beta <= 0.0 {
                continue;
            }

            let b_max = (0.5 * theta_x).exp();
            let implied_s = lets_be_rational_unchecked::<DefaultSpecialFn>(beta, theta_x, b_max);
            let relative_error = (implied_s - s).abs() / s;

            if relative_error > max_relative_error {
                max_relative_error = relative_error;
            }

            let attainable_accuracy =
                implied_volatility_attainable_accuracy::<DefaultSpecialFn>(theta_x, s);

            let tolerance = attainable_accuracy * 3.0;
            if relative_error > tolerance {
                error_count += 1;
            }
        }

        println!("Max Relative Error: {max_relative_error:.3e}");
        assert_eq!(
            error_count, 0,
            "Relative error exceeded attainable accuracy limit"
        );
    }

    fn implied_volatility_attainable_accuracy<SpFn: SpecialFn>(x: f64, s: f64) -> f64 {
        let half_theta_x_neg_abs = -0.5 * x.abs();
        let h_neg_abs = -x.abs() / s;
        let t = 0.5 * s;

        let (scaled_b_part, _ln_vega) = scaled_normalized_black_call_and_ln_vega::<SpFn>(
            half_theta_x_neg_abs,
            h_neg_abs,
            t,
        );

        let vega = normalized_vega_ht(x / s, 0.5 * s);

        if scaled_b_part.abs() * vega >= f64::MIN_POSITIVE {
            f64::EPSILON * (1.0 + (scaled_b_part / s).abs())
        } else {
            1.0
        }
    }

    #[test]
    fn normalized_implied_vol_round_trips_call_and_put() {
        let x = 0.182_321_557; // ln(120/100)
        let s = 0.3 * 2.0_f64.sqrt();
        let call_beta = crate::black::normalized_black_call::<DefaultSpecialFn>(x, s);
        let recovered =
            normalized_implied_vol::<DefaultSpecialFn>(call_beta, x, OptionType::Call).unwrap();
        assert!((recovered - s).abs() / s < 1e-9, "recovered={recovered}, s={s}");

        let put_beta = call_beta - ((0.5 * x).exp() - (-0.5 * x).exp());
        let recovered_put =
            normalized_implied_vol::<DefaultSpecialFn>(put_beta, x, OptionType::Put).unwrap();
        assert!((recovered_put - s).abs() / s < 1e-9);
    }

    #[test]
    fn normalized_implied_vol_atm_matches_erfinv() {
        let beta = 0.05;
        let s = normalized_implied_vol::<DefaultSpecialFn>(beta, 0.0, OptionType::Call).unwrap();
        assert!((implied_normalized_volatility_atm::<DefaultSpecialFn>(beta) - s).abs() < 1e-15);
    }

    #[test]
    fn normalized_implied_vol_rejects_above_maximum() {
        let x = 0.2;
        let b_max = (0.5 * x.abs()).exp();
        let err = normalized_implied_vol::<DefaultSpecialFn>(b_max, x, OptionType::Call)
            .unwrap_err();
        assert_eq!(err, ImpliedVolError::AboveMaximum);
    }

    proptest::proptest! {
        #[test]
        fn round_trip_recovers_volatility(
            x in -3.0f64..3.0,
            s in 1e-3f64..3.0,
            is_call in any::<bool>(),
        ) {
            let option_type = if is_call { OptionType::Call } else { OptionType::Put };
            let b = crate::black::normalized_black_call::<DefaultSpecialFn>(x, s);
            let beta = if is_call {
                b
            } else {
                b - ((0.5 * x).exp() - (-0.5 * x).exp())
            };
            if beta <= 0.0 {
                return Ok(());
            }
            let recovered = normalized_implied_vol::<DefaultSpecialFn>(beta, x, option_type);
            if let Ok(recovered) = recovered {
                let attainable =
                    implied_volatility_attainable_accuracy::<DefaultSpecialFn>(x, s).max(1e-10);
                prop_assert!((recovered - s).abs() / s < attainable * 1e3);
            }
        }

        #[test]
        fn put_call_parity_holds(x in -5.0f64..5.0, s in 0.0f64..4.0) {
            let call = crate::black::normalized_black_call::<DefaultSpecialFn>(x, s);
            let put = call - ((0.5 * x).exp() - (-0.5 * x).exp());
            let call_from_put = put + ((0.5 * x).exp() - (-0.5 * x).exp());
            prop_assert!((call - call_from_put).abs() < 1e-12);
        }
    }
}
