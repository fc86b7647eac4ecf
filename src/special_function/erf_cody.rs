//! Cody's rational Chebyshev approximations for erf, erfc and erfcx.
//!
//! W. J. Cody, "Rational Chebyshev approximations for the error function",
//! Math. Comp. 23 (1969), 631-637. The coefficient tables and thresholds are
//! part of the public ABI (cross-implementation bit parity) and must not be
//! touched casually.

const A: [f64; 5] = [
    3.1611237438705656,
    113.864154151050156,
    377.485237685302021,
    3209.37758913846947,
    0.185777706184603153,
];
const B: [f64; 4] = [
    23.6012909523441209,
    244.024637934444173,
    1282.61652607737228,
    2844.23683343917062,
];
const C: [f64; 9] = [
    0.564188496988670089,
    8.88314979438837594,
    66.1191906371416295,
    298.635138197400131,
    881.95222124176909,
    1712.04761263407058,
    2051.07837782607147,
    1230.33935479799725,
    2.15311535474403846e-8,
];
const D: [f64; 8] = [
    15.7449261107098347,
    117.693950891312499,
    537.181101862009858,
    1621.38957456669019,
    3290.79923573345963,
    4362.61909014324716,
    3439.36767414372164,
    1230.33935480374942,
];
const P: [f64; 6] = [
    0.305326634961232344,
    0.360344899949804439,
    0.125781726111229246,
    0.0160837851487422766,
    6.58749161529837803e-4,
    0.0163153871373020978,
];
const Q: [f64; 5] = [
    2.56852019228982242,
    1.87295284992346047,
    0.527905102951428412,
    0.0605183413124413191,
    0.00233520497626869185,
];

const SQRPI: f64 = 0.56418958354775628695;
const THRESH: f64 = 0.46875;
const SIXTEN: f64 = 16.0;
const XINF: f64 = 1.79e308;
const XNEG: f64 = -26.628;
const XSMALL: f64 = 1.11e-16;
const XBIG: f64 = 26.543;
const XHUGE: f64 = 6.71e7;
const XMAX: f64 = 2.53e307;

/// Computes erf, erfc or `erfc(x)·exp(x²)` depending on `jint` (0, 1, 2 respectively).
///
/// Kept private: the three public functions below share this kernel so the selector
/// is never part of the crate's API.
fn calerf(x: f64, jint: i32) -> f64 {
    let y = x.abs();
    let mut ysq = 0.0;
    let mut xden;
    let mut xnum;
    let mut result = 0.0;

    if y <= THRESH {
        if y > XSMALL {
            ysq = y * y;
        }
        xnum = A[4] * ysq;
        xden = ysq;

        for i in 0..3 {
            xnum = (xnum + A[i]) * ysq;
            xden = (xden + B[i]) * ysq;
        }
        result = x * (xnum + A[3]) / (xden + B[3]);

        if jint != 0 {
            result = 1.0 - result;
        }
        if jint == 2 {
            result *= ysq.exp();
        }
        return result;
    } else if y <= 4.0 {
        xnum = C[8] * y;
        xden = y;

        for i in 0..7 {
            xnum = (xnum + C[i]) * y;
            xden = (xden + D[i]) * y;
        }
        result = (xnum + C[7]) / (xden + D[7]);

        if jint != 2 {
            ysq = (y * SIXTEN).trunc() / SIXTEN;
            let del = (y - ysq) * (y + ysq);
            result *= (-ysq * ysq).exp() * (-del).exp();
        }
    } else {
        if y >= XBIG {
            if jint != 2 || y >= XMAX {
                return fix_up(x, jint, result);
            } else if y >= XHUGE {
                result = SQRPI / y;
                return fix_up(x, jint, result);
            }
        } else {
            ysq = 1.0 / (y * y);
            xnum = P[5] * ysq;
            xden = ysq;

            for i in 0..4 {
                xnum = (xnum + P[i]) * ysq;
                xden = (xden + Q[i]) * ysq;
            }
            result = ysq * (xnum + P[4]) / (xden + Q[4]);
            result = (SQRPI - result) / y;

            if jint != 2 {
                ysq = (y * SIXTEN).trunc() / SIXTEN;
                let del = (y - ysq) * (y + ysq);
                result = ((-ysq * ysq).exp() * (-del).exp()) * result;
            }
        }
    }
    fix_up(x, jint, result)
}

fn fix_up(x: f64, jint: i32, result: f64) -> f64 {
    let mut result = result;
    if jint == 0 {
        result = (0.5 - result) + 0.5;
        if x < 0.0 {
            result = -result;
        }
    } else if jint == 1 {
        if x < 0.0 {
            result = 2.0 - result;
        }
    } else if x < 0.0 {
        if x < XNEG {
            result = XINF;
        } else {
            let ysq = (x * SIXTEN).trunc() / SIXTEN;
            let del = (x - ysq) * (x + ysq);
            let y = (ysq * ysq).exp() * del.exp();
            result = (y + y) - result;
        }
    }
    result
}

#[inline(always)]
pub(crate) fn erf_cody(x: f64) -> f64 {
    calerf(x, 0)
}

#[inline(always)]
pub(crate) fn erfc_cody(x: f64) -> f64 {
    calerf(x, 1)
}

#[inline(always)]
pub(crate) fn erfcx_cody(x: f64) -> f64 {
    calerf(x, 2)
}
