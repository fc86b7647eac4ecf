pub const SQRT_PI_OVER_TWO: f64 = f64::from_bits(0x3ff4_0d93_1ff6_2705);
pub const SQRT_TWO_PI: f64 = f64::from_bits(0x4004_0d93_1ff6_2705);
pub const SQRT_THREE: f64 = f64::from_bits(0x3ffb_b67a_e858_4caa);
pub const SQRT_TWO_OVER_PI: f64 = f64::from_bits(0x3fe9_8845_33d4_3651);
pub const ONE_OVER_SQRT_THREE: f64 = f64::from_bits(0x3fe2_79a7_4590_331d);
pub const TWO_PI_OVER_SQRT_TWENTY_SEVEN: f64 = f64::from_bits(0x3ff3_58e1_a79e_d7e1);
pub const SQRT_THREE_OVER_THIRD_ROOT_TWO_PI: f64 = f64::from_bits(0x3fee_095e_1123_53f7);
pub const SIXTEENTH_ROOT_DBL_EPSILON: f64 = f64::from_bits(0x3fba_e89f_995a_d3ad);

pub const SQRT_DBL_MAX: f64 = f64::from_bits(0x5fef_ffff_ffff_ffff);
pub const ONE_OVER_SQRT_TWO_PI: f64 = f64::from_bits(0x3fd9_8845_33d4_3651);
pub const HALF_OF_LN_TWO_PI: f64 = f64::from_bits(0x3fed_67f1_c864_beb4);
