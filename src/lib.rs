//! Safe, ergonomic builders for Black-76 option pricing and implied Black volatility.
//!
//! This crate exposes builders for computing:
//! - undiscounted European option prices under the **Black-76** model, and
//! - the implied **Black** volatility of an observed option price.
//!
//! Implied-volatility inversion uses Peter Jäckel's "Let's Be Rational" algorithm: a
//! branch-wise rational-cubic initial guess followed by at most two steps of third- (or,
//! in the extreme wings, fourth-) order Householder iteration, guaranteeing machine-epsilon
//! accuracy in closed, bounded iteration count.
//!
//! # Getting started
//!
//! Add the crate to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! black-rational-iv = "0.1.0"
//! ```
//!
//! To enable aggressive fused-multiply-add optimizations (when available), enable the
//! `fma` feature in `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! black-rational-iv = { version = "0.1.0", features = ["fma"] }
//! ```
//!
//! # Models and notation
//!
//! Let `BS(F, K, T, σ, q)` denote the undiscounted Black-76 price of a European option with
//! sign `q` (call or put), where:
//! - `F`: forward price (underlying), `0 < F < ∞`,
//! - `K`: strike price, `0 < K < ∞`,
//! - `T`: time to expiry, `0 ≤ T < ∞`,
//! - `σ`: volatility, `0 ≤ σ < ∞`.
//!
//! Given `F`, `K`, `T` and an observed option price `P`, the **implied Black volatility** is
//! the value `σ` such that `BS(F, K, T, σ, q) = P` — the inverse of `BS` with respect to `σ`.
//!
//! # Usage and error handling
//!
//! The crate provides builder types that validate inputs at construction time and then
//! expose a `calculate()` method for performing the computation.
//!
//! - `build()` performs input validation and returns `Option<...>`; it yields `None` when
//!   the supplied parameters are outside the mathematical domain of the target function.
//! - `build_unchecked()` constructs the object without validation, for callers who prefer
//!   to do their own checks or avoid the runtime cost.
//!
//! `PriceBlackScholes::calculate()` returns `f64`. `ImpliedBlackVolatility::calculate()`
//! returns `Result<f64, ImpliedVolError>`, failing only when the observed price lies below
//! intrinsic value or at/above the model's asymptotic maximum.
//!
//! ## Special functions
//!
//! Some algorithms require special mathematical functions (`erf`, `Φ`, `Φ⁻¹`, ...). Those
//! are abstracted behind the `SpecialFn` trait. The crate provides a default implementation
//! named `DefaultSpecialFn` (Cody's rational Chebyshev approximations and Wichura's AS 241).
//! Implement `SpecialFn` yourself to swap in a different numerical backend and call
//! `calculate::<YourSpecialFn>()`.
//!
//! ## `PriceBlackScholes` (example)
//!
//! ```rust
//! use black_rational_iv::{DefaultSpecialFn, OptionType, PriceBlackScholes};
//!
//! let builder = PriceBlackScholes::builder()
//!     .forward(100.0)
//!     .strike(100.0)
//!     .volatility(0.2)
//!     .expiry(1.0)
//!     .option_type(OptionType::Call);
//!
//! let price_builder = builder.build();
//! assert!(price_builder.is_some());
//! let price = price_builder.unwrap().calculate::<DefaultSpecialFn>();
//! assert!(price.is_finite());
//!
//! // Skip validation:
//! let price_builder = PriceBlackScholes::builder()
//!     .forward(100.0)
//!     .strike(100.0)
//!     .volatility(0.2)
//!     .expiry(1.0)
//!     .option_type(OptionType::Call)
//!     .build_unchecked();
//! let price = price_builder.calculate::<DefaultSpecialFn>();
//! assert!(price.is_finite());
//!
//! // Invalid inputs -> build() returns None
//! let invalid = PriceBlackScholes::builder()
//!     .forward(f64::INFINITY) // invalid forward
//!     .strike(100.0)
//!     .volatility(0.2)
//!     .expiry(1.0)
//!     .option_type(OptionType::Call)
//!     .build();
//! assert!(invalid.is_none());
//! ```
//!
//! ## `ImpliedBlackVolatility` (example)
//!
//! ```rust
//! use black_rational_iv::{DefaultSpecialFn, ImpliedBlackVolatility, OptionType};
//!
//! // Valid inputs -> build() returns Some(...), calculate() may return Ok(σ).
//! let builder = ImpliedBlackVolatility::builder()
//!     .option_price(10.0)
//!     .forward(100.0)
//!     .strike(100.0)
//!     .expiry(1.0)
//!     .option_type(OptionType::Call);
//!
//! let iv_builder = builder.build();
//! assert!(iv_builder.is_some());
//! let sigma = iv_builder.unwrap().calculate::<DefaultSpecialFn>();
//! assert!(sigma.is_ok());
//!
//! // Skip validation:
//! let sigma = ImpliedBlackVolatility::builder()
//!     .option_price(10.0)
//!     .forward(100.0)
//!     .strike(100.0)
//!     .expiry(1.0)
//!     .option_type(OptionType::Call)
//!     .build_unchecked()
//!     .calculate::<DefaultSpecialFn>();
//! assert!(sigma.is_ok());
//!
//! // If model parameters are invalid -> build() returns None
//! let invalid_builder = ImpliedBlackVolatility::builder()
//!     .option_price(10.0)
//!     .forward(f64::INFINITY) // invalid forward
//!     .strike(100.0)
//!     .expiry(1.0)
//!     .option_type(OptionType::Call)
//!     .build();
//! assert!(invalid_builder.is_none());
//!
//! // If the option price is outside the attainable range, calculate() returns an error.
//! let out_of_range = ImpliedBlackVolatility::builder()
//!     .option_price(110.0) // too large for F=100,K=100
//!     .forward(100.0)
//!     .strike(100.0)
//!     .expiry(1.0)
//!     .option_type(OptionType::Call)
//!     .build()
//!     .unwrap()
//!     .calculate::<DefaultSpecialFn>();
//! assert!(out_of_range.is_err());
//! ```
//!
//! ## Normalized coordinates
//!
//! For callers already working in Jäckel's normalized coordinates (`x = ln(F/K)`,
//! `s = σ√T`, `β = price / √(FK)`), the underlying pure functions are exposed directly,
//! without the builder layer or intrinsic-value handling:
//!
//! ```rust
//! use black_rational_iv::{normalized_black_call, normalized_implied_vol, normalized_vega, DefaultSpecialFn, OptionType};
//!
//! let x = 0.0_f64;
//! let s = 0.2_f64;
//! let beta = normalized_black_call::<DefaultSpecialFn>(x, s);
//! let vega = normalized_vega(x, s);
//! assert!(vega > 0.0);
//!
//! let recovered = normalized_implied_vol::<DefaultSpecialFn>(beta, x, OptionType::Call).unwrap();
//! assert!((recovered - s).abs() < 1e-9);
//! ```
mod black;
mod builder;
mod constants;
mod error;
mod fused_multiply_add;
mod householder;
mod lets_be_rational;
mod option_type;
mod rational_cubic;
mod special_function;

pub use crate::black::{black, intrinsic_value, normalized_black_call, normalized_vega};
pub use crate::lets_be_rational::{implied_black_volatility, normalized_implied_vol};
pub use builder::*;
pub use error::ImpliedVolError;
pub use option_type::OptionType;
pub use special_function::{DefaultSpecialFn, SpecialFn};
