use crate::black;
use crate::option_type::OptionType;
use crate::special_function::SpecialFn;
use bon::Builder;

/// A struct representing the parameters required for calculating the price of an option
/// under the Black-Scholes (Black-76) model.
///
/// # Example
/// ```rust
/// use black_rational_iv::{OptionType, PriceBlackScholes};
///
/// let option_params = PriceBlackScholes::builder()
///     .forward(100.0)
///     .strike(95.0)
///     .volatility(0.2)
///     .expiry(1.0)
///     .option_type(OptionType::Call)
///     .build()
///     .unwrap();
/// ```
#[derive(Builder)]
#[builder(derive(Clone, Debug))]
#[builder(finish_fn(vis = "", name = build_internal))]
pub struct PriceBlackScholes {
    forward: f64,
    strike: f64,
    volatility: f64,
    expiry: f64,
    option_type: OptionType,
}

impl<S: price_black_scholes_builder::IsComplete> PriceBlackScholesBuilder<S> {
    pub fn build(self) -> Option<PriceBlackScholes> {
        let price_black_scholes = self.build_internal();
        if !price_black_scholes.forward.is_finite() {
            return None;
        }
        if !price_black_scholes.strike.is_finite() {
            return None;
        }
        if matches!(
            price_black_scholes.volatility.partial_cmp(&0.0),
            Some(std::cmp::Ordering::Less) | None
        ) {
            return None;
        }
        if matches!(
            price_black_scholes.expiry.partial_cmp(&0.0),
            Some(std::cmp::Ordering::Less) | None
        ) {
            return None;
        }
        Some(price_black_scholes)
    }
    pub fn build_unchecked(self) -> PriceBlackScholes {
        self.build_internal()
    }
}

impl PriceBlackScholes {
    #[must_use]
    #[inline(always)]
    pub fn calculate<SpFn: SpecialFn>(&self) -> f64 {
        black::black::<SpFn>(
            self.forward,
            self.strike,
            self.volatility,
            self.expiry,
            self.option_type,
        )
    }
}
