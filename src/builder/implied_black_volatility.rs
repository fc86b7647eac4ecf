use crate::error::ImpliedVolError;
use crate::lets_be_rational;
use crate::option_type::OptionType;
use crate::special_function::SpecialFn;
use bon::Builder;

#[derive(Builder)]
#[builder(derive(Clone, Debug))]
#[builder(finish_fn(vis = "", name = build_internal))]
pub struct ImpliedBlackVolatility {
    forward: f64,
    strike: f64,
    expiry: f64,
    option_type: OptionType,
    option_price: f64,
}

impl<S: implied_black_volatility_builder::IsComplete> ImpliedBlackVolatilityBuilder<S> {
    pub fn build(self) -> Option<ImpliedBlackVolatility> {
        let implied_black_volatility = self.build_internal();

        if matches!(
            implied_black_volatility.forward.partial_cmp(&0.0),
            Some(std::cmp::Ordering::Less) | None
        ) || implied_black_volatility.forward.is_infinite()
        {
            return None;
        }
        if matches!(
            implied_black_volatility.strike.partial_cmp(&0.0),
            Some(std::cmp::Ordering::Less) | None
        ) || implied_black_volatility.strike.is_infinite()
        {
            return None;
        }
        if matches!(
            implied_black_volatility.expiry.partial_cmp(&0.0),
            Some(std::cmp::Ordering::Less) | None
        ) {
            return None;
        }
        if matches!(
            implied_black_volatility.option_price.partial_cmp(&0.0),
            Some(std::cmp::Ordering::Less) | None
        ) || implied_black_volatility.option_price.is_infinite()
        {
            return None;
        }
        Some(implied_black_volatility)
    }

    pub fn build_unchecked(self) -> ImpliedBlackVolatility {
        self.build_internal()
    }
}

impl ImpliedBlackVolatility {
    /// # Errors
    /// See [`ImpliedVolError`].
    #[inline(always)]
    pub fn calculate<SpFn: SpecialFn>(&self) -> Result<f64, ImpliedVolError> {
        lets_be_rational::implied_black_volatility::<SpFn>(
            self.option_price,
            self.forward,
            self.strike,
            self.expiry,
            self.option_type,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::implied_black_volatility::ImpliedBlackVolatility;
    use crate::error::ImpliedVolError;
    use crate::option_type::OptionType;
    use crate::special_function::DefaultSpecialFn;

    #[test]
    fn strike_anomaly() {
        for k in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(
                ImpliedBlackVolatility::builder()
                    .option_price(100.0)
                    .forward(100.0)
                    .strike(k)
                    .expiry(1.0)
                    .option_type(OptionType::Call)
                    .build()
                    .is_none()
            );
        }
    }

    #[test]
    fn forward_anomaly() {
        for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(
                ImpliedBlackVolatility::builder()
                    .option_price(100.0)
                    .forward(f)
                    .strike(100.0)
                    .expiry(1.0)
                    .option_type(OptionType::Call)
                    .build()
                    .is_none()
            );
        }
    }

    #[test]
    fn price_anomaly() {
        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(
                ImpliedBlackVolatility::builder()
                    .option_price(price)
                    .forward(100.0)
                    .strike(100.0)
                    .expiry(1.0)
                    .option_type(OptionType::Call)
                    .build()
                    .is_none()
            );
        }
    }

    #[test]
    fn time_anomaly() {
        for t in [f64::NAN, f64::NEG_INFINITY] {
            assert!(
                ImpliedBlackVolatility::builder()
                    .option_price(10.0)
                    .forward(100.0)
                    .strike(100.0)
                    .expiry(t)
                    .option_type(OptionType::Call)
                    .build()
                    .is_none()
            );
        }
    }

    #[test]
    fn time_inf() {
        let vol = ImpliedBlackVolatility::builder()
            .option_price(10.0)
            .forward(100.0)
            .strike(100.0)
            .expiry(f64::INFINITY)
            .option_type(OptionType::Call)
            .build()
            .unwrap()
            .calculate::<DefaultSpecialFn>()
            .unwrap();
        assert_eq!(vol, 0.0);
    }

    #[test]
    fn out_of_range_price_is_rejected() {
        let err = ImpliedBlackVolatility::builder()
            .option_price(110.0)
            .forward(100.0)
            .strike(100.0)
            .expiry(1.0)
            .option_type(OptionType::Call)
            .build()
            .unwrap()
            .calculate::<DefaultSpecialFn>()
            .unwrap_err();
        assert_eq!(err, ImpliedVolError::AboveMaximum);
    }
}
