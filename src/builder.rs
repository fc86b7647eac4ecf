mod implied_black_volatility;
mod price_black_scholes;

pub use implied_black_volatility::ImpliedBlackVolatility;
pub use price_black_scholes::PriceBlackScholes;
