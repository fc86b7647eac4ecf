/// Domain errors produced when inverting Black's formula for an observed price.
///
/// These are the only two failure modes: every other numerical edge case (underflow of
/// `b` or `v`, bracket collapse, the degenerate inflection at `x = 0`) is recovered
/// internally by the inversion engine and never reaches the caller.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpliedVolError {
    /// The observed price is strictly below the option's intrinsic value: `price < max(q·(F−K), 0)`.
    #[error("option price is below intrinsic value")]
    BelowIntrinsic,
    /// The observed price is at or above the model's asymptotic upper bound (`F` for calls, `K` for puts).
    #[error("option price is at or above the attainable maximum")]
    AboveMaximum,
}
