use std::error::Error as StdError;

/// Maps solver iterates to model inputs and model outputs back to iterates.
///
/// The solver owns the iterate `x`, a flat vector of `f64`. The problem turns
/// it into a model input, and after the model runs, extracts the updated
/// iterate `g(x)` from the input/output pair. A fixed point is reached when
/// `g(x) ≈ x`.
pub trait FixedPointProblem {
    type Input;
    type Output;
    type InputError: StdError + Send + Sync + 'static;
    type UpdateError: StdError + Send + Sync + 'static;

    /// Builds the model input for iterate `x`.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` cannot be mapped to a valid input.
    fn input(&self, x: &[f64]) -> Result<Self::Input, Self::InputError>;

    /// Extracts the updated iterate from a model evaluation.
    ///
    /// # Errors
    ///
    /// Returns an error if the update cannot be computed.
    fn update(
        &self,
        input: &Self::Input,
        output: &Self::Output,
    ) -> Result<Vec<f64>, Self::UpdateError>;
}
