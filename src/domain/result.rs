//! Result type alias for Phenoscribe

use super::errors::PhenoscribeError;

/// Result type alias for Phenoscribe operations
///
/// # Examples
///
/// ```
/// use phenoscribe::domain::result::Result;
/// use phenoscribe::domain::errors::PhenoscribeError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PhenoscribeError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PhenoscribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
