//! Constant value source.

use template_core::{GeneratedValue, ReadError, ValueSource};

/// Source returning the same value on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSource {
    value: GeneratedValue,
}

impl DefaultSource {
    pub fn new(value: GeneratedValue) -> Self {
        Self { value }
    }
}

impl ValueSource for DefaultSource {
    fn produce_one(&mut self) -> Result<GeneratedValue, ReadError> {
        Ok(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_returns_constant() {
        let mut source = DefaultSource::new(GeneratedValue::String("fixed".to_string()));
        for _ in 0..3 {
            assert_eq!(
                source.produce_one(),
                Ok(GeneratedValue::String("fixed".to_string()))
            );
        }
    }
}
