use std::time::Duration;

use super::{millis_text, Category, TestElement, MULTI_LEVEL};
use crate::bridge::serializer::{BridgedObject, Field};
use crate::stages::Param;

/// Fixed pause before each sampler in scope.
#[derive(Debug)]
pub struct DslConstantTimer {
    duration: String,
}

impl DslConstantTimer {
    /// `duration` in milliseconds, or an expression.
    pub fn new(duration: &str) -> Self {
        Self {
            duration: duration.to_string(),
        }
    }

    pub fn of(duration: impl Into<Param<Duration>>) -> Self {
        Self {
            duration: millis_text(duration.into()),
        }
    }
}

impl BridgedObject for DslConstantTimer {
    fn type_name(&self) -> &'static str {
        "DslConstantTimer"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::new("duration", &self.duration)]
    }
}

impl TestElement for DslConstantTimer {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}

/// Random pause between `minimum` and `maximum`.
#[derive(Debug)]
pub struct DslUniformRandomTimer {
    minimum: Duration,
    maximum: Duration,
}

impl DslUniformRandomTimer {
    pub fn new(minimum: Duration, maximum: Duration) -> Self {
        Self { minimum, maximum }
    }
}

impl BridgedObject for DslUniformRandomTimer {
    fn type_name(&self) -> &'static str {
        "DslUniformRandomTimer"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![
            Field::new("minimum", self.minimum),
            Field::new("maximum", self.maximum),
        ]
    }
}

impl TestElement for DslUniformRandomTimer {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}

/// Holds threads until all of them reach it, then releases them together.
#[derive(Debug, Default)]
pub struct DslSynchronizingTimer;

impl BridgedObject for DslSynchronizingTimer {
    fn type_name(&self) -> &'static str {
        "DslSynchronizingTimer"
    }

    fn fields(&self) -> Vec<Field<'_>> {
        vec![]
    }
}

impl TestElement for DslSynchronizingTimer {
    fn categories(&self) -> &'static [Category] {
        MULTI_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::serializer::to_yaml_string;

    #[test]
    fn test_uniform_random_timer_encodes_durations() {
        let timer = DslUniformRandomTimer::new(Duration::from_secs(1), Duration::from_millis(1500));
        let yaml = to_yaml_string(&timer).unwrap();
        assert!(yaml.starts_with("!uniformRandomTimer"));
        assert!(yaml.contains("minimum: PT1S"));
        assert!(yaml.contains("maximum: PT1.500S"));
    }

    #[test]
    fn test_constant_timer_from_duration() {
        assert_eq!(DslConstantTimer::of(Duration::from_secs(3)).duration, "3000");
        assert_eq!(DslConstantTimer::of("${PAUSE}").duration, "${PAUSE}");
    }

    #[test]
    fn test_synchronizing_timer_has_empty_body() {
        let yaml = to_yaml_string(&DslSynchronizingTimer).unwrap();
        assert!(yaml.starts_with("!synchronizingTimer"));
    }
}
