//! # Thread Profile Stages
//!
//! A thread group's concurrency profile is an ordered list of stages built
//! through [`StageProfile::ramp_to`], [`StageProfile::hold_for`] and
//! [`StageProfile::hold_iterating`]. Each call validates the list right away
//! so an impossible profile is rejected at the offending call; [`compile`]
//! re-checks the whole list before it is handed to the serializer.
//!
//! Counts, durations and iterations may be literals or engine-side
//! expressions (e.g. `${__P(THREADS,10)}`). Expressions are only accepted in
//! a short list of simple shapes:
//!
//! - a single stage
//! - two stages where the first one has zero threads or both have the same
//!   thread count
//! - three stages where the first one has zero threads and the last two have
//!   the same thread count
//!
//! [`compile`]: StageProfile::compile

use std::fmt;
use std::time::Duration;

use crate::bridge::serializer::{BridgedObject, Field, WireValue};
use crate::error::{DslError, Result};

/// A literal value or an expression evaluated by the engine at run time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param<T> {
    Value(T),
    Expression(String),
}

impl<T> Param<T> {
    pub fn is_expression(&self) -> bool {
        matches!(self, Param::Expression(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Param::Value(v) => Some(v),
            Param::Expression(_) => None,
        }
    }
}

impl Param<u32> {
    /// Expressions are never considered zero.
    pub fn is_zero(&self) -> bool {
        matches!(self, Param::Value(0))
    }
}

impl Param<Duration> {
    pub fn is_zero(&self) -> bool {
        matches!(self, Param::Value(d) if d.is_zero())
    }
}

impl From<u32> for Param<u32> {
    fn from(value: u32) -> Self {
        Param::Value(value)
    }
}

/// Negative literals clamp to zero.
impl From<i32> for Param<u32> {
    fn from(value: i32) -> Self {
        Param::Value(u32::try_from(value).unwrap_or(0))
    }
}

impl From<Duration> for Param<Duration> {
    fn from(value: Duration) -> Self {
        Param::Value(value)
    }
}

impl<T> From<&str> for Param<T> {
    fn from(value: &str) -> Self {
        Param::Expression(value.to_string())
    }
}

impl<T> From<String> for Param<T> {
    fn from(value: String) -> Self {
        Param::Expression(value)
    }
}

impl<T: fmt::Debug> fmt::Display for Param<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Value(v) => write!(f, "{:?}", v),
            Param::Expression(e) => write!(f, "{}", e),
        }
    }
}

impl<'a> From<&'a Param<u32>> for WireValue<'a> {
    fn from(param: &'a Param<u32>) -> Self {
        match param {
            Param::Value(v) => WireValue::from(*v),
            Param::Expression(e) => WireValue::from(e),
        }
    }
}

impl<'a> From<&'a Param<Duration>> for WireValue<'a> {
    fn from(param: &'a Param<Duration>) -> Self {
        match param {
            Param::Value(v) => WireValue::from(*v),
            Param::Expression(e) => WireValue::from(e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageKind {
    Ramp { duration: Param<Duration> },
    Hold { duration: Param<Duration> },
    HoldIterating { iterations: Param<u32> },
}

/// One segment of a concurrency profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    thread_count: Param<u32>,
    kind: StageKind,
}

impl Stage {
    pub fn thread_count(&self) -> &Param<u32> {
        &self.thread_count
    }

    pub fn kind(&self) -> &StageKind {
        &self.kind
    }

    pub fn duration(&self) -> Option<&Param<Duration>> {
        match &self.kind {
            StageKind::Ramp { duration } | StageKind::Hold { duration } => Some(duration),
            StageKind::HoldIterating { .. } => None,
        }
    }

    pub fn iterations(&self) -> Option<&Param<u32>> {
        match &self.kind {
            StageKind::HoldIterating { iterations } => Some(iterations),
            _ => None,
        }
    }

    fn has_expressions(&self) -> bool {
        self.thread_count.is_expression()
            || self.duration().map_or(false, Param::is_expression)
            || self.iterations().map_or(false, Param::is_expression)
    }
}

impl BridgedObject for Stage {
    fn type_name(&self) -> &'static str {
        match self.kind {
            StageKind::Ramp { .. } => "RampTo",
            StageKind::Hold { .. } => "HoldFor",
            StageKind::HoldIterating { .. } => "HoldIterating",
        }
    }

    fn tag(&self) -> Option<&'static str> {
        Some(match self.kind {
            StageKind::Ramp { .. } => "rampTo",
            StageKind::Hold { .. } => "holdFor",
            StageKind::HoldIterating { .. } => "holdIterating",
        })
    }

    fn fields(&self) -> Vec<Field<'_>> {
        match &self.kind {
            StageKind::Ramp { duration } => vec![
                Field::new("threadCount", &self.thread_count),
                Field::new("duration", duration),
            ],
            StageKind::Hold { duration } => vec![Field::new("duration", duration)],
            StageKind::HoldIterating { iterations } => vec![Field::new("iterations", iterations)],
        }
    }
}

/// Ordered, validated list of stages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageProfile {
    stages: Vec<Stage>,
}

impl StageProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// `threads` threads started at once, each running `iterations` times.
    pub fn fixed_iterations(threads: impl Into<Param<u32>>, iterations: impl Into<Param<u32>>) -> Self {
        let threads = threads.into();
        Self {
            stages: vec![
                Stage {
                    thread_count: threads.clone(),
                    kind: StageKind::Ramp {
                        duration: Param::Value(Duration::ZERO),
                    },
                },
                Stage {
                    thread_count: threads,
                    kind: StageKind::HoldIterating {
                        iterations: iterations.into(),
                    },
                },
            ],
        }
    }

    /// `threads` threads started at once, kept running for `duration`.
    pub fn fixed_duration(threads: impl Into<Param<u32>>, duration: impl Into<Param<Duration>>) -> Self {
        let threads = threads.into();
        Self {
            stages: vec![
                Stage {
                    thread_count: threads.clone(),
                    kind: StageKind::Ramp {
                        duration: Param::Value(Duration::ZERO),
                    },
                },
                Stage {
                    thread_count: threads,
                    kind: StageKind::Hold {
                        duration: duration.into(),
                    },
                },
            ],
        }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Move linearly from the current thread count to `threads` over `duration`.
    pub fn ramp_to(
        &mut self,
        threads: impl Into<Param<u32>>,
        duration: impl Into<Param<Duration>>,
    ) -> Result<()> {
        self.check_not_iterating()?;
        self.push(Stage {
            thread_count: threads.into(),
            kind: StageKind::Ramp {
                duration: duration.into(),
            },
        })
    }

    /// Keep the current thread count (zero on an empty profile) for `duration`.
    pub fn hold_for(&mut self, duration: impl Into<Param<Duration>>) -> Result<()> {
        self.check_not_iterating()?;
        self.push(Stage {
            thread_count: self.current_threads(),
            kind: StageKind::Hold {
                duration: duration.into(),
            },
        })
    }

    /// Let each running thread execute `iterations` times and stop. Terminal.
    pub fn hold_iterating(&mut self, iterations: impl Into<Param<u32>>) -> Result<()> {
        self.check_not_iterating()?;
        let valid_prefix = match self.stages.as_slice() {
            [ramp] => !ramp.thread_count.is_zero(),
            [first, ramp] => first.thread_count.is_zero() && !ramp.thread_count.is_zero(),
            _ => false,
        };
        if !valid_prefix {
            return Err(DslError::InvalidSequence(
                "holding for iterations is only supported after an initial ramp to a non zero \
                 thread count, optionally preceded by a zero threads hold"
                    .to_string(),
            ));
        }
        self.push(Stage {
            thread_count: self.current_threads(),
            kind: StageKind::HoldIterating {
                iterations: iterations.into(),
            },
        })
    }

    /// Validate the full list and return it in order.
    pub fn compile(&self) -> Result<&[Stage]> {
        if let Some(pos) = self
            .stages
            .iter()
            .position(|s| matches!(s.kind, StageKind::HoldIterating { .. }))
        {
            if pos + 1 != self.stages.len() {
                return Err(iterating_not_terminal());
            }
        }
        check_expressions(&self.stages)?;
        Ok(&self.stages)
    }

    fn current_threads(&self) -> Param<u32> {
        self.stages
            .last()
            .map_or(Param::Value(0), |s| s.thread_count.clone())
    }

    fn check_not_iterating(&self) -> Result<()> {
        match self.stages.last() {
            Some(Stage {
                kind: StageKind::HoldIterating { .. },
                ..
            }) => Err(iterating_not_terminal()),
            _ => Ok(()),
        }
    }

    fn push(&mut self, stage: Stage) -> Result<()> {
        self.stages.push(stage);
        if let Err(e) = check_expressions(&self.stages) {
            self.stages.pop();
            return Err(e);
        }
        Ok(())
    }
}

fn iterating_not_terminal() -> DslError {
    DslError::InvalidSequence(
        "ramping/holding after holding for iterations is not supported".to_string(),
    )
}

fn is_simple_shape(stages: &[Stage]) -> bool {
    match stages {
        [] | [_] => true,
        [first, second] => {
            first.thread_count.is_zero() || first.thread_count == second.thread_count
        }
        [first, second, third] => {
            first.thread_count.is_zero() && second.thread_count == third.thread_count
        }
        _ => false,
    }
}

fn check_expressions(stages: &[Stage]) -> Result<()> {
    if !is_simple_shape(stages) && stages.iter().any(Stage::has_expressions) {
        return Err(DslError::UnsupportedProfile(
            "expressions are only supported in profiles with a single ramp, a ramp and hold, \
             or an initial zero threads stage followed by a ramp and hold"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_ramp_hold_ramp_down() {
        let mut profile = StageProfile::new();
        profile.ramp_to(10, secs(10)).unwrap();
        profile.hold_for(secs(10)).unwrap();
        profile.ramp_to(0, secs(5)).unwrap();

        let stages = profile.compile().unwrap();
        assert_eq!(stages.len(), 3);
        let counts: Vec<_> = stages.iter().map(|s| s.thread_count().clone()).collect();
        assert_eq!(counts, vec![Param::Value(10), Param::Value(10), Param::Value(0)]);
        assert!(matches!(stages[0].kind(), StageKind::Ramp { .. }));
        assert!(matches!(stages[1].kind(), StageKind::Hold { .. }));
        assert!(matches!(stages[2].kind(), StageKind::Ramp { .. }));
        assert!(stages.iter().all(|s| !s.duration().unwrap().is_zero()));
    }

    #[test]
    fn test_hold_on_empty_profile_uses_zero_threads() {
        let mut profile = StageProfile::new();
        profile.hold_for(secs(3)).unwrap();
        assert!(profile.stages()[0].thread_count().is_zero());
    }

    #[test]
    fn test_hold_iterating_on_empty_profile_fails() {
        let mut profile = StageProfile::new();
        assert!(matches!(
            profile.hold_iterating(5),
            Err(DslError::InvalidSequence(_))
        ));
    }

    #[test]
    fn test_hold_iterating_with_zero_threads_fails() {
        let mut profile = StageProfile::new();
        profile.ramp_to(0, secs(1)).unwrap();
        assert!(matches!(
            profile.hold_iterating(5),
            Err(DslError::InvalidSequence(_))
        ));
    }

    #[test]
    fn test_hold_iterating_after_initial_delay_and_ramp() {
        let mut profile = StageProfile::new();
        profile.hold_for(secs(5)).unwrap();
        profile.ramp_to(4, secs(2)).unwrap();
        profile.hold_iterating(10).unwrap();
        let stages = profile.compile().unwrap();
        assert_eq!(stages[2].iterations(), Some(&Param::Value(10)));
        assert_eq!(stages[2].thread_count(), &Param::Value(4));
    }

    #[test]
    fn test_hold_iterating_after_long_profile_fails() {
        let mut profile = StageProfile::new();
        profile.ramp_to(4, secs(2)).unwrap();
        profile.hold_for(secs(2)).unwrap();
        assert!(profile.hold_iterating(3).is_err());
    }

    #[test]
    fn test_ramp_after_hold_iterating_fails() {
        let mut profile = StageProfile::fixed_iterations(2, 3);
        let err = profile.ramp_to(5, secs(1)).unwrap_err();
        assert!(err.to_string().contains("after holding for iterations"));
        assert!(matches!(profile.hold_for(secs(1)), Err(DslError::InvalidSequence(_))));
        assert_eq!(profile.stages().len(), 2);
    }

    #[test]
    fn test_fixed_duration_shortcut() {
        let profile = StageProfile::fixed_duration(3, secs(30));
        let stages = profile.compile().unwrap();
        assert_eq!(stages.len(), 2);
        assert!(stages[0].duration().unwrap().is_zero());
        assert_eq!(stages[1].duration(), Some(&Param::Value(secs(30))));
    }

    #[test]
    fn test_expressions_in_simple_shapes() {
        let mut profile = StageProfile::new();
        profile.ramp_to("${__P(THREADS,5)}", secs(10)).unwrap();
        profile.hold_for("${__P(HOLD,PT1M)}").unwrap();
        assert!(profile.compile().is_ok());

        let mut delayed = StageProfile::new();
        delayed.hold_for(secs(5)).unwrap();
        delayed.ramp_to("${THREADS}", secs(1)).unwrap();
        delayed.hold_for(secs(5)).unwrap();
        assert!(delayed.compile().is_ok());
    }

    #[test]
    fn test_expressions_in_complex_shape_are_rejected_and_reverted() {
        let mut profile = StageProfile::new();
        profile.ramp_to("${THREADS}", secs(10)).unwrap();
        profile.hold_for(secs(10)).unwrap();
        let err = profile.ramp_to(0, secs(5)).unwrap_err();
        assert!(matches!(err, DslError::UnsupportedProfile(_)));
        assert_eq!(profile.stages().len(), 2);
    }

    #[test]
    fn test_literal_complex_shapes_are_allowed() {
        let mut profile = StageProfile::new();
        for (threads, secs_) in [(5, 10), (10, 10), (2, 5), (8, 5)] {
            profile.ramp_to(threads, secs(secs_)).unwrap();
            profile.hold_for(secs(secs_)).unwrap();
        }
        assert_eq!(profile.compile().unwrap().len(), 8);
    }

    #[test]
    fn test_stage_wire_fields() {
        let mut profile = StageProfile::new();
        profile.ramp_to(10, secs(10)).unwrap();
        profile.hold_for(secs(20)).unwrap();
        let stages = profile.compile().unwrap();
        let names: Vec<_> = stages[0].fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["threadCount", "duration"]);
        let names: Vec<_> = stages[1].fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["duration"]);
        assert_eq!(stages[1].tag(), Some("holdFor"));
    }
}
