//! Mutable test state threaded through property evaluation.

use crate::data::{Prng, Seed, Size};
use crate::error::{PropcheckError, Result};
use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// The driver phase a property is being evaluated in.
///
/// Generate draws fresh values; StartShrink replays recorded values and
/// collects their shrink sequences; Shrink replays candidate values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Generate,
    StartShrink,
    Shrink,
}

/// Outcome of one property evaluation.
///
/// Failure is not an outcome; it travels on the error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Discard,
}

/// A property evaluation result: the outcome plus the computed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample<T> {
    pub outcome: Outcome,
    pub value: T,
}

impl<T> Sample<T> {
    /// A successful evaluation.
    pub fn success(value: T) -> Self {
        Sample {
            outcome: Outcome::Success,
            value,
        }
    }

    /// A discarded evaluation.
    pub fn discard(value: T) -> Self {
        Sample {
            outcome: Outcome::Discard,
            value,
        }
    }

    /// Did the evaluation succeed?
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }
}

/// A recorded draw: the type-erased value and its rendering.
///
/// Each draw site has a fixed type, so a runtime tag plus downcast is
/// enough to replay values; the rendering doubles as the reported
/// counterexample text and as the identity the driver compares shrink
/// candidates against.
#[derive(Clone)]
pub struct Recorded {
    value: Rc<dyn Any>,
    text: String,
}

impl Recorded {
    /// Record a value along with its `Debug` rendering.
    pub fn new<T>(value: T) -> Self
    where
        T: fmt::Debug + 'static,
    {
        Recorded {
            text: format!("{value:?}"),
            value: Rc::new(value),
        }
    }

    /// Recover the value at its recorded type.
    pub fn downcast<T>(&self) -> Option<T>
    where
        T: Clone + 'static,
    {
        self.value.downcast_ref::<T>().cloned()
    }

    /// The recorded rendering.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for Recorded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// The mutable envelope threaded through property evaluation.
///
/// One `TestState` lives for the duration of a single check call. The
/// driver owns it; property combinators read and advance it.
pub struct TestState {
    pub phase: Phase,
    pub prng: Prng,
    pub seed: Seed,
    pub size: Size,
    pub label: String,
    pub successes: usize,
    pub discards: usize,
    pub classes: BTreeMap<String, usize>,
    values: Vec<Recorded>,
    cursor: usize,
    shrink_sequences: Vec<Box<dyn Iterator<Item = Recorded>>>,
}

impl TestState {
    /// Create the state for a check run.
    pub fn new(seed: Seed, label: &str, size: Size) -> Self {
        TestState {
            phase: Phase::Generate,
            prng: Prng::from_seed(seed),
            seed,
            size,
            label: label.to_string(),
            successes: 0,
            discards: 0,
            classes: BTreeMap::new(),
            values: Vec::new(),
            cursor: 0,
            shrink_sequences: Vec::new(),
        }
    }

    /// Reset per-iteration draw state for a fresh Generate pass.
    pub fn begin_iteration(&mut self, size: Size) {
        self.phase = Phase::Generate;
        self.size = size;
        self.cursor = 0;
        self.values.clear();
        self.shrink_sequences.clear();
    }

    /// Enter the StartShrink phase over the current values.
    pub fn begin_start_shrink(&mut self) {
        self.phase = Phase::StartShrink;
        self.cursor = 0;
        self.shrink_sequences.clear();
    }

    /// Position the cursor for a replay pass in the given phase.
    pub fn begin_replay(&mut self, phase: Phase) {
        self.phase = phase;
        self.cursor = 0;
    }

    /// Append a draw during the Generate phase.
    pub fn record(&mut self, recorded: Recorded) {
        self.values.push(recorded);
    }

    /// Fetch the cursor-th recorded draw at its original type and
    /// advance the cursor.
    pub fn replay<T>(&mut self) -> Result<T>
    where
        T: Clone + 'static,
    {
        let recorded = self
            .values
            .get(self.cursor)
            .ok_or(PropcheckError::ReplayMismatch {
                type_name: type_name::<T>(),
            })?;
        let value = recorded
            .downcast::<T>()
            .ok_or(PropcheckError::ReplayMismatch {
                type_name: type_name::<T>(),
            })?;
        self.cursor += 1;
        Ok(value)
    }

    /// Append a shrink sequence during the StartShrink phase.
    pub fn push_shrink_sequence(&mut self, sequence: Box<dyn Iterator<Item = Recorded>>) {
        self.shrink_sequences.push(sequence);
    }

    /// Hand the collected shrink sequences to the driver.
    pub fn take_shrink_sequences(&mut self) -> Vec<Box<dyn Iterator<Item = Recorded>>> {
        std::mem::take(&mut self.shrink_sequences)
    }

    /// Number of recorded draws.
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    /// Rendering of the index-th recorded draw.
    pub fn value_text(&self, index: usize) -> &str {
        self.values[index].text()
    }

    /// Replace the index-th recorded draw, returning the previous one.
    pub fn replace_value(&mut self, index: usize, recorded: Recorded) -> Recorded {
        std::mem::replace(&mut self.values[index], recorded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> TestState {
        TestState::new(Seed::from_u64(1), "example", Size::new(10))
    }

    #[test]
    fn test_record_replay_roundtrip() {
        let mut state = state();
        state.record(Recorded::new(5i64));
        state.record(Recorded::new("text".to_string()));

        state.begin_replay(Phase::Shrink);
        assert_eq!(state.replay::<i64>().unwrap(), 5);
        assert_eq!(state.replay::<String>().unwrap(), "text");
    }

    #[test]
    fn test_replay_wrong_type_fails() {
        let mut state = state();
        state.record(Recorded::new(5i64));
        state.begin_replay(Phase::Shrink);
        match state.replay::<String>() {
            Err(PropcheckError::ReplayMismatch { .. }) => {}
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_replay_past_end_fails() {
        let mut state = state();
        state.begin_replay(Phase::Shrink);
        assert!(state.replay::<i64>().is_err());
    }

    #[test]
    fn test_begin_iteration_clears_draws() {
        let mut state = state();
        state.record(Recorded::new(1i64));
        state.push_shrink_sequence(Box::new(std::iter::empty()));
        state.begin_iteration(Size::new(11));
        assert_eq!(state.value_count(), 0);
        assert_eq!(state.take_shrink_sequences().len(), 0);
        assert_eq!(state.size, Size::new(11));
        assert_eq!(state.phase, Phase::Generate);
    }

    #[test]
    fn test_recorded_text_is_debug_rendering() {
        let recorded = Recorded::new(vec![1i64, 2]);
        assert_eq!(recorded.text(), "[1, 2]");
        assert_eq!(recorded.downcast::<Vec<i64>>().unwrap(), vec![1, 2]);
        assert!(recorded.downcast::<i64>().is_none());
    }
}
