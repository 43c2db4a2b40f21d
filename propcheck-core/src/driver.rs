//! The phase-aware property executor.
//!
//! Runs a property in the Generate phase until it falsifies or the test
//! budget is spent, then minimizes the failing draws: one StartShrink
//! pass collects a lazy shrink sequence per recorded draw, and a
//! coordinate-descent search replays candidates in the Shrink phase,
//! restarting from every improvement. A final replay re-raises the
//! failure with the minimized input.

use crate::data::{Config, Seed, Size};
use crate::error::{PropcheckError, Result};
use crate::property::Prop;
use crate::state::{Outcome, Phase, TestState};
use colored::Colorize;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

/// Counters reported after a completed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckSummary {
    pub successes: usize,
    pub discards: usize,
    pub classes: BTreeMap<String, usize>,
}

/// Drive a property against a condition with a fresh random seed.
pub fn run_check<T, P>(
    prop: &Prop<T>,
    config: &Config,
    label: &str,
    condition: P,
) -> Result<CheckSummary>
where
    T: Clone + fmt::Debug + Default + 'static,
    P: Fn(&T) -> bool + 'static,
{
    run_check_seeded(prop, config, label, condition, Seed::random())
}

/// Drive a property against a condition from a fixed seed, for
/// reproducing a run.
pub fn run_check_seeded<T, P>(
    prop: &Prop<T>,
    config: &Config,
    label: &str,
    condition: P,
    seed: Seed,
) -> Result<CheckSummary>
where
    T: Clone + fmt::Debug + Default + 'static,
    P: Fn(&T) -> bool + 'static,
{
    let mut state = TestState::new(seed, label, Size::new(config.size_initial));
    let checked = prop.clone().ensure(condition);

    let mut falsified = false;
    for iteration in 0..config.test_limit {
        state.begin_iteration(Size::new(config.size_initial + iteration));
        match checked.eval(&mut state) {
            Ok(sample) => match sample.outcome {
                Outcome::Success => state.successes += 1,
                Outcome::Discard => state.discards += 1,
            },
            Err(PropcheckError::PropertyFailed { .. }) => {
                falsified = true;
                break;
            }
            Err(error) => return Err(error),
        }
    }

    if !falsified {
        report_success(&state);
        return Ok(CheckSummary {
            successes: state.successes,
            discards: state.discards,
            classes: state.classes.clone(),
        });
    }

    let tests_run = state.successes + state.discards + 1;
    println!(
        "{}",
        format!("Falsifiable after {tests_run} tests. Shrinking input.").red()
    );

    let improvements = shrink_search(&checked, &mut state, config);
    if improvements > 0 {
        println!();
    }

    // Final replay over the minimized draws, with nothing suppressed.
    state.begin_replay(Phase::Shrink);
    match checked.eval(&mut state) {
        Err(error @ PropcheckError::PropertyFailed { .. }) => Err(error),
        Ok(_) => Err(PropcheckError::NondeterministicProperty),
        Err(error) => Err(error),
    }
}

/// Coordinate-descent search for a simpler failing tuple of draws.
///
/// Candidates for one coordinate are pulled lazily while the others stay
/// at the current best. A candidate that still fails becomes the new
/// best and the search restarts from it with freshly collected
/// sequences; a candidate that passes, or raises anything other than a
/// property failure, is skipped. The total number of candidate
/// evaluations is capped by the shrink limit.
///
/// Returns the number of improvements found; the state's values hold the
/// best (simplest) failing tuple seen.
fn shrink_search<T>(checked: &Prop<T>, state: &mut TestState, config: &Config) -> usize
where
    T: Clone + fmt::Debug + 'static,
{
    let mut steps = 0;
    let mut improvements = 0;
    'restart: loop {
        state.begin_start_shrink();
        // Re-raises the known failure while collecting the sequences.
        let _ = checked.eval(state);
        let mut sequences = state.take_shrink_sequences();

        for index in 0..sequences.len() {
            while let Some(candidate) = sequences[index].next() {
                if steps >= config.shrink_limit {
                    return improvements;
                }
                if candidate.text() == state.value_text(index) {
                    // The sequence's final element is the current value
                    // itself, the fallback rather than an improvement.
                    continue;
                }
                steps += 1;
                let previous = state.replace_value(index, candidate);
                state.begin_replay(Phase::Shrink);
                match checked.eval(state) {
                    Err(PropcheckError::PropertyFailed { .. }) => {
                        improvements += 1;
                        progress_dot();
                        continue 'restart;
                    }
                    _ => {
                        state.replace_value(index, previous);
                    }
                }
            }
        }
        return improvements;
    }
}

fn progress_dot() {
    print!(".");
    let _ = std::io::stdout().flush();
}

fn report_success(state: &TestState) {
    println!(
        "'{}' passed {} tests. Discarded: {}",
        state.label, state.successes, state.discards
    );
    if !state.classes.is_empty() {
        println!("Test case distribution:");
        let total = state.successes.max(1) as f64;
        for (bucket, count) in &state.classes {
            println!("{bucket}: {:.2}%", *count as f64 * 100.0 / total);
        }
    }
}
