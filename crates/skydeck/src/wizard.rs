//! Multi-step wizard controller.
//!
//! A [`WizardSession`] drives a fixed, ordered list of [`WizardStep`]s. Each
//! step reports its own validity through [`set_step_complete`] and stores
//! its payload with [`update_step_data`]. Forward navigation is gated on the
//! current step being complete; backward navigation is always allowed.
//! Calling [`go_next`] on a complete last step emits [`completed`] with all
//! accumulated data instead of advancing.
//!
//! The controller is pure state: it performs no I/O. Submission belongs to
//! whoever listens on `completed` (or inspects the returned
//! [`NavigationOutcome`]); if that fails, the session simply stays on the
//! last step.
//!
//! # Example
//!
//! ```
//! use skydeck::wizard::{NavigationOutcome, WizardSession, WizardStep};
//!
//! let mut wizard: WizardSession<String> = WizardSession::new(vec![
//!     WizardStep::new("Provider"),
//!     WizardStep::new("Review"),
//! ])
//! .unwrap();
//!
//! wizard.completed.connect(|data| println!("submit {data:?}"));
//!
//! wizard.update_step_data(0, "aws".to_string()).unwrap();
//! wizard.set_step_complete(0, true).unwrap();
//! assert!(matches!(wizard.go_next(), NavigationOutcome::Advanced { to: 1, .. }));
//! ```
//!
//! [`set_step_complete`]: WizardSession::set_step_complete
//! [`update_step_data`]: WizardSession::update_step_data
//! [`go_next`]: WizardSession::go_next
//! [`completed`]: WizardSession::completed

use std::collections::BTreeMap;

use skydeck_core::Signal;
use skydeck_core::logging::targets;

/// Errors raised by wizard operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// A wizard needs at least one step.
    #[error("a wizard needs at least one step")]
    NoSteps,

    /// A step index outside `0..len`.
    #[error("step index {index} is out of range (wizard has {len} steps)")]
    StepOutOfRange { index: usize, len: usize },
}

// ============================================================================
// WizardStep
// ============================================================================

/// The definition of one wizard step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardStep {
    id: String,
    title: String,
    subtitle: Option<String>,
}

impl WizardStep {
    /// Create a step; its id is the title lowercased with spaces as `_`.
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            id: title.to_lowercase().replace(' ', "_"),
            title,
            subtitle: None,
        }
    }

    /// Set the step ID using builder pattern.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the subtitle using builder pattern.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Get the step ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the step title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Get the step subtitle.
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }
}

/// Display status of a step, derived from the current index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStatus {
    /// Before the current step.
    Completed,
    /// The current step.
    Active,
    /// After the current step.
    Incomplete,
}

/// What a call to [`WizardSession::go_next`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Moved forward one step.
    Advanced { from: usize, to: usize },
    /// The current step is not complete; nothing changed.
    Blocked,
    /// The last step was complete; `completed` was emitted.
    Completed,
}

// ============================================================================
// WizardSession
// ============================================================================

/// State of one run through a wizard.
///
/// `D` is the per-step payload type. Sessions usually use an enum with one
/// variant per step.
///
/// # Signals
///
/// - `current_step_changed(usize)`: the current index changed
/// - `step_completion_changed((usize, bool))`: a step's completion flag flipped
/// - `completed(BTreeMap<usize, D>)`: finish requested on a complete last step
pub struct WizardSession<D: Clone + 'static> {
    steps: Vec<WizardStep>,
    current: usize,
    data: BTreeMap<usize, D>,
    complete: Vec<bool>,

    /// Emitted when the current step index changes.
    pub current_step_changed: Signal<usize>,
    /// Emitted when a step's completion flag changes.
    pub step_completion_changed: Signal<(usize, bool)>,
    /// Emitted with all step data when the last step is finished.
    pub completed: Signal<BTreeMap<usize, D>>,
}

impl<D: Clone + 'static> WizardSession<D> {
    /// Start a session at step 0 with no data and no completed steps.
    pub fn new(steps: Vec<WizardStep>) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::NoSteps);
        }
        let len = steps.len();
        tracing::debug!(target: targets::WIZARD, steps = len, "wizard session started");
        Ok(Self {
            steps,
            current: 0,
            data: BTreeMap::new(),
            complete: vec![false; len],
            current_step_changed: Signal::new(),
            step_completion_changed: Signal::new(),
            completed: Signal::new(),
        })
    }

    // =========================================================================
    // Steps
    // =========================================================================

    /// All step definitions, in order.
    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Index of the current step.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The current step.
    pub fn current_step(&self) -> &WizardStep {
        &self.steps[self.current]
    }

    /// Status of step `index`, or `None` when out of range.
    pub fn status(&self, index: usize) -> Option<StepStatus> {
        if index >= self.steps.len() {
            return None;
        }
        Some(match index.cmp(&self.current) {
            std::cmp::Ordering::Less => StepStatus::Completed,
            std::cmp::Ordering::Equal => StepStatus::Active,
            std::cmp::Ordering::Greater => StepStatus::Incomplete,
        })
    }

    /// Status of every step, in order.
    pub fn statuses(&self) -> Vec<StepStatus> {
        (0..self.steps.len()).filter_map(|i| self.status(i)).collect()
    }

    fn check_index(&self, index: usize) -> Result<(), WizardError> {
        if index < self.steps.len() {
            Ok(())
        } else {
            Err(WizardError::StepOutOfRange {
                index,
                len: self.steps.len(),
            })
        }
    }

    // =========================================================================
    // Step data and validity
    // =========================================================================

    /// Replace the payload of step `index`.
    pub fn update_step_data(&mut self, index: usize, payload: D) -> Result<(), WizardError> {
        self.check_index(index)?;
        self.data.insert(index, payload);
        tracing::trace!(target: targets::WIZARD, index, "step data updated");
        Ok(())
    }

    /// Payload of step `index`, if one was stored.
    pub fn step_data(&self, index: usize) -> Option<&D> {
        self.data.get(&index)
    }

    /// All stored payloads keyed by step index.
    pub fn all_step_data(&self) -> &BTreeMap<usize, D> {
        &self.data
    }

    /// Record whether step `index` currently passes its own validation.
    pub fn set_step_complete(&mut self, index: usize, is_complete: bool) -> Result<(), WizardError> {
        self.check_index(index)?;
        if self.complete[index] != is_complete {
            self.complete[index] = is_complete;
            tracing::trace!(target: targets::WIZARD, index, is_complete, "step completion changed");
            self.step_completion_changed.emit((index, is_complete));
        }
        Ok(())
    }

    /// Whether step `index` reported itself complete.
    pub fn is_step_complete(&self, index: usize) -> bool {
        self.complete.get(index).copied().unwrap_or(false)
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Whether Next/Finish is enabled.
    pub fn can_go_next(&self) -> bool {
        self.complete[self.current]
    }

    /// Whether Back is enabled.
    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    /// Whether the current step is the last one.
    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.steps.len()
    }

    /// Advance, or finish on the last step.
    pub fn go_next(&mut self) -> NavigationOutcome {
        if !self.can_go_next() {
            tracing::debug!(target: targets::WIZARD, index = self.current, "next blocked: step incomplete");
            return NavigationOutcome::Blocked;
        }

        if self.is_last_step() {
            tracing::debug!(target: targets::WIZARD, steps = self.data.len(), "wizard completed");
            self.completed.emit(self.data.clone());
            return NavigationOutcome::Completed;
        }

        let from = self.current;
        self.current += 1;
        self.current_step_changed.emit(self.current);
        NavigationOutcome::Advanced {
            from,
            to: self.current,
        }
    }

    /// Go back one step. Returns `false` on the first step.
    pub fn go_previous(&mut self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.current -= 1;
        self.current_step_changed.emit(self.current);
        true
    }

    /// Jump to an already visited step.
    ///
    /// Only indices at or before the current one are accepted; anything else
    /// is ignored. Returns `true` if the current step changed.
    pub fn jump_to(&mut self, index: usize) -> bool {
        let allowed = matches!(
            self.status(index),
            Some(StepStatus::Completed | StepStatus::Active)
        );
        if !allowed || index == self.current {
            return false;
        }
        self.current = index;
        self.current_step_changed.emit(self.current);
        true
    }

    /// Return to step 0 and clear all data and completion flags.
    ///
    /// Only `current_step_changed` is emitted; listeners re-read flags.
    pub fn reset(&mut self) {
        self.data.clear();
        self.complete.fill(false);
        if self.current != 0 {
            self.current = 0;
            self.current_step_changed.emit(0);
        }
        tracing::debug!(target: targets::WIZARD, "wizard reset");
    }
}

impl<D: Clone + std::fmt::Debug + 'static> std::fmt::Debug for WizardSession<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardSession")
            .field("steps", &self.steps)
            .field("current", &self.current)
            .field("complete", &self.complete)
            .field("data", &self.data)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn wizard(n: usize) -> WizardSession<String> {
        let steps = (0..n).map(|i| WizardStep::new(format!("Step {i}"))).collect();
        WizardSession::new(steps).unwrap()
    }

    #[test]
    fn test_empty_wizard_rejected() {
        assert_eq!(
            WizardSession::<String>::new(Vec::new()).unwrap_err(),
            WizardError::NoSteps
        );
    }

    #[test]
    fn test_step_creation() {
        let step = WizardStep::new("Cloud Provider").with_subtitle("Pick one");
        assert_eq!(step.id(), "cloud_provider");
        assert_eq!(step.subtitle(), Some("Pick one"));
        assert_eq!(step.with_id("provider").id(), "provider");
    }

    #[test]
    fn test_initial_state_for_any_length() {
        for n in 1..=6 {
            let w = wizard(n);
            assert_eq!(w.current_index(), 0);
            assert_eq!(w.status(0), Some(StepStatus::Active));
            assert!((1..n).all(|i| w.status(i) == Some(StepStatus::Incomplete)));
            assert!(w.all_step_data().is_empty());
            assert!((0..n).all(|i| !w.is_step_complete(i)));
        }
    }

    #[test]
    fn test_next_blocked_when_incomplete() {
        let mut w = wizard(3);
        assert_eq!(w.go_next(), NavigationOutcome::Blocked);
        assert_eq!(w.current_index(), 0);

        w.set_step_complete(0, true).unwrap();
        w.set_step_complete(0, false).unwrap();
        assert_eq!(w.go_next(), NavigationOutcome::Blocked);
        assert_eq!(w.current_index(), 0);
    }

    #[test]
    fn test_statuses_after_advance() {
        let mut w = wizard(4);
        for i in 0..3 {
            w.set_step_complete(i, true).unwrap();
            assert_eq!(
                w.go_next(),
                NavigationOutcome::Advanced { from: i, to: i + 1 }
            );
            assert_eq!(w.status(i), Some(StepStatus::Completed));
            assert_eq!(w.status(i + 1), Some(StepStatus::Active));
        }
        assert_eq!(
            w.statuses(),
            vec![
                StepStatus::Completed,
                StepStatus::Completed,
                StepStatus::Completed,
                StepStatus::Active
            ]
        );
    }

    #[test]
    fn test_three_step_scenario() {
        let mut w = wizard(3);
        w.set_step_complete(0, true).unwrap();
        w.go_next();
        assert_eq!(w.current_index(), 1);

        w.go_next();
        assert_eq!(w.current_index(), 1);

        w.set_step_complete(1, true).unwrap();
        w.go_next();
        assert_eq!(w.current_index(), 2);
    }

    #[test]
    fn test_completion_emits_once_with_all_data() {
        let mut w = wizard(3);
        let calls = Arc::new(AtomicUsize::new(0));
        let received = Arc::new(Mutex::new(BTreeMap::new()));

        let calls_clone = calls.clone();
        let received_clone = received.clone();
        w.completed.connect(move |data| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            *received_clone.lock() = data.clone();
        });

        w.update_step_data(0, "provider".into()).unwrap();
        w.set_step_complete(0, true).unwrap();
        w.go_next();
        w.update_step_data(1, "credentials".into()).unwrap();
        w.set_step_complete(1, true).unwrap();
        w.go_next();
        w.update_step_data(2, "review".into()).unwrap();

        // Last step not yet complete
        assert_eq!(w.go_next(), NavigationOutcome::Blocked);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        w.set_step_complete(2, true).unwrap();
        assert_eq!(w.go_next(), NavigationOutcome::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(w.current_index(), 2);

        let data = received.lock();
        assert_eq!(data.len(), 3);
        assert_eq!(data.get(&1).map(String::as_str), Some("credentials"));
    }

    #[test]
    fn test_single_step_wizard_completes() {
        let mut w = wizard(1);
        assert!(w.is_last_step());
        w.set_step_complete(0, true).unwrap();
        assert_eq!(w.go_next(), NavigationOutcome::Completed);
    }

    #[test]
    fn test_go_previous_keeps_state() {
        let mut w = wizard(3);
        assert!(!w.go_previous());

        w.update_step_data(0, "a".into()).unwrap();
        w.set_step_complete(0, true).unwrap();
        w.go_next();
        w.update_step_data(1, "b".into()).unwrap();
        w.set_step_complete(1, true).unwrap();

        assert!(w.go_previous());
        assert_eq!(w.current_index(), 0);
        assert!(w.is_step_complete(1));
        assert_eq!(w.step_data(1).map(String::as_str), Some("b"));
    }

    #[test]
    fn test_jump_to_forward_ignored() {
        let mut w = wizard(4);
        w.set_step_complete(0, true).unwrap();
        w.go_next();
        w.set_step_complete(1, true).unwrap();
        w.go_next();
        w.set_step_complete(3, true).unwrap();

        assert!(!w.jump_to(3));
        assert!(!w.jump_to(9));
        assert_eq!(w.current_index(), 2);

        assert!(w.jump_to(0));
        assert_eq!(w.current_index(), 0);
        // Steps ahead of the new current step are no longer reachable by jump.
        assert!(!w.jump_to(2));
        assert_eq!(w.current_index(), 0);
    }

    #[test]
    fn test_step_data_last_write_wins() {
        let mut w = wizard(2);
        w.update_step_data(1, "first".into()).unwrap();
        w.update_step_data(1, "second".into()).unwrap();
        assert_eq!(w.step_data(1).map(String::as_str), Some("second"));
    }

    #[test]
    fn test_out_of_range_updates() {
        let mut w = wizard(2);
        assert_eq!(
            w.update_step_data(2, "x".into()),
            Err(WizardError::StepOutOfRange { index: 2, len: 2 })
        );
        assert!(w.set_step_complete(5, true).is_err());
        assert!(!w.is_step_complete(5));
        assert_eq!(w.status(2), None);
    }

    #[test]
    fn test_signals() {
        let mut w = wizard(3);
        let indices = Arc::new(Mutex::new(Vec::new()));
        let flags = Arc::new(Mutex::new(Vec::new()));

        let indices_clone = indices.clone();
        w.current_step_changed
            .connect(move |&i| indices_clone.lock().push(i));
        let flags_clone = flags.clone();
        w.step_completion_changed
            .connect(move |&(i, c)| flags_clone.lock().push((i, c)));

        w.set_step_complete(0, true).unwrap();
        // Idempotent: no second emission
        w.set_step_complete(0, true).unwrap();
        w.go_next();
        w.go_previous();

        assert_eq!(*indices.lock(), vec![1, 0]);
        assert_eq!(*flags.lock(), vec![(0, true)]);
    }

    #[test]
    fn test_reset() {
        let mut w = wizard(3);
        w.update_step_data(0, "a".into()).unwrap();
        w.set_step_complete(0, true).unwrap();
        w.go_next();

        w.reset();
        assert_eq!(w.current_index(), 0);
        assert!(w.all_step_data().is_empty());
        assert!(!w.can_go_next());
    }
}
