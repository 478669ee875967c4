//! Lifecycle events of an exploration.
//!
//! The walker reports everything it does through [`ExplorationEvent`]s: these are its
//! only outputs. Two consumers exist:
//!
//! - [`ExplorationListener`]s receive each event as it happens, including borrowed
//!   instructions and states. Diagnostics and tooling hook in here.
//! - The [`EventLog`] keeps a compact, owned record of every event ([`Event`]) for
//!   inspection after the walk.
//!
//! # Example
//!
//! ```rust,ignore
//! use symscope::engine::{EventKind, ExplorationEvent};
//!
//! graph.on_event(|event| {
//!     if let ExplorationEvent::ExitBlockReached { state, .. } = event {
//!         println!("path finished with {} bindings", state.bindings().count());
//!     }
//! });
//! graph.walk()?;
//! assert!(graph.events().has(EventKind::ExplorationEnded));
//! ```

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{cfg::BlockId, state::ProgramPoint, state::ProgramState};

/// An event fired by the walker.
///
/// Borrowed data lives only for the duration of the notification.
#[derive(Debug)]
pub enum ExplorationEvent<'e, I> {
    /// The worklist drained; every feasible path was explored.
    ExplorationEnded,

    /// The step budget ran out. No further events follow.
    MaxStepCountReached,

    /// The node budget or the relationship closure bound was exceeded. No further
    /// events follow.
    MaxInternalStateCountReached,

    /// An instruction was evaluated.
    InstructionProcessed {
        /// The instruction
        instruction: &'e I,
        /// Where it was evaluated
        point: ProgramPoint,
        /// The state after evaluation and all check hooks
        state: &'e ProgramState,
    },

    /// A successor was dropped because its point hit the visit cap.
    ProgramPointVisitCountExceedLimit {
        /// The point that was not entered
        point: ProgramPoint,
        /// The state that would have entered it
        state: &'e ProgramState,
        /// The configured cap
        limit: u32,
    },

    /// A path reached the exit block.
    ExitBlockReached {
        /// The exit block
        block: BlockId,
        /// The final state of the path
        state: &'e ProgramState,
    },

    /// A feasible side of a conditional branch was taken.
    ConditionEvaluated {
        /// The branching block
        block: BlockId,
        /// The last instruction of the block, the one computing the condition
        condition: Option<&'e I>,
        /// Which side was taken
        value: bool,
        /// The state refined by the assumption
        state: &'e ProgramState,
    },
}

impl<I> ExplorationEvent<'_, I> {
    /// Returns the kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            ExplorationEvent::ExplorationEnded => EventKind::ExplorationEnded,
            ExplorationEvent::MaxStepCountReached => EventKind::MaxStepCountReached,
            ExplorationEvent::MaxInternalStateCountReached => {
                EventKind::MaxInternalStateCountReached
            }
            ExplorationEvent::InstructionProcessed { .. } => EventKind::InstructionProcessed,
            ExplorationEvent::ProgramPointVisitCountExceedLimit { .. } => {
                EventKind::ProgramPointVisitCountExceedLimit
            }
            ExplorationEvent::ExitBlockReached { .. } => EventKind::ExitBlockReached,
            ExplorationEvent::ConditionEvaluated { .. } => EventKind::ConditionEvaluated,
        }
    }

    /// Returns the state carried by the event, if any.
    #[must_use]
    pub const fn state(&self) -> Option<&ProgramState> {
        match self {
            ExplorationEvent::InstructionProcessed { state, .. }
            | ExplorationEvent::ProgramPointVisitCountExceedLimit { state, .. }
            | ExplorationEvent::ExitBlockReached { state, .. }
            | ExplorationEvent::ConditionEvaluated { state, .. } => Some(*state),
            _ => None,
        }
    }
}

/// Categories of exploration events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`ExplorationEvent::ExplorationEnded`].
    ExplorationEnded,
    /// See [`ExplorationEvent::MaxStepCountReached`].
    MaxStepCountReached,
    /// See [`ExplorationEvent::MaxInternalStateCountReached`].
    MaxInternalStateCountReached,
    /// See [`ExplorationEvent::InstructionProcessed`].
    InstructionProcessed,
    /// See [`ExplorationEvent::ProgramPointVisitCountExceedLimit`].
    ProgramPointVisitCountExceedLimit,
    /// See [`ExplorationEvent::ExitBlockReached`].
    ExitBlockReached,
    /// See [`ExplorationEvent::ConditionEvaluated`].
    ConditionEvaluated,
}

impl EventKind {
    /// Returns a human-readable description of this event kind.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::ExplorationEnded => "exploration ended",
            Self::MaxStepCountReached => "max step count reached",
            Self::MaxInternalStateCountReached => "max internal state count reached",
            Self::InstructionProcessed => "instruction processed",
            Self::ProgramPointVisitCountExceedLimit => "program point visit limit exceeded",
            Self::ExitBlockReached => "exit block reached",
            Self::ConditionEvaluated => "condition evaluated",
        }
    }

    /// Returns true if this event ends the exploration.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::ExplorationEnded | Self::MaxStepCountReached | Self::MaxInternalStateCountReached
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// The type of event.
    pub kind: EventKind,
    /// Where the event happened, for events tied to a location.
    pub point: Option<ProgramPoint>,
    /// The branch side, for [`EventKind::ConditionEvaluated`].
    pub value: Option<bool>,
}

impl<I> From<&ExplorationEvent<'_, I>> for Event {
    fn from(event: &ExplorationEvent<'_, I>) -> Self {
        let (point, value) = match event {
            ExplorationEvent::InstructionProcessed { point, .. }
            | ExplorationEvent::ProgramPointVisitCountExceedLimit { point, .. } => {
                (Some(*point), None)
            }
            ExplorationEvent::ExitBlockReached { block, .. } => {
                (Some(ProgramPoint::start_of(*block)), None)
            }
            ExplorationEvent::ConditionEvaluated { block, value, .. } => {
                (Some(ProgramPoint::start_of(*block)), Some(*value))
            }
            _ => (None, None),
        };
        Event {
            kind: event.kind(),
            point,
            value,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(point) = self.point {
            write!(f, " at {point}")?;
        }
        if let Some(value) = self.value {
            write!(f, " -> {value}")?;
        }
        Ok(())
    }
}

/// Ordered record of the events of one exploration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Returns true if no events have been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns the total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if any event of the given kind exists.
    #[must_use]
    pub fn has(&self, kind: EventKind) -> bool {
        self.events.iter().any(|e| e.kind == kind)
    }

    /// Counts events of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    /// Returns an iterator over all events.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Returns an iterator over events of a specific kind.
    pub fn filter_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Returns the last event, which is terminal once a walk has returned.
    #[must_use]
    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// Counts events grouped by kind.
    #[must_use]
    pub fn count_by_kind(&self) -> FxHashMap<EventKind, usize> {
        let mut counts = FxHashMap::default();
        for event in &self.events {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Observer of exploration events.
///
/// Closures are registered through
/// [`ExplodedGraph::on_event`](crate::engine::ExplodedGraph::on_event); implement this
/// trait for listeners that carry their own state.
pub trait ExplorationListener<I> {
    /// Called once per event, in the order the walker fires them.
    fn on_event(&mut self, event: &ExplorationEvent<'_, I>);
}

/// Adapter turning a closure into an [`ExplorationListener`].
pub(crate) struct FnListener<F>(pub(crate) F);

impl<I, F> ExplorationListener<I> for FnListener<F>
where
    F: FnMut(&ExplorationEvent<'_, I>),
{
    fn on_event(&mut self, event: &ExplorationEvent<'_, I>) {
        (self.0)(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_from_exploration_event() {
        let state = ProgramState::new();
        let block = BlockId::new(2);
        let event: ExplorationEvent<'_, ()> = ExplorationEvent::ConditionEvaluated {
            block,
            condition: None,
            value: false,
            state: &state,
        };

        let recorded = Event::from(&event);
        assert_eq!(recorded.kind, EventKind::ConditionEvaluated);
        assert_eq!(recorded.point, Some(ProgramPoint::start_of(block)));
        assert_eq!(recorded.value, Some(false));
        assert_eq!(recorded.to_string(), "[condition evaluated] at b2:0 -> false");
        assert!(event.state().is_some());
    }

    #[test]
    fn test_event_log_queries() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        let point = ProgramPoint::start_of(BlockId::new(0));
        for kind in [
            EventKind::InstructionProcessed,
            EventKind::InstructionProcessed,
            EventKind::ExplorationEnded,
        ] {
            log.record(Event {
                kind,
                point: (!kind.is_terminal()).then_some(point),
                value: None,
            });
        }

        assert_eq!(log.len(), 3);
        assert!(log.has(EventKind::ExplorationEnded));
        assert!(!log.has(EventKind::MaxStepCountReached));
        assert_eq!(log.count_kind(EventKind::InstructionProcessed), 2);
        assert_eq!(log.filter_kind(EventKind::ExplorationEnded).count(), 1);
        assert_eq!(log.count_by_kind()[&EventKind::InstructionProcessed], 2);
        assert!(log.last().is_some_and(|e| e.kind.is_terminal()));
    }

    fn listen<I>(f: impl FnMut(&ExplorationEvent<'_, I>)) -> impl ExplorationListener<I> {
        FnListener(f)
    }

    #[test]
    fn test_closure_listener() {
        let mut seen = Vec::new();
        {
            let mut listener = listen::<()>(|event| seen.push(event.kind()));
            listener.on_event(&ExplorationEvent::ExplorationEnded);
            listener.on_event(&ExplorationEvent::MaxStepCountReached);
        }
        assert_eq!(
            seen,
            vec![EventKind::ExplorationEnded, EventKind::MaxStepCountReached]
        );
    }
}
