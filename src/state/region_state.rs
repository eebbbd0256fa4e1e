/// Crawl driver state per region
///
/// The driver walks each region through
/// `Idle -> Resuming -> Dispatching <-> Throttling -> Done`.
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionState {
    /// Region not started yet
    Idle,

    /// Looking up the resume point from storage
    Resuming,

    /// Submitting scrape units
    Dispatching,

    /// Pausing between dispatch batches
    Throttling,

    /// Ceiling reached, nothing left to dispatch
    Done,
}

impl RegionState {
    /// Returns true if moving from `self` to `next` is a legal step
    pub fn can_transition_to(&self, next: RegionState) -> bool {
        use RegionState::*;
        matches!(
            (self, next),
            (Idle, Resuming)
                | (Resuming, Dispatching)
                | (Resuming, Done)
                | (Dispatching, Throttling)
                | (Dispatching, Done)
                | (Throttling, Dispatching)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for RegionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Resuming => "resuming",
            Self::Dispatching => "dispatching",
            Self::Throttling => "throttling",
            Self::Done => "done",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path_is_legal() {
        assert!(RegionState::Idle.can_transition_to(RegionState::Resuming));
        assert!(RegionState::Resuming.can_transition_to(RegionState::Dispatching));
        assert!(RegionState::Dispatching.can_transition_to(RegionState::Throttling));
        assert!(RegionState::Throttling.can_transition_to(RegionState::Dispatching));
        assert!(RegionState::Dispatching.can_transition_to(RegionState::Done));
    }

    #[test]
    fn test_fully_crawled_region_skips_dispatch() {
        assert!(RegionState::Resuming.can_transition_to(RegionState::Done));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!RegionState::Idle.can_transition_to(RegionState::Dispatching));
        assert!(!RegionState::Done.can_transition_to(RegionState::Idle));
        assert!(!RegionState::Throttling.can_transition_to(RegionState::Done));
    }

    #[test]
    fn test_only_done_is_terminal() {
        assert!(RegionState::Done.is_terminal());
        assert!(!RegionState::Throttling.is_terminal());
    }
}
