//! Outcome classification.

use tr_common::{Outcome, Phase, Status};

/// Map a raw phase result to its displayed outcome.
///
/// Rules apply in order:
/// 1. a failure outside the call phase is an `Error`;
/// 2. an expected failure that passed or failed is an `XPassed`;
/// 3. an expected failure that skipped is an `XFailed`;
/// 4. otherwise the status is shown as-is.
pub fn classify(phase: Phase, status: Status, is_xfail: bool) -> Outcome {
    if phase != Phase::Call && status == Status::Failed {
        return Outcome::Error;
    }
    if is_xfail {
        return match status {
            Status::Passed | Status::Failed => Outcome::XPassed,
            Status::Skipped => Outcome::XFailed,
        };
    }
    match status {
        Status::Passed => Outcome::Passed,
        Status::Failed => Outcome::Failed,
        Status::Skipped => Outcome::Skipped,
    }
}

/// Whether a phase result is a fixture or collection error.
pub fn is_error(phase: Phase, status: Status) -> bool {
    phase != Phase::Call && status == Status::Failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xfail_inversion() {
        assert_eq!(classify(Phase::Call, Status::Skipped, true), Outcome::XFailed);
        assert_eq!(classify(Phase::Call, Status::Failed, true), Outcome::XPassed);
        assert_eq!(classify(Phase::Call, Status::Passed, true), Outcome::XPassed);
    }

    #[test]
    fn test_plain_statuses() {
        assert_eq!(classify(Phase::Call, Status::Passed, false), Outcome::Passed);
        assert_eq!(classify(Phase::Call, Status::Failed, false), Outcome::Failed);
        assert_eq!(classify(Phase::Call, Status::Skipped, false), Outcome::Skipped);
        assert_eq!(classify(Phase::Setup, Status::Skipped, false), Outcome::Skipped);
    }

    #[test]
    fn test_errors_win_over_xfail() {
        for phase in [Phase::Setup, Phase::Teardown, Phase::Collect] {
            assert_eq!(classify(phase, Status::Failed, false), Outcome::Error);
            assert_eq!(classify(phase, Status::Failed, true), Outcome::Error);
            assert!(is_error(phase, Status::Failed));
        }
        assert!(!is_error(Phase::Call, Status::Failed));
    }

    #[test]
    fn test_setup_skip_with_xfail_is_xfailed() {
        assert_eq!(classify(Phase::Setup, Status::Skipped, true), Outcome::XFailed);
    }
}
