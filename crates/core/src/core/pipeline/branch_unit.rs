//! Branch unit: 1-bit prediction plus RAT checkpoint/rollback.
//!
//! Each static branch gets one predictor bit, keyed by its instruction ID
//! (a branch's ID is fixed at decode time, so re-executing the same branch
//! dynamically looks up the same entry). The bit is updated to the actual
//! outcome every time the branch resolves; a fresh branch defaults to
//! not-taken.

use std::collections::HashMap;

use crate::common::SimError;
use crate::core::rat::RatSnapshot;

/// State checkpointed when a branch issues, to be restored if it turns out
/// to have been mispredicted.
pub struct Checkpoint {
    /// The RAT as it stood immediately before the branch issued.
    pub rat: RatSnapshot,
    /// The branch's own ROB tag, so the ROB can drop every entry allocated
    /// after it.
    pub rob_tag: usize,
    /// The PC of the instruction immediately after the branch — the
    /// not-taken target.
    pub fallthrough_pc: usize,
    /// The taken target, computed once at issue from the branch's offset.
    pub target_pc: usize,
}

/// What the orchestrator must do after a branch resolves against its
/// prediction.
pub struct Recovery {
    /// Where the instruction queue's PC must be set.
    pub new_pc: usize,
    /// The branch's ROB tag; everything allocated after it must be purged.
    pub rob_tag: usize,
}

/// The branch unit: predictor table plus outstanding checkpoints.
#[derive(Default)]
pub struct BranchUnit {
    predicted_taken: HashMap<u32, bool>,
    checkpoints: HashMap<u32, Checkpoint>,
}

impl BranchUnit {
    /// Builds a branch unit with an empty (all not-taken) predictor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Predicts whether the branch at `branch_id` will be taken.
    #[must_use]
    pub fn predict(&self, branch_id: u32) -> bool {
        self.predicted_taken.get(&branch_id).copied().unwrap_or(false)
    }

    /// Records a checkpoint at issue time, under the prediction made then.
    pub fn checkpoint(&mut self, branch_id: u32, checkpoint: Checkpoint) {
        let _ = self.checkpoints.insert(branch_id, checkpoint);
    }

    /// Resolves a branch against its prediction, updates the predictor bit,
    /// and returns the recovery action if the prediction was wrong.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvariantViolation`] if `branch_id` was never
    /// checkpointed at issue.
    pub fn resolve(
        &mut self,
        branch_id: u32,
        actual_taken: bool,
    ) -> Result<(Option<Recovery>, Checkpoint), SimError> {
        let predicted = self.predict(branch_id);
        let _ = self.predicted_taken.insert(branch_id, actual_taken);
        let checkpoint = SimError::require(
            self.checkpoints.remove(&branch_id),
            "every issued branch was checkpointed",
        )?;

        let recovery = (predicted != actual_taken).then(|| Recovery {
            new_pc: if actual_taken {
                checkpoint.target_pc
            } else {
                checkpoint.fallthrough_pc
            },
            rob_tag: checkpoint.rob_tag,
        });
        Ok((recovery, checkpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rat::Rat;

    #[test]
    fn fresh_branch_predicts_not_taken() {
        let bu = BranchUnit::new();
        assert!(!bu.predict(0));
    }

    #[test]
    fn correct_prediction_needs_no_recovery() {
        let mut bu = BranchUnit::new();
        let rat = Rat::new();
        bu.checkpoint(
            0,
            Checkpoint {
                rat: rat.snapshot(),
                rob_tag: 2,
                fallthrough_pc: 3,
                target_pc: 10,
            },
        );
        let (recovery, _) = bu.resolve(0, false).unwrap();
        assert!(recovery.is_none());
    }

    #[test]
    fn mispredicted_taken_branch_redirects_to_target() {
        let mut bu = BranchUnit::new();
        let rat = Rat::new();
        bu.checkpoint(
            0,
            Checkpoint {
                rat: rat.snapshot(),
                rob_tag: 2,
                fallthrough_pc: 3,
                target_pc: 10,
            },
        );
        let (recovery, _) = bu.resolve(0, true).unwrap();
        let recovery = recovery.unwrap();
        assert_eq!(recovery.new_pc, 10);
        assert_eq!(recovery.rob_tag, 2);
    }

    #[test]
    fn predictor_remembers_last_outcome_for_next_dynamic_execution() {
        let mut bu = BranchUnit::new();
        let rat = Rat::new();
        bu.checkpoint(
            0,
            Checkpoint {
                rat: rat.snapshot(),
                rob_tag: 0,
                fallthrough_pc: 1,
                target_pc: 5,
            },
        );
        let _ = bu.resolve(0, true).unwrap();
        assert!(bu.predict(0));
    }
}
