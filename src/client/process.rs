use std::collections::HashMap;

use rand::Rng;

use super::notice::Notice;
use super::selection::{FileStatus, Selection, SelectionAction, StatusAction, StatusBoard};
use crate::services::jobs::{Job, ProcessOutcome};

/// Summary message for a processing round over `selected` files.
pub fn summary(selected: usize, succeeded: usize, failed: usize) -> Notice {
    if selected == 1 {
        if failed == 1 {
            Notice::error("Processing failed.")
        } else {
            Notice::success("Processing complete for 1 file.")
        }
    } else if failed > 0 {
        Notice::info(format!(
            "Processing completed: {} succeeded, {} failed.",
            succeeded, failed
        ))
    } else {
        Notice::success(format!("Processing complete for {} file(s).", succeeded))
    }
}

/// Coin-flip outcome for each id, without a server round trip.
pub fn simulate<R: Rng>(ids: &[String], rng: &mut R) -> HashMap<String, FileStatus> {
    ids.iter()
        .map(|id| {
            let status = if rng.gen_bool(0.5) {
                FileStatus::Success
            } else {
                FileStatus::Failure
            };
            (id.clone(), status)
        })
        .collect()
}

/// Merge `outcomes` into the board, clear the selection and summarize.
pub fn apply_outcomes(
    outcomes: HashMap<String, FileStatus>,
    board: &mut StatusBoard,
    selection: &mut Selection,
) -> Notice {
    let succeeded = outcomes.values().filter(|s| **s == FileStatus::Success).count();
    let failed = outcomes.len() - succeeded;
    let notice = summary(outcomes.len(), succeeded, failed);

    board.apply(StatusAction::SetMany(outcomes));
    selection.apply(SelectionAction::Clear);
    notice
}

/// Apply a completed job's per-file results.
pub fn apply_job(job: &Job, board: &mut StatusBoard, selection: &mut Selection) -> Notice {
    let outcomes = job
        .results
        .iter()
        .map(|(id, outcome)| {
            let status = match outcome {
                ProcessOutcome::Success => FileStatus::Success,
                ProcessOutcome::Failure => FileStatus::Failure,
            };
            (id.clone(), status)
        })
        .collect();
    apply_outcomes(outcomes, board, selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::notice::NoticeLevel;
    use crate::services::jobs::JobStatus;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    #[test]
    fn summary_messages() {
        assert_eq!(summary(1, 0, 1), Notice::error("Processing failed."));
        assert_eq!(summary(1, 1, 0).message, "Processing complete for 1 file.");

        let mixed = summary(3, 2, 1);
        assert_eq!(mixed.level, NoticeLevel::Info);
        assert_eq!(mixed.message, "Processing completed: 2 succeeded, 1 failed.");

        assert_eq!(summary(4, 4, 0).message, "Processing complete for 4 file(s).");
    }

    #[test]
    fn simulation_covers_every_id() {
        let ids: Vec<String> = (0..20).map(|i| format!("{}-x.pdf", i)).collect();
        let mut rng = StdRng::seed_from_u64(7);
        let outcomes = simulate(&ids, &mut rng);

        assert_eq!(outcomes.len(), 20);
        assert!(outcomes
            .values()
            .all(|s| matches!(s, FileStatus::Success | FileStatus::Failure)));
    }

    #[test]
    fn completed_job_updates_board_and_clears_selection() {
        let now = chrono::Utc::now().naive_utc();
        let job = Job {
            id: uuid::Uuid::new_v4(),
            file_ids: vec!["a".into(), "b".into()],
            status: JobStatus::Completed,
            results: BTreeMap::from([
                ("a".to_string(), ProcessOutcome::Success),
                ("b".to_string(), ProcessOutcome::Failure),
            ]),
            errors: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        };
        let mut board = StatusBoard::default();
        let mut selection = Selection::default();
        selection.apply(SelectionAction::Select(vec!["a".into(), "b".into()]));

        let notice = apply_job(&job, &mut board, &mut selection);

        assert_eq!(notice.message, "Processing completed: 1 succeeded, 1 failed.");
        assert_eq!(board.status("a"), FileStatus::Success);
        assert_eq!(board.status("b"), FileStatus::Failure);
        assert!(selection.is_empty());
        assert!(!selection.availability().process);
    }
}
