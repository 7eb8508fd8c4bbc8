use snapfleet_common::{Snapshot, SnapshotState};

/// Whether a volume already has a snapshot in flight.
///
/// The most-recent snapshot is authoritative: a history whose head is
/// `pending` means the provider is still working on it, and issuing
/// another request would at best queue wastefully. Expects the
/// most-recent-first ordering the provider contract guarantees.
pub fn has_pending_snapshot(history: &[Snapshot]) -> bool {
    matches!(history.first(), Some(s) if s.state == SnapshotState::Pending)
}

/// Lazy view over a volume's snapshot history, most recent first.
///
/// By default the iterator stops after emitting the first `completed`
/// snapshot, so the caller sees the latest completed snapshot plus
/// anything newer still in flight. With `all` set the full history is
/// emitted. Restartable: call again to iterate from the head.
pub fn snapshot_history<'a>(
    history: &'a [Snapshot],
    all: bool,
) -> impl Iterator<Item = &'a Snapshot> + 'a {
    let mut saw_completed = false;
    history.iter().take_while(move |s| {
        if all {
            return true;
        }
        if saw_completed {
            return false;
        }
        if s.state == SnapshotState::Completed {
            saw_completed = true;
        }
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn history(states: &[SnapshotState]) -> Vec<Snapshot> {
        let now = Utc::now();
        states
            .iter()
            .enumerate()
            .map(|(idx, state)| Snapshot {
                id: format!("snap-{idx}"),
                volume_id: "vol-1".to_string(),
                state: *state,
                progress: match state {
                    SnapshotState::Completed => "100%".to_string(),
                    _ => "45%".to_string(),
                },
                started_at: now - Duration::hours(idx as i64),
            })
            .collect()
    }

    #[test]
    fn pending_head_gates_new_snapshots() {
        use SnapshotState::*;

        assert!(!has_pending_snapshot(&[]));
        assert!(!has_pending_snapshot(&history(&[Completed, Pending])));
        assert!(has_pending_snapshot(&history(&[Pending, Completed])));
        assert!(!has_pending_snapshot(&history(&[Error, Pending])));
    }

    #[test]
    fn default_view_truncates_after_first_completed() {
        use SnapshotState::*;
        let h = history(&[Pending, Completed, Completed]);

        let ids: Vec<_> = snapshot_history(&h, false).map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["snap-0", "snap-1"]);

        let all: Vec<_> = snapshot_history(&h, true).map(|s| s.id.as_str()).collect();
        assert_eq!(all, vec!["snap-0", "snap-1", "snap-2"]);
    }

    #[test]
    fn view_is_restartable() {
        use SnapshotState::*;
        let h = history(&[Completed, Completed]);

        assert_eq!(snapshot_history(&h, false).count(), 1);
        // A fresh call iterates from the head again.
        assert_eq!(snapshot_history(&h, false).count(), 1);
    }
}
