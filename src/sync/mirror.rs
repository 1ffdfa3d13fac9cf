//! Referee Mirror Store
//!
//! Local mirror of per-referee scoring state. Mutated by push-channel merges,
//! optimistic local commands, and explicit setup/reset/stop requests; read
//! reactively by the UI surface. Purely synchronous — callers own the lock.

use std::collections::HashMap;

use crate::sync::messages::{
    DeviceStatus, LinkStatus, RefereeDescriptor, RefereeMode, ScorePayload,
};

/// Scoring state of one referee
#[derive(Debug, Clone, PartialEq)]
pub struct RefereeRecord {
    pub name: String,
    pub total: i32,
    pub plus: i32,
    pub minus: i32,
    pub status: DeviceStatus,
}

impl RefereeRecord {
    fn placeholder(index: u32) -> Self {
        Self {
            name: format!("Referee {}", index),
            total: 0,
            plus: 0,
            minus: 0,
            status: DeviceStatus {
                pri: LinkStatus::Disconnected,
                sec: LinkStatus::NotApplicable,
            },
        }
    }
}

/// Mapping from referee index to its record.
///
/// Every key present was either declared by a setup call or has received at
/// least one push update. Records are never deleted individually; the whole
/// mirror is cleared when the match stops.
#[derive(Debug, Clone, Default)]
pub struct RefereeMirror {
    records: HashMap<u32, RefereeRecord>,
}

impl RefereeMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a push update into the mirror.
    ///
    /// Creates the record with a placeholder name if the index is unknown,
    /// then overwrites the score and status fields only. Everything else
    /// (notably `name`) survives unchanged — this is a field-level partial
    /// merge, not a replace.
    pub fn merge(&mut self, payload: &ScorePayload) {
        let record = self
            .records
            .entry(payload.index)
            .or_insert_with(|| RefereeRecord::placeholder(payload.index));
        record.total = payload.score.total;
        record.plus = payload.score.plus;
        record.minus = payload.score.minus;
        record.status = payload.status;
    }

    /// Create or replace records for every descriptor of a successful setup
    pub fn install(&mut self, referees: &[RefereeDescriptor]) {
        for descriptor in referees {
            let sec = match descriptor.mode {
                RefereeMode::Dual => LinkStatus::Connecting,
                RefereeMode::Single => LinkStatus::NotApplicable,
            };
            self.records.insert(
                descriptor.index,
                RefereeRecord {
                    name: descriptor.name.clone(),
                    total: 0,
                    plus: 0,
                    minus: 0,
                    status: DeviceStatus {
                        pri: LinkStatus::Connecting,
                        sec,
                    },
                },
            );
        }
    }

    /// Zero all score fields, keeping names and statuses
    pub fn zero_scores(&mut self) {
        for record in self.records.values_mut() {
            record.total = 0;
            record.plus = 0;
            record.minus = 0;
        }
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn get(&self, index: u32) -> Option<&RefereeRecord> {
        self.records.get(&index)
    }

    pub fn records(&self) -> &HashMap<u32, RefereeRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::messages::Score;

    fn payload(index: u32, total: i32, plus: i32, minus: i32, pri: LinkStatus) -> ScorePayload {
        ScorePayload {
            index,
            score: Score { total, plus, minus },
            status: DeviceStatus {
                pri,
                sec: LinkStatus::NotApplicable,
            },
        }
    }

    #[test]
    fn test_merge_creates_placeholder_record() {
        let mut mirror = RefereeMirror::new();

        mirror.merge(&payload(3, 5, 6, 1, LinkStatus::Connected));

        let record = mirror.get(3).unwrap();
        assert_eq!(record.name, "Referee 3");
        assert_eq!(record.total, 5);
        assert_eq!(record.plus, 6);
        assert_eq!(record.minus, 1);
        assert_eq!(record.status.pri, LinkStatus::Connected);
    }

    #[test]
    fn test_merge_preserves_name() {
        let mut mirror = RefereeMirror::new();
        mirror.install(&[RefereeDescriptor {
            index: 1,
            name: "Alice".to_string(),
            mode: RefereeMode::Single,
            pri_addr: None,
            sec_addr: None,
        }]);

        mirror.merge(&payload(1, 7, 2, 0, LinkStatus::Connected));

        let record = mirror.get(1).unwrap();
        assert_eq!(record.name, "Alice");
        assert_eq!(record.total, 7);
        assert_eq!(record.plus, 2);
        assert_eq!(record.minus, 0);
    }

    #[test]
    fn test_install_single_mode_marks_secondary_not_applicable() {
        let mut mirror = RefereeMirror::new();
        mirror.install(&[
            RefereeDescriptor {
                index: 1,
                name: "Ref A".to_string(),
                mode: RefereeMode::Single,
                pri_addr: None,
                sec_addr: None,
            },
            RefereeDescriptor {
                index: 2,
                name: "Ref B".to_string(),
                mode: RefereeMode::Dual,
                pri_addr: None,
                sec_addr: None,
            },
        ]);

        assert_eq!(mirror.get(1).unwrap().status.sec, LinkStatus::NotApplicable);
        assert_eq!(mirror.get(1).unwrap().status.pri, LinkStatus::Connecting);
        assert_eq!(mirror.get(2).unwrap().status.sec, LinkStatus::Connecting);
    }

    #[test]
    fn test_install_replaces_existing_record() {
        let mut mirror = RefereeMirror::new();
        mirror.merge(&payload(1, 9, 9, 0, LinkStatus::Connected));

        mirror.install(&[RefereeDescriptor {
            index: 1,
            name: "Fresh".to_string(),
            mode: RefereeMode::Single,
            pri_addr: None,
            sec_addr: None,
        }]);

        let record = mirror.get(1).unwrap();
        assert_eq!(record.name, "Fresh");
        assert_eq!(record.total, 0);
        assert_eq!(record.status.pri, LinkStatus::Connecting);
    }

    #[test]
    fn test_zero_scores_keeps_identity_and_status() {
        let mut mirror = RefereeMirror::new();
        mirror.merge(&payload(1, 5, 4, 1, LinkStatus::Connected));
        mirror.merge(&payload(2, 8, 8, 0, LinkStatus::Connected));

        mirror.zero_scores();

        for index in [1, 2] {
            let record = mirror.get(index).unwrap();
            assert_eq!(record.total, 0);
            assert_eq!(record.plus, 0);
            assert_eq!(record.minus, 0);
            assert_eq!(record.status.pri, LinkStatus::Connected);
        }
        assert_eq!(mirror.len(), 2);
    }

    #[test]
    fn test_clear_empties_mirror() {
        let mut mirror = RefereeMirror::new();
        mirror.merge(&payload(1, 1, 1, 0, LinkStatus::Connected));
        mirror.clear();
        assert!(mirror.is_empty());
    }
}
