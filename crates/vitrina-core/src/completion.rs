//! Day completion evaluator.
//!
//! Computes whether a day counts as sent, its tri-state status, and which
//! requirement dimensions are still missing, from the resolved requirement
//! and the set of current file versions. Pure; the caller persists the
//! outcome onto the UploadDay.

use std::collections::HashSet;

use crate::models::requirement::RequirementKind;
use crate::models::upload_day::DayStatus;
use crate::models::upload_file::{UploadFile, UploadKind};

/// Outcome of evaluating a day against its requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEvaluation {
    pub is_sent: bool,
    pub status: DayStatus,
    pub missing_kinds: Vec<UploadKind>,
    pub missing_slots: Vec<String>,
}

impl DayEvaluation {
    fn complete() -> Self {
        DayEvaluation {
            is_sent: true,
            status: DayStatus::Complete,
            missing_kinds: Vec::new(),
            missing_slots: Vec::new(),
        }
    }
}

fn normalize_slot(slot: &str) -> String {
    slot.trim().to_lowercase()
}

/// Evaluate `files` against `requirement`. Superseded versions
/// (`is_current_version == false`) are invisible. Slot names compare
/// trimmed and case-insensitive.
pub fn evaluate_day(
    requirement: RequirementKind,
    files: &[UploadFile],
    required_slots: &[String],
) -> DayEvaluation {
    let current: Vec<&UploadFile> = files.iter().filter(|f| f.is_current_version).collect();

    let covered: HashSet<String> = current
        .iter()
        .filter(|f| f.kind == UploadKind::Photo)
        .filter_map(|f| f.slot_name.as_deref())
        .map(normalize_slot)
        .collect();

    let missing_slots: Vec<String> = required_slots
        .iter()
        .filter(|s| !covered.contains(&normalize_slot(s)))
        .cloned()
        .collect();

    let any_photo = current.iter().any(|f| f.kind == UploadKind::Photo);
    let any_video = current.iter().any(|f| f.kind == UploadKind::Video);
    let any_file = !current.is_empty();

    // Slot-name-agnostic fallback: with no required slot list, any current
    // photo satisfies the photo dimension.
    let photo_ok = if required_slots.is_empty() {
        any_photo
    } else {
        missing_slots.is_empty()
    };
    let video_ok = any_video;

    match requirement {
        // A day with no requirement is vacuously satisfied.
        RequirementKind::None => DayEvaluation::complete(),

        RequirementKind::Photo => {
            let status = if photo_ok {
                DayStatus::Complete
            } else if any_photo {
                DayStatus::Partial
            } else {
                DayStatus::Pending
            };
            DayEvaluation {
                is_sent: photo_ok,
                status,
                missing_kinds: if photo_ok {
                    Vec::new()
                } else {
                    vec![UploadKind::Photo]
                },
                missing_slots,
            }
        }

        RequirementKind::Video => {
            let status = if video_ok {
                DayStatus::Complete
            } else if any_file {
                DayStatus::Partial
            } else {
                DayStatus::Pending
            };
            DayEvaluation {
                is_sent: video_ok,
                status,
                missing_kinds: if video_ok {
                    Vec::new()
                } else {
                    vec![UploadKind::Video]
                },
                // Videos are not slot-tracked.
                missing_slots: Vec::new(),
            }
        }

        RequirementKind::Both => {
            let sent = photo_ok && video_ok;
            let status = if sent {
                DayStatus::Complete
            } else if any_file {
                DayStatus::Partial
            } else {
                DayStatus::Pending
            };
            let mut missing_kinds = Vec::new();
            if !photo_ok {
                missing_kinds.push(UploadKind::Photo);
            }
            if !video_ok {
                missing_kinds.push(UploadKind::Video);
            }
            DayEvaluation {
                is_sent: sent,
                status,
                missing_kinds,
                missing_slots,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn photo(slot: &str) -> UploadFile {
        file(UploadKind::Photo, Some(slot))
    }

    fn video() -> UploadFile {
        file(UploadKind::Video, None)
    }

    fn file(kind: UploadKind, slot: Option<&str>) -> UploadFile {
        UploadFile {
            id: Uuid::new_v4(),
            day_id: Uuid::new_v4(),
            kind,
            slot_name: slot.map(String::from),
            version_group_id: Uuid::new_v4(),
            slot_sequence: 1,
            version_number: 1,
            is_current_version: true,
            supersedes_file_id: None,
            drive_file_id: "drive-file".to_string(),
            filename: "f".to_string(),
            original_filename: "f".to_string(),
            content_type: "image/jpeg".to_string(),
            size_bytes: 1024,
            uploaded_by: Uuid::new_v4(),
            uploaded_at: Utc::now(),
        }
    }

    fn slots(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn none_requirement_is_vacuously_complete() {
        let eval = evaluate_day(RequirementKind::None, &[], &[]);
        assert!(eval.is_sent);
        assert_eq!(eval.status, DayStatus::Complete);
        assert!(eval.missing_kinds.is_empty());
        assert!(eval.missing_slots.is_empty());
    }

    #[test]
    fn photo_slot_coverage_progression() {
        let required = slots(&["ESCAPARATE", "FACHADA"]);

        let empty = evaluate_day(RequirementKind::Photo, &[], &required);
        assert_eq!(empty.status, DayStatus::Pending);
        assert!(!empty.is_sent);
        assert_eq!(empty.missing_slots, required);

        let one = vec![photo("ESCAPARATE")];
        let partial = evaluate_day(RequirementKind::Photo, &one, &required);
        assert_eq!(partial.status, DayStatus::Partial);
        assert!(!partial.is_sent);
        assert_eq!(partial.missing_slots, slots(&["FACHADA"]));
        assert_eq!(partial.missing_kinds, vec![UploadKind::Photo]);

        let both = vec![photo("ESCAPARATE"), photo("FACHADA")];
        let complete = evaluate_day(RequirementKind::Photo, &both, &required);
        assert_eq!(complete.status, DayStatus::Complete);
        assert!(complete.is_sent);
        assert!(complete.missing_slots.is_empty());
        assert!(complete.missing_kinds.is_empty());
    }

    #[test]
    fn slot_comparison_is_trimmed_and_case_insensitive() {
        let required = slots(&["Escaparate"]);
        let files = vec![photo("  ESCAPARATE ")];
        let eval = evaluate_day(RequirementKind::Photo, &files, &required);
        assert!(eval.is_sent);
        assert!(eval.missing_slots.is_empty());
    }

    #[test]
    fn empty_slot_list_falls_back_to_any_photo() {
        let none = evaluate_day(RequirementKind::Photo, &[], &[]);
        assert_eq!(none.status, DayStatus::Pending);

        let files = vec![photo("WHATEVER")];
        let eval = evaluate_day(RequirementKind::Photo, &files, &[]);
        assert!(eval.is_sent);
        assert_eq!(eval.status, DayStatus::Complete);
    }

    #[test]
    fn video_requirement_ignores_slots() {
        let required = slots(&["ESCAPARATE"]);

        let empty = evaluate_day(RequirementKind::Video, &[], &required);
        assert_eq!(empty.status, DayStatus::Pending);
        assert_eq!(empty.missing_kinds, vec![UploadKind::Video]);
        assert!(empty.missing_slots.is_empty());

        let with_video = vec![video()];
        let eval = evaluate_day(RequirementKind::Video, &with_video, &required);
        assert!(eval.is_sent);
        assert_eq!(eval.status, DayStatus::Complete);
    }

    #[test]
    fn photo_without_video_still_counts_as_partial_for_video_requirement() {
        let files = vec![photo("ESCAPARATE")];
        let eval = evaluate_day(RequirementKind::Video, &files, &[]);
        assert_eq!(eval.status, DayStatus::Partial);
        assert!(!eval.is_sent);
    }

    #[test]
    fn both_tracks_missing_dimensions() {
        let required = slots(&["ESCAPARATE", "FACHADA"]);
        let files = vec![photo("ESCAPARATE"), photo("FACHADA")];
        let eval = evaluate_day(RequirementKind::Both, &files, &required);
        assert_eq!(eval.status, DayStatus::Partial);
        assert!(!eval.is_sent);
        assert_eq!(eval.missing_kinds, vec![UploadKind::Video]);
        assert!(eval.missing_slots.is_empty());

        let all = vec![photo("ESCAPARATE"), photo("FACHADA"), video()];
        let done = evaluate_day(RequirementKind::Both, &all, &required);
        assert!(done.is_sent);
        assert_eq!(done.status, DayStatus::Complete);
        assert!(done.missing_kinds.is_empty());
    }

    #[test]
    fn superseded_versions_are_invisible() {
        let required = slots(&["ESCAPARATE"]);
        let mut old = photo("ESCAPARATE");
        old.is_current_version = false;
        let eval = evaluate_day(RequirementKind::Photo, &[old], &required);
        assert_eq!(eval.status, DayStatus::Pending);
        assert!(!eval.is_sent);
        assert_eq!(eval.missing_slots, required);
    }

    /// Upload ESCAPARATE -> PARTIAL, upload FACHADA -> COMPLETE, delete
    /// FACHADA -> back to PARTIAL.
    #[test]
    fn upload_then_delete_reverts_to_partial() {
        let required = slots(&["ESCAPARATE", "FACHADA"]);

        let step1 = vec![photo("ESCAPARATE")];
        assert_eq!(
            evaluate_day(RequirementKind::Photo, &step1, &required).status,
            DayStatus::Partial
        );

        let step2 = vec![photo("ESCAPARATE"), photo("FACHADA")];
        let sent = evaluate_day(RequirementKind::Photo, &step2, &required);
        assert!(sent.is_sent);
        assert_eq!(sent.status, DayStatus::Complete);

        // FACHADA deleted: its group has no remaining version.
        let step3 = vec![photo("ESCAPARATE")];
        let reverted = evaluate_day(RequirementKind::Photo, &step3, &required);
        assert!(!reverted.is_sent);
        assert_eq!(reverted.status, DayStatus::Partial);
        assert_eq!(reverted.missing_slots, slots(&["FACHADA"]));
    }
}
