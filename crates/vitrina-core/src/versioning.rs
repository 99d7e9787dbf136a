//! Version group bookkeeping.
//!
//! Within a version group exactly one file is current at any time. The
//! choices here are pure so the invariant is unit-testable; the flag flips
//! themselves happen inside one database transaction.

use crate::models::upload_file::{UploadFile, UploadKind};

/// Version number for a new file in a group: one past the highest existing
/// version, starting at 1 for a fresh group.
pub fn next_version_number(group: &[UploadFile]) -> i32 {
    group.iter().map(|f| f.version_number).max().unwrap_or(0) + 1
}

/// After the current version of a group is deleted, the next-most-recent
/// remaining version is promoted. Returns `None` when the group is empty,
/// leaving the group with no current file.
pub fn promote_candidate(remaining: &[UploadFile]) -> Option<&UploadFile> {
    remaining.iter().max_by_key(|f| f.version_number)
}

/// Sequence number for a brand-new file within a slot: one past the number
/// of distinct version groups already present for that slot (videos count
/// all video groups of the day).
pub fn next_slot_sequence(day_files: &[UploadFile], kind: UploadKind, slot: Option<&str>) -> i32 {
    let norm = slot.map(|s| s.trim().to_lowercase());
    let mut groups: Vec<uuid::Uuid> = day_files
        .iter()
        .filter(|f| f.kind == kind)
        .filter(|f| match (&norm, &f.slot_name) {
            (Some(want), Some(have)) => have.trim().to_lowercase() == *want,
            (None, None) => true,
            _ => false,
        })
        .map(|f| f.version_group_id)
        .collect();
    groups.sort();
    groups.dedup();
    groups.len() as i32 + 1
}

/// Deterministic Drive filename: slot label (or VIDEO), sequence within the
/// slot, version within the group, original extension.
pub fn final_filename(
    kind: UploadKind,
    slot: Option<&str>,
    sequence: i32,
    version: i32,
    original_filename: &str,
) -> String {
    let label = match (kind, slot) {
        (UploadKind::Photo, Some(s)) => s.trim().to_uppercase(),
        (UploadKind::Photo, None) => "FOTO".to_string(),
        (UploadKind::Video, Some(s)) => s.trim().to_uppercase(),
        (UploadKind::Video, None) => "VIDEO".to_string(),
    };
    let extension = original_filename
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|e| !e.is_empty() && e.len() <= 8)
        .unwrap_or("bin")
        .to_lowercase();
    format!("{}_{:02}_v{}.{}", label, sequence, version, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn version(group: Uuid, number: i32, current: bool) -> UploadFile {
        UploadFile {
            id: Uuid::new_v4(),
            day_id: Uuid::new_v4(),
            kind: UploadKind::Photo,
            slot_name: Some("ESCAPARATE".to_string()),
            version_group_id: group,
            slot_sequence: 1,
            version_number: number,
            is_current_version: current,
            supersedes_file_id: None,
            drive_file_id: format!("drive-{}", number),
            filename: "f.jpg".to_string(),
            original_filename: "f.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            size_bytes: 100,
            uploaded_by: Uuid::new_v4(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn version_numbers_are_monotonic() {
        let group = Uuid::new_v4();
        assert_eq!(next_version_number(&[]), 1);
        let files = vec![version(group, 1, false), version(group, 2, true)];
        assert_eq!(next_version_number(&files), 3);
    }

    #[test]
    fn promotion_picks_latest_remaining_version() {
        let group = Uuid::new_v4();
        let remaining = vec![version(group, 1, false), version(group, 3, false)];
        let promoted = promote_candidate(&remaining).unwrap();
        assert_eq!(promoted.version_number, 3);
    }

    #[test]
    fn promotion_of_empty_group_yields_none() {
        assert!(promote_candidate(&[]).is_none());
    }

    /// After any replace/delete sequence, promoting at most one candidate
    /// keeps the exactly-zero-or-one-current invariant.
    #[test]
    fn replace_then_delete_keeps_single_current() {
        let group = Uuid::new_v4();
        // v1 superseded by v2 superseded by v3; delete v3, then v2.
        let mut files = vec![
            version(group, 1, false),
            version(group, 2, false),
            version(group, 3, true),
        ];
        files.retain(|f| f.version_number != 3);
        if let Some(candidate) = promote_candidate(&files).map(|f| f.id) {
            for f in &mut files {
                f.is_current_version = f.id == candidate;
            }
        }
        assert_eq!(files.iter().filter(|f| f.is_current_version).count(), 1);
        assert_eq!(
            files.iter().find(|f| f.is_current_version).unwrap().version_number,
            2
        );

        files.retain(|f| f.version_number != 2);
        if let Some(candidate) = promote_candidate(&files).map(|f| f.id) {
            for f in &mut files {
                f.is_current_version = f.id == candidate;
            }
        }
        assert_eq!(files.iter().filter(|f| f.is_current_version).count(), 1);
    }

    #[test]
    fn slot_sequence_counts_distinct_groups() {
        let g1 = Uuid::new_v4();
        let g2 = Uuid::new_v4();
        let files = vec![
            version(g1, 1, false),
            version(g1, 2, true),
            version(g2, 1, true),
        ];
        assert_eq!(
            next_slot_sequence(&files, UploadKind::Photo, Some("escaparate")),
            3
        );
        assert_eq!(
            next_slot_sequence(&files, UploadKind::Photo, Some("FACHADA")),
            1
        );
        assert_eq!(next_slot_sequence(&files, UploadKind::Video, None), 1);
    }

    #[test]
    fn filenames_are_deterministic() {
        assert_eq!(
            final_filename(UploadKind::Photo, Some("escaparate"), 1, 2, "IMG_0042.JPG"),
            "ESCAPARATE_01_v2.jpg"
        );
        assert_eq!(
            final_filename(UploadKind::Video, None, 3, 1, "clip.mp4"),
            "VIDEO_03_v1.mp4"
        );
        assert_eq!(
            final_filename(UploadKind::Video, None, 1, 1, "noextension"),
            "VIDEO_01_v1.bin"
        );
    }
}
