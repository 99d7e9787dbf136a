//! Deterministic destination folder path.
//!
//! Every upload lands in the same folder for a given store and date:
//! cluster name, store label, year, month, ISO week, weekday. Folder names
//! carry Spanish labels to match the shared Drive tree.

use chrono::{Datelike, NaiveDate};

const MONTHS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Indexed by days-from-Sunday, matching the rule tables' weekday index.
const WEEKDAYS: [&str; 7] = [
    "Domingo",
    "Lunes",
    "Martes",
    "Miércoles",
    "Jueves",
    "Viernes",
    "Sábado",
];

/// Ordered folder names from the shared root down to the day folder. The
/// cluster segment is omitted for stores without a cluster.
pub fn day_folder_segments(
    cluster_name: Option<&str>,
    store_label: &str,
    date: NaiveDate,
) -> Vec<String> {
    let mut segments = Vec::with_capacity(6);
    if let Some(cluster) = cluster_name {
        segments.push(cluster.to_string());
    }
    segments.push(store_label.to_string());
    segments.push(date.year().to_string());
    segments.push(format!(
        "{:02} - {}",
        date.month(),
        MONTHS[date.month0() as usize]
    ));
    segments.push(format!("Semana {:02}", date.iso_week().week()));
    segments.push(format!(
        "{:02} - {}",
        date.day(),
        WEEKDAYS[date.weekday().num_days_from_sunday() as usize]
    ));
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_deterministic_for_clustered_store() {
        // 2026-02-26 is a Thursday in ISO week 9.
        let date = NaiveDate::from_ymd_opt(2026, 2, 26).unwrap();
        let segments = day_folder_segments(Some("Centro"), "T042 - Goya", date);
        assert_eq!(
            segments,
            vec![
                "Centro",
                "T042 - Goya",
                "2026",
                "02 - Febrero",
                "Semana 09",
                "26 - Jueves",
            ]
        );
    }

    #[test]
    fn cluster_segment_is_omitted_without_cluster() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 4).unwrap();
        let segments = day_folder_segments(None, "T007 - Sol", date);
        assert_eq!(segments[0], "T007 - Sol");
        // 2026-01-04 is a Sunday, still in ISO week 1.
        assert_eq!(segments.last().unwrap(), "04 - Domingo");
        assert_eq!(segments[3], "Semana 01");
    }
}
