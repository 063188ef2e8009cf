use std::collections::HashMap;

use serde::Serialize;

use super::record::GradeRecord;
use super::scale::{round_two_decimals, GradeLetter};

/// Anything that may carry a percentage and a letter.
///
/// Items that could not be scored (for example a grade whose exam is
/// missing from the catalog) return `None` and are skipped by the
/// aggregates below.
pub(crate) trait Scored {
    fn percentage(&self) -> Option<f64>;
    fn letter(&self) -> Option<GradeLetter>;
}

impl Scored for GradeRecord {
    fn percentage(&self) -> Option<f64> {
        Some(GradeRecord::percentage(self))
    }

    fn letter(&self) -> Option<GradeLetter> {
        Some(GradeRecord::letter(self))
    }
}

/// Mean percentage, or `None` when nothing was scored.
pub(crate) fn average_percentage<T: Scored>(records: &[T]) -> Option<f64> {
    let (sum, count) = records
        .iter()
        .filter_map(Scored::percentage)
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Count per letter; letters that never occur are absent.
pub(crate) fn grade_distribution<T: Scored>(records: &[T]) -> HashMap<GradeLetter, usize> {
    let mut counts = HashMap::new();
    for letter in records.iter().filter_map(Scored::letter) {
        *counts.entry(letter).or_insert(0) += 1;
    }
    counts
}

/// Mean grade points over letters in the 4.0 table. I/W and unscored
/// records are left out of both sums.
pub(crate) fn gpa<T: Scored>(records: &[T]) -> f64 {
    let (points, count) = records
        .iter()
        .filter_map(Scored::letter)
        .filter_map(GradeLetter::grade_points)
        .fold((0.0, 0usize), |(points, count), value| (points + value, count + 1));

    if count == 0 {
        0.0
    } else {
        points / count as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum DistributionOrder {
    /// Plain string order of the labels ("A" < "A+" < "A-" < "B").
    #[default]
    Lexicographic,
    /// Academic order, best letter first.
    Rank,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct DistributionEntry {
    pub(crate) letter: GradeLetter,
    pub(crate) count: usize,
}

pub(crate) fn ordered_distribution(
    counts: &HashMap<GradeLetter, usize>,
    order: DistributionOrder,
) -> Vec<DistributionEntry> {
    let mut entries: Vec<DistributionEntry> = counts
        .iter()
        .map(|(letter, count)| DistributionEntry { letter: *letter, count: *count })
        .collect();

    match order {
        DistributionOrder::Lexicographic => entries.sort_by_key(|entry| entry.letter.label()),
        DistributionOrder::Rank => entries.sort_by_key(|entry| entry.letter.rank()),
    }
    entries
}

/// Display-ready summary; average and GPA are rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GradeSummary {
    pub(crate) record_count: usize,
    pub(crate) scored_count: usize,
    pub(crate) average_percentage: Option<f64>,
    pub(crate) gpa: f64,
    pub(crate) distribution: Vec<DistributionEntry>,
}

impl GradeSummary {
    pub(crate) fn from_records<T: Scored>(records: &[T], order: DistributionOrder) -> Self {
        Self {
            record_count: records.len(),
            scored_count: records.iter().filter(|record| record.letter().is_some()).count(),
            average_percentage: average_percentage(records).map(round_two_decimals),
            gpa: round_two_decimals(gpa(records)),
            distribution: ordered_distribution(&grade_distribution(records), order),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(Option<f64>, Option<GradeLetter>);

    impl Scored for Row {
        fn percentage(&self) -> Option<f64> {
            self.0
        }

        fn letter(&self) -> Option<GradeLetter> {
            self.1
        }
    }

    fn scored(pct: f64, letter: GradeLetter) -> Row {
        Row(Some(pct), Some(letter))
    }

    #[test]
    fn empty_input_has_no_average_and_zero_gpa() {
        let rows: Vec<Row> = Vec::new();
        assert_eq!(average_percentage(&rows), None);
        assert_eq!(gpa(&rows), 0.0);
        assert!(grade_distribution(&rows).is_empty());
    }

    #[test]
    fn average_is_arithmetic_mean() {
        let rows = vec![scored(90.0, GradeLetter::AMinus), scored(70.0, GradeLetter::CMinus)];
        assert_eq!(average_percentage(&rows), Some(80.0));
    }

    #[test]
    fn gpa_skips_non_table_letters_instead_of_counting_zero() {
        let rows = vec![
            scored(95.0, GradeLetter::A),
            scored(85.0, GradeLetter::B),
            scored(10.0, GradeLetter::Incomplete),
            scored(0.0, GradeLetter::Withdrawn),
        ];
        assert!((gpa(&rows) - 3.5).abs() < 1e-9);
    }

    #[test]
    fn gpa_is_zero_when_only_standings_present() {
        let rows = vec![scored(0.0, GradeLetter::Withdrawn)];
        assert_eq!(gpa(&rows), 0.0);
    }

    #[test]
    fn distribution_counts_exclude_unscored_rows() {
        let rows = vec![
            scored(85.0, GradeLetter::B),
            scored(84.0, GradeLetter::B),
            scored(98.0, GradeLetter::APlus),
            Row(None, None),
        ];
        let counts = grade_distribution(&rows);
        assert_eq!(counts.get(&GradeLetter::B), Some(&2));
        assert_eq!(counts.get(&GradeLetter::APlus), Some(&1));
        assert_eq!(counts.get(&GradeLetter::F), None);
        assert_eq!(counts.values().sum::<usize>(), rows.len() - 1);
    }

    #[test]
    fn unscored_rows_do_not_block_average() {
        let rows = vec![Row(None, None), scored(50.0, GradeLetter::F)];
        assert_eq!(average_percentage(&rows), Some(50.0));
    }

    #[test]
    fn lexicographic_order_follows_labels() {
        let rows = vec![
            scored(85.0, GradeLetter::B),
            scored(91.0, GradeLetter::AMinus),
            scored(98.0, GradeLetter::APlus),
            scored(95.0, GradeLetter::A),
        ];
        let ordered =
            ordered_distribution(&grade_distribution(&rows), DistributionOrder::Lexicographic);
        let labels: Vec<&str> = ordered.iter().map(|entry| entry.letter.label()).collect();
        assert_eq!(labels, vec!["A", "A+", "A-", "B"]);
    }

    #[test]
    fn rank_order_puts_best_letter_first() {
        let rows = vec![
            scored(85.0, GradeLetter::B),
            scored(91.0, GradeLetter::AMinus),
            scored(98.0, GradeLetter::APlus),
            scored(95.0, GradeLetter::A),
        ];
        let ordered = ordered_distribution(&grade_distribution(&rows), DistributionOrder::Rank);
        let labels: Vec<&str> = ordered.iter().map(|entry| entry.letter.label()).collect();
        assert_eq!(labels, vec!["A+", "A", "A-", "B"]);
    }

    #[test]
    fn summary_rounds_for_display() {
        let rows = vec![
            scored(90.0, GradeLetter::AMinus),
            scored(80.0, GradeLetter::BMinus),
            scored(81.0, GradeLetter::BMinus),
            Row(None, None),
        ];
        let summary = GradeSummary::from_records(&rows, DistributionOrder::default());
        assert_eq!(summary.record_count, 4);
        assert_eq!(summary.scored_count, 3);
        assert_eq!(summary.average_percentage, Some(83.67));
        assert_eq!(summary.gpa, 3.03);
    }
}
