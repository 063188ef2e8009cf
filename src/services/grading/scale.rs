use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::GradingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub(crate) enum GradeLetter {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
    /// Not graded yet; carries no grade points.
    #[serde(rename = "I")]
    Incomplete,
    /// Left the course; carries no grade points.
    #[serde(rename = "W")]
    Withdrawn,
}

impl GradeLetter {
    pub(crate) const ALL: [GradeLetter; 14] = [
        Self::APlus,
        Self::A,
        Self::AMinus,
        Self::BPlus,
        Self::B,
        Self::BMinus,
        Self::CPlus,
        Self::C,
        Self::CMinus,
        Self::DPlus,
        Self::D,
        Self::F,
        Self::Incomplete,
        Self::Withdrawn,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
            Self::Incomplete => "I",
            Self::Withdrawn => "W",
        }
    }

    /// Points on the 4.0 scale. `None` for standings outside the GPA table.
    pub(crate) fn grade_points(self) -> Option<f64> {
        match self {
            Self::APlus | Self::A => Some(4.0),
            Self::AMinus => Some(3.7),
            Self::BPlus => Some(3.3),
            Self::B => Some(3.0),
            Self::BMinus => Some(2.7),
            Self::CPlus => Some(2.3),
            Self::C => Some(2.0),
            Self::CMinus => Some(1.7),
            Self::DPlus => Some(1.3),
            Self::D => Some(1.0),
            Self::F => Some(0.0),
            Self::Incomplete | Self::Withdrawn => None,
        }
    }

    /// Position in academic order, best first.
    pub(crate) fn rank(self) -> usize {
        Self::ALL.iter().position(|letter| *letter == self).unwrap_or(Self::ALL.len())
    }

    fn is_scale_letter(self) -> bool {
        self.grade_points().is_some()
    }
}

impl fmt::Display for GradeLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GradeLetter {
    type Err = ScaleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|letter| letter.label() == trimmed)
            .ok_or_else(|| ScaleError::UnknownLetter(trimmed.to_string()))
    }
}

const DEFAULT_BANDS: [(f64, GradeLetter); 12] = [
    (97.0, GradeLetter::APlus),
    (93.0, GradeLetter::A),
    (90.0, GradeLetter::AMinus),
    (87.0, GradeLetter::BPlus),
    (83.0, GradeLetter::B),
    (80.0, GradeLetter::BMinus),
    (77.0, GradeLetter::CPlus),
    (73.0, GradeLetter::C),
    (70.0, GradeLetter::CMinus),
    (67.0, GradeLetter::DPlus),
    (60.0, GradeLetter::D),
    (0.0, GradeLetter::F),
];

#[derive(Debug, Error, PartialEq)]
pub(crate) enum ScaleError {
    #[error("unknown grade letter '{0}'")]
    UnknownLetter(String),
    #[error("'{0}' is not a graded letter")]
    NotGradable(GradeLetter),
    #[error("malformed band '{0}', expected LETTER=MIN")]
    MalformedBand(String),
    #[error("threshold for {letter} must be within 0..=100, got {value}")]
    OutOfRange { letter: GradeLetter, value: f64 },
    #[error("letter {0} appears more than once")]
    DuplicateLetter(GradeLetter),
    #[error("thresholds must be strictly descending")]
    NotDescending,
    #[error("lowest band must start at 0")]
    MissingFloor,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct GradeBand {
    min_percentage: f64,
    letter: GradeLetter,
}

/// Lower-bound-inclusive percentage bands, highest first.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradeScale {
    bands: Vec<GradeBand>,
}

impl Default for GradeScale {
    fn default() -> Self {
        Self {
            bands: DEFAULT_BANDS
                .iter()
                .map(|(min_percentage, letter)| GradeBand {
                    min_percentage: *min_percentage,
                    letter: *letter,
                })
                .collect(),
        }
    }
}

impl GradeScale {
    pub(crate) fn letter_for(&self, percentage: f64) -> GradeLetter {
        self.bands
            .iter()
            .find(|band| percentage >= band.min_percentage)
            .map(|band| band.letter)
            .unwrap_or(GradeLetter::F)
    }
}

impl FromStr for GradeScale {
    type Err = ScaleError;

    /// Parses `"A+=97,A=93,...,F=0"`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut bands: Vec<GradeBand> = Vec::new();

        for item in raw.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            let (letter, min) =
                item.split_once('=').ok_or_else(|| ScaleError::MalformedBand(item.to_string()))?;
            let letter: GradeLetter = letter.parse()?;
            if !letter.is_scale_letter() {
                return Err(ScaleError::NotGradable(letter));
            }
            let min_percentage: f64 =
                min.trim().parse().map_err(|_| ScaleError::MalformedBand(item.to_string()))?;
            if !(0.0..=100.0).contains(&min_percentage) {
                return Err(ScaleError::OutOfRange { letter, value: min_percentage });
            }
            if bands.iter().any(|band| band.letter == letter) {
                return Err(ScaleError::DuplicateLetter(letter));
            }
            bands.push(GradeBand { min_percentage, letter });
        }

        bands.sort_by(|a, b| b.min_percentage.total_cmp(&a.min_percentage));
        if bands.windows(2).any(|pair| pair[0].min_percentage == pair[1].min_percentage) {
            return Err(ScaleError::NotDescending);
        }
        match bands.last() {
            Some(lowest) if lowest.min_percentage == 0.0 => Ok(Self { bands }),
            _ => Err(ScaleError::MissingFloor),
        }
    }
}

/// `marks_obtained / total_marks * 100`, rounded half away from zero to two decimals.
pub(crate) fn percentage(marks_obtained: f64, total_marks: f64) -> Result<f64, GradingError> {
    if !total_marks.is_finite() || total_marks <= 0.0 {
        return Err(GradingError::Division { total: total_marks });
    }

    Ok(round_two_decimals(marks_obtained / total_marks * 100.0))
}

pub(super) fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_two_decimals() {
        assert_eq!(percentage(85.0, 100.0).unwrap(), 85.0);
        assert_eq!(percentage(1.0, 3.0).unwrap(), 33.33);
        assert_eq!(percentage(2.0, 3.0).unwrap(), 66.67);
        assert_eq!(percentage(0.0, 40.0).unwrap(), 0.0);
    }

    #[test]
    fn percentage_rejects_non_positive_total() {
        assert!(matches!(percentage(5.0, 0.0), Err(GradingError::Division { .. })));
        assert!(matches!(percentage(5.0, -10.0), Err(GradingError::Division { .. })));
        assert!(matches!(percentage(5.0, f64::NAN), Err(GradingError::Division { .. })));
    }

    fn letter_grade(pct: f64) -> GradeLetter {
        GradeScale::default().letter_for(pct)
    }

    #[test]
    fn letter_boundaries_are_inclusive_at_lower_edge() {
        assert_eq!(letter_grade(59.99), GradeLetter::F);
        assert_eq!(letter_grade(60.0), GradeLetter::D);
        assert_eq!(letter_grade(66.99), GradeLetter::D);
        assert_eq!(letter_grade(67.0), GradeLetter::DPlus);
        assert_eq!(letter_grade(83.0), GradeLetter::B);
        assert_eq!(letter_grade(96.99), GradeLetter::A);
        assert_eq!(letter_grade(97.0), GradeLetter::APlus);
        assert_eq!(letter_grade(100.0), GradeLetter::APlus);
        assert_eq!(letter_grade(0.0), GradeLetter::F);
    }

    #[test]
    fn letters_never_improve_as_percentage_drops() {
        let mut previous_rank = 0;
        let mut hundredths = 10_000;
        while hundredths >= 0 {
            let pct = f64::from(hundredths) / 100.0;
            let rank = letter_grade(pct).rank();
            assert!(rank >= previous_rank, "letter improved at {pct}");
            previous_rank = rank;
            hundredths -= 1;
        }
    }

    #[test]
    fn default_scale_matches_fixed_table() {
        let scale = GradeScale::default();
        for (min, letter) in DEFAULT_BANDS {
            assert_eq!(scale.letter_for(min), letter);
            if min > 0.0 {
                assert_ne!(scale.letter_for(min - 0.01), letter);
            }
        }
    }

    #[test]
    fn parsed_scale_is_order_independent() {
        let scale: GradeScale = "F=0, B=70, A=85".parse().expect("scale");
        assert_eq!(scale.letter_for(90.0), GradeLetter::A);
        assert_eq!(scale.letter_for(70.0), GradeLetter::B);
        assert_eq!(scale.letter_for(69.99), GradeLetter::F);
    }

    #[test]
    fn parsed_scale_validation() {
        assert_eq!("A=90,B=80".parse::<GradeScale>(), Err(ScaleError::MissingFloor));
        assert_eq!(
            "A=90,B=90,F=0".parse::<GradeScale>(),
            Err(ScaleError::NotDescending)
        );
        assert_eq!(
            "A=90,A=80,F=0".parse::<GradeScale>(),
            Err(ScaleError::DuplicateLetter(GradeLetter::A))
        );
        assert_eq!(
            "I=50,F=0".parse::<GradeScale>(),
            Err(ScaleError::NotGradable(GradeLetter::Incomplete))
        );
        assert_eq!(
            "A=120,F=0".parse::<GradeScale>(),
            Err(ScaleError::OutOfRange { letter: GradeLetter::A, value: 120.0 })
        );
        assert!(matches!("A90,F=0".parse::<GradeScale>(), Err(ScaleError::MalformedBand(_))));
        assert!(matches!("Z=90,F=0".parse::<GradeScale>(), Err(ScaleError::UnknownLetter(_))));
    }

    #[test]
    fn grade_points_follow_four_point_table() {
        assert_eq!(GradeLetter::APlus.grade_points(), Some(4.0));
        assert_eq!(GradeLetter::A.grade_points(), Some(4.0));
        assert_eq!(GradeLetter::BMinus.grade_points(), Some(2.7));
        assert_eq!(GradeLetter::F.grade_points(), Some(0.0));
        assert_eq!(GradeLetter::Withdrawn.grade_points(), None);
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for letter in GradeLetter::ALL {
            assert_eq!(letter.label().parse::<GradeLetter>().unwrap(), letter);
        }
    }
}
