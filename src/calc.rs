use crate::model::{Laboratory, SemesterRecord, Subject};

/// 2-decimal rounding used everywhere a GPA is reported.
pub fn round_off_2_decimals(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Piecewise threshold mapping from total marks to a grade point.
/// Step function; no interpolation between thresholds.
pub fn subject_grade(total_marks: f64) -> i64 {
    if total_marks >= 90.0 {
        10
    } else if total_marks >= 80.0 {
        9
    } else if total_marks >= 70.0 {
        8
    } else if total_marks >= 60.0 {
        7
    } else if total_marks >= 50.0 {
        6
    } else if total_marks >= 40.0 {
        5
    } else {
        0
    }
}

/// Credit-weighted mean grade for one semester.
///
/// A subject counts only when mid1, mid2 and semExam are all present;
/// its total is `(mid1+mid2)/2 + semExam`. A lab counts when its marks are
/// present and is graded on the same thresholds. Anything with a missing
/// mark is excluded from both numerator and denominator.
pub fn compute_sgpa(subjects: &[Subject], labs: &[Laboratory]) -> f64 {
    let mut grade_points = 0.0_f64;
    let mut total_credits = 0_i64;

    for s in subjects {
        let (Some(mid1), Some(mid2), Some(sem_exam)) = (s.mid1, s.mid2, s.sem_exam) else {
            continue;
        };
        let total = (mid1 + mid2) as f64 / 2.0 + sem_exam as f64;
        grade_points += (subject_grade(total) * s.credits) as f64;
        total_credits += s.credits;
    }

    for l in labs {
        let Some(marks) = l.marks else {
            continue;
        };
        grade_points += (subject_grade(marks as f64) * l.credits) as f64;
        total_credits += l.credits;
    }

    if total_credits > 0 {
        round_off_2_decimals(grade_points / total_credits as f64)
    } else {
        0.0
    }
}

/// Unweighted mean of the completed semesters' SGPA values.
///
/// Deliberately NOT credit-weighted: the legacy behavior averages the
/// per-semester SGPAs directly and consumers depend on that.
pub fn compute_cgpa(records: &[SemesterRecord]) -> f64 {
    let completed: Vec<f64> = records.iter().filter_map(|r| r.sgpa).collect();
    if completed.is_empty() {
        return 0.0;
    }
    round_off_2_decimals(completed.iter().sum::<f64>() / completed.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(
        mid1: Option<i64>,
        mid2: Option<i64>,
        sem_exam: Option<i64>,
        credits: i64,
    ) -> Subject {
        Subject {
            name: "Subject".to_string(),
            mid1,
            mid2,
            sem_exam,
            credits,
        }
    }

    fn lab(marks: Option<i64>, credits: i64) -> Laboratory {
        Laboratory {
            name: "Lab".to_string(),
            marks,
            credits,
        }
    }

    fn semester(semester: i64, sgpa: Option<f64>) -> SemesterRecord {
        SemesterRecord {
            semester,
            subjects: vec![],
            labs: vec![],
            sgpa,
        }
    }

    #[test]
    fn grade_matches_threshold_table_at_boundaries() {
        let cases = [
            (0.0, 0),
            (39.0, 0),
            (39.5, 0),
            (40.0, 5),
            (49.0, 5),
            (50.0, 6),
            (59.0, 6),
            (60.0, 7),
            (69.0, 7),
            (70.0, 8),
            (79.0, 8),
            (80.0, 9),
            (89.0, 9),
            (90.0, 10),
            (100.0, 10),
        ];
        for (total, expected) in cases {
            assert_eq!(subject_grade(total), expected, "total {}", total);
        }
    }

    #[test]
    fn grade_is_monotonic_non_decreasing() {
        let mut prev = subject_grade(0.0);
        for i in 1..=200 {
            let g = subject_grade(i as f64 / 2.0);
            assert!(g >= prev, "grade dropped at {}", i as f64 / 2.0);
            prev = g;
        }
    }

    #[test]
    fn sgpa_of_nothing_is_zero() {
        assert_eq!(compute_sgpa(&[], &[]), 0.0);
    }

    #[test]
    fn sgpa_weights_grades_by_credits() {
        // 95 -> 10 on 3 credits, lab 85 -> 9 on 1 credit: (30 + 9) / 4
        let subjects = vec![subject(Some(50), Some(50), Some(45), 3)];
        let labs = vec![lab(Some(85), 1)];
        assert_eq!(compute_sgpa(&subjects, &labs), 9.75);
    }

    #[test]
    fn sgpa_excludes_subjects_with_any_absent_mark() {
        // The incomplete subject contributes nothing, not zero: its credits
        // must not dilute the denominator.
        let subjects = vec![
            subject(Some(40), Some(40), Some(55), 4), // 95 -> 10
            subject(Some(40), Some(40), None, 4),     // semExam absent
        ];
        assert_eq!(compute_sgpa(&subjects, &[]), 10.0);
    }

    #[test]
    fn sgpa_excludes_labs_with_absent_marks() {
        let labs = vec![lab(Some(92), 2), lab(None, 2)];
        assert_eq!(compute_sgpa(&[], &labs), 10.0);
    }

    #[test]
    fn sgpa_rounds_to_two_decimals() {
        // grades 10, 9, 9 on 1 credit each: 28 / 3 = 9.333... -> 9.33
        let labs = vec![lab(Some(95), 1), lab(Some(85), 1), lab(Some(80), 1)];
        assert_eq!(compute_sgpa(&[], &labs), 9.33);
    }

    #[test]
    fn cgpa_is_unweighted_mean_of_completed_semesters() {
        let records = vec![semester(1, Some(8.0)), semester(2, Some(9.0))];
        assert_eq!(compute_cgpa(&records), 8.5);
    }

    #[test]
    fn cgpa_skips_semesters_without_sgpa() {
        let records = vec![semester(1, Some(7.5)), semester(2, None)];
        assert_eq!(compute_cgpa(&records), 7.5);
    }

    #[test]
    fn cgpa_of_no_records_is_zero() {
        assert_eq!(compute_cgpa(&[]), 0.0);
    }
}
