// Integration tests for the weak_null_statistics crate
// These drive the estimators the way a permutation-test orchestrator would:
// many subjects, many label permutations, one independent seed per call.

#[cfg(test)]
mod integration_tests {
    use rand::seq::SliceRandom;
    use rayon::prelude::*;
    use weak_null_statistics::data::{TrialFrame, TrialTable};
    use weak_null_statistics::estimation::{
        ClassificationParams, SignConsistencyParams, SubjectEstimator, SubjectStatistic, Summary,
    };
    use weak_null_statistics::seed::{derive_seed, seeded_rng};

    /// Subjects with strong effects of opposite sign: the group mean cancels.
    fn opposing_subjects() -> Vec<TrialFrame> {
        (0..6)
            .map(|s| {
                let direction = if s % 2 == 0 { 1.0 } else { -1.0 };
                let conditions: Vec<&str> = (0..24)
                    .map(|i| if i % 2 == 0 { "left" } else { "right" })
                    .collect();
                let rts: Vec<f64> = (0..24)
                    .map(|i| {
                        let base = 400.0 + (i % 6) as f64 * 3.0;
                        if i % 2 == 0 { base + direction * 60.0 } else { base }
                    })
                    .collect();
                TrialFrame::new()
                    .with_categorical("subject", vec![format!("s{s}"); 24])
                    .with_numeric("rt", rts)
                    .with_categorical("condition", conditions)
            })
            .collect()
    }

    fn permuted(table: &TrialTable, seed: u64) -> TrialTable {
        let mut labels = table.labels().to_vec();
        labels.shuffle(&mut seeded_rng(seed));
        TrialTable::new(table.subject(), table.features().clone(), labels).unwrap()
    }

    /// Real statistic per subject plus `n_perm` statistics on permuted labels.
    fn run<E>(estimator: &E, tables: &[TrialTable], n_perm: u64) -> Vec<(f64, Vec<f64>)>
    where
        E: SubjectEstimator + Sync,
    {
        tables
            .par_iter()
            .enumerate()
            .map(|(s, table)| {
                let s = s as u64;
                let real = estimator
                    .estimate_seeded(table, derive_seed(99, s, 0))
                    .unwrap()
                    .value()
                    .unwrap();
                let null = (1..=n_perm)
                    .filter_map(|p| {
                        let shuffled = permuted(table, derive_seed(7, s, p));
                        estimator
                            .estimate_seeded(&shuffled, derive_seed(99, s, p))
                            .unwrap()
                            .value()
                    })
                    .collect();
                (real, null)
            })
            .collect()
    }

    #[test]
    fn opposing_effects_are_detected_per_subject() {
        let _ = env_logger::builder().is_test(true).try_init();
        let tables: Vec<TrialTable> = opposing_subjects()
            .iter()
            .map(|frame| TrialTable::from_frame(frame, "subject", &["rt"], "condition").unwrap())
            .collect();

        let sign = SignConsistencyParams::new(50, 20, Summary::Mean).unwrap();
        for (real, null) in run(&sign, &tables, 20) {
            let null_mean = null.iter().sum::<f64>() / null.len() as f64;
            assert_eq!(real, 1.0);
            assert!(null_mean < real);
        }

        let classifier = ClassificationParams::default().with_fold_count(4).unwrap();
        for (real, null) in run(&classifier, &tables, 10) {
            let null_mean = null.iter().sum::<f64>() / null.len() as f64;
            assert!(real > 0.9, "real accuracy {}", real);
            assert!(null_mean < real);
        }
    }

    #[test]
    fn parallel_runs_are_reproducible() {
        let tables: Vec<TrialTable> = opposing_subjects()
            .iter()
            .map(|frame| TrialTable::from_frame(frame, "subject", &["rt"], "condition").unwrap())
            .collect();
        let sign = SignConsistencyParams::new(30, 10, Summary::Median).unwrap();

        let first = run(&sign, &tables, 5);
        let second = run(&sign, &tables, 5);
        assert_eq!(first, second);
    }
}
