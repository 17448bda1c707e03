use rand::Rng;
use rand::seq::SliceRandom;

/// Held-out and training indices of one cross-validation fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Partition trials into `k` folds stratified by label.
///
/// Each label's indices are shuffled and dealt round-robin over the folds, with
/// the dealing position carried from one label to the next so fold sizes differ
/// by at most one. Whenever `k` does not exceed a label's count, every test fold
/// holds at least one trial of that label.
pub fn stratified_folds<R>(level_indices: &[Vec<usize>], k: usize, rng: &mut R) -> Vec<Fold>
where
    R: Rng + ?Sized,
{
    let mut tests: Vec<Vec<usize>> = vec![Vec::new(); k];
    let mut position = 0;

    for indices in level_indices {
        let mut shuffled = indices.clone();
        shuffled.shuffle(rng);
        for idx in shuffled {
            tests[position % k].push(idx);
            position += 1;
        }
    }

    let n: usize = level_indices.iter().map(Vec::len).sum();
    tests
        .into_iter()
        .enumerate()
        .map(|(fold, mut test)| {
            test.sort_unstable();
            let mut in_test = vec![false; n];
            for &idx in &test {
                in_test[idx] = true;
            }
            let train: Vec<usize> = (0..n).filter(|&i| !in_test[i]).collect();
            log::trace!(
                "Fold {} with {} training and {} held-out trials",
                fold,
                train.len(),
                test.len()
            );
            Fold { train, test }
        })
        .collect()
}
