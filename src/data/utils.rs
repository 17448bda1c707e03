/// Distinct labels in the order they are first observed.
pub fn extract_levels(labels: &[String]) -> Vec<String> {
    let mut levels: Vec<String> = Vec::new();
    for label in labels {
        if !levels.contains(label) {
            levels.push(label.clone());
        }
    }
    levels
}

/// Encode labels as indices into `levels`.
pub fn encode_labels(labels: &[String], levels: &[String]) -> Vec<usize> {
    labels
        .iter()
        .map(|label| {
            levels
                .iter()
                .position(|level| level == label)
                .unwrap_or(levels.len())
        })
        .collect()
}

/// Number of trials per level, indexed like `levels`.
pub fn count_levels(codes: &[usize], n_levels: usize) -> Vec<usize> {
    let mut counts = vec![0; n_levels];
    for &code in codes {
        if code < n_levels {
            counts[code] += 1;
        }
    }
    counts
}

/// Indices of the trials carrying each level.
pub fn get_level_indices(codes: &[usize], n_levels: usize) -> Vec<Vec<usize>> {
    let mut indices = vec![Vec::new(); n_levels];
    for (i, &code) in codes.iter().enumerate() {
        if code < n_levels {
            indices[code].push(i);
        }
    }
    indices
}
