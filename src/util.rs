pub fn sum(values: &[f32]) -> f32 {
    values.iter().copied().sum()
}

/// Average of a slice, or `None` when it is empty.
pub fn average(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        None
    } else {
        Some(sum(values) / values.len() as f32)
    }
}

/// Order-preserving deduplication of an id sequence.
pub fn dedupe<T: PartialEq + Clone>(values: &[T]) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        if !out.contains(value) {
            out.push(value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_empty_slice_is_none() {
        assert_eq!(average(&[]), None);
    }

    #[test]
    fn average_of_values() {
        assert_eq!(average(&[1.0, 2.0, 3.0]), Some(2.0));
    }

    #[test]
    fn dedupe_keeps_first_occurrence_order() {
        let ids = ["b", "a", "b", "c", "a"].map(str::to_owned);
        assert_eq!(dedupe(&ids), ["b", "a", "c"].map(str::to_owned));
    }
}
