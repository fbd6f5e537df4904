use std::cmp::Ordering;

/// Wraps a float to give it a total order for min/max selection.
///
/// Incomparable values (NaN) compare as equal, so selection keeps whichever came first.
#[derive(Debug, Copy, Clone)]
pub struct OrderedFloat<T: PartialOrd>(pub T);

impl<T: PartialOrd> PartialEq for OrderedFloat<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T: PartialOrd> Eq for OrderedFloat<T> {}

impl<T: PartialOrd> PartialOrd for OrderedFloat<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: PartialOrd> Ord for OrderedFloat<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_keeps_first_of_equal_keys() {
        let values = [3.0, 1.0, 2.0, 1.0];
        let (index, _) = values
            .iter()
            .enumerate()
            .min_by_key(|(_, &v)| OrderedFloat(v))
            .unwrap();
        assert_eq!(index, 1);
        assert!(OrderedFloat(1.0) < OrderedFloat(2.0));
    }
}
