//! Case-insensitive list intersection.

/// Keep each entry of `first` that equals some entry of `second`, ignoring
/// case.
///
/// Order follows `first` and duplicates in `first` are kept, so the length
/// of the result is the overlap count the scorer rewards.
///
/// # Examples
/// ```
/// use connect_matching::common_elements;
///
/// let first = ["Music", "Chess", "music"].map(String::from);
/// let second = ["MUSIC", "Go"].map(String::from);
/// assert_eq!(common_elements(&first, &second), vec!["Music", "music"]);
/// ```
#[must_use]
pub fn common_elements(first: &[String], second: &[String]) -> Vec<String> {
    shared(first, second).cloned().collect()
}

/// Count the entries [`common_elements`] would return without cloning them.
pub(crate) fn overlap_count(first: &[String], second: &[String]) -> usize {
    shared(first, second).count()
}

fn shared<'a>(first: &'a [String], second: &[String]) -> impl Iterator<Item = &'a String> {
    let folded: Vec<String> = second.iter().map(|value| value.to_lowercase()).collect();
    first
        .iter()
        .filter(move |value| folded.contains(&value.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn list(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[rstest]
    #[case(&[], &["a"], &[])]
    #[case(&["a"], &[], &[])]
    #[case(&["Hiking", "Chess"], &["chess", "HIKING"], &["Hiking", "Chess"])]
    #[case(&["a", "A", "b"], &["a"], &["a", "A"])]
    #[case(&["a"], &["a", "a"], &["a"])]
    fn keeps_first_list_order_and_duplicates(
        #[case] first: &[&str],
        #[case] second: &[&str],
        #[case] expected: &[&str],
    ) {
        let first = list(first);
        let second = list(second);
        assert_eq!(common_elements(&first, &second), list(expected));
        assert_eq!(overlap_count(&first, &second), expected.len());
    }
}
