use std::collections::BTreeSet;

/// Split raw lecturer column values into individual names.
///
/// A source field may carry several comma-separated names; the same name
/// recurs across courses. Names are trimmed, empties dropped, and the
/// result deduplicated with a stable order.
pub fn normalize<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut names = BTreeSet::new();
    for field in raw {
        for name in field.split(',') {
            let name = name.trim();
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }
    names.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn splits_and_trims() {
        let names = normalize(owned(&["A. Cohen, B. Levi", " C. Mizrahi "]));
        assert_eq!(names, vec!["A. Cohen", "B. Levi", "C. Mizrahi"]);
    }

    #[test]
    fn dedups_across_fields() {
        let names = normalize(owned(&["A. Cohen", "A. Cohen, B. Levi", "B. Levi"]));
        assert_eq!(names, vec!["A. Cohen", "B. Levi"]);
    }

    #[test]
    fn drops_empty_pieces() {
        let names = normalize(owned(&["A. Cohen,, ,B. Levi"]));
        assert_eq!(names, vec!["A. Cohen", "B. Levi"]);
    }

    #[test]
    fn empty_input() {
        assert!(normalize(Vec::new()).is_empty());
    }
}
