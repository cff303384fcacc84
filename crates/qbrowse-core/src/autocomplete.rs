//! Live tag suggestions for the search box.

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Tags starting with `prefix`, ignoring case, in the order given.
///
/// `tag_names` is expected to be frequency-ordered so the most common tags
/// surface first. An empty prefix suggests nothing.
pub fn prefix_matches<S: AsRef<str>>(prefix: &str, tag_names: &[S], limit: usize) -> Vec<String> {
    if prefix.is_empty() {
        return Vec::new();
    }
    let needle = prefix.to_lowercase();
    tag_names
        .iter()
        .map(|t| t.as_ref())
        .filter(|tag| tag.to_lowercase().starts_with(&needle))
        .take(limit)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_input_order() {
        let tags = ["car", "cat", "dog", "camera"];
        assert_eq!(prefix_matches("ca", &tags, DEFAULT_SUGGESTION_LIMIT), vec!["car", "cat", "camera"]);
    }

    #[test]
    fn respects_limit() {
        let tags = ["car", "cat", "dog", "camera"];
        assert_eq!(prefix_matches("ca", &tags, 2), vec!["car", "cat"]);
        assert!(prefix_matches("ca", &tags, 0).is_empty());
    }

    #[test]
    fn case_insensitive() {
        let tags = vec!["TREE".to_string(), "Train".to_string(), "boat".to_string()];
        assert_eq!(prefix_matches("tR", &tags, 10), vec!["TREE", "Train"]);
    }

    #[test]
    fn empty_prefix_suggests_nothing() {
        let tags = ["car", "cat"];
        assert!(prefix_matches("", &tags, 10).is_empty());
        let none: [&str; 0] = [];
        assert!(prefix_matches("c", &none, 10).is_empty());
    }
}
