//! Label truncation for file and bucket names.

/// Separators cutting a title down to a file stem.
pub const FILE_SEPARATORS: &[&str] = &[" "];

/// Separators cutting a TOC title down to a bucket name.
pub const BUCKET_SEPARATORS: &[&str] = &[" ", "(", "_", "-"];

/// Truncate `raw_label` at the earliest occurrence of any separator.
///
/// Returns the label unchanged when no separator occurs. Empty separators
/// never match. Never fails.
///
/// ```ignore
/// assert_eq!(normalize("Creating a Sequence", FILE_SEPARATORS), "Creating");
/// ```
pub fn normalize<S: AsRef<str>>(raw_label: &str, separators: &[S]) -> String {
    separators
        .iter()
        .map(AsRef::as_ref)
        .filter(|separator| !separator.is_empty())
        .filter_map(|separator| raw_label.find(separator))
        .min()
        .map_or_else(|| raw_label.to_string(), |cut| raw_label[..cut].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bucket_label() {
        assert_eq!(
            normalize("Observable Sequences (Part 1)", BUCKET_SEPARATORS),
            "Observable"
        );
    }

    #[test]
    fn test_file_label() {
        assert_eq!(normalize("Creating a Sequence", FILE_SEPARATORS), "Creating");
    }

    #[test]
    fn test_earliest_separator_wins() {
        assert_eq!(normalize("Hot_and-Cold Obs", BUCKET_SEPARATORS), "Hot");
        assert_eq!(normalize("Rx-Java_8", BUCKET_SEPARATORS), "Rx");
        assert_eq!(normalize("Subjects(Advanced)", BUCKET_SEPARATORS), "Subjects");
    }

    #[test]
    fn test_no_separator_unchanged() {
        assert_eq!(normalize("Schedulers", BUCKET_SEPARATORS), "Schedulers");
    }

    #[test]
    fn test_empty_input_and_separators() {
        assert_eq!(normalize("", BUCKET_SEPARATORS), "");
        assert_eq!(normalize("a b", &[] as &[&str]), "a b");
        assert_eq!(normalize("a b", &[""]), "a b");
    }

    #[test]
    fn test_leading_separator_cuts_to_empty() {
        assert_eq!(normalize("-Intro", BUCKET_SEPARATORS), "");
    }

    #[test]
    fn test_multibyte_labels() {
        assert_eq!(normalize("Über Sequenzen", FILE_SEPARATORS), "Über");
        assert_eq!(normalize("日本語-タイトル", BUCKET_SEPARATORS), "日本語");
    }

    fn separators() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(prop::sample::select(vec![" ", "(", "_", "-", "ab", ""]), 0..4)
            .prop_map(|v| v.into_iter().map(str::to_string).collect())
    }

    proptest! {
        #[test]
        fn prop_result_is_prefix(s in ".{0,24}", seps in separators()) {
            let out = normalize(&s, &seps);
            prop_assert!(s.starts_with(&out));
        }

        #[test]
        fn prop_idempotent(s in ".{0,24}", seps in separators()) {
            let once = normalize(&s, &seps);
            prop_assert_eq!(normalize(&once, &seps), once);
        }

        #[test]
        fn prop_untouched_without_separator(s in "[A-Za-z0-9]{1,16}") {
            prop_assert_eq!(normalize(&s, BUCKET_SEPARATORS), s);
        }
    }
}
