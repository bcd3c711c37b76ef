//! Algorithms that operate on text.

use std::collections::{HashMap, HashSet};

/// Group the distinct input words into sets of anagrams.
///
/// Two words are anagrams when their characters, sorted, form the same
/// signature. Only groups with more than one word are returned. Group order
/// and the order of words within a group are unspecified; see
/// [`sorted_groups`] for a stable form.
pub fn anagrams<I, S>(words: I) -> Vec<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut groups: HashMap<String, Vec<String>> = HashMap::new();

    for word in words {
        let word = word.as_ref();
        if !seen.insert(word.to_string()) {
            continue;
        }
        groups
            .entry(signature(word))
            .or_default()
            .push(word.to_string());
    }

    groups.into_values().filter(|group| group.len() > 1).collect()
}

fn signature(word: &str) -> String {
    let mut chars: Vec<char> = word.chars().collect();
    chars.sort_unstable();
    chars.into_iter().collect()
}

/// Sort each group, then the groups themselves.
pub fn sorted_groups(mut groups: Vec<Vec<String>>) -> Vec<Vec<String>> {
    for group in &mut groups {
        group.sort();
    }
    groups.sort();
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn owned(groups: &[&[&str]]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|group| group.iter().map(|w| w.to_string()).collect())
            .collect()
    }

    const SENTENCE: &str = "the car can caused a and during cried by its rat bowel drinking elbow \
        bending that while an thing cider like pain cat which in this act below is night arc";

    #[test_case(SENTENCE, &[&["act", "cat"], &["arc", "car"], &["below", "bowel", "elbow"], &["cider", "cried"], &["night", "thing"]] ; "sentence")]
    #[test_case("elbow below bowel", &[&["below", "bowel", "elbow"]] ; "single group")]
    #[test_case("", &[] ; "empty input")]
    #[test_case("one two three", &[] ; "no anagrams")]
    fn test_anagrams(input: &str, expected: &[&[&str]]) {
        let found = sorted_groups(anagrams(input.split_whitespace()));
        assert_eq!(found, owned(expected));
    }

    #[test]
    fn test_empty_word_forms_no_group() {
        assert!(anagrams([""]).is_empty());
    }

    #[test]
    fn test_duplicate_words_count_once() {
        assert!(anagrams(["listen", "listen"]).is_empty());
        let found = sorted_groups(anagrams(["listen", "silent", "listen"]));
        assert_eq!(found, owned(&[&["listen", "silent"]]));
    }

    #[test]
    fn test_signature_is_case_sensitive() {
        assert!(anagrams(["Tea", "eat"]).is_empty());
    }
}
