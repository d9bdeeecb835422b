use std::collections::HashMap;

use cohort_ingest::normalize_header;

/// Header positions keyed by normalized, upper-cased name.
///
/// When a sheet repeats a header the first occurrence wins.
#[derive(Debug, Clone)]
pub struct HeaderLookup {
    map: HashMap<String, usize>,
}

impl HeaderLookup {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut map = HashMap::new();
        for (index, header) in headers.into_iter().enumerate() {
            let key = lookup_key(header.as_ref());
            if key.is_empty() {
                continue;
            }
            map.entry(key).or_insert(index);
        }
        Self { map }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.map.get(&lookup_key(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

fn lookup_key(name: &str) -> String {
    normalize_header(name).to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_ignoring_case_and_spacing() {
        let lookup = HeaderLookup::new(["Patient #", "Portal  HTN", "age"]);
        assert_eq!(lookup.position("patient #"), Some(0));
        assert_eq!(lookup.position(" portal htn "), Some(1));
        assert_eq!(lookup.position("AGE"), Some(2));
        assert!(!lookup.contains("Sex"));
    }

    #[test]
    fn first_duplicate_wins() {
        let lookup = HeaderLookup::new(["AST", "", "ast"]);
        assert_eq!(lookup.position("Ast"), Some(0));
        assert!(!lookup.contains(""));
    }
}
