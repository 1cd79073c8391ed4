use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::prompt::Prompt;

/// Prompts sharing one category, in their original relative order.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub prompts: Vec<&'a Prompt>,
}

/// lowercased with accents stripped, "Éclair" -> "eclair"
fn base_letters(s: &str) -> String {
    s.nfd()
     .filter(|c| !is_combining_mark(*c))
     .flat_map(char::to_lowercase)
     .collect()
}

fn case_pattern(s: &str) -> Vec<bool> {
    s.chars().map(char::is_uppercase).collect()
}

/// Locale-style ordering: base letters first, then accents, then case with
/// lowercase ahead of uppercase, then ordinal so the result never depends
/// on input order.
pub fn compare_categories(a: &str, b: &str) -> Ordering {
    base_letters(a).cmp(&base_letters(b))
                   .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
                   .then_with(|| case_pattern(a).cmp(&case_pattern(b)))
                   .then_with(|| a.cmp(b))
}

/// Group `prompts` by category label, categories sorted with
/// `compare_categories`.
pub fn group_by_category(prompts: &[Prompt]) -> Vec<CategoryGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CategoryGroup> = vec![];
    for p in prompts {
        let label = p.category_label();
        match index.get(label) {
            Some(&i) => groups[i].prompts.push(p),
            None => {
                index.insert(label, groups.len());
                groups.push(CategoryGroup {
                    category: label,
                    prompts: vec![p],
                });
            }
        }
    }
    groups.sort_by(|a, b| compare_categories(a.category, b.category));
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt(id: i64, category: &str) -> Prompt {
        Prompt {
            id: id,
            full_prompt: format!("prompt {}", id),
            category: category.to_string(),
            main_category: None,
            sub_category: None,
            reference_image: None,
        }
    }

    fn ids(group: &CategoryGroup) -> Vec<i64> {
        group.prompts.iter().map(|p| p.id).collect()
    }

    #[test]
    fn groups_keep_source_order() {
        let prompts = vec![prompt(1, "B"), prompt(2, "A"), prompt(3, "B")];
        let groups = group_by_category(&prompts);
        let names: Vec<&str> = groups.iter().map(|g| g.category).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(ids(&groups[0]), vec![2]);
        assert_eq!(ids(&groups[1]), vec![1, 3]);
    }

    #[test]
    fn empty_category_is_uncategorized() {
        let prompts = vec![prompt(1, ""), prompt(2, "Design"), prompt(3, "Uncategorized")];
        let groups = group_by_category(&prompts);
        let names: Vec<&str> = groups.iter().map(|g| g.category).collect();
        assert_eq!(names, vec!["Design", "Uncategorized"]);
        assert_eq!(ids(&groups[1]), vec![1, 3]);
    }

    #[test]
    fn categories_sort_without_regard_to_case() {
        let prompts = vec![prompt(1, "banana"), prompt(2, "Cherry"), prompt(3, "apple"), prompt(4, "Apple")];
        let names: Vec<&str> = group_by_category(&prompts).iter().map(|g| g.category).collect();
        assert_eq!(names, vec!["apple", "Apple", "banana", "Cherry"]);
    }

    #[test]
    fn accented_categories_sort_with_their_base_letter() {
        let prompts = vec![prompt(1, "Apple"), prompt(2, "apple"), prompt(3, "Zebra"), prompt(4, "Éclair")];
        let names: Vec<&str> = group_by_category(&prompts).iter().map(|g| g.category).collect();
        assert_eq!(names, vec!["apple", "Apple", "Éclair", "Zebra"]);
    }

    #[test]
    fn unaccented_spelling_comes_first() {
        assert_eq!(compare_categories("eclair", "éclair"), Ordering::Less);
        assert_eq!(compare_categories("Éclair", "eclair"), Ordering::Greater);
        assert_eq!(compare_categories("Design", "Design"), Ordering::Equal);
    }

    #[test]
    fn no_prompts_no_groups() {
        assert!(group_by_category(&[]).is_empty());
    }
}
