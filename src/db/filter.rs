// src/db/filter.rs
// DOCUMENTATION: Store-neutral filter expressions
// PURPOSE: Build queries once, translate to MongoDB or evaluate in memory

use crate::db::document::{compare_values, numeric, values_at_path, values_equal};
use mongodb::bson::{Bson, Document};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::ops::Bound;

/// Filter expression tree
/// DOCUMENTATION: Leaves are predicates on a dotted field path; a path
/// crossing an array matches when any element satisfies the predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    Eq {
        field: String,
        value: Bson,
    },
    Range {
        field: String,
        lower: Bound<Bson>,
        upper: Bound<Bson>,
    },
    Regex {
        field: String,
        pattern: String,
        case_insensitive: bool,
    },
    /// Conjunction node; matches when every child matches
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn range(field: impl Into<String>, lower: Bound<Bson>, upper: Bound<Bson>) -> Self {
        Filter::Range {
            field: field.into(),
            lower,
            upper,
        }
    }

    pub fn regex(field: impl Into<String>, pattern: impl Into<String>, case_insensitive: bool) -> Self {
        Filter::Regex {
            field: field.into(),
            pattern: pattern.into(),
            case_insensitive,
        }
    }

    /// Literal prefix match: the prefix is escaped and anchored
    pub fn starts_with(field: impl Into<String>, prefix: &str, case_insensitive: bool) -> Self {
        Filter::regex(field, format!("^{}", regex::escape(prefix)), case_insensitive)
    }

    /// OR over the given filters; no filters means no restriction
    pub fn any_of(filters: Vec<Filter>) -> Self {
        if filters.is_empty() {
            Filter::All
        } else {
            Filter::Or(filters)
        }
    }

    /// Translate into a MongoDB query document
    pub fn to_document(&self) -> Document {
        match self {
            Filter::All => Document::new(),
            Filter::Eq { field, value } => {
                let mut doc = Document::new();
                doc.insert(field.clone(), value.clone());
                doc
            }
            Filter::Range {
                field,
                lower,
                upper,
            } => {
                let mut cond = Document::new();
                match lower {
                    Bound::Included(v) => {
                        cond.insert("$gte", v.clone());
                    }
                    Bound::Excluded(v) => {
                        cond.insert("$gt", v.clone());
                    }
                    Bound::Unbounded => {}
                }
                match upper {
                    Bound::Included(v) => {
                        cond.insert("$lte", v.clone());
                    }
                    Bound::Excluded(v) => {
                        cond.insert("$lt", v.clone());
                    }
                    Bound::Unbounded => {}
                }
                let mut doc = Document::new();
                doc.insert(field.clone(), cond);
                doc
            }
            Filter::Regex {
                field,
                pattern,
                case_insensitive,
            } => {
                let mut cond = Document::new();
                cond.insert("$regex", pattern.clone());
                if *case_insensitive {
                    cond.insert("$options", "i");
                }
                let mut doc = Document::new();
                doc.insert(field.clone(), cond);
                doc
            }
            Filter::And(filters) => combine("$and", filters),
            Filter::Or(filters) => combine("$or", filters),
        }
    }

    /// Prepare for evaluation against stored documents.
    /// Regex patterns are compiled here, once per query.
    pub fn matcher(&self) -> Matcher<'_> {
        match self {
            Filter::All => Matcher::All,
            Filter::Eq { field, value } => Matcher::Eq { field, value },
            Filter::Range {
                field,
                lower,
                upper,
            } => Matcher::Range {
                field,
                lower,
                upper,
            },
            Filter::Regex {
                field,
                pattern,
                case_insensitive,
            } => {
                let regex = RegexBuilder::new(pattern)
                    .case_insensitive(*case_insensitive)
                    .build()
                    .map_err(|e| log::warn!("Ignoring invalid regex pattern {}: {}", pattern, e))
                    .ok();
                Matcher::Regex { field, regex }
            }
            Filter::And(filters) => Matcher::And(filters.iter().map(Filter::matcher).collect()),
            Filter::Or(filters) => Matcher::Or(filters.iter().map(Filter::matcher).collect()),
        }
    }
}

/// Compiled form of a `Filter`, reused across a collection scan
#[derive(Debug)]
pub enum Matcher<'a> {
    All,
    Eq {
        field: &'a str,
        value: &'a Bson,
    },
    Range {
        field: &'a str,
        lower: &'a Bound<Bson>,
        upper: &'a Bound<Bson>,
    },
    /// `None` when the pattern failed to compile; matches nothing
    Regex {
        field: &'a str,
        regex: Option<Regex>,
    },
    And(Vec<Matcher<'a>>),
    Or(Vec<Matcher<'a>>),
}

impl Matcher<'_> {
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Matcher::All => true,
            Matcher::Eq { field, value } => values_at_path(doc, field)
                .into_iter()
                .any(|found| match found {
                    Bson::Array(items) if !matches!(value, Bson::Array(_)) => {
                        items.iter().any(|item| values_equal(item, value))
                    }
                    other => values_equal(other, value),
                }),
            Matcher::Range {
                field,
                lower,
                upper,
            } => values_at_path(doc, field)
                .into_iter()
                .any(|found| within(found, lower, upper)),
            Matcher::Regex { field, regex } => match regex {
                Some(re) => values_at_path(doc, field)
                    .into_iter()
                    .any(|found| found.as_str().is_some_and(|s| re.is_match(s))),
                None => false,
            },
            Matcher::And(matchers) => matchers.iter().all(|m| m.matches(doc)),
            Matcher::Or(matchers) => matchers.iter().any(|m| m.matches(doc)),
        }
    }
}

fn combine(operator: &str, filters: &[Filter]) -> Document {
    let clauses: Vec<Bson> = filters
        .iter()
        .map(|f| Bson::Document(f.to_document()))
        .collect();
    let mut doc = Document::new();
    doc.insert(operator, clauses);
    doc
}

fn within(value: &Bson, lower: &Bound<Bson>, upper: &Bound<Bson>) -> bool {
    // Range predicates only compare numbers
    if numeric(value).is_none() {
        return false;
    }

    let above = match lower {
        Bound::Included(min) => compare_values(Some(value), Some(min)) != Ordering::Less,
        Bound::Excluded(min) => compare_values(Some(value), Some(min)) == Ordering::Greater,
        Bound::Unbounded => true,
    };
    let below = match upper {
        Bound::Included(max) => compare_values(Some(value), Some(max)) != Ordering::Greater,
        Bound::Excluded(max) => compare_values(Some(value), Some(max)) == Ordering::Less,
        Bound::Unbounded => true,
    };
    above && below
}

/// Sort direction for a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One key of a sort specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub direction: Direction,
}

impl SortField {
    pub fn asc(field: impl Into<String>) -> Self {
        SortField {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        SortField {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

/// Translate a sort list into a MongoDB sort document
pub fn sort_document(fields: &[SortField]) -> Document {
    let mut doc = Document::new();
    for sort in fields {
        let order = match sort.direction {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        };
        doc.insert(sort.field.clone(), order);
    }
    doc
}

/// Compare two documents under a sort list
pub fn compare_by(a: &Document, b: &Document, fields: &[SortField]) -> Ordering {
    for sort in fields {
        let left = values_at_path(a, &sort.field).into_iter().next();
        let right = values_at_path(b, &sort.field).into_iter().next();
        let ordering = compare_values(left, right);
        let ordering = match sort.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// A find request: filter, excluded fields, sort and window
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub filter: Filter,
    pub exclude: Vec<String>,
    pub sort: Vec<SortField>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        FindQuery {
            filter,
            exclude: Vec::new(),
            sort: Vec::new(),
            skip: 0,
            limit: None,
        }
    }

    pub fn exclude(mut self, field: impl Into<String>) -> Self {
        self.exclude.push(field.into());
        self
    }

    pub fn sort(mut self, sort: Vec<SortField>) -> Self {
        self.sort = sort;
        self
    }

    pub fn window(mut self, skip: u64, limit: u64) -> Self {
        self.skip = skip;
        self.limit = Some(limit);
        self
    }

    /// MongoDB projection document, if any field is excluded
    pub fn projection(&self) -> Option<Document> {
        if self.exclude.is_empty() {
            return None;
        }
        let mut doc = Document::new();
        for field in &self.exclude {
            doc.insert(field.clone(), 0);
        }
        Some(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn person(name: &str, age: i32, cities: &[&str]) -> Document {
        let addresses: Vec<Bson> = cities
            .iter()
            .map(|c| Bson::Document(doc! { "city": *c }))
            .collect();
        doc! { "firstName": name, "age": age, "addresses": addresses }
    }

    #[test]
    fn test_range_translation_uses_bound_operators() {
        let exclusive = Filter::range(
            "age",
            Bound::Excluded(Bson::Int32(20)),
            Bound::Excluded(Bson::Int32(30)),
        );
        assert_eq!(
            exclusive.to_document(),
            doc! { "age": { "$gt": 20, "$lt": 30 } }
        );

        let inclusive = Filter::range(
            "age",
            Bound::Included(Bson::Int32(20)),
            Bound::Included(Bson::Int32(30)),
        );
        assert_eq!(
            inclusive.to_document(),
            doc! { "age": { "$gte": 20, "$lte": 30 } }
        );
    }

    #[test]
    fn test_or_translation() {
        let filter = Filter::any_of(vec![
            Filter::regex("firstName", "^Al", true),
            Filter::eq("addresses.city", "Oslo"),
        ]);
        assert_eq!(
            filter.to_document(),
            doc! { "$or": [
                { "firstName": { "$regex": "^Al", "$options": "i" } },
                { "addresses.city": "Oslo" }
            ] }
        );
        assert_eq!(Filter::any_of(Vec::new()).to_document(), Document::new());
    }

    #[test]
    fn test_starts_with_escapes_input() {
        let filter = Filter::starts_with("firstName", "a.b", false);
        assert!(filter.matcher().matches(&person("a.bc", 1, &[])));
        assert!(!filter.matcher().matches(&person("axbc", 1, &[])));
        assert!(!filter.matcher().matches(&person("A.bc", 1, &[])));
        assert!(Filter::starts_with("firstName", "", false).matcher().matches(&person("Zed", 1, &[])));
    }

    #[test]
    fn test_range_bounds_are_respected() {
        let exclusive = Filter::range(
            "age",
            Bound::Excluded(Bson::Int32(20)),
            Bound::Excluded(Bson::Int32(30)),
        );
        assert!(!exclusive.matcher().matches(&person("a", 20, &[])));
        assert!(exclusive.matcher().matches(&person("a", 25, &[])));
        assert!(!exclusive.matcher().matches(&person("a", 30, &[])));

        let inclusive = Filter::range(
            "age",
            Bound::Included(Bson::Int32(20)),
            Bound::Included(Bson::Int32(30)),
        );
        assert!(inclusive.matcher().matches(&person("a", 20, &[])));
        assert!(inclusive.matcher().matches(&person("a", 30, &[])));
        assert!(!inclusive.matcher().matches(&doc! { "age": "thirty" }));
    }

    #[test]
    fn test_eq_matches_any_array_element() {
        let filter = Filter::eq("addresses.city", "Paris");
        assert!(filter.matcher().matches(&person("a", 1, &["London", "Paris"])));
        assert!(!filter.matcher().matches(&person("a", 1, &["London"])));
        assert!(!filter.matcher().matches(&person("a", 1, &[])));
    }

    #[test]
    fn test_or_and_semantics() {
        let name = Filter::regex("firstName", "^al", true);
        let city = Filter::eq("addresses.city", "Oslo");
        let doc = person("Alice", 50, &["Bergen"]);

        assert!(Filter::Or(vec![name.clone(), city.clone()]).matcher().matches(&doc));
        assert!(!Filter::And(vec![name, city]).matcher().matches(&doc));
        assert!(Filter::All.matcher().matches(&doc));
    }

    #[test]
    fn test_matcher_compiles_regex_once_for_many_documents() {
        let filter = Filter::starts_with("firstName", "al", true);
        let matcher = filter.matcher();
        assert!(matches!(&matcher, Matcher::Regex { regex: Some(_), .. }));

        let docs = [person("Alma", 1, &[]), person("Bert", 2, &[]), person("alva", 3, &[])];
        let hits = docs.iter().filter(|doc| matcher.matches(doc)).count();
        assert_eq!(hits, 2);

        let broken = Filter::regex("firstName", "(unclosed", false);
        let matcher = broken.matcher();
        assert!(matches!(&matcher, Matcher::Regex { regex: None, .. }));
        assert!(!docs.iter().any(|doc| matcher.matches(doc)));
    }

    #[test]
    fn test_sort_document_and_projection() {
        let query = FindQuery::new(Filter::All)
            .exclude("addresses")
            .sort(vec![SortField::desc("age"), SortField::asc("firstName")])
            .window(10, 5);

        assert_eq!(sort_document(&query.sort), doc! { "age": -1, "firstName": 1 });
        assert_eq!(query.projection(), Some(doc! { "addresses": 0 }));
        assert_eq!(query.skip, 10);
        assert_eq!(query.limit, Some(5));
        assert_eq!(FindQuery::new(Filter::All).projection(), None);
    }

    #[test]
    fn test_compare_by_multiple_keys() {
        let a = person("Bob", 30, &[]);
        let b = person("Ann", 30, &[]);
        let keys = vec![SortField::desc("age"), SortField::asc("firstName")];
        assert_eq!(compare_by(&a, &b, &keys), Ordering::Greater);
        assert_eq!(compare_by(&b, &a, &keys), Ordering::Less);
    }
}
