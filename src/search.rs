//! In-memory search over small collections.
//!
//! Filtering is a pure function of the items, the searched fields and the
//! query. There is no index, cache or ranking: callers re-run [`filter`]
//! whenever the query changes.

use serde_json::Value;

/// A value read from one searchable field of an item.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    TextList(Vec<&'a str>),
    Missing,
}

impl<'a> FieldValue<'a> {
    /// Reads a resolved JSON value. Arrays keep their string elements only;
    /// objects, booleans and null never match.
    pub fn from_json(value: Option<&'a Value>) -> Self {
        match value {
            Some(Value::String(s)) => FieldValue::Text(s),
            Some(Value::Number(n)) => n.as_f64().map_or(FieldValue::Missing, FieldValue::Number),
            Some(Value::Array(values)) => {
                FieldValue::TextList(values.iter().filter_map(Value::as_str).collect())
            }
            _ => FieldValue::Missing,
        }
    }

    /// `needle` must already be trimmed and lower-cased.
    fn matches(&self, needle: &str) -> bool {
        match self {
            FieldValue::Text(s) => s.to_lowercase().contains(needle),
            FieldValue::Number(n) => format_number(*n).contains(needle),
            FieldValue::TextList(values) => values.iter().any(|s| s.to_lowercase().contains(needle)),
            FieldValue::Missing => false,
        }
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Text(value)
    }
}

impl<'a> From<Option<&'a str>> for FieldValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(FieldValue::Missing, FieldValue::Text)
    }
}

/// A named accessor for one searchable field of `T`.
pub struct SearchField<T> {
    pub name: &'static str,
    get: for<'a> fn(&'a T) -> FieldValue<'a>,
}

impl<T> SearchField<T> {
    pub const fn new(name: &'static str, get: for<'a> fn(&'a T) -> FieldValue<'a>) -> Self {
        Self { name, get }
    }

    pub fn read<'a>(&self, item: &'a T) -> FieldValue<'a> {
        (self.get)(item)
    }
}

/// Items that matched a query, borrowed from the input in their original order.
#[derive(Debug)]
pub struct SearchResults<'a, T> {
    pub items: Vec<&'a T>,
}

impl<'a, T> SearchResults<'a, T> {
    pub fn total_results(&self) -> usize {
        self.items.len()
    }

    pub fn has_results(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.items.iter().copied()
    }
}

/// Keeps the items where any field contains `query`, ignoring case.
///
/// A blank query returns every item.
pub fn filter<'a, T, I>(items: I, fields: &[SearchField<T>], query: &str) -> SearchResults<'a, T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
{
    filter_by(items, query, |item, needle| {
        fields.iter().any(|field| field.read(item).matches(needle))
    })
}

/// Same as [`filter`], for untyped JSON records addressed by dotted paths
/// such as `pet.responsible.name`.
pub fn filter_json<'a, I>(items: I, paths: &[&str], query: &str) -> SearchResults<'a, Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    filter_by(items, query, |item, needle| {
        paths
            .iter()
            .any(|path| FieldValue::from_json(resolve_path(item, path)).matches(needle))
    })
}

/// Walks a dotted path. Numeric segments index into arrays. Any missing
/// step resolves to `None`.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(values) => segment.parse::<usize>().ok().and_then(|i| values.get(i)),
        _ => None,
    })
}

fn filter_by<'a, T, I, F>(items: I, query: &str, matches: F) -> SearchResults<'a, T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T, &str) -> bool,
{
    let needle = query.trim().to_lowercase();
    let items = if needle.is_empty() {
        items.into_iter().collect()
    } else {
        items
            .into_iter()
            .filter(|item| matches(*item, &needle))
            .collect()
    };
    SearchResults { items }
}

/// Integers print without a fractional part, like a JavaScript number.
fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Dog {
        name: String,
        age: u32,
        tags: Vec<String>,
    }

    fn dog_name(d: &Dog) -> FieldValue<'_> {
        d.name.as_str().into()
    }

    fn dog_age(d: &Dog) -> FieldValue<'_> {
        FieldValue::Number(d.age as f64)
    }

    fn dog_tags(d: &Dog) -> FieldValue<'_> {
        FieldValue::TextList(d.tags.iter().map(String::as_str).collect())
    }

    const DOG_FIELDS: [SearchField<Dog>; 3] = [
        SearchField::new("name", dog_name),
        SearchField::new("age", dog_age),
        SearchField::new("tags", dog_tags),
    ];

    fn dogs() -> Vec<Dog> {
        vec![
            Dog { name: "Luna".into(), age: 3, tags: vec!["Playful".into()] },
            Dog { name: "Rex".into(), age: 12, tags: vec!["calm".into(), "lunar".into()] },
            Dog { name: "Toby".into(), age: 1, tags: vec![] },
        ]
    }

    #[test]
    fn blank_query_returns_everything_in_order() {
        let items = dogs();
        for query in ["", "   ", "\t\n"] {
            let results = filter(&items, &DOG_FIELDS, query);
            assert_eq!(results.total_results(), 3);
            for (got, want) in results.iter().zip(&items) {
                assert!(std::ptr::eq(got, want));
            }
        }
    }

    #[test]
    fn matching_ignores_case_and_surrounding_whitespace() {
        let items = dogs();
        let results = filter(&items, &DOG_FIELDS, "  LUNA ");
        let names: Vec<_> = results.iter().map(|d| d.name.as_str()).collect();
        // "Rex" matches through its "lunar" tag.
        assert_eq!(names, ["Luna", "Rex"]);
    }

    #[test]
    fn numbers_match_on_their_decimal_form() {
        let items = dogs();
        let results = filter(&items, &DOG_FIELDS, "1");
        let names: Vec<_> = results.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["Rex", "Toby"]);
    }

    #[test]
    fn item_matching_several_fields_appears_once() {
        let items = vec![Dog { name: "Calm".into(), age: 2, tags: vec!["calm".into()] }];
        let results = filter(&items, &DOG_FIELDS, "calm");
        assert_eq!(results.total_results(), 1);
    }

    #[test]
    fn refiltering_is_idempotent() {
        let items = dogs();
        let once = filter(&items, &DOG_FIELDS, "lun");
        let twice = filter(once.iter(), &DOG_FIELDS, "lun");
        assert_eq!(once.total_results(), twice.total_results());
        for (a, b) in once.iter().zip(twice.iter()) {
            assert!(std::ptr::eq(a, b));
        }
    }

    #[test]
    fn no_match_yields_empty_results() {
        let items = dogs();
        let results = filter(&items, &DOG_FIELDS, "siamese");
        assert!(!results.has_results());
    }

    #[test]
    fn json_paths_resolve_nested_fields() {
        let items = vec![json!({ "pet": { "name": "Rex" } })];
        assert_eq!(filter_json(&items, &["pet.name"], "rex").total_results(), 1);
    }

    #[test]
    fn json_paths_through_null_or_missing_do_not_match() {
        let items = vec![json!({ "pet": null }), json!({}), json!({ "pet": "Rex" })];
        assert!(!filter_json(&items, &["pet.name"], "rex").has_results());
    }

    #[test]
    fn json_value_types_follow_the_matching_policy() {
        let items = vec![
            json!({ "v": true }),
            json!({ "v": { "name": "gold" } }),
            json!({ "v": [1, 2, "Golden"] }),
            json!({ "v": [1, 2] }),
            json!({ "v": 7.0 }),
        ];
        let hits = filter_json(&items, &["v"], "gold");
        assert_eq!(hits.total_results(), 1);
        assert!(std::ptr::eq(hits.items[0], &items[2]));

        let hits = filter_json(&items, &["v"], "7");
        assert_eq!(hits.total_results(), 1);
        assert!(std::ptr::eq(hits.items[0], &items[4]));
    }

    #[test]
    fn json_array_segments_index_by_position() {
        let item = json!({ "followers": [{ "name": "Max" }, { "name": "Bella" }] });
        assert_eq!(resolve_path(&item, "followers.1.name"), Some(&json!("Bella")));
        assert_eq!(resolve_path(&item, "followers.x.name"), None);
        assert_eq!(resolve_path(&item, "followers.9.name"), None);
    }

    #[test]
    fn number_formatting_matches_script_output() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
    }
}
