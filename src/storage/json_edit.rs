//! Formatting-preserving edits of JSON translation files.

use jsonc_parser::ParseOptions;
use jsonc_parser::cst::{
    CstInputValue,
    CstRootNode,
};
use serde_json::Value;

use crate::tree::LeafValue;

/// Write `value` at `path` in `json_text`, keeping the rest of the document's formatting.
///
/// An existing property is updated in place; a missing one is appended, creating
/// intermediate objects as needed. Returns `None` if `json_text` cannot be parsed,
/// `path` is empty, or the edit would replace something of the other shape: a
/// non-object where `path` needs a parent, or an object where it needs a leaf.
#[must_use]
pub fn set_value_in_json_text<S: AsRef<str>>(
    json_text: &str,
    path: &[S],
    value: &LeafValue,
) -> Option<String> {
    let (leaf, parents) = path.split_last()?;

    let root = CstRootNode::parse(json_text, &ParseOptions::default()).ok()?;
    let mut current_obj = match root.value() {
        Some(node) => node.as_object()?,
        None => root.object_value_or_set(),
    };
    for part in parents {
        let part = part.as_ref();
        current_obj = match current_obj.get(part) {
            Some(prop) => prop.value()?.as_object()?,
            None => current_obj.object_value_or_set(part),
        };
    }

    let input = to_cst_input(value.as_json());
    match current_obj.get(leaf.as_ref()) {
        Some(prop) => {
            if prop.value().is_some_and(|node| node.as_object().is_some()) {
                return None;
            }
            prop.set_value(input);
        }
        None => {
            current_obj.append(leaf.as_ref(), input);
        }
    }

    Some(root.to_string())
}

fn to_cst_input(value: &Value) -> CstInputValue {
    match value {
        Value::Null => CstInputValue::Null,
        Value::Bool(b) => CstInputValue::Bool(*b),
        Value::Number(n) => CstInputValue::Number(n.to_string()),
        Value::String(s) => CstInputValue::String(s.clone()),
        Value::Array(items) => CstInputValue::Array(items.iter().map(to_cst_input).collect()),
        Value::Object(map) => CstInputValue::Object(
            map.iter().map(|(k, v)| (k.clone(), to_cst_input(v))).collect(),
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use serde_json::json;

    use super::*;

    fn edited(json_text: &str, path: &[&str], value: &str) -> String {
        set_value_in_json_text(json_text, path, &LeafValue::from(value)).expect("edit should succeed")
    }

    #[googletest::test]
    fn updates_existing_key_in_place() {
        let json = r#"{
  "common": {
    "hello": "world"
  }
}"#;

        let result = edited(json, &["common", "hello"], "こんにちは");

        expect_that!(result, contains_substring("\"hello\": \"こんにちは\""));
        expect_that!(result, not(contains_substring("world")));
    }

    #[googletest::test]
    fn appends_missing_key_under_existing_parent() {
        let json = r#"{
  "common": {
    "hello": "こんにちは"
  }
}"#;

        let result = edited(json, &["common", "goodbye"], "さようなら");

        expect_that!(result, contains_substring("\"goodbye\": \"さようなら\""));
        expect_that!(result, contains_substring("\"hello\": \"こんにちは\""));
    }

    #[googletest::test]
    fn creates_missing_parents() {
        let result = edited("{}", &["a", "b", "c"], "deep");

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed, json!({ "a": { "b": { "c": "deep" } } }));
    }

    #[googletest::test]
    fn preserves_indentation_and_key_order() {
        let json = r#"{
    "zeta": "z",
    "alpha": "a"
}"#;

        let result = edited(json, &["alpha"], "A");

        expect_that!(result, contains_substring("    \"zeta\": \"z\""));
        expect_that!(result.find("zeta").unwrap() < result.find("alpha").unwrap(), eq(true));
    }

    #[googletest::test]
    fn writes_non_string_leaves_verbatim() {
        let value = LeafValue::from_json(json!(3)).unwrap();

        let result = set_value_in_json_text(r#"{ "count": 1 }"#, &["count"], &value).unwrap();

        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed, json!({ "count": 3 }));
    }

    #[googletest::test]
    fn invalid_json_returns_none() {
        let result = set_value_in_json_text("{ not json", &["a"], &LeafValue::from("x"));

        expect_that!(result, none());
    }

    #[googletest::test]
    fn leaf_in_the_way_of_a_parent_returns_none() {
        let result = set_value_in_json_text(r#"{ "a": "A" }"#, &["a", "b"], &LeafValue::from("x"));

        expect_that!(result, none());
    }

    #[googletest::test]
    fn object_in_the_way_of_a_leaf_returns_none() {
        let result =
            set_value_in_json_text(r#"{ "a": { "b": "B" } }"#, &["a"], &LeafValue::from("x"));

        expect_that!(result, none());
    }

    #[googletest::test]
    fn non_object_root_returns_none() {
        let result = set_value_in_json_text(r#"["a"]"#, &["a"], &LeafValue::from("x"));

        expect_that!(result, none());
    }

    #[googletest::test]
    fn empty_path_returns_none() {
        let result = set_value_in_json_text::<&str>("{}", &[], &LeafValue::from("x"));

        expect_that!(result, none());
    }
}
