//! Conversion between nested translation trees and flat key maps.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use super::codec::{
    KeyError,
    PathCodec,
};
use super::types::{
    FlatKey,
    FlatLanguageMap,
    LanguageTree,
    LeafValue,
    Node,
};

/// Flatten a nested translation tree into a separator-joined key map.
///
/// Only leaves produce keys, so an empty object has no flat form and is gone after
/// `unflatten`.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use translation_grid::tree::{LanguageTree, PathCodec, flatten};
///
/// let tree: LanguageTree = serde_json::from_value(json!({
///     "common": {
///         "hello": "Hello",
///         "goodbye": "Goodbye"
///     }
/// }))
/// .unwrap();
///
/// let flat = flatten(&tree, &PathCodec::default()).unwrap();
/// assert_eq!(flat.get("common.hello").map(ToString::to_string), Some("Hello".to_string()));
/// assert_eq!(flat.len(), 2);
/// ```
///
/// # Errors
/// `InvalidSegment` when a tree key is empty or contains the separator; such a key
/// could not be told apart from a nested path.
pub fn flatten(tree: &LanguageTree, codec: &PathCodec) -> Result<FlatLanguageMap, KeyError> {
    let mut result = FlatLanguageMap::new();
    flatten_object(tree, codec, None, &mut result)?;
    Ok(result)
}

fn flatten_object(
    object: &BTreeMap<String, Node>,
    codec: &PathCodec,
    prefix: Option<&str>,
    result: &mut FlatLanguageMap,
) -> Result<(), KeyError> {
    for (segment, node) in object {
        codec.check_segment(segment).map_err(|e| match (e, prefix) {
            (KeyError::InvalidSegment { segment, reason }, Some(p)) => {
                KeyError::InvalidSegment { segment, reason: format!("{reason} (under '{p}')") }
            }
            (e, _) => e,
        })?;
        let full_key = prefix.map_or_else(|| segment.clone(), |p| codec.join(p, segment));

        match node {
            Node::Object(children) => {
                flatten_object(children, codec, Some(&full_key), result)?;
            }
            Node::Leaf(value) => {
                result.insert(full_key, value.clone());
            }
        }
    }
    Ok(())
}

/// Rebuild the nested tree from a flat key map.
///
/// A key that is a strict prefix path of another key (`a` and `a.b`) cannot be
/// represented as one tree; it is rejected instead of letting one side overwrite
/// the other.
///
/// # Errors
/// `InvalidKey` for malformed keys and for prefix collisions.
pub fn unflatten(flat: &FlatLanguageMap, codec: &PathCodec) -> Result<LanguageTree, KeyError> {
    let mut root = LanguageTree::new();
    for (key, value) in flat {
        insert_leaf(&mut root, codec, key, value.clone())?;
    }
    Ok(root)
}

fn insert_leaf(
    root: &mut LanguageTree,
    codec: &PathCodec,
    key: &str,
    value: LeafValue,
) -> Result<(), KeyError> {
    let path = codec.decode(key)?;
    let Some((last, parents)) = path.split_last() else {
        return Err(KeyError::invalid_key(key, "key is empty"));
    };

    let mut current = root;
    let mut walked: Option<FlatKey> = None;
    for segment in parents {
        let here = walked.as_deref().map_or_else(|| segment.clone(), |p| codec.join(p, segment));
        current = match current.entry(segment.clone()).or_insert_with(|| Node::Object(BTreeMap::new()))
        {
            Node::Object(children) => children,
            Node::Leaf(_) => {
                return Err(KeyError::invalid_key(
                    key,
                    format!("'{here}' already holds a value and cannot also contain keys"),
                ));
            }
        };
        walked = Some(here);
    }

    match current.entry(last.clone()) {
        Entry::Vacant(slot) => {
            slot.insert(Node::Leaf(value));
            Ok(())
        }
        Entry::Occupied(_) => Err(KeyError::invalid_key(
            key,
            "key already contains nested keys and cannot also hold a value",
        )),
    }
}

/// Find a key in `flat` that would collide with `key` in the nested form.
///
/// That is either an ancestor of `key` holding a leaf, or any descendant of `key`.
#[must_use]
pub fn find_prefix_collision<'a>(
    flat: &'a FlatLanguageMap,
    key: &str,
    codec: &PathCodec,
) -> Option<&'a FlatKey> {
    let separator = codec.separator();

    let mut search_from = 0;
    while let Some(offset) = key.get(search_from..).and_then(|rest| rest.find(separator)) {
        let end = search_from + offset;
        if let Some((ancestor, _)) = key.get(..end).and_then(|prefix| flat.get_key_value(prefix)) {
            return Some(ancestor);
        }
        search_from = end + separator.len();
    }

    flat.range(format!("{key}{separator}")..)
        .next()
        .map(|(candidate, _)| candidate)
        .filter(|candidate| codec.is_descendant(candidate, key))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::test_utils::{
        flat_map,
        tree,
    };

    #[googletest::test]
    fn flatten_simple() {
        let result = flatten(&tree(json!({ "hello": "Hello", "goodbye": "Goodbye" })), &PathCodec::default())
            .unwrap();

        expect_that!(result.get("hello").map(ToString::to_string), some(eq("Hello")));
        expect_that!(result.get("goodbye").map(ToString::to_string), some(eq("Goodbye")));
        expect_that!(result.len(), eq(2));
    }

    #[googletest::test]
    fn flatten_nested() {
        let result = flatten(
            &tree(json!({
                "common": { "hello": "Hello", "goodbye": "Goodbye" },
                "errors": { "notFound": "Not found" }
            })),
            &PathCodec::default(),
        )
        .unwrap();

        expect_that!(result.get("common.hello").map(ToString::to_string), some(eq("Hello")));
        expect_that!(result.get("common.goodbye").map(ToString::to_string), some(eq("Goodbye")));
        expect_that!(result.get("errors.notFound").map(ToString::to_string), some(eq("Not found")));
        expect_that!(result.len(), eq(3));
    }

    #[googletest::test]
    fn flatten_keeps_arrays_and_scalars_as_leaves() {
        let result = flatten(
            &tree(json!({
                "menu": { "items": ["item1", "item2"] },
                "count": 42,
                "enabled": true,
                "nothing": null
            })),
            &PathCodec::default(),
        )
        .unwrap();

        expect_that!(result.len(), eq(4));
        expect_that!(result.contains_key("menu.items"), eq(true));
        expect_that!(result.contains_key("menu.items[0]"), eq(false));
        expect_that!(result.get("count").map(ToString::to_string), some(eq("42")));
        expect_that!(result.get("nothing").map(ToString::to_string), some(eq("null")));
    }

    #[googletest::test]
    fn flatten_skips_empty_objects() {
        let result =
            flatten(&tree(json!({ "empty": {}, "a": { "b": "c" } })), &PathCodec::default()).unwrap();

        expect_that!(result.len(), eq(1));
        expect_that!(result.contains_key("empty"), eq(false));
    }

    #[rstest]
    #[case::separator_in_key(json!({ "key.with.dots": "x" }))]
    #[case::separator_in_nested_key(json!({ "a": { "b.c": "x" } }))]
    #[case::empty_key(json!({ "": "x" }))]
    fn flatten_rejects_ambiguous_segments(#[case] input: serde_json::Value) {
        let result = flatten(&tree(input), &PathCodec::default());

        assert!(matches!(result, Err(KeyError::InvalidSegment { .. })));
    }

    #[googletest::test]
    fn flatten_with_custom_separator() {
        let codec = PathCodec::new("_");
        let result = flatten(&tree(json!({ "common": { "hello.world": "Hello" } })), &codec).unwrap();

        expect_that!(result.get("common_hello.world").map(ToString::to_string), some(eq("Hello")));
    }

    #[googletest::test]
    fn unflatten_builds_nested_objects() {
        let flat = flat_map(&[("a.b", "Hi"), ("a.c", "There"), ("d", "Top")]);

        let result = unflatten(&flat, &PathCodec::default()).unwrap();

        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "a": { "b": "Hi", "c": "There" }, "d": "Top" })
        );
    }

    #[rstest]
    #[case::leaf_then_child(&[("a", "leaf"), ("a.b", "child")])]
    #[case::child_then_leaf(&[("a.b", "child"), ("a", "leaf")])]
    #[case::deep(&[("a.b", "leaf"), ("a.b.c.d", "child")])]
    fn unflatten_rejects_prefix_collisions(#[case] entries: &[(&str, &str)]) {
        let flat = flat_map(entries);

        let result = unflatten(&flat, &PathCodec::default());

        assert!(matches!(result, Err(KeyError::InvalidKey { .. })));
    }

    #[googletest::test]
    fn unflatten_rejects_malformed_keys() {
        let flat = flat_map(&[("a..b", "x")]);

        let result = unflatten(&flat, &PathCodec::default());

        assert!(matches!(result, Err(KeyError::InvalidKey { ref key, .. }) if key == "a..b"));
    }

    #[googletest::test]
    fn round_trip_restores_tree() {
        let original = tree(json!({
            "greeting": { "hello": "Hello", "bye": "Bye" },
            "farewell": "Farewell",
            "deep": { "er": { "est": "!" } },
            "list": ["x", { "y": 1 }],
            "empty": ""
        }));
        let codec = PathCodec::default();

        let restored = unflatten(&flatten(&original, &codec).unwrap(), &codec).unwrap();

        assert_eq!(restored, original);
    }

    #[googletest::test]
    fn round_trip_drops_empty_objects() {
        let codec = PathCodec::default();
        let with_empty = tree(json!({ "a": {}, "b": "x", "c": { "d": {} } }));

        let restored = unflatten(&flatten(&with_empty, &codec).unwrap(), &codec).unwrap();

        assert_eq!(restored, tree(json!({ "b": "x" })));
        expect_that!(restored == with_empty, eq(false));
    }

    #[rstest]
    #[case::ancestor_leaf(&[("a", "x")], "a.b", Some("a"))]
    #[case::deep_ancestor_leaf(&[("a.b", "x")], "a.b.c.d", Some("a.b"))]
    #[case::descendant(&[("a.b.c", "x")], "a.b", Some("a.b.c"))]
    #[case::sibling(&[("a.b", "x")], "a.c", None)]
    #[case::same_key(&[("a.b", "x")], "a.b", None)]
    #[case::shared_text_prefix(&[("ab", "x"), ("a.bc", "y")], "a.b", None)]
    fn prefix_collision_cases(
        #[case] entries: &[(&str, &str)],
        #[case] key: &str,
        #[case] expected: Option<&str>,
    ) {
        let flat = flat_map(entries);

        let found = find_prefix_collision(&flat, key, &PathCodec::default());

        assert_eq!(found.map(String::as_str), expected);
    }
}
