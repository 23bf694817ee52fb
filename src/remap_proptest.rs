//! Property-based tests for extension reference remapping and artifact paths.
//!
//! These tests use proptest to generate schemas and extension directories and
//! verify that the remapping invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::artifact::sanitize_component;
    use crate::model::{Extension, Field};
    use crate::remap::remap;
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    // Source ids a0..a3, target ids b0..b3, same (title, type) per index.
    // "zz" is never installed anywhere.
    const REFERENCES: [&str; 5] = ["a0", "a1", "a2", "a3", "zz"];
    const TITLES: [&str; 4] = ["Map", "Color Picker", "Markdown", "Map"];
    const KINDS: [&str; 4] = ["widget", "field", "field", "field"];

    fn source_extensions() -> Vec<Extension> {
        (0..4)
            .map(|i| Extension::new(&format!("a{}", i), TITLES[i], KINDS[i]))
            .collect()
    }

    fn target_extensions() -> Vec<Extension> {
        (0..4)
            .rev()
            .map(|i| Extension::new(&format!("b{}", i), TITLES[i], KINDS[i]))
            .collect()
    }

    fn arb_field() -> impl Strategy<Value = Field> {
        (
            "[a-z_]{1,8}",
            "[A-Za-z ]{0,12}",
            // One past the last reference stands for an explicit null
            proptest::option::of(0usize..=REFERENCES.len()),
            any::<bool>(),
        )
            .prop_map(|(uid, display_name, reference, mandatory)| {
                let mut attributes = Map::new();
                attributes.insert("display_name".to_string(), display_name.into());
                attributes.insert("uid".to_string(), uid.into());
                if let Some(i) = reference {
                    let value = REFERENCES
                        .get(i)
                        .map_or(Value::Null, |r| Value::String(r.to_string()));
                    attributes.insert("extension_uid".to_string(), value);
                }
                attributes.insert("mandatory".to_string(), mandatory.into());
                Field::from(attributes)
            })
    }

    fn arb_schema() -> impl Strategy<Value = Vec<Field>> {
        proptest::collection::vec(arb_field(), 0..20)
    }

    proptest! {
        /// Property: output has the same length and field order as the input
        #[test]
        fn remap_preserves_order(schema in arb_schema()) {
            let result = remap(&schema, &source_extensions(), &target_extensions());
            prop_assert_eq!(result.schema.len(), schema.len());
            for (out, input) in result.schema.iter().zip(&schema) {
                let mut out = out.attributes().clone();
                let mut input = input.attributes().clone();
                let out_keys: Vec<_> = out.keys().cloned().collect();
                let input_keys: Vec<_> = input.keys().cloned().collect();
                prop_assert_eq!(out_keys, input_keys);
                out.remove("extension_uid");
                input.remove("extension_uid");
                prop_assert_eq!(out, input);
            }
        }

        /// Property: fields without a reference are returned unchanged
        #[test]
        fn remap_passes_plain_fields_through(schema in arb_schema()) {
            let result = remap(&schema, &source_extensions(), &target_extensions());
            for (out, input) in result.schema.iter().zip(&schema) {
                if input.extension_reference().is_none() {
                    prop_assert_eq!(out, input);
                }
            }
        }

        /// Property: remapping is deterministic
        #[test]
        fn remap_is_idempotent_for_stable_directories(schema in arb_schema()) {
            let first = remap(&schema, &source_extensions(), &target_extensions());
            let second = remap(&schema, &source_extensions(), &target_extensions());
            prop_assert_eq!(first, second);
        }

        /// Property: every resolved reference exists in the target directory
        /// and has the capability of the source extension
        #[test]
        fn remap_resolves_to_target_extensions(schema in arb_schema()) {
            let source = source_extensions();
            let target = target_extensions();
            let result = remap(&schema, &source, &target);
            for rewrite in &result.rewrites {
                let from = source.iter().find(|e| e.uid == rewrite.from).unwrap();
                let to = target.iter().find(|e| e.uid == rewrite.to).unwrap();
                prop_assert!(from.same_capability(to));
            }
        }

        /// Property: only the uninstalled reference is ever unresolved, and
        /// each one is reported exactly once
        #[test]
        fn remap_reports_each_unmatched_reference(schema in arb_schema()) {
            let result = remap(&schema, &source_extensions(), &target_extensions());
            let expected = schema
                .iter()
                .filter(|f| f.extension_uid() == Some("zz"))
                .count();
            prop_assert_eq!(result.unresolved.len(), expected);
            prop_assert_eq!(
                result.rewrites.len() + result.unresolved.len(),
                schema.iter().filter(|f| f.extension_reference().is_some()).count()
            );
        }

        /// Property: sanitized directory names never contain path separators
        #[test]
        fn sanitize_component_never_splits_paths(input in ".*") {
            let result = sanitize_component(&input);
            prop_assert!(!result.contains('/'));
            prop_assert!(!result.contains('\\'));
            prop_assert_eq!(result.chars().count(), input.chars().count());
        }
    }

    #[test]
    fn duplicate_title_resolves_by_type() {
        // "Map" exists as widget (a0) and field (a3); each maps to its own twin
        let source = source_extensions();
        let target = target_extensions();
        let schema: Vec<Field> = serde_json::from_value(serde_json::json!([
            {"uid": "w", "extension_uid": "a0"},
            {"uid": "f", "extension_uid": "a3"}
        ]))
        .unwrap();
        let result = remap(&schema, &source, &target);
        assert_eq!(result.schema[0].extension_uid(), Some("b0"));
        assert_eq!(result.schema[1].extension_uid(), Some("b3"));
    }
}
