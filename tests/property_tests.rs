//! Property-based tests for the label grammar and handle encoding.

use mv1::{Handle, LabelSpec};
use proptest::prelude::*;

fn label() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9]{0,6}".prop_filter("t is reserved", |s| s != "t")
}

fn label_spec() -> impl Strategy<Value = LabelSpec> {
    (
        prop::collection::vec(label(), 1..4),
        prop::collection::vec(label(), 1..4),
        any::<bool>(),
    )
        .prop_map(|(inputs, outputs, has_time)| LabelSpec {
            inputs,
            outputs,
            has_time,
        })
}

fn separator() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["", " ", "  ", "\t", "\n"]).prop_map(str::to_string)
}

/// Renders a spec as a label string with random padding and time position.
fn labels_string(spec: &LabelSpec, pad: &[String], time_at: usize) -> String {
    let mut inputs: Vec<&str> = spec.inputs.iter().map(String::as_str).collect();
    if spec.has_time {
        inputs.insert(time_at % (inputs.len() + 1), "t");
    }
    let p = |i: usize| pad[i % pad.len()].as_str();
    let join = |items: &[&str], offset: usize| {
        items
            .iter()
            .enumerate()
            .map(|(i, s)| format!("{}{}{}", p(offset + i), s, p(offset + i + 1)))
            .collect::<Vec<_>>()
            .join(",")
    };
    let outputs: Vec<&str> = spec.outputs.iter().map(String::as_str).collect();
    format!("{};{}", join(&inputs, 0), join(&outputs, 7))
}

proptest! {
    #[test]
    fn prop_parse_recovers_spec(
        spec in label_spec(),
        pad in prop::collection::vec(separator(), 1..5),
        time_at in 0usize..4,
    ) {
        let text = labels_string(&spec, &pad, time_at);
        let parsed = LabelSpec::parse(&text).unwrap();
        prop_assert_eq!(&parsed, &spec);
        prop_assert_eq!(LabelSpec::parse(&text).unwrap(), parsed);
    }

    #[test]
    fn prop_canonical_string_reparses(spec in label_spec()) {
        let parsed = LabelSpec::parse(&spec.to_labels_string()).unwrap();
        prop_assert_eq!(parsed, spec);
    }

    #[test]
    fn prop_handle_decodes(spec in label_spec()) {
        let handle = Handle::new(&spec);
        prop_assert_eq!(handle.as_str().len(), Handle::encoded_len(&spec));
        prop_assert_eq!(Handle::decode(handle.as_str()).unwrap(), spec);
    }

    #[test]
    fn prop_forbidden_characters_rejected(
        spec in label_spec(),
        forbidden in prop::sample::select(vec!['_', '-']),
        at in any::<prop::sample::Index>(),
    ) {
        let mut text = spec.to_labels_string();
        let positions: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        text.insert(positions[at.index(positions.len())], forbidden);
        prop_assert!(LabelSpec::parse(&text).is_err());
    }

    #[test]
    fn prop_arbitrary_input_never_panics(text in "\\PC{0,64}") {
        let _ = LabelSpec::parse(&text);
    }
}
