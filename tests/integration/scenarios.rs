//! End-to-end script scenarios.

use crate::common::{registry_with_captured_print, run_collecting};
use pipetree::{CommandNode, EMIT_KEY, Fields, HandlerRegistry, Pipeline, PipelineError};
use std::io::Write;

fn node(line: &str) -> CommandNode {
    CommandNode::from_words(line)
}

#[tokio::test]
async fn test_emit_reaches_destination() {
    let pipeline = Pipeline::new(HandlerRegistry::with_builtins());

    let (result, messages) = run_collecting(&pipeline, &[node("emit a b")]).await;

    result.unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].attachment.is_none());
    let fields = Fields::decode(&messages[0].payload).unwrap();
    assert_eq!(fields, Fields::new().set(EMIT_KEY, ["a", "b"]));
}

#[tokio::test]
async fn test_openfile_into_print_copies_file_bytes() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let contents = b"line one\nline two\n\x00binary\xff tail";
    file.write_all(contents).unwrap();
    file.flush().unwrap();

    let (registry, stdout) = registry_with_captured_print();
    let pipeline = Pipeline::new(registry);
    let path = file.path().display().to_string();

    // print consumes what its children produce.
    let script = [node("print").with_child(node(&format!("openfile {}", path)))];
    let (result, messages) = run_collecting(&pipeline, &script).await;

    result.unwrap();
    assert!(messages.is_empty());
    assert_eq!(stdout.contents(), contents);
}

#[tokio::test]
async fn test_openfile_output_goes_to_caller_not_children() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"data").unwrap();
    let path = file.path().display().to_string();

    let (registry, stdout) = registry_with_captured_print();
    let pipeline = Pipeline::new(registry);
    let script = [node(&format!("openfile {}", path)).with_child(node("print"))];

    let (result, messages) = run_collecting(&pipeline, &script).await;

    result.unwrap();
    assert!(stdout.contents().is_empty());
    assert_eq!(messages.len(), 1);
    let fields = Fields::decode(&messages[0].payload).unwrap();
    assert_eq!(fields.get_one("path"), Some(path.as_str()));
    assert_eq!(fields.get_one("type"), Some("file"));
    assert_eq!(messages[0].attachment.as_ref().map(|a| a.label()), Some(path.as_str()));
}

#[tokio::test]
async fn test_unknown_command_fails_and_sends_nothing() {
    let pipeline = Pipeline::new(HandlerRegistry::with_builtins());

    let (result, messages) = run_collecting(&pipeline, &[node("nosuch")]).await;

    let err = result.unwrap_err();
    assert!(matches!(err, PipelineError::NoSuchCommand(ref name) if name == "nosuch"));
    assert_eq!(err.to_string(), "no such command: nosuch");
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_nested_trace_passes_payload_unchanged() {
    let pipeline = Pipeline::new(HandlerRegistry::with_builtins());
    let inner = node("trace").with_child(node("emit x"));
    let script = [node("trace").with_child(inner)];

    let (result, messages) = run_collecting(&pipeline, &script).await;

    result.unwrap();
    assert_eq!(messages.len(), 1);
    let expected = Fields::new().set(EMIT_KEY, ["x"]).encode().unwrap();
    assert_eq!(messages[0].payload, expected);
}

#[tokio::test]
async fn test_siblings_run_depth_first_in_document_order() {
    let pipeline = Pipeline::new(HandlerRegistry::with_builtins()).with_channel_capacity(1);
    let script = [node("trace").with_children([
        node("trace").with_children([node("emit 1a"), node("emit 1b")]),
        node("emit 2"),
        node("trace").with_child(node("emit 3")),
    ])];

    let (result, messages) = run_collecting(&pipeline, &script).await;

    result.unwrap();
    let order: Vec<String> = messages
        .iter()
        .map(|m| Fields::decode(&m.payload).unwrap().get(EMIT_KEY).unwrap()[0].clone())
        .collect();
    assert_eq!(order, ["1a", "1b", "2", "3"]);
}

#[tokio::test]
async fn test_nested_failure_propagates_to_top() {
    let pipeline = Pipeline::new(HandlerRegistry::with_builtins());
    let script = [
        node("trace").with_child(node("trace").with_children([node("emit ok"), node("bogus")])),
        node("emit unreachable"),
    ];

    let (result, messages) = run_collecting(&pipeline, &script).await;

    assert_eq!(result.unwrap_err().to_string(), "no such command: bogus");
    assert_eq!(messages.len(), 1);
    let fields = Fields::decode(&messages[0].payload).unwrap();
    assert_eq!(fields.get_one(EMIT_KEY), Some("ok"));
}

#[tokio::test]
async fn test_wide_fan_in_with_small_queues() {
    let pipeline = Pipeline::new(HandlerRegistry::with_builtins()).with_channel_capacity(1);
    let children = (0..50).map(|i| node(&format!("emit {}", i)));
    let script = [node("trace").with_child(node("trace").with_children(children))];

    let (result, messages) = run_collecting(&pipeline, &script).await;

    result.unwrap();
    assert_eq!(messages.len(), 50);
}
