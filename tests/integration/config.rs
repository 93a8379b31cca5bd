//! Loading YAML script files and running them.

use pipetree::{ConfigError, DiscardSink, Pipeline, ScriptLoader};
use std::io::Write;

use crate::common::{registry_with_captured_print, run_collecting};

#[tokio::test]
async fn test_yaml_script_prints_file() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("data.txt");
    std::fs::write(&data_path, "from yaml\n").unwrap();

    let script_path = dir.path().join("script.yaml");
    let mut script_file = std::fs::File::create(&script_path).unwrap();
    write!(
        script_file,
        "settings:\n  channel_capacity: 2\nscript:\n  - run: print\n    children:\n      - openfile {}\n",
        data_path.display()
    )
    .unwrap();

    let file = ScriptLoader::load_file(&script_path).unwrap();
    let (registry, stdout) = registry_with_captured_print();
    let pipeline = Pipeline::new(registry).with_channel_capacity(file.settings.channel_capacity);

    let (result, messages) = run_collecting(&pipeline, &file.to_script().unwrap()).await;

    result.unwrap();
    assert!(messages.is_empty());
    assert_eq!(stdout.contents(), b"from yaml\n");
}

#[tokio::test]
async fn test_yaml_script_against_discard_sink() {
    let yaml = r#"
script:
  - emit one
  - run: trace
    children:
      - emit two
      - emit three
"#;
    let file = ScriptLoader::parse_str(yaml).unwrap();
    let pipeline = Pipeline::new(pipetree::HandlerRegistry::with_builtins());
    let devnull = DiscardSink::spawn(pipeline.channel_capacity());

    pipeline
        .execute_script(devnull.endpoint(), &file.to_script().unwrap())
        .await
        .unwrap();

    assert_eq!(devnull.shutdown().await, 3);
}

#[test]
fn test_malformed_yaml_is_reported() {
    let err = ScriptLoader::parse_str("script: [unclosed").unwrap_err();
    assert!(matches!(err, ConfigError::YamlError(_)));
}
