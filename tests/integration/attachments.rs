//! Attachment ownership across whole pipelines.
//!
//! Every attachment must be closed exactly once, whether it is consumed,
//! forwarded, rejected by a closed channel, or left queued when a handler
//! stops reading.

use async_trait::async_trait;
use pipetree::testing::{CloseProbe, tracked_attachment};
use pipetree::{CommandNode, Endpoint, Handler, HandlerError, HandlerRegistry, Pipeline};
use std::sync::{Arc, Mutex};

use crate::common::{registry_with_captured_print, run_collecting};

/// Sends one tracked attachment per argument and records its probe.
struct Attach {
    probes: Mutex<Vec<CloseProbe>>,
}

impl Attach {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            probes: Mutex::new(Vec::new()),
        })
    }

    fn probes(&self) -> Vec<CloseProbe> {
        self.probes.lock().unwrap().clone()
    }
}

#[async_trait]
impl Handler for Attach {
    async fn run(
        &self,
        args: &[String],
        _input: &mut Endpoint,
        output: &Endpoint,
    ) -> Result<(), HandlerError> {
        for label in args.iter().skip(1) {
            let (attachment, probe) = tracked_attachment(label, label.as_bytes());
            self.probes.lock().unwrap().push(probe);
            if let Err(err) = output.send(label.as_bytes(), Some(attachment)).await {
                if let Some(attachment) = err.into_attachment() {
                    attachment.close();
                }
            }
        }
        Ok(())
    }
}

fn pipeline_with_attach(capacity: usize) -> (Pipeline, Arc<Attach>, pipetree::testing::SharedBuffer) {
    let (mut registry, stdout) = registry_with_captured_print();
    let attach = Attach::new();
    registry.register("attach", Arc::clone(&attach) as Arc<dyn Handler>);
    (Pipeline::new(registry).with_channel_capacity(capacity), attach, stdout)
}

fn assert_all_closed_once(probes: &[CloseProbe]) {
    assert!(!probes.is_empty());
    for (i, probe) in probes.iter().enumerate() {
        assert_eq!(probe.closes(), 1, "attachment {} closed {} times", i, probe.closes());
    }
}

#[tokio::test]
async fn test_printed_attachments_are_closed() {
    let (pipeline, attach, stdout) = pipeline_with_attach(2);
    let script = [CommandNode::from_words("print").with_child(CommandNode::from_words("attach a b c"))];

    let (result, messages) = run_collecting(&pipeline, &script).await;

    result.unwrap();
    assert!(messages.is_empty());
    assert_eq!(stdout.contents(), b"abc");
    assert_all_closed_once(&attach.probes());
}

#[tokio::test]
async fn test_attachments_ignored_by_parent_are_closed() {
    // emit never reads its input, so everything attach sends is either
    // rejected or left queued when emit's task ends.
    let (pipeline, attach, _stdout) = pipeline_with_attach(1);
    let labels: Vec<String> = (0..10).map(|i| format!("f{}", i)).collect();
    let script = [CommandNode::from_words("emit done")
        .with_child(CommandNode::from_words(&format!("attach {}", labels.join(" "))))];

    let (result, messages) = run_collecting(&pipeline, &script).await;

    result.unwrap();
    assert_eq!(messages.len(), 1);
    assert_all_closed_once(&attach.probes());
}

#[tokio::test]
async fn test_attachments_reaching_destination_change_owner() {
    let (pipeline, attach, _stdout) = pipeline_with_attach(4);
    let script = [CommandNode::from_words("trace").with_child(CommandNode::from_words("attach x y"))];

    let (result, messages) = run_collecting(&pipeline, &script).await;

    result.unwrap();
    let probes = attach.probes();
    assert_eq!(messages.len(), 2);
    assert!(probes.iter().all(|p| p.closes() == 0));

    drop(messages);
    assert_all_closed_once(&probes);
}

#[tokio::test]
async fn test_failure_path_still_closes_attachments() {
    let (pipeline, attach, _stdout) = pipeline_with_attach(1);
    let script = [CommandNode::from_words("print").with_children([
        CommandNode::from_words("attach one two"),
        CommandNode::from_words("missing"),
        CommandNode::from_words("attach never"),
    ])];

    let (result, _messages) = run_collecting(&pipeline, &script).await;

    assert_eq!(result.unwrap_err().to_string(), "no such command: missing");
    let probes = attach.probes();
    assert_eq!(probes.len(), 2);
    assert_all_closed_once(&probes);
}

#[tokio::test]
async fn test_registry_without_builtins_still_reports_unknown() {
    let pipeline = Pipeline::new(HandlerRegistry::new());
    let (result, messages) = run_collecting(&pipeline, &[CommandNode::from_words("print")]).await;
    assert!(result.is_err());
    assert!(messages.is_empty());
}
