//! Unit tests for the shared workspace.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::effect::{NewPaperEffect, NewPaperExecutor};

struct NamedTool(&'static str);

impl Tool for NamedTool {
    fn name(&self) -> &str {
        self.0
    }
}

struct TurnOver;

impl Effect for TurnOver {
    fn name(&self) -> &str {
        "Turn over"
    }

    fn execute(&self) {}
}

struct NoopExecutor;

impl NewPaperExecutor for NoopExecutor {
    fn create_paper(&self) {}
}

#[derive(Debug, PartialEq, Eq)]
struct PaperSize(u32);

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

#[rstest]
fn absent_capability_is_none(workspace: Workspace) {
    assert!(workspace.capability::<PaperSize>().is_none());
    assert!(workspace.effect::<NewPaperEffect>().is_none());
}

#[rstest]
fn capability_round_trips_by_type(workspace: Workspace) {
    workspace.insert_capability(Arc::new(PaperSize(210)));
    assert_eq!(
        workspace.capability::<PaperSize>().as_deref(),
        Some(&PaperSize(210))
    );

    workspace.insert_capability(Arc::new(PaperSize(297)));
    assert_eq!(
        workspace.capability::<PaperSize>().as_deref(),
        Some(&PaperSize(297))
    );
}

#[rstest]
fn effects_are_listed_and_typed(workspace: Workspace) {
    workspace.add_effect(Arc::new(NewPaperEffect::new(Arc::new(NoopExecutor))));
    workspace.add_effect(Arc::new(TurnOver));

    let names: Vec<String> = workspace
        .effects()
        .iter()
        .map(|effect| effect.name().to_owned())
        .collect();
    assert_eq!(names, ["New paper", "Turn over"]);

    let new_paper = workspace.effect::<NewPaperEffect>().expect("typed lookup");
    assert_eq!(new_paper.name(), "New paper");
    assert!(workspace.effect::<TurnOver>().is_some());
}

#[rstest]
fn first_tool_becomes_current(workspace: Workspace) {
    assert!(workspace.current_tool().is_none());
    workspace.add_tool(Arc::new(NamedTool("Drag")));
    workspace.add_tool(Arc::new(NamedTool("Fold")));

    let current = workspace.current_tool().expect("current tool");
    assert_eq!(current.name(), "Drag");
    assert_eq!(workspace.tools().len(), 2);
}

#[rstest]
fn select_tool_switches_current(workspace: Workspace) {
    workspace.add_tool(Arc::new(NamedTool("Drag")));
    workspace.add_tool(Arc::new(NamedTool("Fold")));

    workspace.select_tool("Fold").expect("select fold");

    assert_eq!(workspace.current_tool().expect("current").name(), "Fold");
}

#[rstest]
fn select_unknown_tool_fails(workspace: Workspace) {
    workspace.add_tool(Arc::new(NamedTool("Drag")));
    let err = workspace.select_tool("Cut").expect_err("unknown tool");
    assert_eq!(err.name, "Cut");
    assert_eq!(workspace.current_tool().expect("current").name(), "Drag");
}

#[rstest]
fn debug_lists_effect_and_tool_names(workspace: Workspace) {
    workspace.add_tool(Arc::new(NamedTool("Drag")));
    workspace.add_effect(Arc::new(TurnOver));
    let rendered = format!("{workspace:?}");
    assert!(rendered.contains("Drag"), "{rendered}");
    assert!(rendered.contains("Turn over"), "{rendered}");
}
