//! Terminal formatting for trees and events

use colored::Colorize;

use crate::events::{EventReceiver, LifecycleEvent, SuiteState, TestState};
use crate::tree::Node;

/// Render one event as a single line
pub fn format_event(event: &LifecycleEvent) -> String {
    match event {
        LifecycleEvent::RunStarted { tests } => {
            format!("{} {}", "Run started:".blue().bold(), tests.join(", "))
        }
        LifecycleEvent::RunFinished => format!("{}", "Run finished".blue().bold()),
        LifecycleEvent::Suite { suite, state } => match state {
            SuiteState::Running => format!("{} {}", "▶".cyan(), suite.dimmed()),
            SuiteState::Completed => format!("{} {}", "■".white(), suite.dimmed()),
        },
        LifecycleEvent::Test { test, state } => match state {
            TestState::Running => format!("  {} {}", "…".cyan(), test),
            TestState::Passed => format!("  {} {}", "✓".green(), test),
            TestState::Failed => format!("  {} {}", "✗".red(), test.red()),
        },
    }
}

/// Render a tree with two-space indentation per level
pub fn format_tree(root: &Node) -> String {
    let mut out = String::new();
    write_node(root, 0, &mut out);
    out
}

fn write_node(node: &Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        Node::Suite(suite) => {
            out.push_str(&format!("{}{} {}\n", indent, suite.label.bold(), suite.id.dimmed()));
            for child in &suite.children {
                write_node(child, depth + 1, out);
            }
        }
        Node::Test(test) => {
            out.push_str(&format!("{}{} {}\n", indent, test.label, test.id.dimmed()));
        }
    }
}

/// Print events until the sink goes away
pub async fn print_events(mut rx: EventReceiver) {
    while let Some(event) = rx.recv().await {
        println!("{}", format_event(&event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tree_indents_children() {
        colored::control::set_override(false);
        let root = Node::suite(
            "root",
            "Pester",
            vec![Node::suite("f", "a.Tests.ps1", vec![Node::test("f:2", "works")])],
        );
        assert_eq!(
            format_tree(&root),
            "Pester root\n  a.Tests.ps1 f\n    works f:2\n"
        );
    }

    #[test]
    fn test_format_failed_test() {
        colored::control::set_override(false);
        let line = format_event(&LifecycleEvent::test("f:2", TestState::Failed));
        assert_eq!(line, "  ✗ f:2");
    }
}
