//! Yes/no confirmation before an action runs.

use std::io::BufRead;
use tracing::warn;

use crate::ui::RenderSink;

pub const APPROVAL_PROMPT: &str = "Do you approve this action? (y/n): ";

/// History note recorded when the user turns an action down.
pub const DECLINE_NOTE: &str = "I did not approve the previous action. Let's try something else.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalDecision {
    Approve,
    Deny,
}

/// Only `y`/`yes` approve; everything else, including an empty line, denies.
pub fn parse_approval_decision(input: &str) -> ApprovalDecision {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => ApprovalDecision::Approve,
        _ => ApprovalDecision::Deny,
    }
}

/// Read one line without its terminator. `None` on EOF or a read error.
pub fn read_line<R: BufRead>(input: &mut R) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        Err(e) => {
            warn!(error = %e, "failed to read console input");
            None
        }
    }
}

/// Show `description` and block for one answer.
pub fn confirm<R: BufRead>(input: &mut R, renderer: &dyn RenderSink, description: &str) -> bool {
    renderer.approval_block(&format!("With your approval, I will {description}"));
    renderer.prompt(APPROVAL_PROMPT);
    let decision = read_line(input)
        .map(|line| parse_approval_decision(&line))
        .unwrap_or(ApprovalDecision::Deny);
    decision == ApprovalDecision::Approve
}
