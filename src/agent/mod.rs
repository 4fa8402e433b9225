//! Agent interface
//!
//! An agent is a pure transform from instruction text to an [`AgentOutput`]
//! record. It never touches disk or version control itself; the pipeline
//! owns all I/O. That keeps the interface swappable for a real
//! model-backed agent later without touching the pipeline.

use chrono::Utc;

use crate::models::{AgentOutput, FileUpdate};

/// Produces the file mutations, memory append, and commit message for one
/// instruction. Implementations must always return a valid (possibly
/// empty-files) record and must not raise domain errors.
pub trait InstructionAgent: Send + Sync {
    fn invoke(&self, instruction: &str) -> AgentOutput;
}

/// Placeholder agent: records the instruction into a single `dummy.txt`
/// file with fixed commit and memory text. No model behind it.
pub struct StubAgent;

impl InstructionAgent for StubAgent {
    fn invoke(&self, instruction: &str) -> AgentOutput {
        let ts = Utc::now().to_rfc3339();
        AgentOutput {
            commit_message: "Dummy: apply instruction".to_string(),
            files: vec![FileUpdate {
                path: "dummy.txt".to_string(),
                content: format!("Instruction: {}\nRecorded: {}\n", instruction, ts),
            }],
            memory_update: format!(
                "\n## {}\nInstruction: {}\nOutcome: Dummy file created.\n",
                ts, instruction
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_agent_echoes_instruction() {
        let output = StubAgent.invoke("add a hello world script");

        assert_eq!(output.files.len(), 1);
        assert_eq!(output.files[0].path, "dummy.txt");
        assert!(output.files[0]
            .content
            .contains("add a hello world script"));
        assert!(!output.commit_message.is_empty());
    }

    #[test]
    fn test_stub_agent_memory_update_is_dated_section() {
        let output = StubAgent.invoke("hello");

        assert!(output.memory_update.starts_with("\n## "));
        assert!(output.memory_update.contains("Instruction: hello"));
        assert!(output.memory_update.ends_with('\n'));
    }
}
