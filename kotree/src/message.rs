//! Messages reported while processing instructions.

use alloc::{string::String, vec::Vec};
use core::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Ok,
    Info,
    Warning,
}

/// Position of an instruction, possibly inside a required module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub line: usize,
    /// module required by the instruction
    pub module: Option<String>,
}

/// Sequence of instructions leading to an instruction,
/// starting with the outermost `Require` instruction and
/// ending with the instruction itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trail(pub Vec<Frame>);

impl Trail {
    /// Return the line of the innermost instruction.
    pub fn line(&self) -> Option<usize> {
        Some(self.0.last()?.line)
    }
}

impl fmt::Display for Trail {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for m in self.0.iter().filter_map(|fr| fr.module.as_ref()) {
            writeln!(f, "In module [{}]", m)?;
        }
        match self.line() {
            Some(line) => write!(f, "line:{}:", line),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Message {
    pub severity: Severity,
    pub title: &'static str,
    pub body: String,
    pub trail: Trail,
}

impl Message {
    pub fn new(severity: Severity, title: &'static str, body: String) -> Self {
        let trail = Trail::default();
        Self {
            severity,
            title,
            body,
            trail,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} [{}] {}", self.trail, self.title, self.body)
    }
}

#[test]
fn display() {
    use alloc::string::ToString;
    let mut msg = Message::new(Severity::Ok, "Require", "Module [m] successfully loaded.".into());
    msg.trail = Trail(Vec::from([
        Frame {
            line: 3,
            module: Some("m".into()),
        },
        Frame {
            line: 7,
            module: None,
        },
    ]));
    let expected = "In module [m]\nline:7: [Require] Module [m] successfully loaded.";
    assert_eq!(msg.to_string(), expected);
}
