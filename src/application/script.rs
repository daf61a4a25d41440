//! Drag replay scripts and node paths.
//!
//! A node path is a dot-separated list of sibling indexes from the root:
//! `0` is the first top-level node, `0.2` its third child.
//!
//! Script grammar, one step per line (`#` starts a comment):
//!
//! ```text
//! press PATH | press none
//! start PATH
//! enter node PATH
//! enter container PATH | enter container root
//! enter none
//! measure HEIGHT
//! end
//! cancel
//! ```

use tracing::instrument;

use crate::application::{ApplicationError, ApplicationResult};

/// Parses `0.1.2` into sibling indexes. Returns None for anything malformed.
pub fn parse_path(input: &str) -> Option<Vec<usize>> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    input.split('.').map(|part| part.parse().ok()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    /// Press on a node's drag handle, or elsewhere when None.
    Press(Option<Vec<usize>>),
    Start(Vec<usize>),
    EnterNode(Vec<usize>),
    /// Enter a node's child container, or the root container when None.
    EnterContainer(Option<Vec<usize>>),
    EnterNone,
    Measure(f32),
    End,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub step: ScriptStep,
}

#[instrument(level = "debug", skip(input))]
pub fn parse_script(input: &str) -> ApplicationResult<Vec<ScriptLine>> {
    let mut steps = Vec::new();
    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let words: Vec<&str> = text.split_whitespace().collect();
        let step = parse_step(&words).map_err(|message| ApplicationError::Script { line, message })?;
        steps.push(ScriptLine { line, step });
    }
    Ok(steps)
}

fn parse_step(words: &[&str]) -> Result<ScriptStep, String> {
    let path = |s: &str| parse_path(s).ok_or_else(|| format!("invalid node path '{}'", s));
    match words {
        ["press", "none"] => Ok(ScriptStep::Press(None)),
        ["press", p] => Ok(ScriptStep::Press(Some(path(*p)?))),
        ["start", p] => Ok(ScriptStep::Start(path(*p)?)),
        ["enter", "node", p] => Ok(ScriptStep::EnterNode(path(*p)?)),
        ["enter", "container", "root"] => Ok(ScriptStep::EnterContainer(None)),
        ["enter", "container", p] => Ok(ScriptStep::EnterContainer(Some(path(*p)?))),
        ["enter", "none"] => Ok(ScriptStep::EnterNone),
        ["measure", h] => h
            .parse()
            .map(ScriptStep::Measure)
            .map_err(|_| format!("invalid height '{}'", h)),
        ["end"] => Ok(ScriptStep::End),
        ["cancel"] => Ok(ScriptStep::Cancel),
        _ => Err(format!("unrecognized step '{}'", words.join(" "))),
    }
}
