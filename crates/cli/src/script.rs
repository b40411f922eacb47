use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use engine::Command;
use serde::Deserialize;

/// Timed command script replayed by the runner.
///
/// # Example
/// ```json
/// {
///   "steps": [
///     { "at_ms": 0, "command": { "type": "play" } },
///     { "at_ms": 4000, "command": { "type": "mark_start" } },
///     { "at_ms": 9000, "command": { "type": "mark_end" } },
///     { "at_ms": 9500, "command": { "type": "play_clip", "clip_id": 1 } }
///   ],
///   "run_until_ms": 16000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    pub steps: Vec<ScriptStep>,
    /// Keeps the clock running after the last step, e.g. to see a clip stop.
    #[serde(default)]
    pub run_until_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    pub at_ms: u64,
    pub command: Command,
}

impl ScriptStep {
    pub fn at(&self) -> Duration {
        Duration::from_millis(self.at_ms)
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("Failed to read script: {:?}", path))?;
        Self::parse(&raw).with_context(|| format!("Invalid script: {:?}", path))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let script: Self = serde_json::from_str(raw).context("Failed to parse script JSON")?;
        script.validate()?;
        Ok(script)
    }

    /// Time at which the replay ends.
    pub fn end(&self) -> Duration {
        let last_step = self.steps.last().map_or(0, |step| step.at_ms);
        Duration::from_millis(self.run_until_ms.unwrap_or(last_step).max(last_step))
    }

    fn validate(&self) -> Result<()> {
        for (index, pair) in self.steps.windows(2).enumerate() {
            if pair[1].at_ms < pair[0].at_ms {
                bail!(
                    "step {} at {} ms comes before step {} at {} ms",
                    index + 2,
                    pair[1].at_ms,
                    index + 1,
                    pair[0].at_ms
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use engine::Command;

    use super::Script;

    #[test]
    fn parses_tagged_commands() {
        let script = Script::parse(
            r#"{
                "steps": [
                    { "at_ms": 0, "command": { "type": "toggle_playback" } },
                    { "at_ms": 250, "command": { "type": "scrub", "fraction": 0.5 } },
                    { "at_ms": 900, "command": { "type": "delete_clip", "clip_id": 2 } }
                ]
            }"#,
        )
        .expect("valid script");

        assert_eq!(script.steps.len(), 3);
        assert_eq!(script.steps[1].command, Command::Scrub { fraction: 0.5 });
        assert_eq!(script.end(), Duration::from_millis(900));
    }

    #[test]
    fn run_until_extends_the_replay() {
        let script = Script::parse(
            r#"{ "steps": [{ "at_ms": 10, "command": { "type": "play" } }], "run_until_ms": 5000 }"#,
        )
        .expect("valid script");

        assert_eq!(script.end(), Duration::from_secs(5));
    }

    #[test]
    fn out_of_order_steps_are_rejected() {
        let error = Script::parse(
            r#"{
                "steps": [
                    { "at_ms": 500, "command": { "type": "mark_start" } },
                    { "at_ms": 100, "command": { "type": "mark_end" } }
                ]
            }"#,
        )
        .expect_err("steps are out of order");

        assert!(error.to_string().contains("step 2"));
    }

    #[test]
    fn unknown_command_is_rejected() {
        let result = Script::parse(
            r#"{ "steps": [{ "at_ms": 0, "command": { "type": "rewind" } }] }"#,
        );

        assert!(result.is_err());
    }
}
