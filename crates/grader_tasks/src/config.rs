//! Task configuration.
//!
//! Commands are loaded from an optional YAML file. Every section falls back
//! to the built-in defaults, so an empty file behaves like no file at all.

use std::path::Path;

use grader_runner::CommandSpec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TaskError, TaskResult};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "grader.yaml";

/// Commands used by the `setup`, `analyse` and `scan` tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaskConfig {
    /// Steps run by `setup`, in order
    pub setup: Vec<SetupStep>,
    /// Line counter invocation
    pub analyse: AnalyseConfig,
    /// SPDX scanner invocation
    pub scan: ScanConfig,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            setup: vec![
                SetupStep::new("Checking cloc installation:", "sudo apt-get install cloc")
                    .check("cloc"),
                SetupStep::new(
                    "Checking and installing requirements:",
                    "pip install -r requirements.txt",
                ),
            ],
            analyse: AnalyseConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

/// One bracketed setup command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupStep {
    /// Bracket label
    pub label: String,
    /// Command line, split on whitespace
    pub command: String,
    /// Program whose presence makes the step unnecessary
    #[serde(default)]
    pub check: Option<String>,
    /// Echo the command's output while it runs
    #[serde(default = "default_true")]
    pub stream_output: bool,
    /// Timeout in seconds (0 = none)
    #[serde(default)]
    pub timeout_seconds: u64,
}

fn default_true() -> bool {
    true
}

impl SetupStep {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
            check: None,
            stream_output: true,
            timeout_seconds: 0,
        }
    }

    pub fn check(mut self, program: impl Into<String>) -> Self {
        self.check = Some(program.into());
        self
    }

    /// Parsed command line.
    pub fn command_spec(&self) -> TaskResult<CommandSpec> {
        CommandSpec::parse(&self.command).ok_or_else(|| {
            TaskError::Config(format!("setup step '{}' has an empty command", self.label))
        })
    }
}

/// How `analyse` invokes the line counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyseConfig {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for AnalyseConfig {
    fn default() -> Self {
        Self {
            program: "cloc".to_string(),
            args: vec!["--xml".to_string()],
            timeout_seconds: 0,
        }
    }
}

impl AnalyseConfig {
    /// Command for `package`; an empty package adds no path argument.
    pub fn command(&self, package: &str) -> CommandSpec {
        CommandSpec::new(&self.program)
            .args(&self.args)
            .arg_if_present(package)
    }
}

/// How `scan` invokes the SPDX scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub interpreter: String,
    pub script: String,
    pub args: Vec<String>,
    pub timeout_seconds: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            script: "spdx_scanner.py".to_string(),
            args: vec!["-s".to_string(), "10571".to_string(), "-w".to_string()],
            timeout_seconds: 0,
        }
    }
}

impl ScanConfig {
    /// Command for `spdx_file`; an empty file adds no path argument.
    pub fn command(&self, spdx_file: &str) -> CommandSpec {
        CommandSpec::new(&self.interpreter)
            .arg(&self.script)
            .args(&self.args)
            .arg_if_present(spdx_file)
    }
}

impl TaskConfig {
    /// Load a configuration from a YAML file.
    pub fn from_file(path: &Path) -> TaskResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TaskError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> TaskResult<Self> {
        // An empty document deserializes to nothing, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to YAML.
    pub fn to_yaml(&self) -> TaskResult<String> {
        serde_yaml::to_string(self).map_err(TaskError::from)
    }

    /// Resolve the configuration for a run.
    ///
    /// An explicit path must exist. Otherwise `grader.yaml` in `dir` is used
    /// when present, and the built-in defaults when it is not.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> TaskResult<Self> {
        if let Some(path) = explicit {
            debug!("Loading configuration from {}", path.display());
            return Self::from_file(path);
        }

        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        if candidate.is_file() {
            debug!("Loading configuration from {}", candidate.display());
            Self::from_file(&candidate)
        } else {
            debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            Ok(Self::default())
        }
    }

    /// Reject configurations that cannot produce a command.
    pub fn validate(&self) -> TaskResult<()> {
        for step in &self.setup {
            if step.label.trim().is_empty() {
                return Err(TaskError::Config(format!(
                    "setup step '{}' has an empty label",
                    step.command
                )));
            }
            step.command_spec()?;
            if matches!(&step.check, Some(program) if program.trim().is_empty()) {
                return Err(TaskError::Config(format!(
                    "setup step '{}' has an empty check program",
                    step.label
                )));
            }
        }
        if self.analyse.program.trim().is_empty() {
            return Err(TaskError::Config("analyse.program is empty".to_string()));
        }
        if self.scan.interpreter.trim().is_empty() {
            return Err(TaskError::Config("scan.interpreter is empty".to_string()));
        }
        if self.scan.script.trim().is_empty() {
            return Err(TaskError::Config("scan.script is empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_commands() {
        let config = TaskConfig::default();

        let steps: Vec<Vec<String>> = config
            .setup
            .iter()
            .map(|s| s.command_spec().unwrap().argv())
            .collect();
        assert_eq!(
            steps,
            vec![
                vec!["sudo", "apt-get", "install", "cloc"],
                vec!["pip", "install", "-r", "requirements.txt"],
            ]
        );
        assert_eq!(config.setup[0].check.as_deref(), Some("cloc"));
        assert_eq!(config.setup[1].check, None);

        assert_eq!(config.analyse.command("src/").argv(), vec!["cloc", "--xml", "src/"]);
        assert_eq!(config.analyse.command("").argv(), vec!["cloc", "--xml"]);
        assert_eq!(
            config.scan.command("doc.spdx").argv(),
            vec!["python", "spdx_scanner.py", "-s", "10571", "-w", "doc.spdx"]
        );
    }

    #[test]
    fn test_default_labels_have_no_trailing_space() {
        let labels: Vec<String> = TaskConfig::default()
            .setup
            .into_iter()
            .map(|step| step.label)
            .collect();
        assert_eq!(
            labels,
            ["Checking cloc installation:", "Checking and installing requirements:"]
        );
        for label in labels.iter().map(String::as_str).chain([
            crate::analyse::ANALYSE_LABEL,
            crate::scan::SCAN_LABEL,
        ]) {
            assert_eq!(label, label.trim_end());
        }
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = TaskConfig::from_yaml(
            r#"
scan:
  interpreter: python3
"#,
        )
        .unwrap();

        assert_eq!(config.scan.interpreter, "python3");
        assert_eq!(config.scan.script, "spdx_scanner.py");
        assert_eq!(config.setup, TaskConfig::default().setup);
        assert_eq!(config.analyse, AnalyseConfig::default());
    }

    #[test]
    fn test_setup_steps_from_yaml() {
        let config = TaskConfig::from_yaml(
            r#"
setup:
  - label: "Checking cloc installation:"
    command: "sudo apt-get install -y cloc"
    check: cloc
    stream_output: false
"#,
        )
        .unwrap();

        assert_eq!(config.setup.len(), 1);
        let step = &config.setup[0];
        assert_eq!(step.check.as_deref(), Some("cloc"));
        assert!(!step.stream_output);
        assert_eq!(step.timeout_seconds, 0);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(TaskConfig::from_yaml("").unwrap(), TaskConfig::default());
        assert_eq!(TaskConfig::from_yaml("  \n").unwrap(), TaskConfig::default());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = TaskConfig::from_yaml("analyze:\n  program: cloc\n").unwrap_err();
        assert!(matches!(err, TaskError::Yaml(_)));
    }

    #[test]
    fn test_empty_command_rejected() {
        let err = TaskConfig::from_yaml(
            r#"
setup:
  - label: "Nothing:"
    command: "   "
"#,
        )
        .unwrap_err();
        assert!(matches!(err, TaskError::Config(_)));
    }

    #[test]
    fn test_empty_program_rejected() {
        let err = TaskConfig::from_yaml("analyse:\n  program: \"\"\n").unwrap_err();
        assert!(err.to_string().contains("analyse.program"));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let config = TaskConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(TaskConfig::from_yaml(&yaml).unwrap(), config);
    }
}
