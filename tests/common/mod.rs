use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TRIAGE_STORE: &str = "pacientes_registro.csv";
pub const INTAKE_STORE: &str = "ficha_ingreso.csv";

pub struct CliOutput {
    pub stdout: String,
    #[allow(dead_code)]
    pub stderr: String,
}

/// Runs the binary in scripted mode against a private application home.
pub struct WizardHarness {
    home: TempDir,
}

impl WizardHarness {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn home(&self) -> &Path {
        self.home.path()
    }

    #[allow(dead_code)]
    pub fn store_path(&self, file: &str) -> PathBuf {
        self.home().join(file)
    }

    #[allow(dead_code)]
    pub fn store_contents(&self, file: &str) -> Option<String> {
        fs::read_to_string(self.store_path(file)).ok()
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("psicosystem").expect("binary exists");
        cmd.env("PSICOSYSTEM_HOME", self.home())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn run(&self, flow: &str, menu_sequences: &[&str], text_inputs: &[&str]) -> CliOutput {
        assert!(
            !menu_sequences.is_empty(),
            "provide at least one menu sequence"
        );
        let mut cmd = self.command();
        cmd.arg(flow)
            .env("PSICOSYSTEM_TEST_MENU_EVENTS", menu_sequences.join("|"))
            .env("PSICOSYSTEM_TEST_TEXT_INPUTS", text_inputs.join("|"));
        let output = cmd.output().expect("run scripted CLI");
        if !output.status.success() {
            panic!(
                "scripted CLI failed: status={}\nstdout:\n{}\nstderr:\n{}",
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        CliOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}
