use std::process::Command;

use log::{debug, warn};

use crate::error::Error;

/// The three invocation shapes the generator needs from the filtering
/// tool. Production is a real iptables subprocess; tests substitute a stub
/// returning canned text.
pub trait Oracle {
    /// Self-help text for the ICMP protocol extension. Does not touch
    /// firewall state.
    fn help_text(&mut self) -> Result<String, Error>;

    /// Flush the scratch chain, then append a single rule matching
    /// `filter`. The appended rule is never evaluated; installing it only
    /// coerces the tool into canonicalizing the filter expression so the
    /// listing can be read back.
    fn install_match(&mut self, filter: &str) -> Result<(), Error>;

    /// List the scratch chain in numeric, non-resolving form.
    fn list_rules(&mut self) -> Result<String, Error>;
}

/// Subprocess-backed oracle.
///
/// The scratch chain must be owned exclusively by this process for the
/// duration of the run. Once a probe rule has been installed, the chain is
/// flushed again on drop so no scratch rule outlives the run.
#[derive(Debug)]
pub struct IptablesOracle {
    program: String,
    base_args: Vec<String>,
    chain: String,
    dirty: bool,
}

impl IptablesOracle {
    pub fn new(command: &str, chain: &str) -> Result<Self, Error> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some((program, base_args)) = parts.split_first() else {
            return Err(Error::OracleExecution {
                command: command.to_string(),
                detail: "--iptables-cmd is empty".to_string(),
            });
        };

        let oracle = Self {
            program: program.to_string(),
            base_args: base_args.iter().map(|s| s.to_string()).collect(),
            chain: chain.to_string(),
            dirty: false,
        };
        oracle.check_available()?;
        Ok(oracle)
    }

    /// Verify the program resolves on PATH before any firewall state is
    /// touched. Probing also needs privilege to rewrite the scratch chain;
    /// name that requirement up front instead of letting the first probe
    /// fail with a bare exit code.
    fn check_available(&self) -> Result<(), Error> {
        let which = Command::new("which").arg(&self.program).output();
        match which {
            Ok(output) if output.status.success() => Ok(()),
            _ => Err(Error::OracleExecution {
                command: self.program.clone(),
                detail: format!(
                    "not found on PATH. Generating the table requires iptables \
                     and privilege to rewrite the `{}` chain.",
                    self.chain
                ),
            }),
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, Error> {
        let mut cmd = Command::new(&self.program);
        let mut rendered = self.program.clone();
        for arg in self
            .base_args
            .iter()
            .map(String::as_str)
            .chain(args.iter().copied())
        {
            cmd.arg(arg);
            rendered.push(' ');
            rendered.push_str(arg);
        }

        debug!("running {rendered}");
        let output = cmd.output().map_err(|e| Error::OracleExecution {
            command: rendered.clone(),
            detail: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::OracleExecution {
                command: rendered,
                detail: format!(
                    "exit code {}: {}",
                    output.status.code().unwrap_or(127),
                    stderr.trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn flush(&self) -> Result<(), Error> {
        self.run(&["-F", &self.chain]).map(|_| ())
    }
}

impl Oracle for IptablesOracle {
    fn help_text(&mut self) -> Result<String, Error> {
        self.run(&["-p", "icmp", "-h"])
    }

    fn install_match(&mut self, filter: &str) -> Result<(), Error> {
        self.flush()?;
        self.dirty = true;
        self.run(&["-A", &self.chain, "-p", "icmp", "--icmp-type", filter])?;
        Ok(())
    }

    fn list_rules(&mut self) -> Result<String, Error> {
        self.run(&["-nL", &self.chain])
    }
}

impl Drop for IptablesOracle {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.flush() {
                warn!("could not flush scratch chain {}: {e}", self.chain);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_command_is_rejected() {
        let err = IptablesOracle::new("", "FORWARD").unwrap_err();
        assert!(matches!(err, Error::OracleExecution { .. }));
    }

    #[test]
    fn missing_program_is_rejected() {
        // Deliberately not a real binary; the PATH preflight must catch it
        // before any chain is touched.
        let err = IptablesOracle::new("iptables-definitely-not-installed", "FORWARD").unwrap_err();
        match err {
            Error::OracleExecution { command, detail } => {
                assert_eq!(command, "iptables-definitely-not-installed");
                assert!(detail.contains("not found on PATH"), "detail: {detail}");
            }
            other => panic!("expected OracleExecution, got {other:?}"),
        }
    }

    #[test]
    fn command_splits_on_whitespace() {
        // `sh` exists everywhere the tests run; the remainder becomes base
        // args for every invocation.
        let oracle = IptablesOracle::new("sh -c", "FORWARD").unwrap();
        assert_eq!(oracle.program, "sh");
        assert_eq!(oracle.base_args, vec!["-c".to_string()]);
        assert!(!oracle.dirty);
    }

    #[test]
    fn nonzero_exit_reports_stderr() {
        let oracle = IptablesOracle::new("sh", "FORWARD").unwrap();
        let err = oracle
            .run(&["-c", "echo bad probe >&2; exit 4"])
            .unwrap_err();
        match err {
            Error::OracleExecution { detail, .. } => {
                assert!(detail.contains("exit code 4"), "detail: {detail}");
                assert!(detail.contains("bad probe"), "detail: {detail}");
            }
            other => panic!("expected OracleExecution, got {other:?}"),
        }
    }

    #[test]
    fn captures_stdout_on_success() {
        let oracle = IptablesOracle::new("sh -c", "FORWARD").unwrap();
        let out = oracle.run(&["echo icmptype 8"]).unwrap();
        assert_eq!(out, "icmptype 8\n");
    }
}
