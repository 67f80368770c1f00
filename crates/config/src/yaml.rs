// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::{Context, Result};
use std::{fs, io::ErrorKind, path::Path};

/// Read a yaml file substituting `$VAR` and `${VAR}` from the environment. A missing file reads
/// as an empty document.
pub fn load_yaml_with_env(file_path: &Path) -> Result<String> {
    let content = match fs::read_to_string(file_path) {
        Ok(val) => val,
        Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(e).with_context(|| format!("Could not read {}", file_path.display()))
        }
    };

    Ok(shellexpand::env(&content)
        .context("Could not substitute environment variables")?
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn substitutes_environment_variables() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.yaml");
        let mut file = File::create(&file_path)?;
        writeln!(
            file,
            "counter_address: $COUNTER_TEST_ADDRESS\ndecryption:\n  timeout_ms: ${{COUNTER_TEST_TIMEOUT}}"
        )?;

        std::env::set_var("COUNTER_TEST_ADDRESS", "0x5FbDB2315678afecb367f032d93F642f64180aa3");
        std::env::set_var("COUNTER_TEST_TIMEOUT", "250");

        let processed = load_yaml_with_env(&file_path)?;

        assert!(processed.contains("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(processed.contains("timeout_ms: 250"));
        Ok(())
    }

    #[test]
    fn missing_file_is_empty() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(load_yaml_with_env(&dir.path().join("nope.yaml"))?, "");
        Ok(())
    }
}
