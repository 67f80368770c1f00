// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use anyhow::Result;
use std::{
    fs,
    path::{Path, PathBuf},
};

const HEADER: &str = "// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.
";

fn rust_sources(dir: &Path, found: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == "target") {
                continue;
            }
            rust_sources(&path, found)?;
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            found.push(path);
        }
    }
    Ok(())
}

#[test]
fn every_source_opens_with_the_license_header() -> Result<()> {
    let crates = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
    let mut sources = Vec::new();
    rust_sources(&crates, &mut sources)?;
    assert!(!sources.is_empty());

    for path in sources {
        let text = fs::read_to_string(&path)?;
        let body = text.strip_prefix(HEADER);
        assert!(body.is_some(), "{} lacks the license header", path.display());
        // exactly one blank line separates the header from the code
        let body = body.unwrap_or_default();
        assert!(
            body.starts_with('\n') && !body.starts_with("\n\n"),
            "{} does not follow the header with a single blank line",
            path.display()
        );
    }
    Ok(())
}
