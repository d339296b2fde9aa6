//! File sinks for responses and extracted code artifacts.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::extract::CodeBlock;

/// Reads an input file as UTF-8 for use as prompt context.
pub fn read_input_file(path: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(path.as_ref())
        .map_err(|e| Error::io(format!("failed to read {}", path.as_ref().display()), e))
}

/// Writes content to a path, creating parent directories as needed.
pub fn save_to_file(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| Error::io(format!("failed to create {}", parent.display()), e))?;
    }
    fs::write(path, content)
        .map_err(|e| Error::io(format!("failed to write {}", path.display()), e))
}

/// Writes the valid blocks from a classification to disk.
///
/// Fan-out policy: one valid block goes to the requested path verbatim;
/// several valid blocks go to the path stem suffixed `-1`, `-2`, ... with
/// the extension preserved; zero valid blocks fall back to writing the raw
/// response to the requested path. Returns the paths written and whether
/// any block validated.
pub fn write_code_blocks(
    path: impl AsRef<Path>,
    blocks: &[CodeBlock],
    raw_response: &str,
) -> Result<(Vec<PathBuf>, bool)> {
    let path = path.as_ref();
    let valid: Vec<&CodeBlock> = blocks.iter().filter(|b| b.is_valid).collect();

    match valid.as_slice() {
        [] => {
            save_to_file(path, raw_response)?;
            Ok((vec![path.to_path_buf()], false))
        }
        [only] => {
            save_to_file(path, &only.payload)?;
            Ok((vec![path.to_path_buf()], true))
        }
        many => {
            let mut written = Vec::with_capacity(many.len());
            for (index, block) in many.iter().enumerate() {
                let numbered = numbered_path(path, index + 1);
                save_to_file(&numbered, &block.payload)?;
                written.push(numbered);
            }
            Ok((written, true))
        }
    }
}

/// Suffixes the path stem with `-{index}`, keeping the extension.
fn numbered_path(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{index}"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::classify;

    #[test]
    fn numbered_path_keeps_extension() {
        assert_eq!(
            numbered_path(Path::new("out/gen.py"), 2),
            PathBuf::from("out/gen-2.py")
        );
        assert_eq!(
            numbered_path(Path::new("Makefile"), 1),
            PathBuf::from("Makefile-1")
        );
    }

    #[test]
    fn single_valid_block_uses_requested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.py");
        let blocks = classify("```python\ndef f():\n    return 1\n```");
        let (written, any_valid) = write_code_blocks(&path, &blocks, "raw").unwrap();
        assert!(any_valid);
        assert_eq!(written, vec![path.clone()]);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "def f():\n    return 1"
        );
    }

    #[test]
    fn multiple_valid_blocks_fan_out_with_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.py");
        let response = "```\ndef f():\n    return 1\n```\n```\ndef g():\n    return 2\n```";
        let blocks = classify(response);
        let (written, any_valid) = write_code_blocks(&path, &blocks, response).unwrap();
        assert!(any_valid);
        assert_eq!(
            written,
            vec![dir.path().join("gen-1.py"), dir.path().join("gen-2.py")]
        );
        assert_eq!(
            fs::read_to_string(&written[1]).unwrap(),
            "def g():\n    return 2"
        );
    }

    #[test]
    fn no_valid_blocks_writes_raw_response() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gen.txt");
        let (written, any_valid) =
            write_code_blocks(&path, &[], "plain prose answer").unwrap();
        assert!(!any_valid);
        assert_eq!(written, vec![path.clone()]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "plain prose answer");
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");
        save_to_file(&path, "content").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "content");
    }
}
