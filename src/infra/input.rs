use std::{
    fs,
    io::{self, Read},
    path::Path,
};

use tracing::debug;

use super::error::InfraError;

/// Read markdown from `path`, or from stdin when no path is given.
pub fn read_markdown(path: Option<&Path>) -> Result<String, InfraError> {
    let markdown = match path {
        Some(path) => fs::read_to_string(path).map_err(|err| InfraError::input(path, err))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    debug!(
        target = "infra::input",
        bytes = markdown.len(),
        source = path.map_or_else(|| "stdin".to_string(), |path| path.display().to_string()),
        "read markdown"
    );
    Ok(markdown)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn missing_file_reports_input_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("missing.md");
        let err = read_markdown(Some(&path)).expect_err("file is absent");
        assert!(matches!(err, InfraError::Input { .. }));
    }

    #[test]
    fn reads_existing_file() {
        let mut file = NamedTempFile::new().expect("tmp file");
        file.write_all(b"# hello\n").expect("write markdown");
        let markdown = read_markdown(Some(file.path())).expect("file is readable");
        assert_eq!(markdown, "# hello\n");
    }
}
