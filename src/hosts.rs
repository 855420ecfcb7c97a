use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Parse a host list: one host per line.
///
/// Lines are trimmed; blank lines and lines starting with `#` are skipped.
pub fn parse_hosts_str(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

/// Load a host list from a file path.
pub fn load_hosts_from_path(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("could not open host file: {}", path.as_ref().display()))?;
    Ok(parse_hosts_str(&content))
}

/// Turn the `--host` argument into the list of hosts to scan.
///
/// A value ending in `.txt` (any case) is read as a host file, anything else
/// is taken as a single hostname.
pub fn resolve_hosts(input: &str) -> Result<Vec<String>> {
    if input.to_lowercase().ends_with(".txt") {
        info!("Reading hosts from file: {input}");
        return load_hosts_from_path(input);
    }
    info!("Target is a single host: {input}");
    Ok(vec![input.to_string()])
}

/// Results file used when none is given: `<input minus extension>_results.txt`.
pub fn default_output_path(input: &str) -> PathBuf {
    let path = Path::new(input);
    let base = match path.extension() {
        Some(_) => path.with_extension(""),
        None => path.to_path_buf(),
    };
    let mut name = base.into_os_string();
    name.push("_results.txt");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_comment_lines() {
        let input = "play.example.net\n\n   # staging\n  mc.example.org  \n#x\n";
        assert_eq!(parse_hosts_str(input), vec!["play.example.net", "mc.example.org"]);
    }

    #[test]
    fn only_comments_is_empty() {
        assert!(parse_hosts_str("# a\n\n   \n#b\n").is_empty());
    }

    #[test]
    fn single_host_passes_through() {
        assert_eq!(resolve_hosts("mc.example.org").unwrap(), vec!["mc.example.org"]);
    }

    #[test]
    fn missing_host_file_errors() {
        let err = resolve_hosts("/definitely/not/here/hosts.TXT").unwrap_err();
        assert!(format!("{err:#}").contains("could not open host file"));
    }

    #[test]
    fn default_output_strips_extension() {
        assert_eq!(default_output_path("hosts.txt"), PathBuf::from("hosts_results.txt"));
        assert_eq!(default_output_path("lists/eu.txt"), PathBuf::from("lists/eu_results.txt"));
        assert_eq!(
            default_output_path("play.example.net"),
            PathBuf::from("play.example_results.txt")
        );
        assert_eq!(default_output_path("localhost"), PathBuf::from("localhost_results.txt"));
    }
}
