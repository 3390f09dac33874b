use crate::util::ring_buffer::OverflowPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub buffer: BufferConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Capacity used when `--capacity` is not given
    pub capacity: usize,
    /// What `push` does on a full buffer: "reject" or "overwrite"
    pub overflow: OverflowPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print the `--json` report
    pub json_pretty: bool,
}

// ── Defaults ─────────────────────────────────────────────────────────

impl Default for BufferConfig {
    fn default() -> Self {
        Self { capacity: 8, overflow: OverflowPolicy::Reject }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { json_pretty: true }
    }
}

// ── Load / Save ───────────────────────────────────────────────────────

impl Config {
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_or_default(&path),
            None       => Config::default(),
        }
    }

    /// A missing file is created with defaults (best-effort). A file that
    /// exists but does not parse is left alone and reported.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            let _ = Self::write_defaults_to(path);
            return Config::default();
        }
        match Self::load_from(path) {
            Ok(c)  => c,
            Err(e) => {
                warn!("ignoring config, using defaults: {:#}", e);
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let cfg: Config = toml::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(cfg)
    }

    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("ringq").join("ringq.toml"))
    }

    pub fn write_defaults_to(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(&Config::default())?;
        fs::write(path, format!("# ringq configuration\n# Generated on first run, edit freely\n\n{}", text))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[test]
    fn defaults_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ringq.toml");
        Config::write_defaults_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ringq.toml");
        fs::write(&path, "[buffer]\noverflow = \"overwrite\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.buffer.capacity, 8);
        assert_eq!(cfg.buffer.overflow, OverflowPolicy::Overwrite);
        assert!(cfg.output.json_pretty);
    }

    #[test]
    fn bad_policy_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ringq.toml");
        fs::write(&path, "[buffer]\noverflow = \"sometimes\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn force_alias_is_accepted_in_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ringq.toml");
        fs::write(&path, "[buffer]\ncapacity = 2\noverflow = \"force\"\n").unwrap();

        let cfg = Config::load_or_default(&path);
        assert_eq!(cfg.buffer.capacity, 2);
        assert_eq!(cfg.buffer.overflow, OverflowPolicy::Overwrite);
    }

    #[test]
    fn missing_file_gets_defaults_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ringq").join("ringq.toml");

        assert_eq!(Config::load_or_default(&path), Config::default());
        assert!(path.exists());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    #[test]
    fn broken_file_warns_and_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ringq.toml");
        let broken = "[buffer]\ncapacity = 2\noverflow = \"sometimes\"\n";
        fs::write(&path, broken).unwrap();

        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let cfg = tracing::subscriber::with_default(subscriber, || Config::load_or_default(&path));

        assert_eq!(cfg, Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), broken);
        let out = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("WARN"), "{}", out);
        assert!(out.contains("ringq.toml"), "{}", out);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }
}
