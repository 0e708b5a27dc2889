use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

const EXPORT_DIR_VAR: &str = "CREWLEDGER_EXPORT_DIR";
const EXPORT_PREFIX_VAR: &str = "CREWLEDGER_EXPORT_PREFIX";
const CURRENCY_SYMBOL_VAR: &str = "CREWLEDGER_CURRENCY_SYMBOL";

const DEFAULT_EXPORT_DIR: &str = ".";
const DEFAULT_EXPORT_PREFIX: &str = "crewledger-";
const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Verifier configuration
pub struct VerifyConfig {
    pub export_dir: PathBuf,
    pub export_prefix: String,
    pub currency_symbol: String,
    /// Files named on the command line; when empty the export dir is scanned.
    pub files: Vec<PathBuf>,
}

impl VerifyConfig {
    pub fn from_env(args: impl IntoIterator<Item = String>) -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(args, |key| env::var(key).ok())
    }

    fn from_lookup(
        args: impl IntoIterator<Item = String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let setting = |key: &str, default: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        Self {
            export_dir: PathBuf::from(setting(EXPORT_DIR_VAR, DEFAULT_EXPORT_DIR)),
            export_prefix: setting(EXPORT_PREFIX_VAR, DEFAULT_EXPORT_PREFIX),
            currency_symbol: setting(CURRENCY_SYMBOL_VAR, DEFAULT_CURRENCY_SYMBOL),
            files: args.into_iter().map(PathBuf::from).collect(),
        }
    }

    /// Export files to verify, in a stable order.
    pub fn export_files(&self) -> io::Result<Vec<PathBuf>> {
        if !self.files.is_empty() {
            return Ok(self.files.clone());
        }
        scan_exports(&self.export_dir, &self.export_prefix)
    }
}

fn scan_exports(dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(prefix) && name.ends_with(".json") {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}
