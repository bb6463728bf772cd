//! Versioned prompt templates.
//!
//! Builtin templates are compiled in from `apps/api/prompts/<name>.v<N>.txt`.
//! A deployment can ship newer versions in `PROMPTS_DIR` without a rebuild;
//! the highest version found for each name wins.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::extraction::prompts::VACANCY_PARSER;
use crate::generation::prompts::OFFER_MESSAGE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,
    pub version: u32,
    pub body: String,
}

impl PromptTemplate {
    pub fn new(name: &str, version: u32, body: &str) -> Self {
        Self {
            name: name.to_string(),
            version,
            body: body.trim().to_string(),
        }
    }

    /// Short content hash, logged next to every call for audit.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.body.as_bytes());
        hex::encode(&digest[..6])
    }

    /// `<name>.v<version>`, matching the file name it was loaded from.
    pub fn label(&self) -> String {
        format!("{}.v{}", self.name, self.version)
    }
}

/// A compiled-in template: (name, version, body).
pub type BuiltinPrompt = (&'static str, u32, &'static str);

#[derive(Debug, Clone)]
pub struct PromptSet {
    pub vacancy_parser: PromptTemplate,
    pub offer_message: PromptTemplate,
}

impl PromptSet {
    pub fn builtin() -> Self {
        Self {
            vacancy_parser: from_builtin(VACANCY_PARSER),
            offer_message: from_builtin(OFFER_MESSAGE),
        }
    }

    /// Loads builtin templates, replacing each with the newest `<name>.v<N>.txt`
    /// present in `dir` (if any).
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        let mut set = Self::builtin();
        if let Some(dir) = dir {
            for slot in [&mut set.vacancy_parser, &mut set.offer_message] {
                if let Some(found) = newest_in_dir(dir, &slot.name)? {
                    *slot = found;
                }
            }
        }

        for t in [&set.vacancy_parser, &set.offer_message] {
            info!(
                prompt = %t.label(),
                fingerprint = %t.fingerprint(),
                "prompt template loaded"
            );
        }
        Ok(set)
    }
}

fn from_builtin((name, version, body): BuiltinPrompt) -> PromptTemplate {
    PromptTemplate::new(name, version, body)
}

/// Parses `<name>.v<N>.txt` and returns N when the name matches.
fn parse_version(file_name: &str, name: &str) -> Option<u32> {
    file_name
        .strip_prefix(name)?
        .strip_prefix(".v")?
        .strip_suffix(".txt")?
        .parse()
        .ok()
}

fn newest_in_dir(dir: &Path, name: &str) -> Result<Option<PromptTemplate>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Cannot read prompts directory {}", dir.display()))?;

    let mut newest: Option<(u32, std::path::PathBuf)> = None;
    for entry in entries {
        let path = entry?.path();
        let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        if let Some(version) = parse_version(file_name, name) {
            if newest.as_ref().map_or(true, |(v, _)| version > *v) {
                newest = Some((version, path));
            }
        }
    }

    let Some((version, path)) = newest else {
        return Ok(None);
    };
    let body = std::fs::read_to_string(&path)
        .with_context(|| format!("Cannot read prompt template {}", path.display()))?;
    if body.trim().is_empty() {
        anyhow::bail!("Prompt template {} is empty", path.display());
    }
    Ok(Some(PromptTemplate::new(name, version, &body)))
}
