use std::{fs, path::Path};

use anyhow::{Context, Result};
use blast_arena_core::ArenaConfig;
use blast_arena_system_agent::AgentConfig;
use blast_arena_system_safety::SafetyConfig;
use serde::Deserialize;

/// Tunables loaded from an optional TOML file; missing tables keep defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Arena rules and dimensions.
    pub(crate) arena: ArenaConfig,
    /// Hazard oracle tunables.
    pub(crate) safety: SafetyConfig,
    /// Agent policy tunables.
    pub(crate) agent: AgentConfig,
}

impl Settings {
    /// Reads and parses the settings file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        settings.arena.validate()?;
        Ok(settings)
    }
}
