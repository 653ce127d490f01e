//! Instrument catalog supplied by the caller at startup

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::instrument::{DividendClass, DividendSpec, Instrument, Symbol};

const SAMPLE_CATALOG: &str = include_str!("../config/catalog.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub symbol: Symbol,
    pub class: DividendClass,
    #[serde(flatten)]
    pub dividend: DividendSpec,
}

impl CatalogEntry {
    pub fn instrument(&self) -> Instrument {
        Instrument::new(self.symbol.clone(), self.class)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub instruments: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid instrument catalog")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in catalog {}", path.display()))
    }

    /// Five-instrument sample catalog bundled with the binary
    pub fn sample() -> anyhow::Result<Self> {
        Self::from_json(SAMPLE_CATALOG)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
