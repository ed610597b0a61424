//! Loads the run's header set: random pool agent plus optional overrides.

use std::fs;
use std::path::Path;

use anyhow::Context;
use probr_common::headers::{self, HeaderSet};

pub fn load(override_file: Option<&Path>) -> anyhow::Result<HeaderSet> {
    let set = HeaderSet::with_random_agent();

    let Some(path) = override_file else {
        return Ok(set);
    };

    let body = fs::read_to_string(path)
        .with_context(|| format!("failed to read header file {}", path.display()))?;
    let overrides = headers::parse_overrides(&body)
        .with_context(|| format!("{} is not a JSON object of headers", path.display()))?;

    Ok(set.merge(&overrides))
}
