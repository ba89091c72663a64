//! Layered settings loading
//!
//! An optional file is read first, then `AKULIMA__*` environment variables
//! override individual keys (`AKULIMA__SCHEDULE__PLATFORM_FEE_PERCENT=2`).

use anyhow::Context;
use ::config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;

pub const ENV_PREFIX: &str = "AKULIMA";
pub const ENV_SEPARATOR: &str = "__";

/// Load settings of type `T`. Keys missing from every source fall back to the
/// type's serde defaults.
pub fn load_settings<T: DeserializeOwned>(path: Option<&Path>) -> anyhow::Result<T> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        )
        .build()
        .with_context(|| match path {
            Some(p) => format!("failed to read settings from {}", p.display()),
            None => "failed to read settings from environment".to_string(),
        })?;

    settings
        .try_deserialize()
        .context("settings do not match the expected shape")
}
