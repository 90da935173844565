// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reads the device configuration file.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::DeviceConfig;

/// Loads the device configuration from disk.
///
/// Nothing is cached: every call reads and parses the file again, so edits
/// take effect on the next polling iteration.
///
/// # Examples
///
/// ```
/// use devbridge::config::ConfigLoader;
///
/// let loader = ConfigLoader::new("does/not/exist.json");
///
/// // A missing file is not fatal: the result is simply empty.
/// assert!(loader.load().is_empty());
/// assert!(loader.try_load().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    /// Creates a loader for the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration, returning an empty one on any failure.
    ///
    /// Failures are logged. Callers should treat an empty result as "nothing
    /// to do this iteration".
    #[must_use]
    pub fn load(&self) -> DeviceConfig {
        match self.try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Failed to load device config");
                DeviceConfig::default()
            }
        }
    }

    /// Loads the configuration, reporting why it failed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist,
    /// [`ConfigError::Io`] if it cannot be read, [`ConfigError::Empty`] if
    /// it holds only `{}` and [`ConfigError::Parse`] if it is not a valid
    /// device document.
    pub fn try_load(&self) -> Result<DeviceConfig, ConfigError> {
        let contents = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(self.path.clone())
            } else {
                ConfigError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let parse_error = |source| ConfigError::Parse {
            path: self.path.clone(),
            source,
        };
        let document: serde_json::Value = serde_json::from_str(&contents).map_err(parse_error)?;

        // `{}` is a placeholder, not a configuration with zero devices.
        if document.as_object().is_some_and(serde_json::Map::is_empty) {
            return Err(ConfigError::Empty(self.path.clone()));
        }

        let config: DeviceConfig = serde_json::from_value(document).map_err(parse_error)?;

        tracing::trace!(
            path = %self.path.display(),
            devices = config.len(),
            "Loaded device config"
        );
        Ok(config)
    }
}
