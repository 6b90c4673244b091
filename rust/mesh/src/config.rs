// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editor configuration, loaded from JSON or environment variables.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use roommodel_geometry::Area;

use crate::error::{Error, Result};
use crate::quadtree::DEFAULT_MIN_SIZE;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Room bounds every polygon must fit into.
    pub world_bounds: Area,
    /// Maximum number of undoable commands kept.
    pub undo_depth: usize,
    /// Smallest side length the polygon index subdivides to.
    pub quadtree_min_size: i32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            world_bounds: Area::of(-2048, 2048, -2048, 2048),
            undo_depth: 64,
            quadtree_min_size: DEFAULT_MIN_SIZE,
        }
    }
}

impl EditorConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let bounds = defaults.world_bounds;
        Self {
            world_bounds: Area::of(
                env_or("ROOMMODEL_WORLD_MIN_X", bounds.min_x),
                env_or("ROOMMODEL_WORLD_MAX_X", bounds.max_x),
                env_or("ROOMMODEL_WORLD_MIN_Y", bounds.min_y),
                env_or("ROOMMODEL_WORLD_MAX_Y", bounds.max_y),
            ),
            undo_depth: env_or("ROOMMODEL_UNDO_DEPTH", defaults.undo_depth),
            quadtree_min_size: env_or("ROOMMODEL_QUADTREE_MIN_SIZE", defaults.quadtree_min_size),
        }
    }

    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration can build an editing session.
    pub fn validate(&self) -> Result<()> {
        let world = self.world_bounds;
        if world.min_x > world.max_x || world.min_y > world.max_y {
            return Err(Error::InvalidConfig(format!(
                "world bounds {world} have a minimum above the maximum"
            )));
        }
        if self.world_bounds.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "world bounds {} enclose no area",
                self.world_bounds
            )));
        }
        if self.undo_depth == 0 {
            return Err(Error::InvalidConfig("undo depth must be at least 1".into()));
        }
        if self.quadtree_min_size < 1 {
            return Err(Error::InvalidConfig(format!(
                "quadtree minimum size must be positive (got {})",
                self.quadtree_min_size
            )));
        }
        Ok(())
    }

    /// Undo depth as a non-zero count.
    pub fn undo_depth(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.undo_depth)
            .ok_or_else(|| Error::InvalidConfig("undo depth must be at least 1".into()))
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
