// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sheet configuration loaded from defaults, JSON settings or environment.

use serde::{Deserialize, Serialize};
use wikinest_geometry::PanelLimits;

use crate::error::{Error, Result};

/// Prefix of the environment variables read by [`SheetConfig::from_env`]
pub const ENV_PREFIX: &str = "WIKINEST_";

/// Stock sheet and cutting settings, all lengths in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Sheet height (short side).
    pub sheet_height: f64,
    /// Sheet width (long side).
    pub sheet_width: f64,
    /// Clearance around each panel, per side.
    pub padding: f64,
    /// Unusable border around the sheet edge.
    pub margin: f64,
    /// Label text height.
    pub font_height: f64,
    /// Stock thickness; edges this long join the two faces of a panel.
    pub sheet_depth: f64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_height: 1200.0,
            sheet_width: 2400.0,
            padding: 12.5,
            margin: 2.5,
            font_height: 30.0,
            sheet_depth: 18.0,
        }
    }
}

impl SheetConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a JSON settings document. Missing fields take
    /// their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |field: &str, default: f64| -> f64 {
            lookup(&format!("{ENV_PREFIX}{}", field.to_ascii_uppercase()))
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        Self {
            sheet_height: read("sheet_height", defaults.sheet_height),
            sheet_width: read("sheet_width", defaults.sheet_width),
            padding: read("padding", defaults.padding),
            margin: read("margin", defaults.margin),
            font_height: read("font_height", defaults.font_height),
            sheet_depth: read("sheet_depth", defaults.sheet_depth),
        }
    }

    /// Reject settings that leave no room to place anything.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            self.sheet_height,
            self.sheet_width,
            self.padding,
            self.margin,
            self.font_height,
            self.sheet_depth,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(Error::InvalidConfig("non-finite value".into()));
        }
        if self.sheet_height <= 0.0 || self.sheet_width <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "sheet must be positive, got {} x {}",
                self.sheet_width, self.sheet_height
            )));
        }
        if self.margin < 0.0 || self.padding < 0.0 {
            return Err(Error::InvalidConfig(
                "margin and padding must not be negative".into(),
            ));
        }
        if self.sheet_depth <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "sheet depth must be positive, got {}",
                self.sheet_depth
            )));
        }
        let limits = self.panel_limits();
        if limits.panel_width <= 0.0 || limits.panel_height <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "margin {} and padding {} leave no usable area",
                self.margin, self.padding
            )));
        }
        Ok(())
    }

    pub fn inner_width(&self) -> f64 {
        self.sheet_width - 2.0 * self.margin
    }

    pub fn inner_height(&self) -> f64 {
        self.sheet_height - 2.0 * self.margin
    }

    /// Size limits handed to the profile builder.
    pub fn panel_limits(&self) -> PanelLimits {
        let padding = 2.0 * self.padding;
        PanelLimits {
            panel_width: self.inner_width() - padding,
            panel_height: self.inner_height() - padding,
            panel_max_width: self.inner_width(),
            panel_max_height: self.inner_height(),
            padding,
        }
    }

    /// Open interval of edge lengths that count as the sheet thickness.
    pub fn depth_window(&self) -> (f64, f64) {
        (self.sheet_depth - 1.0, self.sheet_depth + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults_match_standard_sheet() {
        let config = SheetConfig::default();
        assert!(config.validate().is_ok());
        assert_relative_eq!(config.inner_width(), 2395.0);
        assert_relative_eq!(config.inner_height(), 1195.0);

        let limits = config.panel_limits();
        assert_relative_eq!(limits.panel_width, 2370.0);
        assert_relative_eq!(limits.panel_height, 1170.0);
        assert_relative_eq!(limits.padding, 25.0);
        assert_eq!(config.depth_window(), (17.0, 19.0));
    }

    #[test]
    fn json_fills_missing_fields() {
        let config = SheetConfig::from_json(r#"{ "sheet_width": 3000, "padding": 5 }"#).unwrap();
        assert_relative_eq!(config.sheet_width, 3000.0);
        assert_relative_eq!(config.padding, 5.0);
        assert_relative_eq!(config.sheet_height, 1200.0);
    }

    #[test]
    fn json_rejects_unusable_sheet() {
        assert!(matches!(
            SheetConfig::from_json(r#"{ "sheet_height": 40, "margin": 10 }"#),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            SheetConfig::from_json("{ not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn lookup_overrides_and_ignores_garbage() {
        let config = SheetConfig::from_lookup(|key| match key {
            "WIKINEST_SHEET_DEPTH" => Some("24".into()),
            "WIKINEST_MARGIN" => Some("wide".into()),
            _ => None,
        });
        assert_relative_eq!(config.sheet_depth, 24.0);
        assert_relative_eq!(config.margin, 2.5);
    }
}
