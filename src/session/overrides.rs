use url::Url;

use crate::foundation::config::RuntimeConfig;
use crate::foundation::error::{MotionError, MotionResult};

/// Ids force-selected through the page URL for development.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DevOverride {
    pub composition: Option<String>,
    pub behavior: Option<String>,
}

impl DevOverride {
    /// Read the override parameters named in `config` from an absolute URL.
    pub fn from_url(url: &str, config: &RuntimeConfig) -> MotionResult<Self> {
        let url = Url::parse(url).map_err(|e| MotionError::config(format!("url '{url}': {e}")))?;
        Ok(Self::from_pairs(
            url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())),
            config,
        ))
    }

    /// Read the override parameters from a bare query string (`a=1&b=2`, optional `?`).
    pub fn from_query(query: &str, config: &RuntimeConfig) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned())),
            config,
        )
    }

    fn from_pairs(pairs: impl Iterator<Item = (String, String)>, config: &RuntimeConfig) -> Self {
        let mut out = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            // First occurrence wins.
            if key == config.override_param && out.composition.is_none() {
                out.composition = Some(value.to_owned());
            } else if key == config.behavior_override_param && out.behavior.is_none() {
                out.behavior = Some(value.to_owned());
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.composition.is_none() && self.behavior.is_none()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/overrides.rs"]
mod tests;
