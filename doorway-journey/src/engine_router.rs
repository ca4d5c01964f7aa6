//! Engine link router
//!
//! Picks the outbound "Enter The Architect" URL from a fixed engine list.
//! An `engine=<key>` query parameter presets the selection; the dropdown can
//! change it afterwards. Resolution never fails: an engine without a URL
//! falls back to the default engine, then through a fixed priority order,
//! and finally to the compiled Orion URL.
//!
//! No network calls are made; this only computes a string. When the
//! external link guard is enabled, following a link to another origin needs
//! the user to confirm `LEAVING_SITE_PROMPT` first.

use crate::context::DoorwayContext;
use chrono::Utc;
use doorway_common::config::{EngineUrls, DEFAULT_ORION_URL};
use doorway_common::events::JourneyEvent;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, info};
use url::Url;

/// Text of the outbound link
pub const LINK_LABEL: &str = "Enter The Architect";

/// Query parameter that presets the engine
pub const ENGINE_QUERY_PARAM: &str = "engine";

/// Confirmation shown before leaving the site
pub const LEAVING_SITE_PROMPT: &str = "You are leaving AsArchitect.com.\n\nTo return anytime, use your browser’s Back button or visit asarchitect.com/return.";

/// Known engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKey {
    Orion,
    Gpt4o,
    Gpt5,
}

impl EngineKey {
    /// Dropdown order
    pub const ALL: [EngineKey; 3] = [EngineKey::Orion, EngineKey::Gpt4o, EngineKey::Gpt5];

    /// Tried in order when neither the selection nor the default has a URL
    pub const FALLBACK_ORDER: [EngineKey; 3] =
        [EngineKey::Gpt4o, EngineKey::Gpt5, EngineKey::Orion];

    /// Selection when nothing else applies
    pub const DEFAULT: EngineKey = EngineKey::Orion;

    pub fn key(&self) -> &'static str {
        match self {
            EngineKey::Orion => "orion",
            EngineKey::Gpt4o => "gpt4o",
            EngineKey::Gpt5 => "gpt5",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EngineKey::Orion => "Orion",
            EngineKey::Gpt4o => "GPT-4o",
            EngineKey::Gpt5 => "GPT-5",
        }
    }
}

impl FromStr for EngineKey {
    type Err = doorway_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EngineKey::ALL
            .into_iter()
            .find(|k| k.key() == wanted)
            .ok_or_else(|| doorway_common::Error::InvalidInput(format!("unknown engine '{}'", s)))
    }
}

impl std::fmt::Display for EngineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Read `engine=<key>` from a query string (leading `?` optional)
///
/// Unknown or absent values yield None.
pub fn engine_from_query(query: &str) -> Option<EngineKey> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == ENGINE_QUERY_PARAM)
        .and_then(|(_, value)| value.parse().ok())
}

/// One dropdown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineOption {
    pub key: EngineKey,
    /// Label, suffixed with " (url not set)" when unconfigured
    pub label: String,
    pub configured: bool,
}

/// Rendered outbound link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineLink {
    pub href: String,
    pub label: String,
    pub title: String,
}

impl EngineLink {
    /// Whether following the link leaves `page_url`'s origin
    pub fn is_external(&self, page_url: &str) -> bool {
        is_external_href(&self.href, page_url)
    }

    /// Prompt to confirm before following the link, if any
    pub fn leave_prompt(&self, page_url: &str, guard_enabled: bool) -> Option<&'static str> {
        (guard_enabled && self.is_external(page_url)).then_some(LEAVING_SITE_PROMPT)
    }
}

/// Resolve `href` against `page_url` and compare origins
///
/// Empty hrefs, `#fragment` links and anything that does not parse count as
/// same-site.
pub fn is_external_href(href: &str, page_url: &str) -> bool {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return false;
    }

    let page = match Url::parse(page_url) {
        Ok(page) => page,
        Err(e) => {
            debug!(page = %page_url, "Unparsable page URL: {}", e);
            return false;
        }
    };

    match page.join(href) {
        Ok(dest) => dest.origin() != page.origin(),
        Err(e) => {
            debug!(href = %href, "Unparsable link: {}", e);
            false
        }
    }
}

/// Selection state for the engine dropdown
#[derive(Debug, Clone)]
pub struct EngineRouter {
    ctx: DoorwayContext,
    urls: EngineUrls,
    forced: Option<EngineKey>,
    selection: EngineKey,
}

impl EngineRouter {
    /// `query` is the page's query string, if any
    pub fn new(ctx: DoorwayContext, urls: EngineUrls, query: Option<&str>) -> Self {
        let forced = query.and_then(engine_from_query);
        let selection = forced.unwrap_or(EngineKey::DEFAULT);

        info!(
            forced = ?forced,
            orion = urls_configured(&urls, EngineKey::Orion),
            gpt4o = urls_configured(&urls, EngineKey::Gpt4o),
            gpt5 = urls_configured(&urls, EngineKey::Gpt5),
            "Engine router mounted"
        );

        Self {
            ctx,
            urls,
            forced,
            selection,
        }
    }

    /// Engine named by the query string, if it was a known one
    pub fn forced(&self) -> Option<EngineKey> {
        self.forced
    }

    pub fn selection(&self) -> EngineKey {
        self.selection
    }

    /// Configured URL for one engine (blank counts as unset)
    pub fn url_for(&self, key: EngineKey) -> Option<&str> {
        let url = match key {
            EngineKey::Orion => Some(self.urls.orion.as_str()),
            EngineKey::Gpt4o => self.urls.gpt4o.as_deref(),
            EngineKey::Gpt5 => self.urls.gpt5.as_deref(),
        };
        url.map(str::trim).filter(|u| !u.is_empty())
    }

    /// Target URL for `key`, always resolvable
    pub fn resolve(&self, key: EngineKey) -> String {
        self.url_for(key)
            .or_else(|| self.url_for(EngineKey::DEFAULT))
            .or_else(|| {
                EngineKey::FALLBACK_ORDER
                    .into_iter()
                    .find_map(|k| self.url_for(k))
            })
            .unwrap_or(DEFAULT_ORION_URL)
            .to_string()
    }

    /// Target URL for the current selection
    pub fn target_url(&self) -> String {
        self.resolve(self.selection)
    }

    /// Dropdown change; resolves synchronously
    pub fn select(&mut self, key: EngineKey) -> String {
        self.selection = key;
        let url = self.target_url();
        debug!(engine = %key, url = %url, "Engine selected");

        self.ctx.emit(JourneyEvent::EngineSelected {
            engine: key.key().to_string(),
            url: url.clone(),
            timestamp: Utc::now(),
        });
        url
    }

    pub fn options(&self) -> Vec<EngineOption> {
        EngineKey::ALL
            .into_iter()
            .map(|key| {
                let configured = self.url_for(key).is_some();
                let label = if configured {
                    key.label().to_string()
                } else {
                    format!("{} (url not set)", key.label())
                };
                EngineOption {
                    key,
                    label,
                    configured,
                }
            })
            .collect()
    }

    pub fn link(&self) -> EngineLink {
        let href = self.target_url();
        EngineLink {
            title: href.clone(),
            href,
            label: LINK_LABEL.to_string(),
        }
    }
}

fn urls_configured(urls: &EngineUrls, key: EngineKey) -> bool {
    let url = match key {
        EngineKey::Orion => Some(urls.orion.as_str()),
        EngineKey::Gpt4o => urls.gpt4o.as_deref(),
        EngineKey::Gpt5 => urls.gpt5.as_deref(),
    };
    url.is_some_and(|u| !u.trim().is_empty())
}
