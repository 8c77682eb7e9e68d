//! Markup for the channel grid, the error panel and the player placeholder.
//!
//! Everything that comes from the data file goes through [`escape_html`]
//! before it is written into the page.

use std::fmt::Write;
use std::sync::Arc;

use crate::api::{Category, Channel};
use crate::store::ChannelStore;

pub const DESCRIPTION_PREVIEW_CHARS: usize = 60;
pub const DEFAULT_PLACEHOLDER_BASE: &str = "https://via.placeholder.com/120/1a1f2e/8a94b3";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Percent-encode everything outside the unreserved set, like JS
/// `encodeURIComponent`.
pub fn encode_uri_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// `12345` -> `12,345`
pub fn format_thousands(n: u32) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Initials used by the fallback logo: first three characters, upper-cased.
pub fn logo_initials(name: &str) -> String {
    truncate_chars(name, 3).to_uppercase()
}

/// What the grid ended up showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGrid {
    pub html: String,
    pub no_results: bool,
    /// Channel ids behind each watch control, in card order
    pub watch_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeroStats {
    pub total: usize,
    pub live: usize,
}

impl HeroStats {
    pub fn from_store(store: &ChannelStore) -> Self {
        Self {
            total: store.len(),
            live: store.live_count(),
        }
    }
}

/// `(value, label)` pairs for the category selector, after its "all" entry.
pub fn category_options() -> Vec<(String, String)> {
    Category::all()
        .iter()
        .map(|c| (c.as_str().to_string(), c.display_name().to_string()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct CardRenderer {
    pub placeholder_base: String,
}

impl Default for CardRenderer {
    fn default() -> Self {
        Self {
            placeholder_base: DEFAULT_PLACEHOLDER_BASE.to_string(),
        }
    }
}

impl CardRenderer {
    pub fn new(placeholder_base: impl Into<String>) -> Self {
        Self {
            placeholder_base: placeholder_base.into(),
        }
    }

    pub fn placeholder_logo_url(&self, name: &str) -> String {
        format!(
            "{}?text={}",
            self.placeholder_base,
            encode_uri_component(&logo_initials(name))
        )
    }

    pub fn render(&self, channels: &[Arc<Channel>]) -> RenderedGrid {
        if channels.is_empty() {
            return RenderedGrid {
                html: no_results_html(),
                no_results: true,
                watch_ids: Vec::new(),
            };
        }

        let mut html = String::new();
        for channel in channels {
            html.push_str(&self.card_html(channel));
        }

        RenderedGrid {
            html,
            no_results: false,
            watch_ids: channels.iter().map(|c| c.id.clone()).collect(),
        }
    }

    pub fn card_html(&self, channel: &Channel) -> String {
        let live = channel.is_live();
        let (status_class, status_text) = if live {
            ("status-live", "Live Sekarang")
        } else {
            ("status-offline", "Offline")
        };
        let viewers = if live {
            format!(
                r#"<span class="viewer-count">👤 {}</span>"#,
                format_thousands(channel.status.viewers)
            )
        } else {
            String::new()
        };
        let watch_label = if live { "Tonton Live" } else { "Tonton" };

        let id = escape_html(&channel.id);
        let name = escape_html(&channel.name);
        // The fallback src sits inside a JS string inside an attribute.
        let fallback = escape_html(&self.placeholder_logo_url(&channel.name).replace('\'', "%27"));

        format!(
            r#"<article class="channel-card" data-id="{id}" data-category="{category}">
  <div class="channel-header">
    <div class="channel-category-badge">{category_name}</div>
    <div class="channel-quality">{quality}</div>
  </div>
  <div class="channel-logo-container">
    <img src="{logo}" alt="{name} Logo" class="channel-logo" loading="lazy" onerror="this.onerror=null;this.src='{fallback}'">
  </div>
  <div class="channel-info">
    <h3 class="channel-name">{name}</h3>
    <p class="channel-desc">{desc}...</p>
    <div class="channel-meta">
      <span class="meta-language">{language}</span>
      <span class="meta-type">{kind}</span>
    </div>
  </div>
  <div class="channel-footer">
    <div class="channel-status {status_class}">
      <span class="status-dot"></span>
      {status_text}
      {viewers}
    </div>
    <button class="btn btn-primary watch-btn" data-id="{id}">
      <span class="btn-icon">▶</span>
      {watch_label}
    </button>
  </div>
</article>
"#,
            category = escape_html(channel.category.as_str()),
            category_name = escape_html(channel.category.display_name()),
            quality = escape_html(&channel.quality),
            logo = escape_html(&channel.logo),
            desc = escape_html(truncate_chars(&channel.description, DESCRIPTION_PREVIEW_CHARS)),
            language = escape_html(&channel.language),
            kind = escape_html(&channel.channel_type),
        )
    }
}

pub fn no_results_html() -> String {
    r#"<div class="no-results">
  <div class="no-results-icon">🔍</div>
  <h3>Tiada channel dijumpai</h3>
  <p>Cuba tukar kata carian atau penapis.</p>
</div>
"#
    .to_string()
}

/// Panel that replaces the grid when the directory cannot be shown.
/// Its `#reloadBtn` reloads the page.
pub fn error_panel_html(message: &str) -> String {
    format!(
        r#"<div class="error-panel">
  <div class="error-icon">⚠️</div>
  <h3>Ralat berlaku</h3>
  <p>{}</p>
  <button id="reloadBtn" class="btn btn-primary">Muat Semula Halaman</button>
</div>
"#,
        escape_html(message)
    )
}

pub fn no_stream_placeholder_html() -> String {
    r#"<div class="no-stream">
  <div class="no-stream-icon">📺</div>
  <h4>Tiada stream tersedia</h4>
  <p>Stream untuk channel ini tidak tersedia buat masa ini.</p>
</div>
"#
    .to_string()
}
