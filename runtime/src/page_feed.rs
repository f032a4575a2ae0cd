//! `FeedDocument` over a live browser tab.
//!
//! Items are read from the serialized DOM with the same selectors the
//! highlight script uses, so the n-th parsed item is the n-th element the
//! script styles.

use async_trait::async_trait;
use dynjump::{parse_feed_html, FeedDocument, FeedSelectors, RawFeedItem, SearchError};

use crate::renderer::RenderContext;

/// Wraps a browser context as the engine's host document.
pub struct PageFeed {
    ctx: Box<dyn RenderContext>,
    selectors: FeedSelectors,
}

impl PageFeed {
    pub fn new(ctx: Box<dyn RenderContext>, selectors: FeedSelectors) -> Self {
        Self { ctx, selectors }
    }

    /// Give the browser context back, e.g. to close it.
    pub fn into_context(self) -> Box<dyn RenderContext> {
        self.ctx
    }

    async fn eval(&self, script: &str) -> dynjump::Result<serde_json::Value> {
        self.ctx
            .execute_js(script)
            .await
            .map_err(|e| SearchError::Host(format!("{e:#}")))
    }
}

#[async_trait]
impl FeedDocument for PageFeed {
    async fn feed_items(&self) -> dynjump::Result<Vec<RawFeedItem>> {
        let html = self
            .ctx
            .get_html()
            .await
            .map_err(|e| SearchError::Host(format!("{e:#}")))?;
        parse_feed_html(&html, &self.selectors)
    }

    async fn scroll_height(&self) -> dynjump::Result<i64> {
        let value = self.eval(SCROLL_HEIGHT_JS).await?;
        value
            .as_f64()
            .map(|h| h as i64)
            .ok_or_else(|| SearchError::Host(format!("unexpected scroll height: {value}")))
    }

    async fn scroll_to(&self, top: i64) -> dynjump::Result<()> {
        self.eval(&format!("window.scrollTo(0, {top})")).await?;
        Ok(())
    }

    async fn scroll_by(&self, delta: i64) -> dynjump::Result<()> {
        self.eval(&format!("window.scrollBy(0, {delta})")).await?;
        Ok(())
    }

    async fn highlight(&self, index: usize) -> dynjump::Result<()> {
        let value = self.eval(&highlight_script(&self.selectors.item, index)).await?;
        if value.as_bool() == Some(true) {
            Ok(())
        } else {
            Err(SearchError::Host(format!("feed item {index} is no longer rendered")))
        }
    }
}

const SCROLL_HEIGHT_JS: &str = "Math.max(\
    document.body ? document.body.scrollHeight : 0, \
    document.documentElement.scrollHeight)";

/// Script that marks the `index`-th feed item as found and centers it.
///
/// The card gets a glow and a "found" badge centred on its top edge, then
/// its background blinks every 350 ms for eleven ticks and settles on the tint.
pub fn highlight_script(item_selector: &str, index: usize) -> String {
    let selector = sanitize_js_string(item_selector);
    format!(
        r#"(() => {{
  const el = document.querySelectorAll('{selector}')[{index}];
  if (!el) return false;
  el.style.border = '4px solid #667eea';
  el.style.boxShadow = '0 0 40px rgba(102, 126, 234, 0.8)';
  el.style.transition = 'all 0.3s ease';
  el.style.backgroundColor = '{TINT}';
  el.style.position = 'relative';
  if (!document.getElementById('dynjump-bounce')) {{
    const style = document.createElement('style');
    style.id = 'dynjump-bounce';
    style.textContent = '@keyframes dynjump-bounce {{ ' +
      '0%, 100% {{ transform: translateX(-50%) translateY(0); }} ' +
      '50% {{ transform: translateX(-50%) translateY(-10px); }} }}';
    document.head.appendChild(style);
  }}
  if (!el.querySelector('.dynjump-found-badge')) {{
    const badge = document.createElement('div');
    badge.className = 'dynjump-found-badge';
    badge.textContent = '🎯 找到了!';
    badge.style.cssText = 'position: absolute; top: -18px; left: 50%; transform: translateX(-50%); ' +
      'background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; ' +
      'padding: 8px 20px; border-radius: 25px; font-size: 15px; font-weight: bold; z-index: 100; ' +
      'box-shadow: 0 6px 20px rgba(102, 126, 234, 0.5); animation: dynjump-bounce 0.6s ease;';
    el.insertBefore(badge, el.firstChild);
  }}
  setTimeout(() => el.scrollIntoView({{ behavior: 'smooth', block: 'center' }}), 400);
  let blinks = 0;
  const timer = setInterval(() => {{
    el.style.backgroundColor = blinks % 2 === 0 ? '{BLINK}' : '{TINT}';
    blinks++;
    if (blinks > {BLINKS}) {{ clearInterval(timer); el.style.backgroundColor = '{TINT}'; }}
  }}, {BLINK_INTERVAL_MS});
  return true;
}})()"#
    )
}

const TINT: &str = "#f0f4ff";
const BLINK: &str = "#fffacd";
const BLINKS: u32 = 10;
const BLINK_INTERVAL_MS: u64 = 350;

/// Escape a string for interpolation into a single-quoted JS literal.
fn sanitize_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for ch in s.chars() {
        match ch {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '"' => result.push_str("\\\""),
            '`' => result.push_str("\\`"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\0' => {}
            '<' => result.push_str("\\x3c"),
            '>' => result.push_str("\\x3e"),
            _ => result.push(ch),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_quotes_and_brackets() {
        assert_eq!(
            sanitize_js_string(r#"[class*="time"]"#),
            r#"[class*=\"time\"]"#
        );
        assert_eq!(sanitize_js_string("a'b"), "a\\'b");
        assert_eq!(sanitize_js_string("</script>"), "\\x3c/script\\x3e");
        assert_eq!(sanitize_js_string("x\0y"), "xy");
    }

    #[test]
    fn test_highlight_script_targets_index() {
        let script = highlight_script(".bili-dyn-item", 7);
        assert!(script.contains("document.querySelectorAll('.bili-dyn-item')[7]"));
        assert!(script.contains("找到了"));
        assert!(script.contains("block: 'center'"));
    }

    #[test]
    fn test_highlight_script_styles_found_card() {
        let script = highlight_script(".bili-dyn-item", 0);
        assert!(script.contains("el.style.border = '4px solid #667eea'"));
        assert!(script.contains("0 0 40px rgba(102, 126, 234, 0.8)"));
        assert!(script.contains("el.style.backgroundColor = '#f0f4ff'"));
        assert!(script.contains("'#fffacd' : '#f0f4ff'"));
        assert!(script.contains("blinks > 10"));
        assert!(script.contains("}, 350);"));
        assert!(script.contains("el.insertBefore(badge, el.firstChild)"));
        assert!(script.contains("left: 50%; transform: translateX(-50%)"));
        assert!(script.contains("@keyframes dynjump-bounce {"));
        assert!(!script.contains("{{"));
    }

    #[test]
    fn test_highlight_script_escapes_selector() {
        let script = highlight_script("div[data-x='1']", 0);
        assert!(script.contains(r"div[data-x=\'1\']"));
    }
}
