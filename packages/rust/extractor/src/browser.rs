//! Headless Chrome rendering for client-side rendered sites.
//!
//! `headless_chrome` is a blocking API, so every call runs inside
//! [`tokio::task::spawn_blocking`].

use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions};
use tracing::{debug, instrument, warn};

use leadscout_shared::{LeadScoutError, Result};

/// Settings for a single browser render.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub user_agent: String,
    pub navigation_timeout: Duration,
    pub settle: Duration,
}

/// Render `url` in a fresh headless browser and return the page HTML.
///
/// A navigation timeout is not fatal: whatever has loaded by then is returned.
#[instrument(skip(options))]
pub async fn render(url: &str, options: &BrowserOptions) -> Result<String> {
    let url = url.to_string();
    let options = options.clone();

    tokio::task::spawn_blocking(move || render_blocking(&url, &options))
        .await
        .map_err(|e| LeadScoutError::Browser(format!("browser task failed: {e}")))?
}

fn render_blocking(url: &str, options: &BrowserOptions) -> Result<String> {
    let launch = LaunchOptions::default_builder()
        .headless(true)
        .idle_browser_timeout(options.navigation_timeout + options.settle + Duration::from_secs(30))
        .build()
        .map_err(|e| LeadScoutError::Browser(format!("failed to build Chrome launch options: {e}")))?;

    let browser = Browser::new(launch)
        .map_err(|e| LeadScoutError::Browser(format!("failed to launch headless Chrome: {e}")))?;

    let tab = browser
        .new_tab()
        .map_err(|e| LeadScoutError::Browser(format!("failed to create browser tab: {e}")))?;

    tab.set_default_timeout(options.navigation_timeout);
    tab.set_user_agent(&options.user_agent, None, None)
        .map_err(|e| LeadScoutError::Browser(format!("failed to set user agent: {e}")))?;

    tab.navigate_to(url)
        .map_err(|e| LeadScoutError::Browser(format!("failed to navigate to {url}: {e}")))?;

    let navigated = match tab.wait_until_navigated() {
        Ok(_) => true,
        Err(e) => {
            warn!(%url, error = %e, "navigation did not finish, using partial content");
            false
        }
    };

    let settle = settle_delay(navigated, options.settle);
    if !settle.is_zero() {
        std::thread::sleep(settle);
    }

    let html = tab
        .get_content()
        .map_err(|e| LeadScoutError::Browser(format!("failed to get page content for {url}: {e}")))?;

    debug!(html_len = html.len(), navigated, "browser render complete");
    Ok(html)
}

/// Client-side frameworks keep rendering after the load event, so a finished
/// navigation waits `settle` first. A timed-out one is read immediately.
fn settle_delay(navigated: bool, settle: Duration) -> Duration {
    if navigated { settle } else { Duration::ZERO }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_only_after_navigation() {
        let settle = Duration::from_secs(15);
        assert_eq!(settle_delay(true, settle), settle);
        assert_eq!(settle_delay(false, settle), Duration::ZERO);
    }
}
