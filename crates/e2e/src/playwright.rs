//! Playwright browser automation
//!
//! Every query runs as its own short Node script: launch the browser, open
//! `base_url + path`, evaluate one expression and print a single JSON reply on
//! stdout. Nothing is kept alive between queries, so a session is just the
//! configuration plus the record of screenshots it has taken.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use uiverify_common::element::{ElementRef, Inspector, Property, PropertyValue};
use uiverify_common::runner::Screenshot;
use uiverify_common::BoxError;

use crate::error::{E2eError, E2eResult};
use crate::runner::{PageSession, SessionProvider};
use crate::spec::CheckSpec;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl FromStr for Browser {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" | "safari" => Ok(Browser::Webkit),
            other => Err(E2eError::Playwright(format!("unknown browser: {}", other))),
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub base_url: String,
    pub browser: Browser,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub headless: bool,
    /// Per-action timeout applied inside the browser
    pub timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            browser: Browser::Chromium,
            viewport_width: 1280,
            viewport_height: 720,
            headless: true,
            timeout_ms: 5000,
        }
    }
}

/// A screenshot taken while reporting a failed or errored condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedScreenshot {
    pub test: String,
    pub label: String,
    pub path: PathBuf,
    pub sha256: String,
}

/// Check if Playwright is installed
pub fn check_playwright_installed() -> E2eResult<()> {
    let output = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match output {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// Reply printed by every generated script
#[derive(Debug, Deserialize)]
struct ScriptReply {
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
}

/// Browser session for one test: inspects elements and captures screenshots
///
/// Cloning is cheap and clones share the screenshot record.
#[derive(Debug, Clone)]
pub struct PlaywrightSession {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    config: PlaywrightConfig,
    path: String,
    test_name: String,
    screenshot_dir: PathBuf,
    sequence: AtomicUsize,
    captures: Mutex<Vec<CapturedScreenshot>>,
}

impl PlaywrightSession {
    pub fn new(
        config: PlaywrightConfig,
        path: impl Into<String>,
        test_name: impl Into<String>,
        screenshot_dir: impl Into<PathBuf>,
    ) -> E2eResult<Self> {
        let screenshot_dir = screenshot_dir.into();
        std::fs::create_dir_all(&screenshot_dir)?;
        Ok(Self {
            inner: Arc::new(SessionInner {
                config,
                path: path.into(),
                test_name: test_name.into(),
                screenshot_dir,
                sequence: AtomicUsize::new(0),
                captures: Mutex::new(Vec::new()),
            }),
        })
    }

    pub fn test_name(&self) -> &str {
        &self.inner.test_name
    }

    pub fn url(&self) -> String {
        format!(
            "{}{}",
            self.inner.config.base_url.trim_end_matches('/'),
            self.inner.path
        )
    }

    /// Screenshots taken so far, in capture order.
    pub fn captures(&self) -> Vec<CapturedScreenshot> {
        self.inner.captures.lock().clone()
    }

    /// File name for the next diagnostic screenshot: `<test>-<seq>-<slug>.png`.
    pub fn next_screenshot_path(&self, label: &str) -> PathBuf {
        let seq = self.inner.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.screenshot_dir.join(format!(
            "{}-{:03}-{}.png",
            slugify(&self.inner.test_name),
            seq,
            slugify(label)
        ))
    }

    /// Capture the page for a failed condition and record it.
    pub fn capture_labeled(&self, label: &str) -> E2eResult<CapturedScreenshot> {
        let path = self.next_screenshot_path(label);
        self.save_page(&path)?;
        let captured = CapturedScreenshot {
            test: self.inner.test_name.clone(),
            label: label.to_string(),
            sha256: hash_file(&path)?,
            path,
        };
        info!(
            test = %captured.test,
            path = %captured.path.display(),
            "captured diagnostic screenshot"
        );
        self.inner.captures.lock().push(captured.clone());
        Ok(captured)
    }

    /// Write a full-page screenshot to `path`.
    pub fn save_page(&self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = format!(
            "await page.screenshot({{ path: {}, fullPage: true }});\n    const result = null;",
            js_string(&path.to_string_lossy())
        );
        self.run_query(&body).map(|_| ())
    }

    /// Build the Node script for one query.
    pub fn build_script(&self, body: &str) -> String {
        let config = &self.inner.config;
        format!(
            r#"
const {{ chromium, firefox, webkit }} = require('playwright');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  page.setDefaultTimeout({timeout});

  try {{
    await page.goto({url});
    {body}
    console.log(JSON.stringify({{ ok: true, value: result }}));
  }} catch (error) {{
    console.log(JSON.stringify({{ ok: false, error: error.message }}));
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
            browser = config.browser.as_str(),
            headless = config.headless,
            width = config.viewport_width,
            height = config.viewport_height,
            timeout = config.timeout_ms,
            url = js_string(&self.url()),
            body = body,
        )
    }

    fn run_query(&self, body: &str) -> E2eResult<serde_json::Value> {
        let script = self.build_script(body);
        run_script(&script)
    }
}

/// JavaScript for reading `property` from every instance matched by `selector`.
pub fn property_query(selector: &str, property: &Property) -> String {
    let read = match property {
        Property::Text => "el.innerText()".to_string(),
        Property::Attribute(name) => format!("el.getAttribute({})", js_string(name)),
        Property::Value => "el.inputValue()".to_string(),
        Property::Enabled => "el.isEnabled()".to_string(),
        Property::Selected => "el.isChecked()".to_string(),
        Property::Visible => "el.isVisible()".to_string(),
    };
    format!(
        "const loc = page.locator({selector});
    const n = await loc.count();
    const result = [];
    for (let i = 0; i < n; i++) {{
      const el = loc.nth(i);
      result.push(await {read});
    }}",
        selector = js_string(selector),
        read = read,
    )
}

pub fn count_query(selector: &str) -> String {
    format!(
        "const result = await page.locator({}).count();",
        js_string(selector)
    )
}

/// Execute a generated script with `node` and decode its reply.
pub fn run_script(script: &str) -> E2eResult<serde_json::Value> {
    let temp_dir = tempfile::tempdir()?;
    let script_path = temp_dir.path().join("query.js");
    std::fs::write(&script_path, script)?;

    debug!("Running Playwright script: {}", script_path.display());

    let output = Command::new("node")
        .arg(&script_path)
        .current_dir(temp_dir.path())
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    match parse_reply(&stdout) {
        Some(reply) if reply.ok => Ok(reply.value),
        Some(reply) => Err(E2eError::Playwright(
            reply.error.unwrap_or_else(|| "script failed".to_string()),
        )),
        None => Err(E2eError::Playwright(format!(
            "Script produced no reply:\nstdout: {}\nstderr: {}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        ))),
    }
}

fn parse_reply(stdout: &str) -> Option<ScriptReply> {
    stdout
        .lines()
        .rev()
        .find_map(|line| serde_json::from_str::<ScriptReply>(line.trim()).ok())
}

impl Inspector for PlaywrightSession {
    fn count(&self, element: &ElementRef) -> Result<usize, BoxError> {
        let value = self.run_query(&count_query(&element.selector))?;
        let count: usize = serde_json::from_value(value)?;
        debug!(selector = %element.selector, count, "counted elements");
        Ok(count)
    }

    fn inspect(&self, element: &ElementRef, property: &Property) -> Result<Vec<PropertyValue>, BoxError> {
        let value = self.run_query(&property_query(&element.selector, property))?;
        Ok(serde_json::from_value(value)?)
    }
}

impl Screenshot for PlaywrightSession {
    fn capture(&mut self, label: &str) -> Result<(), BoxError> {
        self.capture_labeled(label)?;
        Ok(())
    }
}

impl PageSession for PlaywrightSession {
    fn capture_diagnostic(&self, label: &str) -> Result<(), BoxError> {
        self.capture_labeled(label)?;
        Ok(())
    }

    fn write_page(&self, path: &Path) -> Result<(), BoxError> {
        Ok(self.save_page(path)?)
    }

    fn screenshots(&self) -> Vec<CapturedScreenshot> {
        self.captures()
    }
}

/// Opens one [`PlaywrightSession`] per spec attempt
#[derive(Debug, Clone)]
pub struct PlaywrightProvider {
    config: PlaywrightConfig,
    screenshot_dir: PathBuf,
}

impl PlaywrightProvider {
    /// Fails with `PlaywrightNotFound` when `npx playwright` is unavailable.
    pub fn new(config: PlaywrightConfig, screenshot_dir: impl Into<PathBuf>) -> E2eResult<Self> {
        check_playwright_installed()?;
        Ok(Self {
            config,
            screenshot_dir: screenshot_dir.into(),
        })
    }
}

impl SessionProvider for PlaywrightProvider {
    type Session = PlaywrightSession;

    fn open(&self, spec: &CheckSpec) -> E2eResult<PlaywrightSession> {
        PlaywrightSession::new(
            self.config.clone(),
            spec.path.clone(),
            spec.test_name(),
            self.screenshot_dir.clone(),
        )
    }
}

/// JSON string literals are valid JavaScript string literals.
fn js_string(raw: &str) -> String {
    serde_json::Value::String(raw.to_string()).to_string()
}

/// Lowercase alphanumerics, everything else collapsed to single dashes.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "screenshot".to_string()
    } else {
        slug.chars().take(60).collect()
    }
}

/// Hash a file using SHA256
pub fn hash_file(path: &Path) -> E2eResult<String> {
    let data = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}
