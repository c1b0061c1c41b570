use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::{
    CallArgument, CallFunctionOnParams, EvaluateParams, ExceptionDetails, RemoteObject,
    RemoteObjectId, RemoteObjectSubtype,
};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::app::{EddyError, Result};
use crate::session::config::BrowserSettings;
use crate::session::{NodeHandle, Session};

/// Chrome-backed session using chromiumoxide: one browser, one page.
///
/// The caller owns the session for the whole batch of posts and closes it
/// with [`ChromeSession::close`]; the extraction engine never does.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    /// Launch Chrome with the given settings and open a blank page
    pub async fn launch(settings: &BrowserSettings) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .window_size(settings.window_width, settings.window_height)
            .request_timeout(settings.request_timeout());

        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(ref dir) = settings.user_data_dir {
            builder = builder.user_data_dir(dir);
        }
        for arg in &settings.extra_args {
            builder = builder.arg(arg.as_str());
        }

        let browser_config = builder
            .build()
            .map_err(|e| EddyError::Session(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            EddyError::Session(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        // Drive the CDP connection
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| EddyError::Session(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = settings.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| EddyError::Session(format!("Failed to set user agent: {}", e)))?;
        }

        info!(headless = settings.headless, "Chrome session started");

        Ok(Self {
            browser,
            page,
            handler,
        })
    }

    /// Shut the browser down
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| EddyError::Session(format!("Failed to close browser: {}", e)))?;
        let _ = self.browser.wait().await;
        self.handler.abort();
        info!("Chrome session closed");
        Ok(())
    }

    async fn call(&self, script: &str, args: &[NodeHandle], by_value: bool) -> Result<RemoteObject> {
        let Some(first) = args.first() else {
            let params = EvaluateParams::builder()
                .expression(format!("({})()", script))
                .return_by_value(by_value)
                .await_promise(true)
                .build()
                .map_err(EddyError::Session)?;
            let response = self.page.execute(params).await.map_err(classify_cdp_error)?;
            check_exception(response.result.exception_details.as_ref())?;
            return Ok(response.result.result.clone());
        };

        let arguments: Vec<CallArgument> = args
            .iter()
            .map(|node| {
                CallArgument::builder()
                    .object_id(RemoteObjectId::new(node.id()))
                    .build()
            })
            .collect();

        let params = CallFunctionOnParams::builder()
            .function_declaration(script)
            .object_id(RemoteObjectId::new(first.id()))
            .arguments(arguments)
            .return_by_value(by_value)
            .await_promise(true)
            .build()
            .map_err(EddyError::Session)?;
        let response = self.page.execute(params).await.map_err(classify_cdp_error)?;
        check_exception(response.result.exception_details.as_ref())?;
        Ok(response.result.result.clone())
    }
}

/// Invalidated object ids surface as CDP errors mentioning the missing object.
fn classify_cdp_error(e: chromiumoxide::error::CdpError) -> EddyError {
    if matches!(e, chromiumoxide::error::CdpError::Timeout) {
        return EddyError::Timeout("CDP request timed out".into());
    }
    let message = e.to_string();
    if message.contains("Could not find object")
        || message.contains("No node with given id")
        || message.contains("Cannot find context")
    {
        EddyError::StaleNode(message)
    } else {
        EddyError::Session(message)
    }
}

fn check_exception(details: Option<&ExceptionDetails>) -> Result<()> {
    match details {
        None => Ok(()),
        Some(details) => {
            let description = details
                .exception
                .as_ref()
                .and_then(|ex| ex.description.clone())
                .unwrap_or_else(|| details.text.clone());
            Err(EddyError::Script(description))
        }
    }
}

#[async_trait]
impl Session for ChromeSession {
    async fn navigate(&self, target: &str) -> Result<()> {
        self.page
            .goto(target)
            .await
            .map_err(|e| EddyError::Session(format!("Navigation to {} failed: {}", target, e)))?;
        Ok(())
    }

    async fn current_location(&self) -> Result<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| EddyError::Session(format!("Failed to read page URL: {}", e)))?;
        Ok(url.unwrap_or_default())
    }

    async fn find_nodes(&self, selector: &str) -> Result<Vec<NodeHandle>> {
        let elements = self.page.find_elements(selector).await.map_err(classify_cdp_error)?;
        Ok(elements
            .iter()
            .map(|el| NodeHandle::new(el.remote_object_id.inner().clone()))
            .collect())
    }

    async fn evaluate_script(&self, script: &str, args: &[NodeHandle]) -> Result<serde_json::Value> {
        let object = self.call(script, args, true).await?;
        Ok(object.value.unwrap_or(serde_json::Value::Null))
    }

    async fn evaluate_for_node(&self, script: &str, args: &[NodeHandle]) -> Result<Option<NodeHandle>> {
        let object = self.call(script, args, false).await?;
        let is_node = matches!(object.subtype, Some(RemoteObjectSubtype::Node));
        Ok(match (is_node, object.object_id) {
            (true, Some(id)) => Some(NodeHandle::new(id.inner().clone())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromiumoxide::error::CdpError;

    #[test]
    fn test_request_timeout_is_recoverable() {
        let err = classify_cdp_error(CdpError::Timeout);
        assert!(matches!(err, EddyError::Timeout(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_lost_context_is_stale() {
        let err = classify_cdp_error(CdpError::ChromeMessage(
            "Cannot find context with specified id".into(),
        ));
        assert!(matches!(err, EddyError::StaleNode(_)));
    }

    #[test]
    fn test_other_failures_end_the_session() {
        let err = classify_cdp_error(CdpError::ChromeMessage("Target closed".into()));
        assert!(matches!(err, EddyError::Session(_)));
    }
}
