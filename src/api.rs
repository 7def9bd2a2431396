//! LLM API interaction with exponential backoff retry logic.
//!
//! The analysis request goes to an OpenAI-compatible endpoint through
//! `awful_aj`. The model endpoint, key and model name come from an awful_aj
//! `config.yaml`; the chat template (system prompt) is loaded by name from
//! awful_aj's template directory.
//!
//! [`LlmBackend`] holds what was loaded at startup and hands out a
//! [`RetryAsk`] around an [`AskFnWrapper`]. With the default settings a
//! request is retried five times, waiting 1 s, 2 s, 4 s and so on (capped
//! at 30 s) plus a little jitter between attempts.

use crate::settings::AiSettings;
use awful_aj::api::ask;
use awful_aj::{config, config::AwfulJadeConfig, config_dir, template, template::ChatTemplate};
use rand::{Rng, rng};
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// One prompt in, one model reply out.
///
/// [`AskFnWrapper`] talks to the real endpoint; [`RetryAsk`] wraps any other
/// implementor, and the analysis tests use canned ones.
pub trait AskAsync {
    type Response;

    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Retries a failing [`AskAsync`] with doubling delays.
///
/// After failure `n` it sleeps `min(base_delay * 2^(n-1), max_delay)` plus up
/// to 250 ms of jitter. The request is made at most `max_retries + 1` times.
pub struct RetryAsk<T> {
    inner: T,
    max_retries: usize,
    base_delay: StdDuration,
    max_delay: StdDuration,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    /// The delay cap is fixed at 30 seconds.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(31) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let started = Instant::now();
        let mut failures = 0usize;

        loop {
            let err = match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };
            failures += 1;
            let elapsed_ms = started.elapsed().as_millis();

            if failures > self.max_retries {
                error!(failures, elapsed_ms, error = %err, "Model request failed; giving up");
                return Err(err);
            }

            let delay = self.backoff(failures);
            warn!(
                failures,
                max_retries = self.max_retries,
                elapsed_ms,
                ?delay,
                error = %err,
                "Model request failed; retrying"
            );
            sleep(delay).await;
        }
    }
}

/// Single, unretried call through `awful_aj`.
#[derive(Debug)]
pub struct AskFnWrapper<'a> {
    pub config: &'a AwfulJadeConfig,
    /// Supplies the system prompt.
    pub template: &'a ChatTemplate,
}

impl<'a> AskAsync for AskFnWrapper<'a> {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(prompt_bytes = text.len()))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let res = ask(self.config, text.to_string(), self.template, None, None).await;
        let dt = t0.elapsed();

        match &res {
            Ok(reply) => info!(elapsed_ms = dt.as_millis(), reply_bytes = reply.len(), "Model replied"),
            Err(e) => warn!(elapsed_ms = dt.as_millis(), error = %e, "Model call errored"),
        }
        res
    }
}

/// Model config and chat template, loaded once at startup.
///
/// A successful load is what makes the analysis capability available.
#[derive(Debug)]
pub struct LlmBackend {
    config: AwfulJadeConfig,
    template: ChatTemplate,
}

impl LlmBackend {
    /// Load the awful_aj config file and the named chat template.
    #[instrument(level = "info", skip_all, fields(template = %ai.template))]
    pub async fn load(ai: &AiSettings) -> Result<Self, Box<dyn Error>> {
        let config_path = match &ai.llm_config {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };
        let config_path = config_path
            .to_str()
            .ok_or("LLM config path is not valid UTF-8")?
            .to_string();

        let config = config::load_config(&config_path)
            .map_err(|e| format!("failed to load LLM config {}: {}", config_path, e))?;
        info!(config_path = %config_path, "Loaded LLM configuration");

        let template = template::load_template(ai.template.as_str())
            .await
            .map_err(|e| format!("failed to load template {}: {}", ai.template, e))?;
        info!("Loaded chat template");

        Ok(Self { config, template })
    }

    /// A retrying client borrowing this backend.
    pub fn asker(&self, max_retries: usize) -> RetryAsk<AskFnWrapper<'_>> {
        let client = AskFnWrapper {
            config: &self.config,
            template: &self.template,
        };
        RetryAsk::new(client, max_retries, StdDuration::from_secs(1))
    }
}

fn default_config_path() -> Result<PathBuf, Box<dyn Error>> {
    let dir = config_dir().map_err(|e| format!("no awful_aj config directory: {}", e))?;
    Ok(dir.join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Flaky {
        failures_left: Cell<usize>,
        calls: Cell<usize>,
    }

    impl Flaky {
        fn new(failures: usize) -> Self {
            Self {
                failures_left: Cell::new(failures),
                calls: Cell::new(0),
            }
        }
    }

    impl AskAsync for Flaky {
        type Response = String;

        async fn ask(&self, text: &str) -> Result<String, Box<dyn Error>> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err("temporary failure".into());
            }
            Ok(format!("echo: {}", text))
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_after_failures() {
        let api = RetryAsk::new(Flaky::new(2), 5, StdDuration::from_millis(1));
        let reply = api.ask("salut").await.unwrap();
        assert_eq!(reply, "echo: salut");
        assert_eq!(api.inner.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up() {
        let api = RetryAsk::new(Flaky::new(10), 2, StdDuration::from_millis(1));
        let err = api.ask("salut").await.unwrap_err();
        assert_eq!(err.to_string(), "temporary failure");
        assert_eq!(api.inner.calls.get(), 3);
    }

    #[test]
    fn test_backoff_is_capped() {
        let api = RetryAsk::new(Flaky::new(0), 5, StdDuration::from_secs(1));
        assert!(api.backoff(1) >= StdDuration::from_secs(1));
        assert!(api.backoff(1) <= StdDuration::from_millis(1250));
        assert!(api.backoff(3) >= StdDuration::from_secs(4));
        assert!(api.backoff(40) <= StdDuration::from_millis(30_250));
    }

    #[test]
    fn test_debug_hides_inner() {
        let api = RetryAsk::new(Flaky::new(0), 5, StdDuration::from_secs(1));
        let dbg = format!("{:?}", api);
        assert!(dbg.contains("max_retries: 5"));
        assert!(!dbg.contains("failures_left"));
    }
}
