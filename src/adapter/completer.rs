//! Async argument-completion adapter
//!
//! A completer produces candidates as a lazy async stream that may be slow
//! or endless. [`CompletionAdapter`] turns it into the finite list a host
//! wants back from a synchronous call: it pulls candidates one at a time
//! until the stream ends, the time box expires or the user interrupts, and
//! returns everything collected so far, in production order.

use std::time::Duration;

use futures::StreamExt;
use futures::stream::{self, LocalBoxStream};
use tracing::debug;

use crate::completion::{BoundParameters, CompletionRequest, CompletionResult, SyntaxNode};
use crate::config::CompletionConfig;
use crate::error::Result;
use crate::executor::{CancellationSignal, SingleThreadExecutor};

/// Time box used when neither the completer nor the configuration set one.
pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_millis(1000);

/// Source of completion candidates.
pub trait AsyncCompleter {
    /// Time box for one completion request. `None` defers to configuration.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Candidates for `request`, produced lazily.
    ///
    /// The stream is polled on the host's calling thread. Yielding
    /// [`ShellextError::Cancelled`] or [`ShellextError::StaleResource`] ends
    /// the sequence quietly; any other error fails the completion call.
    ///
    /// [`ShellextError::Cancelled`]: crate::error::ShellextError::Cancelled
    /// [`ShellextError::StaleResource`]: crate::error::ShellextError::StaleResource
    fn candidates<'a>(
        &'a self,
        request: &'a CompletionRequest<'_>,
        cancel: &'a CancellationSignal,
    ) -> LocalBoxStream<'a, Result<CompletionResult>>;
}

/// Synchronous completion entry point over an [`AsyncCompleter`].
///
/// Ctrl+C cancellation is opt-in through
/// [`CompletionConfig::listen_for_interrupt`]. Turning it on hands SIGINT to
/// a process-wide handler for the rest of the process lifetime.
pub struct CompletionAdapter<C> {
    completer: C,
    config: CompletionConfig,
}

impl<C: AsyncCompleter> CompletionAdapter<C> {
    pub fn new(completer: C) -> Self {
        Self::with_config(completer, CompletionConfig::default())
    }

    pub fn with_config(completer: C, config: CompletionConfig) -> Self {
        Self { completer, config }
    }

    /// Effective time box for a request.
    pub fn timeout(&self) -> Duration {
        self.completer.timeout().unwrap_or_else(|| self.config.timeout())
    }

    pub fn completer(&self) -> &C {
        &self.completer
    }

    /// Complete `word_to_complete` for `parameter_name` of `command_name`.
    ///
    /// Blocks the calling thread for at most roughly the time box, plus
    /// however long the in-flight candidate takes to notice cancellation.
    pub fn complete_argument(
        &self,
        command_name: &str,
        parameter_name: &str,
        word_to_complete: &str,
        command_ast: &dyn SyntaxNode,
        bound_parameters: &BoundParameters,
    ) -> Result<Vec<CompletionResult>> {
        let request = CompletionRequest::new(
            command_name,
            parameter_name,
            word_to_complete,
            command_ast,
            bound_parameters,
        );
        let timeout = self.timeout();
        let signal = CancellationSignal::builder()
            .timeout(timeout)
            .interrupt(self.config.listen_for_interrupt)
            .build();

        debug!(%request, ?timeout, "completion requested");

        let candidates = self.completer.candidates(&request, &signal);
        let results =
            SingleThreadExecutor::new().run_blocking(collect_candidates(candidates, &signal))?;

        debug!(
            count = results.len(),
            timed_out = signal.is_cancelled(),
            "completion finished"
        );
        Ok(results)
    }
}

async fn collect_candidates(
    mut candidates: LocalBoxStream<'_, Result<CompletionResult>>,
    signal: &CancellationSignal,
) -> Result<Vec<CompletionResult>> {
    let mut results = Vec::new();

    loop {
        if signal.is_cancelled() {
            break;
        }

        // A candidate that resolves after the signal fired is dropped
        let next = tokio::select! {
            biased;
            _ = signal.cancelled() => break,
            next = candidates.next() => next,
        };

        match next {
            Some(Ok(result)) => results.push(result),
            None => break,
            Some(Err(e)) if e.is_cancelled() => break,
            Some(Err(e)) if e.is_stale_resource() => {
                debug!("candidate source released: {e}");
                break;
            }
            Some(Err(e)) => return Err(e),
        }
    }

    Ok(results)
}

/// Completer over a fixed word list.
///
/// Matches words against the request's prefix pattern and re-quotes them in
/// the request's quotation style. An optional delay between candidates
/// imitates a slow backend.
#[derive(Debug, Clone, Default)]
pub struct WordListCompleter {
    words: Vec<String>,
    delay: Option<Duration>,
    timeout: Option<Duration>,
}

impl WordListCompleter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            delay: None,
            timeout: None,
        }
    }

    /// Wait `delay` before producing each candidate.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Override the time box.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl AsyncCompleter for WordListCompleter {
    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn candidates<'a>(
        &'a self,
        request: &'a CompletionRequest<'_>,
        _cancel: &'a CancellationSignal,
    ) -> LocalBoxStream<'a, Result<CompletionResult>> {
        let delay = self.delay;
        stream::iter(self.words.iter().filter(move |word| request.matches(word)))
            .then(move |word| async move {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(CompletionResult::from_value(request.quotation(), word))
            })
            .boxed_local()
    }
}
