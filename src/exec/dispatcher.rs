//! Execution dispatcher: routes a request to its language branch and
//! normalizes every outcome into a single result shape.

use crate::error::parse_python_exception;
use crate::exec::config::PlaygroundConfig;
use crate::exec::html;
use crate::exec::javascript;
use crate::exec::session::SessionManager;

/// Substituted when an execution completes without producing any output.
pub(crate) const NO_OUTPUT_MESSAGE: &str = "Code executed successfully (no output)";

/// The language a request is declared as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Language {
    /// Evaluated in a fresh QuickJS context.
    JavaScript,
    /// Executed by the shared WASM Python interpreter.
    Python,
    /// Parsed and summarized, never executed.
    Html,
    /// Anything else; kept verbatim for diagnostics.
    Unknown(String),
}

impl Language {
    /// Parse a wire tag ("javascript", "python", "html"); unrecognized tags
    /// are preserved as [`Language::Unknown`].
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "javascript" | "js" => Language::JavaScript,
            "python" | "py" => Language::Python,
            "html" => Language::Html,
            _ => Language::Unknown(tag.to_string()),
        }
    }
}

/// One execution request; created fresh per run.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// The source text to run.
    pub source: String,
    /// The declared language.
    pub language: Language,
}

impl ExecutionRequest {
    /// Create a request.
    pub fn new(source: impl Into<String>, language: Language) -> Self {
        Self {
            source: source.into(),
            language,
        }
    }
}

/// Uniform result of one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Console-ready output text.
    pub output: String,
    /// True when the run failed (user exception, timeout, environment fault).
    pub is_error: bool,
}

impl ExecutionResult {
    /// A successful result with the given output.
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
        }
    }

    /// A failed result with the given message.
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: true,
        }
    }

    /// Check if the execution succeeded.
    pub fn is_success(&self) -> bool {
        !self.is_error
    }
}

/// The playground execution core.
///
/// Holds the configuration and the Python session manager; JavaScript and
/// HTML branches are stateless per run.
pub struct Playground {
    config: PlaygroundConfig,
    sessions: SessionManager,
}

impl Playground {
    /// Create a playground with the given configuration.
    pub fn new(config: PlaygroundConfig) -> Self {
        let sessions = SessionManager::new(config.clone());
        Self { config, sessions }
    }

    /// The Python session manager, exposed for lifecycle observation.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Execute one request.
    ///
    /// Never returns an error: every failure is folded into the result with
    /// `is_error` set and a readable message.
    pub async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        match request.language {
            Language::JavaScript => self.run_javascript(request.source).await,
            Language::Python => self.run_python(&request.source).await,
            Language::Html => html::preview(&request.source),
            // Deliberately a soft success, matching the permissive UI contract
            Language::Unknown(_) => ExecutionResult::success("Language not supported yet"),
        }
    }

    async fn run_javascript(&self, source: String) -> ExecutionResult {
        let timeout = self.config.timeout;
        let memory_limit = self.config.max_memory_usize();

        // The QuickJS runtime is synchronous and not Send; build and drop it
        // inside one blocking task.
        match tokio::task::spawn_blocking(move || javascript::run(&source, timeout, memory_limit))
            .await
        {
            Ok(result) => result,
            Err(e) => ExecutionResult::error(format!("Error: execution task failed: {e}")),
        }
    }

    async fn run_python(&self, source: &str) -> ExecutionResult {
        let session = match self.sessions.session().await {
            Ok(session) => session,
            Err(e) => {
                return ExecutionResult::error(format!("Python environment not ready: {e}"));
            }
        };

        // Serialize runs against the shared session
        let _guard = self.sessions.run_guard().await;

        match session.run(source).await {
            Ok(outcome) if outcome.is_success() => {
                if outcome.stdout.is_empty() {
                    ExecutionResult::success(NO_OUTPUT_MESSAGE)
                } else {
                    ExecutionResult::success(outcome.stdout)
                }
            }
            Ok(outcome) => match parse_python_exception(&outcome.stderr) {
                Some(exception) => ExecutionResult::error(format!("Error: {exception}")),
                None => {
                    let mut message =
                        format!("Error: execution failed with exit code {}", outcome.exit_code);
                    let stderr = outcome.stderr.trim();
                    if !stderr.is_empty() {
                        message.push('\n');
                        message.push_str(stderr);
                    }
                    ExecutionResult::error(message)
                }
            },
            Err(e) => ExecutionResult::error(format!("Error: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parsing() {
        assert_eq!(Language::parse("javascript"), Language::JavaScript);
        assert_eq!(Language::parse("JS"), Language::JavaScript);
        assert_eq!(Language::parse("python"), Language::Python);
        assert_eq!(Language::parse(" html "), Language::Html);
        assert_eq!(
            Language::parse("rust"),
            Language::Unknown("rust".to_string())
        );
    }

    #[test]
    fn test_result_constructors() {
        let ok = ExecutionResult::success("fine");
        assert!(ok.is_success());
        assert_eq!(ok.output, "fine");

        let failed = ExecutionResult::error("nope");
        assert!(!failed.is_success());
        assert!(failed.is_error);
    }

    #[tokio::test]
    async fn test_unknown_language_is_soft() {
        let playground = Playground::new(PlaygroundConfig::default());
        let result = playground
            .execute(ExecutionRequest::new("whatever", Language::parse("cobol")))
            .await;

        assert_eq!(result.output, "Language not supported yet");
        assert!(!result.is_error);
    }
}
