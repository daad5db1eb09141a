//! Chat session: in-memory conversation history and the two run modes.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::llm::{ChatRequest, CompletionClient, LlmError, Message};

/// System prompt for interactive sessions.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// System prompt for the one-shot demo.
pub const DEMO_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that makes lots of cat references and uses emojis.";

/// User prompt for the one-shot demo.
pub const DEMO_USER_PROMPT: &str = "Write a haiku about a hungry cat who wants tuna";

// ============================================================================
// ChatSession
// ============================================================================

/// A multi-turn conversation. Each turn replays the system prompt plus the
/// full history, so message order is significant and strictly append-only.
pub struct ChatSession {
    backend: Arc<dyn CompletionClient>,
    model: String,
    system_prompt: String,
    history: Vec<Message>,
}

impl ChatSession {
    pub fn new(
        backend: Arc<dyn CompletionClient>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            model: model.into(),
            system_prompt: system_prompt.into(),
            history: Vec::new(),
        }
    }

    /// Send one user turn and return the assistant's reply.
    ///
    /// The user message is appended before the request, so it stays in the
    /// history even if the request fails.
    pub async fn send(&mut self, text: impl Into<String>) -> Result<String, LlmError> {
        self.history.push(Message::user(text));

        let mut messages = Vec::with_capacity(self.history.len() + 1);
        messages.push(Message::system(self.system_prompt.clone()));
        messages.extend(self.history.iter().cloned());

        let request = ChatRequest::new(self.model.clone(), messages);
        let response = self.backend.complete(request).await?;

        let reply = response
            .text()
            .ok_or(LlmError::EmptyResponse)?
            .to_string();
        self.history.push(Message::assistant(reply.clone()));
        Ok(reply)
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }
}

// ============================================================================
// Run modes
// ============================================================================

/// One-shot mode: a fixed prompt pair with the demo's sampling settings,
/// no history involved.
pub async fn run_demo(
    backend: &dyn CompletionClient,
    model: &str,
) -> Result<String, LlmError> {
    let request = ChatRequest {
        temperature: Some(0.7),
        n: Some(1),
        ..ChatRequest::new(
            model,
            vec![
                Message::system(DEMO_SYSTEM_PROMPT),
                Message::user(DEMO_USER_PROMPT),
            ],
        )
    };

    let response = backend.complete(request).await?;
    response
        .text()
        .map(str::to_string)
        .ok_or(LlmError::EmptyResponse)
}

/// Interactive mode on stdin/stdout.
pub async fn run_chat(session: &mut ChatSession) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    chat_loop(session, stdin, stdout).await
}

/// REPL over arbitrary line-based IO. Blank input re-prompts without a
/// request; `exit`/`quit` (any case) or EOF ends the loop.
async fn chat_loop<R, W>(session: &mut ChatSession, input: R, mut output: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        output.write_all(b"you> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            break;
        }

        let reply = session.send(text).await?;
        output.write_all(format!("bot> {reply}\n").as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io::Cursor;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm::{ChatResponse, Choice, Role};

    /// Backend that returns canned replies and records every request.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<String>>,
        requests: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedBackend {
        fn new(replies: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn requests(&self) -> Vec<ChatRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedBackend {
        async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            let choices = match self.replies.lock().unwrap().pop_front() {
                Some(content) => vec![Choice {
                    index: 0,
                    message: Message::assistant(content),
                    finish_reason: Some("stop".to_string()),
                }],
                None => Vec::new(),
            };
            Ok(ChatResponse {
                id: "chatcmpl-scripted".to_string(),
                choices,
                usage: None,
            })
        }
    }

    #[tokio::test]
    async fn history_grows_in_turn_order() {
        let backend = ScriptedBackend::new(&["Paris.", "About two million."]);
        let mut session =
            ChatSession::new(backend.clone(), "gpt-4o-mini", DEFAULT_SYSTEM_PROMPT);

        session.send("What is the capital of France?").await.unwrap();
        session.send("And its population?").await.unwrap();

        let roles: Vec<Role> = session.history().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(session.history()[1].content, "Paris.");
        assert_eq!(session.history()[3].content, "About two million.");
    }

    #[tokio::test]
    async fn each_request_replays_system_prompt_plus_history() {
        let backend = ScriptedBackend::new(&["one", "two"]);
        let mut session = ChatSession::new(backend.clone(), "gpt-4o-mini", "Be terse.");

        session.send("first").await.unwrap();
        session.send("second").await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests[0].messages.len(), 2); // system + 1 user
        assert_eq!(requests[1].messages.len(), 4); // system + full history + new user
        assert_eq!(requests[1].messages[0].role, Role::System);
        assert_eq!(requests[1].messages[0].content, "Be terse.");
        assert_eq!(requests[1].messages[1].content, "first");
        assert_eq!(requests[1].messages[2].content, "one");
        assert_eq!(requests[1].messages[3].content, "second");
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let backend = ScriptedBackend::new(&[]);
        let mut session =
            ChatSession::new(backend, "gpt-4o-mini", DEFAULT_SYSTEM_PROMPT);

        let err = session.send("hello").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
        // the failed user turn stays in the history
        assert_eq!(session.history().len(), 1);
    }

    #[tokio::test]
    async fn demo_sets_sampling_and_fixed_prompts() {
        let backend = ScriptedBackend::new(&["Tuna haiku 🐱"]);

        let reply = run_demo(backend.as_ref(), "gpt-4o-mini").await.unwrap();
        assert_eq!(reply, "Tuna haiku 🐱");

        let request = &backend.requests()[0];
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.n, Some(1));
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[1].content, DEMO_USER_PROMPT);
    }

    #[tokio::test]
    async fn chat_loop_skips_blanks_and_stops_on_quit() {
        let backend = ScriptedBackend::new(&["hi there"]);
        let mut session =
            ChatSession::new(backend.clone(), "gpt-4o-mini", DEFAULT_SYSTEM_PROMPT);

        let input = Cursor::new(b"\n  \nhello\nQUIT\n".to_vec());
        let mut output = Vec::new();
        chat_loop(&mut session, input, &mut output).await.unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("bot> hi there\n"));
        assert_eq!(backend.requests().len(), 1);
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn chat_loop_stops_after_failed_request() {
        // backend runs dry immediately, so the first turn fails
        let backend = ScriptedBackend::new(&[]);
        let mut session =
            ChatSession::new(backend.clone(), "gpt-4o-mini", DEFAULT_SYSTEM_PROMPT);

        let input = Cursor::new(b"hello\nnever sent\n".to_vec());
        let mut output = Vec::new();
        let result = chat_loop(&mut session, input, &mut output).await;

        assert!(result.is_err());
        // the failure ends the loop before the second line is read
        assert_eq!(backend.requests().len(), 1);
        let printed = String::from_utf8(output).unwrap();
        assert!(!printed.contains("bot>"));
    }

    #[tokio::test]
    async fn chat_loop_ends_cleanly_on_eof() {
        let backend = ScriptedBackend::new(&["reply"]);
        let mut session =
            ChatSession::new(backend, "gpt-4o-mini", DEFAULT_SYSTEM_PROMPT);

        // no trailing exit, reader just runs dry
        let input = Cursor::new(b"hello\n".to_vec());
        let mut output = Vec::new();
        chat_loop(&mut session, input, &mut output).await.unwrap();

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.ends_with("you> "));
    }
}
