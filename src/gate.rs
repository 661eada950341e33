use std::time::Instant;

use tracing::{error, info};

use crate::backend::InferenceBackend;
use crate::error::GatewayError;
use crate::ledger::{ApprovedKey, CreditLedger};
use crate::metrics::{CREDITS_CONSUMED, GENERATION_FAILURES, GENERATION_LATENCY};
use crate::models::ChatMessage;

/// Spends one credit for `approved` and forwards `prompt` as a single user
/// turn. The credit is charged on attempt, so a failed backend call is not
/// refunded.
pub async fn consume_and_generate(
    ledger: &CreditLedger,
    backend: &dyn InferenceBackend,
    approved: &ApprovedKey,
    prompt: &str,
) -> Result<String, GatewayError> {
    let remaining = ledger.consume(approved)?;
    CREDITS_CONSUMED.inc();

    let start_time = Instant::now();
    let result = backend.chat(&[ChatMessage::user(prompt)]).await;
    GENERATION_LATENCY.observe(start_time.elapsed().as_secs_f64());

    match result {
        Ok(text) => {
            info!(key = %approved.fingerprint(), remaining, "Generation succeeded");
            Ok(text)
        }
        Err(e) => {
            GENERATION_FAILURES.inc();
            error!(key = %approved.fingerprint(), remaining, error = %e, "Generation failed, credit not refunded");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeyGrant;
    use crate::error::{GenerationError, Rejected};
    use async_trait::async_trait;
    use std::sync::Mutex;

    // Records every conversation and answers from a fixed script
    struct ScriptedBackend {
        fail: bool,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedBackend {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl InferenceBackend for ScriptedBackend {
        async fn chat(&self, messages: &[ChatMessage]) -> Result<String, GenerationError> {
            self.seen.lock().unwrap().push(messages.to_vec());
            if self.fail {
                Err(GenerationError::Malformed("scripted failure".to_string()))
            } else {
                Ok(format!("echo: {}", messages[0].content))
            }
        }

        async fn health(&self) -> bool {
            !self.fail
        }
    }

    fn ledger(credits: u64) -> CreditLedger {
        CreditLedger::from_grants([KeyGrant {
            key: "abc".to_string(),
            credits,
        }])
    }

    #[tokio::test]
    async fn forwards_prompt_and_spends_one_credit() {
        let ledger = ledger(5);
        let backend = ScriptedBackend::new(false);
        let approved = ledger.authorize(Some("abc")).unwrap();

        let text = consume_and_generate(&ledger, &backend, &approved, "hello")
            .await
            .unwrap();

        assert_eq!(text, "echo: hello");
        assert_eq!(ledger.balance("abc"), Some(4));
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], vec![ChatMessage::user("hello")]);
    }

    #[tokio::test]
    async fn failed_generation_still_costs_a_credit() {
        let ledger = ledger(5);
        let backend = ScriptedBackend::new(true);
        let approved = ledger.authorize(Some("abc")).unwrap();

        let err = consume_and_generate(&ledger, &backend, &approved, "hello")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Generation(_)));
        assert_eq!(ledger.balance("abc"), Some(4));
    }

    #[tokio::test]
    async fn drained_approval_never_reaches_backend() {
        let ledger = ledger(1);
        let backend = ScriptedBackend::new(false);
        let first = ledger.authorize(Some("abc")).unwrap();
        let second = ledger.authorize(Some("abc")).unwrap();

        consume_and_generate(&ledger, &backend, &first, "one")
            .await
            .unwrap();
        let err = consume_and_generate(&ledger, &backend, &second, "two")
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::Rejected(Rejected)));
        assert_eq!(backend.seen.lock().unwrap().len(), 1);
        assert_eq!(ledger.balance("abc"), Some(0));
    }
}
