//! Message dispatcher
//!
//! One pass per send: build the envelope, post it through the
//! [`RetryableInvoker`], reconcile the rejected targets.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use wecom_domain::constants::{FIELD_AGENT_ID, FIELD_MSG_TYPE, FIELD_SAFE, PATH_MESSAGE_SEND};
use wecom_domain::{AgentKey, Message, MessageSendResult, MessageTargets, Result, WeComError};

use super::reconcile::reconcile_invalid_targets;
use crate::invoker::RetryableInvoker;
use crate::transport_ports::ApiRequest;

/// Build the JSON body for `message/send`.
///
/// Targets, `agentid`, `msgtype` and `safe` (0/1) first, then the
/// type-specific payload keyed by the message type.
pub fn build_envelope(agent: &AgentKey, message: &Message, targets: &MessageTargets) -> Value {
    let mut body = Map::new();
    targets.write_to(&mut body);
    body.insert(FIELD_AGENT_ID.into(), Value::from(agent.id()));
    body.insert(FIELD_MSG_TYPE.into(), Value::from(message.msg_type()));
    body.insert(FIELD_SAFE.into(), Value::from(u8::from(message.is_safe())));
    message.content().fill(&mut body);
    Value::Object(body)
}

/// Sends messages on behalf of agents.
pub struct MessageDispatcher {
    invoker: Arc<RetryableInvoker>,
}

impl MessageDispatcher {
    pub fn new(invoker: Arc<RetryableInvoker>) -> Self {
        Self { invoker }
    }

    /// Send `message` to `targets` as `agent`.
    ///
    /// Returns the remote code and message along with the subset of
    /// `targets` the service rejected.
    ///
    /// # Errors
    /// - `InvalidInput` when `targets` names nobody
    /// - `Remote` for a non-zero `errcode` (after at most one token refresh)
    /// - Token and transport errors are propagated as-is
    #[instrument(
        skip(self, message, targets),
        fields(agent = %agent, msgtype = message.msg_type(), send_id = %Uuid::new_v4())
    )]
    pub async fn send(
        &self,
        agent: &AgentKey,
        message: &Message,
        targets: &MessageTargets,
    ) -> Result<MessageSendResult> {
        if targets.is_empty() {
            return Err(WeComError::InvalidInput("message has no recipients".into()));
        }

        let body = build_envelope(agent, message, targets);
        let response =
            self.invoker.execute(agent, ApiRequest::post_json(PATH_MESSAGE_SEND, body)).await?;

        let result = reconcile_invalid_targets(targets, &response);
        if result.has_invalid_targets() {
            warn!(
                invalid_users = result.invalid.users.len(),
                invalid_parties = result.invalid.parties.len(),
                invalid_tags = result.invalid.tags.len(),
                "Message sent with rejected targets"
            );
        } else {
            info!(targets = targets.len(), to_all = targets.to_all, "Message sent");
        }
        Ok(result)
    }
}
