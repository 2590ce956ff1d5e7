use serde_json::Value;
use vault_recon_store::WorkflowContext;
use vault_recon_store::WorkflowState;
use vault_recon_types::Error;
use vault_recon_types::Result;

pub const DEFAULT_MAX_BROADCAST_ATTEMPTS: u32 = 3;

/// One inbound event to the workflow state machine. Field names track
/// `spec.md` §4.1's transition table; the `event_type` stored on the
/// resulting Workflow Event row is [`Event::type_name`].
#[derive(Debug, Clone)]
pub enum Event {
    Start { skip_review: bool },
    Confirm,
    Cancel { reason: Option<String> },
    PoliciesPassed,
    PoliciesRequireApproval { approvers: Vec<String> },
    PoliciesRejected { reason: String },
    Approve { approved_by: String },
    Reject { rejected_by: String, reason: String },
    RequestSignature,
    SignatureReceived { signature: String },
    SignatureFailed { reason: String },
    BroadcastSuccess { tx_hash: String },
    BroadcastRetry { error: String },
    BroadcastFailed { error: String },
    IndexingComplete { block_number: i64 },
    IndexingFailed { error: String },
}

impl Event {
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::Start { .. } => "START",
            Event::Confirm => "CONFIRM",
            Event::Cancel { .. } => "CANCEL",
            Event::PoliciesPassed => "POLICIES_PASSED",
            Event::PoliciesRequireApproval { .. } => "POLICIES_REQUIRE_APPROVAL",
            Event::PoliciesRejected { .. } => "POLICIES_REJECTED",
            Event::Approve { .. } => "APPROVE",
            Event::Reject { .. } => "REJECT",
            Event::RequestSignature => "REQUEST_SIGNATURE",
            Event::SignatureReceived { .. } => "SIGNATURE_RECEIVED",
            Event::SignatureFailed { .. } => "SIGNATURE_FAILED",
            Event::BroadcastSuccess { .. } => "BROADCAST_SUCCESS",
            Event::BroadcastRetry { .. } => "BROADCAST_RETRY",
            Event::BroadcastFailed { .. } => "BROADCAST_FAILED",
            Event::IndexingComplete { .. } => "INDEXING_COMPLETE",
            Event::IndexingFailed { .. } => "INDEXING_FAILED",
        }
    }

    /// A JSON rendering of the event's own fields, stored as the Workflow
    /// Event's `event_payload`.
    pub fn payload(&self) -> Value {
        match self {
            Event::Start { skip_review } => serde_json::json!({ "skipReview": skip_review }),
            Event::Cancel { reason } => serde_json::json!({ "reason": reason }),
            Event::PoliciesRequireApproval { approvers } => {
                serde_json::json!({ "approvers": approvers })
            }
            Event::PoliciesRejected { reason } => serde_json::json!({ "reason": reason }),
            Event::Approve { approved_by } => serde_json::json!({ "approvedBy": approved_by }),
            Event::Reject {
                rejected_by,
                reason,
            } => serde_json::json!({ "rejectedBy": rejected_by, "reason": reason }),
            Event::SignatureReceived { signature } => {
                serde_json::json!({ "signature": signature })
            }
            Event::SignatureFailed { reason } => serde_json::json!({ "reason": reason }),
            Event::BroadcastSuccess { tx_hash } => serde_json::json!({ "txHash": tx_hash }),
            Event::BroadcastRetry { error } => serde_json::json!({ "error": error }),
            Event::BroadcastFailed { error } => serde_json::json!({ "error": error }),
            Event::IndexingComplete { block_number } => {
                serde_json::json!({ "blockNumber": block_number })
            }
            Event::IndexingFailed { error } => serde_json::json!({ "error": error }),
            Event::Confirm
            | Event::PoliciesPassed
            | Event::RequestSignature => Value::Object(serde_json::Map::new()),
        }
    }
}

fn fail(mut context: WorkflowContext, from: WorkflowState, error: impl Into<String>) -> WorkflowContext {
    context.set("error", Value::String(error.into()));
    context.set("failedAt", Value::String(from.as_str().to_string()));
    context
}

/// Pure transition function: `(state, context, event) -> (state, context)`.
/// The only side effect allowed here is none — persistence is the caller's
/// job (`vault-recon-store`'s `apply_transition`). Kept as a declarative
/// match rather than a trait-object-per-state machine so the whole table in
/// `spec.md` §4.1 is readable in one place.
pub fn apply(
    state: &WorkflowState,
    context: &WorkflowContext,
    event: &Event,
    max_broadcast_attempts: u32,
) -> Result<(WorkflowState, WorkflowContext)> {
    if state.is_final() {
        return Err(Error::InvalidStateTransition {
            state: state.as_str().to_string(),
            event: event.type_name().to_string(),
        });
    }

    let mut ctx = context.clone();

    let next_state = match (state, event) {
        (WorkflowState::Created, Event::Start { skip_review: true }) => {
            WorkflowState::EvaluatingPolicies
        }
        (WorkflowState::Created, Event::Start { skip_review: false }) => WorkflowState::Review,

        (WorkflowState::Review, Event::Confirm) => WorkflowState::EvaluatingPolicies,
        (WorkflowState::Review, Event::Cancel { reason }) => {
            ctx = fail(
                ctx,
                WorkflowState::Review,
                reason.clone().unwrap_or_else(|| "Cancelled by user".to_string()),
            );
            WorkflowState::Failed
        }

        (WorkflowState::EvaluatingPolicies, Event::PoliciesPassed) => WorkflowState::Approved,
        (WorkflowState::EvaluatingPolicies, Event::PoliciesRequireApproval { approvers }) => {
            ctx.set(
                "approvers",
                Value::Array(approvers.iter().cloned().map(Value::String).collect()),
            );
            WorkflowState::WaitingApproval
        }
        (WorkflowState::EvaluatingPolicies, Event::PoliciesRejected { reason }) => {
            ctx = fail(ctx, WorkflowState::EvaluatingPolicies, reason.clone());
            WorkflowState::Failed
        }

        (WorkflowState::WaitingApproval, Event::Approve { approved_by }) => {
            ctx.set("approvedBy", Value::String(approved_by.clone()));
            WorkflowState::Approved
        }
        (WorkflowState::WaitingApproval, Event::Reject { reason, .. }) => {
            ctx = fail(ctx, WorkflowState::WaitingApproval, reason.clone());
            WorkflowState::Failed
        }

        (WorkflowState::Approved, Event::RequestSignature) => WorkflowState::WaitingSignature,

        (WorkflowState::WaitingSignature, Event::SignatureReceived { signature }) => {
            ctx.set("signature", Value::String(signature.clone()));
            WorkflowState::Broadcasting
        }
        (WorkflowState::WaitingSignature, Event::SignatureFailed { reason }) => {
            ctx = fail(ctx, WorkflowState::WaitingSignature, reason.clone());
            WorkflowState::Failed
        }

        (WorkflowState::Broadcasting, Event::BroadcastSuccess { tx_hash }) => {
            ctx.set("txHash", Value::String(tx_hash.clone()));
            WorkflowState::Indexing
        }
        (WorkflowState::Broadcasting, Event::BroadcastRetry { error }) => {
            let attempts = ctx.broadcast_attempts();
            if attempts < max_broadcast_attempts {
                ctx.set("broadcastAttempts", Value::from(attempts + 1));
                WorkflowState::Broadcasting
            } else {
                ctx = fail(ctx, WorkflowState::Broadcasting, error.clone());
                WorkflowState::Failed
            }
        }
        (WorkflowState::Broadcasting, Event::BroadcastFailed { error }) => {
            ctx = fail(ctx, WorkflowState::Broadcasting, error.clone());
            WorkflowState::Failed
        }

        (WorkflowState::Indexing, Event::IndexingComplete { block_number }) => {
            ctx.set("blockNumber", Value::from(*block_number));
            WorkflowState::Completed
        }
        (WorkflowState::Indexing, Event::IndexingFailed { error }) => {
            ctx = fail(ctx, WorkflowState::Indexing, error.clone());
            WorkflowState::Failed
        }

        _ => {
            return Err(Error::InvalidStateTransition {
                state: state.as_str().to_string(),
                event: event.type_name().to_string(),
            });
        }
    };

    Ok((next_state, ctx))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn start_routes_to_review_unless_skipped() {
        let ctx = WorkflowContext::empty();
        let (state, _) = apply(
            &WorkflowState::Created,
            &ctx,
            &Event::Start { skip_review: false },
            DEFAULT_MAX_BROADCAST_ATTEMPTS,
        )
        .expect("start from created (no review)");
        assert_eq!(state, WorkflowState::Review);

        let (state, _) = apply(
            &WorkflowState::Created,
            &ctx,
            &Event::Start { skip_review: true },
            DEFAULT_MAX_BROADCAST_ATTEMPTS,
        )
        .expect("start from created (skip review)");
        assert_eq!(state, WorkflowState::EvaluatingPolicies);
    }

    #[test]
    fn cancel_from_review_fails_with_reason() {
        let ctx = WorkflowContext::empty();
        let (state, ctx) = apply(
            &WorkflowState::Review,
            &ctx,
            &Event::Cancel {
                reason: Some("changed my mind".to_string()),
            },
            DEFAULT_MAX_BROADCAST_ATTEMPTS,
        )
        .expect("cancel from review");
        assert_eq!(state, WorkflowState::Failed);
        assert_eq!(
            ctx.get("error").and_then(|v| v.as_str()),
            Some("changed my mind")
        );
        assert_eq!(ctx.get("failedAt").and_then(|v| v.as_str()), Some("review"));
    }

    #[test]
    fn broadcast_retry_exhausts_into_failure() {
        let mut ctx = WorkflowContext::empty();
        ctx.set("broadcastAttempts", serde_json::Value::from(3u64));
        let (state, _) = apply(
            &WorkflowState::Broadcasting,
            &ctx,
            &Event::BroadcastRetry {
                error: "timeout".to_string(),
            },
            3,
        )
        .expect("exhausted retry");
        assert_eq!(state, WorkflowState::Failed);
    }

    #[test]
    fn broadcast_retry_under_limit_stays_broadcasting() {
        let mut ctx = WorkflowContext::empty();
        ctx.set("broadcastAttempts", serde_json::Value::from(1u64));
        let (state, ctx) = apply(
            &WorkflowState::Broadcasting,
            &ctx,
            &Event::BroadcastRetry {
                error: "timeout".to_string(),
            },
            3,
        )
        .expect("retry under limit");
        assert_eq!(state, WorkflowState::Broadcasting);
        assert_eq!(ctx.broadcast_attempts(), 2);
    }

    #[test]
    fn illegal_event_is_rejected() {
        let ctx = WorkflowContext::empty();
        let err = apply(
            &WorkflowState::Created,
            &ctx,
            &Event::Confirm,
            DEFAULT_MAX_BROADCAST_ATTEMPTS,
        )
        .expect_err("test error");
        assert!(matches!(err, Error::InvalidStateTransition { .. }));
    }

    #[test]
    fn events_on_terminal_states_always_fail() {
        let ctx = WorkflowContext::empty();
        let err = apply(
            &WorkflowState::Completed,
            &ctx,
            &Event::Confirm,
            DEFAULT_MAX_BROADCAST_ATTEMPTS,
        )
        .expect_err("test error");
        assert!(matches!(err, Error::InvalidStateTransition { .. }));
    }
}
