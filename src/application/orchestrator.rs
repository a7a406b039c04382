use super::record_event;
use super::retry::{RetryCoordinator, RetryPolicy};
use crate::config::AppConfig;
use crate::domain::compliance::ComplianceGate;
use crate::domain::event::{EventStatus, PipelineEvent, Stage};
use crate::domain::fx::RateConverter;
use crate::domain::outcome::PayoutOutcome;
use crate::domain::ports::{EventSinkRef, PaymentExecutorRef, RetryAuditStoreRef};
use crate::domain::rail::RailSelector;
use crate::domain::request::{PayoutRequest, TransactionId};
use crate::domain::wallet::WalletValidator;
use crate::error::PayoutError;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

const INVALID_WALLET: &str = "Invalid wallet address";
const BLOCKED: &str = "Sanctions or blacklisted wallet";
const FX_UNAVAILABLE: &str = "FX rate unavailable";
const AMOUNT_OUT_OF_RANGE: &str = "Converted amount out of range";

/// Runs payout requests through validation, compliance, FX, routing and
/// execution, recording an event for every stage transition.
///
/// The first failing stage short-circuits the pipeline. Failures always reach
/// the event sink before the outcome is returned.
pub struct PayoutOrchestrator {
    validator: WalletValidator,
    compliance: ComplianceGate,
    converter: RateConverter,
    rails: RailSelector,
    retry: RetryCoordinator,
    events: EventSinkRef,
    settlement_currency: String,
}

impl PayoutOrchestrator {
    pub fn new(
        compliance: ComplianceGate,
        converter: RateConverter,
        rails: RailSelector,
        retry: RetryCoordinator,
        events: EventSinkRef,
        settlement_currency: impl Into<String>,
    ) -> Self {
        Self {
            validator: WalletValidator::new(),
            compliance,
            converter,
            rails,
            retry,
            events,
            settlement_currency: settlement_currency.into(),
        }
    }

    /// Wires every stage from configuration around the given collaborators.
    pub fn from_config(
        config: &AppConfig,
        executor: PaymentExecutorRef,
        events: EventSinkRef,
        audit: RetryAuditStoreRef,
    ) -> Self {
        let retry = RetryCoordinator::new(
            executor,
            events.clone(),
            audit,
            RetryPolicy::from_config(&config.retry),
        );
        Self::new(
            ComplianceGate::from_config(&config.compliance),
            RateConverter::from_config(&config.fx),
            RailSelector::from_config(&config.rails),
            retry,
            events,
            config.fx.settlement_currency.clone(),
        )
    }

    pub fn retry_coordinator(&self) -> &RetryCoordinator {
        &self.retry
    }

    pub fn settlement_currency(&self) -> &str {
        &self.settlement_currency
    }

    /// Processes one payout request to its terminal outcome.
    pub async fn process(&self, request: PayoutRequest) -> PayoutOutcome {
        let transaction_id = TransactionId::generate();
        let outcome = self.run(transaction_id, request).await;
        info!(
            transaction_id = %outcome.transaction_id(),
            status = outcome.status(),
            code = outcome.status_code(),
            "Payout finished"
        );
        outcome
    }

    async fn run(&self, transaction_id: TransactionId, request: PayoutRequest) -> PayoutOutcome {
        self.record(
            &transaction_id,
            Stage::Received,
            EventStatus::Start,
            serde_json::to_value(&request).unwrap_or_default(),
        )
        .await;

        if !self
            .validator
            .validate(&request.wallet_address, &request.chain)
        {
            debug!(transaction_id = %transaction_id, "Wallet failed validation");
            self.record(
                &transaction_id,
                Stage::Validation,
                EventStatus::Fail,
                json!({ "reason": INVALID_WALLET }),
            )
            .await;
            return PayoutOutcome::ValidationFailed {
                transaction_id,
                reason: INVALID_WALLET.to_string(),
            };
        }

        if let Err(err) = self
            .compliance
            .screen(&request.wallet_address, &request.destination_country)
        {
            debug!(transaction_id = %transaction_id, error = %err, "Payout blocked by compliance");
            self.record(
                &transaction_id,
                Stage::Compliance,
                EventStatus::Blocked,
                json!({ "reason": BLOCKED, "rule": err.to_string() }),
            )
            .await;
            return PayoutOutcome::ComplianceBlocked {
                transaction_id,
                reason: BLOCKED.to_string(),
            };
        }

        let conversion = match self.converter.convert(
            request.amount.value(),
            &request.currency,
            &self.settlement_currency,
        ) {
            Ok(conversion) => conversion,
            Err(PayoutError::ConversionOutOfRange { amount, rate }) => {
                debug!(transaction_id = %transaction_id, %amount, %rate, "Converted amount out of range");
                self.record(
                    &transaction_id,
                    Stage::Fx,
                    EventStatus::Fail,
                    json!({
                        "reason": "Converted amount out of range",
                        "amount": amount,
                        "rate": rate,
                    }),
                )
                .await;
                return PayoutOutcome::ConversionUnavailable {
                    transaction_id,
                    reason: AMOUNT_OUT_OF_RANGE.to_string(),
                };
            }
            Err(err) => {
                debug!(transaction_id = %transaction_id, error = %err, "No FX rate");
                self.record(
                    &transaction_id,
                    Stage::Fx,
                    EventStatus::Fail,
                    json!({
                        "reason": "FX rate missing",
                        "source": request.currency,
                        "target": self.settlement_currency,
                    }),
                )
                .await;
                return PayoutOutcome::ConversionUnavailable {
                    transaction_id,
                    reason: FX_UNAVAILABLE.to_string(),
                };
            }
        };
        self.record(
            &transaction_id,
            Stage::Fx,
            EventStatus::Success,
            json!({
                "converted_amount": conversion.converted_amount,
                "rate": conversion.rate,
            }),
        )
        .await;

        let rail = self.rails.select(request.urgency).to_string();
        self.record(
            &transaction_id,
            Stage::Routing,
            EventStatus::Selected,
            json!({ "rail": rail }),
        )
        .await;

        match self
            .retry
            .execute(&transaction_id, &rail, conversion.converted_amount)
            .await
        {
            Ok(_receipt) => PayoutOutcome::Success {
                transaction_id,
                rail,
                converted_amount: conversion.converted_amount,
                rate: conversion.rate,
            },
            Err(err) => {
                let (attempts, reason) = match err {
                    PayoutError::ExecutionExhausted { attempts, reason } => (attempts, reason),
                    other => (0, other.to_string()),
                };
                warn!(transaction_id = %transaction_id, attempts, reason = %reason, "Payout execution failed");
                self.record(
                    &transaction_id,
                    Stage::Payout,
                    EventStatus::Fail,
                    json!({ "reason": reason, "attempts": attempts }),
                )
                .await;
                PayoutOutcome::ExecutionFailed {
                    transaction_id,
                    attempts,
                    reason,
                }
            }
        }
    }

    async fn record(
        &self,
        transaction_id: &TransactionId,
        stage: Stage,
        status: EventStatus,
        detail: Value,
    ) {
        let event = PipelineEvent::new(transaction_id.clone(), stage, status, detail);
        record_event(self.events.as_ref(), event).await;
    }
}
