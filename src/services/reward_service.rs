// src/services/reward_service.rs

use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::LoyaltyStore,
    models::{
        audit::NewAuditLogEntry,
        ledger::{
            AddRewardPayload, BalanceScope, LedgerEntry, NewLedgerEntry, PointsType, MAX_POINTS_PER_ENTRY,
        },
    },
    services::{
        balance_service::compute_in,
        bounded,
        notification::{reward_message, Notifier},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardRequest {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    /// Sempre positivo; o sinal vem de `kind`
    pub points: i64,
    pub kind: PointsType,
    pub notify_email: Option<String>,
}

impl From<AddRewardPayload> for RewardRequest {
    fn from(payload: AddRewardPayload) -> Self {
        Self {
            customer_id: payload.customer_id,
            restaurant_id: payload.restaurant_id,
            points: payload.points,
            kind: payload.kind,
            notify_email: payload.email,
        }
    }
}

// Resultado da parte transacional, usado para montar a notificação
struct Committed {
    entry: LedgerEntry,
    available: i64,
    customer_email: String,
}

/// Coordena crédito e resgate de pontos: checagem de saldo, lançamento e
/// auditoria numa única transação; notificação depois do commit.
#[derive(Clone)]
pub struct RewardService {
    store: Arc<dyn LoyaltyStore>,
    notifier: Arc<dyn Notifier>,
    tx_timeout: Duration,
}

impl RewardService {
    pub fn new(store: Arc<dyn LoyaltyStore>, notifier: Arc<dyn Notifier>, tx_timeout: Duration) -> Self {
        Self {
            store,
            notifier,
            tx_timeout,
        }
    }

    pub async fn grant_or_redeem(&self, request: RewardRequest) -> Result<LedgerEntry, AppError> {
        if request.points <= 0 || request.points > MAX_POINTS_PER_ENTRY {
            return Err(AppError::InvalidInput(format!(
                "A quantidade de pontos deve estar entre 1 e {}.",
                MAX_POINTS_PER_ENTRY
            )));
        }

        let committed = bounded(self.tx_timeout, "grant_or_redeem", self.apply(&request)).await?;

        tracing::info!(
            customer_id = %request.customer_id,
            kind = ?request.kind,
            points = request.points,
            available = committed.available,
            "Pontos movimentados"
        );

        let to = request.notify_email.unwrap_or(committed.customer_email);
        self.notify(to, request.kind, request.points, committed.available);

        Ok(committed.entry)
    }

    async fn apply(&self, request: &RewardRequest) -> Result<Committed, AppError> {
        let mut tx = self.store.begin().await?;

        // Trava a linha: operações concorrentes no mesmo cliente esperam aqui
        let customer = tx
            .lock_customer(request.customer_id)
            .await?
            .filter(|c| c.restaurant_id == request.restaurant_id)
            .ok_or_else(|| AppError::not_found("Cliente"))?;

        let balance = compute_in(tx.as_mut(), BalanceScope::Customer(customer.id)).await?;
        if request.kind == PointsType::Redeem && balance.available < request.points {
            return Err(AppError::InsufficientBalance {
                available: balance.available,
                requested: request.points,
            });
        }

        // Créditos acumulados também precisam caber em i64, não só o saldo
        let over_limit = || AppError::InvalidInput("O saldo excederia o limite suportado.".to_string());
        if request.kind == PointsType::Add {
            balance.added.checked_add(request.points).ok_or_else(over_limit)?;
        }
        let available = balance
            .available
            .checked_add(request.kind.signed(request.points))
            .ok_or_else(over_limit)?;

        let entry = tx
            .append_ledger_entry(&NewLedgerEntry::new(
                customer.id,
                request.restaurant_id,
                request.points,
                request.kind,
            ))
            .await?;
        tx.append_audit_entry(&NewAuditLogEntry::points(customer.id, request.restaurant_id, request.kind))
            .await?;

        tx.commit().await?;

        Ok(Committed {
            entry,
            available,
            customer_email: customer.email,
        })
    }

    // Fire-and-forget: a resposta HTTP não espera o envio
    fn notify(&self, to: String, kind: PointsType, points: i64, available: i64) {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            let (subject, body) = reward_message(kind, points, available);
            if let Err(e) = notifier.send(&to, subject, &body).await {
                tracing::warn!(error = %e, %to, "Falha ao enviar notificação de pontos");
            }
        });
    }
}
