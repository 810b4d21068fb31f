// src/services/balance_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{LoyaltyStore, UnitOfWork},
    models::ledger::{BalanceScope, PointsBalance},
};

/// Saldo de pontos sempre derivado do livro-razão.
#[derive(Clone)]
pub struct BalanceService {
    store: Arc<dyn LoyaltyStore>,
}

impl BalanceService {
    pub fn new(store: Arc<dyn LoyaltyStore>) -> Self {
        Self { store }
    }

    /// Leitura relaxada, para perfis e relatórios.
    pub async fn compute_balance(&self, scope: BalanceScope) -> Result<PointsBalance, AppError> {
        let mut conn = self.store.connect().await?;
        compute_in(conn.as_mut(), scope).await
    }
}

/// Mesmo cálculo dentro de uma unidade já aberta (ex.: antes de um resgate).
pub async fn compute_in(uow: &mut dyn UnitOfWork, scope: BalanceScope) -> Result<PointsBalance, AppError> {
    let totals = uow.ledger_totals(scope).await?;
    Ok(PointsBalance::from_totals(&totals))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        db::MemoryStore,
        models::ledger::{NewLedgerEntry, PointsType},
    };

    #[tokio::test]
    async fn balance_is_stable_without_writes() {
        let store = MemoryStore::new();
        let (customer, restaurant) = (Uuid::new_v4(), Uuid::new_v4());

        let mut tx = store.begin().await.unwrap();
        tx.append_ledger_entry(&NewLedgerEntry::new(customer, restaurant, 70, PointsType::Add))
            .await
            .unwrap();
        tx.append_ledger_entry(&NewLedgerEntry::new(customer, restaurant, 25, PointsType::Redeem))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let service = BalanceService::new(Arc::new(store));
        let first = service.compute_balance(BalanceScope::Customer(customer)).await.unwrap();
        let second = service.compute_balance(BalanceScope::Customer(customer)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, PointsBalance { added: 70, redeemed: 25, available: 45 });
    }

    #[tokio::test]
    async fn restaurant_scope_sums_every_customer() {
        let store = MemoryStore::new();
        let restaurant = Uuid::new_v4();

        let mut tx = store.begin().await.unwrap();
        for points in [10, 20, 30] {
            tx.append_ledger_entry(&NewLedgerEntry::new(Uuid::new_v4(), restaurant, points, PointsType::Add))
                .await
                .unwrap();
        }
        // Outro tenant não entra na soma
        tx.append_ledger_entry(&NewLedgerEntry::new(Uuid::new_v4(), Uuid::new_v4(), 99, PointsType::Add))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let service = BalanceService::new(Arc::new(store));
        let balance = service.compute_balance(BalanceScope::Restaurant(restaurant)).await.unwrap();
        assert_eq!(balance.added, 60);
        assert_eq!(balance.available, 60);
    }

    #[tokio::test]
    async fn unknown_scope_is_zero() {
        let service = BalanceService::new(Arc::new(MemoryStore::new()));
        let balance = service.compute_balance(BalanceScope::Customer(Uuid::new_v4())).await.unwrap();
        assert_eq!(balance, PointsBalance::default());
    }
}
