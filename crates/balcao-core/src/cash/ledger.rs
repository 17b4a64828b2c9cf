//! # Cash Ledger
//!
//! State machine over a [`CashRepository`]. Every balance is recomputed from
//! the stored movement log on each call.
//!
//! ## Sangria Guard
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_movement(SANGRIA, 200.00)                                      │
//! │       │                                                                 │
//! │       ├── load session ─────────► not OPEN? ──► SessionNotOpen          │
//! │       ├── load movements ───────► recompute expected (120.00)          │
//! │       ├── 200.00 > 120.00 ──────► InsufficientBalance, nothing appended │
//! │       └── otherwise ────────────► append_movement()                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Callers serialize access per session: the movement log read right before
//! an append must still be current when the append happens.

use tracing::{debug, info, warn};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{
    validate_movement_amount, validate_non_negative, validate_note, validate_operator,
};

use super::repository::CashRepository;
use super::{
    CashMovement, CashSession, ClosingReconciliation, MovementType, ReconciliationOutcome,
    SessionStatus, SessionSummary,
};

/// Cash custody for one drawer.
#[derive(Debug)]
pub struct CashLedger<R> {
    repository: R,
}

impl<R: CashRepository> CashLedger<R> {
    pub fn new(repository: R) -> Self {
        CashLedger { repository }
    }

    /// Read access to the underlying store.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Opens a new session with the given float.
    ///
    /// ## Errors
    /// - `SessionAlreadyOpen` if any session is currently open
    /// - `Validation` for a negative float or a blank operator
    pub fn open(&mut self, opening_float: Money, operator: Option<&str>) -> CoreResult<CashSession> {
        validate_non_negative("opening_float", opening_float)?;
        validate_operator(operator)?;

        if let Some(existing) = self.repository.load_open_session()? {
            warn!(session_id = %existing.id, "Rejected open: a session is already open");
            return Err(CoreError::SessionAlreadyOpen {
                session_id: existing.id,
            });
        }

        let session = CashSession::open(opening_float, operator.map(|op| op.trim().to_string()));
        self.repository.save_session(&session)?;

        info!(
            session_id = %session.id,
            opening_float = %opening_float,
            operator = ?session.operator,
            "Cash session opened"
        );

        Ok(session)
    }

    /// Appends a SALE movement. `amount` must be positive.
    pub fn record_sale(&mut self, session_id: &str, amount: Money) -> CoreResult<CashMovement> {
        self.append(session_id, MovementType::Sale, amount, None)
    }

    /// Appends a SANGRIA or SUPRIMENTO movement.
    ///
    /// Sales go through [`CashLedger::record_sale`]; passing
    /// `MovementType::Sale` here is a validation error.
    ///
    /// ## Errors
    /// - `SessionNotFound` / `SessionNotOpen`
    /// - `InsufficientBalance` when a sangria exceeds the expected balance
    /// - `Validation` for a non-positive amount or an overlong reason
    pub fn record_movement(
        &mut self,
        session_id: &str,
        movement_type: MovementType,
        amount: Money,
        reason: Option<&str>,
    ) -> CoreResult<CashMovement> {
        if movement_type == MovementType::Sale {
            return Err(ValidationError::InvalidFormat {
                field: "type".to_string(),
                reason: "sales are recorded on sale completion".to_string(),
            }
            .into());
        }

        self.append(session_id, movement_type, amount, reason)
    }

    /// Closes an open session against the counted drawer amount.
    ///
    /// A non-zero difference is reported, not corrected. The closing record is
    /// written before the session; if the session write fails, calling `close`
    /// again completes the close with the closing already recorded.
    pub fn close(
        &mut self,
        session_id: &str,
        counted: Money,
        observations: Option<&str>,
    ) -> CoreResult<ClosingReconciliation> {
        validate_non_negative("counted", counted)?;
        validate_note("observations", observations)?;

        let mut session = self.require_open(session_id)?;
        let expected = self.summarize(&session)?.expected_balance;

        // A closing stored for a still-open session is a close whose session
        // write failed; finish it with the recorded count.
        let closing = match self.repository.load_closing(session_id)? {
            Some(recorded) => {
                warn!(
                    session_id,
                    recorded_counted = %recorded.counted,
                    counted = %counted,
                    "Finishing interrupted close with the recorded count"
                );
                recorded
            }
            None => {
                let closing = ClosingReconciliation::new(
                    session_id,
                    expected,
                    counted,
                    observations.map(str::to_string),
                );
                self.repository.save_closing(&closing)?;
                closing
            }
        };

        session.status = SessionStatus::Closed;
        session.closed_at = Some(closing.closed_at);
        self.repository.save_session(&session)?;

        let (expected, counted) = (closing.expected, closing.counted);
        match closing.outcome() {
            ReconciliationOutcome::Balanced => {
                info!(session_id, expected = %expected, "Cash session closed balanced");
            }
            ReconciliationOutcome::Shortage(amount) => {
                warn!(session_id, expected = %expected, counted = %counted, shortage = %amount, "Cash session closed with shortage");
            }
            ReconciliationOutcome::Overage(amount) => {
                warn!(session_id, expected = %expected, counted = %counted, overage = %amount, "Cash session closed with overage");
            }
        }

        Ok(closing)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// `opening_float + Σ SALE + Σ SUPRIMENTO − Σ SANGRIA`, from the full log.
    pub fn current_expected_balance(&self, session_id: &str) -> CoreResult<Money> {
        let session = self.require_session(session_id)?;
        Ok(self.summarize(&session)?.expected_balance)
    }

    /// The currently open session, if any.
    pub fn open_session(&self) -> CoreResult<Option<CashSession>> {
        Ok(self.repository.load_open_session()?)
    }

    pub fn session(&self, session_id: &str) -> CoreResult<CashSession> {
        self.require_session(session_id)
    }

    /// All sessions, oldest first.
    pub fn sessions(&self) -> CoreResult<Vec<CashSession>> {
        Ok(self.repository.list_sessions()?)
    }

    pub fn movements(&self, session_id: &str) -> CoreResult<Vec<CashMovement>> {
        self.require_session(session_id)?;
        Ok(self.repository.load_movements(session_id)?)
    }

    /// Closing record of a session; `None` while it is still open.
    pub fn closing(&self, session_id: &str) -> CoreResult<Option<ClosingReconciliation>> {
        self.require_session(session_id)?;
        Ok(self.repository.load_closing(session_id)?)
    }

    pub fn summary(&self, session_id: &str) -> CoreResult<SessionSummary> {
        let session = self.require_session(session_id)?;
        self.summarize(&session)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn append(
        &mut self,
        session_id: &str,
        movement_type: MovementType,
        amount: Money,
        reason: Option<&str>,
    ) -> CoreResult<CashMovement> {
        validate_movement_amount(amount)?;
        validate_note("reason", reason)?;

        let session = self.require_open(session_id)?;
        let summary = self.summarize(&session)?;
        let available = summary.expected_balance;

        match movement_type {
            MovementType::Sangria => {
                if amount > available {
                    warn!(
                        session_id,
                        requested = %amount,
                        available = %available,
                        "Rejected sangria above expected balance"
                    );
                    return Err(CoreError::InsufficientBalance {
                        requested: amount,
                        available,
                    });
                }
            }
            MovementType::Sale | MovementType::Suprimento => {
                let total = if movement_type == MovementType::Sale {
                    summary.sales_total
                } else {
                    summary.suprimento_total
                };
                // The log must still replay after this append.
                if available.checked_add(amount).is_none() || total.checked_add(amount).is_none() {
                    warn!(
                        session_id,
                        amount = %amount,
                        available = %available,
                        "Rejected movement overflowing the balance"
                    );
                    return Err(ValidationError::OutOfRange {
                        field: "expected balance".to_string(),
                        min: 0,
                        max: i64::MAX,
                    }
                    .into());
                }
            }
        }

        let movement = CashMovement::new(
            session_id,
            movement_type,
            amount,
            reason.map(str::to_string),
        );
        self.repository.append_movement(&movement)?;

        debug!(
            session_id,
            movement_id = %movement.id,
            movement_type = %movement_type,
            amount = %amount,
            "Cash movement recorded"
        );

        Ok(movement)
    }

    fn require_session(&self, session_id: &str) -> CoreResult<CashSession> {
        self.repository
            .load_session(session_id)?
            .ok_or_else(|| CoreError::SessionNotFound(session_id.to_string()))
    }

    fn require_open(&self, session_id: &str) -> CoreResult<CashSession> {
        let session = self.require_session(session_id)?;
        if !session.is_open() {
            return Err(CoreError::SessionNotOpen {
                session_id: session.id,
            });
        }
        Ok(session)
    }

    /// Replays the movement log, rejecting anything that cannot have been
    /// written by this ledger.
    fn summarize(&self, session: &CashSession) -> CoreResult<SessionSummary> {
        let corrupted = |reason: String| {
            warn!(session_id = %session.id, %reason, "Cash ledger corrupted");
            CoreError::CorruptedLedger {
                session_id: session.id.clone(),
                reason,
            }
        };

        if session.opening_float.is_negative() {
            return Err(corrupted(format!(
                "opening float {} is negative",
                session.opening_float
            )));
        }

        let movements = self.repository.load_movements(&session.id)?;

        let mut balance = session.opening_float;
        let mut sales_total = Money::zero();
        let mut suprimento_total = Money::zero();
        let mut sangria_total = Money::zero();

        for movement in &movements {
            if movement.session_id != session.id {
                return Err(corrupted(format!(
                    "movement {} belongs to session {}",
                    movement.id, movement.session_id
                )));
            }
            if !movement.amount.is_positive() {
                return Err(corrupted(format!(
                    "movement {} has non-positive amount {}",
                    movement.id, movement.amount
                )));
            }

            let bucket = match movement.movement_type {
                MovementType::Sale => &mut sales_total,
                MovementType::Suprimento => &mut suprimento_total,
                MovementType::Sangria => &mut sangria_total,
            };
            *bucket = bucket
                .checked_add(movement.amount)
                .ok_or_else(|| corrupted(format!("movement {} overflows the total", movement.id)))?;

            balance = balance
                .checked_add(movement.signed_amount())
                .ok_or_else(|| corrupted(format!("movement {} overflows the balance", movement.id)))?;
            if balance.is_negative() {
                return Err(corrupted(format!(
                    "movement {} drives the balance to {}",
                    movement.id, balance
                )));
            }
        }

        Ok(SessionSummary {
            session_id: session.id.clone(),
            status: session.status,
            opening_float: session.opening_float,
            sales_total,
            suprimento_total,
            sangria_total,
            movement_count: movements.len(),
            expected_balance: balance,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cash::repository::RepositoryResult;
    use crate::cash::InMemoryCashRepository;
    use crate::error::RepositoryError;
    use crate::MAX_AMOUNT_CENTS;
    use proptest::prelude::*;

    fn ledger() -> CashLedger<InMemoryCashRepository> {
        CashLedger::new(InMemoryCashRepository::new())
    }

    fn reais(value: i64) -> Money {
        Money::from_cents(value * 100)
    }

    /// Float 100, sale 50, sangria 30.
    fn shift() -> (CashLedger<InMemoryCashRepository>, String) {
        let mut ledger = ledger();
        let session = ledger.open(reais(100), Some("Ana")).unwrap();
        ledger.record_sale(&session.id, reais(50)).unwrap();
        ledger
            .record_movement(&session.id, MovementType::Sangria, reais(30), Some("bank"))
            .unwrap();
        (ledger, session.id)
    }

    #[test]
    fn test_expected_balance_from_movements() {
        let (ledger, id) = shift();
        assert_eq!(ledger.current_expected_balance(&id).unwrap(), reais(120));

        let summary = ledger.summary(&id).unwrap();
        assert_eq!(summary.sales_total, reais(50));
        assert_eq!(summary.sangria_total, reais(30));
        assert_eq!(summary.suprimento_total, Money::zero());
        assert_eq!(summary.movement_count, 2);
    }

    #[test]
    fn test_sangria_above_balance_is_rejected() {
        let (mut ledger, id) = shift();

        let err = ledger
            .record_movement(&id, MovementType::Sangria, reais(200), None)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientBalance { requested, available }
                if requested == reais(200) && available == reais(120)
        ));
        assert_eq!(ledger.current_expected_balance(&id).unwrap(), reais(120));
        assert_eq!(ledger.movements(&id).unwrap().len(), 2);

        // Withdrawing exactly the balance is allowed.
        ledger
            .record_movement(&id, MovementType::Sangria, reais(120), None)
            .unwrap();
        assert_eq!(ledger.current_expected_balance(&id).unwrap(), Money::zero());
    }

    #[test]
    fn test_suprimento_has_no_upper_bound() {
        let (mut ledger, id) = shift();
        ledger
            .record_movement(&id, MovementType::Suprimento, reais(10_000), Some("change"))
            .unwrap();
        assert_eq!(ledger.current_expected_balance(&id).unwrap(), reais(10_120));
    }

    #[test]
    fn test_close_shortage_overage_balanced() {
        for (counted, difference, outcome) in [
            (115, -5, ReconciliationOutcome::Shortage(reais(5))),
            (125, 5, ReconciliationOutcome::Overage(reais(5))),
            (120, 0, ReconciliationOutcome::Balanced),
        ] {
            let (mut ledger, id) = shift();
            let closing = ledger.close(&id, reais(counted), None).unwrap();

            assert_eq!(closing.expected, reais(120));
            assert_eq!(closing.difference.cents(), difference * 100);
            assert_eq!(closing.outcome(), outcome);

            let session = ledger.session(&id).unwrap();
            assert_eq!(session.status, SessionStatus::Closed);
            assert!(session.closed_at.is_some());
            assert_eq!(ledger.closing(&id).unwrap(), Some(closing));
        }
    }

    #[test]
    fn test_double_open_is_rejected() {
        let mut ledger = ledger();
        let first = ledger.open(reais(100), None).unwrap();

        let err = ledger.open(reais(50), None).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SessionAlreadyOpen { ref session_id } if *session_id == first.id
        ));

        ledger.close(&first.id, reais(100), None).unwrap();
        let second = ledger.open(reais(50), None).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(ledger.sessions().unwrap().len(), 2);
    }

    #[test]
    fn test_closed_session_is_read_only() {
        let (mut ledger, id) = shift();
        ledger.close(&id, reais(120), Some("ok")).unwrap();

        assert!(matches!(
            ledger.record_sale(&id, reais(10)),
            Err(CoreError::SessionNotOpen { .. })
        ));
        assert!(matches!(
            ledger.record_movement(&id, MovementType::Suprimento, reais(10), None),
            Err(CoreError::SessionNotOpen { .. })
        ));
        assert!(matches!(
            ledger.close(&id, reais(120), None),
            Err(CoreError::SessionNotOpen { .. })
        ));

        // History stays queryable.
        assert_eq!(ledger.current_expected_balance(&id).unwrap(), reais(120));
        assert_eq!(ledger.movements(&id).unwrap().len(), 2);
        assert!(ledger.open_session().unwrap().is_none());
    }

    #[test]
    fn test_unknown_session() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.record_sale("nope", reais(1)),
            Err(CoreError::SessionNotFound(_))
        ));
        assert!(matches!(
            ledger.current_expected_balance("nope"),
            Err(CoreError::SessionNotFound(_))
        ));
    }

    #[test]
    fn test_amount_validation() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.open(Money::from_cents(-1), None),
            Err(CoreError::Validation(ValidationError::MustNotBeNegative { .. }))
        ));

        let session = ledger.open(Money::zero(), None).unwrap();
        assert!(matches!(
            ledger.record_sale(&session.id, Money::zero()),
            Err(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));
        assert!(matches!(
            ledger.record_movement(&session.id, MovementType::Suprimento, Money::from_cents(-100), None),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.record_movement(&session.id, MovementType::Sale, reais(5), None),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            ledger.close(&session.id, Money::from_cents(-1), None),
            Err(CoreError::Validation(_))
        ));
        assert!(ledger.movements(&session.id).unwrap().is_empty());
    }

    /// A ledger over a store that already holds one movement the ledger
    /// itself would never have written.
    fn corrupted_ledger(
        movement_type: MovementType,
        amount: Money,
    ) -> (CashLedger<InMemoryCashRepository>, String) {
        let mut repo = InMemoryCashRepository::new();
        let session = CashSession::open(reais(10), None);
        repo.save_session(&session).unwrap();
        repo.append_movement(&CashMovement::new(session.id.clone(), movement_type, amount, None))
            .unwrap();

        (CashLedger::new(repo), session.id)
    }

    #[test]
    fn test_non_positive_movement_is_reported_as_corruption() {
        let (ledger, id) = corrupted_ledger(MovementType::Sale, Money::zero());

        assert!(matches!(
            ledger.current_expected_balance(&id),
            Err(CoreError::CorruptedLedger { .. })
        ));
    }

    #[test]
    fn test_negative_running_balance_is_reported_as_corruption() {
        let (mut ledger, id) = corrupted_ledger(MovementType::Sangria, reais(50));

        assert!(matches!(
            ledger.summary(&id),
            Err(CoreError::CorruptedLedger { .. })
        ));
        // Writes against a corrupted log are refused too.
        assert!(matches!(
            ledger.record_movement(&id, MovementType::Sangria, reais(1), None),
            Err(CoreError::CorruptedLedger { .. })
        ));
        assert!(matches!(
            ledger.close(&id, reais(10), None),
            Err(CoreError::CorruptedLedger { .. })
        ));
    }

    /// Store that files every movement under the first session it saw.
    #[derive(Default)]
    struct MisfilingRepository {
        inner: InMemoryCashRepository,
        first_session: Option<String>,
    }

    impl MisfilingRepository {
        fn key(&self) -> String {
            self.first_session.clone().unwrap_or_default()
        }
    }

    impl CashRepository for MisfilingRepository {
        fn load_open_session(&self) -> RepositoryResult<Option<CashSession>> {
            self.inner.load_open_session()
        }
        fn load_session(&self, id: &str) -> RepositoryResult<Option<CashSession>> {
            self.inner.load_session(id)
        }
        fn list_sessions(&self) -> RepositoryResult<Vec<CashSession>> {
            self.inner.list_sessions()
        }
        fn save_session(&mut self, session: &CashSession) -> RepositoryResult<()> {
            if self.first_session.is_none() {
                self.first_session = Some(session.id.clone());
            }
            self.inner.save_session(session)
        }
        fn load_movements(&self, _id: &str) -> RepositoryResult<Vec<CashMovement>> {
            self.inner.load_movements(&self.key())
        }
        fn append_movement(&mut self, movement: &CashMovement) -> RepositoryResult<()> {
            let misfiled = CashMovement {
                session_id: self.key(),
                ..movement.clone()
            };
            self.inner.append_movement(&misfiled)
        }
        fn save_closing(&mut self, closing: &ClosingReconciliation) -> RepositoryResult<()> {
            self.inner.save_closing(closing)
        }
        fn load_closing(&self, id: &str) -> RepositoryResult<Option<ClosingReconciliation>> {
            self.inner.load_closing(id)
        }
    }

    #[test]
    fn test_foreign_movement_is_reported_as_corruption() {
        let mut ledger = CashLedger::new(MisfilingRepository::default());
        let first = ledger.open(reais(10), None).unwrap();
        ledger.record_sale(&first.id, reais(5)).unwrap();
        ledger.close(&first.id, reais(15), None).unwrap();

        // The second session reads the first session's movements back.
        let second = ledger.open(reais(10), None).unwrap();
        assert!(matches!(
            ledger.current_expected_balance(&second.id),
            Err(CoreError::CorruptedLedger { .. })
        ));
    }

    #[test]
    fn test_inflow_that_would_overflow_is_rejected() {
        let mut repo = InMemoryCashRepository::new();
        let session = CashSession::open(Money::from_cents(i64::MAX - 50), None);
        repo.save_session(&session).unwrap();
        let mut ledger = CashLedger::new(repo);

        for movement_type in [MovementType::Suprimento, MovementType::Sale] {
            let result = if movement_type == MovementType::Sale {
                ledger.record_sale(&session.id, Money::from_cents(100))
            } else {
                ledger.record_movement(&session.id, movement_type, Money::from_cents(100), None)
            };
            assert!(matches!(
                result,
                Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
            ));
        }
        assert_eq!(ledger.repository().movement_count(), 0);

        // The session still reconciles.
        let closing = ledger
            .close(&session.id, Money::from_cents(MAX_AMOUNT_CENTS), None)
            .unwrap();
        assert_eq!(closing.expected, Money::from_cents(i64::MAX - 50));
    }

    #[test]
    fn test_oversized_movement_leaves_session_closable() {
        let (mut ledger, id) = shift();
        assert!(matches!(
            ledger.record_movement(&id, MovementType::Suprimento, Money::from_cents(i64::MAX), None),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        ledger
            .record_movement(&id, MovementType::Suprimento, Money::from_cents(MAX_AMOUNT_CENTS), None)
            .unwrap();

        let closing = ledger.close(&id, reais(120), None).unwrap();
        assert_eq!(closing.expected, reais(120) + Money::from_cents(MAX_AMOUNT_CENTS));
    }

    /// Store whose n-th `save_session` call fails.
    struct FlakyRepository {
        inner: InMemoryCashRepository,
        session_saves: usize,
        fail_at: usize,
    }

    impl FlakyRepository {
        fn failing_session_save(fail_at: usize) -> Self {
            FlakyRepository {
                inner: InMemoryCashRepository::new(),
                session_saves: 0,
                fail_at,
            }
        }
    }

    impl CashRepository for FlakyRepository {
        fn load_open_session(&self) -> RepositoryResult<Option<CashSession>> {
            self.inner.load_open_session()
        }
        fn load_session(&self, id: &str) -> RepositoryResult<Option<CashSession>> {
            self.inner.load_session(id)
        }
        fn list_sessions(&self) -> RepositoryResult<Vec<CashSession>> {
            self.inner.list_sessions()
        }
        fn save_session(&mut self, session: &CashSession) -> RepositoryResult<()> {
            self.session_saves += 1;
            if self.session_saves == self.fail_at {
                return Err(RepositoryError::Storage("disk full".to_string()));
            }
            self.inner.save_session(session)
        }
        fn load_movements(&self, id: &str) -> RepositoryResult<Vec<CashMovement>> {
            self.inner.load_movements(id)
        }
        fn append_movement(&mut self, movement: &CashMovement) -> RepositoryResult<()> {
            self.inner.append_movement(movement)
        }
        fn save_closing(&mut self, closing: &ClosingReconciliation) -> RepositoryResult<()> {
            self.inner.save_closing(closing)
        }
        fn load_closing(&self, id: &str) -> RepositoryResult<Option<ClosingReconciliation>> {
            self.inner.load_closing(id)
        }
    }

    #[test]
    fn test_close_retry_after_failed_session_write() {
        // Save #1 opens the session, save #2 is the close.
        let mut ledger = CashLedger::new(FlakyRepository::failing_session_save(2));
        let session = ledger.open(reais(100), None).unwrap();
        ledger.record_sale(&session.id, reais(20)).unwrap();

        let err = ledger.close(&session.id, reais(115), None).unwrap_err();
        assert!(matches!(err, CoreError::Repository(RepositoryError::Storage(_))));
        assert!(ledger.session(&session.id).unwrap().is_open());

        // The retry finishes the close with the count recorded first.
        let closing = ledger.close(&session.id, reais(120), None).unwrap();
        assert_eq!(closing.counted, reais(115));
        assert_eq!(closing.outcome(), ReconciliationOutcome::Shortage(reais(5)));

        let stored = ledger.session(&session.id).unwrap();
        assert_eq!(stored.status, SessionStatus::Closed);
        assert_eq!(stored.closed_at, Some(closing.closed_at));
        assert_eq!(ledger.closing(&session.id).unwrap(), Some(closing));
        assert!(ledger.open_session().unwrap().is_none());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Sale(i64),
        Sangria(i64),
        Suprimento(i64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1i64..50_000).prop_map(Op::Sale),
            (1i64..50_000).prop_map(Op::Sangria),
            (1i64..50_000).prop_map(Op::Suprimento),
        ]
    }

    proptest! {
        /// Property: the expected balance always equals the replayed sum of
        /// accepted movements and never goes negative; rejected sangrias leave
        /// the log untouched.
        #[test]
        fn balance_is_reproducible_from_log(
            float in 0i64..100_000,
            ops in prop::collection::vec(op_strategy(), 0..40),
        ) {
            let mut ledger = ledger();
            let session = ledger.open(Money::from_cents(float), None).unwrap();
            let mut model = float;

            for op in ops {
                match op {
                    Op::Sale(c) => {
                        ledger.record_sale(&session.id, Money::from_cents(c)).unwrap();
                        model += c;
                    }
                    Op::Suprimento(c) => {
                        ledger
                            .record_movement(&session.id, MovementType::Suprimento, Money::from_cents(c), None)
                            .unwrap();
                        model += c;
                    }
                    Op::Sangria(c) => {
                        let result = ledger.record_movement(
                            &session.id,
                            MovementType::Sangria,
                            Money::from_cents(c),
                            None,
                        );
                        if c > model {
                            let rejected = matches!(result, Err(CoreError::InsufficientBalance { .. }));
                            prop_assert!(rejected);
                        } else {
                            prop_assert!(result.is_ok());
                            model -= c;
                        }
                    }
                }

                let balance = ledger.current_expected_balance(&session.id).unwrap();
                prop_assert_eq!(balance.cents(), model);
                prop_assert!(!balance.is_negative());
            }

            let replayed: Money = ledger
                .movements(&session.id)
                .unwrap()
                .iter()
                .map(CashMovement::signed_amount)
                .sum::<Money>()
                + Money::from_cents(float);
            prop_assert_eq!(replayed.cents(), model);
        }
    }
}
