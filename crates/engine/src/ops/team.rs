//! Employer-only operations.
//!
//! They are reachable only through an [`EmployerScope`], which the engine
//! hands out for employers and refuses for everybody else.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    AttendanceMark, EngineError, LedgerEntry, PenaltyCmd, ResultEngine, Transaction,
    TransactionKind, TransactionRefs, User, UserId,
    policy::{self, AttendanceStatus, CreditStanding, RiskLevel},
};

use super::Engine;

/// One employee as seen from the employer dashboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub user: User,
    pub attendance_status: AttendanceStatus,
    pub risk: RiskLevel,
    pub standing: CreditStanding,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamOverview {
    pub employer_id: UserId,
    pub employer_balance: i64,
    pub members: Vec<TeamMember>,
}

/// Capability to act as a given employer.
#[derive(Clone, Copy, Debug)]
pub struct EmployerScope<'a> {
    engine: &'a Engine,
    employer: &'a User,
}

impl Engine {
    /// Scope for employer-only operations. Fails with
    /// [`EngineError::UnauthorizedAction`] when `employer_id` is an
    /// employee.
    pub fn employer(&self, employer_id: UserId) -> ResultEngine<EmployerScope<'_>> {
        let employer = self.catalog.user(employer_id)?;
        if !employer.is_employer() {
            return Err(EngineError::UnauthorizedAction(format!(
                "user {employer_id} is not an employer"
            )));
        }
        Ok(EmployerScope {
            engine: self,
            employer,
        })
    }

    pub async fn team_overview(&self, employer_id: UserId) -> ResultEngine<TeamOverview> {
        self.employer(employer_id)?.team_overview().await
    }
}

impl EmployerScope<'_> {
    pub fn employer_id(&self) -> UserId {
        self.employer.id
    }

    pub fn roster(&self) -> &[UserId] {
        self.employer.roster()
    }

    fn ensure_on_roster(&self, employee_id: UserId) -> ResultEngine<()> {
        if self.roster().contains(&employee_id) {
            return Ok(());
        }
        // distinguish a stranger from a user that does not exist at all
        self.engine.catalog.user(employee_id)?;
        Err(EngineError::UnauthorizedAction(format!(
            "user {employee_id} is not on the roster of employer {}",
            self.employer.id
        )))
    }

    async fn credit(
        &self,
        employee_id: UserId,
        kind: TransactionKind,
        amount: i64,
        description: String,
    ) -> ResultEngine<Transaction> {
        self.ensure_on_roster(employee_id)?;
        let entry = LedgerEntry::credit(kind, amount, description, TransactionRefs::default())?;
        self.engine.apply_transaction(employee_id, entry).await
    }

    /// Sends bonus credits to an employee. The employer's own balance is
    /// not debited.
    pub async fn reward(&self, employee_id: UserId, amount: i64) -> ResultEngine<Transaction> {
        let description = format!("Reward from {}", self.employer.name);
        self.credit(employee_id, TransactionKind::Reward, amount, description)
            .await
    }

    pub async fn pay_salary(&self, employee_id: UserId, amount: i64) -> ResultEngine<Transaction> {
        self.credit(
            employee_id,
            TransactionKind::Salary,
            amount,
            "Monthly Salary Payment".to_string(),
        )
        .await
    }

    /// Debits the employee and adds black points; both effects commit
    /// together or not at all.
    pub async fn penalize(&self, cmd: PenaltyCmd) -> ResultEngine<Transaction> {
        let PenaltyCmd {
            employee_id,
            amount,
            points,
            note,
        } = cmd;
        self.ensure_on_roster(employee_id)?;

        let entry = LedgerEntry::debit(
            TransactionKind::Penalty,
            amount,
            note.unwrap_or_else(|| "Black Points Penalty".to_string()),
            TransactionRefs::default(),
        )?;

        let mut account = self.engine.ledger.lock(employee_id).await?;
        account.preview([&entry])?;
        let new_points = next_black_points(&account.user, points)?;

        let tx = self
            .engine
            .ledger
            .post(&mut account, vec![entry], Utc::now())?
            .pop()
            .ok_or_else(|| EngineError::InvalidAmount("nothing to apply".to_string()))?;
        if let Some(record) = account.user.employee_mut() {
            record.black_points = new_points;
        }

        tracing::info!(
            employer_id = %self.employer.id,
            employee_id = %employee_id,
            amount,
            black_points = new_points,
            "employee penalized"
        );
        Ok(tx)
    }

    /// Adds black points without moving credits.
    pub async fn assign_black_points(&self, employee_id: UserId, points: u32) -> ResultEngine<User> {
        self.ensure_on_roster(employee_id)?;
        if points == 0 {
            return Err(EngineError::InvalidAmount(
                "black points must be > 0".to_string(),
            ));
        }
        let mut account = self.engine.ledger.lock(employee_id).await?;
        let new_points = next_black_points(&account.user, points)?;
        if let Some(record) = account.user.employee_mut() {
            record.black_points = new_points;
        }
        Ok(account.user.clone())
    }

    /// Marks today's attendance for an employee.
    pub async fn record_attendance(
        &self,
        employee_id: UserId,
        mark: AttendanceMark,
    ) -> ResultEngine<User> {
        self.ensure_on_roster(employee_id)?;
        let mut account = self.engine.ledger.lock(employee_id).await?;
        let record = account.user.employee_mut().ok_or_else(|| {
            EngineError::UnauthorizedAction(format!("user {employee_id} is not an employee"))
        })?;
        record.last_attendance = Some(mark);
        tracing::debug!(employee_id = %employee_id, mark = mark.as_str(), "attendance recorded");
        Ok(account.user.clone())
    }

    /// The roster joined with each employee's live ledger state.
    pub async fn team_overview(&self) -> ResultEngine<TeamOverview> {
        let mut members = Vec::with_capacity(self.roster().len());
        for employee_id in self.roster() {
            let user = self.engine.ledger.user(*employee_id).await?;
            let (attendance, black_points) = user
                .employee()
                .map_or((0, 0), |e| (e.attendance, e.black_points));
            members.push(TeamMember {
                attendance_status: policy::classify_attendance(attendance),
                risk: policy::classify_risk(black_points),
                standing: policy::credit_standing(black_points),
                user,
            });
        }
        Ok(TeamOverview {
            employer_id: self.employer.id,
            employer_balance: self.engine.ledger.balance(self.employer.id).await?,
            members,
        })
    }
}

fn next_black_points(user: &User, points: u32) -> ResultEngine<u32> {
    let record = user.employee().ok_or_else(|| {
        EngineError::UnauthorizedAction(format!("user {} is not an employee", user.id))
    })?;
    record
        .black_points
        .checked_add(points)
        .ok_or_else(|| EngineError::InvalidAmount("black points overflow".to_string()))
}
