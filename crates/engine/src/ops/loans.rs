use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    BankId, EngineError, InterestRate, LedgerEntry, LoanApplication, LoanDecision, LoanId,
    LoanRequest, ResultEngine, SchemeId, TransactionKind, TransactionRefs, UserId, policy,
};

use super::Engine;

/// Price preview shown before applying.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub bank_id: BankId,
    pub scheme_id: SchemeId,
    pub base_rate: InterestRate,
    pub rate: InterestRate,
    pub monthly_payment: i64,
}

impl Engine {
    /// Current dynamic rate for `user_id` on a scheme, without applying.
    pub async fn quote_loan(
        &self,
        user_id: UserId,
        bank_id: BankId,
        scheme_id: SchemeId,
        amount: i64,
    ) -> ResultEngine<LoanQuote> {
        let scheme = self.catalog.scheme(bank_id, scheme_id)?;
        let user = self.ledger.user(user_id).await?;
        Ok(LoanQuote {
            bank_id,
            scheme_id,
            base_rate: scheme.base_rate,
            rate: policy::compute_loan_rate(scheme.base_rate, &user),
            monthly_payment: policy::estimate_monthly_payment(amount),
        })
    }

    /// Submits a loan application.
    ///
    /// The rate is priced from the balance and black points read under the
    /// user's lock and frozen on the application. No credits move.
    pub async fn apply_for_loan(&self, request: LoanRequest) -> ResultEngine<LoanApplication> {
        let LoanRequest {
            user_id,
            bank_id,
            scheme_id,
            amount,
        } = request;

        if amount <= 0 {
            return Err(EngineError::InvalidAmount(
                "loan amount must be > 0".to_string(),
            ));
        }
        let scheme = self.catalog.scheme(bank_id, scheme_id)?;
        if let Some(max_amount) = scheme.max_amount
            && amount > max_amount
        {
            return Err(EngineError::ExceedsSchemeLimit(format!(
                "maximum loan amount for {} is {max_amount}",
                scheme.name
            )));
        }

        let account = self.ledger.lock(user_id).await?;
        let rate = policy::compute_loan_rate(scheme.base_rate, &account.user);
        let application = self.loans.lock().await.submit(
            user_id,
            bank_id,
            scheme_id,
            amount,
            rate,
            Utc::now(),
        );
        drop(account);

        tracing::info!(
            user_id = %user_id,
            application_id = %application.id,
            principal = amount,
            rate = %rate,
            "loan application submitted"
        );
        Ok(application)
    }

    /// Records the bank's decision on a pending application.
    ///
    /// Approval pays the principal out as a `loan_disbursement` credit in the
    /// same commit as the status change.
    pub async fn review_loan(
        &self,
        application_id: LoanId,
        decision: LoanDecision,
    ) -> ResultEngine<LoanApplication> {
        let user_id = self.loans.lock().await.ensure_pending(application_id)?.user_id;

        // user account first, then the book
        let mut account = self.ledger.lock(user_id).await?;
        let mut book = self.loans.lock().await;
        let application = book.ensure_pending(application_id)?.clone();
        let now = Utc::now();

        let disbursement = match decision {
            LoanDecision::Reject => None,
            LoanDecision::Approve => {
                let scheme = self
                    .catalog
                    .scheme(application.bank_id, application.scheme_id)?;
                let entry = LedgerEntry::credit(
                    TransactionKind::LoanDisbursement,
                    application.principal,
                    format!("Loan disbursement - {}", scheme.name),
                    TransactionRefs::loan(application_id),
                )?;
                account.preview([&entry])?;
                let mut posted = self.ledger.post(&mut account, vec![entry], now)?;
                posted.pop().map(|tx| tx.id)
            }
        };

        let decided = book.decide(application_id, decision, now, disbursement)?;
        tracing::info!(
            user_id = %user_id,
            application_id = %application_id,
            status = decided.status.as_str(),
            "loan application reviewed"
        );
        Ok(decided)
    }

    pub async fn loan_application(&self, application_id: LoanId) -> ResultEngine<LoanApplication> {
        self.loans.lock().await.get(application_id).cloned()
    }

    /// Applications submitted by `user_id`, oldest first.
    pub async fn applications_for_user(
        &self,
        user_id: UserId,
    ) -> ResultEngine<Vec<LoanApplication>> {
        if !self.ledger.contains(user_id) {
            return Err(EngineError::UnknownUser(user_id.to_string()));
        }
        Ok(self.loans.lock().await.for_user(user_id))
    }
}
