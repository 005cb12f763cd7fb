use std::sync::Arc;

use engine::{
    AttendanceMark, BankId, Catalog, CauseId, Engine, EngineError, ItemId, LedgerEntry, LoanDecision,
    LoanId, LoanRequest, LoanStatus, PenaltyCmd, PurchaseLine, RosterScan, SchemeId, StallId,
    TransactionKind, TransactionRefs, TracingGreeter, UserId,
    policy::{AttendanceStatus, RiskLevel},
};

const EMPLOYER: UserId = UserId(1);
const ALICE: UserId = UserId(2);
const BOB: UserId = UserId(3);
const DAVID: UserId = UserId(5);

fn demo_engine() -> Engine {
    Engine::builder().build().unwrap()
}

/// Small roster: one employer with two employees, plus a second employer.
fn engine_with_roster(employee_balance: i64, black_points: u32) -> Engine {
    let json = format!(
        r#"{{
            "banks": [{{
                "id": 1, "name": "Smart City Bank",
                "schemes": [
                    {{"id": 1, "name": "Smart Saver", "product": "Savings", "interest": "4.5%", "min_balance": 1000}},
                    {{"id": 2, "name": "Quick Loan", "product": "Personal Loan", "interest": "8.9%", "max_amount": 50000}},
                    {{"id": 3, "name": "Tech Professional Account", "product": "Checking", "interest": "2.1%"}}
                ]
            }}],
            "causes": [
                {{"id": 1, "name": "City Green Initiative", "category": "Environment",
                  "target": 50000, "raised": 23500}}
            ],
            "users": [
                {{"id": 1, "name": "John Manager", "balance": 5000, "role": "employer", "employees": [2, 3]}},
                {{"id": 2, "name": "Alice Smith", "balance": {employee_balance}, "role": "employee",
                  "manager_id": 1, "attendance": 95, "black_points": {black_points}}},
                {{"id": 3, "name": "Bob Johnson", "balance": 890, "role": "employee",
                  "manager_id": 1, "attendance": 88, "black_points": 5}},
                {{"id": 10, "name": "Other Boss", "balance": 0, "role": "employer", "employees": [11]}},
                {{"id": 11, "name": "Eve Stranger", "balance": 0, "role": "employee",
                  "manager_id": 10, "attendance": 70, "black_points": 0}}
            ]
        }}"#
    );
    Engine::builder()
        .catalog(Catalog::from_json(&json).unwrap())
        .build()
        .unwrap()
}

async fn assert_ledger_consistent(engine: &Engine, user_id: UserId) {
    let balance = engine.balance(user_id).await.unwrap();
    let history = engine.history(user_id, None).await.unwrap();
    let sum: i64 = history.iter().map(|tx| tx.amount).sum();
    assert_eq!(sum, balance, "history must sum to the balance");
    if let Some(latest) = history.first() {
        assert_eq!(latest.resulting_balance, balance);
    }
    // oldest first: every record extends the previous running balance
    let mut running = 0;
    for tx in history.iter().rev() {
        running += tx.amount;
        assert_eq!(tx.resulting_balance, running);
    }
    assert!(history.windows(2).all(|w| w[0].id > w[1].id));
}

#[tokio::test]
async fn balance_matches_history_after_mixed_operations() {
    let engine = demo_engine();
    let boss = engine.employer(EMPLOYER).unwrap();

    boss.reward(ALICE, 200).await.unwrap();
    boss.pay_salary(ALICE, 1500).await.unwrap();
    boss.penalize(PenaltyCmd::new(ALICE, 50, 1)).await.unwrap();
    engine
        .purchase(
            ALICE,
            &[PurchaseLine {
                stall_id: StallId(3),
                item_id: ItemId(8),
                quantity: 2,
            }],
        )
        .await
        .unwrap();
    engine.donate(ALICE, CauseId(2), 100).await.unwrap();

    assert_eq!(engine.balance(ALICE).await.unwrap(), 1250 + 200 + 1500 - 50 - 90 - 100);
    assert_ledger_consistent(&engine, ALICE).await;

    let history = engine.history(ALICE, Some(3)).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].kind, TransactionKind::Donation);
    assert_eq!(history[1].kind, TransactionKind::Purchase);
    assert_eq!(history[2].kind, TransactionKind::Penalty);
}

#[tokio::test]
async fn debit_beyond_balance_fails_and_changes_nothing() {
    let engine = demo_engine();
    let entry = LedgerEntry::debit(
        TransactionKind::Purchase,
        1251,
        "Too much",
        TransactionRefs::default(),
    )
    .unwrap();

    let err = engine.apply_transaction(ALICE, entry).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));
    assert_eq!(engine.balance(ALICE).await.unwrap(), 1250);
    assert_eq!(engine.history(ALICE, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_user_is_reported() {
    let engine = demo_engine();
    assert_eq!(
        engine.balance(UserId(99)).await.unwrap_err(),
        EngineError::UnknownUser("99".to_string())
    );
    assert!(matches!(
        engine.donate(UserId(99), CauseId(1), 10).await,
        Err(EngineError::UnknownUser(_))
    ));
}

#[tokio::test]
async fn loan_rate_is_priced_and_frozen() {
    // 300 credits and 6 black points on an 8.9% scheme
    let engine = engine_with_roster(300, 6);
    let application = engine
        .apply_for_loan(LoanRequest::new(ALICE, BankId(1), SchemeId(2), 10_000))
        .await
        .unwrap();
    assert_eq!(application.status, LoanStatus::Pending);
    assert_eq!(application.interest_rate.to_string(), "11.2%");

    // balance and black points move afterwards
    let boss = engine.employer(EMPLOYER).unwrap();
    boss.reward(ALICE, 5_000).await.unwrap();
    boss.assign_black_points(ALICE, 3).await.unwrap();

    let stored = engine.loan_application(application.id).await.unwrap();
    assert_eq!(stored.interest_rate.to_string(), "11.2%");

    // a new application is priced on the new state: 8.9 + 1.5 - 0.5
    let second = engine
        .apply_for_loan(LoanRequest::new(ALICE, BankId(1), SchemeId(2), 10_000))
        .await
        .unwrap();
    assert_ne!(second.id, application.id);
    assert_eq!(second.interest_rate.to_string(), "9.9%");
}

#[tokio::test]
async fn loan_rate_examples_from_user_state() {
    let wealthy = engine_with_roster(3000, 1);
    let app = wealthy
        .apply_for_loan(LoanRequest::new(ALICE, BankId(1), SchemeId(1), 100))
        .await
        .unwrap();
    assert_eq!(app.interest_rate.to_string(), "4.0%");

    let risky = engine_with_roster(100, 9);
    let app = risky
        .apply_for_loan(LoanRequest::new(ALICE, BankId(1), SchemeId(3), 100))
        .await
        .unwrap();
    assert_eq!(app.interest_rate.to_string(), "4.4%");

    let quote = risky
        .quote_loan(ALICE, BankId(1), SchemeId(2), 15_000)
        .await
        .unwrap();
    assert_eq!(quote.rate.to_string(), "11.2%");
    assert_eq!(quote.monthly_payment, 1375);
}

#[tokio::test]
async fn loan_application_validation() {
    let engine = demo_engine();

    let err = engine
        .apply_for_loan(LoanRequest::new(ALICE, BankId(1), SchemeId(2), 0))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine
        .apply_for_loan(LoanRequest::new(ALICE, BankId(1), SchemeId(2), 50_001))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExceedsSchemeLimit(_)));

    let err = engine
        .apply_for_loan(LoanRequest::new(ALICE, BankId(2), SchemeId(2), 100))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    // no limit on savings products
    engine
        .apply_for_loan(LoanRequest::new(ALICE, BankId(1), SchemeId(1), 1_000_000))
        .await
        .unwrap();
}

#[tokio::test]
async fn seeded_applications_are_listed_and_ids_continue() {
    let engine = demo_engine();
    let seeded = engine.applications_for_user(ALICE).await.unwrap();
    assert_eq!(seeded.len(), 1);
    assert_eq!(seeded[0].id, LoanId(1));

    let new = engine
        .apply_for_loan(LoanRequest::new(ALICE, BankId(1), SchemeId(2), 500))
        .await
        .unwrap();
    assert_eq!(new.id, LoanId(3));
    assert_eq!(engine.applications_for_user(ALICE).await.unwrap().len(), 2);
}

#[tokio::test]
async fn approval_disburses_once() {
    let engine = demo_engine();
    let approved = engine
        .review_loan(LoanId(1), LoanDecision::Approve)
        .await
        .unwrap();
    assert_eq!(approved.status, LoanStatus::Approved);
    assert!(approved.decided_at.is_some());
    assert_eq!(engine.balance(ALICE).await.unwrap(), 1250 + 15_000);

    let latest = engine.history(ALICE, Some(1)).await.unwrap();
    assert_eq!(latest[0].kind, TransactionKind::LoanDisbursement);
    assert_eq!(latest[0].refs.loan_application_id, Some(LoanId(1)));
    assert_eq!(approved.disbursement, Some(latest[0].id));

    let err = engine
        .review_loan(LoanId(1), LoanDecision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
    assert_eq!(engine.balance(ALICE).await.unwrap(), 1250 + 15_000);
    assert_ledger_consistent(&engine, ALICE).await;
}

#[tokio::test]
async fn rejection_moves_no_credits() {
    let engine = demo_engine();
    let rejected = engine
        .review_loan(LoanId(1), LoanDecision::Reject)
        .await
        .unwrap();
    assert_eq!(rejected.status, LoanStatus::Rejected);
    assert_eq!(rejected.disbursement, None);
    assert_eq!(engine.balance(ALICE).await.unwrap(), 1250);

    // the seeded approved application is terminal too
    let err = engine
        .review_loan(LoanId(2), LoanDecision::Reject)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition(_)));
}

#[tokio::test]
async fn donation_can_reach_and_overshoot_the_goal() {
    let engine = engine_with_roster(30_000, 0);
    let receipt = engine.donate(ALICE, CauseId(1), 26_500).await.unwrap();
    assert_eq!(receipt.cause.raised, 50_000);
    assert!(receipt.cause.goal_reached);
    assert!(receipt.closed_goal);
    assert_eq!(receipt.transaction.amount, -26_500);
    assert_eq!(receipt.transaction.refs.cause_id, Some(CauseId(1)));

    let engine = engine_with_roster(30_000, 0);
    let receipt = engine.donate(ALICE, CauseId(1), 30_000).await.unwrap();
    assert_eq!(receipt.cause.raised, 53_500);
    assert_eq!(receipt.cause.percentage, 100.0);
    assert_eq!(engine.balance(ALICE).await.unwrap(), 0);

    let summary = engine.donation_summary().await;
    assert_eq!(summary.total_raised, 53_500);
    assert_eq!(summary.causes_completed, 1);
    assert_eq!(summary.causes, engine.causes().await);
    assert_eq!(summary.causes[0].raised, 53_500);
}

#[tokio::test]
async fn failed_donation_leaves_cause_untouched() {
    let engine = demo_engine();
    let err = engine.donate(ALICE, CauseId(1), 1251).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));
    assert_eq!(engine.cause_progress(CauseId(1)).await.unwrap().raised, 23_500);

    let err = engine.donate(ALICE, CauseId(1), 0).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let err = engine.donate(ALICE, CauseId(9), 10).await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(engine.balance(ALICE).await.unwrap(), 1250);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_donation_and_purchase_never_double_spend() {
    for _ in 0..25 {
        let engine = Arc::new(demo_engine());

        // 1000 + 500 > 1250, but each fits on its own
        let donor = Arc::clone(&engine);
        let donation = tokio::spawn(async move { donor.donate(ALICE, CauseId(1), 1000).await });
        let buyer = Arc::clone(&engine);
        let purchase = tokio::spawn(async move {
            buyer
                .purchase(
                    ALICE,
                    &[PurchaseLine {
                        stall_id: StallId(2),
                        item_id: ItemId(6),
                        quantity: 1,
                    }],
                )
                .await
        });

        let donation = donation.await.unwrap();
        let purchase = purchase.await.unwrap();
        assert!(
            donation.is_ok() != purchase.is_ok(),
            "exactly one operation must succeed"
        );

        let balance = engine.balance(ALICE).await.unwrap();
        let raised = engine.cause_progress(CauseId(1)).await.unwrap().raised;
        if donation.is_ok() {
            assert!(matches!(purchase, Err(EngineError::InsufficientBalance(_))));
            assert_eq!(balance, 250);
            assert_eq!(raised, 24_500);
        } else {
            assert!(matches!(donation, Err(EngineError::InsufficientBalance(_))));
            assert_eq!(balance, 750);
            assert_eq!(raised, 23_500);
        }
        assert_ledger_consistent(&engine, ALICE).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rewards_are_not_lost() {
    let engine = Arc::new(demo_engine());
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..100 {
        let engine = Arc::clone(&engine);
        tasks.spawn(async move { engine.employer(EMPLOYER)?.reward(BOB, 1).await });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }
    assert_eq!(engine.balance(BOB).await.unwrap(), 890 + 100);
    assert_ledger_consistent(&engine, BOB).await;
}

#[tokio::test]
async fn penalty_debits_and_adds_black_points() {
    let engine = demo_engine();
    let tx = engine
        .employer(EMPLOYER)
        .unwrap()
        .penalize(PenaltyCmd::new(DAVID, 50, 2).note("Late arrivals"))
        .await
        .unwrap();
    assert_eq!(tx.kind, TransactionKind::Penalty);
    assert_eq!(tx.amount, -50);
    assert_eq!(tx.description, "Late arrivals");

    let david = engine.user(DAVID).await.unwrap();
    assert_eq!(david.balance, 620);
    assert_eq!(david.black_points(), 10);
}

#[tokio::test]
async fn penalty_is_atomic_when_points_cannot_be_added() {
    let engine = engine_with_roster(1000, u32::MAX);
    let err = engine
        .employer(EMPLOYER)
        .unwrap()
        .penalize(PenaltyCmd::new(ALICE, 100, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));

    let alice = engine.user(ALICE).await.unwrap();
    assert_eq!(alice.balance, 1000);
    assert_eq!(alice.black_points(), u32::MAX);
    assert_eq!(engine.history(ALICE, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn penalty_larger_than_balance_adds_no_points() {
    let engine = demo_engine();
    let err = engine
        .employer(EMPLOYER)
        .unwrap()
        .penalize(PenaltyCmd::new(DAVID, 671, 3))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));
    assert_eq!(engine.user(DAVID).await.unwrap().black_points(), 8);
}

#[tokio::test]
async fn employer_operations_are_capability_scoped() {
    let engine = engine_with_roster(1000, 0);

    let err = engine.employer(ALICE).unwrap_err();
    assert!(matches!(err, EngineError::UnauthorizedAction(_)));

    let boss = engine.employer(EMPLOYER).unwrap();
    let err = boss.reward(UserId(11), 10).await.unwrap_err();
    assert!(matches!(err, EngineError::UnauthorizedAction(_)));
    assert_eq!(engine.balance(UserId(11)).await.unwrap(), 0);

    let err = boss.reward(UserId(42), 10).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownUser(_)));

    let err = boss.reward(ALICE, 0).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAmount(_)));
}

#[tokio::test]
async fn reward_does_not_touch_employer_balance() {
    let engine = demo_engine();
    let tx = engine
        .employer(EMPLOYER)
        .unwrap()
        .reward(ALICE, 200)
        .await
        .unwrap();
    assert_eq!(tx.kind, TransactionKind::Reward);
    assert_eq!(tx.resulting_balance, 1450);
    assert_eq!(engine.balance(EMPLOYER).await.unwrap(), 5000);
}

#[tokio::test]
async fn team_overview_joins_live_state() {
    let engine = demo_engine();
    let boss = engine.employer(EMPLOYER).unwrap();
    boss.record_attendance(BOB, AttendanceMark::Absent)
        .await
        .unwrap();
    boss.reward(BOB, 10).await.unwrap();

    let overview = engine.team_overview(EMPLOYER).await.unwrap();
    assert_eq!(overview.employer_balance, 5000);
    assert_eq!(overview.members.len(), 4);

    let bob = overview
        .members
        .iter()
        .find(|m| m.user.id == BOB)
        .unwrap();
    assert_eq!(bob.user.balance, 900);
    assert_eq!(
        bob.user.employee().unwrap().last_attendance,
        Some(AttendanceMark::Absent)
    );
    assert_eq!(bob.attendance_status, AttendanceStatus::Warning);
    assert_eq!(bob.risk, RiskLevel::Warning);

    let david = overview
        .members
        .iter()
        .find(|m| m.user.id == DAVID)
        .unwrap();
    assert_eq!(david.risk, RiskLevel::Critical);

    assert!(matches!(
        engine.team_overview(ALICE).await,
        Err(EngineError::UnauthorizedAction(_))
    ));
}

#[tokio::test]
async fn checkout_commits_one_record_per_line() {
    let engine = demo_engine();
    let mut session = engine.open_checkout(ALICE).unwrap();
    session.add(StallId(3), ItemId(7), 2).unwrap();
    session.add(StallId(5), ItemId(14), 1).unwrap();
    assert_eq!(session.cart().total().unwrap(), 50 + 149);

    let posted = engine.checkout(&mut session).await.unwrap();
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[0].description, "AI Brewed Coffee - Smart Café");
    assert_eq!(posted[0].refs.stall_id, Some(StallId(3)));
    assert_eq!(posted[1].description, "Wireless Earbuds - Tech Accessories");
    assert_eq!(posted[1].resulting_balance, 1250 - 199);
    assert!(session.cart().is_empty());
    assert_ledger_consistent(&engine, ALICE).await;
}

#[tokio::test]
async fn failed_checkout_keeps_the_cart() {
    let engine = demo_engine();
    let mut session = engine.open_checkout(DAVID).unwrap();

    let err = engine.checkout(&mut session).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidCart(_)));

    session.add(StallId(6), ItemId(18), 2).unwrap();
    let err = engine.checkout(&mut session).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientBalance(_)));
    assert!(!session.cart().is_empty());
    assert_eq!(engine.balance(DAVID).await.unwrap(), 670);

    session.set_quantity(StallId(6), ItemId(18), 1).unwrap();
    engine.checkout(&mut session).await.unwrap();
    assert_eq!(engine.balance(DAVID).await.unwrap(), 670 - 399);
}

#[tokio::test]
async fn second_checkout_for_same_user_is_rejected() {
    let engine = demo_engine();
    let session = engine.open_checkout(ALICE).unwrap();
    let err = engine
        .purchase(
            ALICE,
            &[PurchaseLine {
                stall_id: StallId(3),
                item_id: ItemId(7),
                quantity: 1,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::CheckoutInProgress(_)));

    // other users are unaffected
    assert!(engine.open_checkout(BOB).is_ok());

    drop(session);
    assert!(engine.open_checkout(ALICE).is_ok());
}

#[tokio::test]
async fn sign_in_greets_by_role() {
    let engine = demo_engine();
    let signed = engine
        .sign_in(&RosterScan(ALICE), &TracingGreeter)
        .await
        .unwrap();
    assert_eq!(signed.user.id, ALICE);
    assert_eq!(
        signed.greeting,
        "Hello Alice Smith. Your current balance is 1250 credits. Have a productive day!"
    );

    let signed = engine
        .sign_in(&RosterScan(EMPLOYER), &TracingGreeter)
        .await
        .unwrap();
    assert!(signed.greeting.starts_with("Welcome back, John Manager."));

    assert!(matches!(
        engine.sign_in(&RosterScan(UserId(77)), &TracingGreeter).await,
        Err(EngineError::UnknownUser(_))
    ));
}

#[tokio::test]
async fn suggested_donations_follow_balance() {
    let engine = demo_engine();
    assert_eq!(engine.suggested_donations(ALICE).await.unwrap(), [12, 62, 125]);
}
