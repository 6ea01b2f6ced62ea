//! # POS API
//!
//! Request/response functions the POS, student ledger, admin and reports
//! screens call. Domain errors are translated into an [`ApiError`] whose `kind` the
//! UI switches on to choose a message.

use chrono::{NaiveDate, Utc};
use shared::{
    ApiError, ApiErrorKind, CheckoutQuoteResponse, CheckoutRequest, CheckoutResponse,
    DashboardSummaryResponse, ExportDataResponse, RechargeRequest, RechargeResponse,
    RegisterStudentRequest, SetCardStatusRequest, StudentLedgerResponse, StudentListResponse,
    StudentResponse, WeeklyResetResponse,
};
use tracing::error;

use super::mappers::{StudentMapper, TransactionMapper};
use crate::domain::formatting::{category_label, format_amount};
use crate::domain::student_service::{RegisterStudentCommand, StudentValidationError};
use crate::domain::wallet_ledger::{remaining_limit, CheckoutError, RechargeError};
use crate::storage::{Connection, StudentStorage, TransactionStorage};
use crate::AppState;

pub type ApiResult<T> = Result<T, ApiError>;

pub fn checkout<C: Connection>(state: &AppState<C>, request: CheckoutRequest) -> ApiResult<CheckoutResponse> {
    let store = request.store;
    let cart = TransactionMapper::to_domain_cart(request.lines, store);

    let receipt = state
        .pos_service
        .checkout(&request.card_number, store, &cart)
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    Ok(CheckoutResponse {
        transaction_id: receipt.transaction.id.clone(),
        receipt_id: receipt.transaction.receipt_id.clone(),
        student_name: receipt.student.name.clone(),
        total: receipt.transaction.amount,
        balance_after: receipt.transaction.balance_after,
        remaining_limit: remaining_limit(&receipt.student, store),
        success_message: format!(
            "{} paid at {}. New balance {}",
            format_amount(receipt.transaction.amount, &state.currency_symbol),
            category_label(store),
            format_amount(receipt.transaction.balance_after, &state.currency_symbol)
        ),
    })
}

pub fn quote<C: Connection>(state: &AppState<C>, request: CheckoutRequest) -> ApiResult<CheckoutQuoteResponse> {
    let cart = TransactionMapper::to_domain_cart(request.lines, request.store);
    let quote = state
        .pos_service
        .quote(&request.card_number, request.store, &cart)
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    Ok(CheckoutQuoteResponse {
        student_name: quote.student.name,
        total: quote.total,
        wallet_balance: quote.student.wallet_balance,
        remaining_limit: quote.remaining_limit,
        can_checkout: quote.can_checkout,
    })
}

pub fn recharge<C: Connection>(state: &AppState<C>, request: RechargeRequest) -> ApiResult<RechargeResponse> {
    let receipt = state
        .pos_service
        .recharge(&request.card_number, request.amount)
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    Ok(RechargeResponse {
        receipt_id: receipt.transaction.receipt_id.clone(),
        student_name: receipt.student.name.clone(),
        amount: receipt.transaction.amount,
        balance_after: receipt.student.wallet_balance,
        success_message: format!(
            "{} added to {}'s wallet",
            format_amount(receipt.transaction.amount, &state.currency_symbol),
            receipt.student.name
        ),
    })
}

pub fn list_students<C: Connection>(state: &AppState<C>) -> ApiResult<StudentListResponse> {
    let students = state
        .student_service
        .list_students()
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;
    Ok(StudentListResponse {
        students: students.iter().map(StudentMapper::to_dto).collect(),
    })
}

pub fn register_student<C: Connection>(
    state: &AppState<C>,
    request: RegisterStudentRequest,
) -> ApiResult<StudentResponse> {
    let student = state
        .student_service
        .register_student(RegisterStudentCommand {
            name: request.name,
            class_name: request.class_name,
            card_number: request.card_number,
            opening_balance: request.opening_balance,
            weekly_spending_limits: request.weekly_spending_limits,
        })
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    Ok(StudentResponse {
        success_message: format!("{} registered to card {}", student.name, student.card_number),
        student: StudentMapper::to_dto(&student),
    })
}

pub fn set_card_status<C: Connection>(
    state: &AppState<C>,
    request: SetCardStatusRequest,
) -> ApiResult<StudentResponse> {
    let known = state
        .student_service
        .get_student(&request.student_id)
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;
    if known.is_none() {
        return Err(ApiError {
            kind: ApiErrorKind::StudentNotFound,
            message: format!("No student with ID {}.", request.student_id),
        });
    }

    let student = state
        .student_service
        .set_active(&request.student_id, request.is_active)
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    Ok(StudentResponse {
        success_message: format!(
            "Card {} {}",
            student.card_number,
            if student.is_active { "unblocked" } else { "blocked" }
        ),
        student: StudentMapper::to_dto(&student),
    })
}

/// Start a new spending week for every student
pub fn reset_weekly_spending<C: Connection>(state: &AppState<C>) -> ApiResult<WeeklyResetResponse> {
    let students_reset = state
        .student_service
        .reset_weekly_spending_all()
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    Ok(WeeklyResetResponse {
        students_reset,
        success_message: format!("Weekly spending reset for {} students", students_reset),
    })
}

pub fn student_ledger<C: Connection>(state: &AppState<C>, card_number: &str) -> ApiResult<StudentLedgerResponse> {
    let ledger = state
        .student_service
        .find_by_card(card_number)
        .and_then(|student| state.report_service.student_ledger(&student.id))
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    Ok(StudentLedgerResponse {
        student: StudentMapper::to_dto(&ledger.student),
        transactions: ledger.transactions.iter().map(TransactionMapper::to_dto).collect(),
    })
}

pub fn dashboard_summary<C: Connection>(
    state: &AppState<C>,
    date: NaiveDate,
) -> ApiResult<DashboardSummaryResponse> {
    let summary = state
        .report_service
        .dashboard_summary(date)
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    Ok(DashboardSummaryResponse {
        date: summary.date.format("%Y-%m-%d").to_string(),
        purchases_today: summary.purchases_today,
        revenue_today: summary.revenue_today,
        revenue_by_store: summary.revenue_by_store,
        total_wallet_balance: summary.total_wallet_balance,
        active_students: summary.active_students,
    })
}

pub fn export_transactions<C: Connection>(state: &AppState<C>) -> ApiResult<ExportDataResponse> {
    let students = state
        .connection
        .create_student_repository()
        .list_students()
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;
    let transactions = state
        .connection
        .create_transaction_repository()
        .list_all_transactions()
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    let export = state
        .export_service
        .export_transactions_csv(&transactions, &students, Utc::now())
        .map_err(|e| to_api_error(e, &state.currency_symbol))?;

    Ok(ExportDataResponse {
        csv_content: export.csv_content,
        filename: export.filename,
        transaction_count: export.transaction_count,
    })
}

/// Map a service error onto the tag and message shown to the cashier
pub fn to_api_error(err: anyhow::Error, currency_symbol: &str) -> ApiError {
    if let Some(checkout_err) = err.downcast_ref::<CheckoutError>() {
        let (kind, message) = match checkout_err {
            CheckoutError::InactiveCard => (
                ApiErrorKind::InactiveCard,
                "This card is blocked. Please see the school office.".to_string(),
            ),
            CheckoutError::EmptyCart => (
                ApiErrorKind::EmptyCart,
                "Add at least one item before checking out.".to_string(),
            ),
            CheckoutError::InsufficientBalance { balance, total } => (
                ApiErrorKind::InsufficientBalance,
                format!(
                    "Insufficient balance: {} available, {} required.",
                    format_amount(*balance, currency_symbol),
                    format_amount(*total, currency_symbol)
                ),
            ),
            CheckoutError::SpendingLimitExceeded { category, remaining } => (
                ApiErrorKind::SpendingLimitExceeded,
                format!(
                    "Weekly {} limit reached. Only {} left this week.",
                    category_label(*category),
                    format_amount(*remaining, currency_symbol)
                ),
            ),
            CheckoutError::StudentNotFound { card_number } => (
                ApiErrorKind::StudentNotFound,
                format!("No student is registered to card {}.", card_number),
            ),
            CheckoutError::InvalidCartLine { .. } | CheckoutError::AmountOverflow => {
                (ApiErrorKind::InvalidRequest, checkout_err.to_string())
            }
        };
        return ApiError { kind, message };
    }

    if err.downcast_ref::<RechargeError>().is_some() || err.downcast_ref::<StudentValidationError>().is_some()
    {
        return ApiError {
            kind: ApiErrorKind::InvalidRequest,
            message: err.to_string(),
        };
    }

    error!("Unexpected backend error: {:#}", err);
    ApiError {
        kind: ApiErrorKind::Internal,
        message: "Something went wrong. Please try again.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PosConfig;
    use crate::initialize_backend;
    use crate::storage::fixtures::mock_students;
    use crate::storage::MemoryConnection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use shared::StoreCategory;

    fn create_test_state() -> AppState<MemoryConnection> {
        initialize_backend(MemoryConnection::with_students(mock_students()), &PosConfig::default())
    }

    fn checkout_request(card_number: &str, price: Decimal, quantity: u32) -> CheckoutRequest {
        CheckoutRequest {
            card_number: card_number.to_string(),
            store: StoreCategory::TuckShop,
            lines: vec![TransactionMapper::cart_line_request("pie", "Meat pie", price, quantity)],
        }
    }

    #[test]
    fn test_checkout_success_response() {
        let state = create_test_state();

        let response = checkout(&state, checkout_request("RFID-0001", dec!(15), 2)).unwrap();

        assert_eq!(response.student_name, "Thabo Nkosi");
        assert_eq!(response.total, dec!(30));
        assert_eq!(response.balance_after, dec!(420));
        assert_eq!(response.remaining_limit, dec!(35));
        assert_eq!(response.success_message, "R30.00 paid at Tuck Shop. New balance R420.00");
    }

    #[test]
    fn test_checkout_error_kinds() {
        let state = create_test_state();

        let err = checkout(&state, checkout_request("RFID-0001", dec!(1000), 1)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InsufficientBalance);
        assert_eq!(err.message, "Insufficient balance: R450.00 available, R1000.00 required.");

        let err = checkout(&state, checkout_request("RFID-0001", dec!(70), 1)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::SpendingLimitExceeded);
        assert!(err.message.contains("R65.00"));

        let err = checkout(&state, checkout_request("RFID-0004", dec!(5), 1)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InactiveCard);

        let err = checkout(&state, checkout_request("RFID-0001", dec!(0), 1)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::EmptyCart);

        let err = checkout(&state, checkout_request("RFID-0001", dec!(5), 0)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InvalidRequest);

        let err = checkout(&state, checkout_request("RFID-XXXX", dec!(5), 1)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::StudentNotFound);

        let err = checkout(&state, checkout_request("RFID-0001", Decimal::MAX, 2)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InvalidRequest);
        assert_eq!(err.message, "Cart total is too large");
    }

    #[test]
    fn test_state_clones_share_storage() {
        let state = create_test_state();
        let other = state.clone();

        checkout(&other, checkout_request("RFID-0001", dec!(30), 1)).unwrap();

        let ledger = student_ledger(&state, "RFID-0001").unwrap();
        assert_eq!(ledger.student.wallet_balance, dec!(420));
    }

    #[test]
    fn test_register_then_checkout() {
        let state = create_test_state();

        let response = register_student(
            &state,
            RegisterStudentRequest {
                name: "Naledi Mokoena".to_string(),
                class_name: "Grade 11A".to_string(),
                card_number: "RFID-0100".to_string(),
                opening_balance: dec!(60),
                weekly_spending_limits: None,
            },
        )
        .unwrap();
        assert_eq!(response.student.weekly_spending_limits.tuck_shop, dec!(150));
        assert_eq!(response.success_message, "Naledi Mokoena registered to card RFID-0100");

        let receipt = checkout(&state, checkout_request("RFID-0100", dec!(12.50), 2)).unwrap();
        assert_eq!(receipt.balance_after, dec!(35));

        let err = register_student(
            &state,
            RegisterStudentRequest {
                name: "Someone Else".to_string(),
                class_name: "Grade 11A".to_string(),
                card_number: "RFID-0100".to_string(),
                opening_balance: dec!(0),
                weekly_spending_limits: None,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InvalidRequest);
    }

    #[test]
    fn test_set_card_status() {
        let state = create_test_state();

        let response = set_card_status(
            &state,
            SetCardStatusRequest {
                student_id: "student::1".to_string(),
                is_active: false,
            },
        )
        .unwrap();
        assert!(!response.student.is_active);
        assert_eq!(response.success_message, "Card RFID-0001 blocked");

        let err = checkout(&state, checkout_request("RFID-0001", dec!(5), 1)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::InactiveCard);

        let err = set_card_status(
            &state,
            SetCardStatusRequest {
                student_id: "student::missing".to_string(),
                is_active: true,
            },
        )
        .unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::StudentNotFound);
    }

    #[test]
    fn test_reset_weekly_spending_reopens_limit() {
        let state = create_test_state();
        let err = checkout(&state, checkout_request("RFID-0001", dec!(70), 1)).unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::SpendingLimitExceeded);

        let response = reset_weekly_spending(&state).unwrap();
        assert_eq!(response.students_reset, 4);

        let receipt = checkout(&state, checkout_request("RFID-0001", dec!(70), 1)).unwrap();
        assert_eq!(receipt.remaining_limit, dec!(80));
    }

    #[test]
    fn test_quote() {
        let state = create_test_state();

        let response = quote(&state, checkout_request("RFID-0003", dec!(10), 2)).unwrap();

        // Liam has R15 in the wallet
        assert!(!response.can_checkout);
        assert_eq!(response.total, dec!(20));
        assert_eq!(response.wallet_balance, dec!(15));
        assert_eq!(response.remaining_limit, dec!(150));
    }

    #[test]
    fn test_recharge_then_ledger() {
        let state = create_test_state();

        let response = recharge(
            &state,
            RechargeRequest {
                card_number: "RFID-0003".to_string(),
                amount: dec!(25),
            },
        )
        .unwrap();
        assert_eq!(response.balance_after, dec!(40));
        assert_eq!(response.success_message, "R25.00 added to Liam van der Merwe's wallet");

        checkout(&state, checkout_request("RFID-0003", dec!(10), 2)).unwrap();

        let ledger = student_ledger(&state, "RFID-0003").unwrap();
        assert_eq!(ledger.student.wallet_balance, dec!(20));
        assert_eq!(ledger.transactions.len(), 2);
        assert!(ledger.transactions.iter().any(|t| t.kind == "recharge" && t.store.is_none()));
        assert!(ledger
            .transactions
            .iter()
            .any(|t| t.kind == "purchase" && t.store == Some(StoreCategory::TuckShop) && t.item_count == 2));
    }

    #[test]
    fn test_recharge_invalid_amount() {
        let state = create_test_state();

        let err = recharge(
            &state,
            RechargeRequest {
                card_number: "RFID-0001".to_string(),
                amount: dec!(-5),
            },
        )
        .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::InvalidRequest);
    }

    #[test]
    fn test_dashboard_and_export() {
        let state = create_test_state();
        checkout(&state, checkout_request("RFID-0001", dec!(30), 1)).unwrap();

        let summary = dashboard_summary(&state, Utc::now().date_naive()).unwrap();
        assert_eq!(summary.purchases_today, 1);
        assert_eq!(summary.revenue_today, dec!(30));
        assert_eq!(summary.active_students, 3);

        let export = export_transactions(&state).unwrap();
        assert_eq!(export.transaction_count, 1);
        assert!(export.csv_content.contains("Thabo Nkosi,Grade 8A,purchase,Tuck Shop,30.00,420.00"));
    }

    #[test]
    fn test_list_students() {
        let state = create_test_state();
        let response = list_students(&state).unwrap();
        assert_eq!(response.students.len(), 4);
        assert_eq!(response.students[0].name, "Aisha Patel");
    }
}
