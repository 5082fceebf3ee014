use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::application::AppError;
use crate::domain::{
    cents_from_decimal, cents_to_decimal, parse_date, NewTransaction, Stats, Transaction,
    TransactionId, TransactionType,
};

pub const METHOD_GET_TRANSACTIONS: &str = "db:getTransactions";
pub const METHOD_ADD_TRANSACTION: &str = "db:addTransaction";
pub const METHOD_DELETE_TRANSACTION: &str = "db:deleteTransaction";
pub const METHOD_GET_STATS: &str = "db:getStats";

/// One request line as sent by the front end:
/// `{"id": 1, "method": "db:addTransaction", "params": {...}}`.
/// `id` is an opaque correlation value echoed in the reply.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// A decoded request. Only these four operations cross the bridge.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ListTransactions,
    AddTransaction(AddTransactionParams),
    DeleteTransaction { id: TransactionId },
    GetStats,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddTransactionParams {
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub category: String,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Delete takes either a bare id or `{"id": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeleteParams {
    Bare(TransactionId),
    Object { id: TransactionId },
}

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Not valid JSON, or not a known method.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    App(#[from] AppError),
}

impl BridgeError {
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::InvalidRequest(_) => "invalid_request",
            BridgeError::App(err) => err.kind(),
        }
    }
}

impl Request {
    /// Turn a method name plus raw params into a typed request.
    /// Params of the wrong shape are constraint violations; unknown methods are invalid requests.
    pub fn decode(method: &str, params: Option<Value>) -> Result<Self, BridgeError> {
        let params = params.unwrap_or(Value::Null);
        match method {
            METHOD_GET_TRANSACTIONS => Ok(Request::ListTransactions),
            METHOD_GET_STATS => Ok(Request::GetStats),
            METHOD_ADD_TRANSACTION => serde_json::from_value(params)
                .map(Request::AddTransaction)
                .map_err(|err| invalid_params(method, err)),
            METHOD_DELETE_TRANSACTION => {
                let id = match serde_json::from_value::<DeleteParams>(params) {
                    Ok(DeleteParams::Bare(id)) | Ok(DeleteParams::Object { id }) => id,
                    Err(err) => return Err(invalid_params(method, err)),
                };
                Ok(Request::DeleteTransaction { id })
            }
            other => Err(BridgeError::InvalidRequest(format!("unknown method '{}'", other))),
        }
    }

    pub fn method(&self) -> &'static str {
        match self {
            Request::ListTransactions => METHOD_GET_TRANSACTIONS,
            Request::AddTransaction(_) => METHOD_ADD_TRANSACTION,
            Request::DeleteTransaction { .. } => METHOD_DELETE_TRANSACTION,
            Request::GetStats => METHOD_GET_STATS,
        }
    }
}

fn invalid_params(method: &str, err: serde_json::Error) -> BridgeError {
    AppError::ConstraintViolation(format!("invalid params for {}: {}", method, err)).into()
}

impl AddTransactionParams {
    /// Check the wire values against the data model.
    pub fn into_new_transaction(self) -> Result<NewTransaction, AppError> {
        let transaction_type: TransactionType = self.transaction_type.parse()?;
        let date = parse_date(&self.date)?;
        let amount_cents = cents_from_decimal(self.amount)?;

        Ok(NewTransaction::new(amount_cents, transaction_type, self.category, date)
            .with_description(self.description.unwrap_or_default()))
    }
}

/// Transaction as seen by the front end: decimal amount, `type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: TransactionId,
    pub amount: f64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id,
            amount: cents_to_decimal(tx.amount_cents),
            transaction_type: tx.transaction_type,
            category: tx.category.clone(),
            date: tx.date,
            description: tx.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsView {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
}

/// `balance` is derived from the two decimals actually sent, so
/// `balance == totalIncome - totalExpenses` holds for the receiver.
impl From<Stats> for StatsView {
    fn from(stats: Stats) -> Self {
        let total_income = cents_to_decimal(stats.total_income);
        let total_expenses = cents_to_decimal(stats.total_expenses);
        Self {
            total_income,
            total_expenses,
            balance: total_income - total_expenses,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Transactions(Vec<TransactionView>),
    Transaction(TransactionView),
    Deleted(bool),
    Stats(StatsView),
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}

/// Exactly one of `ok` / `error` is present.
#[derive(Debug, Clone, Serialize)]
pub struct Reply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ok: Option<Payload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl Reply {
    pub fn ok(id: Option<Value>, payload: Payload) -> Self {
        Self {
            id,
            ok: Some(payload),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, err: &BridgeError) -> Self {
        Self {
            id,
            ok: None,
            error: Some(ErrorBody {
                kind: err.kind().to_string(),
                message: err.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_methods_without_params() {
        assert_eq!(
            Request::decode("db:getTransactions", None).unwrap(),
            Request::ListTransactions
        );
        assert_eq!(Request::decode("db:getStats", Some(json!({}))).unwrap(), Request::GetStats);
    }

    #[test]
    fn test_decode_delete_accepts_bare_and_object_id() {
        assert_eq!(
            Request::decode("db:deleteTransaction", Some(json!(7))).unwrap(),
            Request::DeleteTransaction { id: 7 }
        );
        assert_eq!(
            Request::decode("db:deleteTransaction", Some(json!({"id": 8}))).unwrap(),
            Request::DeleteTransaction { id: 8 }
        );
        let err = Request::decode("db:deleteTransaction", Some(json!("seven"))).unwrap_err();
        assert_eq!(err.kind(), "constraint_violation");
    }

    #[test]
    fn test_decode_unknown_method() {
        let err = Request::decode("db:dropTable", None).unwrap_err();
        assert_eq!(err.kind(), "invalid_request");
    }

    #[test]
    fn test_add_params_missing_field_is_constraint_violation() {
        let err = Request::decode(
            "db:addTransaction",
            Some(json!({"amount": 10, "type": "expense", "date": "2024-01-02"})),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "constraint_violation");
    }

    #[test]
    fn test_add_params_conversion() {
        let params: AddTransactionParams = serde_json::from_value(json!({
            "amount": 40.5,
            "type": "expense",
            "category": "Jedzenie",
            "date": "2024-01-02"
        }))
        .unwrap();
        let new = params.into_new_transaction().unwrap();
        assert_eq!(new.amount_cents, 4050);
        assert_eq!(new.transaction_type, TransactionType::Expense);
        assert_eq!(new.description, "");

        let bad_type: AddTransactionParams = serde_json::from_value(json!({
            "amount": 1, "type": "refund", "category": "Inne", "date": "2024-01-02"
        }))
        .unwrap();
        assert!(matches!(
            bad_type.into_new_transaction(),
            Err(AppError::ConstraintViolation(_))
        ));

        let bad_date: AddTransactionParams = serde_json::from_value(json!({
            "amount": 1, "type": "income", "category": "Inne", "date": "yesterday"
        }))
        .unwrap();
        assert!(matches!(
            bad_date.into_new_transaction(),
            Err(AppError::ConstraintViolation(_))
        ));
    }

    #[test]
    fn test_transaction_view_wire_shape() {
        let tx = NewTransaction::new(
            4000,
            TransactionType::Expense,
            "Jedzenie",
            parse_date("2024-01-02").unwrap(),
        )
        .into_transaction(2);
        let value = serde_json::to_value(TransactionView::from(&tx)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 2,
                "amount": 40.0,
                "type": "expense",
                "category": "Jedzenie",
                "date": "2024-01-02",
                "description": ""
            })
        );
    }

    #[test]
    fn test_stats_view_uses_camel_case() {
        let value = serde_json::to_value(StatsView::from(Stats::from_totals(10000, 4000))).unwrap();
        assert_eq!(
            value,
            json!({"totalIncome": 100.0, "totalExpenses": 40.0, "balance": 60.0})
        );

        let view = StatsView::from(Stats::from_totals(30, 10));
        assert_eq!(view.balance, view.total_income - view.total_expenses);
    }

    #[test]
    fn test_add_params_reject_sub_cent_amount() {
        let params: AddTransactionParams = serde_json::from_value(json!({
            "amount": 19.999, "type": "expense", "category": "Zakupy", "date": "2024-01-02"
        }))
        .unwrap();
        let err = params.into_new_transaction().unwrap_err();
        assert!(matches!(err, AppError::ConstraintViolation(_)));
        assert!(err.to_string().contains("one cent"));
    }
}
