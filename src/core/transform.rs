//! Column rewrites for the retail sales dataset.
//!
//! Everything here is pure: record set in, record set out, no I/O and no logging.
//! Rewrites run column by column in [`REWRITES`] order, so under the fail policy the
//! reported error is the first failing value of the earliest failing column.

use crate::config::RowErrorPolicy;
use crate::core::dates;
use crate::domain::model::{Record, RecordSet, RejectedRecord, TransformResult, Value};
use crate::utils::error::{EtlError, Result};
use chrono::NaiveDateTime;

pub const CUSTOMER_ID: &str = "Customer ID";
pub const AGE: &str = "Age";
pub const DATE: &str = "Date";
pub const PRICE_PER_UNIT: &str = "Price per Unit";
pub const TOTAL_AMOUNT: &str = "Total Amount";
pub const GENDER: &str = "Gender";

pub const CUSTOMER_ID_PREFIX: &str = "CUST";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRewrite {
    /// 去掉 `CUST` 前綴後轉整數
    CustomerId,
    Integer,
    DateTime,
    Float,
    /// `Male` → `M`, `Female` → `F`
    Gender,
}

pub const REWRITES: [(&str, ColumnRewrite); 6] = [
    (CUSTOMER_ID, ColumnRewrite::CustomerId),
    (AGE, ColumnRewrite::Integer),
    (DATE, ColumnRewrite::DateTime),
    (PRICE_PER_UNIT, ColumnRewrite::Float),
    (TOTAL_AMOUNT, ColumnRewrite::Float),
    (GENDER, ColumnRewrite::Gender),
];

impl ColumnRewrite {
    pub fn apply(self, value: &Value) -> std::result::Result<Value, String> {
        match self {
            ColumnRewrite::CustomerId => match value {
                Value::Integer(id) => Ok(Value::Integer(*id)),
                Value::Text(text) => parse_customer_id(text).map(Value::Integer),
                _ => Err(unexpected(value)),
            },
            ColumnRewrite::Integer => match value {
                Value::Integer(n) => Ok(Value::Integer(*n)),
                Value::Text(text) => coerce_integer(text).map(Value::Integer),
                _ => Err(unexpected(value)),
            },
            ColumnRewrite::DateTime => match value {
                Value::DateTime(dt) => Ok(Value::DateTime(*dt)),
                Value::Text(text) => coerce_datetime(text).map(Value::DateTime),
                _ => Err(unexpected(value)),
            },
            ColumnRewrite::Float => match value {
                Value::Float(f) => Ok(Value::Float(*f)),
                Value::Integer(n) => Ok(Value::Float(*n as f64)),
                Value::Text(text) => coerce_float(text).map(Value::Float),
                _ => Err(unexpected(value)),
            },
            ColumnRewrite::Gender => Ok(substitute_gender(value)),
        }
    }
}

fn unexpected(value: &Value) -> String {
    match value {
        Value::Missing => "value is missing".to_string(),
        other => format!("unexpected value {:?}", other),
    }
}

/// `"CUST1023"` → `1023`
pub fn parse_customer_id(raw: &str) -> std::result::Result<i64, String> {
    let digits = raw
        .trim()
        .strip_prefix(CUSTOMER_ID_PREFIX)
        .ok_or_else(|| format!("missing '{}' prefix", CUSTOMER_ID_PREFIX))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!(
            "expected digits after '{}', found '{}'",
            CUSTOMER_ID_PREFIX, digits
        ));
    }

    digits
        .parse()
        .map_err(|e| format!("customer number out of range: {}", e))
}

/// 整數轉換；小數字串向零截斷 (`"34.9"` → `34`)
pub fn coerce_integer(raw: &str) -> std::result::Result<i64, String> {
    let value = raw.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Ok(n);
    }

    let float: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !float.is_finite() {
        return Err(format!("'{}' is not a finite number", value));
    }

    let truncated = float.trunc();
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(format!("'{}' is out of integer range", value));
    }
    Ok(truncated as i64)
}

/// 標準十進位解析，不處理貨幣符號
pub fn coerce_float(raw: &str) -> std::result::Result<f64, String> {
    let value = raw.trim();
    match value.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(f),
        Ok(_) => Err(format!("'{}' is not a finite number", value)),
        Err(_) => Err(format!("'{}' is not a number", value)),
    }
}

pub fn coerce_datetime(raw: &str) -> std::result::Result<NaiveDateTime, String> {
    dates::parse_datetime(raw).ok_or_else(|| format!("'{}' is not a recognizable date", raw.trim()))
}

/// 只替換 `Male` / `Female`，其他值 (包含缺值) 原樣保留
pub fn substitute_gender(value: &Value) -> Value {
    match value.as_text() {
        Some("Male") => Value::Text("M".to_string()),
        Some("Female") => Value::Text("F".to_string()),
        _ => value.clone(),
    }
}

/// 依序套用所有欄位改寫，回傳新的資料集。
///
/// 缺少必要欄位時直接失敗。值轉換失敗時依 `policy` 決定中止整批
/// 或把該列移到 `rejected`。
pub fn transform_records(data: RecordSet, policy: RowErrorPolicy) -> Result<TransformResult> {
    let mut plan = Vec::with_capacity(REWRITES.len());
    for (column, rewrite) in REWRITES {
        let index = data
            .column_index(column)
            .ok_or_else(|| EtlError::MissingColumnError {
                column: column.to_string(),
            })?;
        plan.push((column, index, rewrite));
    }

    let mut rewritten: Vec<Vec<Value>> = data
        .records
        .iter()
        .map(|record| record.values.clone())
        .collect();
    let mut rejections: Vec<Option<String>> = vec![None; data.records.len()];

    for (column, index, rewrite) in plan {
        for (row, values) in rewritten.iter_mut().enumerate() {
            if rejections[row].is_some() {
                continue;
            }

            match rewrite.apply(&values[index]) {
                Ok(value) => values[index] = value,
                Err(reason) => match policy {
                    RowErrorPolicy::Fail => {
                        let record = &data.records[row];
                        return Err(EtlError::TransformError {
                            column: column.to_string(),
                            line: record.line,
                            value: display_raw(&record.values[index]),
                            reason,
                        });
                    }
                    RowErrorPolicy::Quarantine => {
                        rejections[row] = Some(format!("{}: {}", column, reason));
                    }
                },
            }
        }
    }

    let mut records = RecordSet::new(data.headers.clone());
    let mut rejected = Vec::new();
    for ((record, values), rejection) in data.records.into_iter().zip(rewritten).zip(rejections) {
        match rejection {
            Some(reason) => rejected.push(RejectedRecord { record, reason }),
            None => records.records.push(Record {
                line: record.line,
                values,
            }),
        }
    }

    Ok(TransformResult {
        records,
        source_headers: data.headers,
        rejected,
    })
}

fn display_raw(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Missing => String::new(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADERS: [&str; 7] = [
        "Transaction ID",
        "Customer ID",
        "Gender",
        "Age",
        "Date",
        "Price per Unit",
        "Total Amount",
    ];

    fn record_set(rows: &[[&str; 7]]) -> RecordSet {
        RecordSet {
            headers: HEADERS.iter().map(|h| h.to_string()).collect(),
            records: rows
                .iter()
                .enumerate()
                .map(|(i, row)| Record {
                    line: i as u64 + 2,
                    values: row.iter().map(|field| Value::from_field(field)).collect(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_parse_customer_id() {
        assert_eq!(parse_customer_id("CUST1023"), Ok(1023));
        assert_eq!(parse_customer_id("CUST0001"), Ok(1));
        assert!(parse_customer_id("1023").is_err());
        assert!(parse_customer_id("CUST").is_err());
        assert!(parse_customer_id("CUST12a").is_err());
        assert!(parse_customer_id("CUST-12").is_err());
        assert!(parse_customer_id("cust12").is_err());
    }

    #[test]
    fn test_coerce_integer_truncates_toward_zero() {
        assert_eq!(coerce_integer("34"), Ok(34));
        assert_eq!(coerce_integer(" 45 "), Ok(45));
        assert_eq!(coerce_integer("34.9"), Ok(34));
        assert_eq!(coerce_integer("-2.5"), Ok(-2));
        assert!(coerce_integer("thirty").is_err());
        assert!(coerce_integer("NaN").is_err());
        assert!(coerce_integer("1e30").is_err());
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(coerce_float("4.50"), Ok(4.5));
        assert_eq!(coerce_float("12"), Ok(12.0));
        assert!(coerce_float("$9.99").is_err());
        assert!(coerce_float("inf").is_err());
    }

    #[test]
    fn test_gender_substitution() {
        let text = |s: &str| Value::Text(s.to_string());
        assert_eq!(substitute_gender(&text("Male")), text("M"));
        assert_eq!(substitute_gender(&text("Female")), text("F"));
        assert_eq!(substitute_gender(&text("Other")), text("Other"));
        assert_eq!(substitute_gender(&text("male")), text("male"));
        assert_eq!(substitute_gender(&Value::Missing), Value::Missing);
    }

    #[test]
    fn test_transform_rewrites_typed_columns() {
        let data = record_set(&[
            ["1", "CUST0001", "Male", "34", "2024-01-05", "9.99", "9.99"],
            ["2", "CUST0002", "Female", "45", "2024-01-06", "4.50", "9.00"],
        ]);

        let result = transform_records(data, RowErrorPolicy::Fail).unwrap();
        assert!(result.rejected.is_empty());
        assert_eq!(result.records.headers, HEADERS.map(String::from).to_vec());

        let first = &result.records.records[0].values;
        assert_eq!(first[0], Value::Text("1".to_string()));
        assert_eq!(first[1], Value::Integer(1));
        assert_eq!(first[2], Value::Text("M".to_string()));
        assert_eq!(first[3], Value::Integer(34));
        assert_eq!(
            first[4],
            Value::DateTime(
                NaiveDate::from_ymd_opt(2024, 1, 5)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(first[5], Value::Float(9.99));
        assert_eq!(result.records.records[1].values[6], Value::Float(9.0));
    }

    #[test]
    fn test_missing_column_fails() {
        let mut data = record_set(&[["1", "CUST0001", "Male", "34", "2024-01-05", "1", "1"]]);
        data.headers[1] = "Client".to_string();

        match transform_records(data, RowErrorPolicy::Fail) {
            Err(EtlError::MissingColumnError { column }) => assert_eq!(column, CUSTOMER_ID),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_fail_policy_reports_earliest_column_first() {
        // 第 3 行 Age 錯、第 4 行 Customer ID 錯：先處理 Customer ID 欄
        let data = record_set(&[
            ["1", "CUST0001", "Male", "34", "2024-01-05", "1", "1"],
            ["2", "CUST0002", "Male", "old", "2024-01-05", "1", "1"],
            ["3", "C0003", "Male", "29", "2024-01-05", "1", "1"],
        ]);

        match transform_records(data, RowErrorPolicy::Fail) {
            Err(EtlError::TransformError {
                column, line, value, ..
            }) => {
                assert_eq!(column, CUSTOMER_ID);
                assert_eq!(line, 4);
                assert_eq!(value, "C0003");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_value_fails_coercion() {
        let data = record_set(&[["1", "CUST0001", "Male", "", "2024-01-05", "1", "1"]]);
        let err = transform_records(data, RowErrorPolicy::Fail).unwrap_err();
        assert!(matches!(err, EtlError::TransformError { ref column, .. } if column == AGE));
    }

    #[test]
    fn test_quarantine_policy_keeps_good_rows() {
        let data = record_set(&[
            ["1", "CUST0001", "Male", "34", "2024-01-05", "1", "1"],
            ["2", "CUST0002", "Female", "45", "someday", "1", "1"],
            ["3", "CUST0003", "Other", "29", "2024-01-07", "$3", "3"],
            ["4", "CUST0004", "Female", "51", "2024-01-08", "2", "4"],
        ]);

        let result = transform_records(data, RowErrorPolicy::Quarantine).unwrap();
        let kept: Vec<u64> = result.records.records.iter().map(|r| r.line).collect();
        assert_eq!(kept, vec![2, 5]);

        assert_eq!(result.rejected.len(), 2);
        assert_eq!(result.rejected[0].record.line, 3);
        assert!(result.rejected[0].reason.starts_with("Date:"));
        // 被隔離的列保留原始值
        assert_eq!(
            result.rejected[1].record.values[2],
            Value::Text("Other".to_string())
        );
        assert!(result.rejected[1].reason.starts_with("Price per Unit:"));
    }

    #[test]
    fn test_transform_is_idempotent_on_typed_values() {
        let data = record_set(&[["1", "CUST0007", "Male", "34", "2024-01-05", "2.5", "5"]]);
        let once = transform_records(data, RowErrorPolicy::Fail).unwrap();
        let twice = transform_records(once.records.clone(), RowErrorPolicy::Fail).unwrap();
        assert_eq!(once.records, twice.records);
    }
}
