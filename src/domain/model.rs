use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// 單一欄位值。抽取階段只產生 `Text` 與 `Missing`，其餘型別由轉換階段產生。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Missing,
}

impl Value {
    /// 空字串視為缺值
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Value::Missing
        } else {
            Value::Text(field.to_string())
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// 來源檔案中的行號 (1-based，標題列為第 1 行)
    pub line: u64,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RecordSet {
    pub headers: Vec<String>,
    pub records: Vec<Record>,
}

impl RecordSet {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            records: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 決定每個日期欄位的輸出格式：全部是午夜只輸出日期，否則輸出時間，有小數秒再補微秒
    pub fn datetime_formats(&self) -> Vec<&'static str> {
        let mut formats = vec![DATE_ONLY; self.headers.len()];
        for record in &self.records {
            for (index, value) in record.values.iter().enumerate() {
                if let Value::DateTime(dt) = value {
                    let current = formats[index];
                    if dt.nanosecond() != 0 {
                        formats[index] = DATE_TIME_MICROS;
                    } else if current == DATE_ONLY && dt.time() != chrono::NaiveTime::MIN {
                        formats[index] = DATE_TIME;
                    }
                }
            }
        }
        formats
    }
}

const DATE_ONLY: &str = "%Y-%m-%d";
const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";
const DATE_TIME_MICROS: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// 單一被隔離的資料列，保留原始值以便事後修正重跑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub record: Record,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformResult {
    pub records: RecordSet,
    /// 原始標題，配合 `rejected` 寫出隔離檔
    pub source_headers: Vec<String>,
    pub rejected: Vec<RejectedRecord>,
}

/// 一次 ETL 執行的結果摘要
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub rows_extracted: usize,
    pub rows_loaded: usize,
    pub rows_rejected: usize,
    pub destination: std::path::PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn datetime(h: u32, m: u32, s: u32, micro: u32) -> Value {
        Value::DateTime(
            NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_micro_opt(h, m, s, micro)
                .unwrap(),
        )
    }

    fn set_of(values: Vec<Value>) -> RecordSet {
        RecordSet {
            headers: vec!["Date".to_string()],
            records: values
                .into_iter()
                .enumerate()
                .map(|(i, value)| Record {
                    line: i as u64 + 2,
                    values: vec![value],
                })
                .collect(),
        }
    }

    #[test]
    fn test_from_field_treats_empty_as_missing() {
        assert_eq!(Value::from_field(""), Value::Missing);
        assert_eq!(Value::from_field("Male"), Value::Text("Male".to_string()));
    }

    #[test]
    fn test_datetime_formats_follow_column_precision() {
        assert_eq!(
            set_of(vec![datetime(0, 0, 0, 0), Value::Missing]).datetime_formats(),
            vec![DATE_ONLY]
        );
        assert_eq!(
            set_of(vec![datetime(0, 0, 0, 0), datetime(10, 30, 0, 0)]).datetime_formats(),
            vec![DATE_TIME]
        );
        assert_eq!(
            set_of(vec![datetime(10, 30, 0, 0), datetime(0, 0, 0, 250)]).datetime_formats(),
            vec![DATE_TIME_MICROS]
        );
    }
}
