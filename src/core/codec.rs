//! Delimited text <-> [`RecordSet`].

use crate::domain::model::{Record, RecordSet, RejectedRecord, Value};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use std::collections::HashSet;

/// 解析整份 CSV。標題列決定欄位；欄位數不一致、編碼錯誤或沒有標題列都算失敗。
pub fn parse_csv(data: &[u8], delimiter: u8) -> Result<RecordSet, String> {
    check_quoting(data, delimiter)?;

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err("file is empty, no header row found".to_string());
    }

    let mut seen = HashSet::new();
    if let Some(duplicate) = headers.iter().find(|h| !seen.insert(h.as_str())) {
        return Err(format!("duplicate column '{}' in header row", duplicate));
    }

    let mut records = RecordSet::new(headers);
    for result in reader.records() {
        let row = result.map_err(|e| e.to_string())?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        records.records.push(Record {
            line,
            values: row.iter().map(Value::from_field).collect(),
        });
    }

    Ok(records)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// `csv` 會把未閉合的引號吞到檔尾、把 `"x"junk` 接成 `xjunk`，這裡先拒絕這兩種輸入。
/// 未加引號欄位中間的 `"` 照原樣保留。
fn check_quoting(data: &[u8], delimiter: u8) -> Result<(), String> {
    let mut state = QuoteState::FieldStart;
    let mut line = 1u64;
    let mut quote_line = 1u64;

    for &byte in data {
        let is_terminator = byte == b'\n' || byte == b'\r';
        state = match state {
            QuoteState::FieldStart | QuoteState::Unquoted if byte == delimiter || is_terminator => {
                QuoteState::FieldStart
            }
            QuoteState::FieldStart if byte == b'"' => {
                quote_line = line;
                QuoteState::Quoted
            }
            QuoteState::FieldStart | QuoteState::Unquoted => QuoteState::Unquoted,
            QuoteState::Quoted if byte == b'"' => QuoteState::QuoteInQuoted,
            QuoteState::Quoted => QuoteState::Quoted,
            // `""` 是跳脫的引號
            QuoteState::QuoteInQuoted if byte == b'"' => QuoteState::Quoted,
            QuoteState::QuoteInQuoted if byte == delimiter || is_terminator => {
                QuoteState::FieldStart
            }
            QuoteState::QuoteInQuoted => {
                return Err(format!(
                    "unexpected character {:?} after closing quote on line {}",
                    byte as char, line
                ));
            }
        };
        if byte == b'\n' {
            line += 1;
        }
    }

    if state == QuoteState::Quoted {
        return Err(format!(
            "unterminated quoted field starting on line {}",
            quote_line
        ));
    }
    Ok(())
}

/// 輸出 CSV：標題列加資料列，不輸出列索引
pub fn render_csv(records: &RecordSet, delimiter: u8) -> Result<Vec<u8>, String> {
    let formats = records.datetime_formats();
    let mut writer = writer(delimiter);

    writer
        .write_record(&records.headers)
        .map_err(|e| e.to_string())?;
    for record in &records.records {
        let fields: Vec<String> = record
            .values
            .iter()
            .zip(&formats)
            .map(|(value, format)| render_value(value, format))
            .collect();
        writer.write_record(&fields).map_err(|e| e.to_string())?;
    }

    writer.into_inner().map_err(|e| e.to_string())
}

/// 隔離檔：原始欄位加上 `line` 與 `error`
pub fn render_rejected(
    headers: &[String],
    rejected: &[RejectedRecord],
    delimiter: u8,
) -> Result<Vec<u8>, String> {
    let mut writer = writer(delimiter);

    let mut header_row: Vec<&str> = headers.iter().map(String::as_str).collect();
    header_row.extend(["line", "error"]);
    writer.write_record(&header_row).map_err(|e| e.to_string())?;

    for rejection in rejected {
        let mut fields: Vec<String> = rejection
            .record
            .values
            .iter()
            .map(|value| render_value(value, ""))
            .collect();
        fields.push(rejection.record.line.to_string());
        fields.push(rejection.reason.clone());
        writer.write_record(&fields).map_err(|e| e.to_string())?;
    }

    writer.into_inner().map_err(|e| e.to_string())
}

fn writer(delimiter: u8) -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn render_value(value: &Value, datetime_format: &str) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::DateTime(dt) => dt.format(datetime_format).to_string(),
        Value::Missing => String::new(),
    }
}

/// 最短可還原的十進位表示，至少保留一位小數 (`24.0`)；極大或極小值改用科學記號 (`1e+16`)
pub fn format_float(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => formatted,
        };
    }

    let formatted = value.to_string();
    if formatted.contains('.') {
        formatted
    } else {
        format!("{}.0", formatted)
    }
}
