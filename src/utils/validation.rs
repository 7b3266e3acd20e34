use crate::utils::error::{EtlError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 分隔符必須是單一 ASCII 字元，且不能是引號或換行
pub fn validate_delimiter(field_name: &str, delimiter: &str) -> Result<u8> {
    let invalid = |reason: &str| EtlError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: delimiter.to_string(),
        reason: reason.to_string(),
    };

    let bytes = delimiter.as_bytes();
    if bytes.len() != 1 || !bytes[0].is_ascii() {
        return Err(invalid("Delimiter must be a single ASCII character"));
    }

    match bytes[0] {
        b'"' | b'\n' | b'\r' => Err(invalid("Delimiter cannot be a quote or line break")),
        byte => Ok(byte),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field_name.to_string(),
    })
}
