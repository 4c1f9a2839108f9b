//! Code normalisation and format rules.
//!
//! Codes are trimmed and upper-cased before checking. Child codes must extend
//! their parent's code: `GH-001` → `GH-001-NORTH` → `GH-001-NORTH-L01` →
//! `GH-001-NORTH-L01-B1`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ServiceError;

static CODE_CHARSET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9_-]+$").expect("code pattern is a valid regex"));

/// Allowed length range (inclusive) per level.
const WAREHOUSE_LEN: (usize, usize) = (2, 20);
const AREA_LEN: (usize, usize) = (2, 50);
const LOCATION_LEN: (usize, usize) = (2, 100);
const BIN_LEN: (usize, usize) = (2, 100);
const BIN_TYPE_LEN: (usize, usize) = (2, 50);

pub fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

fn check(entity: &str, code: &str, (min, max): (usize, usize)) -> Result<(), ServiceError> {
    let len = code.chars().count();
    if len < min || len > max {
        return Err(ServiceError::ValidationError(format!(
            "{} code '{}' must be {}-{} characters",
            entity, code, min, max
        )));
    }
    if !CODE_CHARSET.is_match(code) {
        return Err(ServiceError::ValidationError(format!(
            "{} code '{}' may only contain A-Z, 0-9, '_' and '-'",
            entity, code
        )));
    }
    Ok(())
}

fn check_prefix(entity: &str, code: &str, parent_code: &str) -> Result<(), ServiceError> {
    let suffix = code
        .strip_prefix(parent_code)
        .and_then(|rest| rest.strip_prefix('-'));
    match suffix {
        Some(segment) if !segment.is_empty() => Ok(()),
        _ => Err(ServiceError::ValidationError(format!(
            "{} code '{}' must start with '{}-' followed by its own segment",
            entity, code, parent_code
        ))),
    }
}

pub fn warehouse_code(raw: &str) -> Result<String, ServiceError> {
    let code = normalize(raw);
    check("warehouse", &code, WAREHOUSE_LEN)?;
    Ok(code)
}

pub fn bin_type_code(raw: &str) -> Result<String, ServiceError> {
    let code = normalize(raw);
    check("storage bin type", &code, BIN_TYPE_LEN)?;
    Ok(code)
}

pub fn area_code(raw: &str, warehouse_code: &str) -> Result<String, ServiceError> {
    let code = normalize(raw);
    check("storage area", &code, AREA_LEN)?;
    check_prefix("storage area", &code, warehouse_code)?;
    Ok(code)
}

pub fn location_code(raw: &str, area_code: &str) -> Result<String, ServiceError> {
    let code = normalize(raw);
    check("storage location", &code, LOCATION_LEN)?;
    check_prefix("storage location", &code, area_code)?;
    Ok(code)
}

pub fn bin_code(raw: &str, location_code: &str) -> Result<String, ServiceError> {
    let code = normalize(raw);
    check("storage bin", &code, BIN_LEN)?;
    check_prefix("storage bin", &code, location_code)?;
    Ok(code)
}
