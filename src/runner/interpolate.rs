//! Variable interpolation
//!
//! Replaces `${var}` references against the value store, falling back to
//! the process environment. Task bodies are never interpolated — `${...}`
//! in a script belongs to its interpreter — so this only applies to
//! Runfile-side strings such as `workdir`.

use regex::Regex;
use std::collections::HashSet;
use std::env;

use crate::error::{InterpolationError, InterpolationResult};
use crate::runner::values::ValueStore;

/// Interpolate `${var}` references in a string.
///
/// Unknown variables are left as-is; nested references resolve until a
/// fixed point.
pub fn interpolate(s: &str, values: &ValueStore) -> InterpolationResult<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

    let mut result = s.to_string();
    let mut seen = HashSet::new();

    loop {
        let mut changed = false;

        result = re
            .replace_all(&result, |caps: &regex::Captures| {
                let var_name = &caps[1];

                if !seen.insert(var_name.to_string()) {
                    return format!("${{{}}}", var_name);
                }

                if let Some(value) = values.get(var_name) {
                    changed = true;
                    return value.to_string();
                }

                if let Ok(value) = env::var(var_name) {
                    changed = true;
                    return value;
                }

                format!("${{{}}}", var_name)
            })
            .to_string();

        if !changed {
            break;
        }

        if seen.len() > 100 {
            return Err(InterpolationError::RecursiveInterpolation);
        }
    }

    Ok(result)
}

/// Interpolate, erroring on any variable that stays unresolved
pub fn interpolate_strict(s: &str, values: &ValueStore) -> InterpolationResult<String> {
    let result = interpolate(s, values)?;

    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    if let Some(caps) = re.captures(&result) {
        return Err(InterpolationError::UndefinedVariable(caps[1].to_string()));
    }

    Ok(result)
}
