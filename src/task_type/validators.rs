//! Reusable task config validators

use toml::Value;

use super::TaskConfigValidator;
use crate::problem::ConfigProblem;
use crate::quest::TaskConfig;

/// `key` must be present
pub fn required(key: &str, type_name: &str) -> TaskConfigValidator {
    let key = key.to_string();
    let type_name = type_name.to_string();
    Box::new(move |config: &TaskConfig, problems: &mut Vec<ConfigProblem>| {
        if !config.contains_key(&key) {
            problems.push(ConfigProblem::task_missing_field(&key, &type_name));
        }
    })
}

/// `key` must be an integer when present
pub fn integer(key: &str) -> TaskConfigValidator {
    let key = key.to_string();
    Box::new(move |config: &TaskConfig, problems: &mut Vec<ConfigProblem>| {
        if let Some(value) = config.get(&key) {
            if !matches!(value, Value::Integer(_)) {
                problems.push(ConfigProblem::task_invalid_value(&key, "a whole number"));
            }
        }
    })
}

/// `key` must be a boolean when present
pub fn boolean(key: &str) -> TaskConfigValidator {
    let key = key.to_string();
    Box::new(move |config: &TaskConfig, problems: &mut Vec<ConfigProblem>| {
        if let Some(value) = config.get(&key) {
            if !value.is_bool() {
                problems.push(ConfigProblem::task_invalid_value(&key, "true or false"));
            }
        }
    })
}
