use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn user_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\+?[0-9]{7,15}|[A-Za-z0-9_-]{1,64})$").expect("user id pattern is valid")
    })
}

/// 用户标识：手机号（可带 +）或系统生成的 id
pub fn validate_user_id(user_id: &str) -> AppResult<()> {
    if !user_id_regex().is_match(user_id) {
        return Err(AppError::ValidationError(format!(
            "Invalid user id '{user_id}'"
        )));
    }
    Ok(())
}
