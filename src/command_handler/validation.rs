// src/command_handler/validation.rs
// ============================================
// Caller validation
// ============================================

use crate::types::CallerId;

/// Whether `caller` is the configured operator
pub fn is_authorized(authorized: CallerId, caller: CallerId) -> bool {
    authorized == caller
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_exact_identity_is_authorized() {
        let operator = CallerId(123456789);
        assert!(is_authorized(operator, CallerId(123456789)));
        assert!(!is_authorized(operator, CallerId(987654321)));
        assert!(!is_authorized(operator, CallerId(-123456789)));
    }
}
