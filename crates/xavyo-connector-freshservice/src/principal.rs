//! Principal checks shared by the grant and revoke paths.

use tracing::warn;
use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::types::ResourceId;

/// Name used in principal errors.
pub(crate) const CONNECTOR_NAME: &str = "freshservice-connector";

/// Reject `principal` unless it is of resource type `expected`.
pub(crate) fn ensure_principal(
    principal: &ResourceId,
    expected: &str,
    action: &str,
) -> ConnectorResult<()> {
    if principal.resource_type == expected {
        return Ok(());
    }

    warn!(
        principal = %principal,
        expected,
        action,
        "Rejecting principal of the wrong type"
    );
    Err(ConnectorError::PrincipalTypeMismatch {
        connector: CONNECTOR_NAME.to_string(),
        expected: expected.to_string(),
        actual: principal.resource_type.clone(),
        action: action.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_principal_passes() {
        assert!(ensure_principal(&ResourceId::new("agent", "1"), "agent", "granted roles").is_ok());
    }

    #[test]
    fn test_mismatch_message() {
        let err = ensure_principal(
            &ResourceId::new("agent_group", "1"),
            "agent",
            "granted roles",
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "PRINCIPAL_TYPE_MISMATCH");
        assert_eq!(
            err.to_string(),
            "freshservice-connector: only agent principals can be granted roles, got 'agent_group'"
        );
    }
}
