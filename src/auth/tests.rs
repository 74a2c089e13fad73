//! Unit tests for authentication module

#[cfg(test)]
mod tests {
    use crate::auth::jwt::{generate_access_token, validate_token};
    use crate::auth::model::{Actor, Capability, Claims};
    use crate::auth::ClaimsPermissionAuthority;
    use crate::receipt::ports::PermissionAuthority;
    use crate::session::SessionId;

    #[test]
    fn test_generate_and_validate_access_token() {
        let token = generate_access_token(
            "staff-7",
            "session-abc",
            &[Capability::ViewContribution, Capability::EditContribution],
        )
        .expect("Failed to generate access token");

        let claims = validate_token(&token).expect("Failed to validate token");

        assert_eq!(claims.sub, "staff-7");
        assert_eq!(claims.sid, "session-abc");
        assert_eq!(claims.token_type, "access");
        assert_eq!(
            claims.capabilities,
            vec!["view contribution".to_string(), "edit contribution".to_string()]
        );
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token_returns_error() {
        let result = validate_token("invalid.token.here");
        assert!(result.is_err());
    }

    #[test]
    fn test_actor_from_claims_drops_unknown_capabilities() {
        let claims = Claims {
            sub: "staff-1".to_string(),
            sid: "s-1".to_string(),
            capabilities: vec![
                "view contribution".to_string(),
                "administer CiviCRM".to_string(),
            ],
            exp: 12345,
            iat: 12340,
            token_type: "access".to_string(),
        };

        let actor = Actor::from(claims);

        assert_eq!(actor.id, "staff-1");
        assert_eq!(actor.session_id, SessionId::from("s-1"));
        assert_eq!(actor.capabilities, vec![Capability::ViewContribution]);
    }

    #[test]
    fn test_claims_without_capabilities_deserialize() {
        let json = r#"{"sub":"u","sid":"s","exp":2,"iat":1,"token_type":"access"}"#;
        let claims: Claims = serde_json::from_str(json).expect("Failed to deserialize");

        assert!(claims.capabilities.is_empty());
    }

    #[test]
    fn test_claims_permission_authority_checks_granted_capabilities() {
        let actor = Actor::new(
            "staff-2",
            SessionId::from("s-2"),
            vec![Capability::ViewContribution],
        );
        let authority = ClaimsPermissionAuthority;

        assert!(authority.check(Capability::ViewContribution, &actor));
        assert!(!authority.check(Capability::EditContribution, &actor));
    }

    #[test]
    fn test_capability_round_trips_through_str() {
        for capability in [Capability::ViewContribution, Capability::EditContribution] {
            assert_eq!(Capability::parse(capability.as_str()), Some(capability));
        }
        assert_eq!(Capability::parse("delete contribution"), None);
    }
}
