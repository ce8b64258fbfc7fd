//! Tests for identifiers and error classification.

use super::*;

mod identifier_tests {
    use super::*;

    #[test]
    fn test_correlation_id_round_trips_through_string() {
        let id = CorrelationId::new();

        let parsed: CorrelationId = id.as_str().parse().unwrap();

        assert_eq!(parsed, id);
    }

    #[test]
    fn test_correlation_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<CorrelationId>().is_err());
    }

    #[test]
    fn test_event_ids_are_unique() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn test_timestamp_renders_rfc3339() {
        let timestamp = Timestamp::now();

        assert_eq!(timestamp.to_string(), timestamp.to_rfc3339());
        assert!(chrono::DateTime::parse_from_rfc3339(&timestamp.to_rfc3339()).is_ok());
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_categories() {
        let configuration: RelayError = ConfigurationError::UnknownCommand {
            name: "Foo/Bar".to_string(),
        }
        .into();
        let security: RelayError = AuthenticationError::InvalidSecureToken.into();
        let routing: RelayError = RoutingError::NoHandler {
            command: "Log/Info".to_string(),
        }
        .into();
        let unexpected: RelayError =
            StorageError::Io(std::io::Error::other("disk")).into();

        assert_eq!(configuration.error_category(), ErrorCategory::Configuration);
        assert_eq!(security.error_category(), ErrorCategory::Security);
        assert_eq!(routing.error_category(), ErrorCategory::Routing);
        assert_eq!(unexpected.error_category(), ErrorCategory::Unexpected);
    }

    #[test]
    fn test_authentication_messages_are_verbatim() {
        let cases = [
            (AuthenticationError::InvalidRequestFormat, "Invalid request format"),
            (AuthenticationError::InvalidRequestSignature, "Invalid request signature"),
            (AuthenticationError::EmptySecureToken, "Empty secure token"),
            (AuthenticationError::InvalidSecureToken, "Invalid secure token"),
        ];

        for (error, message) in cases {
            assert_eq!(RelayError::from(error).to_string(), message);
        }
    }

    #[test]
    fn test_unknown_provider_message() {
        let error: RelayError = RoutingError::UnknownProvider {
            provider: "gitlab".to_string(),
        }
        .into();

        assert_eq!(error.to_string(), "Unknown service provider");
    }

    #[test]
    fn test_chain_includes_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: RelayError = StorageError::from(io).into();

        let chain = error.chain();

        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0], "Storage error: Storage I/O failed: denied");
        assert_eq!(chain[2], "denied");
    }
}
