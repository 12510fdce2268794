//! Service-limit validation tests.

#[cfg(test)]
mod tests {
    use accountstack_policy::PolicyError;
    use accountstack_policy::limits::MAX_POLICY_CHARACTERS;
    use accountstack_synth::SynthError;

    use crate::Fixture;

    fn document_of_size(characters: usize) -> String {
        // `{"a":"` + padding + `"}` = 8 characters of structure.
        format!(r#"{{"a":"{}"}}"#, "x".repeat(characters - 8))
    }

    #[test]
    fn test_should_accept_policy_at_size_limit() {
        let fixture = Fixture::standard();
        std::fs::write(
            fixture.policy_dir().join("SE_CUSTOM_DEV.json"),
            document_of_size(MAX_POLICY_CHARACTERS),
        )
        .unwrap();
        fixture.synthesize().unwrap();
    }

    #[test]
    fn test_should_reject_policy_over_size_limit() {
        let fixture = Fixture::standard();
        std::fs::write(
            fixture.policy_dir().join("SE_CUSTOM_DEV.json"),
            document_of_size(MAX_POLICY_CHARACTERS + 1),
        )
        .unwrap();
        let err = fixture.synthesize().unwrap_err();
        match err {
            SynthError::Policy(PolicyError::LimitExceeded {
                subject, actual, max, ..
            }) => {
                assert_eq!(subject, "SE_CUSTOM_DEV");
                assert_eq!(actual, MAX_POLICY_CHARACTERS + 1);
                assert_eq!(max, MAX_POLICY_CHARACTERS);
            }
            other => panic!("expected LimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_should_ignore_whitespace_when_sizing() {
        let fixture = Fixture::standard();
        let padded = format!(
            "{{\n{}\"a\": \"b\"\n}}",
            " ".repeat(MAX_POLICY_CHARACTERS * 2)
        );
        std::fs::write(fixture.policy_dir().join("SE_CUSTOM_PROD.json"), padded).unwrap();
        fixture.synthesize().unwrap();
    }
}
