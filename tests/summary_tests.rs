use consult_scribe::summary::{
    truncate_transcript, StructuredSummary, SummaryResult, MAX_TRANSCRIPT_CHARS,
};

#[test]
fn test_short_transcript_untouched() {
    let transcript = "[SPEAKER_1]: hello";
    assert_eq!(truncate_transcript(transcript), transcript);
}

#[test]
fn test_exact_limit_untouched() {
    let transcript = "a".repeat(MAX_TRANSCRIPT_CHARS);
    assert_eq!(truncate_transcript(&transcript).len(), MAX_TRANSCRIPT_CHARS);
}

#[test]
fn test_long_transcript_is_cut_to_limit() {
    let transcript = "a".repeat(MAX_TRANSCRIPT_CHARS + 500);
    let truncated = truncate_transcript(&transcript);
    assert_eq!(truncated.chars().count(), MAX_TRANSCRIPT_CHARS);
    assert!(transcript.starts_with(truncated));
}

#[test]
fn test_truncation_counts_characters_not_bytes() {
    // Multibyte characters: the limit is characters, and the cut must land
    // on a char boundary.
    let transcript = "é".repeat(MAX_TRANSCRIPT_CHARS + 10);
    let truncated = truncate_transcript(&transcript);
    assert_eq!(truncated.chars().count(), MAX_TRANSCRIPT_CHARS);
    assert_eq!(truncated.len(), MAX_TRANSCRIPT_CHARS * 2);
}

#[test]
fn test_structured_summary_parses_schema_output() {
    let payload = r#"{
        "history": ["persistent cough", "no fever"],
        "diagnosis": ["acute bronchitis"],
        "medications": ["dextromethorphan"],
        "tests": ["chest x-ray"],
        "instructions": ["follow up in one week"]
    }"#;

    let summary: StructuredSummary = serde_json::from_str(payload).unwrap();
    assert_eq!(summary.history.len(), 2);
    assert_eq!(summary.diagnosis, vec!["acute bronchitis"]);
    assert_eq!(summary.tests, vec!["chest x-ray"]);
}

#[test]
fn test_structured_summary_requires_all_sections() {
    let payload = r#"{"history": [], "diagnosis": []}"#;
    assert!(serde_json::from_str::<StructuredSummary>(payload).is_err());
}

#[test]
fn test_summary_result_deserializes_untagged() {
    let success = r#"{
        "history": [], "diagnosis": [], "medications": [],
        "tests": [], "instructions": []
    }"#;
    let result: SummaryResult = serde_json::from_str(success).unwrap();
    assert!(result.is_ok());

    let failure = r#"{"error": "Summary failed", "details": "timeout"}"#;
    let result: SummaryResult = serde_json::from_str(failure).unwrap();
    assert!(!result.is_ok());
}

#[test]
fn test_failure_payload_shape() {
    let json = serde_json::to_string(&SummaryResult::failure("backend timeout")).unwrap();
    assert_eq!(
        json,
        r#"{"error":"Summary failed","details":"backend timeout"}"#
    );
}
