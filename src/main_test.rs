use super::*;

// =============================================================
// CliError rendering
// =============================================================

#[test]
fn not_signed_in_shows_sign_in_hint() {
    let rendered = format!("{:?}", CliError::NotSignedIn);
    assert_eq!(rendered, "not signed in: pass --user-id or set CHAT_USER_ID");
    assert_eq!(rendered, CliError::NotSignedIn.to_string());
}

#[test]
fn chat_failure_shows_error_code() {
    let err = CliError::from(ChatError::ApiRequest("connection refused".into()));
    let rendered = format!("{err:?}");
    assert!(rendered.starts_with("chat request failed [E_API_REQUEST]"));
    assert!(rendered.ends_with("connection refused"));
}

#[test]
fn io_failure_shows_cause() {
    let err = CliError::from(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"));
    assert_eq!(format!("{err:?}"), "terminal I/O failed: pipe closed");
}

// =============================================================
// Cli parsing
// =============================================================

#[test]
fn send_parses_target_flags() {
    let cli = Cli::try_parse_from([
        "coursechat",
        "--user-id",
        "7",
        "send",
        "hi",
        "--course-id",
        "3",
        "--conversation-id",
        "c1",
    ])
    .unwrap();
    assert_eq!(cli.user_id, Some(7));
    let Command::Send { message, target } = cli.command else {
        panic!("expected send");
    };
    assert_eq!(message, "hi");
    assert_eq!(target.course_id, Some(3));
    assert_eq!(target.conversation_id.as_deref(), Some("c1"));
}
