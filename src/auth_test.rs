use super::*;

// =============================================================
// AuthState defaults
// =============================================================

#[test]
fn auth_state_default_no_user() {
    let state = AuthState::default();
    assert!(state.user.is_none());
}

// =============================================================
// AuthContext
// =============================================================

#[test]
fn new_context_is_unauthenticated() {
    let auth = AuthContext::new();
    assert!(!auth.is_authenticated());
    assert!(auth.current_user().is_none());
}

#[test]
fn sign_in_then_out() {
    let auth = AuthContext::new();
    auth.sign_in(User { id: 42, name: Some("ada".into()) });

    let state = auth.snapshot();
    assert_eq!(state.user.as_ref().map(|u| u.id), Some(42));
    assert_eq!(auth.current_user(), Some(User { id: 42, name: Some("ada".into()) }));

    auth.sign_out();
    assert!(!auth.is_authenticated());
}

#[test]
fn signed_in_constructor() {
    let auth = AuthContext::signed_in(User::new(5));
    assert_eq!(auth.current_user().map(|u| u.id), Some(5));
}

#[test]
fn sign_in_replaces_user_and_keeps_name() {
    let auth = AuthContext::signed_in(User::new(5));
    auth.sign_in(User { id: 9, name: Some("grace".into()) });

    let user = auth.current_user().unwrap();
    assert_eq!(user.id, 9);
    assert_eq!(user.name.as_deref(), Some("grace"));
}

#[test]
fn user_name_is_optional_on_the_wire() {
    let user: User = serde_json::from_str(r#"{"id": 3}"#).unwrap();
    assert_eq!(user, User::new(3));
}
