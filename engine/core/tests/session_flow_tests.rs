//! Integration tests for the full session flow
//!
//! These tests drive a [`Session`] the way a surface would: intents in,
//! snapshots out, with the virtual clock moved explicitly.
//! Tests cover:
//! - Registration wizard with validation retries
//! - Login gating on an earlier registration
//! - Reply pipeline timeline on a directory conversation
//! - Conversation switch cancelling an in-flight pipeline
//! - TOML configuration changing timings and reply text

use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

use lites_core::{
    load_config_with_env, AvatarChoice, ContactDirectory, Conversation, DeliveryState,
    InMemoryDirectory, Intent, OnboardingError, OnboardingStep, Origin, Projection, Session,
    SessionConfig, SessionError, SessionMessage, ValidationError,
};

const REPLY: &str = "Привет! Это автоответ 👋";

fn new_session(config: SessionConfig) -> (Session, mpsc::UnboundedReceiver<SessionMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Session::new(config, tx), rx)
}

fn last_snapshot(rx: &mut mpsc::UnboundedReceiver<SessionMessage>) -> Option<Projection> {
    let mut last = None;
    while let Ok(msg) = rx.try_recv() {
        if let SessionMessage::Snapshot(p) = msg {
            last = Some(p);
        }
    }
    last
}

fn register(session: &mut Session, name: &str, handle: &str) {
    session.handle_intent(Intent::BeginRegistration).unwrap();
    session
        .handle_intent(Intent::SubmitPhone {
            value: "+7 999 123 45 67".to_string(),
        })
        .unwrap();
    session
        .handle_intent(Intent::SelectAvatar {
            choice: AvatarChoice::Glyph("🚀".to_string()),
        })
        .unwrap();
    session
        .handle_intent(Intent::SubmitProfile {
            name: name.to_string(),
            handle: handle.to_string(),
        })
        .unwrap();
}

fn open_contact(session: &mut Session, id: &str) {
    let directory = InMemoryDirectory::with_sample_contacts();
    let contact = directory.find(id).unwrap();
    session
        .handle_intent(Intent::OpenConversation {
            conversation: Conversation::from_contact(contact),
        })
        .unwrap();
}

fn submit(session: &mut Session, text: &str) -> Result<(), SessionError> {
    session.handle_intent(Intent::Submit {
        text: text.to_string(),
    })
}

// =============================================================================
// Onboarding
// =============================================================================

#[test]
fn test_wizard_blocks_until_input_is_valid() {
    let (mut session, mut rx) = new_session(SessionConfig::default());
    session.handle_intent(Intent::BeginRegistration).unwrap();

    let err = session
        .handle_intent(Intent::SubmitPhone {
            value: "123".to_string(),
        })
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::Onboarding(OnboardingError::Invalid(ValidationError::PhoneTooShort {
            actual: 3,
            min: 10,
        }))
    );
    assert_eq!(session.step(), OnboardingStep::PhoneEntry);

    session
        .handle_intent(Intent::SubmitPhone {
            value: "+79991234567".to_string(),
        })
        .unwrap();
    session
        .handle_intent(Intent::SelectAvatar {
            choice: AvatarChoice::Upload,
        })
        .unwrap();

    let err = session
        .handle_intent(Intent::SubmitProfile {
            name: String::new(),
            handle: "@x".to_string(),
        })
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::Onboarding(OnboardingError::Invalid(ValidationError::EmptyName))
    ));
    assert!(session.identity().is_none());

    match last_snapshot(&mut rx).unwrap() {
        Projection::Onboarding {
            step,
            progress,
            draft,
        } => {
            assert_eq!(step, OnboardingStep::ProfileDetails);
            assert_eq!(progress, Some((3, 3)));
            assert_eq!(draft.phone.as_deref(), Some("+79991234567"));
        }
        other => panic!("expected onboarding projection, got {other:?}"),
    }

    session
        .handle_intent(Intent::SubmitProfile {
            name: "Anna".to_string(),
            handle: "@anna".to_string(),
        })
        .unwrap();
    let identity = session.identity().unwrap();
    assert_eq!(identity.display_name, "Anna");
    assert_eq!(identity.avatar.glyph(), "📷");
    assert!(!identity.is_premium());
}

#[test]
fn test_login_requires_earlier_registration() {
    let (mut session, _rx) = new_session(SessionConfig::default());

    let err = session.handle_intent(Intent::BeginLogin).unwrap_err();
    assert_eq!(
        err,
        SessionError::Onboarding(OnboardingError::NoRegisteredIdentity)
    );
    assert_eq!(session.step(), OnboardingStep::Start);

    register(&mut session, "Anna", "@anna");
    session.handle_intent(Intent::SignOut).unwrap();
    assert!(session.identity().is_none());

    session.handle_intent(Intent::BeginLogin).unwrap();
    assert_eq!(session.step(), OnboardingStep::Complete);
    assert_eq!(session.identity().unwrap().handle, "@anna");
}

#[test]
fn test_abandoned_registration_starts_over() {
    let (mut session, _rx) = new_session(SessionConfig::default());
    session.handle_intent(Intent::BeginRegistration).unwrap();
    session
        .handle_intent(Intent::SubmitPhone {
            value: "+79991234567".to_string(),
        })
        .unwrap();

    session.handle_intent(Intent::AbandonRegistration).unwrap();
    assert_eq!(session.step(), OnboardingStep::Start);

    session.handle_intent(Intent::BeginRegistration).unwrap();
    match session.projection() {
        Projection::Onboarding { draft, .. } => assert!(draft.phone.is_none()),
        other => panic!("expected onboarding projection, got {other:?}"),
    }
}

// =============================================================================
// Conversation engine
// =============================================================================

#[test]
fn test_reply_pipeline_scenario() {
    let (mut session, mut rx) = new_session(SessionConfig::default());
    register(&mut session, "Anna", "@anna");
    open_contact(&mut session, "1");

    let p = last_snapshot(&mut rx).unwrap();
    let seed: Vec<_> = p.messages().iter().map(|m| (m.origin, m.state())).collect();
    assert_eq!(
        seed,
        vec![
            (Origin::Peer, DeliveryState::Acknowledged),
            (Origin::SelfUser, DeliveryState::Acknowledged),
        ]
    );

    submit(&mut session, "hello").unwrap();
    let p = last_snapshot(&mut rx).unwrap();
    assert_eq!(p.messages().len(), 3);
    assert_eq!(p.messages()[2].text, "hello");
    assert_eq!(p.messages()[2].state(), DeliveryState::Pending);

    session.advance_to(500);
    let p = last_snapshot(&mut rx).unwrap();
    assert_eq!(p.messages()[2].state(), DeliveryState::Delivered);
    assert!(!p.typing());

    session.advance_to(1000);
    assert!(last_snapshot(&mut rx).unwrap().typing());

    session.advance_to(3000);
    let p = last_snapshot(&mut rx).unwrap();
    assert!(!p.typing());
    assert_eq!(p.messages().len(), 4);
    assert_eq!(p.messages()[3].origin, Origin::Peer);
    assert_eq!(p.messages()[3].state(), DeliveryState::Acknowledged);
    assert_eq!(p.messages()[3].text, REPLY);

    // Own message never reaches acknowledged
    session.advance(Duration::from_secs(60));
    assert_eq!(
        session.projection().messages()[2].state(),
        DeliveryState::Delivered
    );
}

#[test]
fn test_blank_text_is_not_appended() {
    let (mut session, _rx) = new_session(SessionConfig::default());
    register(&mut session, "Anna", "@anna");
    open_contact(&mut session, "3");

    for text in ["", "   "] {
        assert!(submit(&mut session, text).is_err());
    }
    assert_eq!(session.projection().messages().len(), 2);
    assert_eq!(session.next_deadline(), None);
}

#[test]
fn test_switch_hides_previous_pipeline() {
    let (mut session, mut rx) = new_session(SessionConfig::default());
    register(&mut session, "Anna", "@anna");
    open_contact(&mut session, "1");
    submit(&mut session, "hello").unwrap();

    session.advance_to(700);
    open_contact(&mut session, "2");
    last_snapshot(&mut rx);

    assert_eq!(session.advance_to(5000), 0);
    assert!(last_snapshot(&mut rx).is_none());

    match session.projection() {
        Projection::Chat {
            conversation,
            messages,
            typing,
            ..
        } => {
            assert_eq!(conversation.unwrap().name, "Дмитрий Козлов");
            assert_eq!(messages.len(), 2);
            assert!(!typing);
        }
        other => panic!("expected chat projection, got {other:?}"),
    }
}

#[test]
fn test_overlapping_pipelines_both_deliver() {
    let (mut session, _rx) = new_session(SessionConfig::default());
    register(&mut session, "Anna", "@anna");
    open_contact(&mut session, "1");

    submit(&mut session, "first").unwrap();
    session.advance_to(200);
    submit(&mut session, "second").unwrap();

    session.advance_to(700);
    let states: Vec<_> = session
        .projection()
        .messages()
        .iter()
        .skip(2)
        .map(|m| m.state())
        .collect();
    assert_eq!(
        states,
        vec![DeliveryState::Delivered, DeliveryState::Delivered]
    );

    session.advance_to(3200);
    let p = session.projection();
    assert_eq!(p.messages().len(), 6);
    assert_eq!(
        p.messages().iter().filter(|m| m.text == REPLY).count(),
        2
    );
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_toml_config_drives_pipeline() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        br#"
[pipeline]
delivered_ms = 50
typing_ms = 100
reply_ms = 150

[content]
reply_text = "pong"
"#,
    )
    .unwrap();

    let config = load_config_with_env(Some(file.path().to_path_buf()), |_| None).unwrap();
    let (mut session, _rx) = new_session(config);
    register(&mut session, "Anna", "@anna");
    open_contact(&mut session, "1");
    submit(&mut session, "ping").unwrap();

    assert_eq!(session.next_deadline(), Some(50));
    assert_eq!(session.advance(Duration::from_millis(150)), 3);
    assert_eq!(
        session.projection().messages().last().unwrap().text,
        "pong"
    );
}
