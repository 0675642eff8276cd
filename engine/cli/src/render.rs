//! Plain-text rendering of session messages

use std::fmt::Write;

use lites_core::{
    Contact, DeliveryState, Message, OnboardingStep, Origin, Projection, SessionMessage,
    AVATAR_GLYPHS,
};

/// Render one session message for a terminal
pub fn render(msg: &SessionMessage) -> String {
    match msg {
        SessionMessage::Snapshot(projection) => render_projection(projection),
        SessionMessage::Rejected { intent, reason } => format!("! {intent}: {reason}"),
    }
}

fn render_projection(projection: &Projection) -> String {
    let mut out = String::new();
    match projection {
        Projection::Onboarding {
            step,
            progress,
            draft,
        } => {
            let _ = write!(out, "[onboarding] {}", prompt(*step));
            if let Some((n, total)) = progress {
                let _ = write!(out, " (step {n} of {total})");
            }
            if let Some(phone) = &draft.phone {
                let _ = write!(out, "\n  phone: {phone}");
            }
            if let Some(avatar) = &draft.avatar {
                let _ = write!(out, "\n  avatar: {avatar}");
            }
        }
        Projection::Chat {
            identity,
            conversation,
            messages,
            typing,
        } => {
            let _ = write!(
                out,
                "[{} {} {}{}]",
                identity.avatar,
                identity.display_name,
                identity.handle,
                if identity.is_premium() { " ★" } else { "" }
            );
            match conversation {
                Some(c) => {
                    let presence = match c.online {
                        Some(true) => " (online)",
                        Some(false) => " (offline)",
                        None => "",
                    };
                    let _ = write!(out, " {} {}{presence}", c.avatar, c.name);
                    for message in messages {
                        let _ = write!(out, "\n  {}", render_message(message));
                    }
                    if *typing {
                        let _ = write!(out, "\n  {} is typing...", c.name);
                    }
                }
                None => out.push_str(" no conversation open, see /contacts"),
            }
        }
    }
    out
}

fn prompt(step: OnboardingStep) -> &'static str {
    match step {
        OnboardingStep::Start => "welcome: /register or /login",
        OnboardingStep::PhoneEntry => "enter your phone: /phone <number>",
        OnboardingStep::AvatarSelection => "pick an avatar: /avatar <1-12|glyph|upload>",
        OnboardingStep::ProfileDetails => "your name and handle: /profile <name> <@handle>",
        OnboardingStep::Complete => "done",
    }
}

fn render_message(message: &Message) -> String {
    let arrow = match message.origin {
        Origin::SelfUser => ">",
        Origin::Peer => "<",
    };
    let mut line = format!("{} {arrow} {}", message.time_label(), message.text);
    if let Some(icon) = message.receipt_icon() {
        line.push(' ');
        line.push_str(icon);
        if message.state() == DeliveryState::Pending {
            line.push_str(" (sending)");
        }
    }
    line
}

/// Contact list for `/contacts`
pub fn render_contacts(contacts: &[Contact]) -> String {
    contacts
        .iter()
        .map(|c| {
            format!(
                "{:>3}  {} {} {}{}",
                c.id,
                c.avatar,
                c.name,
                c.handle,
                if c.online { "  ●" } else { "" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered avatar palette for `/avatars`
pub fn render_palette() -> String {
    AVATAR_GLYPHS
        .iter()
        .enumerate()
        .map(|(i, glyph)| format!("{}:{glyph}", i + 1))
        .collect::<Vec<_>>()
        .join("  ")
}
