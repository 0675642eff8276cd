//! Line commands
//!
//! Turns one line of stdin into something the surface does. Lines starting
//! with `/` are commands; anything else is sent as a chat message.

use anyhow::{bail, Context, Result};
use lites_core::{AvatarChoice, ContactDirectory, Conversation, Intent, AVATAR_GLYPHS};

/// What a line asks the surface to do
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Forward to the session
    Intent(Intent),
    /// Print the contact list
    Contacts,
    /// Print the avatar palette
    Avatars,
    /// Print usage
    Help,
    /// Leave
    Quit,
}

pub const HELP: &str = "\
/register                 start registration
/login                    log in with the identity registered earlier
/phone <number>           submit phone number
/avatar <1-12|glyph|upload>
/profile <name> <@handle> submit display name and handle
/abandon                  leave registration
/contacts                 list contacts
/open <contact id>        open a conversation
/close                    close the conversation
/signout                  sign out
/avatars                  show the avatar palette
/quit                     exit
<text>                    send a message";

/// Parse one input line; blank lines yield `None`
pub fn parse_line(line: &str, directory: &dyn ContactDirectory) -> Result<Option<Command>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Ok(None);
    }

    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(Command::Intent(Intent::Submit {
            text: line.to_string(),
        })));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "register" => Command::Intent(Intent::BeginRegistration),
        "login" => Command::Intent(Intent::BeginLogin),
        "phone" => Command::Intent(Intent::SubmitPhone {
            value: arg.to_string(),
        }),
        "avatar" => Command::Intent(Intent::SelectAvatar {
            choice: parse_avatar(arg)?,
        }),
        "profile" => {
            // Handle is the last word, the name is everything before it
            let (name, handle) = arg.rsplit_once(char::is_whitespace).unwrap_or((arg, ""));
            Command::Intent(Intent::SubmitProfile {
                name: name.trim().to_string(),
                handle: handle.to_string(),
            })
        }
        "abandon" => Command::Intent(Intent::AbandonRegistration),
        "contacts" => Command::Contacts,
        "avatars" => Command::Avatars,
        "open" => {
            let contact = directory
                .find(arg)
                .with_context(|| format!("Unknown contact '{arg}', see /contacts"))?;
            Command::Intent(Intent::OpenConversation {
                conversation: Conversation::from_contact(contact),
            })
        }
        "close" => Command::Intent(Intent::CloseConversation),
        "send" => Command::Intent(Intent::Submit {
            text: arg.to_string(),
        }),
        "signout" => Command::Intent(Intent::SignOut),
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => bail!("Unknown command '/{other}', try /help"),
    };
    Ok(Some(command))
}

fn parse_avatar(arg: &str) -> Result<AvatarChoice> {
    if arg.is_empty() {
        bail!("Pick an avatar: /avatar <1-12|glyph|upload>");
    }
    if arg.eq_ignore_ascii_case("upload") {
        return Ok(AvatarChoice::Upload);
    }
    if let Ok(index) = arg.parse::<usize>() {
        let glyph = index
            .checked_sub(1)
            .and_then(|i| AVATAR_GLYPHS.get(i))
            .with_context(|| format!("Palette index must be 1-{}", AVATAR_GLYPHS.len()))?;
        return Ok(AvatarChoice::Glyph((*glyph).to_string()));
    }
    Ok(AvatarChoice::Glyph(arg.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lites_core::InMemoryDirectory;
    use pretty_assertions::assert_eq;

    fn parse(line: &str) -> Option<Command> {
        parse_line(line, &InMemoryDirectory::with_sample_contacts()).unwrap()
    }

    #[test]
    fn test_plain_text_is_a_message() {
        assert_eq!(
            parse("hello there"),
            Some(Command::Intent(Intent::Submit {
                text: "hello there".to_string()
            }))
        );
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_whitespace_line_reaches_the_session() {
        assert_eq!(
            parse("   "),
            Some(Command::Intent(Intent::Submit {
                text: "   ".to_string()
            }))
        );
    }

    #[test]
    fn test_profile_splits_handle_off_the_end() {
        assert_eq!(
            parse("/profile Anna Smirnova @anna"),
            Some(Command::Intent(Intent::SubmitProfile {
                name: "Anna Smirnova".to_string(),
                handle: "@anna".to_string(),
            }))
        );
    }

    #[test]
    fn test_avatar_forms() {
        assert_eq!(
            parse("/avatar 2"),
            Some(Command::Intent(Intent::SelectAvatar {
                choice: AvatarChoice::Glyph("🚀".to_string())
            }))
        );
        assert_eq!(
            parse("/avatar upload"),
            Some(Command::Intent(Intent::SelectAvatar {
                choice: AvatarChoice::Upload
            }))
        );
        assert_eq!(
            parse("/avatar 🐙"),
            Some(Command::Intent(Intent::SelectAvatar {
                choice: AvatarChoice::Glyph("🐙".to_string())
            }))
        );

        let directory = InMemoryDirectory::with_sample_contacts();
        assert!(parse_line("/avatar 13", &directory).is_err());
        assert!(parse_line("/avatar 0", &directory).is_err());
    }

    #[test]
    fn test_open_uses_directory() {
        match parse("/open 3") {
            Some(Command::Intent(Intent::OpenConversation { conversation })) => {
                assert_eq!(conversation.name, "Мария Петрова");
            }
            other => panic!("unexpected {other:?}"),
        }

        let directory = InMemoryDirectory::with_sample_contacts();
        let err = parse_line("/open 9", &directory).unwrap_err();
        assert!(err.to_string().contains("Unknown contact"));
    }

    #[test]
    fn test_unknown_command() {
        let directory = InMemoryDirectory::with_sample_contacts();
        assert!(parse_line("/dance", &directory).is_err());
        assert_eq!(parse("/quit"), Some(Command::Quit));
    }
}
