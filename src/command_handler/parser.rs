// src/command_handler/parser.rs
// ============================================
// Command grammar
// ============================================
//
// A message is `/<name>[@<bot>] [arguments]`. The name decides the variant;
// the arguments are validated per command. Malformed input is rejected with
// a `ParseError` rather than guessed at.

use crate::transport::Attachment;

/// Commands that answer without an identity check
const PUBLIC_COMMANDS: &[&str] = &["start", "help"];

/// Error produced while parsing a chat message into a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("message is not a command")]
    NotACommand,

    #[error("unknown command /{0}")]
    UnknownCommand(String),

    #[error("/{command} requires {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("/{0} does not take arguments")]
    UnexpectedArgument(&'static str),

    #[error("{0}")]
    Usage(String),
}

/// Raw command name and argument string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub name: String,
    pub args: String,
}

impl Invocation {
    /// Split a message into command name and arguments
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim_start();
        let body = text.strip_prefix('/').ok_or(ParseError::NotACommand)?;

        let (head, args) = match body.find(char::is_whitespace) {
            Some(idx) => (&body[..idx], body[idx..].trim()),
            None => (body, ""),
        };

        // `/status@my_bot` addresses a specific bot in group chats
        let name = head.split('@').next().unwrap_or("");
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ParseError::NotACommand);
        }

        Ok(Self {
            name: name.to_ascii_lowercase(),
            args: args.to_string(),
        })
    }

    /// Whether this command answers without authorization
    pub fn is_public(&self) -> bool {
        PUBLIC_COMMANDS.contains(&self.name.as_str())
    }
}

/// Action requested by `/ssh`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SshAction {
    Add(String),
    Remove(String),
}

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Status,
    Execute(String),
    Top,
    Netstat,
    Traffic,
    Ssh(SshAction),
    File(Vec<Attachment>),
    Reboot,
    Logs,
    SysInfo,
}

const SSH_USAGE: &str = "Usage: /ssh <add|remove> <public_key>";

impl Command {
    /// Build a typed command from an invocation and the message attachments
    pub fn parse(invocation: &Invocation, attachments: &[Attachment]) -> Result<Self, ParseError> {
        let args = invocation.args.as_str();

        match invocation.name.as_str() {
            // Deep-link payloads after /start are ignored
            "start" => Ok(Command::Start),
            "help" => Ok(Command::Help),
            "status" => no_args("status", args, Command::Status),
            "c" => {
                if args.is_empty() {
                    Err(ParseError::MissingArgument {
                        command: "c",
                        what: "a shell command",
                    })
                } else {
                    Ok(Command::Execute(args.to_string()))
                }
            }
            "top" => no_args("top", args, Command::Top),
            "netstat" => no_args("netstat", args, Command::Netstat),
            "traffic" => no_args("traffic", args, Command::Traffic),
            "ssh" => parse_ssh(args).map(Command::Ssh),
            "file" => {
                if attachments.is_empty() {
                    Err(ParseError::MissingArgument {
                        command: "file",
                        what: "an attached file",
                    })
                } else {
                    Ok(Command::File(attachments.to_vec()))
                }
            }
            "reboot" => no_args("reboot", args, Command::Reboot),
            "logs" => no_args("logs", args, Command::Logs),
            "sysinfo" => no_args("sysinfo", args, Command::SysInfo),
            other => Err(ParseError::UnknownCommand(other.to_string())),
        }
    }
}

fn no_args(name: &'static str, args: &str, command: Command) -> Result<Command, ParseError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::UnexpectedArgument(name))
    }
}

fn parse_ssh(args: &str) -> Result<SshAction, ParseError> {
    let (action, key) = match args.split_once(char::is_whitespace) {
        Some((action, key)) => (action, key.trim()),
        None => (args, ""),
    };

    if action.is_empty() || key.is_empty() {
        return Err(ParseError::Usage(SSH_USAGE.to_string()));
    }
    if key.contains(['\n', '\r']) {
        return Err(ParseError::Usage(
            "The public key must be a single line".to_string(),
        ));
    }

    match action {
        "add" => Ok(SshAction::Add(key.to_string())),
        "remove" => Ok(SshAction::Remove(key.to_string())),
        other => Err(ParseError::Usage(format!(
            "Unknown action '{}'. {}",
            other, SSH_USAGE
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::AttachmentKind;

    fn parse(text: &str) -> Result<Command, ParseError> {
        Command::parse(&Invocation::parse(text)?, &[])
    }

    #[test]
    fn test_invocation_split() {
        let inv = Invocation::parse("/c ls -la /tmp").unwrap();
        assert_eq!(inv.name, "c");
        assert_eq!(inv.args, "ls -la /tmp");

        let inv = Invocation::parse("  /Status@sentinel_bot  ").unwrap();
        assert_eq!(inv.name, "status");
        assert_eq!(inv.args, "");
    }

    #[test]
    fn test_not_a_command() {
        assert_eq!(Invocation::parse("hello"), Err(ParseError::NotACommand));
        assert_eq!(Invocation::parse("/"), Err(ParseError::NotACommand));
        assert_eq!(Invocation::parse("/../etc"), Err(ParseError::NotACommand));
    }

    #[test]
    fn test_public_commands() {
        assert!(Invocation::parse("/start").unwrap().is_public());
        assert!(Invocation::parse("/help").unwrap().is_public());
        assert!(!Invocation::parse("/status").unwrap().is_public());
        assert!(!Invocation::parse("/unknown").unwrap().is_public());
    }

    #[test]
    fn test_execute_keeps_arguments_verbatim() {
        assert_eq!(
            parse("/c echo 'a  b' | wc -c").unwrap(),
            Command::Execute("echo 'a  b' | wc -c".to_string())
        );
        assert_eq!(
            parse("/c"),
            Err(ParseError::MissingArgument {
                command: "c",
                what: "a shell command"
            })
        );
        assert!(parse("/c    ").is_err());
    }

    #[test]
    fn test_argless_commands() {
        assert_eq!(parse("/status").unwrap(), Command::Status);
        assert_eq!(parse("/top").unwrap(), Command::Top);
        assert_eq!(parse("/sysinfo").unwrap(), Command::SysInfo);
        assert_eq!(parse("/start payload").unwrap(), Command::Start);
        assert_eq!(
            parse("/reboot now"),
            Err(ParseError::UnexpectedArgument("reboot"))
        );
    }

    #[test]
    fn test_ssh_grammar() {
        assert_eq!(
            parse("/ssh add ssh-ed25519 AAAAC3Nz op@laptop").unwrap(),
            Command::Ssh(SshAction::Add("ssh-ed25519 AAAAC3Nz op@laptop".to_string()))
        );
        assert_eq!(
            parse("/ssh remove AAAAC3Nz").unwrap(),
            Command::Ssh(SshAction::Remove("AAAAC3Nz".to_string()))
        );
        assert!(matches!(parse("/ssh"), Err(ParseError::Usage(_))));
        assert!(matches!(parse("/ssh add"), Err(ParseError::Usage(_))));
        match parse("/ssh replace key") {
            Err(ParseError::Usage(msg)) => assert!(msg.contains("replace")),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_file_requires_attachment() {
        let inv = Invocation::parse("/file").unwrap();
        assert_eq!(
            Command::parse(&inv, &[]),
            Err(ParseError::MissingArgument {
                command: "file",
                what: "an attached file"
            })
        );

        let attachment = Attachment {
            file_id: "F".to_string(),
            unique_id: "U".to_string(),
            kind: AttachmentKind::Photo,
            size: None,
        };
        assert_eq!(
            Command::parse(&inv, &[attachment.clone()]).unwrap(),
            Command::File(vec![attachment])
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse("/selfdestruct"),
            Err(ParseError::UnknownCommand("selfdestruct".to_string()))
        );
    }
}
