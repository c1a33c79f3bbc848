use serde_json::{Map, Value};

use super::typeahead::{suggestions, CHAT_VOCABULARY};

/// What a submitted input line asks the console to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleAction {
    Send(String),
    Answer(bool),
    Command {
        name: String,
        fields: Map<String, Value>,
    },
    ClearMessages,
    ClearLog,
    Suggest(String),
    Status,
    Help,
    Quit,
    Unknown(String),
    Nothing,
}

pub fn parse_line(line: &str) -> ConsoleAction {
    let line = line.trim();
    if line.is_empty() {
        return ConsoleAction::Nothing;
    }
    if !line.starts_with('/') {
        return match line.strip_suffix('?') {
            // `re?` asks for completions; real questions still go to the backend.
            Some(draft) if !suggestions(draft, CHAT_VOCABULARY).is_empty() => {
                ConsoleAction::Suggest(draft.to_string())
            }
            _ => ConsoleAction::Send(line.to_string()),
        };
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match head.to_ascii_lowercase().as_str() {
        "/yes" | "/y" => ConsoleAction::Answer(true),
        "/no" | "/n" => ConsoleAction::Answer(false),
        "/cmd" => parse_command(rest).unwrap_or_else(|| ConsoleAction::Unknown(line.to_string())),
        "/project" if !rest.is_empty() => {
            let mut fields = Map::new();
            fields.insert("path".into(), Value::from(rest));
            ConsoleAction::Command {
                name: "set_project".into(),
                fields,
            }
        }
        "/resume" => bare_command("resume"),
        "/reset" => bare_command("reset"),
        "/clear" => ConsoleAction::ClearMessages,
        "/clearlog" => ConsoleAction::ClearLog,
        "/suggest" => ConsoleAction::Suggest(rest.to_string()),
        "/status" => ConsoleAction::Status,
        "/help" => ConsoleAction::Help,
        "/quit" | "/exit" => ConsoleAction::Quit,
        _ => ConsoleAction::Unknown(head.to_string()),
    }
}

fn bare_command(name: &str) -> ConsoleAction {
    ConsoleAction::Command {
        name: name.to_string(),
        fields: Map::new(),
    }
}

/// `name key=value ...`; values that parse as JSON keep their type.
fn parse_command(rest: &str) -> Option<ConsoleAction> {
    let mut parts = rest.split_whitespace();
    let name = parts.next()?.to_string();
    let mut fields = Map::new();
    for part in parts {
        let (key, raw) = part.split_once('=')?;
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::from(raw));
        fields.insert(key.to_string(), value);
    }
    Some(ConsoleAction::Command { name, fields })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_text_is_sent_verbatim() {
        assert_eq!(
            parse_line("  project projects/x  "),
            ConsoleAction::Send("project projects/x".into())
        );
        assert_eq!(parse_line("   "), ConsoleAction::Nothing);
    }

    #[test]
    fn cmd_parses_typed_fields() {
        let ConsoleAction::Command { name, fields } = parse_line("/cmd analyze depth=2 path=src")
        else {
            panic!("expected command");
        };
        assert_eq!(name, "analyze");
        assert_eq!(Value::Object(fields), json!({"depth": 2, "path": "src"}));
    }

    #[test]
    fn malformed_cmd_is_unknown() {
        assert!(matches!(parse_line("/cmd"), ConsoleAction::Unknown(_)));
        assert!(matches!(
            parse_line("/cmd run noequals"),
            ConsoleAction::Unknown(_)
        ));
    }

    #[test]
    fn project_shortcut_maps_to_set_project() {
        let ConsoleAction::Command { name, fields } = parse_line("/project projects/demo") else {
            panic!("expected command");
        };
        assert_eq!(name, "set_project");
        assert_eq!(fields.get("path"), Some(&json!("projects/demo")));
        assert!(matches!(parse_line("/project"), ConsoleAction::Unknown(_)));
    }

    #[test]
    fn answers_and_local_actions() {
        assert_eq!(parse_line("/YES"), ConsoleAction::Answer(true));
        assert_eq!(parse_line("/n"), ConsoleAction::Answer(false));
        assert_eq!(parse_line("/clearlog"), ConsoleAction::ClearLog);
        assert_eq!(parse_line("/suggest re"), ConsoleAction::Suggest("re".into()));
        assert_eq!(parse_line("/exit"), ConsoleAction::Quit);
    }

    #[test]
    fn trailing_question_mark_asks_for_completions() {
        assert_eq!(parse_line("re?"), ConsoleAction::Suggest("re".into()));
        assert_eq!(
            parse_line("what changed?"),
            ConsoleAction::Send("what changed?".into())
        );
    }
}
