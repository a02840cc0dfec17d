use crate::llm::{ChatTurn, TurnRole};
use crate::models::Message;

/// Map frontend conversation history into the upstream role
/// vocabulary. "user" stays user, "assistant" becomes model, and any
/// other role is dropped without error. Relative order is preserved.
pub fn adapt_history(messages: &[Message]) -> Vec<ChatTurn> {
    messages
        .iter()
        .filter_map(|msg| {
            let role = match msg.role.as_str() {
                "user" => TurnRole::User,
                "assistant" => TurnRole::Model,
                _ => return None,
            };
            Some(ChatTurn {
                role,
                text: msg.content.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn msg(role: &str, content: &str) -> Message {
        Message {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn maps_roles_to_upstream_vocabulary() {
        let turns = adapt_history(&[msg("user", "question"), msg("assistant", "answer")]);

        assert_eq!(
            turns,
            vec![
                ChatTurn {
                    role: TurnRole::User,
                    text: "question".to_string(),
                },
                ChatTurn {
                    role: TurnRole::Model,
                    text: "answer".to_string(),
                },
            ]
        );
    }

    #[test]
    fn drops_unknown_roles_and_keeps_order() {
        let turns = adapt_history(&[
            msg("user", "first"),
            msg("system", "ignored"),
            msg("tool", "also ignored"),
            msg("assistant", "second"),
            msg("user", "third"),
        ]);

        let texts: Vec<&str> = turns.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn empty_history_yields_no_turns() {
        assert!(adapt_history(&[]).is_empty());
    }
}
