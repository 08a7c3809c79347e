//! Deterministic argument extraction used when constrained selection fails.
//!
//! Patterns are scanned in a fixed order and the first match wins; nothing
//! is inferred when a required field is missing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use super::domain::Domain;
use super::llm::ToolCall;
use crate::services::wallet_actions::names;

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b0x[0-9a-fA-F]{40,64}\b").expect("valid address regex"));
static HEX_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b0x[0-9a-zA-Z]*").expect("valid hex token regex"));
static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:^|[^\w.,-])(?P<negative>-)?(?:(?P<grouped>\d{1,3}(?:,\d{3})+(?:\.\d+)?)|(?P<plain>\d+(?:[.,]\d+)?)|(?P<fraction>\.\d+))\b",
    )
    .expect("valid number regex")
});
static TO_RECIPIENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bto\s+@?([A-Za-z][\w.-]{0,63})").expect("valid recipient regex")
});

const RECIPIENT_STOPWORDS: &[&str] = &[
    "my", "the", "a", "an", "me", "him", "her", "them", "someone", "send", "pay", "transfer", "give",
    "move", "tip",
];
const ADD_VERBS: &[&str] = &["add", "save", "remember", "create", "store"];
const REMOVE_VERBS: &[&str] = &["delete", "remove", "forget", "drop"];
const NAME_STOPWORDS: &[&str] = &[
    "add", "save", "remember", "create", "store", "delete", "remove", "forget", "drop", "new",
    "contact", "contacts", "a", "an", "the", "my", "to", "from", "please", "address", "book",
    "as", "named", "called", "with", "for", "is", "sui", "wallet", "of", "and", "can", "you",
    "i", "want", "this",
];
const NAME_FILLERS: &[&str] = &["named", "called", "as", "for", "is"];

const FULL_RESET_PHRASES: &[&str] = &[
    "full reset",
    "delete everything",
    "remove all my data",
    "start completely fresh",
    "wipe",
];
const DISCONNECT_PHRASES: &[&str] = &["disconnect", "unlink", "remove wallet", "remove my wallet"];
const RESET_PHRASES: &[&str] = &["reset", "start over", "clear history", "forget everything"];

pub const PROMPT_MISSING_AMOUNT: &str =
    "💸 How much SUI would you like to send? Try: \"send 1 SUI to alice\".";
pub const PROMPT_MISSING_RECIPIENT: &str =
    "👤 Who should receive the SUI? Give a 0x address or a saved contact name, e.g. \"send 1 SUI to alice\".";
pub const PROMPT_MISSING_CONTACT_ADDRESS: &str =
    "📝 I need the contact's Sui address (0x...). Try: \"add contact alice 0x...\".";
pub const PROMPT_MISSING_CONTACT_NAME: &str =
    "📝 What name should I save this address under? Try: \"add contact alice 0x...\".";
pub const PROMPT_MISSING_REMOVE_NAME: &str =
    "🗑️ Which contact should I remove? Try: \"remove contact alice\".";

#[derive(Debug, Clone, PartialEq)]
pub enum FallbackOutcome {
    Selected(ToolCall),
    MissingField {
        field: &'static str,
        prompt: &'static str,
    },
    Unresolved,
}

/// Picks an action from `allowed` for `domain` using fixed lexical patterns.
pub fn select(domain: Domain, text: &str, allowed: &[&str]) -> FallbackOutcome {
    let outcome = match domain {
        Domain::Balance => call(names::GET_BALANCE, Map::new()),
        Domain::Payments => select_payment(text),
        Domain::Contacts => select_contact_action(text),
        Domain::History => call(names::GET_TRANSACTION_HISTORY, limit_args(text)),
        Domain::Nfts => call(names::GET_NFTS, limit_args(text)),
        Domain::Help => call(select_help_action(text), Map::new()),
        Domain::Conversation => FallbackOutcome::Unresolved,
    };

    match outcome {
        FallbackOutcome::Selected(ref tool) if !allowed.contains(&tool.name.as_str()) => {
            FallbackOutcome::Unresolved
        }
        other => other,
    }
}

fn call(name: &str, args: Map<String, Value>) -> FallbackOutcome {
    FallbackOutcome::Selected(ToolCall {
        name: name.to_string(),
        args,
    })
}

fn missing(field: &'static str, prompt: &'static str) -> FallbackOutcome {
    FallbackOutcome::MissingField { field, prompt }
}

fn select_payment(text: &str) -> FallbackOutcome {
    let Some(amount) = extract_amount(text) else {
        return missing("amount", PROMPT_MISSING_AMOUNT);
    };
    let Some(recipient) = extract_address(text).or_else(|| extract_named_recipient(text)) else {
        return missing("recipient", PROMPT_MISSING_RECIPIENT);
    };

    let mut args = Map::new();
    args.insert("recipient".to_string(), Value::from(recipient));
    args.insert("amount".to_string(), Value::from(amount));
    call(names::SEND_SUI, args)
}

fn select_contact_action(text: &str) -> FallbackOutcome {
    let lowered = text.to_lowercase();
    let words = words(&lowered);
    let has_verb = |verbs: &[&str]| words.iter().any(|word| verbs.contains(word));

    if has_verb(ADD_VERBS) {
        let Some(address) = extract_address(text) else {
            return missing("address", PROMPT_MISSING_CONTACT_ADDRESS);
        };
        let Some(name) = extract_contact_name(text) else {
            return missing("name", PROMPT_MISSING_CONTACT_NAME);
        };
        let mut args = Map::new();
        args.insert("name".to_string(), Value::from(name));
        args.insert("address".to_string(), Value::from(address));
        return call(names::ADD_CONTACT, args);
    }

    if has_verb(REMOVE_VERBS) {
        let Some(name) = extract_contact_name(text) else {
            return missing("name", PROMPT_MISSING_REMOVE_NAME);
        };
        let mut args = Map::new();
        args.insert("name".to_string(), Value::from(name));
        return call(names::DELETE_CONTACT, args);
    }

    call(names::LIST_CONTACTS, Map::new())
}

fn select_help_action(text: &str) -> &'static str {
    let lowered = text.to_lowercase();
    let mentions = |phrases: &[&str]| phrases.iter().any(|phrase| lowered.contains(phrase));

    if mentions(FULL_RESET_PHRASES) {
        names::FULL_RESET
    } else if mentions(DISCONNECT_PHRASES) {
        names::DISCONNECT_WALLET
    } else if mentions(RESET_PHRASES) {
        names::RESET_CONVERSATION
    } else {
        names::GET_HELP
    }
}

fn limit_args(text: &str) -> Map<String, Value> {
    let mut args = Map::new();
    if let Some(limit) = extract_amount(text).filter(|value| *value >= 1.0) {
        args.insert("limit".to_string(), Value::from(limit.trunc() as u64));
    }
    args
}

// Internal helper that splits text into punctuation-trimmed words.
fn words(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_' || c == '-')))
        .filter(|word| !word.is_empty())
        .collect()
}

/// First address-shaped token (`0x` + 40..64 hex chars).
pub fn extract_address(text: &str) -> Option<String> {
    ADDRESS_RE.find(text).map(|found| found.as_str().to_string())
}

/// The first numeric token, when it is positive. A zero or negative first
/// token yields `None` rather than a later number. `1,000` is a thousands
/// group, `1,5` a decimal comma and `.5` a bare fraction. Digits inside `0x…`
/// tokens are ignored.
pub fn extract_amount(text: &str) -> Option<f64> {
    let without_hex = HEX_TOKEN_RE.replace_all(text, " ");
    let caps = NUMBER_RE.captures(&without_hex)?;
    if caps.name("negative").is_some() {
        return None;
    }

    let normalized = if let Some(grouped) = caps.name("grouped") {
        grouped.as_str().replace(',', "")
    } else if let Some(plain) = caps.name("plain") {
        plain.as_str().replace(',', ".")
    } else {
        format!("0{}", caps.name("fraction")?.as_str())
    };
    normalized.parse::<f64>().ok().filter(|value| *value > 0.0)
}

/// Name following the word "to" when no address is present. Pronouns and
/// verbs ("want to send") are skipped in favour of a later "to".
pub fn extract_named_recipient(text: &str) -> Option<String> {
    TO_RECIPIENT_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|found| found.as_str().trim_end_matches(['.', '-']).to_string())
        .find(|name| {
            !name.is_empty() && !RECIPIENT_STOPWORDS.contains(&name.to_lowercase().as_str())
        })
}

fn is_name_like(word: &str) -> bool {
    let lowered = word.to_lowercase();
    word.chars().next().is_some_and(|c| c.is_alphabetic())
        && !lowered.starts_with("0x")
        && !NAME_STOPWORDS.contains(&lowered.as_str())
}

/// Contact alias: the word after "contact" (skipping fillers), else the first non-keyword word.
pub fn extract_contact_name(text: &str) -> Option<String> {
    let tokens = words(text);

    let after_keyword = tokens
        .iter()
        .position(|word| {
            let lowered = word.to_lowercase();
            lowered == "contact" || lowered == "contacts"
        })
        .and_then(|idx| {
            tokens[idx + 1..]
                .iter()
                .find(|word| !NAME_FILLERS.contains(&word.to_lowercase().as_str()))
        })
        .filter(|word| is_name_like(word));

    after_keyword
        .or_else(|| tokens.iter().find(|word| is_name_like(word)))
        .map(|word| word.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR_B: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const ADDR_C: &str = "0xcccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc";

    fn all_actions() -> Vec<&'static str> {
        names::ALL.to_vec()
    }

    fn selected(outcome: FallbackOutcome) -> ToolCall {
        match outcome {
            FallbackOutcome::Selected(call) => call,
            other => panic!("expected a selection, got {:?}", other),
        }
    }

    #[test]
    fn extract_amount_reads_first_number() {
        assert_eq!(extract_amount("send 12.5 sui"), Some(12.5));
        assert_eq!(extract_amount("send 1,5 sui"), Some(1.5));
        assert_eq!(extract_amount("send sui"), None);
        assert_eq!(extract_amount("send 0 sui"), None);
    }

    #[test]
    fn extract_amount_handles_grouping_and_fractions() {
        assert_eq!(extract_amount("send 1,000 SUI to alice"), Some(1000.0));
        assert_eq!(extract_amount("send 12,500.5 sui"), Some(12500.5));
        assert_eq!(extract_amount("send .5 SUI to alice"), Some(0.5));
    }

    #[test]
    fn extract_amount_never_skips_past_a_zero() {
        assert_eq!(extract_amount("send 0 SUI to bob, he has 5"), None);
        assert_eq!(extract_amount("send -5 SUI then 3"), None);
        let outcome = select(Domain::Payments, "send 0 SUI to bob, he has 5", &all_actions());
        assert!(matches!(outcome, FallbackOutcome::MissingField { field: "amount", .. }));
    }

    #[test]
    fn payment_with_thousands_amount() {
        let call = selected(select(Domain::Payments, "send 1,000 SUI to alice", &all_actions()));
        assert_eq!(call.args["amount"], 1000.0);
        assert_eq!(call.args["recipient"], "alice");
    }

    #[test]
    fn extract_amount_ignores_address_digits() {
        let text = format!("send to 0x1234{} now", &ADDR_B[6..]);
        assert_eq!(extract_amount(&text), None);
        let text = format!("send {} 3 sui", ADDR_B);
        assert_eq!(extract_amount(&text), Some(3.0));
    }

    #[test]
    fn extract_address_requires_bounded_hex() {
        assert_eq!(extract_address(&format!("pay {ADDR_B}")).as_deref(), Some(ADDR_B));
        assert_eq!(extract_address("pay 0xabc"), None);
        // 65 hex chars is not an address
        assert_eq!(extract_address(&format!("{ADDR_B}b")), None);
    }

    #[test]
    fn named_recipient_skips_pronouns() {
        assert_eq!(extract_named_recipient("send 1 SUI to alice").as_deref(), Some("alice"));
        assert_eq!(extract_named_recipient("send 1 SUI to @bob.").as_deref(), Some("bob"));
        assert_eq!(extract_named_recipient("send 1 SUI to my friend"), None);
        assert_eq!(
            extract_named_recipient("send 1 SUI to my friend, to carol").as_deref(),
            Some("carol")
        );
    }

    #[test]
    fn infinitive_to_is_not_a_recipient() {
        let call = selected(select(Domain::Payments, "I want to send 2 SUI to alice", &all_actions()));
        assert_eq!(call.args["recipient"], "alice");
        assert_eq!(call.args["amount"], 2.0);
    }

    #[test]
    fn payment_with_contact_name() {
        let call = selected(select(Domain::Payments, "send 1 SUI to alice", &all_actions()));
        assert_eq!(call.name, names::SEND_SUI);
        assert_eq!(call.args["recipient"], "alice");
        assert_eq!(call.args["amount"], 1.0);
    }

    #[test]
    fn payment_prefers_address_over_name() {
        let text = format!("transfer 2 sui to bob at {ADDR_B}");
        let call = selected(select(Domain::Payments, &text, &all_actions()));
        assert_eq!(call.args["recipient"], ADDR_B);
    }

    #[test]
    fn payment_without_amount_prompts() {
        let outcome = select(Domain::Payments, "send some SUI to alice", &all_actions());
        assert_eq!(
            outcome,
            FallbackOutcome::MissingField {
                field: "amount",
                prompt: PROMPT_MISSING_AMOUNT
            }
        );
    }

    #[test]
    fn payment_without_recipient_prompts() {
        let outcome = select(Domain::Payments, "send 5 sui", &all_actions());
        assert!(matches!(
            outcome,
            FallbackOutcome::MissingField { field: "recipient", .. }
        ));
    }

    #[test]
    fn add_contact_extracts_name_and_address() {
        let text = format!("add contact bob {ADDR_C}");
        let call = selected(select(Domain::Contacts, &text, &all_actions()));
        assert_eq!(call.name, names::ADD_CONTACT);
        assert_eq!(call.args["name"], "bob");
        assert_eq!(call.args["address"], ADDR_C);
    }

    #[test]
    fn save_address_as_name() {
        let text = format!("save {ADDR_C} as Carol");
        let call = selected(select(Domain::Contacts, &text, &all_actions()));
        assert_eq!(call.args["name"], "Carol");
    }

    #[test]
    fn add_contact_without_address_prompts() {
        let outcome = select(Domain::Contacts, "add contact bob", &all_actions());
        assert!(matches!(
            outcome,
            FallbackOutcome::MissingField { field: "address", .. }
        ));
    }

    #[test]
    fn remove_contact_and_list() {
        let call = selected(select(Domain::Contacts, "remove bob from contacts", &all_actions()));
        assert_eq!(call.name, names::DELETE_CONTACT);
        assert_eq!(call.args["name"], "bob");

        let call = selected(select(Domain::Contacts, "show my contacts", &all_actions()));
        assert_eq!(call.name, names::LIST_CONTACTS);
        assert!(call.args.is_empty());
    }

    #[test]
    fn history_limit_from_number() {
        let call = selected(select(Domain::History, "last 3 transactions", &all_actions()));
        assert_eq!(call.name, names::GET_TRANSACTION_HISTORY);
        assert_eq!(call.args["limit"], 3);

        let call = selected(select(Domain::Nfts, "show my nfts", &all_actions()));
        assert!(call.args.get("limit").is_none());
    }

    #[test]
    fn help_phrases_in_scan_order() {
        let pick = |text: &str| selected(select(Domain::Help, text, &all_actions())).name;
        assert_eq!(pick("full reset please"), names::FULL_RESET);
        assert_eq!(pick("disconnect wallet"), names::DISCONNECT_WALLET);
        assert_eq!(pick("reset"), names::RESET_CONVERSATION);
        assert_eq!(pick("what can you do?"), names::GET_HELP);
    }

    #[test]
    fn selection_outside_allowed_list_is_unresolved() {
        let outcome = select(Domain::Balance, "balance", &[names::GET_HELP]);
        assert_eq!(outcome, FallbackOutcome::Unresolved);
        assert_eq!(
            select(Domain::Conversation, "hi", &all_actions()),
            FallbackOutcome::Unresolved
        );
    }
}
