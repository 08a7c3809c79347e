/// Application constants

pub const API_VERSION: &str = "v1";

// Sui
pub const MIST_PER_SUI: u64 = 1_000_000_000;
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

// LLM
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const CLASSIFIER_TEMPERATURE: f32 = 0.3;
pub const CHAT_TEMPERATURE: f32 = 0.7;

// Agent
pub const DEFAULT_AGENT_RUN_TIMEOUT_MS: u64 = 20_000;
pub const CHAT_HISTORY_TURNS: usize = 10;
pub const MAX_MESSAGE_CHARS: usize = 4_000;

// Action limits
pub const HISTORY_DEFAULT_LIMIT: u64 = 5;
pub const HISTORY_MAX_LIMIT: u64 = 20;
pub const NFT_DEFAULT_LIMIT: u64 = 10;
pub const NFT_MAX_LIMIT: u64 = 50;
pub const BALANCE_MAX_TOKENS_SHOWN: usize = 5;

// Trusted request-context argument names
pub const PARAM_USER_ID: &str = "user_id";
pub const PARAM_WALLET_ADDRESS: &str = "wallet_address";

// User-facing fixed replies
pub const NO_WALLET_MESSAGE: &str =
    "❌ No wallet linked yet. Use /start to connect your wallet first.";
pub const TIMEOUT_MESSAGE: &str =
    "⏳ The assistant is taking too long right now. Please retry in a few seconds.";
pub const CHAT_FALLBACK_MESSAGE: &str =
    "I'm here to help with your Sui wallet! Try asking about your balance, sending SUI, or managing contacts.";
pub const DEFAULT_REPLY: &str = "I'm not sure how to help with that. Try /help.";
