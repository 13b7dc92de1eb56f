mod anthropic;
mod google;
mod openai;

pub use anthropic::AnthropicProvider;
pub use google::GoogleProvider;
pub use openai::OpenAiProvider;

/// Header used when a cacheable context block is prepended to a conversation.
pub(crate) const CONTEXT_HEADER: &str = "## Reference document";
