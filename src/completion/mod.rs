// Chat completion providers: trait-based abstraction over the hosted LLM.
//
// The CompletionClient trait is the only thing the classifier knows about.
// GroqClient implements it against Groq's OpenAI-compatible endpoint; tests
// swap in scripted fakes. The Throttle spaces out calls so the provider's
// rate limit is respected.

pub mod groq;
pub mod throttle;
pub mod traits;
