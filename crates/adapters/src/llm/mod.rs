//! LLM adapter implementations.

pub mod openai;
