use crate::context::DirectorySnapshot;
use crate::provider::{ChatMessage, ChatRequest, Role};

/// Render the system instruction for `snapshot`.
pub fn system_prompt(snapshot: &DirectorySnapshot) -> String {
    format!(
        "You are a helpful assistant aiding a developer with their project. \
         Current directory: {}\n\
         Files in directory: {}\n\n\
         Answer the developer's question with this context in mind.",
        snapshot.current_dir,
        snapshot.entries.join(", "),
    )
}

/// Build the two-message request: system context first, then the question
/// exactly as typed.
pub fn build_request(model: &str, snapshot: &DirectorySnapshot, question: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage {
                role: Role::System,
                content: system_prompt(snapshot),
            },
            ChatMessage {
                role: Role::User,
                content: question.to_string(),
            },
        ],
    }
}
