use anyhow::Result;
use chrono::Utc;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::types::ChatId;

use quizlens::dialogue::{validate_note, ChatDialogue, ChatState, PromptNote, MAX_NOTE_CHARS};
use quizlens::question::Question;

fn note(text: &str) -> ChatState {
    ChatState {
        note: Some(PromptNote {
            text: text.to_string(),
            added_at: Utc::now(),
        }),
    }
}

/// Integration test for /add argument validation
#[tokio::test]
async fn test_note_validation() -> Result<()> {
    assert_eq!(validate_note("  Responde em inglês ").unwrap(), "Responde em inglês");
    assert_eq!(validate_note(&"x".repeat(MAX_NOTE_CHARS)).unwrap().len(), MAX_NOTE_CHARS);

    assert_eq!(validate_note(""), Err("empty"));
    assert_eq!(validate_note("\n\t"), Err("empty"));
    assert_eq!(validate_note(&"x".repeat(MAX_NOTE_CHARS + 1)), Err("too_long"));

    Ok(())
}

/// Test the note lifecycle through the dialogue storage
#[tokio::test]
async fn test_note_add_and_remove() -> Result<()> {
    let storage = InMemStorage::<ChatState>::new();
    let dialogue = ChatDialogue::new(storage.clone(), ChatId(42));

    assert_eq!(dialogue.get_or_default().await?, ChatState::default());

    dialogue.update(note("Responde em inglês")).await?;
    let state = dialogue.get_or_default().await?;
    assert_eq!(state.note_text(), Some("Responde em inglês"));

    dialogue.update(ChatState::default()).await?;
    assert_eq!(dialogue.get_or_default().await?.note_text(), None);

    Ok(())
}

/// Test notes stay with the chat that set them
#[tokio::test]
async fn test_notes_are_per_chat() -> Result<()> {
    let storage = InMemStorage::<ChatState>::new();
    let first = ChatDialogue::new(storage.clone(), ChatId(1));
    let second = ChatDialogue::new(storage.clone(), ChatId(2));

    first.update(note("Explica a resposta.")).await?;

    assert_eq!(first.get_or_default().await?.note_text(), Some("Explica a resposta."));
    assert_eq!(second.get().await?, None);

    Ok(())
}

/// Test the stored note ends up in the prompt
#[tokio::test]
async fn test_note_feeds_the_prompt() -> Result<()> {
    let storage = InMemStorage::<ChatState>::new();
    let dialogue = ChatDialogue::new(storage, ChatId(7));
    dialogue.update(note("Responde em inglês.")).await?;

    let state = dialogue.get_or_default().await?;
    let question = Question::from_ocr_text("Quanto é 2+2?\n3\n4", state.note_text())?;

    assert!(question.prompt.ends_with("\nResponde em inglês."));
    Ok(())
}

/// Test the state survives a serde round trip with its timestamp
#[test]
fn test_state_serialization() -> Result<()> {
    let state = note("Responde em inglês.");
    let json = serde_json::to_string(&state)?;
    let restored: ChatState = serde_json::from_str(&json)?;

    assert_eq!(restored, state);
    Ok(())
}
