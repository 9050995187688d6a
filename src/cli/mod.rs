//! Interactive terminal front end for a lookup session

pub mod render;

use actix::Addr;
use console::{style, Term};
use dialoguer::{theme::ColorfulTheme, Confirm, Editor, FuzzySelect, Input, Select};
use std::path::PathBuf;
use tracing::info;

use crate::actors::lookup_session::{
    AcknowledgeFailure, ClearText, CountEntries, DeleteEntry, FindSavedWord, GetState,
    LookupWord, RefreshExamples, SaveResult, SearchEntries, SubmitImage, SubmitText,
};
use crate::actors::{LookupSessionActor, SessionState};
use crate::definition::DefinitionResult;
use crate::error::SessionError;
use crate::vocab::VocabEntry;
use crate::Result;

use render::{
    candidate_words, format_entry_details, format_entry_row, format_result_card, truncate,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    PasteText,
    ExtractImage,
    LookUp,
    ClearText,
    VocabBank,
    Quit,
}

impl MenuAction {
    fn label(self) -> &'static str {
        match self {
            MenuAction::PasteText => "📋 Paste text",
            MenuAction::ExtractImage => "🖼  Extract text from an image",
            MenuAction::LookUp => "🔍 Look up a word",
            MenuAction::ClearText => "🗑  Clear text",
            MenuAction::VocabBank => "📚 Vocab bank",
            MenuAction::Quit => "👋 Quit",
        }
    }
}

/// Menu entries that make sense in the given session state
fn menu_actions(state: SessionState, ocr_available: bool) -> Vec<MenuAction> {
    let mut actions = vec![MenuAction::PasteText];

    if ocr_available {
        actions.push(MenuAction::ExtractImage);
    }

    if matches!(state, SessionState::TextReady | SessionState::ResultReady) {
        actions.push(MenuAction::LookUp);
        actions.push(MenuAction::ClearText);
    }

    actions.push(MenuAction::VocabBank);
    actions.push(MenuAction::Quit);
    actions
}

enum ResultChoice {
    Save,
    Refresh,
    Discard,
}

/// Runs the interactive menu loop until the user quits
pub async fn run(session: Addr<LookupSessionActor>, ocr_available: bool) -> Result<()> {
    let term = Term::stdout();
    let theme = ColorfulTheme::default();

    println!();
    println!("{}", style("📖 InSitu").bold().cyan());
    println!(
        "{}",
        style("Learn from the words you encounter in real life").italic()
    );

    loop {
        let snapshot = session.send(GetState).await?;
        let saved = session.send(CountEntries).await??;

        println!();
        println!("{}", style(format!("📚 {} words saved", saved)).dim());

        if let Some(text) = &snapshot.text {
            println!("{} {}", style("Your text:").bold(), truncate(text, 120));
        }

        let actions = menu_actions(snapshot.state, ocr_available);
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact_on(&term)?;

        match actions[selection] {
            MenuAction::PasteText => paste_text(&session).await?,
            MenuAction::ExtractImage => extract_image(&session, &theme).await?,
            MenuAction::LookUp => look_up(&session, &theme, snapshot.text.as_deref()).await?,
            MenuAction::ClearText => {
                report(session.send(ClearText).await?);
            }
            MenuAction::VocabBank => vocab_bank(&session, &theme).await?,
            MenuAction::Quit => {
                println!("{}", style("👋 Goodbye!").blue());
                break;
            }
        }
    }

    info!("Interactive session finished");
    Ok(())
}

async fn paste_text(session: &Addr<LookupSessionActor>) -> Result<()> {
    println!("Opening your editor: paste the text from a letter, email or document, then save and close.");

    let Some(text) = Editor::new().extension(".txt").edit("")? else {
        println!("{}", style("No text entered.").yellow());
        return Ok(());
    };

    if report(session.send(SubmitText { text }).await?).is_some() {
        println!("{}", style("✅ Text ready, look up any word from it.").green());
    }
    Ok(())
}

async fn extract_image(session: &Addr<LookupSessionActor>, theme: &ColorfulTheme) -> Result<()> {
    let path: String = Input::with_theme(theme)
        .with_prompt("Path to an image (JPG, PNG)")
        .interact_text()?;

    let path = PathBuf::from(path.trim());
    let image_bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("{}", style(format!("Could not read {}: {}", path.display(), e)).red());
            return Ok(());
        }
    };

    println!("{}", style("⏳ Extracting text from image...").dim());
    if let Some(text) = report(session.send(SubmitImage { image_bytes }).await?) {
        println!("{}", style("✅ Extracted text:").green());
        println!("{}", text);
    }
    Ok(())
}

async fn look_up(
    session: &Addr<LookupSessionActor>,
    theme: &ColorfulTheme,
    text: Option<&str>,
) -> Result<()> {
    let Some(word) = pick_word(theme, text.unwrap_or_default())? else {
        return Ok(());
    };

    if let Some(existing) = session.send(FindSavedWord { word: word.clone() }).await?? {
        println!(
            "{}",
            style(format!(
                "ℹ️  '{}' is already in your vocab bank (added {}).",
                existing.word,
                existing.created_at.format("%Y-%m-%d")
            ))
            .yellow()
        );
    }

    println!("{}", style(format!("⏳ Looking up '{}'...", word)).dim());
    let outcome = session.send(LookupWord { word: word.clone() }).await?;

    let Some(mut result) = report_lookup(session, outcome).await? else {
        return Ok(());
    };

    loop {
        println!("{}", format_result_card(&word, &result));

        match choose_result_action(theme)? {
            ResultChoice::Save => {
                if let Some(entry) = report(session.send(SaveResult).await?) {
                    println!(
                        "{}",
                        style(format!("✅ '{}' saved to your vocab bank!", entry.word)).green()
                    );
                    return Ok(());
                }
            }
            ResultChoice::Refresh => {
                println!("{}", style("⏳ Generating new examples...").dim());
                let outcome = session.send(RefreshExamples).await?;
                match report_lookup(session, outcome).await? {
                    Some(refreshed) => result = refreshed,
                    None => return Ok(()),
                }
            }
            ResultChoice::Discard => return Ok(()),
        }
    }
}

/// Lets the user pick a word from the text or type one
fn pick_word(theme: &ColorfulTheme, text: &str) -> Result<Option<String>> {
    const TYPE_OWN: &str = "✎ Type a word";

    let mut items = vec![TYPE_OWN.to_string()];
    items.extend(candidate_words(text));

    let choice = FuzzySelect::with_theme(theme)
        .with_prompt("Which word do you want to understand? (type to filter)")
        .items(&items)
        .default(0)
        .interact_opt()?;

    let word = match choice {
        None => return Ok(None),
        Some(0) => Input::<String>::with_theme(theme)
            .with_prompt("Word")
            .allow_empty(true)
            .interact_text()?,
        Some(idx) => items[idx].clone(),
    };

    let word = word.trim().to_string();
    if word.is_empty() {
        println!("{}", style("Please type a word to look up.").yellow());
        return Ok(None);
    }
    Ok(Some(word))
}

fn choose_result_action(theme: &ColorfulTheme) -> Result<ResultChoice> {
    let choice = Select::with_theme(theme)
        .items(&[
            "💾 Save to vocab bank",
            "🔄 Refresh examples",
            "↩  Discard",
        ])
        .default(0)
        .interact()?;

    Ok(match choice {
        0 => ResultChoice::Save,
        1 => ResultChoice::Refresh,
        _ => ResultChoice::Discard,
    })
}

/// Shows a lookup failure and acknowledges it so the session returns to
/// its text.
async fn report_lookup(
    session: &Addr<LookupSessionActor>,
    outcome: std::result::Result<DefinitionResult, SessionError>,
) -> Result<Option<DefinitionResult>> {
    match outcome {
        Ok(result) => Ok(Some(result)),
        Err(SessionError::Provider(e)) => {
            println!("{}", style(format!("❌ {}", e)).red());
            session.send(AcknowledgeFailure).await??;
            Ok(None)
        }
        Err(e) => {
            println!("{}", style(format!("❌ {}", e)).red());
            Ok(None)
        }
    }
}

async fn vocab_bank(session: &Addr<LookupSessionActor>, theme: &ColorfulTheme) -> Result<()> {
    let query: String = Input::with_theme(theme)
        .with_prompt("🔍 Search words (leave empty to show all)")
        .allow_empty(true)
        .interact_text()?;

    let entries = session.send(SearchEntries { query: query.clone() }).await??;

    if entries.is_empty() {
        let message = if query.trim().is_empty() {
            "Your vocab bank is empty. Look up a word to start."
        } else {
            "No words found matching your search."
        };
        println!("{}", style(message).yellow());
        return Ok(());
    }

    let mut labels: Vec<String> = entries.iter().map(format_entry_row).collect();
    labels.push("↩  Back".to_string());

    let choice = Select::with_theme(theme)
        .with_prompt(format!("{} words", entries.len()))
        .items(&labels)
        .default(0)
        .max_length(15)
        .interact()?;

    if let Some(entry) = entries.get(choice) {
        show_entry(session, theme, entry).await?;
    }
    Ok(())
}

async fn show_entry(
    session: &Addr<LookupSessionActor>,
    theme: &ColorfulTheme,
    entry: &VocabEntry,
) -> Result<()> {
    println!("{}", format_entry_details(entry));

    let choice = Select::with_theme(theme)
        .items(&["↩  Back", "🗑  Delete word"])
        .default(0)
        .interact()?;

    if choice != 1 {
        return Ok(());
    }

    let confirmed = Confirm::with_theme(theme)
        .with_prompt(format!("Delete '{}' permanently?", entry.word))
        .default(false)
        .interact()?;

    if confirmed {
        if session.send(DeleteEntry { id: entry.id }).await?? {
            println!("{}", style("✅ Word deleted").green());
        } else {
            println!("{}", style("Word not found").yellow());
        }
    }
    Ok(())
}

/// Prints a session error; returns the value on success
fn report<T>(outcome: std::result::Result<T, SessionError>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            println!("{}", style(format!("❌ {}", e)).red());
            None
        }
    }
}
