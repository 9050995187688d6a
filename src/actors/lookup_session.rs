use actix::{
    fut, Actor, ActorFutureExt, Context, Handler, Message, MessageResponse, ResponseActFuture,
    WrapFuture,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::definition::{DefinitionProvider, DefinitionResult};
use crate::error::{ProviderError, SessionError, StorageError};
use crate::extraction::TextExtractor;
use crate::vocab::{VocabEntry, VocabStore};

/// Where a lookup session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Extracting,
    TextReady,
    LookingUp,
    ResultReady,
    LookupFailed,
}

impl SessionState {
    pub fn name(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Extracting => "extracting text",
            SessionState::TextReady => "ready for a word",
            SessionState::LookingUp => "looking up a word",
            SessionState::ResultReady => "showing a result",
            SessionState::LookupFailed => "showing a failed lookup",
        }
    }

    /// A provider or OCR call is in flight
    pub fn is_busy(self) -> bool {
        matches!(self, SessionState::Extracting | SessionState::LookingUp)
    }
}

/// Read-only view of the session for the UI
#[derive(Debug, Clone, MessageResponse)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub text: Option<String>,
    pub word: Option<String>,
    pub result: Option<DefinitionResult>,
    pub failure: Option<String>,
}

/// Message to use typed or pasted text as the lookup context
#[derive(Message)]
#[rtype(result = "Result<(), SessionError>")]
pub struct SubmitText {
    pub text: String,
}

/// Message to OCR an image and use its text as the lookup context
#[derive(Message)]
#[rtype(result = "Result<String, SessionError>")]
pub struct SubmitImage {
    pub image_bytes: Vec<u8>,
}

/// Message to drop the current text and any unsaved result
#[derive(Message)]
#[rtype(result = "Result<(), SessionError>")]
pub struct ClearText;

/// Message to look up a word in the current text
#[derive(Message)]
#[rtype(result = "Result<DefinitionResult, SessionError>")]
pub struct LookupWord {
    pub word: String,
}

/// Message to ask for different examples for the displayed result
#[derive(Message)]
#[rtype(result = "Result<DefinitionResult, SessionError>")]
pub struct RefreshExamples;

/// Message to dismiss a failed lookup
#[derive(Message)]
#[rtype(result = "Result<(), SessionError>")]
pub struct AcknowledgeFailure;

/// Message to save the displayed result to the vocab bank
#[derive(Message)]
#[rtype(result = "Result<VocabEntry, SessionError>")]
pub struct SaveResult;

#[derive(Message)]
#[rtype(result = "Result<Vec<VocabEntry>, StorageError>")]
pub struct ListEntries;

#[derive(Message)]
#[rtype(result = "Result<Vec<VocabEntry>, StorageError>")]
pub struct SearchEntries {
    pub query: String,
}

#[derive(Message)]
#[rtype(result = "Result<bool, StorageError>")]
pub struct DeleteEntry {
    pub id: i64,
}

#[derive(Message)]
#[rtype(result = "Result<usize, StorageError>")]
pub struct CountEntries;

/// Message to check whether a word was saved before
#[derive(Message)]
#[rtype(result = "Result<Option<VocabEntry>, StorageError>")]
pub struct FindSavedWord {
    pub word: String,
}

#[derive(Message)]
#[rtype(result = "SessionSnapshot")]
pub struct GetState;

/// Word and payload of the lookup currently on display
struct PendingLookup {
    word: String,
    result: DefinitionResult,
}

/// Actor driving one lookup session. It is the only owner of the vocab
/// store, and runs at most one provider or OCR call at a time.
pub struct LookupSessionActor {
    store: VocabStore,
    provider: DefinitionProvider,
    extractor: Arc<dyn TextExtractor>,
    state: SessionState,
    text: Option<String>,
    pending: Option<PendingLookup>,
    /// Word of the lookup in flight or last failed
    word: Option<String>,
    failure: Option<String>,
}

impl LookupSessionActor {
    pub fn new(
        store: VocabStore,
        provider: DefinitionProvider,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            store,
            provider,
            extractor,
            state: SessionState::Idle,
            text: None,
            pending: None,
            word: None,
            failure: None,
        }
    }

    /// Rejects the action unless the session is in one of `allowed`.
    fn ensure(&self, action: &'static str, allowed: &[SessionState]) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else if self.state.is_busy() {
            warn!("Rejecting '{}' while {}", action, self.state.name());
            Err(SessionError::Busy)
        } else {
            Err(SessionError::InvalidState {
                action,
                state: self.state.name(),
            })
        }
    }

    fn reset_to(&mut self, state: SessionState) {
        self.state = state;
        self.pending = None;
        self.word = None;
        self.failure = None;
    }

    fn finish_lookup(
        &mut self,
        word: String,
        outcome: Result<DefinitionResult, ProviderError>,
    ) -> Result<DefinitionResult, SessionError> {
        match outcome {
            Ok(result) => {
                info!("Lookup of '{}' ready", word);
                self.state = SessionState::ResultReady;
                self.failure = None;
                self.word = Some(word.clone());
                self.pending = Some(PendingLookup {
                    word,
                    result: result.clone(),
                });
                Ok(result)
            }
            Err(e) => {
                warn!("Lookup of '{}' failed: {}", word, e);
                self.state = SessionState::LookupFailed;
                self.failure = Some(e.to_string());
                self.word = Some(word);
                self.pending = None;
                Err(e.into())
            }
        }
    }
}

impl Actor for LookupSessionActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        info!("LookupSessionActor started");
    }

    fn stopped(&mut self, _ctx: &mut Context<Self>) {
        info!("LookupSessionActor stopped, closing vocab store");
    }
}

impl Handler<SubmitText> for LookupSessionActor {
    type Result = Result<(), SessionError>;

    fn handle(&mut self, msg: SubmitText, _ctx: &mut Context<Self>) -> Self::Result {
        if self.state.is_busy() {
            return Err(SessionError::Busy);
        }

        let text = msg.text.trim();
        if text.is_empty() {
            return Err(SessionError::EmptyText);
        }

        info!("Text submitted ({} characters)", text.len());
        self.text = Some(text.to_string());
        self.reset_to(SessionState::TextReady);
        Ok(())
    }
}

impl Handler<SubmitImage> for LookupSessionActor {
    type Result = ResponseActFuture<Self, Result<String, SessionError>>;

    fn handle(&mut self, msg: SubmitImage, _ctx: &mut Context<Self>) -> Self::Result {
        if self.state.is_busy() {
            return Box::pin(fut::ready(Err(SessionError::Busy)));
        }

        self.reset_to(SessionState::Extracting);
        let extractor = self.extractor.clone();

        Box::pin(
            async move { extractor.extract(&msg.image_bytes).await }
                .into_actor(self)
                .map(|outcome, act, _ctx| match outcome {
                    Ok(text) => {
                        act.text = Some(text.clone());
                        act.state = SessionState::TextReady;
                        Ok(text)
                    }
                    Err(e) => {
                        warn!("Text extraction failed: {}", e);
                        act.text = None;
                        act.state = SessionState::Idle;
                        Err(e.into())
                    }
                }),
        )
    }
}

impl Handler<ClearText> for LookupSessionActor {
    type Result = Result<(), SessionError>;

    fn handle(&mut self, _msg: ClearText, _ctx: &mut Context<Self>) -> Self::Result {
        if self.state.is_busy() {
            return Err(SessionError::Busy);
        }

        self.text = None;
        self.reset_to(SessionState::Idle);
        Ok(())
    }
}

impl Handler<LookupWord> for LookupSessionActor {
    type Result = ResponseActFuture<Self, Result<DefinitionResult, SessionError>>;

    fn handle(&mut self, msg: LookupWord, _ctx: &mut Context<Self>) -> Self::Result {
        if let Err(e) = self.ensure(
            "look up a word",
            &[SessionState::TextReady, SessionState::ResultReady],
        ) {
            return Box::pin(fut::ready(Err(e)));
        }

        let word = msg.word.trim().to_string();
        if word.is_empty() {
            return Box::pin(fut::ready(Err(SessionError::EmptyWord)));
        }

        // Any unsaved result on display is discarded
        self.reset_to(SessionState::LookingUp);
        self.word = Some(word.clone());

        let provider = self.provider.clone();
        let text = self.text.clone().unwrap_or_default();
        let lookup_word = word.clone();

        Box::pin(
            async move { provider.define(&lookup_word, &text).await }
                .into_actor(self)
                .map(move |outcome, act, _ctx| act.finish_lookup(word, outcome)),
        )
    }
}

impl Handler<RefreshExamples> for LookupSessionActor {
    type Result = ResponseActFuture<Self, Result<DefinitionResult, SessionError>>;

    fn handle(&mut self, _msg: RefreshExamples, _ctx: &mut Context<Self>) -> Self::Result {
        if let Err(e) = self.ensure("refresh examples", &[SessionState::ResultReady]) {
            return Box::pin(fut::ready(Err(e)));
        }

        let Some(current) = self.pending.take() else {
            return Box::pin(fut::ready(Err(SessionError::InvalidState {
                action: "refresh examples",
                state: self.state.name(),
            })));
        };

        self.state = SessionState::LookingUp;

        let provider = self.provider.clone();
        let text = self.text.clone().unwrap_or_default();
        let word = current.word.clone();

        Box::pin(
            async move {
                provider
                    .refresh_examples(&current.word, &text, &current.result)
                    .await
            }
            .into_actor(self)
            .map(move |outcome, act, _ctx| act.finish_lookup(word, outcome)),
        )
    }
}

impl Handler<AcknowledgeFailure> for LookupSessionActor {
    type Result = Result<(), SessionError>;

    fn handle(&mut self, _msg: AcknowledgeFailure, _ctx: &mut Context<Self>) -> Self::Result {
        self.ensure("acknowledge a failure", &[SessionState::LookupFailed])?;
        self.reset_to(SessionState::TextReady);
        Ok(())
    }
}

impl Handler<SaveResult> for LookupSessionActor {
    type Result = Result<VocabEntry, SessionError>;

    fn handle(&mut self, _msg: SaveResult, _ctx: &mut Context<Self>) -> Self::Result {
        self.ensure("save", &[SessionState::ResultReady])?;

        let Some(pending) = self.pending.as_ref() else {
            return Err(SessionError::InvalidState {
                action: "save",
                state: self.state.name(),
            });
        };

        // On failure the result stays on display so the user can retry
        let entry = self.store.create(
            &pending.word,
            &pending.result.definition,
            &pending.result.examples,
            &pending.result.source_sentence,
        )?;

        // Text is kept so more words can be looked up from it
        self.reset_to(SessionState::TextReady);
        Ok(entry)
    }
}

impl Handler<ListEntries> for LookupSessionActor {
    type Result = Result<Vec<VocabEntry>, StorageError>;

    fn handle(&mut self, _msg: ListEntries, _ctx: &mut Context<Self>) -> Self::Result {
        self.store.list_all()
    }
}

impl Handler<SearchEntries> for LookupSessionActor {
    type Result = Result<Vec<VocabEntry>, StorageError>;

    fn handle(&mut self, msg: SearchEntries, _ctx: &mut Context<Self>) -> Self::Result {
        self.store.search(&msg.query)
    }
}

impl Handler<DeleteEntry> for LookupSessionActor {
    type Result = Result<bool, StorageError>;

    fn handle(&mut self, msg: DeleteEntry, _ctx: &mut Context<Self>) -> Self::Result {
        self.store.delete(msg.id)
    }
}

impl Handler<CountEntries> for LookupSessionActor {
    type Result = Result<usize, StorageError>;

    fn handle(&mut self, _msg: CountEntries, _ctx: &mut Context<Self>) -> Self::Result {
        self.store.count()
    }
}

impl Handler<FindSavedWord> for LookupSessionActor {
    type Result = Result<Option<VocabEntry>, StorageError>;

    fn handle(&mut self, msg: FindSavedWord, _ctx: &mut Context<Self>) -> Self::Result {
        self.store.find_by_word(&msg.word)
    }
}

impl Handler<GetState> for LookupSessionActor {
    type Result = SessionSnapshot;

    fn handle(&mut self, _msg: GetState, _ctx: &mut Context<Self>) -> Self::Result {
        SessionSnapshot {
            state: self.state,
            text: self.text.clone(),
            word: self.word.clone(),
            result: self.pending.as_ref().map(|p| p.result.clone()),
            failure: self.failure.clone(),
        }
    }
}
