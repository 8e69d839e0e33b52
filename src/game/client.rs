//! Question/answer client bound to one server.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::game::error::{GameError, GameResult};
use crate::game::response::{
    parse_hall_of_fame, parse_parameters, GuessParameters, QuestionParameters, SearchParameters,
};
use crate::game::session::UserSession;
use crate::game::types::{AnswerOption, Guess, HallOfFameEntry, Question};
use crate::game::urls;
use crate::server::ServerDescriptor;
use crate::transport::Transport;

/// Plays one game session on one server.
pub struct GameClient {
    transport: Arc<dyn Transport>,
    server: ServerDescriptor,
    session: UserSession,
    current_question: Option<Question>,
}

impl GameClient {
    /// Attach to a session that was started elsewhere.
    pub fn attach(transport: Arc<dyn Transport>, server: ServerDescriptor, session: UserSession) -> Self {
        Self {
            transport,
            server,
            session,
            current_question: None,
        }
    }

    pub fn server(&self) -> &ServerDescriptor {
        &self.server
    }

    /// Last question received, if any request returned one.
    pub fn current_question(&self) -> Option<&Question> {
        self.current_question.as_ref()
    }

    pub fn user_session(&self) -> &UserSession {
        &self.session
    }

    /// Answer the current question and receive the next one.
    pub async fn answer(&mut self, choice: AnswerOption, cancel: &CancellationToken) -> GameResult<Question> {
        if cancel.is_cancelled() {
            return Err(GameError::Cancelled);
        }
        let url = urls::answer(&self.server, &self.session, choice)?;
        let params: QuestionParameters = self.request(url, cancel).await?;
        tracing::debug!(step = params.step, answer = %choice, "Answer accepted");
        Ok(self.advance(params))
    }

    /// Take back the last answer. Returns `None` at the first question.
    pub async fn undo_answer(&mut self, cancel: &CancellationToken) -> GameResult<Option<Question>> {
        if cancel.is_cancelled() {
            return Err(GameError::Cancelled);
        }
        if self.session.at_start() {
            return Ok(None);
        }
        let url = urls::undo_answer(&self.server, &self.session)?;
        let params: QuestionParameters = self.request(url, cancel).await?;
        Ok(Some(self.advance(params)))
    }

    /// Reject the proposed guesses and continue asking. Returns `None` at the
    /// first question.
    pub async fn exclusion(&mut self, cancel: &CancellationToken) -> GameResult<Option<Question>> {
        if cancel.is_cancelled() {
            return Err(GameError::Cancelled);
        }
        if self.session.at_start() {
            return Ok(None);
        }
        let url = urls::exclusion(&self.server, &self.session)?;
        let params: QuestionParameters = self.request(url, cancel).await?;
        Ok(Some(self.advance(params)))
    }

    /// Characters the server currently proposes, most probable first.
    pub async fn guess(&mut self, cancel: &CancellationToken) -> GameResult<Vec<Guess>> {
        if cancel.is_cancelled() {
            return Err(GameError::Cancelled);
        }
        let url = urls::guess_list(&self.server, &self.session)?;
        let params: GuessParameters = self.request(url, cancel).await?;
        self.session.last_guess_step = self.session.step;
        Ok(params.into_guesses())
    }

    /// Look up characters by name in this server's base.
    pub async fn search_character(&self, name: &str, cancel: &CancellationToken) -> GameResult<Vec<Guess>> {
        if cancel.is_cancelled() {
            return Err(GameError::Cancelled);
        }
        let url = urls::search_character(&self.server, &self.session, name)?;
        let params: SearchParameters = self.request(url, cancel).await?;
        Ok(params.into_guesses())
    }

    /// Awards of this server's base.
    pub async fn hall_of_fame(&self, cancel: &CancellationToken) -> GameResult<Vec<HallOfFameEntry>> {
        if cancel.is_cancelled() {
            return Err(GameError::Cancelled);
        }
        let url = urls::hall_of_fame(&self.server)?;
        let body = self.fetch(&url, cancel).await?;
        let entries = parse_hall_of_fame(url.as_str(), &body)?;
        tracing::debug!(base_id = %self.server.base_id, entries = entries.len(), "Hall of fame loaded");
        Ok(entries)
    }

    fn advance(&mut self, params: QuestionParameters) -> Question {
        let question = Question::from(params);
        self.session.step = question.step;
        self.current_question = Some(question.clone());
        question
    }

    async fn request<T: DeserializeOwned>(&self, url: Url, cancel: &CancellationToken) -> GameResult<T> {
        let body = self.fetch(&url, cancel).await?;
        parse_parameters(url.as_str(), &body)
    }

    async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> GameResult<String> {
        let response = self.transport.get(url.as_str(), cancel).await?;
        if !response.is_ok() {
            return Err(GameError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response.body)
    }
}
