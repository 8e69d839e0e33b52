//! Endpoint URL construction.

use url::Url;

use crate::game::session::UserSession;
use crate::game::types::AnswerOption;
use crate::server::ServerDescriptor;

const HALL_OF_FAME_URL: &str = "http://classement.akinator.com:18666//get_hall_of_fame.php";

fn endpoint(server: &ServerDescriptor, path: &str, params: &[(&str, String)]) -> Result<Url, url::ParseError> {
    let base = format!("{}/{}", server.url.trim_end_matches('/'), path);
    Url::parse_with_params(&base, params)
}

fn session_params(session: &UserSession) -> Vec<(&'static str, String)> {
    vec![
        ("session", session.session.clone()),
        ("signature", session.signature.clone()),
        ("step", session.step.to_string()),
    ]
}

pub fn answer(
    server: &ServerDescriptor,
    session: &UserSession,
    choice: AnswerOption,
) -> Result<Url, url::ParseError> {
    let mut params = session_params(session);
    params.push(("answer", choice.code().to_string()));
    endpoint(server, "answer", &params)
}

pub fn undo_answer(server: &ServerDescriptor, session: &UserSession) -> Result<Url, url::ParseError> {
    let mut params = session_params(session);
    params.push(("answer", "-1".to_string()));
    endpoint(server, "cancel_answer", &params)
}

pub fn exclusion(server: &ServerDescriptor, session: &UserSession) -> Result<Url, url::ParseError> {
    let mut params = session_params(session);
    params.push(("forward_answer", "1".to_string()));
    endpoint(server, "exclusion", &params)
}

pub fn search_character(
    server: &ServerDescriptor,
    session: &UserSession,
    name: &str,
) -> Result<Url, url::ParseError> {
    let mut params = session_params(session);
    params.push(("name", name.to_string()));
    endpoint(server, "soundlike_search", &params)
}

pub fn guess_list(server: &ServerDescriptor, session: &UserSession) -> Result<Url, url::ParseError> {
    endpoint(server, "list", &session_params(session))
}

/// Hall of fame of the server's base.
pub fn hall_of_fame(server: &ServerDescriptor) -> Result<Url, url::ParseError> {
    Url::parse_with_params(HALL_OF_FAME_URL, &[("basel_id", server.base_id.as_str())])
}
