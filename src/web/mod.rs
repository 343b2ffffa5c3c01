pub mod names;
pub mod views;

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use maud::Markup;
use uuid::Uuid;
use warp::http::header::{CACHE_CONTROL, SET_COOKIE};
use warp::http::{HeaderValue, StatusCode, Uri};
use warp::reply::{Reply, Response as HttpResponse};
use warp::{Filter, Rejection};

use crate::quiz::flow::{Outcome, QuizFlow};
use crate::quiz::session::SessionState;
use crate::quiz::{ContentItem, QuizError, Response};
use crate::storage::InMemStorage;

type Form = HashMap<String, String>;

/// Largest form body accepted on `POST /` and `POST /quiz`.
const MAX_FORM_BYTES: u64 = 16 * 1024;

/// Everything a request handler needs, cloned into each request.
#[derive(Clone)]
pub struct App {
    flow: Arc<QuizFlow>,
    storage: Arc<InMemStorage>,
}

impl App {
    pub fn new(flow: Arc<QuizFlow>, storage: Arc<InMemStorage>) -> Self {
        Self { flow, storage }
    }
}

/// The session id from the request cookie, and whether this response issued it.
///
/// A cookie is only trusted when it names a session the store already holds; ids are
/// never taken from the client.
#[derive(Debug, Clone, Copy, Default)]
struct QuizSession {
    id: Option<Uuid>,
    issued: bool,
}

impl QuizSession {
    fn from_cookie(cookie: Option<String>) -> Self {
        Self {
            id: cookie.and_then(|value| value.parse::<Uuid>().ok()),
            issued: false,
        }
    }

    fn issue(&mut self, id: Uuid) {
        self.id = Some(id);
        self.issued = true;
    }

    /// Attaches the session cookie when this request created the session.
    fn finish(&self, reply: impl Reply) -> HttpResponse {
        let mut response = reply.into_response();
        if let (true, Some(id)) = (self.issued, self.id) {
            let cookie = names::session_cookie(&id.to_string());
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().insert(SET_COOKIE, value);
            }
        }
        response
    }
}

impl App {
    /// Runs one flow step on the caller's stored session with the store locked.
    async fn step<T>(
        &self,
        session: &QuizSession,
        f: impl FnOnce(&QuizFlow, &mut SessionState) -> Result<T, QuizError>,
    ) -> Result<T, QuizError> {
        let id = session.id.ok_or(QuizError::MissingPrecondition)?;
        let flow: &QuizFlow = &self.flow;
        self.storage
            .with_session(id, |state| f(flow, state))
            .await
            .unwrap_or(Err(QuizError::MissingPrecondition))
    }
}

fn with_app(app: App) -> impl Filter<Extract = (App,), Error = Infallible> + Clone {
    warp::any().map(move || app.clone())
}

fn with_session() -> impl Filter<Extract = (QuizSession,), Error = Infallible> + Clone {
    warp::cookie::optional::<String>(names::SESSION_COOKIE_NAME).map(QuizSession::from_cookie)
}

fn form_body() -> impl Filter<Extract = (Form,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_FORM_BYTES).and(warp::body::form::<Form>())
}

pub fn routes(app: App) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let selection_page = warp::path::end()
        .and(warp::get())
        .and(with_app(app.clone()))
        .and_then(selection_page);

    let select = warp::path::end()
        .and(warp::post())
        .and(with_app(app.clone()))
        .and(with_session())
        .and(form_body())
        .and_then(select);

    let quiz_page = warp::path!("quiz")
        .and(warp::get())
        .and(with_app(app.clone()))
        .and(with_session())
        .and_then(quiz_page);

    let submit = warp::path!("quiz")
        .and(warp::post())
        .and(with_app(app.clone()))
        .and(with_session())
        .and(form_body())
        .and_then(submit);

    let remarks = warp::path!("remarks")
        .and(warp::get())
        .and(with_app(app.clone()))
        .and(with_session())
        .and_then(|app: App, session: QuizSession| {
            outcome_page(app, session, views::remarks_page)
        });

    let focus = warp::path!("focus")
        .and(warp::get())
        .and(with_app(app.clone()))
        .and(with_session())
        .and_then(|app: App, session: QuizSession| outcome_page(app, session, views::focus_page));

    let report = warp::path!("report")
        .and(warp::get())
        .and(with_app(app))
        .and(with_session())
        .and_then(|app: App, session: QuizSession| {
            outcome_page(app, session, views::report_page)
        });

    selection_page
        .or(select)
        .or(quiz_page)
        .or(submit)
        .or(remarks)
        .or(focus)
        .or(report)
        .recover(handle_rejection)
        .with(warp::reply::with::header(CACHE_CONTROL, "no-store"))
        .with(warp::log("study_quiz::http"))
}

fn redirect_to(path: &'static str) -> HttpResponse {
    warp::redirect::see_other(Uri::from_static(path)).into_response()
}

fn html(markup: Markup) -> HttpResponse {
    warp::reply::html(markup.into_string()).into_response()
}

/// Sends a session that skipped a step back to where it can continue.
async fn redirect_for(app: &App, session: QuizSession, err: QuizError) -> HttpResponse {
    match err {
        QuizError::QuestionsNotDrawn => redirect_to(names::QUIZ_URL),
        QuizError::AlreadyScored => redirect_to(names::REMARKS_URL),
        QuizError::CorruptSession(reason) => {
            log::warn!("Resetting a corrupt session: {}", reason);
            if let Some(id) = session.id {
                app.storage.remove_session(id).await;
            }
            redirect_to(names::START_URL)
        }
        err => {
            log::debug!("Redirecting to start: {}", err);
            redirect_to(names::START_URL)
        }
    }
}

async fn selection_page(app: App) -> Result<HttpResponse, Rejection> {
    Ok(html(views::selection_page(app.flow.content(), None)))
}

async fn select(app: App, mut session: QuizSession, form: Form) -> Result<HttpResponse, Rejection> {
    let subject = form.get("subject").map(String::as_str).unwrap_or("");
    let topic = form.get("topic").map(String::as_str).unwrap_or("");

    let existing = match session.id {
        Some(id) => {
            app.storage
                .with_session(id, |state| app.flow.select(state, subject, topic))
                .await
        }
        None => None,
    };
    let selected = match existing {
        Some(selected) => selected,
        None => {
            let mut state = SessionState::default();
            let selected = app.flow.select(&mut state, subject, topic);
            if selected.is_ok() {
                session.issue(app.storage.insert(state).await);
            }
            selected
        }
    };

    match selected {
        Ok(()) => {
            log::info!("Selected {} / {}", subject.trim(), topic.trim());
            Ok(session.finish(redirect_to(names::QUIZ_URL)))
        }
        Err(err @ QuizError::InvalidSelection { .. }) => {
            log::warn!("{}", err);
            let message = format!("Please choose a listed subject and topic ({}).", err);
            let page = views::selection_page(app.flow.content(), Some(&message));
            Ok(session.finish(warp::reply::with_status(html(page), StatusCode::BAD_REQUEST)))
        }
        Err(err) => Ok(session.finish(redirect_for(&app, session, err).await)),
    }
}

async fn quiz_page(app: App, session: QuizSession) -> Result<HttpResponse, Rejection> {
    let drawn = app
        .step(&session, |flow, state| {
            flow.questions(state, &mut rand::thread_rng())
                .map(<[ContentItem]>::to_vec)
        })
        .await;
    let response = match drawn {
        Ok(questions) => html(views::quiz_page(&questions)),
        Err(err) => redirect_for(&app, session, err).await,
    };
    Ok(response)
}

/// Reads `q0..q{n-1}`; a missing or unrecognised value counts as no answer.
fn read_responses(form: &Form, count: usize) -> Vec<Option<Response>> {
    (0..count)
        .map(|i| {
            let value = form.get(&format!("q{}", i))?;
            match value.parse::<Response>() {
                Ok(response) => Some(response),
                Err(err) => {
                    log::warn!("Ignoring answer q{}: {}", i, err);
                    None
                }
            }
        })
        .collect()
}

async fn submit(app: App, session: QuizSession, form: Form) -> Result<HttpResponse, Rejection> {
    let scored = app
        .step(&session, |flow, state| {
            let count = state.questions.as_ref().map_or(0, Vec::len);
            flow.submit(state, &read_responses(&form, count))
        })
        .await;
    let response = match scored {
        Ok(result) => {
            log::info!("Scored {}/{}", result.score, result.total);
            redirect_to(names::REMARKS_URL)
        }
        Err(err) => redirect_for(&app, session, err).await,
    };
    Ok(response)
}

async fn outcome_page(
    app: App,
    session: QuizSession,
    render: fn(&Outcome) -> Markup,
) -> Result<HttpResponse, Rejection> {
    let outcome = app.step(&session, |flow, state| flow.outcome(state)).await;
    let response = match outcome {
        Ok(outcome) => html(render(&outcome)),
        Err(err) => redirect_for(&app, session, err).await,
    };
    Ok(response)
}

async fn handle_rejection(rejection: Rejection) -> Result<HttpResponse, Infallible> {
    let status = if rejection.is_not_found() {
        StatusCode::NOT_FOUND
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        StatusCode::PAYLOAD_TOO_LARGE
    } else if rejection.find::<warp::reject::LengthRequired>().is_some() {
        StatusCode::LENGTH_REQUIRED
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        StatusCode::METHOD_NOT_ALLOWED
    } else {
        log::debug!("Bad request: {:?}", rejection);
        StatusCode::BAD_REQUEST
    };
    let reason = status.canonical_reason().unwrap_or("Error");
    Ok(warp::reply::with_status(reason, status).into_response())
}
