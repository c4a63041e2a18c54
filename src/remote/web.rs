//! Browser transport over `fetch`
//!
//! Each request runs as a local future; its reply lands in a shared inbox
//! that the next frame drains.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{Request, RequestCredentials, RequestInit, Response};

use super::{ApiCall, DEFAULT_API_BASE, SESSION_HEADER, ScoreApi, parse_reply, rejection};
use crate::scores::{BackendError, ScoreBackend, ScoreReply, ScoreRequest, Ticket};

type Inbox = Rc<RefCell<Vec<(Ticket, ScoreReply)>>>;

pub struct FetchBackend {
    api: Rc<ScoreApi>,
    inbox: Inbox,
}

impl FetchBackend {
    pub fn new(api: ScoreApi) -> Self {
        log::info!("Score service at {}", api.base_url());
        Self {
            api: Rc::new(api),
            inbox: Rc::default(),
        }
    }

    /// The API served next to the page, at `<origin>/api`
    pub fn same_origin() -> ScoreApi {
        let origin = web_sys::window().and_then(|w| w.location().origin().ok());
        match origin {
            Some(origin) => ScoreApi::new(format!("{origin}/api")),
            None => ScoreApi::new(DEFAULT_API_BASE),
        }
    }
}

impl ScoreBackend for FetchBackend {
    fn send(&mut self, ticket: Ticket, request: ScoreRequest) {
        let api = Rc::clone(&self.api);
        let inbox = Rc::clone(&self.inbox);
        spawn_local(async move {
            let reply = match api.call(&request) {
                Ok(call) => match fetch_text(&api, &call).await {
                    Ok(body) => parse_reply(&request, &body),
                    Err(e) => ScoreReply::failed(&request, e),
                },
                Err(e) => ScoreReply::failed(&request, e),
            };
            inbox.borrow_mut().push((ticket, reply));
        });
    }

    fn poll(&mut self) -> Vec<(Ticket, ScoreReply)> {
        std::mem::take(&mut *self.inbox.borrow_mut())
    }
}

fn js_error(e: JsValue) -> BackendError {
    BackendError::Unreachable(format!("{e:?}"))
}

fn url_with_query(call: &ApiCall) -> String {
    if call.query.is_empty() {
        return call.url.clone();
    }
    let query: Vec<String> = call
        .query
        .iter()
        .map(|(key, value)| format!("{key}={}", String::from(js_sys::encode_uri_component(value))))
        .collect();
    format!("{}?{}", call.url, query.join("&"))
}

async fn fetch_text(api: &ScoreApi, call: &ApiCall) -> Result<String, BackendError> {
    let window = web_sys::window().ok_or_else(|| BackendError::Unreachable("no window".into()))?;

    let init = RequestInit::new();
    init.set_method(call.method.as_str());
    // the session cookie identifies guests
    init.set_credentials(RequestCredentials::Include);
    if let Some(body) = &call.body {
        init.set_body(&JsValue::from_str(body));
    }
    let request =
        Request::new_with_str_and_init(&url_with_query(call), &init).map_err(js_error)?;
    let headers = request.headers();
    headers
        .set("Content-Type", "application/json")
        .map_err(js_error)?;
    if let Some(session) = api.session_id() {
        headers.set(SESSION_HEADER, session).map_err(js_error)?;
    }

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| BackendError::Malformed("fetch did not return a Response".into()))?;
    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    let body = text.as_string().unwrap_or_default();
    if response.ok() {
        Ok(body)
    } else {
        Err(rejection(response.status(), &body))
    }
}
