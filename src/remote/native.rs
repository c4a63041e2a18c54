//! Native transport: a worker thread owns the HTTP agent so the frame loop
//! never waits on the network.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use super::{ApiCall, Method, SESSION_HEADER, ScoreApi, parse_reply, rejection};
use crate::scores::{BackendError, ScoreBackend, ScoreReply, ScoreRequest, Ticket};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

type Job = (Ticket, ScoreRequest);

pub struct HttpBackend {
    jobs: Option<Sender<Job>>,
    replies: Receiver<(Ticket, ScoreReply)>,
    /// Replies produced without reaching the worker
    undelivered: Vec<(Ticket, ScoreReply)>,
    worker: Option<thread::JoinHandle<()>>,
}

impl HttpBackend {
    /// Start the worker thread for `api`
    pub fn spawn(api: ScoreApi) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (reply_tx, reply_rx) = mpsc::channel();
        log::info!("Score service at {}", api.base_url());
        let worker = thread::Builder::new()
            .name("score-api".to_string())
            .spawn(move || serve(api, job_rx, reply_tx));
        let (jobs, worker) = match worker {
            Ok(handle) => (Some(job_tx), Some(handle)),
            Err(e) => {
                log::warn!("Could not start score worker: {e}");
                (None, None)
            }
        };
        Self {
            jobs,
            replies: reply_rx,
            undelivered: Vec::new(),
            worker,
        }
    }
}

impl ScoreBackend for HttpBackend {
    fn send(&mut self, ticket: Ticket, request: ScoreRequest) {
        let Some(jobs) = &self.jobs else {
            let reply = ScoreReply::failed(&request, BackendError::Unreachable("no worker".into()));
            self.undelivered.push((ticket, reply));
            return;
        };
        if let Err(mpsc::SendError((ticket, request))) = jobs.send((ticket, request)) {
            let reply =
                ScoreReply::failed(&request, BackendError::Unreachable("worker stopped".into()));
            self.undelivered.push((ticket, reply));
        }
    }

    fn poll(&mut self) -> Vec<(Ticket, ScoreReply)> {
        let mut replies = std::mem::take(&mut self.undelivered);
        replies.extend(self.replies.try_iter());
        replies
    }
}

impl Drop for HttpBackend {
    fn drop(&mut self) {
        // Closing the job channel lets the worker finish its queue and exit
        self.jobs = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Score worker panicked");
            }
        }
    }
}

fn serve(api: ScoreApi, jobs: Receiver<Job>, replies: Sender<(Ticket, ScoreReply)>) {
    let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
    for (ticket, request) in jobs {
        let reply = match api.call(&request) {
            Ok(call) => match perform(&agent, &api, &call) {
                Ok(body) => parse_reply(&request, &body),
                Err(e) => ScoreReply::failed(&request, e),
            },
            Err(e) => ScoreReply::failed(&request, e),
        };
        if replies.send((ticket, reply)).is_err() {
            break;
        }
    }
    log::debug!("Score worker exiting");
}

fn perform(agent: &ureq::Agent, api: &ScoreApi, call: &ApiCall) -> Result<String, BackendError> {
    let mut request = agent.request(call.method.as_str(), &call.url);
    for (key, value) in &call.query {
        request = request.query(key, value);
    }
    if let Some(session) = api.session_id() {
        request = request.set(SESSION_HEADER, session);
    }
    let response = match (call.method, &call.body) {
        (Method::Post, Some(body)) => request
            .set("Content-Type", "application/json")
            .send_string(body),
        _ => request.call(),
    };
    match response {
        Ok(response) => response
            .into_string()
            .map_err(|e| BackendError::Malformed(e.to_string())),
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(rejection(status, &body))
        }
        Err(e) => Err(BackendError::Unreachable(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn wait_for_reply(backend: &mut HttpBackend) -> Vec<(Ticket, ScoreReply)> {
        let deadline = Instant::now() + Duration::from_secs(20);
        loop {
            let replies = backend.poll();
            if !replies.is_empty() || Instant::now() > deadline {
                return replies;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_unreachable_service_replies_with_error() {
        // nothing listens on the discard port
        let mut backend = HttpBackend::spawn(ScoreApi::new("http://127.0.0.1:9/api"));
        backend.send(Ticket(3), ScoreRequest::Stats { wallet: None });
        let replies = wait_for_reply(&mut backend);
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0].0, Ticket(3));
        assert!(matches!(
            replies[0].1,
            ScoreReply::Stats(Err(BackendError::Unreachable(_)))
        ));
    }
}
