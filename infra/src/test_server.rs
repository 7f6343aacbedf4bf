//! actix-web stub standing in for the REST APIs the adapters call

use actix_web::dev::ServerHandle;
use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

/// Request as seen by the stub
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }
}

type Responder = dyn Fn(&CapturedRequest) -> (u16, String) + Send + Sync;

struct StubState {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// Server answering each request with whatever the responder returns
///
/// Must be started inside an actix system (`#[actix_web::test]`).
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: ServerHandle,
}

impl StubServer {
    pub async fn start<F>(responder: F) -> Self
    where
        F: Fn(&CapturedRequest) -> (u16, String) + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = web::Data::new(StubState {
            responder: Arc::new(responder),
            requests: Arc::clone(&requests),
        });

        let server = HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .default_service(web::to(respond))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            addr,
            requests,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        // Stop accepting; the returned future only reports completion
        drop(self.handle.stop(false));
    }
}

async fn respond(req: HttpRequest, body: web::Bytes, state: web::Data<StubState>) -> HttpResponse {
    let request = CapturedRequest {
        method: req.method().to_string(),
        path: req.path().to_string(),
        headers: req
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (status, payload) = (state.responder)(&request);
    state.requests.lock().unwrap().push(request);

    HttpResponse::build(StatusCode::from_u16(status).unwrap())
        .content_type("application/json")
        .body(payload)
}
