use motornode_proto::{Method, Request};

/// An endpoint callback: method and request body in, response text out.
pub type Handler = Box<dyn Fn(Method, &str) -> String + Send + Sync>;

/// The endpoint table: an ordered list of `(name, handler)` registrations.
///
/// Populated at startup with the [`Router::route`] builder and immutable
/// afterwards; connection workers share it read-only behind an `Arc`.
/// Matching is on endpoint name only — exact, case-sensitive — and the
/// first registration wins, so at most one handler runs per request.
#[derive(Default)]
pub struct Router {
    endpoints: Vec<(String, Handler)>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an endpoint. Registration order is match order.
    pub fn route(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(Method, &str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.endpoints.push((name.into(), Box::new(handler)));
        self
    }

    /// Invoke the first handler whose name equals the request endpoint.
    ///
    /// `None` is a routing miss, not an error: the caller responds with an
    /// empty body and the status unchanged.
    pub fn dispatch(&self, request: &Request) -> Option<String> {
        self.endpoints
            .iter()
            .find(|(name, _)| *name == request.endpoint)
            .map(|(_, handler)| handler(request.method, &request.body))
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(endpoint: &str) -> Request {
        Request {
            method: Method::Get,
            endpoint: endpoint.to_string(),
            body: String::new(),
        }
    }

    #[test]
    fn dispatch_matches_exact_endpoint() {
        let router = Router::new()
            .route("/a", |_, _| "A".to_string())
            .route("/b", |_, _| "B".to_string());

        assert_eq!(router.dispatch(&request("/b")).as_deref(), Some("B"));
    }

    #[test]
    fn first_registration_wins_on_duplicates() {
        let router = Router::new()
            .route("/dup", |_, _| "first".to_string())
            .route("/dup", |_, _| "second".to_string());

        assert_eq!(router.dispatch(&request("/dup")).as_deref(), Some("first"));
    }

    #[test]
    fn miss_returns_none() {
        let router = Router::new().route("/present", |_, _| String::new());
        assert!(router.dispatch(&request("/status")).is_none());
    }

    #[test]
    fn match_is_case_sensitive() {
        let router = Router::new().route("/Motors", |_, _| "hit".to_string());
        assert!(router.dispatch(&request("/motors")).is_none());
    }

    #[test]
    fn handler_sees_method_and_body() {
        let router = Router::new().route("/echo", |method, body| {
            format!("{method:?}:{body}")
        });

        let req = Request {
            method: Method::Post,
            endpoint: "/echo".to_string(),
            body: "payload".to_string(),
        };
        assert_eq!(router.dispatch(&req).as_deref(), Some("Post:payload"));
    }
}
