use reqwest::blocking::{Request, Response};

/// Executes a blocking HTTP request.
pub trait HttpClient {
    fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
