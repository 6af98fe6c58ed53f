use reqwest::{Client, Response};

use crate::{Error, Result};

/// Requests a page and returns its raw body.
pub async fn request_page(client: &Client, url: &str) -> Result<Vec<u8>> {
    tracing::info!("Fetching page: {url}");
    let res = send_get(client, url).await?;
    let body = res.bytes().await.map_err(|e| Error::transport(url, e))?;
    Ok(body.to_vec())
}

/// Sends a plain GET and turns 4xx/5xx responses into `Error::HttpStatus`.
/// The body is left unread so callers can stream it.
pub(crate) async fn send_get(client: &Client, url: &str) -> Result<Response> {
    let res = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::transport(url, e))?;

    let status = res.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(Error::HttpStatus {
            url: url.into(),
            status,
        });
    }
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn returns_body_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let body = request_page(&Client::new(), &format!("{}/archive", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, b"<html></html>");
    }

    #[tokio::test]
    async fn server_error_is_a_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = format!("{}/archive", server.uri());
        match request_page(&Client::new(), &url).await {
            Err(Error::HttpStatus { url: failed, status }) => {
                assert_eq!(failed, url);
                assert_eq!(status.as_u16(), 503);
            }
            other => panic!("Expected HttpStatus error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Bind an ephemeral port and release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/archive", listener.local_addr().unwrap());
        drop(listener);

        let err = request_page(&Client::new(), &url).await.unwrap_err();
        assert_eq!(err.kind(), "TransportError");
    }
}
