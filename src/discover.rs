use std::sync::Arc;

use reqwest::Client;
use url::Url;

use crate::config::{ExtractionSpec, OnError};
use crate::parse::{parse_html, Carrier, Selection};
use crate::request::request_page;
use crate::{Error, Result};

/// A link that couldn't be processed when running with [`OnError::Skip`].
#[derive(Debug)]
pub struct ItemFailure {
    pub url: String,
    pub error: Error,
}

/// Links found on the issue pages, plus the pages that were skipped.
#[derive(Debug, Default)]
pub struct PdfDiscovery {
    pub links: Vec<String>,
    pub failures: Vec<ItemFailure>,
}

/// Fetches the archive page and returns the issue links in document order.
pub async fn discover_issues(
    client: &Client,
    archive_url: &str,
    spec: &ExtractionSpec,
) -> Result<Vec<String>> {
    tracing::info!("Parsing issues from main page: {archive_url}");
    let selection = Selection::new("div", &spec.class_filter, Carrier::Descendant, &spec.attribute);

    let links = links_on_page(client, archive_url, selection).await?;
    for link in &links {
        tracing::info!("Found issue link: {link}");
    }
    tracing::info!("Found {} issue links", links.len());
    Ok(links)
}

/// Visits every issue page in order and collects the links of anchors whose text contains
/// `link_text`.
/// With [`OnError::Abort`] the first failing page ends the pass; nothing after it is visited.
pub async fn discover_pdfs(
    client: &Client,
    issue_links: &[String],
    spec: &ExtractionSpec,
    link_text: &str,
    on_error: OnError,
) -> Result<PdfDiscovery> {
    tracing::info!("Parsing PDF links from {} issue pages", issue_links.len());
    let selection = Selection::new("a", &spec.class_filter, Carrier::Element, &spec.attribute)
        .with_text(link_text);

    let mut found = PdfDiscovery::default();
    for issue_link in issue_links {
        match links_on_page(client, issue_link, selection.clone()).await {
            Ok(links) => {
                for link in &links {
                    tracing::info!("Found PDF link: {link}");
                }
                found.links.extend(links);
            }
            Err(error) if on_error == OnError::Skip => {
                tracing::warn!(kind = error.kind(), "Skipping issue page {issue_link}: {error}");
                found.failures.push(ItemFailure {
                    url: issue_link.clone(),
                    error,
                });
            }
            Err(error) => return Err(error),
        }
    }

    tracing::info!("Found {} PDF links", found.links.len());
    Ok(found)
}

async fn links_on_page(
    client: &Client,
    page_url: &str,
    selection: Selection,
) -> Result<Vec<String>> {
    let html = request_page(client, page_url).await?;
    let values = parse_html(Arc::new(html), selection).await?;
    Ok(resolve_links(page_url, values))
}

/// Makes relative hrefs absolute against the page they were found on.
/// Empty and fragment-only values point back at the page itself and are dropped.
/// Values that can't be resolved are kept as they are.
fn resolve_links(page_url: &str, values: Vec<String>) -> Vec<String> {
    let base = Url::parse(page_url).ok();
    values
        .into_iter()
        .filter(|value| {
            let value = value.trim();
            !value.is_empty() && !value.starts_with('#')
        })
        .map(|value| match base.as_ref().map(|base| base.join(&value)) {
            Some(Ok(url)) => url.into(),
            _ => value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn issue_spec() -> ExtractionSpec {
        ExtractionSpec::new("obj_issue_summary", "href")
    }

    fn pdf_spec() -> ExtractionSpec {
        ExtractionSpec::new("obj_galley_link pdf", "href")
    }

    async fn serve(server: &MockServer, at: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn relative_links_are_resolved() {
        let links = resolve_links(
            "https://j.org/index.php/j/issue/archive",
            vec![
                "https://other.org/a".into(),
                "view/5".into(),
                "/index.php/j/issue/view/6".into(),
            ],
        );
        assert_eq!(
            links,
            [
                "https://other.org/a",
                "https://j.org/index.php/j/issue/view/5",
                "https://j.org/index.php/j/issue/view/6"
            ]
        );
    }

    #[test]
    fn self_links_are_dropped() {
        let page = "https://j.org/index.php/j/issue/archive";
        let links = resolve_links(
            page,
            vec!["".into(), "  ".into(), "#top".into(), "view/5".into()],
        );
        assert_eq!(links, ["https://j.org/index.php/j/issue/view/5"]);

        let links = resolve_links("not a url", vec!["".into(), "#top".into()]);
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn empty_issue_href_does_not_refetch_archive() {
        let server = MockServer::start().await;
        let uri = server.uri();
        let archive = format!(
            r##"<div class="obj_issue_summary"><a href="">Current</a></div>
               <div class="obj_issue_summary"><a href="#archive">Jump</a></div>
               <div class="obj_issue_summary"><a href="{uri}/issue/A">A</a></div>"##
        );
        Mock::given(method("GET"))
            .and(path("/archive"))
            .respond_with(ResponseTemplate::new(200).set_body_string(archive))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{uri}/archive");
        let links = discover_issues(&Client::new(), &url, &issue_spec()).await.unwrap();
        assert_eq!(links, [format!("{uri}/issue/A")]);
    }

    #[test]
    fn unparseable_base_keeps_values() {
        let links = resolve_links("not a url", vec!["view/5".into()]);
        assert_eq!(links, ["view/5"]);
    }

    #[tokio::test]
    async fn issues_in_document_order() {
        let server = MockServer::start().await;
        let uri = server.uri();
        let archive = format!(
            r#"<div class="obj_issue_summary"><a href="{uri}/issue/A">A</a></div>
               <div class="obj_issue_summary"><a href="{uri}/issue/B">B</a></div>
               <div class="obj_issue_summary"><a href="{uri}/issue/C">C</a></div>"#
        );
        serve(&server, "/archive", 200, archive).await;

        let links = discover_issues(&Client::new(), &format!("{uri}/archive"), &issue_spec())
            .await
            .unwrap();
        assert_eq!(
            links,
            [format!("{uri}/issue/A"), format!("{uri}/issue/B"), format!("{uri}/issue/C")]
        );
    }

    #[tokio::test]
    async fn archive_without_issues_is_empty() {
        let server = MockServer::start().await;
        serve(&server, "/archive", 200, "<p>No issues yet</p>".into()).await;

        let url = format!("{}/archive", server.uri());
        let links = discover_issues(&Client::new(), &url, &issue_spec()).await.unwrap();
        assert!(links.is_empty());
    }

    #[tokio::test]
    async fn pdf_links_skip_other_galleys() {
        let server = MockServer::start().await;
        let issue = r#"
            <a class="obj_galley_link pdf" href="/article/view/1/10">PDF FULL TEXT</a>
            <a class="obj_galley_link pdf" href="/article/view/1/11">EPUB FULL TEXT</a>"#;
        serve(&server, "/issue/1", 200, issue.into()).await;

        let issues = vec![format!("{}/issue/1", server.uri())];
        let found = discover_pdfs(
            &Client::new(),
            &issues,
            &pdf_spec(),
            "PDF FULL TEXT",
            OnError::Abort,
        )
        .await
        .unwrap();
        assert_eq!(found.links, [format!("{}/article/view/1/10", server.uri())]);
        assert!(found.failures.is_empty());
    }

    #[tokio::test]
    async fn skip_policy_records_failed_pages() {
        let server = MockServer::start().await;
        let uri = server.uri();
        serve(&server, "/issue/1", 404, String::new()).await;
        serve(
            &server,
            "/issue/2",
            200,
            r#"<a class="obj_galley_link pdf" href="/article/view/2/20">PDF FULL TEXT</a>"#.into(),
        )
        .await;

        let issues = vec![format!("{uri}/issue/1"), format!("{uri}/issue/2")];
        let found = discover_pdfs(
            &Client::new(),
            &issues,
            &pdf_spec(),
            "PDF FULL TEXT",
            OnError::Skip,
        )
        .await
        .unwrap();
        assert_eq!(found.links, [format!("{uri}/article/view/2/20")]);
        assert_eq!(found.failures.len(), 1);
        assert_eq!(found.failures[0].url, format!("{uri}/issue/1"));
        assert_eq!(found.failures[0].error.kind(), "HTTPStatusError");
    }
}
