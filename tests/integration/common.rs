//! Fixtures shared by the integration tests

use catalog_crawler::config::Config;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const LISTING_PATH: &str = "/en/moreideas";

/// A configuration pointed at the mock server, with all waits disabled
pub fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.site.base_url = server.uri();
    config.crawler.request_timeout_ms = 5000;
    config.crawler.backoff_base_ms = 0;
    config.crawler.inter_request_delay_ms = 0;
    config.crawler.page_delay_ms = 0;
    config
}

pub fn item_path(id: u32) -> String {
    format!("/en/idea/{}/trip-{}", id, id)
}

fn item_anchors(ids: &[u32]) -> String {
    ids.iter()
        .map(|id| {
            format!(
                r#"<div class="idea"><a href="{}">Trip {}</a></div>"#,
                item_path(*id),
                id
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// First listing page, as a full HTML document
pub fn listing_html(token: Option<&str>, ids: &[u32]) -> String {
    let token_input = token
        .map(|t| format!(r#"<input type="hidden" name="javax.faces.ViewState" value="{}" />"#, t))
        .unwrap_or_default();
    format!(
        r#"<html><head><title>More ideas</title></head><body>
<form id="form" method="post">
<div id="form:ideasDataView">{}</div>
{}
</form></body></html>"#,
        item_anchors(ids),
        token_input
    )
}

/// Later listing page, as a partial-update response
pub fn partial_response(token: Option<&str>, ids: &[u32]) -> String {
    let token_update = token
        .map(|t| {
            format!(
                r#"<update id="j_id__v_0:javax.faces.ViewState:1"><![CDATA[{}]]></update>"#,
                t
            )
        })
        .unwrap_or_default();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<partial-response id="j_id__v_0"><changes>
<update id="form:ideasDataView"><![CDATA[{}]]></update>
{}
</changes></partial-response>"#,
        item_anchors(ids),
        token_update
    )
}

pub fn item_html(id: u32) -> String {
    format!(
        r#"<html><head>
<title>Trip {id}</title>
<meta property="og:title" content="Cancun week {id}" />
<meta property="og:description" content="Seven nights all inclusive" />
<meta property="og:image" content="https://cdn.example.com/{id}.jpg" />
</head><body><span class="price">Desde US$ 1,{id:03}</span></body></html>"#,
        id = id
    )
}

pub async fn mount_listing(server: &MockServer, token: Option<&str>, ids: &[u32]) {
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(token, ids)))
        .mount(server)
        .await;
}

/// Mounts the partial-update page served for `offset`
pub async fn mount_page(server: &MockServer, offset: u32, token: Option<&str>, ids: &[u32]) {
    Mock::given(method("POST"))
        .and(path(LISTING_PATH))
        .and(body_string_contains(format!("ideasDataView_first={}&", offset)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/xml;charset=UTF-8")
                .set_body_string(partial_response(token, ids)),
        )
        .mount(server)
        .await;
}

pub async fn mount_items(server: &MockServer, ids: &[u32]) {
    for id in ids {
        Mock::given(method("GET"))
            .and(path(item_path(*id)))
            .respond_with(ResponseTemplate::new(200).set_body_string(item_html(*id)))
            .mount(server)
            .await;
    }
}
