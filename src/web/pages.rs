use actix_web::{HttpResponse, http::header};
use serde::Deserialize;

/// Notice carried across a redirect, the moral equivalent of a flash message.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
    pub error: Option<String>,
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

pub fn redirect_to(path: &str) -> HttpResponse {
    HttpResponse::Found()
        .header(header::LOCATION, path)
        .finish()
}

fn redirect_with(path: &str, key: &str, message: &str) -> HttpResponse {
    let query = serde_urlencoded::to_string(&[(key, message)]).unwrap_or_default();
    redirect_to(format!("{}?{}", path, query).as_str())
}

pub fn redirect_with_notice(path: &str, message: &str) -> HttpResponse {
    redirect_with(path, "notice", message)
}

pub fn redirect_with_error(path: &str, message: &str) -> HttpResponse {
    redirect_with(path, "error", message)
}

pub fn notice_block(query: &NoticeQuery) -> String {
    let mut out = String::new();
    if let Some(x) = query.notice.as_ref() {
        out.push_str(format!("<p class=\"notice\">{}</p>", escape_html(x)).as_str());
    }
    if let Some(x) = query.error.as_ref() {
        out.push_str(format!("<p class=\"error\">{}</p>", escape_html(x)).as_str());
    }
    out
}

pub fn page(title: &str, body: &str) -> HttpResponse {
    let html = format!(
        "<!DOCTYPE html>\n<html><head><title>{}</title></head><body>{}</body></html>",
        escape_html(title), body
    );
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }

    #[test]
    fn notice_redirect_encodes_query() {
        let resp = redirect_with_error("/login", "Not authorized.");
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp.headers().get(actix_web::http::header::LOCATION).unwrap();
        assert_eq!(location.to_str().unwrap(), "/login?error=Not+authorized.");
    }
}
