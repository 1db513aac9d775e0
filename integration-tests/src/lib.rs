//! Scripted transport and wire fixtures shared by the integration tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use azure_tables_client::http::{HttpRequest, HttpResponse, Transport};
use azure_tables_client::table::TableError;

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response.
    pub fn push(&self, response: HttpResponse) -> &Self {
        self.responses.borrow_mut().push_back(response);
        self
    }

    /// Requests sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TableError> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| TableError::Transport("no scripted response left".to_string()))
    }
}

pub const NAMESPACES: &str = r#"xmlns:d="http://schemas.microsoft.com/ado/2007/08/dataservices" xmlns:m="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata" xmlns="http://www.w3.org/2005/Atom""#;

/// `<m:properties>` body for a customer row.
pub fn customer_properties(partition_key: &str, row_key: &str, age: i32) -> String {
    format!(
        r#"<m:properties>
        <d:PartitionKey>{partition_key}</d:PartitionKey>
        <d:RowKey>{row_key}</d:RowKey>
        <d:Timestamp m:type="Edm.DateTime">2020-01-01T00:00:00.000Z</d:Timestamp>
        <d:Age m:type="Edm.Int32">{age}</d:Age>
        <d:Email>{row_key}@example.com</d:Email>
      </m:properties>"#
    )
}

fn entry_element(partition_key: &str, row_key: &str, age: i32, namespaces: &str) -> String {
    format!(
        r#"<entry m:etag="W/&quot;datetime'2020-01-01T00%3A00%3A00Z'&quot;" {namespaces}>
    <id>https://acct.table.example/Customers(PartitionKey='{partition_key}',RowKey='{row_key}')</id>
    <title type="text"></title>
    <updated>2020-01-01T00:00:00Z</updated>
    <author><name /></author>
    <content type="application/xml">
      {}
    </content>
  </entry>"#,
        customer_properties(partition_key, row_key, age)
    )
}

/// Single-entry document as returned by a point read or an insert.
pub fn entry_document(partition_key: &str, row_key: &str, age: i32) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\" standalone=\"yes\"?>\n{}",
        entry_element(partition_key, row_key, age, NAMESPACES)
    )
}

/// Feed holding one customer entry per row key.
pub fn feed_document(partition_key: &str, row_keys: &[&str]) -> String {
    let entries: String = row_keys
        .iter()
        .enumerate()
        .map(|(i, row_key)| entry_element(partition_key, row_key, i as i32, ""))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<feed xml:base="https://acct.table.example/" {NAMESPACES}>
  <title type="text">Customers</title>
  <id>https://acct.table.example/Customers</id>
  <updated>2020-01-01T00:00:00Z</updated>
  <link rel="self" title="Customers" href="Customers" />
  {entries}
</feed>"#
    )
}

/// Feed of table-level entries.
pub fn tables_feed(names: &[&str]) -> String {
    let entries: String = names
        .iter()
        .map(|name| {
            format!(
                r#"<entry>
    <id>https://acct.table.example/Tables('{name}')</id>
    <title type="text"></title>
    <updated>2020-01-01T00:00:00Z</updated>
    <author><name /></author>
    <content type="application/xml">
      <m:properties><d:TableName>{name}</d:TableName></m:properties>
    </content>
  </entry>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<feed xml:base="https://acct.table.example/" {NAMESPACES}>
  <title type="text">Tables</title>
  <id>https://acct.table.example/Tables</id>
  <updated>2020-01-01T00:00:00Z</updated>
  {entries}
</feed>"#
    )
}

/// Service error document.
pub fn error_document(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" standalone="yes"?>
<error xmlns="http://schemas.microsoft.com/ado/2007/08/dataservices/metadata">
  <code>{code}</code>
  <message xml:lang="en-US">{message}</message>
</error>"#
    )
}

/// One embedded response inside a changeset.
pub struct ScriptedPart {
    pub status: u16,
    pub message: &'static str,
    pub etag: Option<&'static str>,
    pub body: Option<String>,
}

impl ScriptedPart {
    pub fn new(status: u16, message: &'static str) -> Self {
        ScriptedPart {
            status,
            message,
            etag: None,
            body: None,
        }
    }

    pub fn etag(mut self, etag: &'static str) -> Self {
        self.etag = Some(etag);
        self
    }

    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

fn write_part(out: &mut String, boundary: &str, part: &ScriptedPart) {
    out.push_str(&format!("--{boundary}\r\n"));
    out.push_str("Content-Type: application/http\r\n");
    out.push_str("Content-Transfer-Encoding: binary\r\n\r\n");
    out.push_str(&format!("HTTP/1.1 {} {}\r\n", part.status, part.message));
    if let Some(etag) = part.etag {
        out.push_str(&format!("ETag: {etag}\r\n"));
    }
    if part.body.is_some() {
        out.push_str("Content-Type: application/atom+xml;charset=utf-8\r\n");
    }
    out.push_str("\r\n");
    if let Some(body) = &part.body {
        out.push_str(body);
        out.push_str("\r\n");
    }
}

/// `$batch` response wrapping `parts` in one changeset.
pub fn changeset_response(batch: &str, changeset: &str, parts: &[ScriptedPart]) -> HttpResponse {
    let mut body = format!("--{batch}\r\n");
    body.push_str(&format!(
        "Content-Type: multipart/mixed; boundary={changeset}\r\n\r\n"
    ));
    for part in parts {
        write_part(&mut body, changeset, part);
    }
    body.push_str(&format!("--{changeset}--\r\n"));
    body.push_str(&format!("--{batch}--\r\n"));
    batch_http_response(batch, body)
}

/// `$batch` response with `part` directly under the batch boundary.
pub fn single_part_response(batch: &str, part: &ScriptedPart) -> HttpResponse {
    let mut body = String::new();
    write_part(&mut body, batch, part);
    body.push_str(&format!("--{batch}--\r\n"));
    batch_http_response(batch, body)
}

pub fn batch_http_response(batch: &str, body: String) -> HttpResponse {
    HttpResponse::new(202, "Accepted", body.into_bytes()).with_header(
        "Content-Type",
        &format!("multipart/mixed; boundary={batch}"),
    )
}
