//! Rust source stubs rendered from a discovery record.
//!
//! Rendering is a pure function of the record: entries are walked in
//! record order and nothing else feeds the output.

use super::ident::{IdentAllocator, snake_ident};
use vigil_common::{DiscoveryEntry, DiscoveryRecord, ElementRole, HttpMethod, SurfaceKind};

pub fn render(record: &DiscoveryRecord) -> String {
    let mut output = header(record);
    let mut idents = IdentAllocator::default();
    match record.kind {
        SurfaceKind::Ui => {
            output.push_str("use vigil_engine::backend::Backend;\n");
            output.push_str("use vigil_engine::page::{Locator, PageError, PageSession};\n");
            for entry in &record.entries {
                let ident =
                    idents.allocate_with(&entry.logical_name, action_prefixes(entry.role));
                output.push('\n');
                output.push_str(&render_ui_entry(entry, &ident));
            }
        }
        SurfaceKind::Api => {
            output.push_str("use vigil_engine::HttpMethod;\n");
            output.push_str("use vigil_engine::api::{ApiClient, ApiError, Endpoint};\n");
            output.push_str("use vigil_engine::transport::{HttpResponse, HttpTransport};\n");
            for entry in &record.entries {
                let ident = idents.allocate_with(&entry.logical_name, &[CALL_PREFIX]);
                output.push('\n');
                output.push_str(&render_api_entry(entry, &ident));
            }
        }
    }
    output
}

const CALL_PREFIX: &str = "call_";

/// Names of the wrapper functions emitted next to a UI locator.
fn action_prefixes(role: ElementRole) -> &'static [&'static str] {
    match role {
        ElementRole::Input => &["fill_", "read_"],
        ElementRole::Clickable => &["click_"],
        ElementRole::Text | ElementRole::Endpoint => &["text_of_"],
    }
}

/// `name` on a single line, for use inside `///` comments.
fn doc_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// File name of the stub for `record`.
pub fn file_name(record: &DiscoveryRecord) -> String {
    format!("{}.rs", snake_ident(&record.surface))
}

fn header(record: &DiscoveryRecord) -> String {
    format!(
        "// @generated by vigil from the {:?} discovery of {} at {}.\n\
         // Regenerate with `vigil regenerate --record {}.discovery.json`; do not edit.\n\
         \n\
         #![allow(dead_code)]\n\
         \n",
        record.surface,
        record.base_url,
        record
            .discovered_at
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        snake_ident(&record.surface),
    )
}

fn string_slice(items: &[String]) -> String {
    let mut output = String::from("&[\n");
    for item in items {
        output.push_str(&format!("            {:?},\n", item));
    }
    output.push_str("        ]");
    output
}

fn render_ui_entry(entry: &DiscoveryEntry, ident: &str) -> String {
    let candidates = entry.ordered_candidates();
    let mut output = String::new();

    match &entry.matched {
        Some(matched) => {
            output.push_str(&format!(
                "/// {}: matched {:?} ({}).\n",
                doc_name(&entry.logical_name),
                matched,
                role_name(entry.role)
            ));
            output.push_str(&format!("pub fn {}() -> Locator {{\n", ident));
            output.push_str(&format!(
                "    Locator::discovered(\n        {:?},\n        {},\n    )\n}}\n",
                entry.logical_name,
                string_slice(&candidates)
            ));
        }
        None => {
            output.push_str(&format!(
                "/// {}: not found during discovery; resolving it fails.\n",
                doc_name(&entry.logical_name)
            ));
            output.push_str(&format!("pub fn {}() -> Locator {{\n", ident));
            output.push_str(&format!(
                "    Locator::undiscovered(\n        {:?},\n        {},\n    )\n}}\n",
                entry.logical_name,
                string_slice(&candidates)
            ));
        }
    }

    let session = "page: &mut PageSession<'_, B>";
    match entry.role {
        ElementRole::Input => {
            output.push_str(&format!(
                "\npub async fn fill_{0}<B: Backend + ?Sized>(\n    {1},\n    value: &str,\n) -> Result<(), PageError> {{\n    page.fill(&{0}(), value).await\n}}\n",
                ident, session
            ));
            output.push_str(&format!(
                "\npub async fn read_{0}<B: Backend + ?Sized>(\n    {1},\n) -> Result<String, PageError> {{\n    page.value_of(&{0}()).await\n}}\n",
                ident, session
            ));
        }
        ElementRole::Clickable => {
            output.push_str(&format!(
                "\npub async fn click_{0}<B: Backend + ?Sized>(\n    {1},\n) -> Result<(), PageError> {{\n    page.click(&{0}()).await\n}}\n",
                ident, session
            ));
        }
        ElementRole::Text | ElementRole::Endpoint => {
            output.push_str(&format!(
                "\npub async fn text_of_{0}<B: Backend + ?Sized>(\n    {1},\n) -> Result<String, PageError> {{\n    page.text_of(&{0}()).await\n}}\n",
                ident, session
            ));
        }
    }
    output
}

fn render_api_entry(entry: &DiscoveryEntry, ident: &str) -> String {
    let candidates = entry.ordered_candidates();
    let mut output = String::new();

    match (&entry.matched, entry.metadata.as_ref()) {
        (Some(matched), Some(vigil_common::TargetMetadata::Endpoint(meta))) => {
            let status = meta
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".into());
            output.push_str(&format!(
                "/// {}: {} {:?} answered {}{}.\n",
                doc_name(&entry.logical_name),
                meta.method,
                matched,
                status,
                if meta.requires_auth {
                    ", requires authorization"
                } else {
                    ""
                }
            ));
            output.push_str(&format!("pub fn {}() -> Endpoint {{\n", ident));
            output.push_str(&format!(
                "    Endpoint::discovered(\n        {:?},\n        HttpMethod::{},\n        {},\n        {},\n    )\n}}\n",
                entry.logical_name,
                meta.method.variant_name(),
                string_slice(&candidates),
                meta.requires_auth
            ));
        }
        _ => {
            output.push_str(&format!(
                "/// {}: no route found during discovery; calling it fails.\n",
                doc_name(&entry.logical_name)
            ));
            output.push_str(&format!("pub fn {}() -> Endpoint {{\n", ident));
            output.push_str(&format!(
                "    Endpoint::undiscovered(\n        {:?},\n        HttpMethod::{},\n        {},\n    )\n}}\n",
                entry.logical_name,
                HttpMethod::Get.variant_name(),
                string_slice(&candidates)
            ));
        }
    }

    output.push_str(&format!(
        "\npub async fn {1}{0}<T: HttpTransport>(\n    client: &ApiClient<T>,\n    body: Option<serde_json::Value>,\n) -> Result<HttpResponse, ApiError> {{\n    client.call(&{0}(), body).await\n}}\n",
        ident, CALL_PREFIX
    ));
    output
}

fn role_name(role: ElementRole) -> &'static str {
    match role {
        ElementRole::Input => "input",
        ElementRole::Clickable => "clickable",
        ElementRole::Text => "text",
        ElementRole::Endpoint => "endpoint",
    }
}
