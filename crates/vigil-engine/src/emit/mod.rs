//! Artifact emission: the JSON audit record and the generated stub source.
//!
//! `ArtifactEmitter::emit` is pure. Writing to disk is a separate step so
//! the same artifacts can be compared, printed, or persisted.

mod ident;
mod stub;

pub use ident::{IdentAllocator, snake_ident};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use vigil_common::DiscoveryRecord;

#[derive(Debug, Error)]
pub enum EmissionError {
    #[error("failed to serialize discovery record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Both artifacts of one discovery run, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedArtifacts {
    pub audit_file_name: String,
    pub audit_json: String,
    pub stub_file_name: String,
    pub stub_source: String,
}

/// Paths written by [`ArtifactEmitter::write`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    pub audit_path: PathBuf,
    pub stub_path: PathBuf,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactEmitter;

impl ArtifactEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Render the audit JSON and the stub source for `record`.
    ///
    /// Emitting the same record twice yields byte-identical artifacts.
    pub fn emit(&self, record: &DiscoveryRecord) -> Result<EmittedArtifacts, EmissionError> {
        let mut audit_json = serde_json::to_string_pretty(record)?;
        audit_json.push('\n');
        let slug = snake_ident(&record.surface);

        Ok(EmittedArtifacts {
            audit_file_name: format!("{}.discovery.json", slug),
            audit_json,
            stub_file_name: stub::file_name(record),
            stub_source: stub::render(record),
        })
    }

    /// Write both artifacts into `out_dir`, replacing any previous run.
    pub fn write(
        &self,
        artifacts: &EmittedArtifacts,
        out_dir: &Path,
    ) -> Result<WrittenArtifacts, EmissionError> {
        std::fs::create_dir_all(out_dir).map_err(|source| EmissionError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let audit_path = out_dir.join(&artifacts.audit_file_name);
        write_file(&audit_path, &artifacts.audit_json)?;
        let stub_path = out_dir.join(&artifacts.stub_file_name);
        write_file(&stub_path, &artifacts.stub_source)?;

        info!(
            "Wrote {} and {}",
            audit_path.display(),
            stub_path.display()
        );
        Ok(WrittenArtifacts {
            audit_path,
            stub_path,
        })
    }

    /// Read a previously written audit record.
    pub fn load_record(&self, audit_path: &Path) -> Result<DiscoveryRecord, EmissionError> {
        let content = std::fs::read_to_string(audit_path).map_err(|source| EmissionError::Io {
            path: audit_path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Re-emit artifacts from a stored audit record without re-probing.
    pub fn regenerate(
        &self,
        audit_path: &Path,
        out_dir: &Path,
    ) -> Result<WrittenArtifacts, EmissionError> {
        let record = self.load_record(audit_path)?;
        let artifacts = self.emit(&record)?;
        self.write(&artifacts, out_dir)
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), EmissionError> {
    std::fs::write(path, content).map_err(|source| EmissionError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_common::{
        CandidateList, DiscoveryEntry, ElementMetadata, ElementRole, EndpointMetadata,
        EndpointStatus, HttpMethod, SurfaceKind, TargetMetadata,
    };

    fn ui_record() -> DiscoveryRecord {
        let email = CandidateList::new("email input", ["#email", "input[type=email]"]).unwrap();
        let submit = CandidateList::new("login button", ["#login", "button[type=submit]"]).unwrap();
        let banner = CandidateList::new("error message", [".error", "[role=alert]"]).unwrap();
        DiscoveryRecord::new(
            "login",
            "http://localhost:3000",
            SurfaceKind::Ui,
            vec![
                DiscoveryEntry::found(
                    &email,
                    ElementRole::Input,
                    "input[type=email]",
                    TargetMetadata::Element(
                        ElementMetadata::new("input", true).with_input_type(Some("email".into())),
                    ),
                ),
                DiscoveryEntry::found(
                    &submit,
                    ElementRole::Clickable,
                    "button[type=submit]",
                    TargetMetadata::Element(ElementMetadata::new("button", true)),
                ),
                DiscoveryEntry::not_found(&banner, ElementRole::Text),
            ],
        )
    }

    #[test]
    fn test_emit_is_deterministic() {
        let record = ui_record();
        let emitter = ArtifactEmitter::new();
        let first = emitter.emit(&record).unwrap();
        let second = emitter.emit(&record).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.audit_file_name, "login.discovery.json");
        assert_eq!(first.stub_file_name, "login.rs");
    }

    #[test]
    fn test_ui_stub_puts_matched_candidate_first() {
        let artifacts = ArtifactEmitter::new().emit(&ui_record()).unwrap();
        let source = &artifacts.stub_source;

        assert!(source.starts_with("// @generated"));
        let matched = source.find("\"input[type=email]\"").unwrap();
        let fallback = source.find("\"#email\"").unwrap();
        assert!(matched < fallback);
        assert!(source.contains("pub async fn fill_email_input"));
        assert!(source.contains("pub async fn read_email_input"));
        assert!(source.contains("pub async fn click_login_button"));
        assert!(source.contains("Locator::undiscovered("));
        assert!(source.contains("pub async fn text_of_error_message"));
    }

    #[test]
    fn test_api_stub_carries_method_and_auth() {
        let list = CandidateList::new("login", ["/auth/login", "/login"]).unwrap();
        let record = DiscoveryRecord::new(
            "auth api",
            "http://localhost:3000/api",
            SurfaceKind::Api,
            vec![DiscoveryEntry::found(
                &list,
                ElementRole::Endpoint,
                "/auth/login",
                TargetMetadata::Endpoint(EndpointMetadata {
                    method: HttpMethod::Post,
                    status: Some(401),
                    status_class: EndpointStatus::AuthRequired,
                    requires_auth: true,
                    elapsed_ms: 3,
                }),
            )],
        );
        let artifacts = ArtifactEmitter::new().emit(&record).unwrap();
        assert_eq!(artifacts.stub_file_name, "auth_api.rs");
        assert!(artifacts.stub_source.contains("HttpMethod::Post"));
        assert!(artifacts.stub_source.contains("        true,\n"));
        assert!(artifacts.stub_source.contains("pub async fn call_login"));
    }

    #[test]
    fn test_colliding_names_get_distinct_functions() {
        let a = CandidateList::new("Save", ["#save"]).unwrap();
        let b = CandidateList::new("save", ["button.save"]).unwrap();
        let record = DiscoveryRecord::new(
            "editor",
            "http://localhost",
            SurfaceKind::Ui,
            vec![
                DiscoveryEntry::not_found(&a, ElementRole::Clickable),
                DiscoveryEntry::not_found(&b, ElementRole::Clickable),
            ],
        );
        let source = ArtifactEmitter::new().emit(&record).unwrap().stub_source;
        assert!(source.contains("pub fn save() -> Locator"));
        assert!(source.contains("pub fn save_2() -> Locator"));
    }

    #[test]
    fn test_action_names_do_not_collide_with_locators() {
        let submit = CandidateList::new("submit", ["#submit"]).unwrap();
        let click_submit = CandidateList::new("click submit", ["#click-submit"]).unwrap();
        let record = DiscoveryRecord::new(
            "form",
            "http://localhost",
            SurfaceKind::Ui,
            vec![
                DiscoveryEntry::not_found(&submit, ElementRole::Clickable),
                DiscoveryEntry::not_found(&click_submit, ElementRole::Clickable),
            ],
        );
        let source = ArtifactEmitter::new().emit(&record).unwrap().stub_source;

        assert!(source.contains("pub fn submit() -> Locator"));
        assert_eq!(source.matches("fn click_submit<").count(), 1);
        assert!(source.contains("pub fn click_submit_2() -> Locator"));
        assert!(source.contains("pub async fn click_click_submit_2<"));
    }

    #[test]
    fn test_api_call_names_do_not_collide() {
        let login = CandidateList::new("login", ["/auth/login"]).unwrap();
        let call_login = CandidateList::new("call login", ["/call/login"]).unwrap();
        let record = DiscoveryRecord::new(
            "api",
            "http://localhost",
            SurfaceKind::Api,
            vec![
                DiscoveryEntry::not_found(&login, ElementRole::Endpoint),
                DiscoveryEntry::not_found(&call_login, ElementRole::Endpoint),
            ],
        );
        let source = ArtifactEmitter::new().emit(&record).unwrap().stub_source;

        assert_eq!(source.matches("fn call_login<").count(), 1);
        assert!(source.contains("pub fn call_login_2() -> Endpoint"));
        assert!(source.contains("pub async fn call_call_login_2<"));
    }

    #[test]
    fn test_keyword_names_are_escaped() {
        let list = CandidateList::new("try", ["#try"]).unwrap();
        let record = DiscoveryRecord::new(
            "retry",
            "http://localhost",
            SurfaceKind::Ui,
            vec![DiscoveryEntry::not_found(&list, ElementRole::Clickable)],
        );
        let source = ArtifactEmitter::new().emit(&record).unwrap().stub_source;
        assert!(source.contains("pub fn try_() -> Locator"));
        assert!(!source.contains("pub fn try()"));
    }

    #[test]
    fn test_multiline_names_stay_inside_doc_comments() {
        let list = CandidateList::new("banner\npub fn injected() {}", [".banner"]).unwrap();
        let record = DiscoveryRecord::new(
            "home",
            "http://localhost",
            SurfaceKind::Ui,
            vec![DiscoveryEntry::not_found(&list, ElementRole::Text)],
        );
        let source = ArtifactEmitter::new().emit(&record).unwrap().stub_source;

        assert!(source.contains("/// banner pub fn injected() {}: not found"));
        assert!(!source.lines().any(|line| line.starts_with("pub fn injected")));
    }
}
