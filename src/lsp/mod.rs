//! Glow Language Server Protocol implementation.
//!
//! A thin transport around the completion engine: documents are synced in
//! full, and every completion request runs the engine over the current text.
//! No diagnostics are published; incomplete documents are the normal state
//! while editing.

use dashmap::DashMap;
use ropey::Rope;
use std::path::PathBuf;
use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::complete::{CandidateKind, CompletionEngine, Suggestion};
use crate::schema::CoreSchema;

/// Document state tracked by the server
#[derive(Debug)]
pub struct Document {
    /// The document content as a rope for efficient editing
    pub content: Rope,
    /// Path to the document
    pub path: Option<PathBuf>,
}

impl Document {
    pub fn new(content: &str) -> Self {
        Self {
            content: Rope::from_str(content),
            path: None,
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }

    pub fn text(&self) -> String {
        self.content.to_string()
    }
}

/// The Glow Language Server
pub struct GlowLanguageServer {
    /// LSP client for sending notifications
    client: Client,
    /// Open documents indexed by URI
    documents: DashMap<Url, Document>,
    /// Schema lookup tables, loaded once at startup
    schema: Arc<CoreSchema>,
    /// Server capabilities
    capabilities: Arc<ServerCapabilities>,
}

impl GlowLanguageServer {
    pub fn new(client: Client, schema: Arc<CoreSchema>) -> Self {
        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(true),
                    })),
                    ..Default::default()
                },
            )),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(vec![" ".to_string(), "-".to_string()]),
                resolve_provider: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        Self {
            client,
            documents: DashMap::new(),
            schema,
            capabilities: Arc::new(capabilities),
        }
    }

    /// Run the engine at the given position and convert to LSP items.
    fn get_completions(&self, uri: &Url, position: Position) -> Vec<CompletionItem> {
        let Some(doc) = self.documents.get(uri) else {
            return Vec::new();
        };
        let text = doc.text();
        let engine = CompletionEngine::new(&self.schema);
        let suggestions =
            engine.complete(&text, position.line as usize, position.character as usize);
        suggestions
            .into_iter()
            .map(|s| suggestion_to_item(s, &text))
            .collect()
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for GlowLanguageServer {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: (*self.capabilities).clone(),
            server_info: Some(ServerInfo {
                name: "glow-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "Glow language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let content = params.text_document.text;

        let mut doc = Document::new(&content);
        if let Ok(path) = uri.to_file_path() {
            doc = doc.with_path(path);
        }
        self.documents.insert(uri, doc);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;

        // Full sync: the last change carries the whole document
        if let Some(change) = params.content_changes.last() {
            if let Some(mut doc) = self.documents.get_mut(&uri) {
                doc.content = Rope::from_str(&change.text);
            }
        }
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;

        if let Some(content) = params.text {
            if let Some(mut doc) = self.documents.get_mut(&uri) {
                doc.content = Rope::from_str(&content);
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.remove(&params.text_document.uri);
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let items = self.get_completions(&uri, position);
        Ok(Some(CompletionResponse::Array(items)))
    }
}

/// Convert one engine suggestion into an LSP completion item
fn suggestion_to_item(s: Suggestion, text: &str) -> CompletionItem {
    let text_edit = s.overwrite_range.map(|(start, end)| {
        let (sl, sc) = offset_to_position(text, start);
        let (el, ec) = offset_to_position(text, end);
        CompletionTextEdit::Edit(TextEdit {
            range: Range {
                start: Position::new(sl as u32, sc as u32),
                end: Position::new(el as u32, ec as u32),
            },
            new_text: s.insert_text.clone(),
        })
    });

    let command = s.retrigger.then(|| Command {
        title: "Trigger Suggest".to_string(),
        command: "editor.action.triggerSuggest".to_string(),
        arguments: None,
    });

    let documentation = s.docs.map(|value| {
        Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        })
    });

    CompletionItem {
        label: s.label,
        kind: Some(kind_to_lsp(s.kind)),
        detail: s.detail,
        documentation,
        sort_text: s.sort_text,
        insert_text: Some(s.insert_text),
        text_edit,
        preselect: s.preselect.then_some(true),
        command,
        ..Default::default()
    }
}

fn kind_to_lsp(kind: CandidateKind) -> CompletionItemKind {
    match kind {
        CandidateKind::Class => CompletionItemKind::CLASS,
        CandidateKind::Constant => CompletionItemKind::CONSTANT,
        CandidateKind::Enum => CompletionItemKind::ENUM,
        CandidateKind::EnumMember => CompletionItemKind::ENUM_MEMBER,
        CandidateKind::Event => CompletionItemKind::EVENT,
        CandidateKind::Field => CompletionItemKind::FIELD,
        CandidateKind::Interface => CompletionItemKind::INTERFACE,
        CandidateKind::Keyword => CompletionItemKind::KEYWORD,
        CandidateKind::Property => CompletionItemKind::PROPERTY,
        CandidateKind::Struct => CompletionItemKind::STRUCT,
        CandidateKind::Variable => CompletionItemKind::VARIABLE,
    }
}

/// Convert a byte offset to (line, column) position
fn offset_to_position(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 0;
    let mut col = 0;
    let mut current_offset = 0;

    for ch in source.chars() {
        if current_offset >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 0;
        } else {
            col += 1;
        }
        current_offset += ch.len_utf8();
    }

    (line, col)
}

/// Run the language server over stdio
pub async fn run_server(schema: CoreSchema) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let schema = Arc::new(schema);
    let (service, socket) =
        tower_lsp::LspService::new(move |client| GlowLanguageServer::new(client, schema.clone()));
    tower_lsp::Server::new(stdin, stdout, socket)
        .serve(service)
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complete::Candidate;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offset_to_position() {
        let text = "wifi:\n  ssid: mynet\n";
        assert_eq!(offset_to_position(text, 0), (0, 0));
        assert_eq!(offset_to_position(text, 5), (0, 5));
        assert_eq!(offset_to_position(text, 8), (1, 2));
        assert_eq!(offset_to_position(text, text.len()), (2, 0));
    }

    #[test]
    fn test_suggestion_maps_to_item_with_edit() {
        let text = "wifi:\n  ssi";
        let mut c = Candidate::new("ssid", CandidateKind::Property, "ssid: ");
        c.detail = Some("Required".to_string());
        let s = Suggestion::from_candidate(c, Some((8, 11)));
        let item = suggestion_to_item(s, text);

        assert_eq!(item.label, "ssid");
        assert_eq!(item.kind, Some(CompletionItemKind::PROPERTY));
        assert_eq!(item.detail.as_deref(), Some("Required"));
        let Some(CompletionTextEdit::Edit(edit)) = item.text_edit else {
            panic!("expected a text edit");
        };
        assert_eq!(edit.range.start, Position::new(1, 2));
        assert_eq!(edit.range.end, Position::new(1, 5));
        assert_eq!(edit.new_text, "ssid: ");
        assert!(item.command.is_none());
        assert!(item.preselect.is_none());
    }

    #[test]
    fn test_retrigger_becomes_trigger_suggest_command() {
        let c = Candidate::new("sensor", CandidateKind::Class, "sensor:\n  - platform: ")
            .retrigger();
        let item = suggestion_to_item(Suggestion::from_candidate(c, None), "");
        let command = item.command.expect("retrigger should map to a command");
        assert_eq!(command.command, "editor.action.triggerSuggest");
        assert!(item.text_edit.is_none());
    }

    #[test]
    fn test_docs_render_as_markdown() {
        let c = Candidate::new("delay", CandidateKind::Keyword, "- delay: ")
            .docs(Some("Pause the automation.".to_string()));
        let item = suggestion_to_item(Suggestion::from_candidate(c, None), "");
        let Some(Documentation::MarkupContent(content)) = item.documentation else {
            panic!("expected markdown documentation");
        };
        assert_eq!(content.kind, MarkupKind::Markdown);
        assert_eq!(content.value, "Pause the automation.");
    }

    #[test]
    fn test_completion_end_to_end_through_server_schema() {
        let schema = CoreSchema::from_json(
            r#"{
                "components": {
                    "wifi": {
                        "schema": {
                            "properties": {
                                "ssid": {"schema": {"type": "string"}, "requirement": "required"},
                                "password": {"schema": {"type": "string"}}
                            }
                        }
                    }
                }
            }"#,
        )
        .unwrap();
        let engine = CompletionEngine::new(&schema);
        let text = "wifi:\n  ";
        let items: Vec<CompletionItem> = engine
            .complete(text, 1, 2)
            .into_iter()
            .map(|s| suggestion_to_item(s, text))
            .collect();
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["ssid", "password"]);
    }
}
