// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use reanchor_engine::{Anchor, AnchorObject, Document, FileIdentity, Position};
use uuid::Uuid;

#[allow(dead_code)]
pub fn generate_source(functions: usize) -> String {
    let mut source = String::new();
    for i in 0..functions {
        source.push_str(&format!(
            "fn handler_{i}(request: &Request) -> Response {{\n    let body = parse(request);\n    let total = compute_{i}(&body);\n    respond(total)\n}}\n\n"
        ));
    }
    source
}

/// Anchor on the `let total` line of function `index`.
#[allow(dead_code)]
pub fn total_line_anchor(source: &str, index: usize) -> AnchorObject {
    let line = index * 6 + 2;
    let document = Document::new(source);
    let anchor = Anchor::new(Position::new(line, 4), Position::new(line, document.line_len(line)));
    AnchorObject::capture(
        &document,
        anchor,
        FileIdentity::from_path("src/handlers.rs"),
        Uuid::new_v4(),
        Vec::new(),
        5,
    )
}
