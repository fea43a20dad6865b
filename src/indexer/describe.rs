//! Embedding text for code chunks: a short description followed by the code.
use super::languages::Language;

const MAX_SIGNATURE_CHARS: usize = 120;

/// One-line description of a chunk: its language and leading signature.
pub fn describe(language: Language, content: &str) -> String {
    match extract_signature(content) {
        Some(sig) => format!("{language} code: {sig}"),
        None => format!("{language} code"),
    }
}

/// Description plus the chunk flattened onto one line.
pub fn embedding_text(language: Language, content: &str) -> String {
    format!("{}\n{}", describe(language, content), flatten(content))
}

fn flatten(content: &str) -> String {
    content.replace(['\r', '\n'], " ")
}

/// First meaningful line up to a body opener (`{`, trailing `:`, `=>`).
fn extract_signature(content: &str) -> Option<String> {
    let line = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !is_comment(l))?;

    let cut = line
        .find('{')
        .or_else(|| line.find("=>").map(|idx| idx + 2))
        .unwrap_or(line.len());
    let sig = line[..cut].trim_end();
    let sig = sig.strip_suffix(':').unwrap_or(sig);
    let sig = sig.split_whitespace().collect::<Vec<_>>().join(" ");
    if sig.is_empty() {
        return None;
    }
    Some(sig.chars().take(MAX_SIGNATURE_CHARS).collect())
}

fn is_comment(line: &str) -> bool {
    ["//", "#", "/*", "*"].iter().any(|p| line.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_signature() {
        let content = "/// Adds.\npub fn add(a: i32,   b: i32) -> i32 {\n    a + b\n}";
        assert_eq!(
            describe(Language::Rust, content),
            "rust code: pub fn add(a: i32, b: i32) -> i32"
        );
    }

    #[test]
    fn test_python_signature() {
        let content = "\n# helper\ndef greet(name):\n    print(name)";
        assert_eq!(
            describe(Language::Python, content),
            "python code: def greet(name)"
        );
    }

    #[test]
    fn test_arrow_function_signature() {
        let content = "const double = (x) => x * 2;";
        assert_eq!(
            describe(Language::JavaScript, content),
            "javascript code: const double = (x) =>"
        );
    }

    #[test]
    fn test_blank_content() {
        assert_eq!(describe(Language::Go, "  \n\n"), "go code");
    }

    #[test]
    fn test_embedding_text_flattens_code() {
        let text = embedding_text(Language::Rust, "fn a() {\n    1\n}");
        assert_eq!(text, "rust code: fn a()\nfn a() {     1 }");
    }
}
