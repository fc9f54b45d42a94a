//! Audit prompt construction
//!
//! Prompts are pure functions of (code, filename): byte-identical output for
//! identical input, so model replies can be cached and tests can assert on
//! exact prompt text.

pub const AUDIT_SYSTEM_PROMPT: &str =
    "You are a security expert. Analyze code for vulnerabilities and return only valid JSON.";

const AUDIT_PROMPT: &str = r#"Analyze this {filename} code for ALL security vulnerabilities. Use EXACT line numbers shown.

Find ALL security vulnerabilities including: SQL injection, command injection, XSS, hardcoded secrets, weak crypto, path traversal, insecure deserialization, LDAP injection, NoSQL injection, prototype pollution, SSRF, insecure random, authentication bypasses, authorization flaws, input validation, output encoding, race conditions, buffer overflows, memory leaks, resource leaks, information disclosure, missing error handling, insecure configurations, and any other security issues. Analyze every line thoroughly and report ALL findings.

Return ONLY valid JSON with ALL vulnerabilities using EXACT line numbers:
{
  "vulnerabilities": [
    {
      "title": "Vulnerability name",
      "severity": "Critical|High|Medium|Low",
      "line": 16,
      "description": "Detailed description",
      "fix": "How to fix it"
    }
  ]
}

Code with line numbers:
{code}"#;

pub struct PromptBuilder;

impl PromptBuilder {
    /// Render source with a 1-based, right-aligned line-number prefix so the
    /// model can cite addressable line numbers.
    pub fn number_lines(code: &str) -> String {
        code.lines()
            .enumerate()
            .map(|(i, line)| format!("{:>2}: {}", i + 1, line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the full audit prompt for one file.
    pub fn build_audit_prompt(code: &str, filename: &str) -> String {
        AUDIT_PROMPT
            .replace("{filename}", filename)
            .replace("{code}", &Self::number_lines(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_lines_one_based_padded() {
        let numbered = PromptBuilder::number_lines("a\nb\nc");
        assert_eq!(numbered, " 1: a\n 2: b\n 3: c");
    }

    #[test]
    fn test_number_lines_wide_files_keep_natural_width() {
        let code = (0..120).map(|_| "x").collect::<Vec<_>>().join("\n");
        let numbered = PromptBuilder::number_lines(&code);
        assert!(numbered.contains("\n100: x"));
        assert!(numbered.starts_with(" 1: x"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let a = PromptBuilder::build_audit_prompt("let x = 1;", "app.js");
        let b = PromptBuilder::build_audit_prompt("let x = 1;", "app.js");
        assert_eq!(a, b);
    }

    #[test]
    fn test_prompt_contains_filename_schema_and_code() {
        let prompt = PromptBuilder::build_audit_prompt("print(1)", "run.py");
        assert!(prompt.contains("Analyze this run.py code"));
        assert!(prompt.contains("\"vulnerabilities\""));
        assert!(prompt.contains("Critical|High|Medium|Low"));
        assert!(prompt.ends_with(" 1: print(1)"));
    }
}
