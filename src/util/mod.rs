#![allow(clippy::module_name_repetitions)]
//! Small utilities: command execution, shell quoting, line-preserving text and file helpers.

pub mod exec;
pub mod fs;
pub mod text_lines;

pub use exec::{CommandRunner, ExecOutput, ExecRequest, SystemRunner};
pub use text_lines::TextLines;

pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_escape(a))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@".contains(c))
    {
        s.to_string()
    } else {
        let escaped = s.replace('\'', "'\"'\"'");
        format!("'{}'", escaped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_escape_simple() {
        assert_eq!(shell_escape("abc-123_./:@"), "abc-123_./:@");
    }

    #[test]
    fn test_shell_escape_with_spaces_and_quotes() {
        assert_eq!(shell_escape("a b c"), "'a b c'");
        assert_eq!(shell_escape("O'Reilly"), "'O'\"'\"'Reilly'");
        assert_eq!(shell_escape(""), "''");
    }

    #[test]
    fn test_shell_join() {
        let args = vec!["git".to_string(), "clone".to_string(), "a b".to_string()];
        assert_eq!(shell_join(&args), "git clone 'a b'");
    }
}
