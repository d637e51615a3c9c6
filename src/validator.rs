//! Input validation shared by every front end.
//!
//! [`is_valid_url`] accepts the same language as the pattern
//! `^((https?://)?(www\.)?([a-zA-Z0-9-]+\.)+[a-zA-Z0-9]{2,})(/\S+)?$`:
//! an optional scheme, two or more dot-separated host labels whose last label
//! is at least two alphanumerics, and an optional non-empty path.

use crate::config::FilterConfig;

/// Commands of the numeric stdin language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    /// `1 <url>`
    Add,
    /// `2 <url>`
    Check,
}

/// Returns true if `url` looks like a web address.
pub fn is_valid_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    let (host, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], Some(&rest[idx + 1..])),
        None => (rest, None),
    };

    if let Some(path) = path {
        if path.is_empty() || path.chars().any(char::is_whitespace) {
            return false;
        }
    }

    is_valid_host(host)
}

fn is_valid_host(host: &str) -> bool {
    let Some((labels, tld)) = host.rsplit_once('.') else {
        return false;
    };

    let tld_ok = tld.len() >= 2 && tld.bytes().all(|b| b.is_ascii_alphanumeric());
    tld_ok
        && labels
            .split('.')
            .all(|label| !label.is_empty() && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-'))
}

/// Parses the initial `"<size> <depth_1> ..."` line.
pub fn parse_initial_config(line: &str) -> Option<FilterConfig> {
    FilterConfig::parse(line)
}

/// Parses a `"1 <url>"` or `"2 <url>"` line.
///
/// The line must hold exactly two tokens, the command must be 1 or 2 and the
/// url must pass [`is_valid_url`].
pub fn parse_command_line(line: &str) -> Option<(CliCommand, String)> {
    let (verb, url) = split_command(line)?;
    let command = match verb.parse::<i64>().ok()? {
        1 => CliCommand::Add,
        2 => CliCommand::Check,
        _ => return None,
    };
    is_valid_url(url).then(|| (command, url.to_owned()))
}

/// Splits a line into exactly two whitespace-separated tokens.
pub fn split_command(line: &str) -> Option<(&str, &str)> {
    let mut tokens = line.split_whitespace();
    let verb = tokens.next()?;
    let argument = tokens.next()?;
    tokens.next().is_none().then_some((verb, argument))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        for url in [
            "example.com",
            "www.example.com",
            "https://example.com",
            "http://example.com",
            "https://www.example.com/path",
            "sub.domain.example",
            "abc.def.ghi.jkl",
            "www.integration-test.com",
            "http://a-b.c-d.io/x/y?z=1",
        ] {
            assert!(is_valid_url(url), "rejected {:?}", url);
        }
    }

    #[test]
    fn test_invalid_urls() {
        for url in [
            "",
            "http:/invalid.com",
            "htps://example",
            "example",
            "exa mple.com",
            "example.com/",
            "http://.com",
            "not_a_valid_url",
            "example.c",
            "example.c-m",
            "example..com",
            "ftp://example.com",
            "https://",
        ] {
            assert!(!is_valid_url(url), "accepted {:?}", url);
        }
    }

    #[test]
    fn test_parse_command_line() {
        assert_eq!(
            parse_command_line("1 example.com"),
            Some((CliCommand::Add, "example.com".to_owned()))
        );
        assert_eq!(
            parse_command_line("  2   spaced.com  "),
            Some((CliCommand::Check, "spaced.com".to_owned()))
        );

        assert_eq!(parse_command_line("2 invalid url"), None);
        assert_eq!(parse_command_line("1 "), None);
        assert_eq!(parse_command_line("1"), None);
        assert_eq!(parse_command_line(""), None);
        assert_eq!(parse_command_line("1 http:/bad.com"), None);
        assert_eq!(parse_command_line("3 example.com"), None);
        assert_eq!(parse_command_line("99 fake.com"), None);
        assert_eq!(parse_command_line("x example.com"), None);
    }

    #[test]
    fn test_parse_initial_config() {
        let config = parse_initial_config("256 1 2 3").unwrap();
        assert_eq!(config.size(), 256);
        assert_eq!(config.depths(), &[1, 2, 3]);
        assert!(parse_initial_config("1 test.com").is_none());
    }

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("POST   www.spaced.com   "), Some(("POST", "www.spaced.com")));
        assert_eq!(split_command("POST"), None);
        assert_eq!(split_command("POST a.com b.com"), None);
        assert_eq!(split_command("      "), None);
    }
}
