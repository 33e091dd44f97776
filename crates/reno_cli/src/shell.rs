//! Line-by-line interactive session used when `reno` runs without
//! arguments. Each line is parsed like a full command line; failures are
//! reported and the session carries on.

use crate::app::{build_context, execute, is_informational, normalize_parse_error, print_footer};
use crate::cli::Cli;
use clap::{CommandFactory, Parser};
use reno_core::config::Config;
use reno_core::error::AppError;
use std::io::BufRead;

const PROGRAM: &str = "reno";

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Blank,
    Quit,
    Help,
    Args(Vec<String>),
}

fn classify(raw: &str) -> Result<Line, AppError> {
    let line = raw.trim();
    if line.is_empty() {
        return Ok(Line::Blank);
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return Ok(Line::Quit);
    }
    if line == "help" || line == "?" {
        return Ok(Line::Help);
    }

    let args = tokenize(line)?;
    Ok(if args.is_empty() {
        Line::Blank
    } else {
        Line::Args(args)
    })
}

/// Splits on whitespace outside quotes. Single and double quotes group
/// words; inside double quotes `\"` and `\\` are escapes.
pub fn tokenize(line: &str) -> Result<Vec<String>, AppError> {
    let mut words = Vec::new();
    let mut word: Option<String> = None;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(open), ch) if ch == open => quote = None,
            (Some('"'), '\\') => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| AppError::invalid_input("unterminated quote in command"))?;
                let buffer = word.get_or_insert_with(String::new);
                if escaped != '"' && escaped != '\\' {
                    buffer.push('\\');
                }
                buffer.push(escaped);
            }
            (Some(_), ch) => word.get_or_insert_with(String::new).push(ch),
            (None, '"' | '\'') => {
                quote = Some(ch);
                word.get_or_insert_with(String::new);
            }
            (None, ch) if ch.is_whitespace() => words.extend(word.take()),
            (None, ch) => word.get_or_insert_with(String::new).push(ch),
        }
    }

    if quote.is_some() {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }
    words.extend(word);
    Ok(words)
}

fn print_help() {
    println!("{}", Cli::command().render_help());
}

fn run_line(args: Vec<String>, base: &Config) -> Result<(), AppError> {
    let argv = std::iter::once(PROGRAM.to_string()).chain(args);
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) if is_informational(&err) => {
            println!("{err}");
            return Ok(());
        }
        Err(err) => return Err(normalize_parse_error(err)),
    };

    let ctx = build_context(&cli, base)?;
    let mutating = cli.command.is_mutating();
    execute(cli.command, &ctx)?;
    if mutating && !ctx.json {
        print_footer(&ctx)?;
    }
    Ok(())
}

/// Reads commands until end of input or `exit`/`quit`.
pub fn run<R: BufRead>(reader: R, base: &Config) -> Result<(), AppError> {
    for line in reader.lines() {
        let line = line.map_err(|err| AppError::io(err.to_string()))?;
        let outcome = match classify(&line) {
            Ok(Line::Blank) => Ok(()),
            Ok(Line::Quit) => break,
            Ok(Line::Help) => {
                print_help();
                Ok(())
            }
            Ok(Line::Args(args)) => run_line(args, base),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            eprintln!("ERROR: {err}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Line, classify, tokenize};

    #[test]
    fn tokenize_keeps_quoted_words_together() {
        let args = tokenize(r#"add-task kitchen "Replace worktop" --duration 1.5"#).unwrap();

        assert_eq!(
            args,
            vec!["add-task", "kitchen", "Replace worktop", "--duration", "1.5"]
        );
    }

    #[test]
    fn tokenize_handles_escapes_and_single_quotes() {
        let args = tokenize(r#"add-task hall "Paint \"feature\" wall""#).unwrap();
        assert_eq!(args[2], r#"Paint "feature" wall"#);

        let args = tokenize(r#"edit-task T1 --description 'Fix "the" door'"#).unwrap();
        assert_eq!(args[3], r#"Fix "the" door"#);
    }

    #[test]
    fn tokenize_keeps_empty_quoted_argument() {
        let args = tokenize(r#"add-task kitchen """#).unwrap();
        assert_eq!(args, vec!["add-task", "kitchen", ""]);
    }

    #[test]
    fn tokenize_rejects_unterminated_quote() {
        let err = tokenize(r#"add-task hall "Paint"#).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn classify_recognizes_session_keywords() {
        assert_eq!(classify("   ").unwrap(), Line::Blank);
        assert_eq!(classify("QUIT").unwrap(), Line::Quit);
        assert_eq!(classify("?").unwrap(), Line::Help);
        assert_eq!(
            classify("zones").unwrap(),
            Line::Args(vec!["zones".to_string()])
        );
    }
}
