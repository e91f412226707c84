//! Shared building blocks for the dialect implementations.

use super::super::token::{Token, TokenStream};

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB, SQLite
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote string with single quotes (standard SQL).
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Format boolean as literal true/false.
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

/// Emit `LIMIT n OFFSET m`, either half optional.
/// Used by: Postgres, DuckDB
pub fn emit_limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let Some(lim) = limit {
        ts.push(Token::Limit).space().push(Token::LitInt(clamp(lim)));
    }

    if let Some(off) = offset {
        if limit.is_some() {
            ts.space();
        }
        ts.push(Token::Offset).space().push(Token::LitInt(clamp(off)));
    }

    ts
}

/// Emit `LIMIT n OFFSET m` for dialects that reject a bare OFFSET.
///
/// `unbounded` is the LIMIT value the dialect reads as "no limit".
/// Used by: SQLite (`-1`), MySQL (`i64::MAX`)
pub fn emit_limit_offset_required_limit(
    limit: Option<u64>,
    offset: Option<u64>,
    unbounded: Token,
) -> TokenStream {
    match (limit, offset) {
        (None, Some(off)) => {
            let mut ts = TokenStream::new();
            ts.push(Token::Limit)
                .space()
                .push(unbounded)
                .space()
                .push(Token::Offset)
                .space()
                .push(Token::LitInt(clamp(off)));
            ts
        }
        _ => emit_limit_offset_standard(limit, offset),
    }
}

/// Function call: `NAME(arg, ...)`.
pub fn call(name: &str, args: Vec<TokenStream>) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::FunctionName(name.into())).lparen();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            ts.comma().space();
        }
        ts.append(arg);
    }
    ts.rparen();
    ts
}

/// A string literal as a token stream.
pub fn string_literal(s: &str) -> TokenStream {
    let mut ts = TokenStream::new();
    ts.push(Token::LitString(s.into()));
    ts
}

fn clamp(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
