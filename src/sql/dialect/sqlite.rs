//! SQLite SQL dialect.
//!
//! SQLite stores timestamps as text, so buckets are built with
//! `strftime`/`date` modifiers instead of `DATE_TRUNC`.

use super::super::expr::DateGrain;
use super::super::token::{Token, TokenStream};
use super::helpers::{self, call, string_literal};
use super::SqlDialect;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_required_limit(limit, offset, Token::LitInt(-1))
    }

    fn emit_date_trunc(&self, grain: DateGrain, expr: TokenStream) -> TokenStream {
        match grain {
            // Monday-based weeks: jump to the next Sunday, then back six days.
            DateGrain::Week => call(
                "date",
                vec![expr, string_literal("weekday 0"), string_literal("-6 days")],
            ),
            DateGrain::Hour => call(
                "strftime",
                vec![string_literal("%Y-%m-%d %H:00:00"), expr],
            ),
            DateGrain::Day => call("strftime", vec![string_literal("%Y-%m-%d"), expr]),
            DateGrain::Month => call("strftime", vec![string_literal("%Y-%m-01"), expr]),
            DateGrain::Year => call("strftime", vec![string_literal("%Y-01-01"), expr]),
        }
    }
}
