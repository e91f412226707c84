//! MySQL SQL dialect.
//!
//! MySQL differences that matter here:
//! - Backtick identifier quoting
//! - Numeric booleans (1/0)
//! - No `DATE_TRUNC`; buckets are built from `DATE_FORMAT`/`SUBDATE`
//! - OFFSET requires a LIMIT

use super::super::expr::DateGrain;
use super::super::token::{Token, TokenStream};
use super::helpers::{self, call, string_literal};
use super::SqlDialect;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_required_limit(limit, offset, Token::LitInt(i64::MAX))
    }

    fn emit_date_trunc(&self, grain: DateGrain, expr: TokenStream) -> TokenStream {
        match grain {
            DateGrain::Day => call("date", vec![expr]),
            DateGrain::Week => call(
                "subdate",
                vec![call("date", vec![expr.clone()]), call("weekday", vec![expr])],
            ),
            DateGrain::Hour => call(
                "date_format",
                vec![expr, string_literal("%Y-%m-%d %H:00:00")],
            ),
            DateGrain::Month => call("date_format", vec![expr, string_literal("%Y-%m-01")]),
            DateGrain::Year => call("date_format", vec![expr, string_literal("%Y-01-01")]),
        }
    }
}
