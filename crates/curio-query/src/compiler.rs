//! `QuerySpec` → parameterized SQL compiler.
//!
//! All user-supplied values are bound as parameters; LIKE patterns are
//! escaped so `%`/`_` in a keyword match literally.

use curio_store::LINK_COLUMNS;

use crate::spec::{DomainFilter, Ordering, QuerySpec, Scope};

/// A compiled SQL query with bound parameters.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    /// The SQL query string with `?N` placeholders.
    pub sql: String,
    /// Bound parameter values in order.
    pub params: Vec<SqlParam>,
}

impl CompiledQuery {
    /// Parameter values in rusqlite form, for the store's execution
    /// entry point.
    #[must_use]
    pub fn param_values(&self) -> Vec<rusqlite::types::Value> {
        self.params
            .iter()
            .map(|p| match p {
                SqlParam::Text(s) => rusqlite::types::Value::Text(s.clone()),
                SqlParam::Integer(i) => rusqlite::types::Value::Integer(*i),
            })
            .collect()
    }
}

/// A SQL parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Integer(i64),
}

/// Compile a query spec into a single parameterized SQL statement.
#[must_use]
pub fn compile(spec: &QuerySpec) -> CompiledQuery {
    let mut ctx = CompileCtx::new();
    let mut clauses: Vec<String> = Vec::new();

    match spec.scope {
        Scope::Anonymous => clauses.push("public = 1".to_string()),
        Scope::Authenticated => {
            clauses.push("(public = 1 OR friends = 1 OR family = 1)".to_string());
        }
        Scope::Staff => {}
    }

    // One group per word; groups accumulate with AND, the four field
    // checks within a group OR. SQLite LIKE is ASCII case-insensitive.
    for word in &spec.keywords {
        let pattern = format!("%{}%", escape_like(word));
        let t = ctx.push(SqlParam::Text(pattern.clone()));
        let d = ctx.push(SqlParam::Text(pattern.clone()));
        let u = ctx.push(SqlParam::Text(pattern.clone()));
        let g = ctx.push(SqlParam::Text(pattern));
        clauses.push(format!(
            "(title LIKE ?{t} ESCAPE '\\' OR IFNULL(description, '') LIKE ?{d} ESCAPE '\\' \
             OR url LIKE ?{u} ESCAPE '\\' OR tags LIKE ?{g} ESCAPE '\\')"
        ));
    }

    if !spec.tags.is_empty() {
        let placeholders: Vec<String> = spec
            .tags
            .iter()
            .map(|tag| format!("?{}", ctx.push(SqlParam::Text(tag.clone()))))
            .collect();
        clauses.push(format!(
            "id IN (SELECT DISTINCT link_id FROM link_tags WHERE tag IN ({}))",
            placeholders.join(", ")
        ));
    }

    if let Some(DomainFilter { netloc, exclude_id }) = &spec.domain {
        let n = ctx.push(SqlParam::Text(format!("%{}%", escape_like(netloc))));
        let e = ctx.push(SqlParam::Integer(*exclude_id));
        clauses.push(format!("url LIKE ?{n} ESCAPE '\\'"));
        clauses.push(format!("id <> ?{e}"));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    let order_sql = match spec.order {
        Ordering::DateDesc => " ORDER BY date DESC",
        Ordering::DateAsc => " ORDER BY date ASC",
    };

    let limit_sql = match spec.limit {
        Some(n) => format!(" LIMIT {n}"),
        None => String::new(),
    };

    let sql = format!("SELECT {LINK_COLUMNS} FROM links{where_sql}{order_sql}{limit_sql}");

    CompiledQuery {
        sql,
        params: ctx.params,
    }
}

struct CompileCtx {
    params: Vec<SqlParam>,
}

impl CompileCtx {
    fn new() -> Self {
        Self { params: Vec::new() }
    }

    fn push(&mut self, param: SqlParam) -> usize {
        self.params.push(param);
        self.params.len()
    }
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
