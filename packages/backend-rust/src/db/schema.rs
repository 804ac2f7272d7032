pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

pub const SCHEMA_VERSION: &str = "1.0.0";

pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for ch in sql.chars() {
        match ch {
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
            }
            ';' if !in_single_quote && !in_double_quote => {
                push_statement(&mut statements, &current);
                current.clear();
                continue;
            }
            _ => {}
        }

        current.push(ch);
    }

    push_statement(&mut statements, &current);
    statements
}

/// Drop `--` comment lines and keep the statement if anything remains
fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let sql = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = sql.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ignores_semicolons_in_literals() {
        let sql = "CREATE TABLE a (x TEXT DEFAULT 'a;b');\n-- note;\nCREATE TABLE \"b;c\" (y INTEGER);";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].contains("'a;b'"));
        assert!(statements[1].starts_with("CREATE TABLE \"b;c\""));
    }

    #[test]
    fn test_schema_declares_all_tables() {
        let statements = split_sql_statements(SCHEMA_SQL);
        for table in ["_db_metadata", "users", "pain_entries", "lifestyle_entries"] {
            let needle = format!("CREATE TABLE IF NOT EXISTS \"{table}\"");
            assert!(
                statements.iter().any(|s| s.starts_with(&needle)),
                "missing table {table}"
            );
        }
    }
}
