/// Parameter Binding Module
///
/// Binds an ordered list of untyped values onto the positional placeholders of
/// a prepared statement.
use rusqlite::{Statement, ToSql};

/// Binds `params[i]` to placeholder `i + 1`.
///
/// SQLite treats unbound placeholders as NULL, so the list length is checked
/// against the statement's placeholder count first; a mismatch is reported as
/// [`rusqlite::Error::InvalidParameterCount`] instead of padding or truncating.
/// Values are handed to the driver as-is, with no coercion beyond what their
/// `ToSql` impl performs.
pub fn bind(stmt: &mut Statement<'_>, params: &[&dyn ToSql]) -> rusqlite::Result<()> {
    let expected = stmt.parameter_count();
    if params.len() != expected {
        return Err(rusqlite::Error::InvalidParameterCount(params.len(), expected));
    }
    for (index, param) in params.iter().enumerate() {
        stmt.raw_bind_parameter(index + 1, *param)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::types::Null;
    use rusqlite::{params, Connection};

    #[test]
    fn test_bind_in_list_order() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT ?, ?, ?").unwrap();
        bind(&mut stmt, params![1_i64, "two", 3.5_f64]).unwrap();

        let mut rows = stmt.raw_query();
        let row = rows.next().unwrap().unwrap();
        assert_eq!(row.get::<_, i64>(0).unwrap(), 1);
        assert_eq!(row.get::<_, String>(1).unwrap(), "two");
        assert_eq!(row.get::<_, f64>(2).unwrap(), 3.5);
    }

    #[test]
    fn test_bind_null_values() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT ? IS NULL, ? IS NULL").unwrap();
        bind(&mut stmt, params![Null, None::<i64>]).unwrap();

        let mut rows = stmt.raw_query();
        let row = rows.next().unwrap().unwrap();
        assert!(row.get::<_, bool>(0).unwrap());
        assert!(row.get::<_, bool>(1).unwrap());
    }

    #[test]
    fn test_bind_empty_list() {
        let conn = Connection::open_in_memory().unwrap();
        let mut stmt = conn.prepare("SELECT 1").unwrap();
        assert!(bind(&mut stmt, &[]).is_ok());
    }

    #[test]
    fn test_bind_rejects_count_mismatch() {
        let conn = Connection::open_in_memory().unwrap();

        let mut stmt = conn.prepare("SELECT ?, ?").unwrap();
        match bind(&mut stmt, params![1_i64]) {
            Err(rusqlite::Error::InvalidParameterCount(given, expected)) => {
                assert_eq!(given, 1);
                assert_eq!(expected, 2);
            }
            other => panic!("Expected InvalidParameterCount, got {:?}", other),
        }

        let mut stmt = conn.prepare("SELECT ?").unwrap();
        assert!(matches!(
            bind(&mut stmt, params![1_i64, 2_i64]),
            Err(rusqlite::Error::InvalidParameterCount(2, 1))
        ));
    }
}
