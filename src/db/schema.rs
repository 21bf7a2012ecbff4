// src/db/schema.rs

// Create-if-absent schemas for both database files. Nothing here drops or
// rewrites data; columns added after the first release are bolted on with
// `ALTER TABLE ... ADD COLUMN` once `pragma_table_info` shows they're missing.

use sqlx::SqliteConnection;

pub async fn init_main_db(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employee_info (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            employeeName TEXT UNIQUE,
            password TEXT,
            hourlyRate REAL,
            start_time DATETIME,
            end_time DATETIME,
            loggedIn INTEGER DEFAULT 0
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    ensure_column(conn, "employee_info", "start_time", "DATETIME").await?;
    ensure_column(conn, "employee_info", "end_time", "DATETIME").await?;
    ensure_column(conn, "employee_info", "loggedIn", "INTEGER DEFAULT 0").await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS facility_workstations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workstation TEXT UNIQUE,
            availableStations INTEGER
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    // The primary key keeps an employee from appearing twice on one station.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS workstation_eligibility (
            workstation TEXT NOT NULL,
            employeeName TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (workstation, employeeName)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS employee_app_access (
            employeeName TEXT NOT NULL,
            app TEXT NOT NULL,
            PRIMARY KEY (employeeName, app)
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS product_codes (
            prod_type TEXT PRIMARY KEY,
            worksheetRef TEXT
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS EmployeesTasks (
            employeeName TEXT NOT NULL,
            liveTask TEXT,
            status TEXT,
            isobarcode TEXT
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    sqlx::query("CREATE TABLE IF NOT EXISTS manualTasks (task_names TEXT)")
        .execute(&mut *conn)
        .await?;

    migrate_legacy_lists(conn).await?;

    tracing::info!("Main database schema ready");
    Ok(())
}

pub async fn init_tracking_db(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tracking_data (
            containerID INTEGER,
            orderNumber TEXT,
            leadBarcode TEXT,
            isoBarcode TEXT UNIQUE,
            history TEXT,
            itemNum INTEGER,
            prodType TEXT,
            size TEXT
        )
        "#,
    )
    .execute(&mut *conn)
    .await?;

    ensure_column(conn, "tracking_data", "itemNum", "INTEGER").await?;
    ensure_column(conn, "tracking_data", "prodType", "TEXT").await?;
    ensure_column(conn, "tracking_data", "size", "TEXT").await?;

    for ddl in [
        "CREATE INDEX IF NOT EXISTS idx_tracking_order ON tracking_data (orderNumber)",
        "CREATE INDEX IF NOT EXISTS idx_tracking_lead ON tracking_data (leadBarcode)",
        "CREATE INDEX IF NOT EXISTS idx_tracking_container ON tracking_data (containerID)",
    ] {
        sqlx::query(ddl).execute(&mut *conn).await?;
    }

    tracing::info!("Tracking database schema ready");
    Ok(())
}

pub async fn column_exists(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
) -> Result<bool, sqlx::Error> {
    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
        .bind(table)
        .fetch_all(&mut *conn)
        .await?;
    Ok(columns.iter().any(|c| c == column))
}

async fn ensure_column(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    declaration: &str,
) -> Result<bool, sqlx::Error> {
    if column_exists(conn, table, column).await? {
        return Ok(false);
    }

    // Identifiers can't be bound; both come from the constants above.
    let ddl = format!("ALTER TABLE {table} ADD COLUMN {column} {declaration}");
    sqlx::query(&ddl).execute(&mut *conn).await?;
    tracing::info!("Added column {}.{}", table, column);
    Ok(true)
}

// Older files kept eligibility and app access as JSON arrays in a text
// column. Copy them into the join tables and blank the column so the
// copy happens only once.
async fn migrate_legacy_lists(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    if column_exists(conn, "facility_workstations", "eligibleList").await? {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT workstation, eligibleList FROM facility_workstations
             WHERE workstation IS NOT NULL AND eligibleList IS NOT NULL AND eligibleList != ''",
        )
        .fetch_all(&mut *conn)
        .await?;

        for (workstation, raw) in rows {
            for (position, name) in parse_json_list(&raw).into_iter().enumerate() {
                sqlx::query(
                    "INSERT OR IGNORE INTO workstation_eligibility (workstation, employeeName, position)
                     VALUES (?, ?, ?)",
                )
                .bind(&workstation)
                .bind(name)
                .bind(position as i64)
                .execute(&mut *conn)
                .await?;
            }
            sqlx::query("UPDATE facility_workstations SET eligibleList = NULL WHERE workstation = ?")
                .bind(&workstation)
                .execute(&mut *conn)
                .await?;
            tracing::info!("Migrated eligibility list of workstation '{}'", workstation);
        }
    }

    if column_exists(conn, "employee_info", "pulseAccess").await? {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT employeeName, pulseAccess FROM employee_info
             WHERE employeeName IS NOT NULL AND pulseAccess IS NOT NULL AND pulseAccess != ''",
        )
        .fetch_all(&mut *conn)
        .await?;

        for (employee, raw) in rows {
            for app in parse_json_list(&raw) {
                sqlx::query("INSERT OR IGNORE INTO employee_app_access (employeeName, app) VALUES (?, ?)")
                    .bind(&employee)
                    .bind(app)
                    .execute(&mut *conn)
                    .await?;
            }
            sqlx::query("UPDATE employee_info SET pulseAccess = NULL WHERE employeeName = ?")
                .bind(&employee)
                .execute(&mut *conn)
                .await?;
            tracing::info!("Migrated app access of employee '{}'", employee);
        }
    }

    Ok(())
}

// Malformed or non-array JSON counts as an empty list.
fn parse_json_list(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(list) => {
            let mut seen = Vec::with_capacity(list.len());
            for name in list {
                if !seen.contains(&name) {
                    seen.push(name);
                }
            }
            seen
        }
        Err(e) => {
            tracing::warn!("Ignoring malformed JSON list {:?}: {}", raw, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Connection;

    async fn memory_conn() -> SqliteConnection {
        SqliteConnection::connect("sqlite::memory:").await.unwrap()
    }

    #[test]
    fn json_list_parsing_dedups_and_tolerates_garbage() {
        assert_eq!(
            parse_json_list(r#"["Alice","Bob","Alice"]"#),
            vec!["Alice".to_string(), "Bob".to_string()]
        );
        assert!(parse_json_list("not json").is_empty());
        assert!(parse_json_list(r#"{"a":1}"#).is_empty());
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let mut conn = memory_conn().await;
        init_main_db(&mut conn).await.unwrap();
        init_main_db(&mut conn).await.unwrap();
        init_tracking_db(&mut conn).await.unwrap();
        init_tracking_db(&mut conn).await.unwrap();

        assert!(column_exists(&mut conn, "tracking_data", "itemNum").await.unwrap());
        assert!(column_exists(&mut conn, "employee_info", "loggedIn").await.unwrap());
    }

    #[tokio::test]
    async fn old_tracking_table_gains_new_columns() {
        let mut conn = memory_conn().await;
        sqlx::query(
            "CREATE TABLE tracking_data (containerID INTEGER, orderNumber TEXT, leadBarcode TEXT,
             isoBarcode TEXT UNIQUE, history TEXT)",
        )
        .execute(&mut conn)
        .await
        .unwrap();

        init_tracking_db(&mut conn).await.unwrap();

        for column in ["itemNum", "prodType", "size"] {
            assert!(column_exists(&mut conn, "tracking_data", column).await.unwrap());
        }
    }

    #[tokio::test]
    async fn legacy_eligible_list_moves_to_join_table() {
        let mut conn = memory_conn().await;
        sqlx::query(
            "CREATE TABLE facility_workstations (id INTEGER PRIMARY KEY AUTOINCREMENT,
             workstation TEXT UNIQUE, availableStations INTEGER, eligibleList TEXT)",
        )
        .execute(&mut conn)
        .await
        .unwrap();
        sqlx::query("INSERT INTO facility_workstations (workstation, availableStations, eligibleList) VALUES ('Scan1', 2, '[\"Bob\",\"Alice\"]')")
            .execute(&mut conn)
            .await
            .unwrap();

        init_main_db(&mut conn).await.unwrap();
        // A second start must not duplicate anything.
        init_main_db(&mut conn).await.unwrap();

        let names: Vec<String> = sqlx::query_scalar(
            "SELECT employeeName FROM workstation_eligibility WHERE workstation = 'Scan1' ORDER BY position",
        )
        .fetch_all(&mut conn)
        .await
        .unwrap();
        assert_eq!(names, vec!["Bob".to_string(), "Alice".to_string()]);
    }
}
