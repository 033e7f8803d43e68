use super::{PersistenceResult, QuoteStore};
use crate::{Client, Quote, QuoteItem, QuoteMetadata, QuoteSettings, VacationEntry};
use rusqlite::{Connection, OptionalExtension, params};
use std::sync::Mutex;

pub struct SqliteQuoteStore {
    connection: Mutex<Connection>,
}

impl SqliteQuoteStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        let connection = Connection::open_in_memory()?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS quote_header (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                metadata_json TEXT NOT NULL,
                client_json TEXT NOT NULL,
                settings_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS vacations (
                id INTEGER PRIMARY KEY,
                vacation_json TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS items (
                id INTEGER PRIMARY KEY,
                item_json TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn save_header(&self, tx: &rusqlite::Transaction, quote: &Quote) -> PersistenceResult<()> {
        let metadata = serde_json::to_string(quote.metadata())?;
        let client = serde_json::to_string(quote.client())?;
        let settings = serde_json::to_string(quote.settings())?;
        tx.execute("DELETE FROM quote_header", [])?;
        tx.execute(
            "INSERT INTO quote_header (id, metadata_json, client_json, settings_json) VALUES (1, ?1, ?2, ?3)",
            params![metadata, client, settings],
        )?;
        Ok(())
    }

    fn save_vacations(&self, tx: &rusqlite::Transaction, quote: &Quote) -> PersistenceResult<()> {
        tx.execute("DELETE FROM vacations", [])?;
        let mut stmt = tx.prepare("INSERT INTO vacations (id, vacation_json) VALUES (?1, ?2)")?;
        for entry in quote.vacations() {
            let json = serde_json::to_string(entry)?;
            stmt.execute(params![entry.id, json])?;
        }
        Ok(())
    }

    fn save_items(&self, tx: &rusqlite::Transaction, quote: &Quote) -> PersistenceResult<()> {
        tx.execute("DELETE FROM items", [])?;
        let mut stmt = tx.prepare("INSERT INTO items (id, item_json) VALUES (?1, ?2)")?;
        for item in quote.items() {
            let json = serde_json::to_string(item)?;
            stmt.execute(params![item.id, json])?;
        }
        Ok(())
    }
}

impl QuoteStore for SqliteQuoteStore {
    fn save_quote(&self, quote: &Quote) -> PersistenceResult<()> {
        super::validate_vacations(quote.vacations())?;
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        self.save_header(&tx, quote)?;
        self.save_vacations(&tx, quote)?;
        self.save_items(&tx, quote)?;
        tx.commit()?;
        tracing::info!(vacations = quote.vacations().len(), "quote saved to sqlite");
        Ok(())
    }

    fn load_quote(&self) -> PersistenceResult<Option<Quote>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");

        let mut stmt = conn.prepare(
            "SELECT metadata_json, client_json, settings_json FROM quote_header WHERE id = 1",
        )?;
        let header: Option<(String, String, String)> = stmt
            .query_row([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
            .optional()?;

        let Some((metadata_json, client_json, settings_json)) = header else {
            return Ok(None);
        };

        let metadata: QuoteMetadata = serde_json::from_str(&metadata_json)?;
        let client: Client = serde_json::from_str(&client_json)?;
        let settings: QuoteSettings = serde_json::from_str(&settings_json)?;

        let mut stmt = conn.prepare("SELECT vacation_json FROM vacations ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut vacations = Vec::new();
        for json in rows {
            let entry: VacationEntry = serde_json::from_str(&json?)?;
            vacations.push(entry);
        }

        let mut stmt = conn.prepare("SELECT item_json FROM items ORDER BY id ASC")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut items = Vec::new();
        for json in rows {
            let item: QuoteItem = serde_json::from_str(&json?)?;
            items.push(item);
        }

        super::validate_vacations(&vacations)?;

        let mut quote = Quote::from_parts(metadata, client, settings)?;
        for entry in vacations {
            quote.upsert_vacation(entry)?;
        }
        for item in items {
            quote.add_item(item)?;
        }
        Ok(Some(quote))
    }
}
