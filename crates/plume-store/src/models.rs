/// Row type for the `entries` table. Values are opaque text, usually JSON.
#[derive(Debug, Clone)]
pub struct EntryRow {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}
