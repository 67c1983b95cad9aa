//! Conversions from post types into template [`Value`]s. Keys are spelled the
//! way templates refer to them (`{{ .Title }}`, `{{ .Author.Name }}`, ...).

use crate::post::{Author, IndexEntry, PostPage};
use gtmpl_value::Value;
use std::collections::HashMap;

fn string(s: &str) -> Value {
    Value::String(s.to_owned())
}

impl From<&Author> for Value {
    fn from(author: &Author) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Name".to_owned(), string(&author.name));
        m.insert("URL".to_owned(), string(&author.url));
        Value::Object(m)
    }
}

impl From<&PostPage> for Value {
    fn from(page: &PostPage) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), string(&page.title));
        m.insert("Author".to_owned(), (&page.author).into());
        m.insert("Date".to_owned(), string(&page.date));
        m.insert("ReadingTime".to_owned(), string(&page.reading_time));
        m.insert("Content".to_owned(), string(&page.content));
        Value::Object(m)
    }
}

impl From<&IndexEntry> for Value {
    fn from(entry: &IndexEntry) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), string(&entry.title));
        m.insert("Author".to_owned(), (&entry.author).into());
        m.insert("Date".to_owned(), string(&entry.date));
        m.insert("FormattedDate".to_owned(), string(&entry.formatted_date));
        m.insert("Excerpt".to_owned(), string(&entry.excerpt));
        m.insert("FileName".to_owned(), string(&entry.file_name));
        Value::Object(m)
    }
}

/// Converts the index listing, preserving order.
pub fn index_value(entries: &[IndexEntry]) -> Value {
    Value::Array(entries.iter().map(Value::from).collect())
}
