use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::quiz::ContentItem;

const REQUIRED_COLUMNS: [&str; 3] = ["subject", "topic", "text"];

#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to open content file {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed content table: {0}")]
    Csv(#[from] csv::Error),
    #[error("content table has no {0:?} column")]
    MissingColumn(&'static str),
    #[error("failed to serialize the subject index: {0}")]
    Index(#[from] serde_json::Error),
}

/// Read-only quiz content grouped by subject, then topic.
///
/// Built once at startup and shared between sessions; nothing mutates it after [`ContentStore::new`].
#[derive(Debug, Default)]
pub struct ContentStore {
    subjects: BTreeMap<String, BTreeMap<String, Vec<ContentItem>>>,
    index_json: String,
}

impl ContentStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ContentError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file)
    }

    /// Parses a table with `subject`, `topic` and `text` columns.
    ///
    /// Fields are trimmed, rows with an empty field are dropped and repeated rows are kept once.
    pub fn new(reader: impl Read) -> Result<Self, ContentError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let mut columns = [0usize; 3];
        for (slot, name) in columns.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|h| h == name)
                .ok_or(ContentError::MissingColumn(name))?;
        }

        let mut subjects: BTreeMap<String, BTreeMap<String, Vec<ContentItem>>> = BTreeMap::new();
        let mut seen: HashSet<ContentItem> = HashSet::new();
        let mut dropped = 0usize;
        let mut duplicates = 0usize;

        for record in reader.records() {
            let record = record?;
            let [subject, topic, text] = columns.map(|i| record.get(i).unwrap_or("").trim());
            if subject.is_empty() || topic.is_empty() || text.is_empty() {
                dropped += 1;
                continue;
            }

            let item = ContentItem::new(subject.to_string(), topic.to_string(), text.to_string());
            if !seen.insert(item.clone()) {
                duplicates += 1;
                continue;
            }
            subjects
                .entry(item.subject.clone())
                .or_default()
                .entry(item.topic.clone())
                .or_default()
                .push(item);
        }

        if dropped > 0 || duplicates > 0 {
            log::info!(
                "Skipped {} incomplete and {} duplicate content rows",
                dropped,
                duplicates
            );
        }

        let mut store = Self {
            subjects,
            index_json: String::new(),
        };
        store.index_json = {
            let index: BTreeMap<&str, Vec<&str>> = store
                .subjects()
                .map(|subject| (subject, store.topics_for(subject).collect()))
                .collect();
            serde_json::to_string(&index)?
        };

        Ok(store)
    }

    /// Subjects in sorted order.
    pub fn subjects(&self) -> impl Iterator<Item = &str> {
        self.subjects.keys().map(String::as_str)
    }

    /// Topics under `subject` in sorted order; empty for an unknown subject.
    pub fn topics_for<'a>(&'a self, subject: &str) -> impl Iterator<Item = &'a str> {
        self.subjects
            .get(subject)
            .into_iter()
            .flat_map(|topics| topics.keys().map(String::as_str))
    }

    /// The question pool for a subject/topic pair; empty when either is unknown.
    pub fn items_for(&self, subject: &str, topic: &str) -> &[ContentItem] {
        self.subjects
            .get(subject)
            .and_then(|topics| topics.get(topic))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, subject: &str, topic: &str) -> bool {
        self.subjects
            .get(subject)
            .is_some_and(|topics| topics.contains_key(topic))
    }

    /// Subject to topics mapping as a JSON object, for the cascading topic selector.
    pub fn index_json(&self) -> &str {
        &self.index_json
    }

    pub fn len(&self) -> usize {
        self.subjects
            .values()
            .flat_map(|topics| topics.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_store() -> ContentStore {
        let table = "\
subject,topic,text
Math,Algebra,Solve linear equations
Math,Algebra,Factor quadratics
Math,Algebra,Simplify expressions
Math,Geometry,Area of a triangle
Biology,Cells,Parts of a cell
Biology,Cells,Mitosis phases
Biology,Cells,Meiosis phases
Biology,Cells,Cell membrane transport
Biology,Cells,Organelles and their roles
Biology,Cells,Photosynthesis in chloroplasts
Biology,Cells,Cellular respiration
";
        ContentStore::new(table.as_bytes()).unwrap()
    }

    #[test]
    fn groups_items_by_subject_and_topic() {
        let store = sample_store();

        assert_eq!(store.subjects().collect::<Vec<_>>(), vec!["Biology", "Math"]);
        assert_eq!(
            store.topics_for("Math").collect::<Vec<_>>(),
            vec!["Algebra", "Geometry"]
        );
        assert_eq!(store.items_for("Math", "Algebra").len(), 3);
        assert_eq!(store.items_for("Biology", "Cells").len(), 7);
        assert_eq!(store.len(), 11);
        assert!(store.contains("Math", "Geometry"));
        assert!(!store.contains("Math", "Cells"));
    }

    #[test]
    fn normalizes_rows() {
        let table = "\
text,extra,subject,topic
  Limits  ,x, Math , Calculus
Limits,y,Math,Calculus
,z,Math,Calculus
Derivatives,,Math,
Integrals,,Math,Calculus
";
        let store = ContentStore::new(table.as_bytes()).unwrap();

        let texts: Vec<_> = store
            .items_for("Math", "Calculus")
            .iter()
            .map(|item| item.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Limits", "Integrals"]);
        assert_eq!(store.topics_for("Math").count(), 1);
    }

    #[test]
    fn repeated_text_is_kept_once_per_topic() {
        let mut table = String::from("subject,topic,text\n");
        for round in 0..3 {
            for n in 0..200 {
                table.push_str(&format!("Math,Algebra,Prompt {}\n", n));
            }
            table.push_str(&format!("Math,Geometry,Prompt {}\n", round));
        }
        table.push_str("Biology,Algebra,Prompt 0\n");

        let store = ContentStore::new(table.as_bytes()).unwrap();

        assert_eq!(store.items_for("Math", "Algebra").len(), 200);
        assert_eq!(store.items_for("Math", "Geometry").len(), 3);
        assert_eq!(store.items_for("Biology", "Algebra").len(), 1);
        assert_eq!(store.len(), 204);
    }

    #[test]
    fn unknown_lookups_are_empty() {
        let store = sample_store();

        assert!(store.items_for("History", "Rome").is_empty());
        assert!(store.items_for("Math", "Rome").is_empty());
        assert_eq!(store.topics_for("History").count(), 0);
    }

    #[test]
    fn missing_column_is_an_error() {
        let table = "subject,text\nMath,Limits\n";

        let err = ContentStore::new(table.as_bytes()).unwrap_err();
        assert!(matches!(err, ContentError::MissingColumn("topic")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ContentStore::open("/nonexistent/snippets.csv").unwrap_err();
        assert!(matches!(err, ContentError::Open { .. }));
    }

    #[test]
    fn index_json_lists_topics_per_subject() {
        let store = sample_store();

        let index: BTreeMap<String, Vec<String>> =
            serde_json::from_str(store.index_json()).unwrap();
        assert_eq!(index["Math"], vec!["Algebra", "Geometry"]);
        assert_eq!(index["Biology"], vec!["Cells"]);
    }
}
