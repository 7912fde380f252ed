use crate::error::Result;
use crate::eval::ResultSet;
use crate::{Document, InvertedIndex};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const INDEX_FILE: &str = "indice.txt";
pub const RESULTS_FILE: &str = "resposta.txt";

/// Sink for rendered output.
pub trait Storage {
    fn write(&self, name: &str, content: &str) -> Result<()>;
}

pub struct FileStorage {
    pub root: PathBuf,
}

impl FileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn path(&self, name: &str) -> PathBuf { self.root.join(name) }
}

impl Storage for FileStorage {
    fn write(&self, name: &str, content: &str) -> Result<()> {
        create_dir_all(&self.root)?;
        let mut f = File::create(self.path(name))?;
        f.write_all(content.as_bytes())?;
        tracing::debug!(path = %self.path(name).display(), bytes = content.len(), "wrote output");
        Ok(())
    }
}

/// Keeps everything written to it, keyed by name.
#[derive(Default)]
pub struct MemoryStorage {
    files: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, name: &str) -> Option<String> { self.files.lock().get(name).cloned() }
}

impl Storage for MemoryStorage {
    fn write(&self, name: &str, content: &str) -> Result<()> {
        self.files.lock().insert(name.to_string(), content.to_string());
        Ok(())
    }
}

/// One line per term: `casa: 1,2 3,1`.
pub fn render_index(index: &InvertedIndex) -> String {
    let mut out = String::new();
    for (term, postings) in index.iter() {
        out.push_str(term);
        out.push(':');
        for p in postings {
            let _ = write!(out, " {},{}", p.doc_id, p.frequency);
        }
        out.push('\n');
    }
    out
}

/// Match count, then the name of each matching document.
///
/// Ids outside `docs` are left out of both the names and the count.
pub fn render_results(hits: &ResultSet, docs: &[Document]) -> String {
    let names: Vec<&str> = hits
        .iter()
        .filter_map(|&doc_id| (doc_id as usize).checked_sub(1).and_then(|i| docs.get(i)))
        .map(|doc| doc.name.as_str())
        .collect();
    if names.len() != hits.len() {
        tracing::warn!(total_hits = hits.len(), known = names.len(), "results reference unknown documents");
    }
    let mut out = format!("{}\n", names.len());
    for name in names {
        out.push_str(name);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::build;

    fn docs() -> Vec<Document> {
        vec![
            Document::new(1, "a.txt", vec!["casa".into(), "casa".into(), "rua".into()]),
            Document::new(2, "b.txt", vec!["rua".into()]),
            Document::new(3, "c.txt", vec!["casa".into()]),
        ]
    }

    #[test]
    fn index_text_format() {
        let text = render_index(&build(&docs()));
        assert_eq!(text, "casa: 1,2 3,1\nrua: 1,1 2,1\n");
    }

    #[test]
    fn results_text_format() {
        let hits: ResultSet = [3, 1].into_iter().collect();
        assert_eq!(render_results(&hits, &docs()), "2\na.txt\nc.txt\n");
        assert_eq!(render_results(&ResultSet::new(), &docs()), "0\n");
    }

    #[test]
    fn results_count_only_known_documents() {
        let hits: ResultSet = [0, 2, 3].into_iter().collect();
        assert_eq!(render_results(&hits, &docs()[..1]), "0\n");
        assert_eq!(render_results(&hits, &docs()), "2\nb.txt\nc.txt\n");
    }

    #[test]
    fn file_storage_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("out"));
        storage.write(RESULTS_FILE, "0\n").unwrap();
        assert_eq!(std::fs::read_to_string(storage.path(RESULTS_FILE)).unwrap(), "0\n");
    }

    #[test]
    fn memory_storage_keeps_last_write() {
        let storage = MemoryStorage::new();
        storage.write(INDEX_FILE, "old").unwrap();
        storage.write(INDEX_FILE, "new").unwrap();
        assert_eq!(storage.get(INDEX_FILE).as_deref(), Some("new"));
        assert_eq!(storage.get(RESULTS_FILE), None);
    }
}
