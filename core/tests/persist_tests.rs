use searchcore::persist::{load_index, load_index_file, save_index, save_index_file, IndexFormat, IndexPaths, MetaFile};
use searchcore::{DocId, InvertedIndex};

fn corpus() -> InvertedIndex {
    InvertedIndex::from_documents(vec![
        (DocId::from(1), vec!["клеопатра", "цезарь"]),
        (DocId::from(2), vec!["цезарь", "антоний"]),
        (DocId::from(10), vec!["антоний"]),
        (DocId::from("appendix"), vec![]),
    ])
}

#[test]
fn json_index_round_trips() {
    let idx = corpus();
    let dir = tempfile::tempdir().unwrap();
    let paths = IndexPaths::new(dir.path());
    save_index(&paths, &idx, &MetaFile::for_index(&idx, IndexFormat::Json, "2024-01-01T00:00:00Z".into())).unwrap();

    assert!(paths.record(IndexFormat::Json).exists());
    let loaded = load_index(&paths).unwrap();
    assert_eq!(loaded.documents, idx.documents);
    for (term, postings) in &idx.index {
        assert_eq!(loaded.postings(term), Some(postings));
    }
    assert_eq!(loaded, idx);
}

#[test]
fn bincode_index_round_trips() {
    let idx = corpus();
    let dir = tempfile::tempdir().unwrap();
    let paths = IndexPaths::new(dir.path().join("nested"));
    save_index(&paths, &idx, &MetaFile::for_index(&idx, IndexFormat::Bincode, String::new())).unwrap();

    assert!(paths.record(IndexFormat::Bincode).exists());
    assert!(!paths.record(IndexFormat::Json).exists());
    assert_eq!(load_index(&paths).unwrap(), idx);
}

#[test]
fn bare_record_format_follows_extension() {
    let idx = corpus();
    let dir = tempfile::tempdir().unwrap();
    for name in ["index.json", "index.bin"] {
        let path = dir.path().join(name);
        let format = if name.ends_with(".bin") { IndexFormat::Bincode } else { IndexFormat::Json };
        save_index_file(&path, &idx, format).unwrap();
        assert_eq!(load_index_file(&path).unwrap(), idx);
    }
}

#[test]
fn missing_meta_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_index(&IndexPaths::new(dir.path())).is_err());
}
