//! ローカル保存先の統計・孤立ファイル削除テスト

use chrono::Utc;
use std::collections::HashSet;
use stylo_ai::models::{StoredImage, User, WardrobeRecord};
use stylo_ai::store::Database;
use stylo_ai::uploads;
use stylo_ai_common::Category;
use tempfile::tempdir;
use uuid::Uuid;

#[test]
fn test_scan_missing_dir() {
    let stats = uploads::scan(std::path::Path::new("/nonexistent/uploads/12345")).unwrap();
    assert_eq!(stats.files, 0);
    assert_eq!(stats.bytes, 0);
}

#[test]
fn test_scan_counts_top_level_only() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("a.png"), [0u8; 10]).unwrap();
    std::fs::write(dir.path().join("b.jpg"), [0u8; 5]).unwrap();
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested").join("c.png"), [0u8; 100]).unwrap();

    let stats = uploads::scan(dir.path()).unwrap();
    assert_eq!(stats.files, 2);
    assert_eq!(stats.bytes, 15);
}

#[test]
fn test_prune_keeps_referenced_files() {
    let dir = tempdir().expect("Failed to create temp dir");
    for name in ["keep.png", "orphan.png"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }
    let referenced: HashSet<String> = ["keep.png".to_string()].into_iter().collect();

    let dry = uploads::prune(dir.path(), &referenced, true).unwrap();
    assert_eq!(dry.len(), 1);
    assert!(dir.path().join("orphan.png").exists());

    let removed = uploads::prune(dir.path(), &referenced, false).unwrap();
    assert_eq!(removed, vec![dir.path().join("orphan.png")]);
    assert!(dir.path().join("keep.png").exists());
    assert!(!dir.path().join("orphan.png").exists());
}

#[test]
fn test_referenced_uploads_from_database() {
    let mut db = Database::default();
    let user = User::new("a@example.com".into(), None, "h".into());
    let user_id = user.id;
    db.users.push(user);

    let record = |storage: StoredImage, url: &str| WardrobeRecord {
        id: Uuid::new_v4(),
        user_id,
        category: Category::Tops,
        color: "white".into(),
        style_tags: Vec::new(),
        image_url: url.into(),
        storage,
        created_at: Utc::now(),
    };
    db.wardrobe.push(record(
        StoredImage::Local { file_name: "local.png".into() },
        "http://localhost:5000/uploads/local.png",
    ));
    db.wardrobe.push(record(
        StoredImage::Cloudinary { public_id: "styloai/wardrobe/x".into() },
        "https://res.cloudinary.com/demo/image/upload/v1/x.png",
    ));

    let referenced = db.referenced_uploads();
    assert!(referenced.contains("local.png"));
    assert_eq!(referenced.len(), 1);
}
