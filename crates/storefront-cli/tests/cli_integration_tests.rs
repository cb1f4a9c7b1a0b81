//! CLI integration tests
//!
//! Run the built binary against a temporary database file.

use std::path::Path;
use std::process::{Command, Output};

use storefront_core::model::NewProduct;
use storefront_store::{DbConfig, Storefront};
use tempfile::TempDir;

fn run(db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_storefront"))
        .env_remove("STOREFRONT_DB")
        .args(["--log", "test", "--db", db.to_str().unwrap()])
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

#[test]
fn test_migrate_creates_database() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("shop.db");

    let output = run(&db, &["migrate"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("001_initial_schema"));
    assert!(db.exists());
}

#[test]
fn test_list_and_show_seeded_product() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("shop.db");
    {
        let storefront = Storefront::new(DbConfig::file(&db));
        let s = storefront.session().unwrap();
        s.products()
            .create(NewProduct {
                name: "Kite".to_string(),
                description: "Diamond kite".to_string(),
                quantity: 3,
                unit_price: 12.5,
                distributor_id: None,
            })
            .unwrap();
    }

    let output = run(&db, &["list", "product"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "#1 Kite @ 12.50 (3 in stock)\n"
    );

    let output = run(&db, &["show", "product", "1", "--detailed"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Diamond kite"));
}

#[test]
fn test_show_unknown_id_fails() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("shop.db");

    let output = run(&db, &["show", "order-item", "9"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_NOT_FOUND"));
}
