#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use setup_sheets_lib::{db, Part, Tool};

pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect sqlite::memory:");
    db::init_schema(&pool).await.expect("initialize schema");
    pool
}

pub fn sample_part(title: &str) -> Part {
    Part {
        id: 0,
        title: title.to_string(),
        coordinates: "X:1 Y:2 Z:3".to_string(),
        content: String::new(),
        main_spindle_tools: vec![Tool::new("T1", "Face")],
        sub_spindle_tools: Vec::new(),
        projection_length: "150".to_string(),
        bar_size: "1.25".to_string(),
        sub_spindle_collet_size: String::new(),
    }
}
